use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of `public.items`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A catalog record as it appears in a seed file, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCatalogItem {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogItemError {
    #[error("Item name must not be empty")]
    EmptyName,
    #[error("Price for '{0}' must not be negative")]
    NegativePrice(String),
    #[error("Image URL for '{0}' must be an absolute http(s) URL")]
    InvalidImageUrl(String),
}

impl NewCatalogItem {
    /// Checks the record against the constraints the store will enforce, plus
    /// the URL shape of `image_url`.
    pub fn validate(&self) -> Result<(), CatalogItemError> {
        if self.name.trim().is_empty() {
            return Err(CatalogItemError::EmptyName);
        }

        if self.price < Decimal::ZERO {
            return Err(CatalogItemError::NegativePrice(self.name.clone()));
        }

        let url = self.image_url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match rest {
            Some(host_and_path) if !host_and_path.is_empty() && !host_and_path.starts_with('/') => {
                Ok(())
            }
            _ => Err(CatalogItemError::InvalidImageUrl(self.name.clone())),
        }
    }
}
