use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PawnStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PawnStatus {
    pub const ALL: [PawnStatus; 3] = [
        PawnStatus::Pending,
        PawnStatus::Approved,
        PawnStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PawnStatus::Pending => "pending",
            PawnStatus::Approved => "approved",
            PawnStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PawnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown pawn request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PawnStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PawnStatus::Pending),
            "approved" => Ok(PawnStatus::Approved),
            "rejected" => Ok(PawnStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for PawnStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A row of `public.pawn_requests`. Nothing in this crate writes these; the
/// table exists for the storefront's loan workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PawnRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_description: String,
    pub requested_amount: Decimal,
    #[sqlx(try_from = "String")]
    pub status: PawnStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
