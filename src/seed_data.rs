//! The baseline catalog. The JSON list in `seed/catalog_items.json` is the only
//! copy of the sample records; it is embedded at compile time.

use crate::models::{CatalogItemError, NewCatalogItem};
use std::path::Path;

const BASELINE_JSON: &str = include_str!("../seed/catalog_items.json");

/// Number of records in the embedded baseline list.
pub const BASELINE_ITEM_COUNT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum SeedDataError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Seed data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Seed item #{index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: CatalogItemError,
    },
    #[error("Seed data contains no items")]
    Empty,
}

/// The embedded baseline list, in insertion order.
pub fn baseline_items() -> Result<Vec<NewCatalogItem>, SeedDataError> {
    parse_items(BASELINE_JSON)
}

/// Loads an alternative list with the same record shape from disk.
pub fn load_items_from_file(path: &Path) -> Result<Vec<NewCatalogItem>, SeedDataError> {
    let json = std::fs::read_to_string(path).map_err(|source| SeedDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_items(&json)
}

pub fn parse_items(json: &str) -> Result<Vec<NewCatalogItem>, SeedDataError> {
    let items: Vec<NewCatalogItem> = serde_json::from_str(json)?;

    if items.is_empty() {
        return Err(SeedDataError::Empty);
    }

    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|source| SeedDataError::Invalid { index, source })?;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn baseline_has_eight_valid_items() {
        let items = baseline_items().unwrap();
        assert_eq!(items.len(), BASELINE_ITEM_COUNT);
        assert!(items.iter().all(|item| item.price >= Decimal::ZERO));
    }

    #[test]
    fn baseline_names_are_unique() {
        let items = baseline_items().unwrap();
        let mut names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BASELINE_ITEM_COUNT);
    }

    #[test]
    fn numeric_prices_are_accepted() {
        let json = r#"[{"name":"Band","description":"Plain band","price":75.5,
            "category":"Rings","image_url":"https://example.com/band.jpg"}]"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items[0].price, Decimal::new(755, 1));
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(parse_items("[]"), Err(SeedDataError::Empty)));
    }

    #[test]
    fn invalid_item_reports_its_index() {
        let json = r#"[
            {"name":"Band","description":"","price":"1.00","category":"Rings","image_url":"https://example.com/a.jpg"},
            {"name":"Chain","description":"","price":"-5.00","category":"Necklaces","image_url":"https://example.com/b.jpg"}
        ]"#;
        match parse_items(json) {
            Err(SeedDataError::Invalid { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, CatalogItemError::NegativePrice("Chain".to_string()));
            }
            other => panic!("expected invalid item error, got {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let json = r#"[{"name":"Band","price":"1.00"}]"#;
        assert!(matches!(parse_items(json), Err(SeedDataError::Parse(_))));
    }
}
