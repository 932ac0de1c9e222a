//! Furniture catalog.
//!
//! The catalog is plain data handed to the planner. It comes either from a
//! JSON file (an array of `FurnitureItem`) or from the built-in static list.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::model::{FurnitureDimensions, FurnitureItem, ValidationError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid catalog entry '{id}': {source}")]
    InvalidEntry {
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Built-in catalog used when no external catalog is available.
pub fn static_catalog() -> Vec<FurnitureItem> {
    [
        ("bed-single", "Single Bed", "Bedroom", (0.9, 2.0, 0.5), "TSh 250,000"),
        ("sofa-3seater", "3-Seater Sofa", "Living Room", (2.0, 0.85, 0.7), "TSh 450,000"),
        ("dining-table", "Dining Table", "Dining Room", (1.5, 0.9, 0.75), "TSh 300,000"),
        ("wardrobe", "Wardrobe", "Bedroom", (1.2, 0.6, 2.0), "TSh 400,000"),
    ]
    .into_iter()
    .map(|(id, name, category, (width, length, height), price)| {
        FurnitureItem::new(
            id,
            name,
            category,
            FurnitureDimensions {
                width,
                length,
                height,
            },
            price,
        )
    })
    .collect()
}

/// Parses and validates a JSON catalog.
pub fn parse_catalog(json: &str) -> Result<Vec<FurnitureItem>, CatalogError> {
    let items: Vec<FurnitureItem> = serde_json::from_str(json)?;
    items
        .into_iter()
        .map(|item| {
            let id = item.id.clone();
            item.validated()
                .map_err(|source| CatalogError::InvalidEntry { id, source })
        })
        .collect()
}

/// Reads and validates a JSON catalog file.
pub fn load_catalog_from_path(path: &Path) -> Result<Vec<FurnitureItem>, CatalogError> {
    let raw = fs::read_to_string(path)?;
    parse_catalog(&raw)
}

/// Loads the catalog at `path`, falling back to the static catalog on error.
pub fn load_catalog(path: Option<&Path>) -> Vec<FurnitureItem> {
    let Some(path) = path else {
        return static_catalog();
    };

    match load_catalog_from_path(path) {
        Ok(items) => {
            info!(path = %path.display(), items = items.len(), "loaded furniture catalog");
            items
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "falling back to static furniture catalog");
            static_catalog()
        }
    }
}
