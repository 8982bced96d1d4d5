//! SKU catalog: the read-only product configuration for a session.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::Sku;

/// One cataloged product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub sku: Sku,
    pub name: String,
    /// Shelf counts strictly below this value are considered low stock.
    pub threshold: u32,
}

impl CatalogItem {
    pub fn new(sku: Sku, name: impl Into<String>, threshold: u32) -> Self {
        Self {
            sku,
            name: name.into(),
            threshold,
        }
    }
}

impl Entity for CatalogItem {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }
}

/// Immutable set of SKUs, kept in insertion order.
///
/// Loaded once before any observation is reconciled; SKUs are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<Sku, usize>,
}

impl Catalog {
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> DomainResult<Self> {
        let mut catalog = Self::default();

        for item in items {
            if item.name.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "catalog item {} has an empty name",
                    item.sku
                )));
            }
            if catalog.index.contains_key(&item.sku) {
                return Err(DomainError::conflict(format!(
                    "sku {} is cataloged more than once",
                    item.sku
                )));
            }
            catalog.index.insert(item.sku.clone(), catalog.items.len());
            catalog.items.push(item);
        }

        Ok(catalog)
    }

    pub fn get(&self, sku: &Sku) -> Option<&CatalogItem> {
        self.index.get(sku).map(|&i| &self.items[i])
    }

    /// Like `get`, but an absent SKU is an `UnknownSku` error.
    pub fn require(&self, sku: &Sku) -> DomainResult<&CatalogItem> {
        self.get(sku).ok_or_else(|| DomainError::unknown_sku(sku))
    }

    pub fn contains(&self, sku: &Sku) -> bool {
        self.index.contains_key(sku)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    pub fn skus(&self) -> impl Iterator<Item = &Sku> {
        self.items.iter().map(|i| &i.sku)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Source of the catalog for a session.
pub trait CatalogLoader {
    fn load(&self) -> DomainResult<Catalog>;
}

/// Loads a catalog from a JSON array of `{sku, name, threshold}` objects.
#[derive(Debug, Clone)]
pub struct JsonCatalogLoader {
    document: String,
}

impl JsonCatalogLoader {
    pub fn from_json(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    pub fn from_reader(mut reader: impl Read) -> DomainResult<Self> {
        let mut document = String::new();
        reader
            .read_to_string(&mut document)
            .map_err(|e| DomainError::validation(format!("failed to read catalog: {e}")))?;
        Ok(Self { document })
    }
}

impl CatalogLoader for JsonCatalogLoader {
    fn load(&self) -> DomainResult<Catalog> {
        let items: Vec<CatalogItem> = serde_json::from_str(&self.document)
            .map_err(|e| DomainError::validation(format!("malformed catalog: {e}")))?;
        let catalog = Catalog::new(items)?;
        tracing::debug!(items = catalog.len(), "catalog loaded");
        Ok(catalog)
    }
}
