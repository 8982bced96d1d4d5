//! `shelfwatch-core` — shared primitives for shelf monitoring.
//!
//! This crate contains **pure** building blocks (no IO beyond parsing a
//! catalog document handed to it).

pub mod catalog;
pub mod entity;
pub mod error;
pub mod id;

pub use catalog::{Catalog, CatalogItem, CatalogLoader, JsonCatalogLoader};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AlertId, SessionId, Sku};
