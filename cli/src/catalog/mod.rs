//! Catalog Core
//!
//! This module holds the catalog state-synchronization core, independent of
//! any terminal or HTTP concerns:
//!
//! - `model`: Category / Subcategory / Product shapes and their cascading keys
//! - `error`: the error taxonomy surfaced to controllers
//! - `form`: outgoing form payloads (fields plus an optional image upload)
//! - `store`: the `CatalogStore` seam and the typed `Repository` facade
//! - `memory`: an in-process `CatalogStore` used by demo mode and tests
//! - `refresh`: the shared refresh signal list views subscribe to

pub mod error;
pub mod form;
pub mod memory;
pub mod model;
pub mod refresh;
pub mod store;

pub use error::CatalogError;
pub use form::{FormPayload, ImageUpload};
pub use memory::MemoryStore;
pub use model::{
    display_image, filter_by_name, format_price, CatalogEntity, Category, EntityId, EntityKind,
    Prefill, Product, Status, Subcategory, PLACEHOLDER_IMAGE,
};
pub use refresh::{RefreshSignal, RefreshSubscription};
pub use store::{Catalog, CatalogStore, Repository};
