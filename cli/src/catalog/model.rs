//! Catalog entity shapes.
//!
//! Records arrive from the store as JSON objects; each entity decodes its own
//! record and exposes the handful of accessors list views and editors need.
//! The cascading keys are `Subcategory -> Category` and
//! `Product -> Category / Subcategory`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Shown for entities that carry no image. Display only, never stored.
pub const PLACEHOLDER_IMAGE: &str =
    "https://rakanonline.com/wp-content/uploads/2022/08/default-product-image.png";

/// Opaque, store-assigned identifier.
///
/// The store hands out both string and numeric ids; both are kept as text and
/// never compared for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => EntityId(text),
            Raw::Number(number) => EntityId(number.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    pub fn toggled(self) -> Status {
        match self {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(D::Error::custom(format!("unknown status `{}`", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Category,
    Subcategory,
    Product,
}

impl EntityKind {
    /// Path segment of the store endpoint for this kind.
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Subcategory => "subcategory",
            EntityKind::Product => "product",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Category => "Category",
            EntityKind::Subcategory => "Subcategory",
            EntityKind::Product => "Product",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of an existing entity used to seed an editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefill {
    pub id: EntityId,
    pub name: String,
    pub status: Status,
    pub image: Option<String>,
    pub price: Option<String>,
    pub category: Option<EntityId>,
    pub category_name: Option<String>,
    pub subcategory: Option<EntityId>,
}

impl Prefill {
    fn new(id: &EntityId, name: &str, status: Status, image: Option<&str>) -> Self {
        Prefill {
            id: id.clone(),
            name: name.to_string(),
            status,
            image: image.map(str::to_string),
            price: None,
            category: None,
            category_name: None,
            subcategory: None,
        }
    }
}

pub trait CatalogEntity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn decode(record: Value) -> Result<Self, serde_json::Error>;

    fn id(&self) -> &EntityId;
    fn name(&self) -> &str;
    fn status(&self) -> Status;
    fn image(&self) -> Option<&str>;
    fn prefill(&self) -> Prefill;

    /// Column headers shown between the name and image columns.
    fn extra_columns() -> &'static [&'static str] {
        &[]
    }

    fn extra_cells(&self) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub image: Option<String>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subcategory {
    pub id: EntityId,
    pub name: String,
    pub image: Option<String>,
    pub status: Status,
    pub category_id: Option<EntityId>,
    pub category_name: Option<String>,
}

impl Subcategory {
    /// Whether this subcategory hangs under `category`, matched by id or,
    /// for records that only carry the owner's name, by name.
    pub fn belongs_to(&self, category: &Category) -> bool {
        self.category_id.as_ref() == Some(&category.id)
            || self.category_name.as_deref() == Some(category.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub image: Option<String>,
    /// Price in cents.
    pub price: Option<i64>,
    pub status: Status,
    pub category_id: Option<EntityId>,
    pub subcategory_id: Option<EntityId>,
}

// Wire records

#[derive(Deserialize)]
struct CategoryRecord {
    #[serde(rename = "_id", default)]
    store_id: Option<EntityId>,
    #[serde(default)]
    id: Option<EntityId>,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    status: Status,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubcategoryRecord {
    #[serde(rename = "_id", default)]
    store_id: Option<EntityId>,
    #[serde(default)]
    id: Option<EntityId>,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    category_id: Option<EntityId>,
    #[serde(default)]
    category_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    #[serde(rename = "_id", default)]
    store_id: Option<EntityId>,
    #[serde(default)]
    id: Option<EntityId>,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    price: Option<PriceValue>,
    #[serde(default)]
    status: Status,
    #[serde(default)]
    category_id: Option<EntityId>,
    #[serde(default)]
    subcategory_id: Option<EntityId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn cents(&self) -> Option<i64> {
        let value = match self {
            PriceValue::Number(n) => *n,
            PriceValue::Text(t) => t.trim().parse().ok()?,
        };
        Some((value * 100.0).round() as i64)
    }
}

fn resolve_id(
    store_id: Option<EntityId>,
    id: Option<EntityId>,
) -> Result<EntityId, serde_json::Error> {
    store_id
        .or(id)
        .ok_or_else(|| serde_json::Error::custom("record carries neither `_id` nor `id`"))
}

fn non_empty(image: Option<String>) -> Option<String> {
    image.filter(|i| !i.trim().is_empty())
}

impl CatalogEntity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn decode(record: Value) -> Result<Self, serde_json::Error> {
        let r: CategoryRecord = serde_json::from_value(record)?;
        Ok(Category {
            id: resolve_id(r.store_id, r.id)?,
            name: r.name,
            image: non_empty(r.image),
            status: r.status,
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn prefill(&self) -> Prefill {
        Prefill::new(&self.id, &self.name, self.status, self.image())
    }
}

impl CatalogEntity for Subcategory {
    const KIND: EntityKind = EntityKind::Subcategory;

    fn decode(record: Value) -> Result<Self, serde_json::Error> {
        let r: SubcategoryRecord = serde_json::from_value(record)?;
        Ok(Subcategory {
            id: resolve_id(r.store_id, r.id)?,
            name: r.name,
            image: non_empty(r.image),
            status: r.status,
            category_id: r.category_id,
            category_name: r.category_name,
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn prefill(&self) -> Prefill {
        Prefill {
            category: self.category_id.clone(),
            category_name: self.category_name.clone(),
            ..Prefill::new(&self.id, &self.name, self.status, self.image())
        }
    }

    fn extra_columns() -> &'static [&'static str] {
        &["Category"]
    }

    fn extra_cells(&self) -> Vec<String> {
        let owner = self
            .category_name
            .clone()
            .or_else(|| self.category_id.as_ref().map(EntityId::to_string))
            .unwrap_or_default();
        vec![owner]
    }
}

impl CatalogEntity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn decode(record: Value) -> Result<Self, serde_json::Error> {
        let r: ProductRecord = serde_json::from_value(record)?;
        Ok(Product {
            id: resolve_id(r.store_id, r.id)?,
            name: r.name,
            image: non_empty(r.image),
            price: r.price.as_ref().and_then(PriceValue::cents),
            status: r.status,
            category_id: r.category_id,
            subcategory_id: r.subcategory_id,
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn prefill(&self) -> Prefill {
        Prefill {
            price: self.price.map(format_price),
            category: self.category_id.clone(),
            subcategory: self.subcategory_id.clone(),
            ..Prefill::new(&self.id, &self.name, self.status, self.image())
        }
    }

    fn extra_columns() -> &'static [&'static str] {
        &["Price", "Category", "Subcategory"]
    }

    fn extra_cells(&self) -> Vec<String> {
        let key = |id: &Option<EntityId>| id.as_ref().map(EntityId::to_string).unwrap_or_default();
        vec![
            self.price.map(format_price).unwrap_or_default(),
            key(&self.category_id),
            key(&self.subcategory_id),
        ]
    }
}

/// Case-insensitive substring match over names, keeping store order.
pub fn filter_by_name<'a, E: CatalogEntity>(items: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| needle.is_empty() || item.name().to_lowercase().contains(&needle))
        .collect()
}

/// Resolve an image reference for display against the store's base URL.
pub fn display_image(image: Option<&str>, base_url: &str, placeholder: &str) -> String {
    match image {
        Some(path) if path.starts_with("http://") || path.starts_with("https://") => {
            path.to_string()
        }
        Some(path) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => placeholder.to_string(),
    }
}

pub fn format_price(cents: i64) -> String {
    let whole = cents / 100;
    let fraction = (cents % 100).abs();
    if cents < 0 {
        format!("-{}.{:02}", whole.abs(), fraction)
    } else {
        format!("{}.{:02}", whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(name: &str) -> Category {
        Category {
            id: EntityId::new(name.to_lowercase()),
            name: name.to_string(),
            image: None,
            status: Status::Active,
        }
    }

    #[test]
    fn store_id_wins_over_numeric_id() {
        let c = Category::decode(json!({
            "_id": "65f1c0",
            "id": 7,
            "name": "Shoes",
            "status": "active"
        }))
        .unwrap();
        assert_eq!(c.id, EntityId::new("65f1c0"));
        assert_eq!(c.status, Status::Active);
        assert_eq!(c.image, None);
    }

    #[test]
    fn numeric_id_is_kept_opaque() {
        let c = Category::decode(json!({ "id": 42, "name": "Hats" })).unwrap();
        assert_eq!(c.id.as_str(), "42");
        assert_eq!(c.status, Status::Active);
    }

    #[test]
    fn record_without_any_id_is_rejected() {
        assert!(Category::decode(json!({ "name": "Orphan" })).is_err());
    }

    #[test]
    fn empty_image_counts_as_absent() {
        let c = Category::decode(json!({ "_id": "1", "name": "Bags", "image": "" })).unwrap();
        assert_eq!(c.image(), None);
    }

    #[test]
    fn status_is_case_insensitive_and_closed() {
        let c = Category::decode(json!({ "_id": "1", "name": "A", "status": "Inactive" }))
            .unwrap();
        assert_eq!(c.status, Status::Inactive);
        assert!(Category::decode(json!({ "_id": "1", "name": "A", "status": "archived" }))
            .is_err());
    }

    #[test]
    fn product_price_accepts_number_or_text() {
        let p = Product::decode(json!({
            "_id": "p1", "name": "Sneaker", "price": 49.9,
            "categoryId": "c1", "subcategoryId": "s1"
        }))
        .unwrap();
        assert_eq!(p.price, Some(4990));
        assert_eq!(p.prefill().price.as_deref(), Some("49.90"));

        let p = Product::decode(json!({ "_id": "p2", "name": "Boot", "price": "12" })).unwrap();
        assert_eq!(p.price, Some(1200));
    }

    #[test]
    fn subcategory_belongs_by_id_or_name() {
        let shoes = category("Shoes");
        let by_id = Subcategory::decode(json!({
            "_id": "s1", "name": "Sneakers", "categoryId": "shoes"
        }))
        .unwrap();
        let by_name = Subcategory::decode(json!({
            "_id": "s2", "name": "Boots", "categoryName": "Shoes"
        }))
        .unwrap();
        let other = Subcategory::decode(json!({
            "_id": "s3", "name": "Caps", "categoryId": "hats", "categoryName": "Hats"
        }))
        .unwrap();

        assert!(by_id.belongs_to(&shoes));
        assert!(by_name.belongs_to(&shoes));
        assert!(!other.belongs_to(&shoes));
    }

    #[test]
    fn search_is_case_insensitive_and_keeps_order() {
        let items = vec![category("Shoes"), category("Hats"), category("Shorts")];
        let names: Vec<&str> = filter_by_name(&items, "sho").iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Shoes", "Shorts"]);

        let names: Vec<&str> = filter_by_name(&items, "SHO").iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Shoes", "Shorts"]);

        assert_eq!(filter_by_name(&items, "").len(), 3);
        assert!(filter_by_name(&items, "zzz").is_empty());
    }

    #[test]
    fn missing_image_displays_placeholder() {
        assert_eq!(
            display_image(None, "http://store", PLACEHOLDER_IMAGE),
            PLACEHOLDER_IMAGE
        );
        assert_eq!(
            display_image(Some("uploads/a.png"), "http://store/", PLACEHOLDER_IMAGE),
            "http://store/uploads/a.png"
        );
        assert_eq!(
            display_image(Some("https://cdn/x.png"), "http://store", PLACEHOLDER_IMAGE),
            "https://cdn/x.png"
        );
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(4990), "49.90");
        assert_eq!(format_price(5), "0.05");
        assert_eq!(format_price(-150), "-1.50");
    }
}
