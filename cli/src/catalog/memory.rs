//! In-process catalog store.
//!
//! Behaves like the remote store closely enough to drive the controllers
//! without a server: store-assigned ids, insertion order, duplicate-name
//! rejection, cascading-key checks and partial updates. Every mutation it
//! receives is recorded, accepted or not.

use super::error::CatalogError;
use super::form::FormPayload;
use super::model::{EntityId, EntityKind};
use super::store::CatalogStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create {
        kind: EntityKind,
        form: FormPayload,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        form: FormPayload,
    },
    Delete {
        kind: EntityKind,
        id: EntityId,
    },
}

#[derive(Default)]
struct State {
    tables: HashMap<EntityKind, Vec<Record>>,
    next_id: u64,
    mutations: Vec<Mutation>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog for demo mode.
    pub fn seeded() -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.lock() {
            let seed = [
                (EntityKind::Category, vec![("name", "Shoes")]),
                (EntityKind::Category, vec![("name", "Hats")]),
                (
                    EntityKind::Subcategory,
                    vec![("name", "Sneakers"), ("categoryId", "mem-1")],
                ),
                (
                    EntityKind::Subcategory,
                    vec![("name", "Boots"), ("categoryId", "mem-1")],
                ),
                (
                    EntityKind::Subcategory,
                    vec![("name", "Caps"), ("categoryId", "mem-2")],
                ),
                (
                    EntityKind::Product,
                    vec![
                        ("name", "Runner 2"),
                        ("price", "89.90"),
                        ("categoryId", "mem-1"),
                        ("subcategoryId", "mem-3"),
                    ],
                ),
                (
                    EntityKind::Product,
                    vec![
                        ("name", "Trail Boot"),
                        ("price", "129"),
                        ("categoryId", "mem-1"),
                        ("subcategoryId", "mem-4"),
                    ],
                ),
            ];
            for (kind, fields) in seed {
                let form = fields
                    .into_iter()
                    .fold(FormPayload::new(), |form, (k, v)| form.field(k, v));
                if let Err(e) = state.insert(kind, &form) {
                    tracing::warn!(kind = kind.path(), error = %e, "demo seed rejected");
                }
            }
        }
        store
    }

    /// Store a record verbatim, bypassing every check.
    pub fn insert_raw(&self, kind: EntityKind, record: Value) {
        if let (Ok(mut state), Value::Object(record)) = (self.lock(), record) {
            state.tables.entry(kind).or_default().push(record);
        }
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.lock().map(|s| s.mutations.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, CatalogError> {
        self.state
            .lock()
            .map_err(|_| CatalogError::transport("memory store lock poisoned"))
    }
}

fn record_id(record: &Record) -> Option<String> {
    let raw = record.get("_id").or_else(|| record.get("id"))?;
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn field_value(key: &str, value: &str) -> Value {
    if key == "price" {
        if let Some(n) = value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
        {
            return Value::Number(n);
        }
    }
    Value::String(value.to_string())
}

impl State {
    fn table(&self, kind: EntityKind) -> &[Record] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn find(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.table(kind)
            .iter()
            .find(|r| record_id(r).as_deref() == Some(id))
    }

    fn insert(&mut self, kind: EntityKind, form: &FormPayload) -> Result<(), CatalogError> {
        self.next_id += 1;
        let mut record = Record::new();
        record.insert("_id".into(), Value::String(format!("mem-{}", self.next_id)));
        record.insert("id".into(), Value::from(self.next_id));
        record.insert("status".into(), Value::String("active".into()));
        self.merge(&mut record, form);

        if let Err(e) = self.check(kind, &record) {
            self.next_id -= 1;
            return Err(e);
        }
        self.tables.entry(kind).or_default().push(record);
        Ok(())
    }

    fn merge(&self, record: &mut Record, form: &FormPayload) {
        for (key, value) in form.fields() {
            record.insert(key.clone(), field_value(key, value));
        }
        if let Some(image) = form.image() {
            record.insert(
                "image".into(),
                Value::String(format!("uploads/{}", image.file_name)),
            );
        }
        // The owner's name travels with the subcategory for display.
        if let Some(owner) = text(record, "categoryId")
            .and_then(|id| self.find(EntityKind::Category, id))
            .and_then(|c| text(c, "name"))
            .map(str::to_string)
        {
            record.insert("categoryName".into(), Value::String(owner));
        }
    }

    /// Name presence, name uniqueness and cascading references.
    fn check(&self, kind: EntityKind, candidate: &Record) -> Result<(), CatalogError> {
        let name = text(candidate, "name").unwrap_or_default().trim();
        if name.is_empty() {
            return Err(CatalogError::validation("name", "Name is required"));
        }
        let own_id = record_id(candidate);
        let duplicate = self.table(kind).iter().any(|r| {
            record_id(r) != own_id
                && text(r, "name").is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        });
        if duplicate {
            return Err(CatalogError::validation(
                "name",
                format!("{} `{}` already exists", kind, name),
            ));
        }

        if kind == EntityKind::Category {
            return Ok(());
        }

        let category = text(candidate, "categoryId")
            .and_then(|id| self.find(EntityKind::Category, id))
            .ok_or_else(|| CatalogError::validation("category", "Category does not exist"))?;

        if kind == EntityKind::Product {
            let subcategory = text(candidate, "subcategoryId")
                .and_then(|id| self.find(EntityKind::Subcategory, id))
                .ok_or_else(|| {
                    CatalogError::validation("subcategory", "Subcategory does not exist")
                })?;
            if text(subcategory, "categoryId") != record_id(category).as_deref() {
                return Err(CatalogError::validation(
                    "subcategory",
                    "Subcategory does not belong to the chosen category",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list(
        &self,
        kind: EntityKind,
        parent: Option<&EntityId>,
    ) -> Result<Vec<Value>, CatalogError> {
        let state = self.lock()?;
        Ok(state
            .table(kind)
            .iter()
            .filter(|r| parent.map_or(true, |p| text(r, "categoryId") == Some(p.as_str())))
            .cloned()
            .map(Value::Object)
            .collect())
    }

    async fn create(&self, kind: EntityKind, form: &FormPayload) -> Result<(), CatalogError> {
        let mut state = self.lock()?;
        state.mutations.push(Mutation::Create {
            kind,
            form: form.clone(),
        });
        state.insert(kind, form)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        form: &FormPayload,
    ) -> Result<(), CatalogError> {
        let mut state = self.lock()?;
        state.mutations.push(Mutation::Update {
            kind,
            id: id.clone(),
            form: form.clone(),
        });

        let mut candidate = state
            .find(kind, id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                kind,
                id: id.clone(),
            })?;
        state.merge(&mut candidate, form);
        state.check(kind, &candidate)?;

        if let Some(slot) = state
            .tables
            .get_mut(&kind)
            .and_then(|t| t.iter_mut().find(|r| record_id(r).as_deref() == Some(id.as_str())))
        {
            *slot = candidate;
        }
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), CatalogError> {
        let mut state = self.lock()?;
        state.mutations.push(Mutation::Delete {
            kind,
            id: id.clone(),
        });

        let table = state.tables.entry(kind).or_default();
        let before = table.len();
        table.retain(|r| record_id(r).as_deref() != Some(id.as_str()));
        if table.len() == before {
            return Err(CatalogError::NotFound {
                kind,
                id: id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::form::ImageUpload;

    fn form(fields: &[(&str, &str)]) -> FormPayload {
        fields
            .iter()
            .fold(FormPayload::new(), |f, (k, v)| f.field(k, *v))
    }

    #[tokio::test]
    async fn assigns_ids_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        for name in ["Shoes", "Hats", "Shorts"] {
            store
                .create(EntityKind::Category, &form(&[("name", name)]))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list(EntityKind::Category, None)
            .await
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Shoes", "Hats", "Shorts"]);
    }

    #[tokio::test]
    async fn rejects_subcategory_under_unknown_category() {
        let store = MemoryStore::new();
        let err = store
            .create(
                EntityKind::Subcategory,
                &form(&[("name", "Sneakers"), ("categoryId", "nope")]),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::validation("category", "Category does not exist")
        );
        assert_eq!(store.mutations().len(), 1);
    }

    #[tokio::test]
    async fn rejects_product_with_foreign_subcategory() {
        let store = MemoryStore::seeded();
        // mem-5 (Caps) belongs to Hats, not Shoes.
        let err = store
            .create(
                EntityKind::Product,
                &form(&[
                    ("name", "Odd"),
                    ("categoryId", "mem-1"),
                    ("subcategoryId", "mem-5"),
                ]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "subcategory"));
    }

    #[tokio::test]
    async fn update_leaves_omitted_fields_alone() {
        let store = MemoryStore::new();
        let upload = ImageUpload {
            file_name: "shoe.png".into(),
            bytes: vec![0],
        };
        store
            .create(
                EntityKind::Category,
                &form(&[("name", "Shoes")]).with_image(upload),
            )
            .await
            .unwrap();

        store
            .update(
                EntityKind::Category,
                &EntityId::new("mem-1"),
                &form(&[("name", "Footwear")]),
            )
            .await
            .unwrap();

        let records = store.list(EntityKind::Category, None).await.unwrap();
        assert_eq!(records[0]["name"], "Footwear");
        assert_eq!(records[0]["image"], "uploads/shoe.png");
        assert_eq!(records[0]["status"], "active");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_are_not_found() {
        let store = MemoryStore::new();
        let id = EntityId::new("ghost");
        assert!(store
            .update(EntityKind::Product, &id, &form(&[("name", "x")]))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .delete(EntityKind::Product, &id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn lists_subcategories_within_a_category() {
        let store = MemoryStore::seeded();
        let within = store
            .list(EntityKind::Subcategory, Some(&EntityId::new("mem-1")))
            .await
            .unwrap();
        let names: Vec<&str> = within.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Sneakers", "Boots"]);
        assert_eq!(within[0]["categoryName"], "Shoes");
    }
}
