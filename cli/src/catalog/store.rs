//! Store seam and repositories.
//!
//! `CatalogStore` is the one place the core talks to the remote source of
//! truth. `Catalog` pairs a store with the refresh signal so that every
//! mutation invalidates mounted lists, and `Repository<E>` is the typed view
//! a list controller works through.

use super::error::CatalogError;
use super::form::FormPayload;
use super::model::{CatalogEntity, EntityId, EntityKind};
use super::refresh::RefreshSignal;
use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Raw records of `kind` in store order. `parent` narrows subcategories
    /// to one owning category.
    async fn list(
        &self,
        kind: EntityKind,
        parent: Option<&EntityId>,
    ) -> Result<Vec<Value>, CatalogError>;

    async fn create(&self, kind: EntityKind, form: &FormPayload) -> Result<(), CatalogError>;

    /// Partial update: fields absent from `form` stay as they are.
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        form: &FormPayload,
    ) -> Result<(), CatalogError>;

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), CatalogError>;
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    signal: RefreshSignal,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>, signal: RefreshSignal) -> Self {
        Self { store, signal }
    }

    pub fn signal(&self) -> &RefreshSignal {
        &self.signal
    }

    pub fn repository<E: CatalogEntity>(&self) -> Repository<E> {
        Repository {
            catalog: self.clone(),
            _entity: PhantomData,
        }
    }

    pub async fn list<E: CatalogEntity>(
        &self,
        parent: Option<&EntityId>,
    ) -> Result<Vec<E>, CatalogError> {
        let records = self.store.list(E::KIND, parent).await?;
        Ok(decode_all(records))
    }

    pub async fn create(&self, kind: EntityKind, form: &FormPayload) -> Result<(), CatalogError> {
        self.store.create(kind, form).await?;
        tracing::info!(kind = kind.path(), "created");
        self.signal.toggle();
        Ok(())
    }

    pub async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        form: &FormPayload,
    ) -> Result<(), CatalogError> {
        self.store.update(kind, id, form).await?;
        tracing::info!(kind = kind.path(), id = %id, "updated");
        self.signal.toggle();
        Ok(())
    }

    /// Deletes and toggles the signal whether or not the delete went through,
    /// so mounted lists reconcile against the store either way.
    pub async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), CatalogError> {
        let result = self.store.delete(kind, id).await;
        match &result {
            Ok(()) => tracing::info!(kind = kind.path(), id = %id, "deleted"),
            Err(e) => tracing::warn!(kind = kind.path(), id = %id, error = %e, "delete failed"),
        }
        self.signal.toggle();
        result
    }
}

fn decode_all<E: CatalogEntity>(records: Vec<Value>) -> Vec<E> {
    records
        .into_iter()
        .filter_map(|record| match E::decode(record) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(kind = E::KIND.path(), error = %e, "skipping undecodable record");
                None
            }
        })
        .collect()
}

/// Typed facade over `Catalog` for one entity kind.
pub struct Repository<E> {
    catalog: Catalog,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: CatalogEntity> Repository<E> {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn list(&self) -> Result<Vec<E>, CatalogError> {
        self.catalog.list::<E>(None).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CatalogError> {
        self.catalog.delete(E::KIND, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryStore;
    use crate::catalog::model::{Category, Status};

    fn catalog() -> (Catalog, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Catalog::new(store.clone(), RefreshSignal::new()), store)
    }

    #[tokio::test]
    async fn created_category_is_listed_with_defaults() {
        let (catalog, _) = catalog();

        catalog
            .create(EntityKind::Category, &FormPayload::new().field("name", "Shoes"))
            .await
            .unwrap();

        let listed = catalog.repository::<Category>().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Shoes");
        assert_eq!(listed[0].status, Status::Active);
        assert_eq!(listed[0].image, None);
    }

    #[tokio::test]
    async fn successful_mutation_toggles_once() {
        let (catalog, _) = catalog();
        let mut sub = catalog.signal().subscribe();

        catalog
            .create(EntityKind::Category, &FormPayload::new().field("name", "Hats"))
            .await
            .unwrap();

        assert!(sub.take_pending());
        assert!(catalog.signal().value());
    }

    #[tokio::test]
    async fn rejected_create_does_not_toggle() {
        let (catalog, _) = catalog();
        catalog
            .create(EntityKind::Category, &FormPayload::new().field("name", "Hats"))
            .await
            .unwrap();

        let mut sub = catalog.signal().subscribe();
        let err = catalog
            .create(EntityKind::Category, &FormPayload::new().field("name", "hats"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation { .. }));
        assert!(!sub.take_pending());
    }

    #[tokio::test]
    async fn failed_delete_still_toggles() {
        let (catalog, _) = catalog();
        let mut sub = catalog.signal().subscribe();
        let repo = catalog.repository::<Category>();

        let err = repo.delete(&EntityId::new("missing")).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(sub.take_pending());
    }

    #[tokio::test]
    async fn undecodable_records_are_skipped() {
        let (catalog, store) = catalog();
        store.insert_raw(
            EntityKind::Category,
            serde_json::json!({ "name": "no id here" }),
        );
        store.insert_raw(
            EntityKind::Category,
            serde_json::json!({ "_id": "ok", "name": "Fine" }),
        );

        let listed = catalog.repository::<Category>().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Fine");
    }
}
