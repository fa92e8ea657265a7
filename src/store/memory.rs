//! In-memory record store for tests and local development.

use super::{normalize_category, now, update_key, PetStore, ProductStore, RecordStore, StaffStore, StorageRow};
use crate::error::{AppError, NotFoundError};
use crate::model::{Pet, Product, Record, Role, Staff};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, RwLock};

/// Rows keyed by id behind a `RwLock`. Keys start at 1 and are never reused.
pub struct InMemoryStore<T: Record> {
    rows: Arc<RwLock<BTreeMap<i32, T::Row>>>,
    next_key: Arc<AtomicI32>,
}

impl<T: Record> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            next_key: Arc::clone(&self.next_key),
        }
    }
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_key: Arc::new(AtomicI32::new(1)),
        }
    }

    /// Matching rows revived and ordered by name, then key.
    fn select(&self, keep: impl Fn(&T::Row) -> bool) -> Result<Vec<T>, AppError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| AppError::Storage(format!("failed to acquire read lock: {}", e)))?;
        let mut matched: Vec<&T::Row> = rows.values().filter(|row| keep(row)).collect();
        matched.sort_by(|a, b| a.sort_name().cmp(b.sort_name()).then(a.key().cmp(&b.key())));
        Ok(matched.into_iter().cloned().map(T::revive_from_storage).collect())
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    async fn insert(&self, record: &T) -> Result<T, AppError> {
        let mut row = record.to_row();
        let key = self.next_key.fetch_add(1, Ordering::SeqCst);
        row.set_key(key);
        if row.registered_at().is_none() {
            row.set_registered_at(Some(now()));
        }
        let mut rows = self
            .rows
            .write()
            .map_err(|e| AppError::Storage(format!("failed to acquire write lock: {}", e)))?;
        rows.insert(key, row.clone());
        tracing::debug!(entity = T::ENTITY, key, "inserted");
        Ok(T::revive_from_storage(row))
    }

    async fn find_by_id(&self, id: i32) -> Result<T, AppError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| AppError::Storage(format!("failed to acquire read lock: {}", e)))?;
        rows.get(&id)
            .cloned()
            .map(T::revive_from_storage)
            .ok_or_else(|| NotFoundError { entity: T::ENTITY, id }.into())
    }

    async fn list_all(&self) -> Result<Vec<T>, AppError> {
        self.select(|_| true)
    }

    async fn update(&self, record: &T) -> Result<T, AppError> {
        let key = update_key(record)?;
        let mut rows = self
            .rows
            .write()
            .map_err(|e| AppError::Storage(format!("failed to acquire write lock: {}", e)))?;
        let existing = rows
            .get(&key)
            .ok_or(NotFoundError { entity: T::ENTITY, id: key })?;
        let mut row = record.to_row();
        row.set_registered_at(existing.registered_at().or_else(|| row.registered_at()).or_else(|| Some(now())));
        rows.insert(key, row.clone());
        tracing::debug!(entity = T::ENTITY, key, "updated");
        Ok(T::revive_from_storage(row))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| AppError::Storage(format!("failed to acquire write lock: {}", e)))?;
        Ok(rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.rows
            .read()
            .map(|_| ())
            .map_err(|e| AppError::Storage(format!("failed to acquire read lock: {}", e)))
    }
}

#[async_trait]
impl PetStore for InMemoryStore<Pet> {
    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Pet>, AppError> {
        self.select(|row| row.id_cliente == Some(customer_id))
    }
}

#[async_trait]
impl StaffStore for InMemoryStore<Staff> {
    async fn find_by_role(&self, role: Role) -> Result<Vec<Staff>, AppError> {
        self.select(|row| {
            row.cargo
                .as_deref()
                .is_some_and(|tag| tag.eq_ignore_ascii_case(role.tag()))
        })
    }
}

#[async_trait]
impl ProductStore for InMemoryStore<Product> {
    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        let category = normalize_category(category)?;
        self.select(|row| row.categoria.as_deref() == Some(category.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, StaffProfile};

    fn customer(name: &str) -> Customer {
        Customer::new(name, "52998224725", "ana@example.com").unwrap()
    }

    // === CRUD ===

    #[tokio::test]
    async fn test_insert_assigns_key_and_timestamp() {
        let store = InMemoryStore::<Customer>::new();
        let first = store.insert(&customer("Ana")).await.unwrap();
        let second = store.insert(&customer("Bia")).await.unwrap();
        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
        assert!(first.registered_at().is_some());
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let store = InMemoryStore::<Customer>::new();
        let err = store.find_by_id(99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(NotFoundError { id: 99, .. })));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let store = InMemoryStore::<Customer>::new();
        for name in ["Carlos", "Ana", "Bia"] {
            store.insert(&customer(name)).await.unwrap();
        }
        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, ["Ana", "Bia", "Carlos"]);
    }

    #[tokio::test]
    async fn test_update_keeps_registration_time() {
        let store = InMemoryStore::<Customer>::new();
        let stored = store.insert(&customer("Ana")).await.unwrap();

        let mut changed = customer("Ana Maria");
        changed.set_id(stored.id()).unwrap();
        let updated = store.update(&changed).await.unwrap();
        assert_eq!(updated.name(), "Ana Maria");
        assert_eq!(updated.registered_at(), stored.registered_at());

        changed.set_id(Some(42)).unwrap();
        assert!(matches!(store.update(&changed).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.update(&customer("x")).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = InMemoryStore::<Customer>::new();
        let stored = store.insert(&customer("Ana")).await.unwrap();
        let id = stored.id().unwrap();
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        let next = store.insert(&customer("Bia")).await.unwrap();
        assert_ne!(next.id(), Some(id));
    }

    // === indexed lookups ===

    #[tokio::test]
    async fn test_find_by_customer() {
        let store = InMemoryStore::<Pet>::new();
        store.insert(&Pet::new(1, "Rex", "cao").unwrap()).await.unwrap();
        store.insert(&Pet::new(2, "Mia", "gato").unwrap()).await.unwrap();
        store.insert(&Pet::new(1, "Bob", "cao").unwrap()).await.unwrap();
        let pets = store.find_by_customer(1).await.unwrap();
        let names: Vec<&str> = pets.iter().map(Pet::name).collect();
        assert_eq!(names, ["Bob", "Rex"]);
        assert!(store.find_by_customer(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_role() {
        let store = InMemoryStore::<Staff>::new();
        let profile = StaffProfile::new("Carla", "12345678900", "carla@p.com").unwrap();
        store.insert(&Staff::new(Role::Groomer, profile.clone())).await.unwrap();
        store.insert(&Staff::new(Role::Veterinarian, profile)).await.unwrap();
        let groomers = store.find_by_role(Role::Groomer).await.unwrap();
        assert_eq!(groomers.len(), 1);
        assert_eq!(groomers[0].role(), Role::Groomer);
    }

    #[tokio::test]
    async fn test_find_by_category_normalizes() {
        let store = InMemoryStore::<Product>::new();
        let mut food = Product::new("Racao", 80.0).unwrap();
        food.set_category(Some("racao")).unwrap();
        store.insert(&food).await.unwrap();
        store.insert(&Product::new("Bola", 10.0).unwrap()).await.unwrap();
        assert_eq!(store.find_by_category(" Racao ").await.unwrap().len(), 1);
        assert!(matches!(store.find_by_category("  ").await, Err(AppError::Validation(_))));
    }
}
