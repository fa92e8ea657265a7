//! Record stores: keyed CRUD plus the indexed lookups each entity needs.
//!
//! Stores hand back entities rebuilt with [`Record::revive_from_storage`];
//! validation is the caller's business.

mod memory;
mod postgres;
mod rows;
pub mod schema;

pub use memory::InMemoryStore;
pub use postgres::{PgRecord, PgRecordStore, RowQuery};
pub use rows::{CustomerRow, PetRow, ProductRow, StaffRow, StorageRow};
pub use schema::{ensure_database_exists, ensure_tables};

use crate::error::{AppError, ValidationError};
use crate::model::{Pet, Product, Record, Role, Staff};
use async_trait::async_trait;

#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Persist a new record under a generated key and return it as stored.
    /// Any key already on the record is ignored.
    async fn insert(&self, record: &T) -> Result<T, AppError>;

    /// `AppError::NotFound` when no record has `id`.
    async fn find_by_id(&self, id: i32) -> Result<T, AppError>;

    /// All records ordered by name.
    async fn list_all(&self) -> Result<Vec<T>, AppError>;

    /// Replace the record with the same key. The registration timestamp of
    /// the stored record is kept.
    async fn update(&self, record: &T) -> Result<T, AppError>;

    /// `false` when nothing had `id`.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait PetStore: RecordStore<Pet> {
    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Pet>, AppError>;
}

#[async_trait]
pub trait StaffStore: RecordStore<Staff> {
    async fn find_by_role(&self, role: Role) -> Result<Vec<Staff>, AppError>;
}

#[async_trait]
pub trait ProductStore: RecordStore<Product> {
    /// Matched against the upper-cased, trimmed category.
    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError>;
}

/// Key a record must carry to be updated.
pub(crate) fn update_key<T: Record>(record: &T) -> Result<i32, AppError> {
    record
        .id()
        .ok_or_else(|| AppError::BadRequest(format!("{} id is required for update", T::ENTITY)))
}

pub(crate) fn normalize_category(category: &str) -> Result<String, AppError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::new("categoria", "must not be blank").into());
    }
    Ok(category.to_uppercase())
}

pub(crate) fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
