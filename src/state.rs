//! Shared application state: one record store per entity.

use crate::model::{Customer, Pet, Product, Staff};
use crate::store::{InMemoryStore, PetStore, PgRecordStore, ProductStore, RecordStore, StaffStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn RecordStore<Customer>>,
    pub pets: Arc<dyn PetStore>,
    pub products: Arc<dyn ProductStore>,
    pub staff: Arc<dyn StaffStore>,
}

impl AppState {
    /// Stores backed by tables under `schema`.
    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        Self {
            customers: Arc::new(PgRecordStore::<Customer>::new(pool.clone(), schema)),
            pets: Arc::new(PgRecordStore::<Pet>::new(pool.clone(), schema)),
            products: Arc::new(PgRecordStore::<Product>::new(pool.clone(), schema)),
            staff: Arc::new(PgRecordStore::<Staff>::new(pool, schema)),
        }
    }

    /// Empty process-local stores.
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(InMemoryStore::<Customer>::new()),
            pets: Arc::new(InMemoryStore::<Pet>::new()),
            products: Arc::new(InMemoryStore::<Product>::new()),
            staff: Arc::new(InMemoryStore::<Staff>::new()),
        }
    }
}
