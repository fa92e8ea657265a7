//! Entity model: validated records and their derived values.
//!
//! Each entity has two entry points. `parse_validated` builds it from decoded
//! request fields and runs every field check; [`Record::revive_from_storage`]
//! rebuilds it from a stored row without checks, so legacy rows still load.
//! Only the record stores call the latter.

mod customer;
mod fields;
mod pet;
mod product;
mod staff;

pub use customer::Customer;
pub use pet::Pet;
pub use product::{Availability, Product, MAX_PRICE};
pub use staff::{Role, Staff, StaffProfile};

use crate::store::StorageRow;

/// A persistable entity and its storage row shape.
pub trait Record: Clone + Send + Sync + 'static {
    type Row: StorageRow;

    /// Entity name used in messages, e.g. "Customer".
    const ENTITY: &'static str;

    fn id(&self) -> Option<i32>;

    /// Row for writing. Unpersisted records carry key 0.
    fn to_row(&self) -> Self::Row;

    /// Rebuild from a stored row. Performs no validation.
    fn revive_from_storage(row: Self::Row) -> Self;
}
