//! Pet shop backend: validated domain model, flat JSON codec and REST
//! resources over a record store.

pub mod codec;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod settings;
pub mod state;
pub mod store;
pub mod validation;

pub use error::{AppError, ConfigError, DecodeError, NotFoundError, ValidationError};
pub use handlers::dispatch;
pub use model::{Availability, Customer, Pet, Product, Record, Role, Staff, StaffProfile};
pub use response::ApiResponse;
pub use routes::{api_routes, app, common_routes};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, InMemoryStore, PgRecordStore, RecordStore};
