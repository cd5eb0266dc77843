pub mod error;
pub mod manager;
pub mod mapper;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod statement;
pub mod transaction;

use sqlx::migrate::Migrator;

pub use error::RepositoryError;
pub use manager::{DatabaseError, DatabaseManager, QuerySettings};
pub use pagination::FetchParams;
pub use repository::{Entity, Repository};
pub use transaction::{TransactionCoordinator, Tx};

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();
