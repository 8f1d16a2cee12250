//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin: they translate between the row structs in
//! `models.rs` and domain types, and map driver failures onto the port error
//! enums. Connections come from a `bb8` pool over `diesel-async`; the schema
//! is created by embedded migrations at start-up.
//!
//! ```ignore
//! use loadboard::outbound::persistence::{DbPool, DieselLoadRepository, PoolConfig};
//!
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let loads = DieselLoadRepository::new(pool.clone());
//! ```

mod diesel_comment_repository;
mod diesel_load_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_load_repository::DieselLoadRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
