//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: `RwLock`-guarded repositories used when no database is
//!   configured and throughout the tests
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **events**: in-process broadcast hub for load change notifications
//! - **password**: Argon2 password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod events;
pub mod memory;
pub mod password;
pub mod persistence;
