//! In-memory repository adapters.
//!
//! State lives in `tokio::sync::RwLock`-guarded maps and is lost on restart.
//! The server falls back to these adapters when no database URL is
//! configured; tests use them as realistic collaborators.

mod comments;
mod loads;
mod users;

pub use comments::InMemoryCommentRepository;
pub use loads::InMemoryLoadRepository;
pub use users::InMemoryUserRepository;
