//! Domain ports.
//!
//! Driving ports (`LoadCommand`, `LoadQuery`, `UserAdmin`, `LoginService`,
//! `Comments`, `Reports`) are called by inbound adapters. Driven ports
//! (repositories, the event hub and the password hasher) are implemented by
//! outbound adapters.

mod comment_repository;
mod comments;
mod load_events;
mod load_repository;
mod loads;
mod macros;
mod password_hasher;
mod reports;
mod user_admin;
mod user_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
pub use comments::Comments;
#[cfg(test)]
pub use load_events::MockLoadEventPublisher;
pub use load_events::{LoadEventPublisher, LoadEventSource, LoadFeedItem, LoadSubscription};
#[cfg(test)]
pub use load_repository::MockLoadRepository;
pub use load_repository::{LoadPersistenceError, LoadRepository};
pub use loads::{AssigneeFilter, LoadCommand, LoadPage, LoadQuery, PAGE_SIZE};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use reports::{Dashboard, Reports};
#[cfg(test)]
pub use user_admin::{MockLoginService, MockUserAdmin};
pub use user_admin::{LoginService, UserAdmin};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
