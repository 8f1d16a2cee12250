//! Domain primitives, policies and services.
//!
//! Purpose: define strongly typed entities (users, loads, comments), the
//! access policy and status state machine, the pure view projections, and
//! the services behind the driving ports. Nothing here knows about HTTP,
//! WebSockets or SQL; adapters talk to the domain through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Role, Load, LoadStatus, Comment: entities and value types.
//! - authorize / Actor: the role and ownership policy.
//! - kanban, daily_allocation, personal_dashboard: read-only projections.
//! - LoadService, UserService, CommentService, ReportService: port
//!   implementations over the repository ports.

pub mod access;
pub mod auth;
pub mod bootstrap;
pub mod change;
pub mod comment;
pub mod comment_service;
pub mod error;
pub mod export;
pub mod ids;
pub mod load;
pub mod load_service;
pub mod ports;
pub mod projection;
pub mod report_service;
pub(crate) mod service_support;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::access::{AccessDenied, Action, Actor, authorize, authorize_update};
pub use self::auth::{LoginCredentials, LoginValidationError, Password, PasswordHash};
pub use self::bootstrap::{AdminSeed, ensure_default_admin};
pub use self::change::{ChangeKind, LoadChange};
pub use self::comment::{COMMENT_MAX, Comment, CommentBody, CommentValidationError};
pub use self::comment_service::CommentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::export::{
    ExportFilter, ExportKind, ExportReport, ExportRow, UNASSIGNED, build_report,
};
pub use self::ids::{CommentId, IdParseError, LoadId, UserId};
pub use self::load::{
    CLIENT_NAME_MAX, CLIENT_NUMBER_MAX, ClientName, ClientNumber, EmployeeCount, Load, LoadDraft,
    LoadPatch, LoadStatus, LoadValidationError, TransitionPolicy,
};
pub use self::load_service::LoadService;
pub use self::projection::{
    AllTimeStats, AllocationRow, BoardScope, DailyAllocationSummary, KanbanColumn,
    PersonalDashboard, StatusCounts, TodayStats, by_recency, completed_window, daily_allocation,
    kanban, my_loads, personal_dashboard, within_completed_window,
};
pub use self::report_service::ReportService;
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, Role, USER_NAME_MAX, User, UserDraft, UserName, UserPatch, UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use loadboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
