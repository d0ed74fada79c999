//! Cell-wide super-user authorization gate.
//!
//! Decides, for an authenticated RPC call, whether the caller may perform
//! administrative operations on the server: via the no-auth override, a
//! legacy ticket principal matched against the allow-list, or a token
//! identity looked up directly.

pub mod audit;
pub mod call;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod matcher;
pub mod noauth;
pub mod realm;
pub mod userlist;

pub use audit::{AuditEvent, AuditSink, RecordingAudit, TracingAudit};
pub use call::{CallSecurity, SecurityClass, TicketInfo, TokenInfo};
pub use config::{CellConfig, GateConfig};
pub use error::{ExtractionError, FormatError, ParseError, RealmError, StoreError, StoreResult};
pub use gate::{RestrictedQuery, SuperUserGate, PERMISSION_DENIED_CODE};
pub use identity::Identity;
pub use noauth::NoAuthFlag;
pub use realm::{LocalRealms, RealmResolver};
pub use userlist::{ListFilter, UserList};
