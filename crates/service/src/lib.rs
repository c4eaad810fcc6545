//! Client-side state for attendify
//!
//! Paginated list views, session lifecycle, route guards, the group
//! wizard and member dialog, and the calendar adapter. Nothing here
//! renders; front ends read snapshots and drive the state machines.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

pub mod calendar;
mod error;
pub mod group_wizard;
mod groups;
pub mod guard;
pub mod list_view;
pub mod member_dialog;
mod notify;
pub mod session;
pub mod table;

pub use calendar::{CalendarEntry, CalendarRange};
pub use error::{ServiceError, ValidationErrors};
pub use group_wizard::{CloseRequest, GroupDraft, GroupWizard, WizardMode, WizardStep};
pub use groups::GroupWorkflows;
pub use guard::{GuardDecision, MenuItem};
pub use list_view::{Applied, ListSnapshot, ListView, ListViewController, RequestToken, ViewLocation};
pub use member_dialog::{MemberDialog, MemberDialogState};
pub use notify::{Notice, NoticeLevel, NoticeLog, Notifier};
pub use session::{CallbackOutcome, SessionContext, SessionState};
pub use table::{CellValue, ColumnDescriptor, PaginationFooter, RenderedRow, TableBody, TableModel};
