//! Worklog Common Types
//!
//! Shared types used by both the report backend and the web client.

pub mod entry;
pub mod month;

pub use entry::{EntryDraft, ValidationError, WorkEntry};
pub use month::{group_by_month, MonthGroup, ReportMonth};
