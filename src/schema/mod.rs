//! Session metadata schema
//!
//! Typed view of the YAML session-info block embedded in every IBT file, plus the flat
//! [`SessionInfo`] summary derived from it.

pub mod session;

pub use session::{SessionDocument, SessionInfo, SessionType};
