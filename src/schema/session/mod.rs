//! # Session Information Parsing
//!
//! Every IBT file embeds a YAML "session-info" block describing the track, the weather, the
//! drivers and the sessions of the event. This module turns that block into typed structures.
//!
//! ## iRacing YAML Compatibility
//!
//! The block is Windows-1252 encoded and contains unquoted free-text values that break standard
//! YAML parsers:
//!
//! ```text
//! // As written by iRacing:
//! UserName: O'Connor, Mike
//! TeamName: "Fast & Furious" Racing
//!
//! // After preprocessing:
//! UserName: 'O''Connor, Mike'
//! TeamName: '"Fast & Furious" Racing'
//! ```
//!
//! ## Two Views
//!
//! - [`SessionDocument`] mirrors the YAML sections (`WeekendInfo`, `SessionInfo`, `DriverInfo`,
//!   `SplitTimeInfo`, `CarSetup`)
//! - [`SessionInfo`] is the flat summary attached to every parsed session: track, car, driver,
//!   session type, weather and sector layout
//!
//! Session metadata is best effort. [`SessionDocument::from_block`] reports failures;
//! [`SessionDocument::from_block_lossy`] logs them and returns an empty document.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ParseError, Result, yaml_utils};

pub mod driver;
pub mod session_data;
pub mod summary;
pub mod timing;
pub mod weekend;

pub use driver::{Driver, DriverInfoData};
pub use session_data::{SessionEntry, SessionInfoData};
pub use summary::{SessionInfo, SessionType};
pub use timing::{Sector, SplitTimeInfo};
pub use weekend::{WeekendInfo, WeekendOptions};

/// Session information parsed from the YAML session-info block.
/// This matches the structure that iRacing writes.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionDocument {
    pub weekend_info: WeekendInfo,
    pub session_info: SessionInfoData,
    pub driver_info: Option<DriverInfoData>,
    pub split_time_info: Option<SplitTimeInfo>,
    /// Car setup tree, kept untyped because it differs per car
    pub car_setup: Option<serde_yaml_ng::Value>,
}

impl SessionDocument {
    /// Parse cleaned YAML.
    ///
    /// The YAML should already be decoded and have its free-text values quoted.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| ParseError::session("SessionDocument deserialization", e.to_string()))
    }

    /// Decode, clean and parse a raw session-info block.
    ///
    /// An empty block yields an empty document.
    pub fn from_block(block: &[u8]) -> Result<Self> {
        let Some(raw) = yaml_utils::decode_session_block(block) else {
            debug!("Session-info block is empty");
            return Ok(Self::default());
        };
        let cleaned = yaml_utils::preprocess_iracing_yaml(&raw);
        debug!("Session-info YAML: {} bytes raw, {} bytes cleaned", raw.len(), cleaned.len());
        Self::parse(&cleaned)
    }

    /// Like [`from_block`](Self::from_block) but degrades to an empty document with a warning.
    pub fn from_block_lossy(block: &[u8]) -> Self {
        Self::from_block(block).unwrap_or_else(|e| {
            warn!("Session metadata unavailable: {}", e);
            Self::default()
        })
    }
}
