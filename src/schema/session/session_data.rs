//! Session list structures
//!
//! The `SessionInfo` section lists every session of the event (practice, qualifying, race) and
//! which one was running when the recording was written.

use serde::{Deserialize, Serialize};

/// Session information data from iRacing
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfoData {
    /// Current session number, when the block was written by a live session
    pub current_session_num: Option<i32>,
    pub sessions: Vec<SessionEntry>,
}

impl SessionInfoData {
    /// Session matching [`current_session_num`](Self::current_session_num), if any.
    pub fn current(&self) -> Option<&SessionEntry> {
        let num = self.current_session_num?;
        self.sessions.iter().find(|session| session.session_num == num)
    }
}

/// Individual session data
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionEntry {
    pub session_num: i32,
    /// Session laps ("unlimited" or number)
    pub session_laps: Option<String>,
    /// Session time ("unlimited" or "600.0000 sec")
    pub session_time: Option<String>,
    /// Session type, e.g. "Lone Qualify", "Offline Testing", "Race"
    pub session_type: String,
    pub session_name: Option<String>,
    pub session_sub_type: Option<String>,
    pub session_track_rubber_state: Option<String>,
    pub results_average_lap_time: Option<f64>,
    pub results_laps_complete: Option<i32>,
}
