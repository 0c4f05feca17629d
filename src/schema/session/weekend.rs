//! Weekend and track information
//!
//! Track details and weather conditions from the `WeekendInfo` section of the session-info
//! block. iRacing writes most numbers with their unit ("3.93 km", "25.56 C"), so those fields
//! stay strings here and are interpreted by [`SessionInfo`](super::SessionInfo).

use serde::{Deserialize, Serialize};

/// Weekend and track information from iRacing
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendInfo {
    /// Internal track name, e.g. "roadatlanta full"
    pub track_name: Option<String>,
    #[serde(rename = "TrackID")]
    pub track_id: Option<i32>,
    /// Track length with unit, e.g. "4.05 km"
    pub track_length: Option<String>,
    pub track_display_name: Option<String>,
    pub track_display_short_name: Option<String>,
    pub track_config_name: Option<String>,
    pub track_city: Option<String>,
    pub track_country: Option<String>,
    pub track_num_turns: Option<i32>,
    /// Road course, oval, dirt...
    pub track_type: Option<String>,
    /// Track weather type (Static, Dynamic)
    pub track_weather_type: Option<String>,
    pub track_skies: Option<String>,
    /// Surface temperature with unit, e.g. "41.2 C"
    pub track_surface_temp: Option<String>,
    /// Air temperature with unit, e.g. "25.6 C"
    pub track_air_temp: Option<String>,
    pub track_air_pressure: Option<String>,
    pub track_wind_vel: Option<String>,
    pub track_wind_dir: Option<String>,
    pub track_relative_humidity: Option<String>,
    pub track_fog_level: Option<String>,
    #[serde(rename = "SeriesID")]
    pub series_id: Option<i32>,
    #[serde(rename = "SessionID")]
    pub session_id: Option<i32>,
    #[serde(rename = "SubSessionID")]
    pub sub_session_id: Option<i32>,
    pub official: Option<i32>,
    /// Event type (Practice, Test, Race...)
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub sim_mode: Option<String>,
    pub build_version: Option<String>,
    pub weekend_options: Option<WeekendOptions>,
}

/// Weekend session options and configuration
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendOptions {
    pub num_starters: Option<i32>,
    pub weather_type: Option<String>,
    pub skies: Option<String>,
    pub weather_temp: Option<String>,
    pub relative_humidity: Option<String>,
    pub time_of_day: Option<String>,
    pub date: Option<String>,
    pub is_fixed_setup: Option<i32>,
    pub incident_limit: Option<String>,
}
