//! Flat session summary derived from the session-info document

use serde::{Deserialize, Serialize};

use super::{SessionDocument, SessionEntry};

/// Kind of session the recording was made in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Practice,
    Qualifying,
    Race,
    Testing,
    TimeTrial,
    #[default]
    Unknown,
}

impl SessionType {
    /// Classify an iRacing session type string such as "Lone Qualify" or "Offline Testing".
    pub fn classify(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.contains("race") {
            SessionType::Race
        } else if lower.contains("qual") {
            SessionType::Qualifying
        } else if lower.contains("practice") || lower.contains("warmup") {
            SessionType::Practice
        } else if lower.contains("time") && lower.contains("trial") {
            SessionType::TimeTrial
        } else if lower.contains("test") {
            SessionType::Testing
        } else {
            SessionType::Unknown
        }
    }
}

/// Summary of the session-info block attached to every parsed session.
///
/// Every field is optional: a missing key or an unparseable block leaves it empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Internal track name, e.g. "roadatlanta full"
    pub track_name: Option<String>,
    pub track_display_name: Option<String>,
    pub track_config: Option<String>,
    pub track_length_km: Option<f64>,
    /// Car screen name, e.g. "Ford Mustang GT4"
    pub car_name: Option<String>,
    pub car_path: Option<String>,
    pub car_class: Option<String>,
    pub driver_name: Option<String>,
    pub setup_name: Option<String>,
    pub session_type: SessionType,
    pub session_name: Option<String>,
    pub air_temp_c: Option<f64>,
    pub track_temp_c: Option<f64>,
    pub weather_type: Option<String>,
    pub skies: Option<String>,
    pub relative_humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    /// Sector start positions as lap fractions, ascending
    pub sector_starts: Vec<f64>,
}

impl SessionInfo {
    pub fn from_document(doc: &SessionDocument) -> Self {
        let weekend = &doc.weekend_info;
        let driver_info = doc.driver_info.as_ref();
        let player = driver_info.and_then(|info| info.player());
        let session = classify_session(doc);

        Self {
            track_name: non_empty(weekend.track_name.as_deref()),
            track_display_name: non_empty(weekend.track_display_name.as_deref()),
            track_config: non_empty(weekend.track_config_name.as_deref()),
            track_length_km: weekend.track_length.as_deref().and_then(leading_number),
            car_name: non_empty(player.and_then(|p| p.car_screen_name.as_deref())),
            car_path: non_empty(player.and_then(|p| p.car_path.as_deref())),
            car_class: non_empty(player.and_then(|p| p.car_class_short_name.as_deref())),
            driver_name: non_empty(player.and_then(|p| p.user_name.as_deref())),
            setup_name: non_empty(driver_info.and_then(|info| info.driver_setup_name.as_deref())),
            session_type: session.map(|(kind, _)| kind).unwrap_or_default(),
            session_name: non_empty(session.and_then(|(_, entry)| entry.session_name.as_deref())),
            air_temp_c: weekend.track_air_temp.as_deref().and_then(leading_number),
            track_temp_c: weekend.track_surface_temp.as_deref().and_then(leading_number),
            weather_type: non_empty(weekend.track_weather_type.as_deref()),
            skies: non_empty(weekend.track_skies.as_deref()),
            relative_humidity_pct: weekend
                .track_relative_humidity
                .as_deref()
                .and_then(leading_number),
            wind_speed_ms: weekend.track_wind_vel.as_deref().and_then(leading_number),
            sector_starts: doc
                .split_time_info
                .as_ref()
                .map(|split| split.sector_starts())
                .unwrap_or_default(),
        }
    }

    /// Display name of the track including its configuration, e.g.
    /// "Michelin Raceway Road Atlanta - Full Course".
    pub fn track_label(&self) -> Option<String> {
        let name = self.track_display_name.as_ref().or(self.track_name.as_ref())?;
        Some(match &self.track_config {
            Some(config) => format!("{name} - {config}"),
            None => name.clone(),
        })
    }
}

/// The current session when it classifies, else the first session in the list that does.
fn classify_session(doc: &SessionDocument) -> Option<(SessionType, &SessionEntry)> {
    let sessions = &doc.session_info;
    sessions
        .current()
        .into_iter()
        .chain(sessions.sessions.iter())
        .map(|entry| (SessionType::classify(&entry.session_type), entry))
        .find(|(kind, _)| *kind != SessionType::Unknown)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parse the number in front of a unit: "4.05 km", "25.56 C", "55 %".
fn leading_number(raw: &str) -> Option<f64> {
    raw.split_whitespace().next()?.parse().ok().filter(|v: &f64| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::session::{Driver, DriverInfoData, SessionInfoData, WeekendInfo};

    #[test]
    fn classifies_session_types() {
        assert_eq!(SessionType::classify("Race"), SessionType::Race);
        assert_eq!(SessionType::classify("Heat Race"), SessionType::Race);
        assert_eq!(SessionType::classify("Lone Qualify"), SessionType::Qualifying);
        assert_eq!(SessionType::classify("Open Qualify"), SessionType::Qualifying);
        assert_eq!(SessionType::classify("Practice"), SessionType::Practice);
        assert_eq!(SessionType::classify("Time Trial"), SessionType::TimeTrial);
        assert_eq!(SessionType::classify("Offline Testing"), SessionType::Testing);
        assert_eq!(SessionType::classify("Grid"), SessionType::Unknown);
    }

    #[test]
    fn parses_measurements() {
        assert_eq!(leading_number("4.05 km"), Some(4.05));
        assert_eq!(leading_number("25.56 C"), Some(25.56));
        assert_eq!(leading_number("55 %"), Some(55.0));
        assert_eq!(leading_number("unknown"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn prefers_current_session() {
        let doc = SessionDocument {
            session_info: SessionInfoData {
                current_session_num: Some(2),
                sessions: vec![
                    SessionEntry { session_num: 0, session_type: "Practice".into(), ..Default::default() },
                    SessionEntry { session_num: 1, session_type: "Lone Qualify".into(), ..Default::default() },
                    SessionEntry {
                        session_num: 2,
                        session_type: "Race".into(),
                        session_name: Some("RACE".into()),
                        ..Default::default()
                    },
                ],
            },
            ..Default::default()
        };
        let info = SessionInfo::from_document(&doc);
        assert_eq!(info.session_type, SessionType::Race);
        assert_eq!(info.session_name.as_deref(), Some("RACE"));
    }

    #[test]
    fn falls_back_to_first_classified_session() {
        let doc = SessionDocument {
            session_info: SessionInfoData {
                current_session_num: None,
                sessions: vec![
                    SessionEntry { session_num: 0, session_type: "Grid".into(), ..Default::default() },
                    SessionEntry { session_num: 1, session_type: "Practice".into(), ..Default::default() },
                ],
            },
            ..Default::default()
        };
        assert_eq!(SessionInfo::from_document(&doc).session_type, SessionType::Practice);
        assert_eq!(
            SessionInfo::from_document(&SessionDocument::default()).session_type,
            SessionType::Unknown
        );
    }

    #[test]
    fn summarises_track_car_and_weather() {
        let doc = SessionDocument {
            weekend_info: WeekendInfo {
                track_name: Some("okayama full".into()),
                track_display_name: Some("Okayama International Circuit".into()),
                track_config_name: Some("Full Course".into()),
                track_length: Some("3.70 km".into()),
                track_air_temp: Some("22.10 C".into()),
                track_surface_temp: Some("30.00 C".into()),
                track_weather_type: Some("Static".into()),
                ..Default::default()
            },
            driver_info: Some(DriverInfoData {
                driver_car_idx: Some(1),
                driver_setup_name: Some("fast.sto".into()),
                drivers: Some(vec![Driver {
                    car_idx: 1,
                    user_name: Some("Alex Driver".into()),
                    car_screen_name: Some("Supercars Chevrolet Camaro Gen 3".into()),
                    car_path: Some("supercars chevycamarogen3".into()),
                    car_class_short_name: Some("Supercars".into()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let info = SessionInfo::from_document(&doc);
        assert_eq!(info.track_length_km, Some(3.70));
        assert_eq!(info.air_temp_c, Some(22.10));
        assert_eq!(info.track_temp_c, Some(30.0));
        assert_eq!(info.driver_name.as_deref(), Some("Alex Driver"));
        assert_eq!(info.car_class.as_deref(), Some("Supercars"));
        assert_eq!(info.setup_name.as_deref(), Some("fast.sto"));
        assert_eq!(
            info.track_label().as_deref(),
            Some("Okayama International Circuit - Full Course")
        );
    }
}
