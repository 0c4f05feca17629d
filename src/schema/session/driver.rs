//! Driver information structures

use serde::{Deserialize, Serialize};

/// Driver information data containing the recording driver's car index and the drivers list
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct DriverInfoData {
    /// Car index of the driver who recorded the file
    pub driver_car_idx: Option<i32>,
    #[serde(rename = "DriverUserID")]
    pub driver_user_id: Option<i32>,
    #[serde(rename = "DriverCarIdleRPM")]
    pub driver_car_idle_rpm: Option<f64>,
    pub driver_car_red_line: Option<f64>,
    pub driver_car_fuel_max_ltr: Option<f64>,
    pub driver_car_est_lap_time: Option<f64>,
    pub driver_setup_name: Option<String>,
    pub driver_setup_is_modified: Option<i32>,
    pub driver_incident_count: Option<i32>,
    pub drivers: Option<Vec<Driver>>,
}

impl DriverInfoData {
    /// The recording driver: the entry whose `CarIdx` matches `DriverCarIdx`, or the first
    /// driver listed.
    pub fn player(&self) -> Option<&Driver> {
        let drivers = self.drivers.as_deref()?;
        self.driver_car_idx
            .and_then(|idx| drivers.iter().find(|driver| driver.car_idx == idx))
            .or_else(|| drivers.first())
    }
}

/// Individual driver data (from Drivers list)
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    pub car_idx: i32,
    pub user_name: Option<String>,
    pub abbrev_name: Option<String>,
    pub initials: Option<String>,
    #[serde(rename = "UserID")]
    pub user_id: Option<i32>,
    pub team_name: Option<String>,
    pub car_number: Option<String>,
    /// Car folder name, e.g. "fordmustanggt4"
    pub car_path: Option<String>,
    #[serde(rename = "CarID")]
    pub car_id: Option<i32>,
    pub car_screen_name: Option<String>,
    pub car_screen_name_short: Option<String>,
    pub car_class_short_name: Option<String>,
    #[serde(rename = "CarClassID")]
    pub car_class_id: Option<i32>,
    #[serde(rename = "IRating")]
    pub i_rating: Option<i32>,
    pub lic_string: Option<String>,
    pub is_spectator: Option<i32>,
    pub car_is_pace_car: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(car_idx: i32, name: &str) -> Driver {
        Driver { car_idx, user_name: Some(name.to_string()), ..Default::default() }
    }

    #[test]
    fn player_matches_driver_car_idx() {
        let info = DriverInfoData {
            driver_car_idx: Some(3),
            drivers: Some(vec![driver(0, "Pace Car"), driver(3, "Sam Racer")]),
            ..Default::default()
        };
        assert_eq!(info.player().and_then(|d| d.user_name.as_deref()), Some("Sam Racer"));
    }

    #[test]
    fn player_falls_back_to_first_driver() {
        let info = DriverInfoData {
            driver_car_idx: Some(9),
            drivers: Some(vec![driver(0, "Only Driver")]),
            ..Default::default()
        };
        assert_eq!(info.player().map(|d| d.car_idx), Some(0));
        assert!(DriverInfoData::default().player().is_none());
    }
}
