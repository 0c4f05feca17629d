//! Split timing and sector information

use serde::{Deserialize, Serialize};

/// Split timing information
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SplitTimeInfo {
    pub sectors: Option<Vec<Sector>>,
}

impl SplitTimeInfo {
    /// Sector start positions as lap fractions, sorted, out-of-range entries dropped.
    pub fn sector_starts(&self) -> Vec<f64> {
        let mut starts: Vec<f64> = self
            .sectors
            .iter()
            .flatten()
            .filter_map(|sector| sector.sector_start_pct)
            .filter(|pct| (0.0..1.0).contains(pct))
            .collect();
        starts.sort_by(f64::total_cmp);
        starts.dedup();
        starts
    }
}

/// Individual sector timing information
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Sector {
    pub sector_num: Option<i32>,
    /// Sector start percentage along track
    pub sector_start_pct: Option<f64>,
}
