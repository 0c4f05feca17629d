//! Player track surface classification (`PlayerTrackSurface`, irsdk_TrkLoc).

use serde::{Deserialize, Serialize};

/// Where the player's car is relative to the racing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackSurface {
    /// Car is not in the world (garage, replay spectating, reset in progress)
    NotInWorld,
    OffTrack,
    InPitStall,
    ApproachingPits,
    OnTrack,
    /// Value the SDK does not define
    Unknown(i32),
}

impl TrackSurface {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => TrackSurface::NotInWorld,
            0 => TrackSurface::OffTrack,
            1 => TrackSurface::InPitStall,
            2 => TrackSurface::ApproachingPits,
            3 => TrackSurface::OnTrack,
            other => TrackSurface::Unknown(other),
        }
    }

    /// Surfaces that make a lap unusable for timing.
    pub fn invalidates_lap(&self) -> bool {
        matches!(self, TrackSurface::NotInWorld | TrackSurface::OffTrack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sdk_values() {
        assert_eq!(TrackSurface::from_raw(-1), TrackSurface::NotInWorld);
        assert_eq!(TrackSurface::from_raw(3), TrackSurface::OnTrack);
        assert_eq!(TrackSurface::from_raw(7), TrackSurface::Unknown(7));
        assert!(TrackSurface::from_raw(0).invalidates_lap());
        assert!(TrackSurface::from_raw(-1).invalidates_lap());
        assert!(!TrackSurface::from_raw(1).invalidates_lap());
        assert!(!TrackSurface::from_raw(3).invalidates_lap());
    }
}
