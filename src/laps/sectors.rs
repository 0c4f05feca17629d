//! Sector timing from lap-distance crossings.

/// Largest forward step in lap fraction between two samples still treated as driving.
/// Larger steps are wrap-arounds or resets.
const MAX_PCT_STEP: f64 = 0.5;

/// Sector boundaries inside a lap: the start fractions after the start/finish line.
pub fn interior_boundaries(sector_starts: &[f64]) -> Vec<f64> {
    sector_starts.iter().copied().filter(|&pct| pct > 0.0 && pct < 1.0).collect()
}

/// Lap-elapsed time at which each interior boundary was first crossed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorClock {
    crossings: Vec<Option<f64>>,
}

impl SectorClock {
    pub fn new(boundaries: usize) -> Self {
        Self { crossings: vec![None; boundaries] }
    }

    /// Record crossings between consecutive samples at `prev` and `cur` lap fraction.
    pub fn observe(&mut self, boundaries: &[f64], prev: f64, cur: f64, elapsed: f64) {
        let step = cur - prev;
        if step <= 0.0 || step >= MAX_PCT_STEP {
            return;
        }
        for (crossing, &boundary) in self.crossings.iter_mut().zip(boundaries) {
            if crossing.is_none() && prev < boundary && boundary <= cur {
                *crossing = Some(elapsed);
            }
        }
    }

    /// Per-sector times for a lap of `lap_time` seconds.
    ///
    /// Empty when there is a single sector, a boundary was never crossed, or the crossings are
    /// out of order.
    pub fn sector_times(&self, lap_time: f64) -> Vec<f64> {
        if self.crossings.is_empty() {
            return Vec::new();
        }
        let Some(marks) = self.crossings.iter().copied().collect::<Option<Vec<f64>>>() else {
            return Vec::new();
        };

        let mut times = Vec::with_capacity(marks.len() + 1);
        let mut previous = 0.0;
        for mark in marks.into_iter().chain(std::iter::once(lap_time)) {
            let split = mark - previous;
            if split <= 0.0 {
                return Vec::new();
            }
            times.push(split);
            previous = mark;
        }
        times
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_sectors_split_the_lap() {
        let boundaries = interior_boundaries(&[0.0, 0.3, 0.7]);
        assert_eq!(boundaries, vec![0.3, 0.7]);

        let mut clock = SectorClock::new(boundaries.len());
        clock.observe(&boundaries, 0.1, 0.2, 10.0);
        clock.observe(&boundaries, 0.29, 0.31, 30.0);
        clock.observe(&boundaries, 0.69, 0.70, 70.0);
        clock.observe(&boundaries, 0.70, 0.71, 71.0);

        let times = clock.sector_times(100.0);
        assert_eq!(times, vec![30.0, 40.0, 30.0]);
        assert!((times.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missed_boundary_yields_no_sectors() {
        let boundaries = interior_boundaries(&[0.0, 0.5]);
        let mut clock = SectorClock::new(boundaries.len());
        clock.observe(&boundaries, 0.1, 0.2, 10.0);
        assert!(clock.sector_times(90.0).is_empty());
    }

    #[test]
    fn wrap_around_is_not_a_crossing() {
        let boundaries = interior_boundaries(&[0.0, 0.5]);
        let mut clock = SectorClock::new(boundaries.len());
        clock.observe(&boundaries, 0.99, 0.01, 1.0);
        clock.observe(&boundaries, 0.1, 0.9, 2.0);
        assert!(clock.sector_times(90.0).is_empty());
    }

    #[test]
    fn single_sector_track_has_no_splits() {
        let clock = SectorClock::new(interior_boundaries(&[0.0]).len());
        assert!(clock.sector_times(90.0).is_empty());
    }
}
