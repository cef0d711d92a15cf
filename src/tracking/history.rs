use std::collections::VecDeque;

use super::geometry::Coordinate;

pub const HISTORY_CAPACITY: usize = 30;

/// Which part of the piecewise-linear model answered a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polation {
    Interpolate,
    Extrapolate,
}

/// Bounded window of timestamped positions for one participant.
///
/// Entries are kept in insertion order and the oldest *inserted* entry is
/// evicted first, even when samples arrive out of temporal order.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    capacity: usize,
    entries: VecDeque<(f64, Coordinate)>,
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl PositionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = &(f64, Coordinate)> {
        self.entries.iter()
    }

    pub fn store(&mut self, timestamp: f64, position: Coordinate) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        // a repeated timestamp keeps its slot and takes the newer position
        match self.entries.iter_mut().find(|(ts, _)| *ts == timestamp) {
            Some(entry) => entry.1 = position,
            None => self.entries.push_back((timestamp, position)),
        }
    }

    /// Position at `timestamp`, linearly interpolated inside the observed
    /// range and extrapolated from the nearest segment outside of it.
    pub fn predict(&self, timestamp: f64) -> Option<Coordinate> {
        self.predict_with_polation(timestamp)
            .map(|(position, _)| position)
    }

    pub fn predict_with_polation(&self, timestamp: f64) -> Option<(Coordinate, Polation)> {
        if self.entries.len() < 2 {
            return None;
        }

        let mut samples: Vec<(f64, Coordinate)> = self.entries.iter().copied().collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let first = samples[0].0;
        let last = samples[samples.len() - 1].0;

        let (segment, polation) = if timestamp < first {
            (0, Polation::Extrapolate)
        } else if timestamp > last {
            (samples.len() - 2, Polation::Extrapolate)
        } else {
            let upper = samples
                .iter()
                .position(|(ts, _)| *ts >= timestamp)
                .unwrap_or(samples.len() - 1)
                .max(1);
            (upper - 1, Polation::Interpolate)
        };

        let (t0, p0) = samples[segment];
        let (t1, p1) = samples[segment + 1];
        let fraction = (timestamp - t0) / (t1 - t0);
        let lerp = |a: f64, b: f64| a + (b - a) * fraction;

        Some((
            Coordinate::new(lerp(p0.x, p1.x), lerp(p0.y, p1.y), lerp(p0.z, p1.z)),
            polation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(samples: &[(f64, f64)]) -> PositionHistory {
        let mut history = PositionHistory::default();
        for (t, y) in samples {
            history.store(*t, Coordinate::new(0.0, *y, 0.0));
        }
        history
    }

    #[test]
    fn needs_two_samples() {
        assert_eq!(history(&[]).predict(1.0), None);
        assert_eq!(history(&[(0.0, 1.0)]).predict(0.0), None);
    }

    #[test]
    fn interpolates_inside_range() {
        let h = history(&[(0.0, 0.0), (1.0, 10.0), (2.0, 30.0)]);
        let (p, polation) = h.predict_with_polation(1.5).unwrap();
        assert_eq!(polation, Polation::Interpolate);
        assert_eq!(p, Coordinate::new(0.0, 20.0, 0.0));
        assert_eq!(h.predict(1.0), Some(Coordinate::new(0.0, 10.0, 0.0)));
        assert_eq!(h.predict(0.0), Some(Coordinate::new(0.0, 0.0, 0.0)));
        assert_eq!(h.predict(2.0), Some(Coordinate::new(0.0, 30.0, 0.0)));
    }

    #[test]
    fn extrapolates_from_nearest_segment() {
        let h = history(&[(0.0, 0.0), (1.0, 10.0), (2.0, 30.0)]);
        let (after, polation) = h.predict_with_polation(3.0).unwrap();
        assert_eq!(polation, Polation::Extrapolate);
        assert_eq!(after.y, 50.0);

        let before = h.predict(-1.0).unwrap();
        assert_eq!(before.y, -10.0);
    }

    #[test]
    fn out_of_order_samples_are_sorted_for_prediction() {
        let h = history(&[(2.0, 20.0), (0.0, 0.0), (1.0, 10.0)]);
        assert_eq!(h.predict(0.5).unwrap().y, 5.0);
    }

    #[test]
    fn evicts_earliest_inserted_entry() {
        let mut h = PositionHistory::default();
        // first insertion carries the largest timestamp
        h.store(100.0, Coordinate::new(0.0, 0.0, 0.0));
        for i in 0..HISTORY_CAPACITY {
            h.store(i as f64, Coordinate::new(0.0, i as f64, 0.0));
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        assert!(h.iter().all(|(ts, _)| *ts != 100.0));
        assert_eq!(h.iter().next().map(|(ts, _)| *ts), Some(0.0));
    }

    #[test]
    fn repeated_timestamp_replaces_position() {
        let mut h = history(&[(0.0, 0.0), (1.0, 10.0)]);
        h.store(1.0, Coordinate::new(0.0, 20.0, 0.0));
        assert_eq!(h.len(), 2);
        assert_eq!(h.predict(1.0).unwrap().y, 20.0);
    }
}
