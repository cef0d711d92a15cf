use super::geometry::{angle_to_reference_axis, round2, Coordinate, Vector};
use super::history::PositionHistory;
use super::recent::RecentPair;

/// A current timestamp older than this (seconds) is discarded on the next
/// sample, forcing a fresh warm-up.
pub const STALENESS_WINDOW_SECONDS: f64 = 3.0;

const MS_TO_KMH: f64 = 3.6;

/// Kinematic state derived from the two most recent samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// km/h
    pub velocity: f64,
    /// Degrees in `[0, 360)`, latched while stationary.
    pub orientation: Option<f64>,
    /// Degrees per second.
    pub angular_speed: f64,
    /// km/h per second.
    pub acceleration: f64,
}

/// Per-participant estimator fed one position sample at a time.
#[derive(Debug, Clone, Default)]
pub struct KinematicEstimator {
    history: PositionHistory,
    timestamps: RecentPair<f64>,
    positions: RecentPair<Coordinate>,
    orientations: RecentPair<f64>,
    velocities: RecentPair<f64>,
    latched_orientation: Option<f64>,
}

impl KinematicEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    #[allow(dead_code)]
    pub fn latched_orientation(&self) -> Option<f64> {
        self.latched_orientation
    }

    /// Returns `None` while warming up, i.e. on the first sample and on the
    /// first sample after a gap longer than the staleness window.
    pub fn update(&mut self, timestamp: f64, position: Coordinate) -> Option<Kinematics> {
        self.history.store(timestamp, position);

        if let Some(current) = self.timestamps.current {
            if timestamp - current > STALENESS_WINDOW_SECONDS {
                self.timestamps.current = None;
            }
        }
        self.timestamps.shift(Some(timestamp));

        if self.timestamps.previous.is_none() {
            // seed the position so the next sample has a displacement
            self.positions = RecentPair {
                previous: None,
                current: Some(position),
            };
            return None;
        }

        self.positions.shift(Some(position));
        let (previous, current) = self.positions.both()?;
        let displacement = current.vector_from(&previous);

        let velocity = self.velocity(&displacement);
        let orientation = self.orientation(&displacement, velocity);
        Some(Kinematics {
            velocity,
            orientation,
            angular_speed: self.angular_speed(),
            acceleration: self.acceleration(),
        })
    }

    fn elapsed(&self) -> Option<f64> {
        let (previous, current) = self.timestamps.both()?;
        Some(current - previous)
    }

    fn velocity(&mut self, displacement: &Vector) -> f64 {
        let velocity = match self.elapsed() {
            Some(dt) if dt != 0.0 => round2(displacement.length() / dt.abs() * MS_TO_KMH),
            _ => 0.0,
        };
        self.velocities.shift(Some(velocity));
        velocity
    }

    fn orientation(&mut self, displacement: &Vector, velocity: f64) -> Option<f64> {
        if let Some(heading) = angle_to_reference_axis(displacement) {
            if velocity > 0.0 {
                self.latched_orientation = Some(heading);
            }
        }
        self.orientations.shift(self.latched_orientation);
        self.latched_orientation
    }

    fn angular_speed(&self) -> f64 {
        match (self.orientations.both(), self.elapsed()) {
            (Some((previous, current)), Some(dt)) if dt != 0.0 => {
                round2((current - previous).abs() / dt.abs())
            }
            _ => 0.0,
        }
    }

    fn acceleration(&self) -> f64 {
        match (self.velocities.both(), self.elapsed()) {
            (Some((previous, current)), Some(dt)) if dt != 0.0 => (current - previous) / dt,
            _ => 0.0,
        }
    }
}
