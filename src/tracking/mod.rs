mod classify;
mod estimator;
mod geometry;
mod hero;
mod history;
mod recent;
mod types;

pub use classify::{classify, is_road_user};
pub use estimator::{KinematicEstimator, STALENESS_WINDOW_SECONDS};
pub use geometry::{round3, Coordinate};
pub use hero::{HeroPrediction, HeroRelation, HeroRelativeCalculator, HERO_LOOK_BACK_SECONDS};
pub use history::HISTORY_CAPACITY;
pub use types::{DerivedRecord, ParticipantId, ParticipantKind};
