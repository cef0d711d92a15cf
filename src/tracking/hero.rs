use super::geometry::{angle_between, Coordinate};
use super::history::PositionHistory;
use super::types::ParticipantId;

/// How far back (seconds) the hero's heading is sampled.
pub const HERO_LOOK_BACK_SECONDS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroRelation {
    /// Metres, rounded to centimetres.
    pub distance: f64,
    /// Bearing relative to the hero's heading, `None` while the hero is not
    /// moving across the look-back window.
    pub angle: Option<f64>,
}

impl HeroRelation {
    /// Relation of the hero to itself.
    pub const SELF: HeroRelation = HeroRelation {
        distance: 0.0,
        angle: Some(0.0),
    };
}

/// Hero positions predicted at an event timestamp and half a second before.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeroPrediction {
    pub now: Option<Coordinate>,
    pub before: Option<Coordinate>,
}

impl HeroPrediction {
    pub fn from_history(history: &PositionHistory, timestamp: f64) -> Self {
        Self {
            now: history.predict(timestamp),
            before: history.predict(timestamp - HERO_LOOK_BACK_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeroRelativeCalculator {
    hero_id: ParticipantId,
    relevance_radius: f64,
}

impl HeroRelativeCalculator {
    pub fn new(hero_id: ParticipantId, relevance_radius: f64) -> Self {
        Self {
            hero_id,
            relevance_radius,
        }
    }

    pub fn hero_id(&self) -> ParticipantId {
        self.hero_id
    }

    pub fn is_hero(&self, id: ParticipantId) -> bool {
        id == self.hero_id
    }

    /// Distance and bearing of a subject from the hero, or `None` when there
    /// is not enough history to place either of them.
    pub fn relate(&self, subject: Option<Coordinate>, hero: &HeroPrediction) -> Option<HeroRelation> {
        let subject = subject?;
        let hero_now = hero.now?;
        let distance = hero_now.distance_to(&subject);

        let angle = match hero.before {
            Some(before) if !before.same_planar_position(&hero_now) => {
                let heading = hero_now.vector_from(&before);
                let towards_subject = subject.vector_from(&before);
                Some(angle_between(&heading, &towards_subject))
            }
            _ => None,
        };

        Some(HeroRelation { distance, angle })
    }

    pub fn within_radius(&self, relation: &HeroRelation) -> bool {
        relation.distance <= self.relevance_radius
    }
}
