use serde::{Deserialize, Serialize};
use serde_json::json;
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

use super::estimator::Kinematics;
use super::hero::HeroRelation;

pub type ParticipantId = u32;

/// Traffic participant category with its numeric export code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParticipantKind {
    Car,
    Pedestrian,
    Motorcycle,
    Truck,
    Bike,
}

impl ParticipantKind {
    pub fn type_code(&self) -> u8 {
        match self {
            ParticipantKind::Car => 0,
            ParticipantKind::Pedestrian => 1,
            ParticipantKind::Motorcycle => 2,
            ParticipantKind::Truck => 3,
            ParticipantKind::Bike => 4,
        }
    }
}

/// One event's derived values, before export coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRecord {
    pub id: ParticipantId,
    pub velocity: Option<f64>,
    pub orientation: Option<f64>,
    pub angular_speed: Option<f64>,
    pub acceleration: Option<f64>,
    pub distance_to_hero: Option<f64>,
    pub angle_to_hero: Option<f64>,
}

impl DerivedRecord {
    pub fn new(id: ParticipantId, kinematics: Option<Kinematics>, relation: HeroRelation) -> Self {
        Self {
            id,
            velocity: kinematics.map(|k| k.velocity),
            orientation: kinematics.and_then(|k| k.orientation),
            angular_speed: kinematics.map(|k| k.angular_speed),
            acceleration: kinematics.map(|k| k.acceleration),
            distance_to_hero: Some(relation.distance),
            angle_to_hero: relation.angle,
        }
    }

    /// The six metrics in export order.
    pub fn metrics(&self) -> [Option<f64>; 6] {
        [
            self.velocity,
            self.orientation,
            self.angular_speed,
            self.acceleration,
            self.distance_to_hero,
            self.angle_to_hero,
        ]
    }

    /// `[id, velocity, orientation, angular_speed, acceleration,
    /// distance_to_hero, angle_to_hero]`, unavailable values as `null`.
    pub fn to_json(&self) -> String {
        let [velocity, orientation, angular_speed, acceleration, distance, angle] = self.metrics();
        json!([
            self.id,
            velocity,
            orientation,
            angular_speed,
            acceleration,
            distance,
            angle
        ])
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_unavailable_values_as_null() {
        let record = DerivedRecord::new(
            4,
            None,
            HeroRelation {
                distance: 12.5,
                angle: None,
            },
        );
        assert_eq!(
            record.to_json(),
            "[4,null,null,null,null,12.5,null]"
        );
    }

    #[test]
    fn kinds_map_to_export_codes() {
        assert_eq!(ParticipantKind::Car.type_code(), 0);
        assert_eq!(ParticipantKind::Pedestrian.type_code(), 1);
        assert_eq!(ParticipantKind::Bike.type_code(), 4);
        assert_eq!(ParticipantKind::Motorcycle.to_string(), "motorcycle");
    }
}
