mod error;
mod noise;
mod samples;
mod worker;

pub use samples::{load_samples, Sample};
pub use worker::{FeedRunner, FeedSettings};

use crate::config::Config;
use crate::session::{Participant, Session, SessionError};
use crate::tracking::ParticipantId;

/// The configured hero, or else the first tracked participant that moves in
/// the recorded samples.
pub fn select_hero(config: &Config, samples: &[Sample]) -> Result<ParticipantId, SessionError> {
    if let Some(hero_id) = config.session.hero_id {
        return Ok(hero_id);
    }
    let hero = samples::first_moving_participant(config.road_users().map(|p| p.id), samples)
        .ok_or(SessionError::NoHero)?;
    log::info!("Selected participant {} as hero", hero);
    Ok(hero)
}

/// Builds a session tracking every configured road user.
pub fn build_session(config: &Config, hero_id: ParticipantId) -> Result<Session, SessionError> {
    let participants = config.road_users().map(|p| Participant {
        id: p.id,
        kind: p.kind(),
    });
    Session::new(hero_id, config.settings(), participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const YAML: &str = r#"
session:
  relevance_radius: 50000
  max_entry_count: 3
participants:
  - id: 1
    blueprint: vehicle.audi.tt
  - id: 2
    blueprint: vehicle.yamaha.yzf
  - id: 3
    blueprint: static.prop.bench
"#;

    const CSV: &str = "id,timestamp,x,y,z
1,0.0,0,0,0
1,0.5,0,0,0
1,1.0,0,0,0
2,0.0,0,0,0
2,0.5,0,5,0
2,1.0,0,10,0
3,0.0,9,9,0
3,1.0,9,9,1
";

    fn samples() -> Vec<Sample> {
        samples::parse_samples(CSV, "replay.csv").unwrap()
    }

    #[test]
    fn hero_defaults_to_first_moving_road_user() {
        let config = Config::from_str(YAML).unwrap();
        assert_eq!(select_hero(&config, &samples()).unwrap(), 2);
    }

    #[test]
    fn no_moving_participant_means_no_hero() {
        let config = Config::from_str(YAML).unwrap();
        let parked: Vec<_> = samples().into_iter().filter(|s| s.id == 1).collect();
        assert!(matches!(select_hero(&config, &parked), Err(SessionError::NoHero)));
    }

    #[test]
    fn explicit_hero_must_be_tracked() {
        let config = Config::from_str(&YAML.replace(
            "max_entry_count: 3",
            "max_entry_count: 3\n  hero_id: 3",
        ))
        .unwrap();
        let hero = select_hero(&config, &samples()).unwrap();
        assert!(matches!(
            build_session(&config, hero),
            Err(SessionError::UnknownHero(3))
        ));
    }

    #[test]
    fn replay_fills_the_export_buffers() {
        let config = Config::from_str(YAML).unwrap();
        let hero = select_hero(&config, &samples()).unwrap();
        let session = Arc::new(build_session(&config, hero).unwrap());

        // hero first so the subject always has hero history to relate to
        let (hero_track, rest): (Vec<_>, Vec<_>) =
            samples().into_iter().partition(|s| s.id == hero);
        let settings = FeedSettings {
            tick: std::time::Duration::ZERO,
            paced: false,
            error_range: 0.0,
        };
        FeedRunner::start(session.clone(), &hero_track, settings).wait();
        FeedRunner::start(session.clone(), &rest, settings).wait();

        let participants = session.participants();
        assert_eq!(participants.len(), 2);
        let hero_summary = participants.iter().find(|p| p.hero).unwrap();
        assert_eq!(hero_summary.id, 2);
        assert_eq!(hero_summary.entries, 3);
        let subject = participants.iter().find(|p| p.id == 1).unwrap();
        assert_eq!(subject.entries, 2);
    }
}
