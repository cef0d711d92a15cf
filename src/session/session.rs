use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde::Serialize;
use utoipa::ToSchema;

use super::dispatcher::{Dispatcher, Observer, SubscriptionId};
use super::error::{ExportError, SessionError};
use super::export::{append_csv, write_csv};
use super::records::{export_header, RecordBuffer};
use crate::tracking::{
    Coordinate, DerivedRecord, HeroPrediction, HeroRelation, HeroRelativeCalculator,
    KinematicEstimator, ParticipantId, ParticipantKind,
};

/// Receives raw position samples from a participant's feed.
pub trait PositionSink: Send + Sync {
    fn on_position(&self, id: ParticipantId, timestamp: f64, position: Coordinate);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Metres around the hero inside which records are kept.
    pub relevance_radius: f64,
    /// Depth of each exported metric sequence.
    pub max_entry_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSummary {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
    pub type_code: u8,
    pub hero: bool,
    pub entries: usize,
}

struct Records {
    buffers: BTreeMap<ParticipantId, RecordBuffer>,
    dispatcher: Dispatcher,
}

type SharedEstimator = Arc<Mutex<KinematicEstimator>>;

/// Owns all per-participant state of one tracking run.
///
/// Samples of different participants can be processed concurrently: each
/// estimator has its own lock, and the hero's estimator is only locked while
/// its positions are predicted. Record buffers and observers share a single
/// lock so that appends and dispatches are observed in the same order.
pub struct Session {
    calculator: HeroRelativeCalculator,
    settings: SessionSettings,
    registered: HashSet<ParticipantId>,
    estimators: RwLock<HashMap<ParticipantId, SharedEstimator>>,
    records: Mutex<Records>,
    headers_written: Mutex<HashSet<PathBuf>>,
}

impl Session {
    pub fn new(
        hero_id: ParticipantId,
        settings: SessionSettings,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Result<Self, SessionError> {
        let buffers: BTreeMap<_, _> = participants
            .into_iter()
            .map(|p| (p.id, RecordBuffer::new(p.id, p.kind, settings.max_entry_count)))
            .collect();

        if !buffers.contains_key(&hero_id) {
            return Err(SessionError::UnknownHero(hero_id));
        }

        log::info!(
            "Session started: hero {}, {} participants, relevance radius {} m",
            hero_id,
            buffers.len(),
            settings.relevance_radius
        );

        Ok(Self {
            calculator: HeroRelativeCalculator::new(hero_id, settings.relevance_radius),
            settings,
            registered: buffers.keys().copied().collect(),
            estimators: RwLock::new(HashMap::new()),
            records: Mutex::new(Records {
                buffers,
                dispatcher: Dispatcher::new(),
            }),
            headers_written: Mutex::new(HashSet::new()),
        })
    }

    pub fn hero_id(&self) -> ParticipantId {
        self.calculator.hero_id()
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        lock(&self.records).dispatcher.subscribe(observer)
    }

    #[allow(dead_code)]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.records).dispatcher.unsubscribe(id)
    }

    pub fn participants(&self) -> Vec<ParticipantSummary> {
        let hero_id = self.hero_id();
        lock(&self.records)
            .buffers
            .values()
            .map(|buffer| ParticipantSummary {
                id: buffer.id(),
                kind: buffer.kind(),
                type_code: buffer.kind().type_code(),
                hero: buffer.id() == hero_id,
                entries: buffer.len(),
            })
            .collect()
    }

    pub fn export_header(&self) -> Vec<String> {
        export_header(self.settings.max_entry_count)
    }

    /// One row per registered participant, taken under a single lock.
    pub fn export_rows(&self) -> Vec<Vec<String>> {
        lock(&self.records)
            .buffers
            .values()
            .map(RecordBuffer::export_row)
            .collect()
    }

    pub fn csv_string(&self) -> Result<String, ExportError> {
        let mut out = Vec::new();
        write_csv(&mut out, Some(&self.export_header()), &self.export_rows())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Appends the current buffers to `path`. The header is written the first
    /// time this session saves to a given path.
    pub fn save_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut written = lock(&self.headers_written);
        let header = if written.contains(path) {
            None
        } else {
            Some(self.export_header())
        };
        append_csv(path, header.as_deref(), &self.export_rows())?;
        written.insert(path.to_path_buf());
        log::info!("Exported {} participants to {}", self.participant_count(), path.display());
        Ok(())
    }

    fn participant_count(&self) -> usize {
        lock(&self.records).buffers.len()
    }

    fn estimator(&self, id: ParticipantId) -> SharedEstimator {
        if let Some(estimator) = read(&self.estimators).get(&id) {
            return estimator.clone();
        }
        write(&self.estimators).entry(id).or_default().clone()
    }

    fn hero_prediction(&self, timestamp: f64) -> HeroPrediction {
        let hero = read(&self.estimators).get(&self.hero_id()).cloned();
        match hero {
            Some(estimator) => HeroPrediction::from_history(lock(&estimator).history(), timestamp),
            None => HeroPrediction::default(),
        }
    }

    /// Runs one sample through estimation, hero geometry and the relevance
    /// gate. Returns the record if it was kept.
    pub fn process(
        &self,
        id: ParticipantId,
        timestamp: f64,
        position: Coordinate,
    ) -> Option<DerivedRecord> {
        if !self.registered.contains(&id) {
            log::debug!("Participant {} is not tracked, dropping sample", id);
            return None;
        }
        let is_hero = self.calculator.is_hero(id);

        let (kinematics, subject) = {
            let estimator = self.estimator(id);
            let mut estimator = lock(&estimator);
            let kinematics = estimator.update(timestamp, position);
            let subject = if is_hero {
                None
            } else {
                estimator.history().predict(timestamp)
            };
            (kinematics, subject)
        };

        let relation = if is_hero {
            HeroRelation::SELF
        } else {
            let hero = self.hero_prediction(timestamp);
            match self.calculator.relate(subject, &hero) {
                Some(relation) => relation,
                None => {
                    log::debug!("Participant {} at {}: insufficient history", id, timestamp);
                    return None;
                }
            }
        };

        if !self.calculator.within_radius(&relation) {
            log::debug!(
                "Participant {} at {}: {} m outside relevance radius",
                id,
                timestamp,
                relation.distance
            );
            return None;
        }

        let record = DerivedRecord::new(id, kinematics, relation);
        let mut records = lock(&self.records);
        let buffer = records.buffers.get_mut(&id)?;
        buffer.append(&record);
        records.dispatcher.notify(&record);
        Some(record)
    }
}

impl PositionSink for Session {
    fn on_position(&self, id: ParticipantId, timestamp: f64, position: Coordinate) {
        self.process(id, timestamp, position);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
