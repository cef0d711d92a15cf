use thiserror::Error;

use crate::tracking::ParticipantId;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no hero initialized or found")]
    NoHero,
    #[error("hero {0} is not a registered participant")]
    UnknownHero(ParticipantId),
}

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("observer rejected record: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
