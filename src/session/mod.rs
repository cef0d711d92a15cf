mod dispatcher;
mod error;
mod export;
mod records;
mod session;

pub use dispatcher::RecentRecords;
pub use error::{ExportError, ObserverError, SessionError};
pub use records::METRIC_NAMES;
pub use session::{Participant, ParticipantSummary, PositionSink, Session, SessionSettings};
