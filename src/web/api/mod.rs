pub mod error;
pub mod tracking;
