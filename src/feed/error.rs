use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("sample file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid sample in {file}: {message}")]
    InvalidSample { file: String, message: String },
}
