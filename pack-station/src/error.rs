use thiserror::Error;

/// Startup and wiring failures; screen operations report through `AppError`
#[derive(Debug, Error)]
pub enum StationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HQ client error: {0}")]
    Client(#[from] hq_client::ClientError),

    #[error("Printer error: {0}")]
    Printer(#[from] pack_printer::PrintError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StationResult<T> = Result<T, StationError>;
