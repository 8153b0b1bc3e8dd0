use thiserror::Error;

/// Process-wide error taxonomy for the MedSync bridge.
///
/// Everything here is recoverable by design: bad serial bytes, a
/// malicious token, or a disconnected client must never crash the
/// process. Transport and device errors are fatal only to the current
/// serial connection; persistence errors are absorbed after logging.
#[derive(Error, Debug)]
pub enum Error {
    // Serial errors
    #[error("No serial device found: {0}")]
    DeviceNotFound(String),

    #[error("Serial connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Serial transport error: {0}")]
    Transport(String),

    #[error("Malformed scan line: {0}")]
    MalformedLine(String),

    // Auth errors
    #[error("Invalid or expired token")]
    AuthInvalid,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Persistence errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
