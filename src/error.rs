use thiserror::Error;

/// Rejected input at the vehicle-state boundary. None of these are fatal:
/// the offending bytes are dropped and the last known-good state is kept.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VehicleError{
    #[error("feedback frame must be {expected} bytes, got {actual}")]
    Format{ expected: usize, actual: usize },

    #[error("operator payload needs at least {expected} bytes, got {actual}")]
    InvalidLength{ expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum LinkError{
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError{
    #[error("missing value for --{0}")]
    MissingValue(&'static str),

    #[error("invalid value for --{flag}: {value}")]
    InvalidValue{ flag: &'static str, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

pub type Result<T> = std::result::Result<T, VehicleError>;
