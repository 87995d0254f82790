use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid digit: {0} (must be 0-9)")]
    InvalidDigit(u8),

    #[error("Invalid security code: {0}")]
    InvalidCode(String),

    #[error("Invalid pin index: {0}")]
    InvalidPin(u8),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
