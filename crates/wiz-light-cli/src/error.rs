//! Error types for the WiZ Light CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use thiserror::Error;
use wiz_light_core::error::CoreError;
use wiz_light_core::protocol::WizError;

// Re-export core error types so command modules can use them via crate::error
pub use wiz_light_core::error::{HandleError, ParseError, TransportError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Partial failure: {succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    #[error("No lights found")]
    NoLightsFound,

    #[error("Device error: {0}")]
    Device(WizError),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Handle(_) => exit_codes::INVALID_ARGS,
                CoreError::Parse(_) => exit_codes::DEVICE_ERROR,
                CoreError::Transport(TransportError::Io(_)) => exit_codes::NETWORK_ERROR,
                CoreError::Transport(_) => exit_codes::GENERAL_ERROR,
                CoreError::Io(_) => exit_codes::NETWORK_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
            CliError::NoLightsFound => exit_codes::GENERAL_ERROR,
            CliError::Device(_) => exit_codes::DEVICE_ERROR,
            CliError::Timeout(_) => exit_codes::NETWORK_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Core(CoreError::Transport(e))
    }
}

impl From<HandleError> for CliError {
    fn from(e: HandleError) -> Self {
        CliError::Core(CoreError::Handle(e))
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Core(CoreError::Parse(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
