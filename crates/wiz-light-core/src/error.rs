//! Error types for the WiZ control core.

use thiserror::Error;

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Handle error: {0}")]
    Handle(#[from] HandleError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to decode a datagram as a protocol message.
#[derive(Debug, Error)]
#[error("malformed message: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Device identity validation errors
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("MAC must be exactly 12 hex digits, got {0} characters")]
    MacLength(usize),

    #[error("Invalid hex digit in MAC: {0}")]
    MacDigit(char),
}

/// Socket transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Socket is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Operation interrupted before completion")]
    Interrupted,
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        assert_eq!(format!("{}", TransportError::Closed), "Socket is closed");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let inner = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err: ParseError = inner.into();
        assert!(format!("{}", err).starts_with("malformed message"));
    }

    #[test]
    fn test_core_error_from_handle_error() {
        let err = CoreError::Handle(HandleError::MacLength(4));
        assert!(format!("{}", err).contains("12 hex digits"));
    }

    #[test]
    fn test_transport_error_from_io() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: TransportError = inner.into();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
