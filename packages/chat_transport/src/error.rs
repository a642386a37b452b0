use thiserror::Error;

/// Failures at the transport boundary. None of these are fatal to the
/// widget; callers convert them into notices or per-message markers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A command was issued while the transport had no live connection.
    #[error("transport is not connected")]
    NotConnected,

    /// The backend rejected a command.
    #[error("{operation} failed: {message}")]
    Command {
        operation: &'static str,
        message: String,
    },

    /// The backend answered with something this client cannot interpret.
    #[error("malformed payload: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn command(operation: &'static str, message: impl Into<String>) -> Self {
        TransportError::Command {
            operation,
            message: message.into(),
        }
    }
}
