use chat_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("a name is required to start the chat")]
    EmptyName,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
