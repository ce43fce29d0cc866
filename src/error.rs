//! Error types for the streaming application

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio subsystem errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No output device available")]
    NoOutputDevice,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open stream: {0}")]
    StreamError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Wire codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Empty sample buffer")]
    EmptySamples,

    #[error("Encoded message too large: {0} bytes")]
    MessageTooLarge(usize),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid host address: {0}")]
    InvalidAddress(String),

    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Sender not connected")]
    NotConnected,

    #[error("Too many samples in one send: {0}")]
    TooManySamples(usize),

    #[error("Too many chunks required: {0}")]
    TooManyChunks(usize),

    #[error("Receive thread failed to start: {0}")]
    ThreadSpawn(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
