//! Error types and Result aliases for openterm

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for openterm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for openterm
#[derive(Debug, Error)]
pub enum Error {
    // === Session errors ===
    /// No terminal constructor is registered for the protocol tag
    #[error("Unknown protocol type '{tag}'")]
    UnknownProtocolType { tag: String },

    /// Host description failed validation
    #[error("Invalid host {field}: {reason}")]
    InvalidHost { field: String, reason: String },

    /// No host at the requested registry position (zero-based)
    #[error("No host number {}", .index + 1)]
    HostNotFound { index: usize },

    /// Network or handshake failure while connecting
    #[error("Failed to connect to {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    /// The terminal variant cannot negotiate an encrypted session
    #[error("Encryption is not supported by the '{protocol}' terminal")]
    EncryptionUnsupported { protocol: String },

    /// The operation needs a live session and none is connected
    #[error("Not connected")]
    NotConnected,

    /// A newer connect request replaced this one before it completed
    #[error("Connection to {host} was superseded by a newer request")]
    Superseded { host: String },

    /// The connection actor has shut down
    #[error("Connection manager is no longer running")]
    ActorStopped,

    // === Favourites errors ===
    /// Favourites could not be written to the preference store
    #[error("Failed to save favourite hosts: {reason}")]
    PersistenceFailed { reason: String },

    /// Favourites could not be read back from the preference store
    #[error("Failed to load favourite hosts: {reason}")]
    LoadFailed { reason: String },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {}", .path.display(), .reason)]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to save configuration or preference file
    #[error("Failed to save config to '{}': {}", .path.display(), .reason)]
    ConfigSaveFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    /// Display preference value is not one of the offered choices
    #[error("Unsupported {setting}: '{value}'")]
    UnsupportedPreference { setting: String, value: String },

    /// Console input could not be parsed
    #[error("Invalid command '{command}': {reason}")]
    InvalidCommand { command: String, reason: String },

    // === I/O and serialization errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic errors (use sparingly)
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Text shown to the user in the connection-failure notice.
    ///
    /// Connection failures already name the host in the notice header, so
    /// only the underlying reason is returned for them.
    pub fn user_message(&self) -> String {
        match self {
            Error::ConnectionFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the error came from resolving a terminal rather than from the network
    pub fn is_unknown_protocol(&self) -> bool {
        matches!(self, Error::UnknownProtocolType { .. })
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
