//! Error types for the dupe finder.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the dupe finder.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Config file not found: {0}. Create one with: plex-dupefinder init")]
    ConfigNotFound(String),

    #[error("Config file already exists: {0}")]
    ConfigExists(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown logging timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },

    // Plex errors
    #[error("Plex server unreachable: {0}")]
    PlexUnreachable(String),

    #[error("Plex rejected the auth token (HTTP 401)")]
    PlexUnauthorized,

    #[error("Library not found on Plex server: {0}")]
    LibraryNotFound(String),

    #[error("Plex API request failed: {0}")]
    PlexApi(String),

    #[error("plex.tv sign-in failed: {0}")]
    SignInFailed(String),

    // *arr errors
    #[error("{service} request failed: {message}")]
    ArrApi { service: String, message: String },

    // Prompt errors
    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Interrupted")]
    Interrupted,

    // Pattern errors
    #[error("Invalid filename pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => Error::Interrupted,
            other => Error::Prompt(other.to_string()),
        }
    }
}
