//! Error types and handling for `yrweather`

use thiserror::Error;

/// Main error type for forecast acquisition and presentation
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Network failures, non-success status codes and timeouts
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The downloaded document could not be parsed as a forecast feed
    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    /// A place was required but is not known
    #[error("Unknown place: {geoid}")]
    NotFound { geoid: String },

    /// Input or data that cannot be accepted
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Persistence failures
    #[error("Store error: {message}")]
    Store { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new malformed document error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create a new not-found error for the given geoid
    pub fn not_found<S: Into<String>>(geoid: S) -> Self {
        Self::NotFound {
            geoid: geoid.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for failures the refresh schedule absorbs into a backoff.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WeatherError::Transport { .. } | WeatherError::MalformedDocument { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Transport { .. } => {
                "Unable to download the forecast. Please check your internet connection."
                    .to_string()
            }
            WeatherError::MalformedDocument { .. } => {
                "The forecast provider returned data that could not be read.".to_string()
            }
            WeatherError::NotFound { geoid } => format!("No place is known with id {geoid}."),
            WeatherError::Validation { message } => format!("Invalid input: {message}"),
            WeatherError::Store { .. } => {
                "Storage operation failed. You may need to clear the forecast store.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for WeatherError {
    fn from(err: fjall::Error) -> Self {
        WeatherError::store(err.to_string())
    }
}

impl From<postcard::Error> for WeatherError {
    fn from(err: postcard::Error) -> Self {
        WeatherError::store(format!("encoding: {err}"))
    }
}

impl From<tokio::task::JoinError> for WeatherError {
    fn from(err: tokio::task::JoinError) -> Self {
        WeatherError::store(format!("background task failed: {err}"))
    }
}
