use thiserror::Error;

/// Text shown to the user whenever a refresh fails, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data";

/// Failures of the forecast pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request could not be sent or no response arrived.
    #[error("Network error while {context}: {source}")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("Provider request failed with status {status}: {body}")]
    Provider { status: u16, body: String },

    /// The response parsed (or failed to parse) into something that lacks
    /// a required section.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ForecastError {
    pub fn network(context: &'static str, source: reqwest::Error) -> Self {
        Self::Network { context, source }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// HTTP status carried by the error, if the provider was reached.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Generic message surfaced through the snapshot's error field.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

/// Rule violations of the saved-location collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location '{0}' is already saved")]
    AlreadySaved(String),

    #[error("Location '{0}' is the default location and cannot be removed")]
    DefaultNotRemovable(String),

    #[error("No saved location with id '{0}'")]
    NotFound(String),
}
