use thiserror::Error;

/// Classified failure of a weather operation.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("City '{0}' not found. Please check the spelling.")]
    CityNotFound(String),

    #[error("No weather data found at coordinates {0}.")]
    LocationNotFound(String),

    #[error("Invalid API key. Please check your configuration.")]
    AuthError,

    #[error("Weather service is currently unavailable (status {0}). Please try again later.")]
    ServiceUnavailable(u16),

    #[error("Error fetching weather data: status {0}")]
    UpstreamError(u16),

    #[error("Request timed out. Please check your internet connection.")]
    NetworkTimeout,

    #[error("Network error. Please check your internet connection. ({0})")]
    NetworkError(String),

    #[error("An unexpected error occurred: {0}")]
    UnexpectedError(String),
}

impl WeatherError {
    pub(crate) fn empty_city() -> Self {
        WeatherError::InvalidInput("City name cannot be empty".to_string())
    }

    /// Classify a transport-level failure from `reqwest`.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::NetworkTimeout
        } else if err.is_connect() {
            WeatherError::NetworkError(err.to_string())
        } else {
            WeatherError::UnexpectedError(err.to_string())
        }
    }
}
