use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxifareError {
    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    #[error("Geocoding service unavailable: {message}")]
    GeocoderUnavailable { message: String },

    #[error("Geocoding failed: {message}")]
    GeocodingError { message: String },

    #[error("Coordinate out of range: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Prediction request failed: {message}")]
    PredictionRequestError { status: Option<u16>, message: String },

    #[error("The API returned a valid response but no fare")]
    MissingFare,

    #[error("Prediction response could not be parsed: {message}")]
    MalformedPrediction { message: String },

    #[error("Invalid ride: {message}")]
    InvalidRide { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Geocoding,
    Prediction,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TaxifareError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TaxifareError::InvalidRide { .. } | TaxifareError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            TaxifareError::AddressNotFound { .. }
            | TaxifareError::GeocoderUnavailable { .. }
            | TaxifareError::GeocodingError { .. }
            | TaxifareError::InvalidCoordinate { .. } => ErrorCategory::Geocoding,
            TaxifareError::PredictionRequestError { .. }
            | TaxifareError::MissingFare
            | TaxifareError::MalformedPrediction { .. } => ErrorCategory::Prediction,
            TaxifareError::ConfigError { .. }
            | TaxifareError::ConfigValidationError { .. }
            | TaxifareError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TaxifareError::ApiError(_)
            | TaxifareError::IoError(_)
            | TaxifareError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TaxifareError::AddressNotFound { .. }
            | TaxifareError::InvalidRide { .. }
            | TaxifareError::ValidationError { .. } => ErrorSeverity::Low,
            TaxifareError::GeocoderUnavailable { .. }
            | TaxifareError::PredictionRequestError { .. }
            | TaxifareError::ApiError(_) => ErrorSeverity::Medium,
            TaxifareError::GeocodingError { .. }
            | TaxifareError::InvalidCoordinate { .. }
            | TaxifareError::MissingFare
            | TaxifareError::MalformedPrediction { .. }
            | TaxifareError::SerializationError(_) => ErrorSeverity::High,
            TaxifareError::ConfigError { .. }
            | TaxifareError::ConfigValidationError { .. }
            | TaxifareError::InvalidConfigValueError { .. }
            | TaxifareError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether the same request may succeed later without any change of input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TaxifareError::GeocoderUnavailable { .. }
                | TaxifareError::PredictionRequestError { .. }
                | TaxifareError::ApiError(_)
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TaxifareError::AddressNotFound { address } => {
                format!("Could not find the address \"{}\".", address)
            }
            TaxifareError::GeocoderUnavailable { message } => {
                format!("The geocoding service is currently unavailable: {}", message)
            }
            TaxifareError::GeocodingError { message } => {
                format!("An error occurred while looking up the address: {}", message)
            }
            TaxifareError::InvalidCoordinate {
                latitude,
                longitude,
            } => format!(
                "The geocoder returned an impossible location ({}, {}).",
                latitude, longitude
            ),
            TaxifareError::PredictionRequestError { message, .. } => {
                format!("The fare request failed: {}", message)
            }
            TaxifareError::MissingFare => {
                "The API returned a valid response but no fare.".to_string()
            }
            TaxifareError::MalformedPrediction { message } => {
                format!("The API response could not be understood: {}", message)
            }
            TaxifareError::InvalidRide { message } => format!("Invalid ride details: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the ride details and submit the form again.",
            ErrorCategory::Geocoding => match self {
                TaxifareError::GeocoderUnavailable { .. } => {
                    "Wait a moment and try again; the geocoding service may be overloaded."
                }
                _ => "Try a more specific address, including the city and state.",
            },
            ErrorCategory::Prediction if self.is_transient() => {
                "Check the prediction endpoint URL and that the service is running, then try again."
            }
            ErrorCategory::Prediction => {
                "The prediction service answered unexpectedly; check that the endpoint URL points at a fare API."
            }
            ErrorCategory::Configuration => "Fix the configuration flags or the TOML file.",
            ErrorCategory::System => "Check your network connection and try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxifareError>;

/// Renders an error together with every `source()` below it, joined by `": "`.
///
/// reqwest only prints its outermost layer, which hides the actual cause
/// ("Connection refused", a DNS failure, a timeout).
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fare_is_distinct_from_request_failure() {
        let missing = TaxifareError::MissingFare;
        let failed = TaxifareError::PredictionRequestError {
            status: Some(500),
            message: "HTTP 500 Internal Server Error".to_string(),
        };

        assert_eq!(missing.category(), ErrorCategory::Prediction);
        assert_eq!(failed.category(), ErrorCategory::Prediction);
        assert!(missing.to_string().contains("valid response but no fare"));
        assert!(failed.to_string().contains("500"));
        assert!(!missing.is_transient());
        assert!(failed.is_transient());
    }

    #[test]
    fn test_severity_ordering() {
        let not_found = TaxifareError::AddressNotFound {
            address: "nowhere".to_string(),
        };
        let config = TaxifareError::ConfigValidationError {
            field: "geocoder.endpoint".to_string(),
            message: "must not be empty".to_string(),
        };

        assert_eq!(not_found.severity(), ErrorSeverity::Low);
        assert_eq!(config.severity(), ErrorSeverity::Critical);
        assert!(not_found.severity() < config.severity());
    }

    #[test]
    fn test_user_friendly_message_quotes_address() {
        let err = TaxifareError::AddressNotFound {
            address: "asdfghjkl".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Could not find the address \"asdfghjkl\"."
        );
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_root_cause() {
        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));

        assert_eq!(err.to_string(), "error sending request");
        assert_eq!(
            error_chain(&err),
            "error sending request: Connection refused (os error 111)"
        );
    }

    #[test]
    fn test_recovery_suggestion_depends_on_transience() {
        let failed = TaxifareError::PredictionRequestError {
            status: None,
            message: "tcp connect error".to_string(),
        };
        let malformed = TaxifareError::MalformedPrediction {
            message: "expected value".to_string(),
        };

        assert!(failed.recovery_suggestion().contains("try again"));
        assert!(!malformed.recovery_suggestion().contains("try again"));
    }
}
