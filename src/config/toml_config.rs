use crate::adapters::nominatim::{DEFAULT_GEOCODER_ENDPOINT, DEFAULT_USER_AGENT};
use crate::adapters::prediction::DEFAULT_PREDICTION_ENDPOINT;
use crate::config::{parse_ride_date, parse_ride_time, validate_provider, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::RideForm;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TaxifareError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub ride: Option<RideDefaults>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_prediction_endpoint")]
    pub endpoint: String,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_prediction_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Prefilled form values; dates and times are kept as text until applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RideDefaults {
    pub date: Option<String>,
    pub time: Option<String>,
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub passengers: Option<u8>,
}

fn default_geocoder_endpoint() -> String {
    DEFAULT_GEOCODER_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_prediction_endpoint() -> String {
    DEFAULT_PREDICTION_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TaxifareError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TaxifareError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TaxifareError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_ride_defaults(&self, form: &mut RideForm) -> Result<()> {
        let Some(ride) = &self.ride else {
            return Ok(());
        };

        if let Some(date) = &ride.date {
            form.date = parse_ride_date(date)?;
        }
        if let Some(time) = &ride.time {
            form.time = parse_ride_time(time)?;
        }
        if let Some(pickup) = &ride.pickup {
            form.pickup_address = pickup.clone();
        }
        if let Some(dropoff) = &ride.dropoff {
            form.dropoff_address = dropoff.clone();
        }
        if let Some(passengers) = ride.passengers {
            form.passenger_count = passengers;
        }
        Ok(())
    }

    #[cfg(feature = "cli")]
    pub fn apply_cli_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(url) = &cli.geocoder_url {
            self.geocoder.endpoint = url.clone();
        }
        if let Some(user_agent) = &cli.user_agent {
            self.geocoder.user_agent = user_agent.clone();
        }
        if let Some(url) = &cli.prediction_url {
            self.prediction.endpoint = url.clone();
        }
        if let Some(timeout) = cli.timeout_seconds {
            self.http.timeout_seconds = timeout;
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_provider(self)?;
        validation::validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;

        if let Some(ride) = &self.ride {
            if let Some(passengers) = ride.passengers {
                validation::validate_range("ride.passengers", passengers, 1, 8)?;
            }
            if let Some(date) = &ride.date {
                parse_ride_date(date)?;
            }
            if let Some(time) = &ride.time {
                parse_ride_time(time)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder.endpoint
    }

    fn user_agent(&self) -> &str {
        &self.geocoder.user_agent
    }

    fn prediction_endpoint(&self) -> &str {
        &self.prediction.endpoint
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
