pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TaxifareError};
use crate::utils::validation;
use chrono::{NaiveDate, NaiveTime};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

pub fn parse_ride_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| TaxifareError::ValidationError {
        message: format!("invalid date '{}' (expected YYYY-MM-DD): {}", value, e),
    })
}

pub fn parse_ride_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| TaxifareError::ValidationError {
            message: format!("invalid time '{}' (expected HH:MM): {}", value, e),
        })
}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::adapters::nominatim::{DEFAULT_GEOCODER_ENDPOINT, DEFAULT_USER_AGENT};
    use crate::adapters::prediction::DEFAULT_PREDICTION_ENDPOINT;
    use crate::domain::model::RideForm;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "taxifare")]
    #[command(about = "Estimate a New York taxi fare between two addresses")]
    pub struct CliConfig {
        #[arg(long, value_parser = parse_ride_date, help = "Pickup date (YYYY-MM-DD)")]
        pub date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_ride_time, help = "Pickup time (HH:MM)")]
        pub time: Option<NaiveTime>,

        #[arg(long, help = "Pickup address")]
        pub pickup: Option<String>,

        #[arg(long, help = "Destination address")]
        pub dropoff: Option<String>,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
        pub passengers: Option<u8>,

        #[arg(long)]
        pub geocoder_url: Option<String>,

        #[arg(long)]
        pub prediction_url: Option<String>,

        #[arg(long)]
        pub user_agent: Option<String>,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long, help = "TOML file with service endpoints and ride defaults")]
        pub config: Option<PathBuf>,

        #[arg(long, help = "Prompt for rides on stdin until 'quit'")]
        pub interactive: bool,

        #[arg(long, help = "Print the outcome as JSON")]
        pub json: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Overwrites the form fields given on the command line.
        pub fn apply_ride_fields(&self, form: &mut RideForm) {
            if let Some(date) = self.date {
                form.date = date;
            }
            if let Some(time) = self.time {
                form.time = time;
            }
            if let Some(pickup) = &self.pickup {
                form.pickup_address = pickup.clone();
            }
            if let Some(dropoff) = &self.dropoff {
                form.dropoff_address = dropoff.clone();
            }
            if let Some(passengers) = self.passengers {
                form.passenger_count = passengers;
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn geocoder_endpoint(&self) -> &str {
            self.geocoder_url.as_deref().unwrap_or(DEFAULT_GEOCODER_ENDPOINT)
        }

        fn user_agent(&self) -> &str {
            self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
        }

        fn prediction_endpoint(&self) -> &str {
            self.prediction_url
                .as_deref()
                .unwrap_or(DEFAULT_PREDICTION_ENDPOINT)
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)?;
            if let Some(timeout) = self.timeout_seconds {
                validation::validate_positive_number("timeout_seconds", timeout, 1)?;
            }
            Ok(())
        }
    }

}

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validation::validate_url("geocoder.endpoint", config.geocoder_endpoint())?;
    validation::validate_url("prediction.endpoint", config.prediction_endpoint())?;
    validation::validate_non_empty_string("geocoder.user_agent", config.user_agent())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ride_time_accepts_optional_seconds() {
        assert_eq!(
            parse_ride_time("10:00").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_ride_time("07:05:30").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 30).unwrap()
        );
        assert!(parse_ride_time("25:00").is_err());
        assert!(parse_ride_time("noon").is_err());
    }

    #[test]
    fn test_parse_ride_date() {
        assert_eq!(
            parse_ride_date("2025-11-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
        );
        assert!(parse_ride_date("15/11/2025").is_err());
        assert!(parse_ride_date("2025-02-30").is_err());
    }
}
