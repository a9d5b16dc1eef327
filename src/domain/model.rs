use crate::utils::error::{Result, TaxifareError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_PASSENGERS: u8 = 1;
pub const MAX_PASSENGERS: u8 = 8;

/// Format sent to the prediction service, e.g. `2025-11-15T10:00:00`.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const DEFAULT_PICKUP_ADDRESS: &str = "20 West 34th Street, New York, NY";
pub const DEFAULT_DROPOFF_ADDRESS: &str = "33 E 17th St, New York, NY";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Rejects anything outside WGS84 bounds. (0.0, 0.0) is a valid point.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let in_bounds = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !in_bounds {
            return Err(TaxifareError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Raw form input, before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideForm {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub passenger_count: u8,
}

impl Default for RideForm {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2025, 11, 15).unwrap_or_default(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            pickup_address: DEFAULT_PICKUP_ADDRESS.to_string(),
            dropoff_address: DEFAULT_DROPOFF_ADDRESS.to_string(),
            passenger_count: MIN_PASSENGERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideDescriptor {
    pub pickup_datetime: NaiveDateTime,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub passenger_count: u8,
}

impl RideDescriptor {
    pub fn new(
        pickup_datetime: NaiveDateTime,
        pickup_address: &str,
        dropoff_address: &str,
        passenger_count: u8,
    ) -> Result<Self> {
        let pickup_address = pickup_address.trim();
        let dropoff_address = dropoff_address.trim();

        if pickup_address.is_empty() {
            return Err(TaxifareError::InvalidRide {
                message: "pickup address cannot be empty".to_string(),
            });
        }
        if dropoff_address.is_empty() {
            return Err(TaxifareError::InvalidRide {
                message: "dropoff address cannot be empty".to_string(),
            });
        }
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
            return Err(TaxifareError::InvalidRide {
                message: format!(
                    "passenger count must be between {} and {}, got {}",
                    MIN_PASSENGERS, MAX_PASSENGERS, passenger_count
                ),
            });
        }

        Ok(Self {
            pickup_datetime,
            pickup_address: pickup_address.to_string(),
            dropoff_address: dropoff_address.to_string(),
            passenger_count,
        })
    }

    pub fn from_form(form: &RideForm) -> Result<Self> {
        Self::new(
            form.date.and_time(form.time),
            &form.pickup_address,
            &form.dropoff_address,
            form.passenger_count,
        )
    }

    pub fn pickup_datetime_iso(&self) -> String {
        self.pickup_datetime.format(ISO_DATETIME_FORMAT).to_string()
    }
}

/// A ride whose two addresses have both been resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub ride: RideDescriptor,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

/// Query parameters accepted by the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareQuery {
    pub pickup_datetime: String,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: u8,
}

impl From<&Trip> for FareQuery {
    fn from(trip: &Trip) -> Self {
        Self {
            pickup_datetime: trip.ride.pickup_datetime_iso(),
            pickup_longitude: trip.pickup.longitude,
            pickup_latitude: trip.pickup.latitude,
            dropoff_longitude: trip.dropoff.longitude,
            dropoff_latitude: trip.dropoff.latitude,
            passenger_count: trip.ride.passenger_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub fare: f64,
}

impl FareEstimate {
    pub fn formatted(&self) -> String {
        format!("${:.2}", self.fare)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltStage {
    Input,
    Pickup,
    Dropoff,
}

impl fmt::Display for HaltStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltStage::Input => write!(f, "ride details"),
            HaltStage::Pickup => write!(f, "pickup location"),
            HaltStage::Dropoff => write!(f, "destination"),
        }
    }
}

#[derive(Debug)]
pub struct Halt {
    pub stage: HaltStage,
    pub error: TaxifareError,
    /// Set when the run stopped at the destination after the pickup resolved.
    pub pickup: Option<Coordinate>,
}

/// Terminal result of one pipeline run.
#[derive(Debug)]
pub enum RideOutcome {
    Estimated { trip: Trip, fare: FareEstimate },
    Halted(Halt),
    PredictionFailed { trip: Trip, error: TaxifareError },
}

impl RideOutcome {
    pub fn trip(&self) -> Option<&Trip> {
        match self {
            RideOutcome::Estimated { trip, .. } | RideOutcome::PredictionFailed { trip, .. } => {
                Some(trip)
            }
            RideOutcome::Halted(_) => None,
        }
    }

    pub fn fare(&self) -> Option<FareEstimate> {
        match self {
            RideOutcome::Estimated { fare, .. } => Some(*fare),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TaxifareError> {
        match self {
            RideOutcome::Estimated { .. } => None,
            RideOutcome::Halted(halt) => Some(&halt.error),
            RideOutcome::PredictionFailed { error, .. } => Some(error),
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, RideOutcome::Halted(_))
    }
}
