use crate::app::map::MapView;
use crate::domain::model::{Coordinate, HaltStage, RideDescriptor, RideOutcome, Trip};
use crate::utils::error::Result;
use serde::Serialize;

pub const FARE_CAPTION: &str = "This is an approximation based on historical NYC taxi data.";

fn trip_lines(trip: &Trip) -> Vec<String> {
    let ride = &trip.ride;
    let mut lines = vec![
        format!("Date of departure: {}", ride.pickup_datetime.date()),
        format!("Time of departure: {}", ride.pickup_datetime.time()),
        format!("Pickup: {}", ride.pickup_address),
        format!("Pickup Latitude and Longitude: {}", trip.pickup),
        format!("Destination: {}", ride.dropoff_address),
        format!("Destination Latitude and Longitude: {}", trip.dropoff),
        format!("Total number of passengers: {}", ride.passenger_count),
        String::new(),
    ];

    let map = MapView::for_trip(trip);
    lines.push(format!("🗺️ Map (zoom {})", map.zoom));
    for point in &map.points {
        lines.push(format!("  {:<8} {}", point.label, point.coordinate));
    }
    if let Some(url) = map.osm_url() {
        lines.push(format!("  {}", url));
    }
    lines
}

/// Text panel shown to the user for one interaction.
pub fn render_outcome(outcome: &RideOutcome) -> String {
    let mut lines = vec!["🚖 Taxi Fare Prediction".to_string(), String::new()];

    match outcome {
        RideOutcome::Estimated { trip, fare } => {
            lines.extend(trip_lines(trip));
            lines.push(String::new());
            lines.push("💵 Estimated Fare".to_string());
            lines.push(format!("✅ Estimated Fare: {}", fare.formatted()));
            lines.push(FARE_CAPTION.to_string());
        }
        RideOutcome::PredictionFailed { trip, error } => {
            lines.extend(trip_lines(trip));
            lines.push(String::new());
            lines.push("💵 Estimated Fare".to_string());
            lines.push(format!("❌ {}", error.user_friendly_message()));
            lines.push(format!("💡 {}", error.recovery_suggestion()));
        }
        RideOutcome::Halted(halt) => {
            let headline = match halt.stage {
                HaltStage::Input => "Invalid ride details".to_string(),
                stage => format!("Could not resolve the {}", stage),
            };
            if let Some(pickup) = halt.pickup {
                lines.push(format!("Pickup Latitude and Longitude: {}", pickup));
            }
            lines.push(format!("⚠️ {}: {}", headline, halt.error.user_friendly_message()));
            lines.push(format!("💡 {}", halt.error.recovery_suggestion()));
        }
    }

    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Estimated,
    Halted,
    PredictionFailed,
}

/// Machine-readable summary of an outcome, for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RideReport {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<HaltStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ride: Option<RideDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RideReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&RideOutcome> for RideReport {
    fn from(outcome: &RideOutcome) -> Self {
        let status = match outcome {
            RideOutcome::Estimated { .. } => ReportStatus::Estimated,
            RideOutcome::Halted(_) => ReportStatus::Halted,
            RideOutcome::PredictionFailed { .. } => ReportStatus::PredictionFailed,
        };
        let halted_at = match outcome {
            RideOutcome::Halted(halt) => Some(halt.stage),
            _ => None,
        };
        let trip = outcome.trip();
        let fare = outcome.fare();
        let pickup = match outcome {
            RideOutcome::Halted(halt) => halt.pickup,
            _ => trip.map(|t| t.pickup),
        };

        Self {
            status,
            halted_at,
            ride: trip.map(|t| t.ride.clone()),
            pickup,
            dropoff: trip.map(|t| t.dropoff),
            map: trip.map(MapView::for_trip),
            fare: fare.map(|f| f.fare),
            fare_display: fare.map(|f| f.formatted()),
            error: outcome.error().map(|e| e.user_friendly_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FareEstimate, Halt, RideForm};
    use crate::utils::error::TaxifareError;

    fn trip() -> Trip {
        Trip {
            ride: RideDescriptor::from_form(&RideForm::default()).unwrap(),
            pickup: Coordinate::new(40.7484, -73.9857).unwrap(),
            dropoff: Coordinate::new(40.7376, -73.9901).unwrap(),
        }
    }

    #[test]
    fn test_render_estimated_fare() {
        let outcome = RideOutcome::Estimated {
            trip: trip(),
            fare: FareEstimate { fare: 12.5 },
        };

        let text = render_outcome(&outcome);

        assert!(text.contains("Estimated Fare: $12.50"));
        assert!(text.contains(FARE_CAPTION));
        assert!(text.contains("Date of departure: 2025-11-15"));
        assert!(text.contains("Time of departure: 10:00:00"));
        assert!(text.contains("Pickup Latitude and Longitude: 40.748400, -73.985700"));
        assert!(text.contains("openstreetmap.org/directions"));
    }

    #[test]
    fn test_render_missing_fare() {
        let outcome = RideOutcome::PredictionFailed {
            trip: trip(),
            error: TaxifareError::MissingFare,
        };

        let text = render_outcome(&outcome);

        assert!(text.contains("valid response but no fare"));
        assert!(!text.contains(FARE_CAPTION));
        // The map is still drawn when only the prediction failed.
        assert!(text.contains("Map (zoom 11)"));
    }

    #[test]
    fn test_render_halt_names_the_stage() {
        let outcome = RideOutcome::Halted(Halt {
            stage: HaltStage::Dropoff,
            error: TaxifareError::AddressNotFound {
                address: "zzzz".to_string(),
            },
            pickup: Some(Coordinate::new(40.7484, -73.9857).unwrap()),
        });

        let text = render_outcome(&outcome);

        assert!(text.contains("Pickup Latitude and Longitude: 40.748400, -73.985700"));
        assert!(text.contains("Could not resolve the destination"));
        assert!(text.contains("\"zzzz\""));
        assert!(!text.contains("Estimated Fare"));
        assert!(!text.contains("Destination Latitude"));

        let report = RideReport::from(&outcome);
        assert_eq!(report.pickup, Some(Coordinate::new(40.7484, -73.9857).unwrap()));
        assert!(report.dropoff.is_none());
    }

    #[test]
    fn test_report_json_for_estimate() {
        let outcome = RideOutcome::Estimated {
            trip: trip(),
            fare: FareEstimate { fare: 12.5 },
        };

        let json: serde_json::Value =
            serde_json::from_str(&RideReport::from(&outcome).to_json().unwrap()).unwrap();

        assert_eq!(json["status"], "estimated");
        assert_eq!(json["fare"], 12.5);
        assert_eq!(json["fare_display"], "$12.50");
        assert_eq!(json["ride"]["pickup_datetime"], "2025-11-15T10:00:00");
        assert_eq!(json["ride"]["passenger_count"], 1);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_report_json_for_halt() {
        let outcome = RideOutcome::Halted(Halt {
            stage: HaltStage::Pickup,
            error: TaxifareError::GeocoderUnavailable {
                message: "HTTP 503 Service Unavailable".to_string(),
            },
            pickup: None,
        });

        let report = RideReport::from(&outcome);

        assert_eq!(report.status, ReportStatus::Halted);
        assert_eq!(report.halted_at, Some(HaltStage::Pickup));
        assert!(report.ride.is_none());
        assert!(report.error.unwrap().contains("503"));
    }
}
