use crate::core::resolver::AddressResolver;
use crate::domain::model::{
    Coordinate, Halt, HaltStage, RideDescriptor, RideForm, RideOutcome, Trip,
};
use crate::domain::ports::{FarePredictor, Geocoder};
use crate::utils::error::TaxifareError;

/// Runs one ride interaction from form input to fare.
///
/// The pipeline owns the address resolver, so its memoization lives exactly
/// as long as the pipeline does (one CLI invocation or one interactive
/// session).
pub struct RidePipeline<G: Geocoder, P: FarePredictor> {
    resolver: AddressResolver<G>,
    predictor: P,
}

impl<G: Geocoder, P: FarePredictor> RidePipeline<G, P> {
    pub fn new(geocoder: G, predictor: P) -> Self {
        Self {
            resolver: AddressResolver::new(geocoder),
            predictor,
        }
    }

    pub fn resolver(&self) -> &AddressResolver<G> {
        &self.resolver
    }

    pub async fn run_form(&mut self, form: &RideForm) -> RideOutcome {
        match RideDescriptor::from_form(form) {
            Ok(ride) => self.run(&ride).await,
            Err(error) => {
                tracing::warn!("⚠️ Invalid ride details: {}", error);
                RideOutcome::Halted(Halt {
                    stage: HaltStage::Input,
                    error,
                    pickup: None,
                })
            }
        }
    }

    pub async fn run(&mut self, ride: &RideDescriptor) -> RideOutcome {
        tracing::info!(
            "Estimating ride {} → {} at {} for {} passenger(s)",
            ride.pickup_address,
            ride.dropoff_address,
            ride.pickup_datetime_iso(),
            ride.passenger_count
        );

        let pickup = match self.resolver.resolve(&ride.pickup_address).await {
            Ok(coordinate) => coordinate,
            Err(error) => return halt(HaltStage::Pickup, error, None),
        };
        tracing::info!("Pickup resolved to {}", pickup);

        let dropoff = match self.resolver.resolve(&ride.dropoff_address).await {
            Ok(coordinate) => coordinate,
            Err(error) => return halt(HaltStage::Dropoff, error, Some(pickup)),
        };
        tracing::info!("Destination resolved to {}", dropoff);

        let trip = Trip {
            ride: ride.clone(),
            pickup,
            dropoff,
        };

        match self.predictor.predict(&trip).await {
            Ok(fare) => {
                tracing::info!("✅ Estimated fare: {}", fare.formatted());
                RideOutcome::Estimated { trip, fare }
            }
            Err(error) => {
                tracing::error!("❌ Fare prediction failed: {}", error);
                RideOutcome::PredictionFailed { trip, error }
            }
        }
    }
}

fn halt(stage: HaltStage, error: TaxifareError, pickup: Option<Coordinate>) -> RideOutcome {
    tracing::warn!("⚠️ Could not resolve {}: {}", stage, error);
    RideOutcome::Halted(Halt {
        stage,
        error,
        pickup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FareEstimate;
    use crate::utils::error::{Result, TaxifareError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct TableGeocoder {
        places: Arc<HashMap<String, Coordinate>>,
        calls: Arc<AtomicUsize>,
    }

    impl TableGeocoder {
        fn with(places: &[(&str, f64, f64)]) -> Self {
            Self {
                places: Arc::new(
                    places
                        .iter()
                        .map(|(n, lat, lon)| (n.to_string(), Coordinate::new(*lat, *lon).unwrap()))
                        .collect(),
                ),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn geocode(&self, address: &str) -> Result<Option<Coordinate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.places.get(address).copied())
        }
    }

    #[derive(Clone)]
    struct FixedPredictor {
        fare: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedPredictor {
        fn new(fare: Option<f64>) -> Self {
            Self {
                fare,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FarePredictor for FixedPredictor {
        async fn predict(&self, _trip: &Trip) -> Result<FareEstimate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fare
                .map(|fare| FareEstimate { fare })
                .ok_or(TaxifareError::MissingFare)
        }
    }

    fn form(pickup: &str, dropoff: &str) -> RideForm {
        RideForm {
            pickup_address: pickup.to_string(),
            dropoff_address: dropoff.to_string(),
            ..RideForm::default()
        }
    }

    fn manhattan() -> TableGeocoder {
        TableGeocoder::with(&[
            ("Empire State Building", 40.7484, -73.9857),
            ("Union Square", 40.7359, -73.9911),
        ])
    }

    #[tokio::test]
    async fn test_run_estimates_fare() {
        let predictor = FixedPredictor::new(Some(12.5));
        let mut pipeline = RidePipeline::new(manhattan(), predictor.clone());

        let outcome = pipeline
            .run_form(&form("Empire State Building", "Union Square"))
            .await;

        assert_eq!(outcome.fare(), Some(FareEstimate { fare: 12.5 }));
        let trip = outcome.trip().unwrap();
        assert_eq!(trip.pickup.latitude, 40.7484);
        assert_eq!(trip.dropoff.longitude, -73.9911);
        assert_eq!(predictor.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_pickup_halts_before_prediction() {
        let geocoder = manhattan();
        let predictor = FixedPredictor::new(Some(12.5));
        let mut pipeline = RidePipeline::new(geocoder.clone(), predictor.clone());

        let outcome = pipeline.run_form(&form("asdkjh qwe", "Union Square")).await;

        match outcome {
            RideOutcome::Halted(Halt {
                stage,
                error,
                pickup,
            }) => {
                assert_eq!(stage, HaltStage::Pickup);
                assert!(matches!(error, TaxifareError::AddressNotFound { .. }));
                assert!(pickup.is_none());
            }
            other => panic!("expected halt, got {:?}", other),
        }
        // The dropoff is never looked up once the pickup fails.
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_dropoff_halts_before_prediction() {
        let predictor = FixedPredictor::new(Some(12.5));
        let mut pipeline = RidePipeline::new(manhattan(), predictor.clone());

        let outcome = pipeline
            .run_form(&form("Empire State Building", "nowhere at all"))
            .await;

        match outcome {
            RideOutcome::Halted(Halt {
                stage: HaltStage::Dropoff,
                pickup,
                ..
            }) => {
                // The resolved pickup is kept for display.
                assert_eq!(pickup, Some(Coordinate::new(40.7484, -73.9857).unwrap()));
            }
            other => panic!("expected dropoff halt, got {:?}", other),
        }
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_halts_without_network() {
        let geocoder = manhattan();
        let predictor = FixedPredictor::new(Some(12.5));
        let mut pipeline = RidePipeline::new(geocoder.clone(), predictor.clone());

        let mut bad = form("Empire State Building", "Union Square");
        bad.passenger_count = 9;
        let outcome = pipeline.run_form(&bad).await;

        assert!(matches!(
            outcome,
            RideOutcome::Halted(Halt {
                stage: HaltStage::Input,
                ..
            })
        ));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_prediction_failure_keeps_trip() {
        let predictor = FixedPredictor::new(None);
        let mut pipeline = RidePipeline::new(manhattan(), predictor);

        let outcome = pipeline
            .run_form(&form("Empire State Building", "Union Square"))
            .await;

        assert!(matches!(
            outcome,
            RideOutcome::PredictionFailed {
                error: TaxifareError::MissingFare,
                ..
            }
        ));
        assert!(outcome.trip().is_some());
    }

    #[tokio::test]
    async fn test_session_reuses_cached_addresses() {
        let geocoder = manhattan();
        let mut pipeline = RidePipeline::new(geocoder.clone(), FixedPredictor::new(Some(9.0)));
        let ride = form("Empire State Building", "Union Square");

        pipeline.run_form(&ride).await;
        pipeline.run_form(&ride).await;

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.resolver().cached_len(), 2);
    }
}
