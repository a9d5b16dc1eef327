use crate::domain::model::{Coordinate, FareEstimate, Trip};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Free-text address resolution. `Ok(None)` means the service answered but
/// knows no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>>;
}

#[async_trait]
pub trait FarePredictor: Send + Sync {
    async fn predict(&self, trip: &Trip) -> Result<FareEstimate>;
}

pub trait ConfigProvider: Send + Sync {
    fn geocoder_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn prediction_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}
