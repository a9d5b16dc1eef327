use crate::domain::model::Coordinate;
use crate::domain::ports::Geocoder;
use crate::utils::error::{Result, TaxifareError};
use std::collections::HashMap;

/// Address lookup with per-session memoization.
///
/// Only definitive answers are remembered: a coordinate, or the geocoder
/// saying it knows no such place. Transport and parse failures go straight
/// back to the caller so the next interaction asks again.
pub struct AddressResolver<G: Geocoder> {
    geocoder: G,
    cache: HashMap<String, Option<Coordinate>>,
}

impl<G: Geocoder> AddressResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, address: &str) -> Result<Coordinate> {
        if address.trim().is_empty() {
            return Err(TaxifareError::InvalidRide {
                message: "address cannot be empty".to_string(),
            });
        }

        let cached = match self.cache.get(address).copied() {
            Some(entry) => {
                tracing::debug!("[CACHE HIT] {}", address);
                entry
            }
            None => {
                let result = self.geocoder.geocode(address).await?;
                self.cache.insert(address.to_string(), result);
                result
            }
        };

        cached.ok_or_else(|| TaxifareError::AddressNotFound {
            address: address.to_string(),
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
