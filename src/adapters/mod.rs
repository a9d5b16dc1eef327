// Adapters layer: HTTP implementations of the domain ports.

pub mod nominatim;
pub mod prediction;

pub use nominatim::NominatimGeocoder;
pub use prediction::HttpFarePredictor;
