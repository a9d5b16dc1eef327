pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpFarePredictor, NominatimGeocoder};
pub use config::toml_config::TomlConfig;
pub use core::{pipeline::RidePipeline, resolver::AddressResolver};
pub use domain::model::{Coordinate, FareEstimate, RideDescriptor, RideForm, RideOutcome, Trip};
pub use utils::error::{Result, TaxifareError};
