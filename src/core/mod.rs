pub mod pipeline;
pub mod resolver;

pub use crate::domain::model::{FareEstimate, RideDescriptor, RideForm, RideOutcome, Trip};
pub use crate::domain::ports::{ConfigProvider, FarePredictor, Geocoder};
pub use crate::utils::error::Result;
