// Presentation layer: the form prompt, the map view and the result panel.

pub mod form;
pub mod map;
pub mod report;

pub use form::{read_form, FormInput};
pub use map::MapView;
pub use report::{render_outcome, RideReport};
