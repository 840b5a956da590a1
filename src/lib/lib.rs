pub mod compound;
pub mod engine;
pub mod error;
pub mod model;
pub mod params;
pub mod plot;
pub mod samples;

pub use error::{BetaBinomialError, Result};
pub use model::{BetaBinomialModel, HyperEstimate};
pub use params::HyperParams;
pub use samples::SampleMatrix;
