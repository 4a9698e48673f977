//! Remote prediction-service backend over HTTP.

mod http_client;
mod subsystem;

pub use http_client::{HttpClient, PredictionHttpError, PredictionHttpErrorKind};
pub use subsystem::RemotePredictionSubsystem;
