mod create;
mod error;
mod health;

pub use create::{CreateBody, CreateResponse};
pub use error::ErrorResponse;
pub use health::HealthResponse;
