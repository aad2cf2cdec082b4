//! HTTP surface for Keyhole: `POST /create` plus one resolve route per kind.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use config::{BlobBackend, GatewayConfig, MetadataBackend};
pub use state::AppState;
