mod create;
mod health;
mod resolve;

pub use create::create_handler;
pub use health::health_handler;
pub use resolve::{resolve_file, resolve_image, resolve_link, resolve_text};
