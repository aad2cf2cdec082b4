//! Resolve path: turns a kind and identifier back into a response
//! descriptor (redirect, text body, or binary stream).

pub mod error;
pub mod resolver;
pub mod response;

pub use error::ResolveError;
pub use resolver::{ContentResolver, Resolver};
pub use response::ResponseDescriptor;
