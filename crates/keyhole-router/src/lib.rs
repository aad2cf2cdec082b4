//! Create path: validates a publish request and dispatches it to the
//! backend for its kind.

pub mod content_type;
pub mod error;
pub mod policy;
pub mod request;
pub mod router;

pub use error::CreateError;
pub use policy::{AllowList, AnyExtension, AnyTarget, ExtensionPolicy, LinkPolicy, WebTargets};
pub use request::{BlobUpload, CreateRequest, Created, Payload};
pub use router::{ContentRouter, Publisher, MAX_LINK_BYTES, MAX_TEXT_BYTES};
