use keyhole_resolver::Resolver;
use keyhole_router::Publisher;
use std::sync::Arc;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    publisher: Arc<dyn Publisher>,
    resolver: Arc<dyn Resolver>,
    base_url: Option<String>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(publisher: Arc<dyn Publisher>, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            publisher,
            resolver,
            base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Prefixes every returned `url` with `base_url` (a trailing `/` is dropped).
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.base_url = (!base_url.is_empty()).then_some(base_url);
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn publisher(&self) -> &dyn Publisher {
        self.publisher.as_ref()
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn public_url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base_url) => format!("{base_url}{path}"),
            None => path.to_string(),
        }
    }
}
