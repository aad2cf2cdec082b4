use crate::state::{AppState, DEFAULT_MAX_UPLOAD_BYTES};
use keyhole_core::{BlobStore, MetadataStore, Result};
use keyhole_generator::RandomGenerator;
use keyhole_resolver::ContentResolver;
use keyhole_router::{AllowList, ContentRouter, WebTargets};
use keyhole_storage::{
    Backends, FsBlobStore, InMemoryBlobStore, InMemoryMetadataStore, MySqlMetadataStore,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use typed_builder::TypedBuilder;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Default)]
pub enum MetadataBackend {
    #[default]
    InMemory,
    MySql {
        dsn: String,
        /// Create the tables on start-up if they are missing.
        ensure_schema: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub enum BlobBackend {
    #[default]
    InMemory,
    Fs {
        root: PathBuf,
    },
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    #[builder(default = default_listen_addr())]
    pub listen_addr: SocketAddr,
    #[builder(default, setter(strip_option, into))]
    pub public_base_url: Option<String>,
    #[builder(default)]
    pub metadata: MetadataBackend,
    #[builder(default)]
    pub blobs: BlobBackend,
    /// Extensions accepted for images; empty accepts any.
    #[builder(default)]
    pub image_extensions: Vec<String>,
    /// Extensions accepted for files; empty accepts any.
    #[builder(default)]
    pub file_extensions: Vec<String>,
    #[builder(default = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
    /// Refuse link targets that are not absolute http(s) URLs.
    #[builder(default)]
    pub web_links_only: bool,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl GatewayConfig {
    /// Connects the configured stores and wires the router and resolver over them.
    pub async fn build_state(&self) -> Result<AppState> {
        let blobs = match &self.blobs {
            BlobBackend::InMemory => None,
            BlobBackend::Fs { root } => Some(FsBlobStore::new(root)?),
        };

        let state = match (&self.metadata, blobs) {
            (MetadataBackend::InMemory, None) => {
                self.wire(InMemoryMetadataStore::new(), InMemoryBlobStore::new())
            }
            (MetadataBackend::InMemory, Some(blobs)) => {
                self.wire(InMemoryMetadataStore::new(), blobs)
            }
            (MetadataBackend::MySql { dsn, ensure_schema }, blobs) => {
                let metadata = MySqlMetadataStore::connect(dsn).await?;
                if *ensure_schema {
                    metadata.ensure_schema().await?;
                }
                match blobs {
                    Some(blobs) => self.wire(metadata, blobs),
                    None => self.wire(metadata, InMemoryBlobStore::new()),
                }
            }
        };

        Ok(state)
    }

    fn wire<M: MetadataStore, B: BlobStore>(&self, metadata: M, blobs: B) -> AppState {
        info!(
            metadata_store = std::any::type_name::<M>(),
            blob_store = std::any::type_name::<B>(),
            "wiring content stores"
        );

        let store = Arc::new(Backends::new(metadata, blobs));
        let mut router = ContentRouter::from_shared(Arc::clone(&store), RandomGenerator::new());
        if let Some(policy) = self.extension_policy() {
            router = router.with_policy(policy);
        }
        if self.web_links_only {
            router = router.with_link_policy(WebTargets);
        }
        let resolver = ContentResolver::from_shared(store);

        let state = AppState::new(Arc::new(router), Arc::new(resolver))
            .with_max_upload_bytes(self.max_upload_bytes);
        match &self.public_base_url {
            Some(base_url) => state.with_public_base_url(base_url.as_str()),
            None => state,
        }
    }

    fn extension_policy(&self) -> Option<AllowList> {
        if self.image_extensions.is_empty() && self.file_extensions.is_empty() {
            return None;
        }

        let mut policy = AllowList::new();
        if !self.image_extensions.is_empty() {
            policy = policy.images(&self.image_extensions);
        }
        if !self.file_extensions.is_empty() {
            policy = policy.files(&self.file_extensions);
        }
        Some(policy)
    }
}
