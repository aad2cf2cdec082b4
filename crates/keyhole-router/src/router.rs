use crate::content_type;
use crate::error::CreateError;
use crate::policy::{AnyExtension, AnyTarget, ExtensionPolicy, LinkPolicy};
use crate::request::{BlobUpload, CreateRequest, Created, Payload};
use async_trait::async_trait;
use keyhole_core::{
    Backend, ContentStore, EntryKey, Extension, Identifier, Kind, NewBlob, NewContent,
    StorageError,
};
use keyhole_generator::Generator;
use std::sync::Arc;
use tracing::{debug, error, info};

type Result<T> = std::result::Result<T, CreateError>;

/// Longest accepted link target in bytes (a MySQL `TEXT` column).
pub const MAX_LINK_BYTES: usize = 65_535;
/// Longest accepted text body in bytes (a MySQL `MEDIUMTEXT` column).
pub const MAX_TEXT_BYTES: usize = 16_777_215;

#[async_trait]
pub trait Publisher: Send + Sync + 'static {
    /// Validates and stores one entry, returning its identifier and public path.
    async fn create(&self, request: CreateRequest) -> Result<Created>;
}

/// Validates creation requests and dispatches them to the store for their kind.
///
/// Every validation runs before the identifier is minted, so a rejected
/// request never touches the store. Each accepted request performs exactly
/// one store write, without retries.
pub struct ContentRouter<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    policy: Arc<dyn ExtensionPolicy>,
    link_policy: Arc<dyn LinkPolicy>,
}

impl<S, G> Clone for ContentRouter<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            policy: Arc::clone(&self.policy),
            link_policy: Arc::clone(&self.link_policy),
        }
    }
}

impl<S: ContentStore, G: Generator> ContentRouter<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self::from_shared(Arc::new(store), generator)
    }

    /// Builds a router over a store that the resolver also reads from.
    pub fn from_shared(store: Arc<S>, generator: G) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            policy: Arc::new(AnyExtension),
            link_policy: Arc::new(AnyTarget),
        }
    }

    pub fn with_policy(mut self, policy: impl ExtensionPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_link_policy(mut self, policy: impl LinkPolicy) -> Self {
        self.link_policy = Arc::new(policy);
        self
    }

    fn validate(&self, kind: Kind, payload: Payload) -> Result<(Option<Extension>, NewContent)> {
        match (kind.backend(), payload) {
            (Backend::Metadata(_), Payload::Text(value)) => {
                if value.is_empty() {
                    return Err(CreateError::InvalidPayload(format!(
                        "{kind} payload must not be empty"
                    )));
                }
                let limit = match kind {
                    Kind::Link => MAX_LINK_BYTES,
                    _ => MAX_TEXT_BYTES,
                };
                if value.len() > limit {
                    return Err(CreateError::InvalidPayload(format!(
                        "{kind} payload is {} bytes, the limit is {limit}",
                        value.len()
                    )));
                }
                if kind == Kind::Link {
                    self.validate_target(&value)?;
                }
                Ok((None, NewContent::Value(value)))
            }
            (Backend::Blob(_), Payload::Blob(upload)) => self.validate_upload(kind, upload),
            (Backend::Metadata(_), Payload::Blob(_)) => Err(CreateError::InvalidPayload(format!(
                "{kind} expects a text payload"
            ))),
            (Backend::Blob(_), Payload::Text(_)) => Err(CreateError::InvalidPayload(format!(
                "{kind} expects a binary payload"
            ))),
        }
    }

    /// A link target must fit in a `Location` header and pass the link policy.
    fn validate_target(&self, target: &str) -> Result<()> {
        if target.chars().any(char::is_control) {
            return Err(CreateError::InvalidPayload(
                "link target must not contain control characters".to_string(),
            ));
        }

        self.link_policy
            .check(target)
            .map_err(CreateError::InvalidPayload)
    }

    fn validate_upload(
        &self,
        kind: Kind,
        upload: BlobUpload,
    ) -> Result<(Option<Extension>, NewContent)> {
        let body = upload
            .body
            .ok_or_else(|| CreateError::InvalidPayload(format!("{kind} requires a file")))?;

        let ext = upload
            .ext
            .as_deref()
            .filter(|ext| !ext.is_empty())
            .map(Extension::parse)
            .transpose()?;

        if !self.policy.allows(kind, ext.as_ref()) {
            return Err(CreateError::InvalidPayload(format!(
                "extension '{}' is not allowed for {kind}",
                ext.as_ref().map(Extension::as_str).unwrap_or_default()
            )));
        }

        let content_type = match upload.content_type.filter(|ct| !ct.is_empty()) {
            Some(content_type) if content_type::is_valid(&content_type) => content_type,
            Some(content_type) => {
                return Err(CreateError::InvalidPayload(format!(
                    "invalid content type: {content_type:?}"
                )));
            }
            None => content_type::infer(ext.as_ref()).to_string(),
        };

        Ok((ext, NewContent::Blob(NewBlob { body, content_type })))
    }
}

#[async_trait]
impl<S: ContentStore, G: Generator> Publisher for ContentRouter<S, G> {
    async fn create(&self, request: CreateRequest) -> Result<Created> {
        let kind: Kind = request.kind.parse()?;
        let (ext, content) = self.validate(kind, request.payload)?;

        let id: Identifier = self.generator.generate().into();
        let key = EntryKey::with_ext(id, ext);
        debug!(kind = %kind, id = %key.id, "dispatching entry");

        match self.store.insert_or_put(kind, &key, content).await {
            Ok(()) => {
                info!(kind = %kind, id = %key.id, "created entry");
                Ok(Created {
                    url: key.url_path(kind),
                    id: key.id,
                    kind,
                })
            }
            Err(err @ StorageError::Conflict(_)) => {
                error!(kind = %kind, id = %key.id, error = %err, "identifier collision on create");
                Err(err.into())
            }
            Err(err) => {
                error!(kind = %kind, id = %key.id, error = %err, "failed to store entry");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use keyhole_core::{BlobStore, Collection, ErrorClass, MetadataStore, StoredContent};
    use keyhole_generator::{RandomGenerator, SeqGenerator};
    use keyhole_storage::{Backends, InMemoryBlobStore, InMemoryMetadataStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type MemoryBackends = Backends<InMemoryMetadataStore, InMemoryBlobStore>;

    /// Counts writes and forwards to in-memory backends, or fails every write.
    struct CountingStore {
        inner: MemoryBackends,
        writes: AtomicUsize,
        fail_with: Option<StorageError>,
    }

    impl Default for CountingStore {
        fn default() -> Self {
            Self {
                inner: Backends::new(InMemoryMetadataStore::new(), InMemoryBlobStore::new()),
                writes: AtomicUsize::new(0),
                fail_with: None,
            }
        }
    }

    #[async_trait]
    impl ContentStore for CountingStore {
        async fn insert_or_put(
            &self,
            kind: Kind,
            key: &EntryKey,
            content: NewContent,
        ) -> keyhole_core::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => self.inner.insert_or_put(kind, key, content).await,
            }
        }

        async fn fetch(
            &self,
            kind: Kind,
            key: &EntryKey,
        ) -> keyhole_core::Result<Option<StoredContent>> {
            self.inner.fetch(kind, key).await
        }
    }

    fn test_router() -> (Arc<CountingStore>, ContentRouter<CountingStore, SeqGenerator>) {
        let store = Arc::new(CountingStore::default());
        let router = ContentRouter::from_shared(Arc::clone(&store), SeqGenerator::new());
        (store, router)
    }

    fn failing_router(err: StorageError) -> ContentRouter<CountingStore, SeqGenerator> {
        let store = CountingStore {
            fail_with: Some(err),
            ..CountingStore::default()
        };
        ContentRouter::new(store, SeqGenerator::new())
    }

    #[tokio::test]
    async fn create_link() {
        let (store, router) = test_router();

        let created = router
            .create(CreateRequest::text("link", "https://example.com"))
            .await
            .unwrap();

        assert_eq!(created.id.as_str(), "6666666666");
        assert_eq!(created.kind, Kind::Link);
        assert_eq!(created.url, "/link/6666666666");

        let record = store
            .inner
            .metadata()
            .fetch(Collection::Links, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.value.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn create_text_with_short_tag() {
        let (store, router) = test_router();

        let created = router
            .create(CreateRequest::text("t", "hello\nworld"))
            .await
            .unwrap();

        assert_eq!(created.kind, Kind::Text);
        assert_eq!(created.url, format!("/text/{}", created.id));
        let record = store
            .inner
            .metadata()
            .fetch(Collection::Texts, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.value.as_deref(), Some("hello\nworld"));
    }

    #[tokio::test]
    async fn create_image_with_extension() {
        let (store, router) = test_router();

        let created = router
            .create(CreateRequest::blob(
                "image",
                BlobUpload::new(Bytes::from_static(b"\x89PNG")).with_ext("png"),
            ))
            .await
            .unwrap();

        assert_eq!(created.url, format!("/image/{}.png", created.id));
        let blob = store
            .inner
            .blobs()
            .get(&format!("images/{}.png", created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(blob.body, Bytes::from_static(b"\x89PNG"));
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn create_file_keeps_caller_content_type() {
        let (store, router) = test_router();

        let created = router
            .create(CreateRequest::blob(
                "file",
                BlobUpload::new(Bytes::from_static(b"{}"))
                    .with_ext(".cfg")
                    .with_content_type("application/json"),
            ))
            .await
            .unwrap();

        assert_eq!(created.url, format!("/file/{}.cfg", created.id));
        let blob = store
            .inner
            .blobs()
            .get(&format!("files/{}.cfg", created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(blob.content_type, "application/json");
    }

    #[tokio::test]
    async fn create_file_without_extension() {
        let (_store, router) = test_router();

        let created = router
            .create(CreateRequest::blob(
                "file",
                BlobUpload::new(Bytes::from_static(b"raw")).with_ext(""),
            ))
            .await
            .unwrap();

        assert_eq!(created.url, format!("/file/{}", created.id));
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_without_writing() {
        let (store, router) = test_router();

        let err = router
            .create(CreateRequest::text("video", "https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateError::InvalidKind(_)));
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_writing() {
        let (store, router) = test_router();

        let err = router.create(CreateRequest::text("text", "")).await.unwrap_err();

        assert!(matches!(err, CreateError::InvalidPayload(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(store.inner.metadata().is_empty());
    }

    #[tokio::test]
    async fn any_non_empty_link_target_is_accepted() {
        let (store, router) = test_router();

        for target in [
            "ftp://files.example/x",
            "mailto:a@b.c",
            "https://\u{4f8b}\u{3048}.jp/\u{30d1}\u{30b9}",
        ] {
            router
                .create(CreateRequest::text("link", target))
                .await
                .unwrap();
        }

        assert_eq!(store.writes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unsendable_link_targets_are_rejected() {
        let (store, router) = test_router();

        for target in ["", "https://example.com/\r\nSet-Cookie: x", "a\tb"] {
            let err = router
                .create(CreateRequest::text("link", target))
                .await
                .unwrap_err();
            assert!(matches!(err, CreateError::InvalidPayload(_)), "{target:?}");
        }

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn link_policy_is_applied() {
        let store = CountingStore::default();
        let router = ContentRouter::new(store, SeqGenerator::new())
            .with_link_policy(crate::policy::WebTargets);

        for target in ["example.com", "mailto:a@b.c", "https://"] {
            let err = router
                .create(CreateRequest::text("link", target))
                .await
                .unwrap_err();
            assert!(matches!(err, CreateError::InvalidPayload(_)), "{target:?}");
        }

        router
            .create(CreateRequest::text("link", "https://example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn link_length_is_capped_at_the_column_size() {
        let (store, router) = test_router();
        let prefix = "https://example.com/";
        let at_limit = format!("{prefix}{}", "a".repeat(MAX_LINK_BYTES - prefix.len()));
        let over_limit = format!("{at_limit}a");

        router
            .create(CreateRequest::text("link", at_limit))
            .await
            .unwrap();

        let err = router
            .create(CreateRequest::text("link", over_limit))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn text_length_is_capped_at_the_column_size() {
        let (store, router) = test_router();

        let err = router
            .create(CreateRequest::text("text", "x".repeat(MAX_TEXT_BYTES + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn payload_shape_must_match_kind() {
        let (store, router) = test_router();

        let err = router
            .create(CreateRequest::blob("link", BlobUpload::new(Bytes::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));

        let err = router
            .create(CreateRequest::text("image", "not bytes"))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_blob_is_rejected() {
        let (store, router) = test_router();

        let err = router
            .create(CreateRequest::blob("file", BlobUpload::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateError::InvalidPayload(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_extension_and_content_type_are_rejected() {
        let (store, router) = test_router();

        let err = router
            .create(CreateRequest::blob(
                "file",
                BlobUpload::new(Bytes::from_static(b"x")).with_ext("../../etc"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));

        let err = router
            .create(CreateRequest::blob(
                "file",
                BlobUpload::new(Bytes::from_static(b"x")).with_content_type("bad\ntype/x"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extension_policy_is_applied() {
        let store = CountingStore::default();
        let router = ContentRouter::new(store, SeqGenerator::new())
            .with_policy(crate::policy::AllowList::new().images(["png"]));

        let err = router
            .create(CreateRequest::blob(
                "image",
                BlobUpload::new(Bytes::from_static(b"MZ")).with_ext("exe"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidPayload(_)));

        router
            .create(CreateRequest::blob(
                "image",
                BlobUpload::new(Bytes::from_static(b"png")).with_ext("png"),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn storage_failure_is_internal() {
        let router = failing_router(StorageError::Unavailable("connection refused".into()));

        let err = router
            .create(CreateRequest::text("text", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateError::StoreUnavailable(_)));
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[tokio::test]
    async fn collision_is_reported_not_overwritten() {
        let (store, router) = test_router();
        store
            .inner
            .metadata()
            .insert(
                Collection::Texts,
                &Identifier::parse("6666666666").unwrap(),
                "original",
            )
            .await
            .unwrap();

        let err = router
            .create(CreateRequest::text("text", "intruder"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateError::StoreUnavailable(StorageError::Conflict(_))
        ));

        let record = store
            .inner
            .metadata()
            .fetch(Collection::Texts, &Identifier::parse("6666666666").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.value.as_deref(), Some("original"));

        // A retry mints a fresh identifier and succeeds.
        let created = router
            .create(CreateRequest::text("text", "intruder"))
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "6666666667");
    }

    #[tokio::test]
    async fn random_generator_produces_distinct_entries() {
        let router = ContentRouter::new(CountingStore::default(), RandomGenerator::new());

        let first = router
            .create(CreateRequest::text("text", "a"))
            .await
            .unwrap();
        let second = router
            .create(CreateRequest::text("text", "a"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }
}
