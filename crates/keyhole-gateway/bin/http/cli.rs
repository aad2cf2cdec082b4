use clap::{Parser, ValueEnum};
use keyhole_gateway::config::DEFAULT_LISTEN_ADDR;
use keyhole_gateway::state::DEFAULT_MAX_UPLOAD_BYTES;
use keyhole_gateway::telemetry::LogFormat;
use keyhole_gateway::{BlobBackend, GatewayConfig, MetadataBackend};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "KEYHOLE_GATEWAY_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "KEYHOLE_GATEWAY_PUBLIC_BASE_URL";
pub const METADATA_BACKEND_ENV: &str = "KEYHOLE_GATEWAY_METADATA_BACKEND";
pub const MYSQL_DSN_ENV: &str = "KEYHOLE_GATEWAY_MYSQL_DSN";
pub const MYSQL_ENSURE_SCHEMA_ENV: &str = "KEYHOLE_GATEWAY_MYSQL_ENSURE_SCHEMA";
pub const BLOB_BACKEND_ENV: &str = "KEYHOLE_GATEWAY_BLOB_BACKEND";
pub const BLOB_ROOT_ENV: &str = "KEYHOLE_GATEWAY_BLOB_ROOT";
pub const IMAGE_EXTENSIONS_ENV: &str = "KEYHOLE_GATEWAY_IMAGE_EXTENSIONS";
pub const FILE_EXTENSIONS_ENV: &str = "KEYHOLE_GATEWAY_FILE_EXTENSIONS";
pub const MAX_UPLOAD_BYTES_ENV: &str = "KEYHOLE_GATEWAY_MAX_UPLOAD_BYTES";
pub const WEB_LINKS_ONLY_ENV: &str = "KEYHOLE_GATEWAY_WEB_LINKS_ONLY";
pub const LOG_FORMAT_ENV: &str = "KEYHOLE_GATEWAY_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetadataBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for MetadataBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataBackendArg::InMemory => write!(f, "in-memory"),
            MetadataBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlobBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "fs")]
    Fs,
}

impl Display for BlobBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobBackendArg::InMemory => write!(f, "in-memory"),
            BlobBackendArg::Fs => write!(f, "fs"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyhole-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix for the `url` returned on create, e.g. `https://kh.example`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(
        long,
        env = METADATA_BACKEND_ENV,
        value_enum,
        default_value_t = MetadataBackendArg::InMemory
    )]
    pub metadata_backend: MetadataBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("metadata_backend", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Create the `links` and `texts` tables on start-up if missing.
    #[arg(long, env = MYSQL_ENSURE_SCHEMA_ENV)]
    pub mysql_ensure_schema: bool,

    #[arg(
        long,
        env = BLOB_BACKEND_ENV,
        value_enum,
        default_value_t = BlobBackendArg::InMemory
    )]
    pub blob_backend: BlobBackendArg,

    #[arg(long, env = BLOB_ROOT_ENV, required_if_eq("blob_backend", "fs"))]
    pub blob_root: Option<PathBuf>,

    /// Comma-separated extensions accepted for images; empty accepts any.
    #[arg(long, env = IMAGE_EXTENSIONS_ENV, value_delimiter = ',')]
    pub image_extensions: Vec<String>,

    /// Comma-separated extensions accepted for files; empty accepts any.
    #[arg(long, env = FILE_EXTENSIONS_ENV, value_delimiter = ',')]
    pub file_extensions: Vec<String>,

    #[arg(long, env = MAX_UPLOAD_BYTES_ENV, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Refuse link targets that are not absolute http(s) URLs.
    #[arg(long, env = WEB_LINKS_ONLY_ENV)]
    pub web_links_only: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        let metadata = match self.metadata_backend {
            MetadataBackendArg::InMemory => MetadataBackend::InMemory,
            MetadataBackendArg::Mysql => MetadataBackend::MySql {
                dsn: self.mysql_dsn.clone().ok_or_else(|| {
                    anyhow::anyhow!("mysql dsn is required when metadata backend is mysql")
                })?,
                ensure_schema: self.mysql_ensure_schema,
            },
        };

        let blobs = match self.blob_backend {
            BlobBackendArg::InMemory => BlobBackend::InMemory,
            BlobBackendArg::Fs => BlobBackend::Fs {
                root: self.blob_root.clone().ok_or_else(|| {
                    anyhow::anyhow!("blob root is required when blob backend is fs")
                })?,
            },
        };

        let config = GatewayConfig::builder()
            .listen_addr(self.listen_addr)
            .metadata(metadata)
            .blobs(blobs)
            .image_extensions(self.image_extensions.clone())
            .file_extensions(self.file_extensions.clone())
            .max_upload_bytes(self.max_upload_bytes)
            .web_links_only(self.web_links_only)
            .build();

        Ok(GatewayConfig {
            public_base_url: self.public_base_url.clone(),
            ..config
        })
    }
}
