use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB,
    DEFAULT_MIN_SIZE_TOLERANCE, DEFAULT_PORT, DEFAULT_SIZE_TOLERANCE_PERCENT,
    STORAGE_TYPE_DATABASE, STORAGE_TYPE_FILESYSTEM,
};
use clap::{value_parser, Arg, Command};
use quick_match::SizeTolerance;
use std::ffi::OsString;
use std::path::PathBuf;
use storage::{DatabaseRetryConfig, StorageBackend, StoreConfig};
use tracing::error;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Storage backend type
    pub storage_type: StorageType,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Data directory for filesystem storage
    pub data_dir: PathBuf,
    /// Database URL for database storage
    pub database_url: Option<String>,
    /// Database retry configuration
    pub database_retry_config: DatabaseRetryConfig,
    /// Cap on a whole multipart request, in bytes
    pub max_upload_bytes: usize,
    /// Record store tunables (size tolerance, extension allow-list)
    pub store: StoreConfig,
}

/// Storage backend type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    Filesystem,
    Database,
}

impl ServerConfig {
    pub fn load() -> Result<Self, std::io::Error> {
        Self::from_args(std::env::args_os())
    }

    fn command() -> Command {
        Command::new("integrity-server")
            .about("File integrity verification service")
            .arg(
                Arg::new("storage")
                    .long("storage")
                    .value_name("TYPE")
                    .help("Storage backend type: 'fs' for filesystem or 'db' for database")
                    .default_value(STORAGE_TYPE_FILESYSTEM),
            )
            .arg(
                Arg::new("data-dir")
                    .long("data-dir")
                    .value_name("DIR")
                    .help("Data directory for filesystem storage")
                    .default_value(DEFAULT_DATA_DIR),
            )
            .arg(
                Arg::new("database-url")
                    .long("database-url")
                    .value_name("URL")
                    .help("Database URL for database storage (can also use DATABASE_URL env var)"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_name("PORT")
                    .help("Server port (default: 8080, or SERVER_PORT env var)"),
            )
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Server host (default: 0.0.0.0, or SERVER_HOST env var)"),
            )
            .arg(
                Arg::new("max-upload-mb")
                    .long("max-upload-mb")
                    .value_name("MB")
                    .help("Maximum size of an upload request in megabytes")
                    .value_parser(value_parser!(u64).range(1..))
                    .default_value(DEFAULT_MAX_UPLOAD_MB),
            )
            .arg(
                Arg::new("allowed-extensions")
                    .long("allowed-extensions")
                    .value_name("LIST")
                    .help("Comma-separated upload extensions; empty allows any")
                    .default_value(DEFAULT_ALLOWED_EXTENSIONS),
            )
            .arg(
                Arg::new("size-tolerance-percent")
                    .long("size-tolerance-percent")
                    .value_name("PERCENT")
                    .help("Size difference, in percent of the larger file, accepted as possibly modified")
                    .value_parser(value_parser!(u64).range(0..=100))
                    .default_value(DEFAULT_SIZE_TOLERANCE_PERCENT),
            )
            .arg(
                Arg::new("min-size-tolerance")
                    .long("min-size-tolerance")
                    .value_name("BYTES")
                    .help("Lower bound of the accepted size difference, in bytes")
                    .value_parser(value_parser!(u64))
                    .default_value(DEFAULT_MIN_SIZE_TOLERANCE),
            )
    }

    pub fn from_args<I, T>(args: I) -> Result<Self, std::io::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

        // Determine storage type
        let storage_type_str = matches
            .get_one::<String>("storage")
            .map(|s| s.as_str())
            .unwrap_or(STORAGE_TYPE_FILESYSTEM);
        let storage_type = match storage_type_str {
            STORAGE_TYPE_DATABASE => StorageType::Database,
            STORAGE_TYPE_FILESYSTEM => StorageType::Filesystem,
            _ => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "Invalid storage type: {}. Must be '{}' or '{}'",
                        storage_type_str, STORAGE_TYPE_FILESYSTEM, STORAGE_TYPE_DATABASE
                    ),
                ));
            }
        };

        let data_dir = PathBuf::from(
            matches
                .get_one::<String>("data-dir")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_DATA_DIR),
        );

        let database_url = if storage_type == StorageType::Database {
            Some(
                matches
                    .get_one::<String>("database-url")
                    .cloned()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| {
                        error!("Database URL required when using database storage. Set --database-url or DATABASE_URL env var");
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "Database URL required when using database storage. Set --database-url or DATABASE_URL env var",
                        )
                    })?,
            )
        } else {
            None
        };

        let env_host = std::env::var("SERVER_HOST").ok();
        let env_port = std::env::var("SERVER_PORT").ok();

        let host = matches
            .get_one::<String>("host")
            .map(|s| s.as_str())
            .or(env_host.as_deref())
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        let port_str = matches
            .get_one::<String>("port")
            .map(|s| s.as_str())
            .or(env_port.as_deref())
            .unwrap_or(DEFAULT_PORT);

        let port = port_str.parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid port number: {}", port_str),
            )
        })?;

        let max_upload_mb = matches.get_one::<u64>("max-upload-mb").copied().unwrap_or(10);
        let max_upload_bytes = usize::try_from(max_upload_mb.saturating_mul(1024 * 1024))
            .unwrap_or(usize::MAX);

        let allowed_extensions = parse_extensions(
            matches
                .get_one::<String>("allowed-extensions")
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_ALLOWED_EXTENSIONS),
        );

        let defaults = SizeTolerance::default();
        let tolerance = SizeTolerance::new(
            matches
                .get_one::<u64>("size-tolerance-percent")
                .copied()
                .unwrap_or(defaults.percent),
            matches
                .get_one::<u64>("min-size-tolerance")
                .copied()
                .unwrap_or(defaults.min_bytes),
        );

        Ok(ServerConfig {
            storage_type,
            host,
            port,
            data_dir,
            database_url,
            database_retry_config: DatabaseRetryConfig::from_env(),
            max_upload_bytes,
            store: StoreConfig {
                tolerance,
                allowed_extensions,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The storage backend this configuration selects
    pub fn storage_backend(&self) -> StorageBackend {
        match (&self.storage_type, &self.database_url) {
            (StorageType::Database, Some(database_url)) => StorageBackend::Database {
                database_url: database_url.clone(),
                retry_config: Some(self.database_retry_config.clone()),
            },
            _ => StorageBackend::Filesystem(self.data_dir.clone()),
        }
    }
}

/// Split a comma-separated extension list, dropping dots and blanks
fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
