/// Default data directory for filesystem storage
pub const DEFAULT_DATA_DIR: &str = "server_data";

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "8080";

/// Storage type identifier for database
pub const STORAGE_TYPE_DATABASE: &str = "db";

/// Storage type identifier for filesystem (also used as the default storage type)
pub const STORAGE_TYPE_FILESYSTEM: &str = "fs";

/// Default cap on a whole multipart request, in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: &str = "10";

/// Default upload extension allow-list (comma separated, empty allows any)
pub const DEFAULT_ALLOWED_EXTENSIONS: &str = "txt";

/// Default size heuristic tolerance, percent of the larger file
pub const DEFAULT_SIZE_TOLERANCE_PERCENT: &str = "10";

/// Default lower bound of the size heuristic tolerance, in bytes
pub const DEFAULT_MIN_SIZE_TOLERANCE: &str = "1";

/// Multipart bodies up to this size stay in memory before spilling to a temp file
pub const MULTIPART_MEMORY_LIMIT: usize = 256 * 1024;
