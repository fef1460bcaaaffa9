/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Upload endpoint path
pub const UPLOAD_ENDPOINT: &str = "/api/upload";

/// File listing endpoint path
pub const FILES_ENDPOINT: &str = "/api/files";

/// Direct verification endpoint path
pub const VERIFY_ENDPOINT: &str = "/api/verify";

/// Quick verification endpoint path
pub const QUICK_VERIFY_ENDPOINT: &str = "/api/quick-verify";

/// File download endpoint prefix (followed by the stored id)
pub const DOWNLOAD_ENDPOINT: &str = "/api/download";

/// HMAC document download endpoint prefix (followed by the stored id)
pub const DOWNLOAD_HMAC_ENDPOINT: &str = "/api/download-hmac";

/// Tamper simulation endpoint prefix (followed by the stored id)
pub const TAMPER_ENDPOINT: &str = "/api/simulate-tamper";

/// Delete endpoint prefix (followed by the stored id)
pub const DELETE_ENDPOINT: &str = "/api/delete";

/// Reset endpoint path
pub const RESET_ENDPOINT: &str = "/api/reset-all";
