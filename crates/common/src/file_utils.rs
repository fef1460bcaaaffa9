use std::path::Path;

/// Error type for filename validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    InvalidFileName,
    ContainsInvalidCharacters,
    ExtensionNotAllowed(Vec<String>),
}

impl FilenameValidationError {
    pub fn message(&self) -> String {
        match self {
            FilenameValidationError::Empty => "Filename cannot be empty".to_string(),
            FilenameValidationError::ContainsNullByte => {
                "Filename cannot contain null bytes".to_string()
            }
            FilenameValidationError::ContainsPathSeparator => {
                "Filename cannot contain path separators (/ or \\)".to_string()
            }
            FilenameValidationError::IsSpecialDirectory => {
                "Filename cannot be '.' or '..'".to_string()
            }
            FilenameValidationError::InvalidFileName => {
                "Invalid filename: must be a valid file name".to_string()
            }
            FilenameValidationError::ContainsInvalidCharacters => {
                "Invalid filename: contains invalid characters".to_string()
            }
            FilenameValidationError::ExtensionNotAllowed(allowed) => {
                let list = allowed
                    .iter()
                    .map(|ext| format!(".{}", ext))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Only {} files are allowed", list)
            }
        }
    }
}

impl std::fmt::Display for FilenameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FilenameValidationError {}

/// Validate a name used directly on disk (stored ids) to prevent path traversal.
/// Checks if:
/// - Filename contains no path separators (/, \)
/// - Path::new(filename).file_name() returns Some(_)
/// - Filename is not empty
/// - Filename is not "." or ".."
pub fn validate_filename(filename: &str) -> Result<(), FilenameValidationError> {
    if filename.is_empty() {
        return Err(FilenameValidationError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameValidationError::ContainsNullByte);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameValidationError::ContainsPathSeparator);
    }

    if filename == "." || filename == ".." {
        return Err(FilenameValidationError::IsSpecialDirectory);
    }

    let path = Path::new(filename);
    if path.file_name().is_none() {
        return Err(FilenameValidationError::InvalidFileName);
    }

    // Guard against names the platform would normalize to something else
    if path.file_name().and_then(|n| n.to_str()) != Some(filename) {
        return Err(FilenameValidationError::ContainsInvalidCharacters);
    }

    Ok(())
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing `.`/`_` are
/// stripped. `"../../etc/passwd"` becomes `"etc_passwd"`.
pub fn sanitize_filename(filename: &str) -> Result<String, FilenameValidationError> {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return Err(FilenameValidationError::InvalidFileName);
    }
    validate_filename(trimmed)?;
    Ok(trimmed.to_string())
}

/// Check the filename extension against an allow-list (case-insensitive).
/// An empty allow-list accepts every filename.
pub fn check_extension(filename: &str, allowed: &[String]) -> Result<(), FilenameValidationError> {
    if allowed.is_empty() {
        return Ok(());
    }
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) => Ok(()),
        _ => Err(FilenameValidationError::ExtensionNotAllowed(allowed.to_vec())),
    }
}
