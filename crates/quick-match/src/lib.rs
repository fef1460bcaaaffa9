//! Tiered matching of an incoming file against the stored file records.
//!
//! A candidate is classified by the first stage that matches, strongest
//! signal first: identical content, then identical filename, then a size
//! heuristic. Content identity is checked first so a weaker signal can never
//! shadow it.

pub mod stages;
pub use stages::{Candidate, SizeTolerance, STAGES};

use common::{FileRecord, MatchStatus, MatchTier};
use crypto::CryptoError;

/// Outcome of a quick verification, one variant per tier
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Identical content is stored. `key_verified` is false when the supplied
    /// key does not reproduce the stored HMAC.
    Content {
        record: FileRecord,
        key_verified: bool,
    },
    FilenameOnly {
        record: FileRecord,
    },
    PossiblyModified {
        record: FileRecord,
        size_difference: u64,
    },
    NoMatch,
}

/// A classified candidate plus what was computed about it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    /// HMAC of the candidate under the supplied key
    pub calculated_hmac: String,
    pub content_digest: String,
    pub file_size: u64,
    /// Filename as the caller sent it
    pub claimed_filename: String,
}

impl MatchResult {
    pub fn tier(&self) -> MatchTier {
        match self.outcome {
            MatchOutcome::Content { .. } => MatchTier::Content,
            MatchOutcome::FilenameOnly { .. } => MatchTier::FilenameOnly,
            MatchOutcome::PossiblyModified { .. } => MatchTier::PossiblyModified,
            MatchOutcome::NoMatch => MatchTier::None,
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self.outcome {
            MatchOutcome::Content {
                key_verified: true, ..
            } => MatchStatus::Verified,
            MatchOutcome::Content {
                key_verified: false,
                ..
            } => MatchStatus::KeyMismatch,
            MatchOutcome::FilenameOnly { .. } => MatchStatus::ContentDiffers,
            MatchOutcome::PossiblyModified { .. } => MatchStatus::PossiblyModified,
            MatchOutcome::NoMatch => MatchStatus::NotFound,
        }
    }

    pub fn match_found(&self) -> bool {
        self.outcome != MatchOutcome::NoMatch
    }

    /// Only a content match confirmed by the key is valid
    pub fn is_valid(&self) -> bool {
        self.status() == MatchStatus::Verified
    }

    /// The stored record the candidate was matched to
    pub fn record(&self) -> Option<&FileRecord> {
        match &self.outcome {
            MatchOutcome::Content { record, .. }
            | MatchOutcome::FilenameOnly { record }
            | MatchOutcome::PossiblyModified { record, .. } => Some(record),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn message(&self) -> String {
        match self.status() {
            MatchStatus::Verified => {
                "File integrity verified! This file matches the stored version.".to_string()
            }
            MatchStatus::KeyMismatch => {
                "Content matches a stored file, but the secret key does not reproduce its HMAC."
                    .to_string()
            }
            MatchStatus::ContentDiffers => {
                "File has been modified! Found stored version but content differs.".to_string()
            }
            MatchStatus::PossiblyModified => {
                "No exact match. A stored file with similar characteristics may be a modified version of this file."
                    .to_string()
            }
            MatchStatus::NotFound => format!(
                "No stored version found for \"{}\". This might be a new file.",
                self.claimed_filename
            ),
        }
    }

    pub fn warning(&self) -> Option<String> {
        match &self.outcome {
            MatchOutcome::Content {
                key_verified: false,
                ..
            } => Some(
                "The content digest matched, but the supplied secret key does not reproduce the stored HMAC. \
                 This indicates a wrong key, not modified content."
                    .to_string(),
            ),
            MatchOutcome::PossiblyModified {
                size_difference, ..
            } => Some(format!(
                "Heuristic match on file size only (differs by {} bytes); this is not a confirmed match.",
                size_difference
            )),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self.outcome {
            MatchOutcome::NoMatch => Some(
                "Upload this file first to store its HMAC for future verification.".to_string(),
            ),
            _ => None,
        }
    }
}

/// An incoming file with its digest and HMAC already computed.
///
/// Building a probe does the CPU work up front, so matching against the
/// records is only lookups plus, for a content hit, one HMAC check.
pub struct Probe<'a> {
    content: &'a [u8],
    secret_key: &'a [u8],
    claimed_filename: String,
    match_filename: Option<String>,
    digest: String,
    calculated_hmac: String,
}

impl<'a> Probe<'a> {
    /// The claimed filename is also the name the filename stage looks for,
    /// unless [`Probe::match_filename`] replaces it.
    pub fn new(
        content: &'a [u8],
        secret_key: &'a [u8],
        claimed_filename: impl Into<String>,
    ) -> Result<Self, CryptoError> {
        let claimed_filename = claimed_filename.into();
        let calculated_hmac = crypto::authenticate(content, secret_key)?;
        Ok(Self {
            content,
            secret_key,
            match_filename: Some(claimed_filename.clone()),
            claimed_filename,
            digest: crypto::content_digest(content),
            calculated_hmac,
        })
    }

    /// Name the filename stage compares against. `None` skips that stage.
    pub fn match_filename(mut self, filename: Option<String>) -> Self {
        self.match_filename = filename;
        self
    }

    pub fn calculated_hmac(&self) -> &str {
        &self.calculated_hmac
    }

    fn candidate(&self) -> Candidate<'_> {
        Candidate {
            digest: &self.digest,
            filename: self.match_filename.as_deref(),
            size: self.content.len() as u64,
        }
    }

    /// Classify this probe against the records
    pub fn match_against(
        &self,
        records: &[FileRecord],
        tolerance: &SizeTolerance,
    ) -> Result<MatchResult, CryptoError> {
        let candidate = self.candidate();
        let outcome = match classify(records, &candidate, tolerance) {
            Some((MatchTier::Content, record)) => MatchOutcome::Content {
                key_verified: crypto::verify(self.content, self.secret_key, &record.hmac)?,
                record: record.clone(),
            },
            Some((MatchTier::FilenameOnly, record)) => MatchOutcome::FilenameOnly {
                record: record.clone(),
            },
            Some((MatchTier::PossiblyModified, record)) => MatchOutcome::PossiblyModified {
                size_difference: record.file_size.abs_diff(candidate.size),
                record: record.clone(),
            },
            Some((MatchTier::None, _)) | None => MatchOutcome::NoMatch,
        };

        Ok(MatchResult {
            outcome,
            calculated_hmac: self.calculated_hmac.clone(),
            content_digest: self.digest.clone(),
            file_size: candidate.size,
            claimed_filename: self.claimed_filename.clone(),
        })
    }
}

/// Run the stages in priority order and return the first hit
pub fn classify<'r>(
    records: &'r [FileRecord],
    candidate: &Candidate<'_>,
    tolerance: &SizeTolerance,
) -> Option<(MatchTier, &'r FileRecord)> {
    STAGES
        .iter()
        .find_map(|(tier, stage)| stage(records, candidate, tolerance).map(|r| (*tier, r)))
}

/// Classify a file against the records in one call
pub fn quick_verify(
    records: &[FileRecord],
    content: &[u8],
    secret_key: &[u8],
    claimed_filename: &str,
    tolerance: &SizeTolerance,
) -> Result<MatchResult, CryptoError> {
    Probe::new(content, secret_key, claimed_filename)?.match_against(records, tolerance)
}
