use common::{FileRecord, MatchTier};

/// Default size tolerance, as a percentage of the larger of the two sizes
pub const DEFAULT_TOLERANCE_PERCENT: u64 = 10;

/// Default lower bound for the size tolerance, in bytes
pub const DEFAULT_MIN_TOLERANCE_BYTES: u64 = 1;

/// The properties of an incoming file the stages match on
#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub digest: &'a str,
    /// `None` when the claimed name is unusable; the filename stage is skipped
    pub filename: Option<&'a str>,
    pub size: u64,
}

/// How far apart two file sizes may be for the size heuristic to accept them.
///
/// The allowance is `percent` of the larger size (integer floor), never less
/// than `min_bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeTolerance {
    pub percent: u64,
    pub min_bytes: u64,
}

impl Default for SizeTolerance {
    fn default() -> Self {
        Self {
            percent: DEFAULT_TOLERANCE_PERCENT,
            min_bytes: DEFAULT_MIN_TOLERANCE_BYTES,
        }
    }
}

impl SizeTolerance {
    pub fn new(percent: u64, min_bytes: u64) -> Self {
        Self { percent, min_bytes }
    }

    /// Maximum accepted size difference for a pair of sizes
    pub fn allowance(&self, a: u64, b: u64) -> u64 {
        let larger = a.max(b);
        (larger.saturating_mul(self.percent) / 100).max(self.min_bytes)
    }

    pub fn accepts(&self, a: u64, b: u64) -> bool {
        a.abs_diff(b) <= self.allowance(a, b)
    }
}

/// A single lookup stage: returns the record it matched, if any
pub type Stage =
    for<'r> fn(&'r [FileRecord], &Candidate<'_>, &SizeTolerance) -> Option<&'r FileRecord>;

/// Stages in priority order. The first stage that matches decides the tier.
pub const STAGES: [(MatchTier, Stage); 3] = [
    (MatchTier::Content, by_content),
    (MatchTier::FilenameOnly, by_filename),
    (MatchTier::PossiblyModified, by_size),
];

/// Keep `current` unless `other` is at least as recent.
/// Records are scanned in insertion order, so equal timestamps favour the later insert.
fn most_recent<'r>(current: Option<&'r FileRecord>, other: &'r FileRecord) -> Option<&'r FileRecord> {
    match current {
        Some(best) if best.is_newer_than(other) => Some(best),
        _ => Some(other),
    }
}

/// Byte-identical content, first stored record wins
pub fn by_content<'r>(
    records: &'r [FileRecord],
    candidate: &Candidate<'_>,
    _tolerance: &SizeTolerance,
) -> Option<&'r FileRecord> {
    records.iter().find(|r| r.content_digest == candidate.digest)
}

/// Same original filename, most recent upload wins
pub fn by_filename<'r>(
    records: &'r [FileRecord],
    candidate: &Candidate<'_>,
    _tolerance: &SizeTolerance,
) -> Option<&'r FileRecord> {
    let filename = candidate.filename?;
    records
        .iter()
        .filter(|r| r.original_filename == filename)
        .fold(None, most_recent)
}

/// Size within tolerance, closest size wins, then most recent upload
pub fn by_size<'r>(
    records: &'r [FileRecord],
    candidate: &Candidate<'_>,
    tolerance: &SizeTolerance,
) -> Option<&'r FileRecord> {
    records
        .iter()
        .filter(|r| tolerance.accepts(r.file_size, candidate.size))
        .fold(None, |best, r| match best {
            Some(b) => {
                let best_diff = b.file_size.abs_diff(candidate.size);
                let diff = r.file_size.abs_diff(candidate.size);
                if diff < best_diff {
                    Some(r)
                } else if diff == best_diff {
                    most_recent(Some(b), r)
                } else {
                    Some(b)
                }
            }
            None => Some(r),
        })
}
