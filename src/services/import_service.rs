//! Domain service for bulk service imports from spreadsheet files.
//!
//! A batch of uploaded workbooks is validated and loaded row by row into
//! the service catalog. A single bad row never aborts its file and a bad
//! file never rolls back rows already committed; everything is accounted
//! for in a bounded summary instead.

use serde::Serialize;
use thiserror::Error;

/// One uploaded spreadsheet, as received from the request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Errors that abort the whole import request. Row-level problems are
/// never raised as errors; they land in the summary tallies.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot upload more than {limit} files per batch (got {count})")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Invalid file format: {0}")]
    UnsupportedFormat(String),

    #[error("File {filename} exceeds the maximum size of {limit_bytes} bytes")]
    FileTooLarge { filename: String, limit_bytes: usize },

    #[error("Could not read file {filename}: {reason}")]
    Parse { filename: String, reason: String },

    #[error("File {filename} is missing required columns: {}", .missing.join(", "))]
    Schema {
        filename: String,
        missing: Vec<String>,
    },

    #[error(
        "Import exceeded the maximum time ({budget_secs}s). Processed {processed} of {total} rows."
    )]
    Timeout {
        budget_secs: u64,
        processed: usize,
        total: usize,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Completed,
    Skipped,
    Failed(String),
}

/// Per-file tally. `errors` is capped at ten entries plus one overflow
/// line.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FileSummary {
    pub filename: String,
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl FileSummary {
    #[must_use]
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Completed => self.completed += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Failed(reason) => {
                self.failed += 1;
                self.errors.push(reason);
            }
        }
    }

    /// Rows tallied so far (completed + skipped + failed).
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

/// Aggregate counters across all files of a batch.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BatchTotals {
    pub total_files: usize,
    pub total_processed: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchTotals {
    pub fn absorb(&mut self, file: &FileSummary) {
        self.total_files += 1;
        self.total_processed += file.total;
        self.completed += file.completed;
        self.skipped += file.skipped;
        self.failed += file.failed;
    }
}

/// Batch result: aggregate counters plus per-file detail in input order.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BatchReport {
    pub summary: BatchTotals,
    pub details: Vec<FileSummary>,
}

/// Domain service trait for the bulk import pipeline.
///
/// Known limitations, intentional for now:
/// - The duplicate check and the insert are not isolated against
///   concurrent imports or concurrent admin creates; two simultaneous
///   imports of the same new name can both pass the check and insert.
///   The store does not enforce name uniqueness.
/// - The time budget is checked once per row. Workbook parsing itself is
///   not interruptible, so the cutoff is coarse, not hard real-time.
#[async_trait::async_trait]
pub trait ImportService: Send + Sync {
    /// Imports a batch of spreadsheet files under the batch time budget.
    ///
    /// Hard stops (file count, extension, size, unreadable workbook,
    /// missing columns, timeout) abort the request; rows committed before
    /// the stop stay committed.
    async fn import_batch(&self, files: Vec<UploadedFile>) -> Result<BatchReport, ImportError>;

    /// Imports a single spreadsheet under the standalone time budget.
    async fn import_file(&self, file: UploadedFile) -> Result<FileSummary, ImportError>;
}
