//! Spreadsheet-backed implementation of the `ImportService` trait.

use async_trait::async_trait;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::collections::HashMap;
use std::io::Cursor;
use std::time::{Duration, Instant};
use tokio::task;

use crate::constants::import::{
    BATCH_TIME_BUDGET, FILE_TIME_BUDGET, MAX_ERRORS_PER_FILE, MAX_FILES_PER_BATCH,
    MAX_FILE_SIZE_BYTES, SPREADSHEET_EXTENSIONS,
};
use crate::db::{ServiceInput, Store};
use crate::services::import_service::{
    BatchReport, FileSummary, ImportError, ImportService, RowOutcome, UploadedFile,
};

const REQUIRED_COLUMNS: &[&str] = &["name", "description", "duration_minutes", "price", "state"];

/// One spreadsheet cell after parsing. Missing and unreadable cells
/// collapse to `Empty`, matching how blank cells behave downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::String(s) => Self::Text(s.clone()),
            Data::Float(f) => Self::Number(*f),
            Data::Int(i) => Self::Number(*i as f64),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(dt) => Self::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            Data::Empty | Data::Error(_) => Self::Empty,
        }
    }
}

impl CellValue {
    /// String rendering used for the name and description columns.
    /// Integral numbers drop the trailing ".0" a float rendering would
    /// produce.
    fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::Empty => String::new(),
        }
    }

    /// Total conversion to an integer, or a reason it cannot be one.
    /// Fractional numeric cells are truncated; fractional text is
    /// rejected.
    fn to_integer(&self, field: &str) -> Result<i32, String> {
        match self {
            Self::Number(n) => Ok(*n as i32),
            Self::Bool(b) => Ok(i32::from(*b)),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(format!("{field} is empty"));
                }
                trimmed
                    .parse::<i32>()
                    .map_err(|_| format!("{field} must be an integer"))
            }
            Self::Empty => Err(format!("{field} is empty")),
        }
    }

    /// Total conversion to a decimal, or a reason it cannot be one.
    fn to_decimal(&self, field: &str) -> Result<f64, String> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Bool(b) => Ok(f64::from(u8::from(*b))),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(format!("{field} is empty"));
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| format!("{field} must be a number"))
            }
            Self::Empty => Err(format!("{field} is empty")),
        }
    }

    /// Total conversion to a boolean. Digit strings resolve by
    /// zero/non-zero; anything else falls back to truthiness (non-empty
    /// text, non-zero number). Deliberately never fails, mirroring how
    /// the state column has always been interpreted.
    fn to_boolean(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                    trimmed.parse::<i64>().map(|n| n != 0).unwrap_or(true)
                } else {
                    !s.is_empty()
                }
            }
            Self::Empty => false,
        }
    }
}

/// Workbook reduced to a header index and owned cell rows.
struct ParsedSheet {
    columns: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl ParsedSheet {
    fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| !self.columns.contains_key(**c))
            .map(ToString::to_string)
            .collect()
    }

    fn cell(&self, row: &[CellValue], column: &str) -> CellValue {
        self.columns
            .get(column)
            .and_then(|idx| row.get(*idx))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }
}

fn parse_workbook(content: Vec<u8>) -> Result<ParsedSheet, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(content)).map_err(|e| e.to_string())?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();

    let columns = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(idx, cell)| (CellValue::from(cell).as_text().trim().to_string(), idx))
                .filter(|(name, _)| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    Ok(ParsedSheet { columns, rows })
}

pub struct SpreadsheetImportService {
    store: Store,
}

impl SpreadsheetImportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Batch import with an explicit wall-clock budget.
    pub async fn import_batch_with_budget(
        &self,
        files: Vec<UploadedFile>,
        budget: Duration,
    ) -> Result<BatchReport, ImportError> {
        if files.len() > MAX_FILES_PER_BATCH {
            return Err(ImportError::TooManyFiles {
                count: files.len(),
                limit: MAX_FILES_PER_BATCH,
            });
        }

        let started = Instant::now();
        let mut report = BatchReport::default();

        for file in files {
            Self::validate_file(&file)?;

            let summary = self.process_file(file, started, budget).await?;

            report.summary.absorb(&summary);
            report.details.push(summary);
        }

        tracing::info!(
            "Import batch done: {} files, {} completed, {} skipped, {} failed",
            report.summary.total_files,
            report.summary.completed,
            report.summary.skipped,
            report.summary.failed
        );

        Ok(report)
    }

    /// Single-file import with an explicit wall-clock budget.
    pub async fn import_file_with_budget(
        &self,
        file: UploadedFile,
        budget: Duration,
    ) -> Result<FileSummary, ImportError> {
        Self::validate_file(&file)?;
        self.process_file(file, Instant::now(), budget).await
    }

    fn validate_file(file: &UploadedFile) -> Result<(), ImportError> {
        let extension = file
            .filename
            .rsplit('.')
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !file.filename.contains('.') || !SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ImportError::UnsupportedFormat(file.filename.clone()));
        }

        if file.content.len() > MAX_FILE_SIZE_BYTES {
            return Err(ImportError::FileTooLarge {
                filename: file.filename.clone(),
                limit_bytes: MAX_FILE_SIZE_BYTES,
            });
        }

        Ok(())
    }

    async fn process_file(
        &self,
        file: UploadedFile,
        started: Instant,
        budget: Duration,
    ) -> Result<FileSummary, ImportError> {
        let filename = file.filename.clone();

        // Workbook decoding is CPU-bound and not interruptible; keep it
        // off the async runtime.
        let parse_filename = filename.clone();
        let sheet = task::spawn_blocking(move || parse_workbook(file.content))
            .await
            .map_err(|e| ImportError::Internal(e.to_string()))?
            .map_err(|reason| ImportError::Parse {
                filename: parse_filename,
                reason,
            })?;

        let missing = sheet.missing_columns();
        if !missing.is_empty() {
            return Err(ImportError::Schema { filename, missing });
        }

        let mut summary = FileSummary::new(&filename);
        let total_rows = sheet.rows.len();

        for (idx, row) in sheet.rows.iter().enumerate() {
            // First data row sits below the header row
            let row_num = idx + 2;

            let outcome = self.process_row(&sheet, row, row_num).await;
            summary.record(outcome);

            if started.elapsed() > budget {
                return Err(ImportError::Timeout {
                    budget_secs: budget.as_secs(),
                    processed: summary.processed(),
                    total: total_rows,
                });
            }
        }

        if summary.errors.len() > MAX_ERRORS_PER_FILE {
            let overflow = summary.errors.len() - MAX_ERRORS_PER_FILE;
            summary.errors.truncate(MAX_ERRORS_PER_FILE);
            summary.errors.push(format!("... and {overflow} more errors"));
        }

        Ok(summary)
    }

    /// Validates, deduplicates and inserts one row. Every failure is
    /// recovered locally and reported as an outcome so neighbouring rows
    /// keep flowing.
    async fn process_row(&self, sheet: &ParsedSheet, row: &[CellValue], row_num: usize) -> RowOutcome {
        let name = sheet.cell(row, "name").as_text();
        let name = name.trim();
        if name.is_empty() {
            return RowOutcome::Failed(format!("row {row_num}: empty name"));
        }

        match self.store.find_service_by_name(name).await {
            Ok(Some(_)) => return RowOutcome::Skipped,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("row {row_num}: duplicate lookup failed: {e}");
                return RowOutcome::Failed(format!("row {row_num}: database error"));
            }
        }

        let duration_minutes = match sheet.cell(row, "duration_minutes").to_integer("duration_minutes")
        {
            Ok(value) => value,
            Err(reason) => return RowOutcome::Failed(format!("row {row_num}: {reason}")),
        };
        if duration_minutes <= 0 {
            return RowOutcome::Failed(format!(
                "row {row_num}: duration must be greater than 0"
            ));
        }

        let price = match sheet.cell(row, "price").to_decimal("price") {
            Ok(value) => value,
            Err(reason) => return RowOutcome::Failed(format!("row {row_num}: {reason}")),
        };
        if price < 0.0 {
            return RowOutcome::Failed(format!("row {row_num}: price cannot be negative"));
        }

        let state = sheet.cell(row, "state").to_boolean();

        let description = sheet.cell(row, "description").as_text();
        let description = description.trim();
        let description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };

        let input = ServiceInput {
            name: name.to_string(),
            description,
            duration_minutes,
            price,
            state,
        };

        match self.store.create_service(input).await {
            Ok(_) => RowOutcome::Completed,
            Err(e) => {
                tracing::warn!("row {row_num}: service insert failed: {e}");
                RowOutcome::Failed(format!("row {row_num}: failed to insert row"))
            }
        }
    }
}

#[async_trait]
impl ImportService for SpreadsheetImportService {
    async fn import_batch(&self, files: Vec<UploadedFile>) -> Result<BatchReport, ImportError> {
        self.import_batch_with_budget(files, BATCH_TIME_BUDGET).await
    }

    async fn import_file(&self, file: UploadedFile) -> Result<FileSummary, ImportError> {
        self.import_file_with_budget(file, FILE_TIME_BUDGET).await
    }
}
