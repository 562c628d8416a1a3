use dracin_config::ScanDefaults;
use dracin_model::StartScanRequest;
use thiserror::Error;

/// Why a start request was refused before anything was sent. Checked in
/// declaration order; the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanValidationError {
    /// No non-blank folder was given.
    #[error("Top folders wajib diisi")]
    MissingFolders,
    /// Batch size missing or not positive.
    #[error("Batch size wajib > 0")]
    BatchSize,
    /// Batch size does not fit the request's 32-bit field.
    #[error("Batch size maksimal 4294967295")]
    BatchSizeTooLarge,
    /// Pause missing or negative.
    #[error("Pause (ms) wajib ≥ 0")]
    PauseMs,
    /// Interval missing or not positive.
    #[error("Interval (ms) wajib > 0")]
    IntervalMs,
}

/// Operator input for `POST /scan/start`, possibly incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartScanParams {
    /// Folder names as typed; blanks are dropped on validation.
    pub top_folders: Vec<String>,
    /// Items per batch.
    pub batch_size: Option<i64>,
    /// Milliseconds between batches.
    pub pause_ms: Option<i64>,
    /// Milliseconds between full scans.
    pub interval_ms: Option<i64>,
}

/// Whole numbers only. Fractions, exponents and anything outside `i64` come
/// back as `None`, which validation reports as missing.
fn parse_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

impl StartScanParams {
    /// Parse form-style input: one folder per line, numbers as text. Blank,
    /// fractional (`1.5`) or exponent (`1e3`) numbers are treated as missing.
    pub fn from_text(
        folders: &str,
        batch_size: &str,
        pause_ms: &str,
        interval_ms: &str,
    ) -> Self {
        Self {
            top_folders: folders.lines().map(str::to_string).collect(),
            batch_size: parse_number(batch_size),
            pause_ms: parse_number(pause_ms),
            interval_ms: parse_number(interval_ms),
        }
    }

    /// Fill whatever is missing from configured defaults.
    pub fn with_defaults(mut self, defaults: &ScanDefaults) -> Self {
        if self.folders().next().is_none() {
            self.top_folders = defaults.top_folders.clone();
        }
        self.batch_size = self.batch_size.or(defaults.batch_size);
        self.pause_ms = self.pause_ms.or(defaults.pause_ms);
        self.interval_ms = self.interval_ms.or(defaults.interval_ms);
        self
    }

    fn folders(&self) -> impl Iterator<Item = &str> {
        self.top_folders
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
    }

    /// Check every field and build the request body.
    pub fn validate(&self) -> Result<StartScanRequest, ScanValidationError> {
        let top_folders: Vec<String> =
            self.folders().map(str::to_string).collect();
        if top_folders.is_empty() {
            return Err(ScanValidationError::MissingFolders);
        }
        let batch_size = match self.batch_size {
            Some(b) if b > 0 => u32::try_from(b)
                .map_err(|_| ScanValidationError::BatchSizeTooLarge)?,
            _ => return Err(ScanValidationError::BatchSize),
        };
        let pause_ms = self
            .pause_ms
            .and_then(|p| u64::try_from(p).ok())
            .ok_or(ScanValidationError::PauseMs)?;
        let interval_ms = self
            .interval_ms
            .filter(|i| *i > 0)
            .and_then(|i| u64::try_from(i).ok())
            .ok_or(ScanValidationError::IntervalMs)?;

        Ok(StartScanRequest {
            top_folders,
            batch_size,
            pause_ms,
            interval_ms,
        })
    }
}
