//! Scan monitor: local belief about the remote scan job, its log tail and
//! the report that goes with the current phase.
//!
//! [`ScanSession`] talks to the server only through [`ScanApi`], which
//! [`ApiClient`](crate::ApiClient) implements and tests fake.

mod log;
mod params;
mod report;
mod session;
mod stream;

use async_trait::async_trait;
use dracin_model::{
    Ack, CurrentReport, ScanRealtime, StartScanRequest, SummaryReport,
};
use thiserror::Error;

use crate::error::ApiError;

pub use log::{ScanLog, format_frame, format_plain};
pub use params::{ScanValidationError, StartScanParams};
pub use report::{AuthoritativeReport, ReportBoard};
pub use session::{Notice, ScanSession, ScanSessionOptions, ScanUpdate};
pub use stream::{ScanStream, StreamEvent, decode_event};

/// Client-perceived state of the remote job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No scan is believed to be running.
    #[default]
    Idle,
    /// A scan is believed to be running.
    Running,
}

impl Phase {
    /// Phase implied by a realtime `is_running` flag.
    pub fn from_running(is_running: bool) -> Self {
        if is_running {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    /// True for [`Phase::Running`].
    pub fn is_running(self) -> bool {
        self == Phase::Running
    }
}

/// The scan endpoints the session depends on.
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// `POST /scan/start`
    async fn start_scan(&self, request: &StartScanRequest) -> Result<Ack, ApiError>;
    /// `POST /scan/stop`
    async fn stop_scan(&self) -> Result<Ack, ApiError>;
    /// `GET /scan/realtime`
    async fn scan_realtime(&self) -> Result<ScanRealtime, ApiError>;
    /// `GET /scan/report/current`
    async fn current_report(&self) -> Result<CurrentReport, ApiError>;
    /// `GET /scan/report/summary`
    async fn summary_report(&self) -> Result<SummaryReport, ApiError>;
    /// Subscribe to `GET /scan/stream`.
    async fn open_stream(&self) -> Result<ScanStream, ApiError>;
}

/// Failure of a scan start or stop.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Refused locally; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ScanValidationError),
    /// The server call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
