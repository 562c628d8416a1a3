//! Scan control, realtime status and report payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Body of `POST /scan/start`. Only constructed from validated parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartScanRequest {
    pub top_folders: Vec<String>,
    pub batch_size: u32,
    pub pause_ms: u64,
    pub interval_ms: u64,
}

/// Folder cursor of the running scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPosition {
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub current: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Payload of `GET /scan/realtime`.
///
/// Status pushes on the event stream reuse this shape but some servers send
/// the already-flattened projection instead (`running`, `current_folder`,
/// `friendly_message`, ...). Both spellings are separate fields so a payload
/// carrying both still decodes; the accessors merge them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRealtime {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ScanPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_series: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_series_detail: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_folder_position: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_folders: Option<u64>,
}

impl ScanRealtime {
    /// Either running flag set counts as running.
    pub fn in_progress(&self) -> bool {
        self.is_running || self.running.unwrap_or(false)
    }

    /// First non-empty of `message` and `friendly_message`.
    pub fn message(&self) -> Option<&str> {
        [self.message.as_deref(), self.friendly_message.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }

    pub fn series_detail(&self) -> Option<&serde_json::Value> {
        self.current_series
            .as_ref()
            .filter(|v| !v.is_null())
            .or(self.current_series_detail.as_ref().filter(|v| !v.is_null()))
    }
}

/// Simplified status projection rendered by clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStatusView {
    pub is_running: bool,
    pub current_folder: Option<String>,
    pub current_folder_position: Option<u64>,
    pub total_folders: Option<u64>,
    pub friendly_message: String,
    pub current_series_detail: Option<serde_json::Value>,
}

impl From<&ScanRealtime> for ScanStatusView {
    fn from(rt: &ScanRealtime) -> Self {
        let position = rt.position.clone().unwrap_or_default();
        Self {
            is_running: rt.in_progress(),
            current_folder: position.folder.or_else(|| rt.current_folder.clone()),
            current_folder_position: position
                .current
                .or(rt.current_folder_position),
            total_folders: position.total.or(rt.total_folders),
            friendly_message: rt.message().unwrap_or_default().to_string(),
            current_series_detail: rt.series_detail().cloned(),
        }
    }
}

/// A `status` event from `/scan/stream`, either bare or wrapped in `data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScanStatusFrame {
    Wrapped { data: ScanRealtime },
    Bare(ScanRealtime),
}

impl ScanStatusFrame {
    pub fn into_realtime(self) -> ScanRealtime {
        match self {
            ScanStatusFrame::Wrapped { data } => data,
            ScanStatusFrame::Bare(data) => data,
        }
    }
}

/// Event timestamp: epoch milliseconds or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogTimestamp {
    Millis(i64),
    Text(String),
}

impl LogTimestamp {
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            LogTimestamp::Millis(ms) => {
                Local.timestamp_millis_opt(*ms).single()
            }
            LogTimestamp::Text(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local)),
        }
    }
}

/// A `log` event from `/scan/stream`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanLogFrame {
    #[serde(default, alias = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<LogTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTotals {
    #[serde(default)]
    pub series_total: u64,
    #[serde(default)]
    pub episodes_total: u64,
    #[serde(default)]
    pub tags_total: u64,
}

/// Per-folder counters of the running scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderProgress {
    #[serde(default)]
    pub series_total: Option<u64>,
    #[serde(default)]
    pub episodes_total: Option<u64>,
    #[serde(default)]
    pub tags_total: Option<u64>,
    #[serde(default)]
    pub errors_total: Option<u64>,
    #[serde(default)]
    pub next_start_index: Option<u64>,
}

/// `GET /scan/report/current`: in-progress counts, valid while running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentReport {
    #[serde(default)]
    pub totals: ScanTotals,
    #[serde(default)]
    pub by_folder: BTreeMap<String, FolderProgress>,
}

/// `GET /scan/report/summary`: settled database counts, valid while idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSummaryReport")]
pub struct SummaryReport {
    pub totals: ScanTotals,
    pub by_folder: BTreeMap<String, FolderProgress>,
    pub storage_total_size: Option<u64>,
}

/// The summary endpoint has shipped both a nested and a flat layout.
#[derive(Deserialize)]
struct RawSummaryReport {
    #[serde(default)]
    totals: Option<ScanTotals>,
    #[serde(default)]
    series_total: Option<u64>,
    #[serde(default)]
    episodes_total: Option<u64>,
    #[serde(default)]
    tags_total: Option<u64>,
    #[serde(default)]
    by_folder: Option<BTreeMap<String, FolderProgress>>,
    #[serde(default)]
    storage_total_size: Option<u64>,
}

impl From<RawSummaryReport> for SummaryReport {
    fn from(raw: RawSummaryReport) -> Self {
        let totals = raw.totals.unwrap_or(ScanTotals {
            series_total: raw.series_total.unwrap_or(0),
            episodes_total: raw.episodes_total.unwrap_or(0),
            tags_total: raw.tags_total.unwrap_or(0),
        });
        Self {
            totals,
            by_folder: raw.by_folder.unwrap_or_default(),
            storage_total_size: raw.storage_total_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_projects_position() {
        let rt: ScanRealtime = serde_json::from_str(
            r#"{"is_running":true,"position":{"folder":"ANIME_A","current":2,"total":5},"message":"Memindai ANIME_A","current_series":{"name":"X"}}"#,
        )
        .unwrap();
        let view = ScanStatusView::from(&rt);
        assert!(view.is_running);
        assert_eq!(view.current_folder.as_deref(), Some("ANIME_A"));
        assert_eq!(view.current_folder_position, Some(2));
        assert_eq!(view.total_folders, Some(5));
        assert_eq!(view.friendly_message, "Memindai ANIME_A");
        assert!(view.current_series_detail.is_some());
    }

    #[test]
    fn realtime_with_null_position() {
        let rt: ScanRealtime = serde_json::from_str(
            r#"{"is_running":false,"position":null,"message":"","current_series":null}"#,
        )
        .unwrap();
        let view = ScanStatusView::from(&rt);
        assert!(!view.is_running);
        assert!(view.current_folder.is_none());
        assert_eq!(rt.message(), None);
    }

    #[test]
    fn status_frame_accepts_wrapped_and_flat_shapes() {
        let wrapped: ScanStatusFrame =
            serde_json::from_str(r#"{"data":{"is_running":true}}"#).unwrap();
        assert!(wrapped.into_realtime().is_running);

        let flat: ScanStatusFrame = serde_json::from_str(
            r#"{"running":true,"current_folder":"B","friendly_message":"hi"}"#,
        )
        .unwrap();
        let view = ScanStatusView::from(&flat.into_realtime());
        assert!(view.is_running);
        assert_eq!(view.current_folder.as_deref(), Some("B"));
        assert_eq!(view.friendly_message, "hi");
    }

    #[test]
    fn both_spellings_in_one_payload_decode() {
        let frame: ScanStatusFrame = serde_json::from_str(
            r#"{"is_running":false,"running":true,"message":"","friendly_message":"Memindai B","current_series":null,"current_series_detail":{"name":"Y"}}"#,
        )
        .unwrap();
        let rt = frame.into_realtime();
        assert!(rt.in_progress());
        assert_eq!(rt.message(), Some("Memindai B"));

        let view = ScanStatusView::from(&rt);
        assert!(view.is_running);
        assert_eq!(view.friendly_message, "Memindai B");
        assert_eq!(view.current_series_detail, Some(serde_json::json!({"name": "Y"})));

        let idle: ScanStatusFrame = serde_json::from_str(
            r#"{"data":{"is_running":false,"running":false,"message":"Selesai","friendly_message":"Scan selesai"}}"#,
        )
        .unwrap();
        let rt = idle.into_realtime();
        assert!(!rt.in_progress());
        assert_eq!(rt.message(), Some("Selesai"));
    }

    #[test]
    fn log_frame_reads_ts_alias() {
        let frame: ScanLogFrame = serde_json::from_str(
            r#"{"ts":1700000000000,"level":"warn","message":"slow"}"#,
        )
        .unwrap();
        assert_eq!(frame.timestamp, Some(LogTimestamp::Millis(1_700_000_000_000)));
        assert!(frame.timestamp.unwrap().to_local().is_some());

        let text = LogTimestamp::Text("2024-05-01T10:00:00Z".into());
        assert!(text.to_local().is_some());
        assert!(LogTimestamp::Text("yesterday".into()).to_local().is_none());
    }

    #[test]
    fn summary_accepts_flat_shape() {
        let summary: SummaryReport = serde_json::from_str(
            r#"{"series_total":10,"episodes_total":40,"tags_total":5,"storage_total_size":123456789}"#,
        )
        .unwrap();
        assert_eq!(summary.totals.series_total, 10);
        assert_eq!(summary.totals.episodes_total, 40);
        assert_eq!(summary.totals.tags_total, 5);
        assert_eq!(summary.storage_total_size, Some(123_456_789));
        assert!(summary.by_folder.is_empty());
    }

    #[test]
    fn summary_accepts_nested_shape() {
        let summary: SummaryReport = serde_json::from_str(
            r#"{"totals":{"series_total":3},"by_folder":{"A":{"series_total":3}}}"#,
        )
        .unwrap();
        assert_eq!(summary.totals.series_total, 3);
        assert_eq!(summary.totals.episodes_total, 0);
        assert_eq!(summary.by_folder["A"].series_total, Some(3));
        assert_eq!(summary.storage_total_size, None);
    }

    #[test]
    fn current_report_by_folder() {
        let report: CurrentReport = serde_json::from_str(
            r#"{"totals":{"series_total":2,"episodes_total":9,"tags_total":1},"by_folder":{"ANIME_A":{"series_total":2,"episodes_total":9,"tags_total":1,"errors_total":0,"next_start_index":10}}}"#,
        )
        .unwrap();
        assert_eq!(report.by_folder["ANIME_A"].next_start_index, Some(10));
    }
}
