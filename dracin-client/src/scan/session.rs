use std::fmt;
use std::sync::Arc;

use dracin_config::ClientConfig;
use dracin_config::models::{DEFAULT_LOG_CAPACITY, DEFAULT_PERSISTED_LOG_LINES};
use dracin_model::{
    Ack, CurrentReport, ScanRealtime, ScanStatusView, SummaryReport,
};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use super::{
    Phase, ReportBoard, ScanApi, ScanError, ScanLog, ScanStream,
    StartScanParams, StreamEvent,
};
use crate::error::ApiError;
use crate::flash::FlashKind;
use crate::storage::KeyValueStore;

const STARTED: &str = "Scan dimulai";
const STOPPED: &str = "Scan dihentikan";
const STREAM_LOST: &str = "Streaming terputus";

/// Log sizing for a [`ScanSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSessionOptions {
    /// Lines kept in memory.
    pub log_capacity: usize,
    /// Lines mirrored to storage.
    pub persisted_log_lines: usize,
}

impl Default for ScanSessionOptions {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            persisted_log_lines: DEFAULT_PERSISTED_LOG_LINES,
        }
    }
}

impl From<&ClientConfig> for ScanSessionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            log_capacity: config.log_capacity,
            persisted_log_lines: config.persisted_log_lines,
        }
    }
}

/// A toast: something the operator should see once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or error styling.
    pub kind: FlashKind,
    /// Text of the toast.
    pub message: String,
}

/// What [`ScanSession::next_event`] changed.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanUpdate {
    /// The event stream connected.
    StreamOpened,
    /// A line was appended to the log.
    Log(String),
    /// A status push replaced the projection. The phase may have changed
    /// with it.
    Status(ScanStatusView),
    /// A report panel was updated.
    Report,
    /// The event stream failed. The session is now idle, though the remote
    /// job may still be running.
    StreamLost,
}

#[derive(Debug, Clone, Copy)]
enum ReportKind {
    Current,
    Summary,
}

enum ReportFetch {
    Current(Result<CurrentReport, ApiError>),
    Summary(Result<SummaryReport, ApiError>),
}

/// Tag of a background report fetch: the phase generation it was issued
/// under and its issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    seq: u64,
}

enum Wake {
    Stream(Option<StreamEvent>),
    Report(Option<Result<(Ticket, ReportFetch), JoinError>>),
}

async fn next_stream_event(stream: Option<&mut ScanStream>) -> Option<StreamEvent> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Local view of the remote scan job.
///
/// Every phase change and every refresh bumps a generation counter.
/// Background report fetches are tagged with that generation and an issue
/// sequence. A result is applied only while its generation is current and
/// only if nothing issued after it has been applied yet, so a slow reply can
/// never overwrite newer state while overlapping fetches still land.
pub struct ScanSession<A> {
    api: Arc<A>,
    phase: Phase,
    status: Option<ScanStatusView>,
    realtime: Option<ScanRealtime>,
    reports: ReportBoard,
    log: ScanLog,
    stream: Option<ScanStream>,
    generation: u64,
    issued: u64,
    last_applied: u64,
    pending: JoinSet<(Ticket, ReportFetch)>,
    notices: Vec<Notice>,
    stream_lost: bool,
}

impl<A> fmt::Debug for ScanSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("streaming", &self.stream.is_some())
            .field("pending_reports", &self.pending.len())
            .field("log_lines", &self.log.len())
            .field("stream_lost", &self.stream_lost)
            .finish()
    }
}

impl<A: ScanApi + 'static> ScanSession<A> {
    /// Idle session whose log starts with the tail persisted in `store`.
    pub fn new(
        api: Arc<A>,
        store: Arc<dyn KeyValueStore>,
        options: ScanSessionOptions,
    ) -> Self {
        Self {
            api,
            phase: Phase::Idle,
            status: None,
            realtime: None,
            reports: ReportBoard::default(),
            log: ScanLog::new(
                options.log_capacity,
                options.persisted_log_lines,
                store,
            ),
            stream: None,
            generation: 0,
            issued: 0,
            last_applied: 0,
            pending: JoinSet::new(),
            notices: Vec::new(),
            stream_lost: false,
        }
    }

    /// Phase the session currently believes in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Shorthand for `phase().is_running()`.
    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    /// Last status shown in the panel.
    pub fn status(&self) -> Option<&ScanStatusView> {
        self.status.as_ref()
    }

    /// Last raw realtime payload.
    pub fn realtime(&self) -> Option<&ScanRealtime> {
        self.realtime.as_ref()
    }

    /// Both report panels.
    pub fn reports(&self) -> &ReportBoard {
        &self.reports
    }

    /// The log tail.
    pub fn log(&self) -> &ScanLog {
        &self.log
    }

    /// Empty the log, including its persisted tail.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Counter bumped on every phase change and explicit refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether an event stream is currently held.
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Set when the event stream failed; cleared by the next successful
    /// [`refresh`](Self::refresh).
    pub fn stream_lost(&self) -> bool {
        self.stream_lost
    }

    /// Toasts not yet taken.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain the pending toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Validate, ask the server to start, then enter `Running` and refresh.
    pub async fn start(
        &mut self,
        params: &StartScanParams,
    ) -> Result<Ack, ScanError> {
        let result = match params.validate() {
            Ok(request) => {
                self.api.start_scan(&request).await.map_err(ScanError::from)
            }
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(ack) => {
                info!("scan started");
                self.notify(FlashKind::Success, ack.message.clone());
                self.log.append(STARTED);
                self.enter(Phase::Running).await;
                let _ = self.refresh().await;
                Ok(ack)
            }
            Err(err) => {
                warn!(error = %err, "scan start refused");
                self.notify(FlashKind::Error, err.to_string());
                self.log.append(&format!("Gagal memulai scan: {err}"));
                Err(err)
            }
        }
    }

    /// Ask the server to stop. On success the session goes idle and
    /// reloads the summary.
    pub async fn stop(&mut self) -> Result<Ack, ScanError> {
        match self.api.stop_scan().await {
            Ok(ack) => {
                info!("scan stopped");
                self.notify(FlashKind::Success, ack.message.clone());
                self.log.append(STOPPED);
                self.enter(Phase::Idle).await;
                let _ = self.refresh().await;
                Ok(ack)
            }
            Err(err) => {
                warn!(error = %err, "scan stop failed");
                self.notify(FlashKind::Error, err.to_string());
                self.log.append(&format!("Gagal menghentikan scan: {err}"));
                Err(err.into())
            }
        }
    }

    /// Fetch the realtime status, follow it into the matching phase and load
    /// the report for that phase. Report failures are not surfaced.
    pub async fn refresh(&mut self) -> Result<ScanStatusView, ApiError> {
        self.sync(true).await
    }

    /// Like [`refresh`](Self::refresh), but a running scan does not open the
    /// event stream. For one-shot reads.
    pub async fn snapshot(&mut self) -> Result<ScanStatusView, ApiError> {
        self.sync(false).await
    }

    async fn sync(&mut self, follow: bool) -> Result<ScanStatusView, ApiError> {
        self.bump();
        let realtime = match self.api.scan_realtime().await {
            Ok(realtime) => realtime,
            Err(err) => {
                self.notify(FlashKind::Error, err.to_string());
                return Err(err);
            }
        };

        if let Some(message) = realtime.message() {
            self.log.append(message);
        }
        let view = self.apply_realtime(realtime);
        let phase = Phase::from_running(view.is_running);
        if follow || phase == Phase::Idle {
            self.stream_lost = false;
            self.enter(phase).await;
        } else {
            self.set_phase(phase);
        }

        match self.phase {
            Phase::Running => match self.api.current_report().await {
                Ok(report) => self.reports.current = Some(report),
                Err(err) => debug!(error = %err, "current report unavailable"),
            },
            Phase::Idle => match self.api.summary_report().await {
                Ok(report) => self.reports.summary = Some(report),
                Err(err) => debug!(error = %err, "summary report unavailable"),
            },
        }
        Ok(view)
    }

    /// Reload the current report on demand.
    pub async fn refresh_current(&mut self) -> Result<&CurrentReport, ApiError> {
        self.bump();
        match self.api.current_report().await {
            Ok(report) => Ok(self.reports.current.insert(report)),
            Err(err) => {
                self.notify(FlashKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Reload the summary report on demand.
    pub async fn refresh_summary(&mut self) -> Result<&SummaryReport, ApiError> {
        self.bump();
        match self.api.summary_report().await {
            Ok(report) => Ok(self.reports.summary.insert(report)),
            Err(err) => {
                self.notify(FlashKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Wait for the next change driven by the event stream or a background
    /// report fetch. `None` when there is nothing left to wait for.
    pub async fn next_event(&mut self) -> Option<ScanUpdate> {
        loop {
            let has_pending = !self.pending.is_empty();
            if self.stream.is_none() && !has_pending {
                return None;
            }

            let wake = {
                let stream = self.stream.as_mut();
                let pending = &mut self.pending;
                tokio::select! {
                    event = next_stream_event(stream) => Wake::Stream(event),
                    joined = pending.join_next(), if has_pending => Wake::Report(joined),
                }
            };

            let update = match wake {
                Wake::Stream(Some(event)) => self.on_stream_event(event),
                Wake::Stream(None) => self.on_stream_event(StreamEvent::Closed),
                Wake::Report(Some(Ok((ticket, fetch)))) => {
                    self.apply_report(ticket, fetch)
                }
                Wake::Report(Some(Err(err))) => {
                    if !err.is_cancelled() {
                        warn!(error = %err, "report fetch task failed");
                    }
                    None
                }
                Wake::Report(None) => None,
            };
            if update.is_some() {
                return update;
            }
        }
    }

    /// Release the event stream and abandon background fetches.
    pub fn close(&mut self) {
        self.close_stream();
        self.pending.abort_all();
    }

    fn notify(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            message: message.into(),
        });
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn apply_realtime(&mut self, realtime: ScanRealtime) -> ScanStatusView {
        let view = ScanStatusView::from(&realtime);
        self.status = Some(view.clone());
        self.realtime = Some(realtime);
        view
    }

    fn set_phase(&mut self, phase: Phase) -> bool {
        if self.phase == phase {
            return false;
        }
        self.bump();
        self.phase = phase;
        info!(?phase, "scan phase changed");
        true
    }

    async fn enter(&mut self, phase: Phase) {
        if !self.set_phase(phase) {
            return;
        }
        match phase {
            Phase::Running => self.open_stream().await,
            Phase::Idle => self.close_stream(),
        }
    }

    fn leave_running(&mut self) {
        if self.phase == Phase::Running {
            self.bump();
            self.phase = Phase::Idle;
            info!("scan phase changed to idle");
        }
        self.close_stream();
    }

    async fn open_stream(&mut self) {
        self.close_stream();
        match self.api.open_stream().await {
            Ok(stream) => self.stream = Some(stream),
            Err(err) => {
                warn!(error = %err, "could not open scan stream");
                self.lose_stream();
            }
        }
    }

    fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            debug!("scan stream closed");
        }
    }

    fn lose_stream(&mut self) {
        self.leave_running();
        self.stream_lost = true;
        self.notify(FlashKind::Error, STREAM_LOST);
    }

    fn on_stream_event(&mut self, event: StreamEvent) -> Option<ScanUpdate> {
        match event {
            StreamEvent::Opened => Some(ScanUpdate::StreamOpened),
            StreamEvent::Log(frame) => {
                Some(ScanUpdate::Log(self.log.append_frame(&frame)))
            }
            StreamEvent::Status(realtime) => {
                let view = self.apply_realtime(realtime);
                if view.is_running {
                    self.spawn_report(ReportKind::Current);
                } else {
                    self.leave_running();
                    self.spawn_report(ReportKind::Summary);
                }
                Some(ScanUpdate::Status(view))
            }
            StreamEvent::Error(message) => {
                warn!(error = %message, "scan stream lost");
                self.lose_stream();
                Some(ScanUpdate::StreamLost)
            }
            StreamEvent::Closed => {
                warn!("scan stream ended");
                self.lose_stream();
                Some(ScanUpdate::StreamLost)
            }
        }
    }

    /// Fetch a report in the background under the current generation.
    fn spawn_report(&mut self, kind: ReportKind) {
        self.issued += 1;
        let ticket = Ticket {
            generation: self.generation,
            seq: self.issued,
        };
        let api = Arc::clone(&self.api);
        self.pending.spawn(async move {
            let fetch = match kind {
                ReportKind::Current => {
                    ReportFetch::Current(api.current_report().await)
                }
                ReportKind::Summary => {
                    ReportFetch::Summary(api.summary_report().await)
                }
            };
            (ticket, fetch)
        });
    }

    fn apply_report(
        &mut self,
        ticket: Ticket,
        fetch: ReportFetch,
    ) -> Option<ScanUpdate> {
        if ticket.generation != self.generation || ticket.seq <= self.last_applied {
            debug!(
                generation = ticket.generation,
                seq = ticket.seq,
                current = self.generation,
                last_applied = self.last_applied,
                "discarding stale report"
            );
            return None;
        }
        match fetch {
            ReportFetch::Current(Ok(report)) => self.reports.current = Some(report),
            ReportFetch::Summary(Ok(report)) => self.reports.summary = Some(report),
            ReportFetch::Current(Err(err)) | ReportFetch::Summary(Err(err)) => {
                debug!(error = %err, "background report fetch failed");
                return None;
            }
        }
        self.last_applied = ticket.seq;
        Some(ScanUpdate::Report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dracin_model::{ScanPosition, ScanTotals, StartScanRequest};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::sync::{Semaphore, mpsc};

    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<&'static str>>,
        running: Mutex<bool>,
        fail_start: Mutex<Option<String>>,
        stream_tx: Mutex<Option<mpsc::UnboundedSender<StreamEvent>>>,
        started_with: Mutex<Option<StartScanRequest>>,
        current_calls: AtomicU64,
        current_gate: Mutex<Option<Arc<Semaphore>>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }

        fn push(&self, event: StreamEvent) {
            let tx = self.stream_tx.lock();
            tx.as_ref().expect("stream open").send(event).expect("receiver alive");
        }

        fn stream_closed(&self) -> bool {
            self.stream_tx.lock().as_ref().is_none_or(|tx| tx.is_closed())
        }
    }

    fn summary() -> SummaryReport {
        SummaryReport {
            totals: ScanTotals {
                series_total: 10,
                episodes_total: 40,
                tags_total: 5,
            },
            storage_total_size: Some(123_456_789),
            ..Default::default()
        }
    }

    #[async_trait]
    impl ScanApi for FakeApi {
        async fn start_scan(&self, request: &StartScanRequest) -> Result<Ack, ApiError> {
            self.calls.lock().push("start");
            if let Some(message) = self.fail_start.lock().clone() {
                return Err(ApiError::Rejected {
                    status: 200,
                    code: Some(409),
                    message,
                });
            }
            *self.started_with.lock() = Some(request.clone());
            *self.running.lock() = true;
            Ok(Ack {
                code: 200,
                message: STARTED.to_string(),
            })
        }

        async fn stop_scan(&self) -> Result<Ack, ApiError> {
            self.calls.lock().push("stop");
            *self.running.lock() = false;
            Ok(Ack {
                code: 200,
                message: STOPPED.to_string(),
            })
        }

        async fn scan_realtime(&self) -> Result<ScanRealtime, ApiError> {
            self.calls.lock().push("realtime");
            let running = *self.running.lock();
            Ok(ScanRealtime {
                is_running: running,
                position: running.then(|| ScanPosition {
                    folder: Some("ANIME_A".into()),
                    current: Some(1),
                    total: Some(3),
                }),
                message: running.then(|| "Memindai ANIME_A".to_string()),
                ..Default::default()
            })
        }

        async fn current_report(&self) -> Result<CurrentReport, ApiError> {
            self.calls.lock().push("current");
            let call = self.current_calls.fetch_add(1, Ordering::SeqCst) + 1;
            let gate = self.current_gate.lock().clone();
            if let Some(gate) = gate {
                gate.acquire().await.expect("gate open").forget();
            }
            Ok(CurrentReport {
                totals: ScanTotals {
                    series_total: 2,
                    episodes_total: call,
                    ..Default::default()
                },
                ..Default::default()
            })
        }

        async fn summary_report(&self) -> Result<SummaryReport, ApiError> {
            self.calls.lock().push("summary");
            Ok(summary())
        }

        async fn open_stream(&self) -> Result<ScanStream, ApiError> {
            self.calls.lock().push("stream");
            let (tx, rx) = mpsc::unbounded_channel();
            *self.stream_tx.lock() = Some(tx);
            Ok(ScanStream::from_receiver(rx))
        }
    }

    fn session(api: &Arc<FakeApi>) -> ScanSession<FakeApi> {
        ScanSession::new(
            Arc::clone(api),
            Arc::new(MemoryStore::new()),
            ScanSessionOptions::default(),
        )
    }

    fn params() -> StartScanParams {
        StartScanParams {
            top_folders: vec!["ANIME_A".into()],
            batch_size: Some(10),
            pause_ms: Some(30_000),
            interval_ms: Some(600_000),
        }
    }

    #[tokio::test]
    async fn invalid_params_never_reach_the_server() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);

        let err = scan
            .start(&StartScanParams {
                batch_size: Some(0),
                ..params()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Invalid(_)));
        assert!(api.calls().is_empty());
        assert_eq!(scan.phase(), Phase::Idle);
        assert!(scan.log().last().unwrap().ends_with("Gagal memulai scan: Batch size wajib > 0"));
        assert_eq!(scan.take_notices()[0].kind, FlashKind::Error);
    }

    #[tokio::test]
    async fn start_enters_running_and_loads_current_report() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);

        let ack = scan.start(&params()).await.unwrap();
        assert_eq!(ack.message, STARTED);
        assert_eq!(api.calls(), ["start", "stream", "realtime", "current"]);
        assert_eq!(
            api.started_with.lock().clone().unwrap(),
            StartScanRequest {
                top_folders: vec!["ANIME_A".into()],
                batch_size: 10,
                pause_ms: 30_000,
                interval_ms: 600_000,
            }
        );

        assert!(scan.is_running());
        assert!(scan.is_streaming());
        assert_eq!(scan.reports().current.as_ref().unwrap().totals.series_total, 2);
        assert!(scan.reports().summary.is_none());
        let lines: Vec<_> = scan.log().lines().collect();
        assert!(lines[0].ends_with(" Scan dimulai"));
        assert!(lines[1].ends_with(" Memindai ANIME_A"));
        assert_eq!(
            scan.status().unwrap().current_folder.as_deref(),
            Some("ANIME_A")
        );
    }

    #[tokio::test]
    async fn server_rejection_is_logged() {
        let api = Arc::new(FakeApi::default());
        *api.fail_start.lock() = Some("Scan sedang berjalan".into());
        let mut scan = session(&api);

        assert!(scan.start(&params()).await.is_err());
        assert_eq!(scan.phase(), Phase::Idle);
        assert!(
            scan.log()
                .last()
                .unwrap()
                .ends_with("Gagal memulai scan: Scan sedang berjalan")
        );
    }

    #[tokio::test]
    async fn stop_closes_stream_and_switches_to_summary() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();
        api.calls.lock().clear();

        scan.stop().await.unwrap();
        assert_eq!(api.calls(), ["stop", "realtime", "summary"]);
        assert_eq!(scan.phase(), Phase::Idle);
        assert!(!scan.is_streaming());
        assert!(api.stream_closed());

        let summary = scan.reports().authoritative(Phase::Idle).unwrap();
        assert_eq!(summary.totals().episodes_total, 40);
    }

    #[tokio::test]
    async fn idle_refresh_fetches_summary_only() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);

        let view = scan.refresh().await.unwrap();
        assert!(!view.is_running);
        assert_eq!(api.calls(), ["realtime", "summary"]);
        assert_eq!(scan.reports().summary, Some(summary()));
        assert!(scan.reports().current.is_none());
        assert!(scan.log().is_empty());
    }

    #[tokio::test]
    async fn snapshot_of_a_running_scan_does_not_stream() {
        let api = Arc::new(FakeApi::default());
        *api.running.lock() = true;
        let mut scan = session(&api);

        let view = scan.snapshot().await.unwrap();
        assert!(view.is_running);
        assert!(scan.is_running());
        assert!(!scan.is_streaming());
        assert_eq!(api.calls(), ["realtime", "current"]);
        assert!(scan.reports().current.is_some());
        assert_eq!(scan.next_event().await, None);

        *api.running.lock() = false;
        let view = scan.snapshot().await.unwrap();
        assert!(!view.is_running);
        assert!(!scan.is_running());
        assert_eq!(api.calls(), ["realtime", "current", "realtime", "summary"]);
    }

    #[tokio::test]
    async fn pushed_log_lines_are_formatted() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();

        api.push(StreamEvent::Log(dracin_model::ScanLogFrame {
            timestamp: None,
            level: Some("warn".into()),
            message: Some("folder kosong".into()),
        }));
        let Some(ScanUpdate::Log(line)) = scan.next_event().await else {
            panic!("expected a log update");
        };
        assert!(line.starts_with('['));
        assert!(line.ends_with("] [WARN] folder kosong"));
    }

    #[tokio::test]
    async fn idle_status_push_leaves_running() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();
        api.calls.lock().clear();

        api.push(StreamEvent::Status(ScanRealtime::default()));
        assert!(matches!(
            scan.next_event().await,
            Some(ScanUpdate::Status(ref view)) if !view.is_running
        ));
        assert_eq!(scan.phase(), Phase::Idle);
        assert!(api.stream_closed());

        assert_eq!(scan.next_event().await, Some(ScanUpdate::Report));
        assert_eq!(api.calls(), ["summary"]);
        assert_eq!(scan.next_event().await, None);
    }

    #[tokio::test]
    async fn running_status_push_refetches_current() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();
        api.calls.lock().clear();

        api.push(StreamEvent::Status(ScanRealtime {
            is_running: true,
            ..Default::default()
        }));
        assert!(matches!(scan.next_event().await, Some(ScanUpdate::Status(_))));
        assert_eq!(scan.next_event().await, Some(ScanUpdate::Report));
        assert_eq!(api.calls(), ["current"]);
        assert!(scan.is_running());
    }

    #[tokio::test]
    async fn stream_error_marks_the_session_lost() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();
        scan.take_notices();

        api.push(StreamEvent::Error("connection reset".into()));
        assert_eq!(scan.next_event().await, Some(ScanUpdate::StreamLost));
        assert_eq!(scan.phase(), Phase::Idle);
        assert!(scan.stream_lost());
        assert_eq!(
            scan.take_notices(),
            vec![Notice {
                kind: FlashKind::Error,
                message: STREAM_LOST.to_string(),
            }]
        );
        assert_eq!(scan.next_event().await, None);

        // The job is still running remotely; a refresh finds it again.
        scan.refresh().await.unwrap();
        assert!(!scan.stream_lost());
        assert!(scan.is_running());
        assert!(scan.is_streaming());
    }

    #[tokio::test]
    async fn reports_from_an_older_generation_are_discarded() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        let old = Ticket {
            generation: scan.generation(),
            seq: 1,
        };
        scan.bump();

        let stale = ReportFetch::Summary(Ok(summary()));
        assert_eq!(scan.apply_report(old, stale), None);
        assert!(scan.reports().summary.is_none());

        let fresh = Ticket {
            generation: scan.generation(),
            seq: 2,
        };
        assert_eq!(
            scan.apply_report(fresh, ReportFetch::Summary(Ok(summary()))),
            Some(ScanUpdate::Report)
        );
        assert!(scan.reports().summary.is_some());

        // Issued before the one already applied.
        let overtaken = Ticket {
            generation: scan.generation(),
            seq: 1,
        };
        assert_eq!(
            scan.apply_report(overtaken, ReportFetch::Summary(Ok(summary()))),
            None
        );
    }

    #[tokio::test]
    async fn overlapping_current_fetches_still_update_the_panel() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();
        let gate = Arc::new(Semaphore::new(0));
        *api.current_gate.lock() = Some(Arc::clone(&gate));

        let running = || {
            StreamEvent::Status(ScanRealtime {
                is_running: true,
                ..Default::default()
            })
        };
        // Two pushes land before either report reply.
        api.push(running());
        assert!(matches!(scan.next_event().await, Some(ScanUpdate::Status(_))));
        api.push(running());
        assert!(matches!(scan.next_event().await, Some(ScanUpdate::Status(_))));

        gate.add_permits(1);
        let first = tokio::time::timeout(Duration::from_secs(5), scan.next_event())
            .await
            .expect("first reply applied");
        assert_eq!(first, Some(ScanUpdate::Report));
        let after_first = scan.reports().current.as_ref().unwrap().totals.episodes_total;
        assert!(after_first > 1);

        gate.add_permits(1);
        let second = tokio::time::timeout(Duration::from_secs(5), scan.next_event())
            .await
            .expect("second reply applied");
        assert_eq!(second, Some(ScanUpdate::Report));
        assert!(scan.reports().current.as_ref().unwrap().totals.episodes_total > after_first);
        assert!(scan.is_running());
    }

    #[tokio::test]
    async fn close_releases_the_stream() {
        let api = Arc::new(FakeApi::default());
        let mut scan = session(&api);
        scan.start(&params()).await.unwrap();

        scan.close();
        assert!(!scan.is_streaming());
        assert!(api.stream_closed());
        assert_eq!(scan.next_event().await, None);
    }
}
