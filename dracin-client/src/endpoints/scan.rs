//! `/scan/*`: job control, realtime status, reports and the event stream.

use async_trait::async_trait;
use dracin_model::{
    Ack, CurrentReport, ScanRealtime, StartScanRequest, SummaryReport,
};
use reqwest_eventsource::EventSource;
use reqwest_eventsource::retry::Never;
use tracing::info;

use super::NO_CONTENT;
use crate::client::{Accept, ApiClient, RequestSpec};
use crate::error::ApiError;
use crate::scan::{ScanApi, ScanStream};

impl ApiClient {
    /// `POST /scan/start`. Callers should go through
    /// [`StartScanParams::validate`](crate::StartScanParams::validate) to
    /// build the request.
    pub async fn start_scan(
        &self,
        request: &StartScanRequest,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post("/scan/start")
                .json(request)?
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal memulai scan"),
            "Scan dimulai",
        )
        .await
    }

    /// `POST /scan/stop`
    pub async fn stop_scan(&self) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post("/scan/stop")
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal menghentikan scan"),
            "Scan dihentikan",
        )
        .await
    }

    /// `GET /scan/realtime`
    pub async fn scan_realtime(&self) -> Result<ScanRealtime, ApiError> {
        self.fetch(RequestSpec::get("/scan/realtime").fallback("Gagal memuat realtime"))
            .await
    }

    /// `GET /scan/report/current`
    pub async fn current_report(&self) -> Result<CurrentReport, ApiError> {
        self.fetch(
            RequestSpec::get("/scan/report/current")
                .fallback("Gagal memuat laporan berjalan"),
        )
        .await
    }

    /// `GET /scan/report/summary`
    pub async fn summary_report(&self) -> Result<SummaryReport, ApiError> {
        self.fetch(
            RequestSpec::get("/scan/report/summary")
                .fallback("Gagal memuat ringkasan database"),
        )
        .await
    }

    /// Subscribe to `GET /scan/stream`. The token travels both as the
    /// `access_token` query parameter and as a bearer header since servers
    /// differ in which one they read. A failed connection is reported once
    /// and never retried.
    pub fn open_scan_stream(&self) -> Result<ScanStream, ApiError> {
        let token = self
            .session()
            .access_token()
            .ok_or(ApiError::NotAuthenticated)?;
        let request = self
            .stream_http
            .get(self.build_url("/scan/stream"))
            .query(&[("access_token", token.as_str())])
            .bearer_auth(&token);

        let mut source = EventSource::new(request)
            .map_err(|err| ApiError::Stream(err.to_string()))?;
        source.set_retry_policy(Box::new(Never));
        info!("opening scan event stream");
        Ok(ScanStream::spawn(source))
    }
}

#[async_trait]
impl ScanApi for ApiClient {
    async fn start_scan(&self, request: &StartScanRequest) -> Result<Ack, ApiError> {
        ApiClient::start_scan(self, request).await
    }

    async fn stop_scan(&self) -> Result<Ack, ApiError> {
        ApiClient::stop_scan(self).await
    }

    async fn scan_realtime(&self) -> Result<ScanRealtime, ApiError> {
        ApiClient::scan_realtime(self).await
    }

    async fn current_report(&self) -> Result<CurrentReport, ApiError> {
        ApiClient::current_report(self).await
    }

    async fn summary_report(&self) -> Result<SummaryReport, ApiError> {
        ApiClient::summary_report(self).await
    }

    async fn open_stream(&self) -> Result<ScanStream, ApiError> {
        self.open_scan_stream()
    }
}
