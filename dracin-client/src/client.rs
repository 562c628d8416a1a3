//! Authenticated request pipeline shared by every endpoint.
//!
//! A call goes out with the current bearer token. If the reply says the token
//! is no longer valid (HTTP 401, an envelope `code` of 401, or the backend's
//! "token tidak valid" message) the client refreshes once and replays the
//! request once. A second rejection ends the session.

use std::fmt;
use std::sync::Arc;

use dracin_config::ClientConfig;
use dracin_model::{
    Ack, Envelope, ImageUpload, LoginRequest, Page, QueryPairs,
    RefreshRequest, TokenGrant,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::session::{ClearReason, SessionAction, SessionStore};

/// Fallback message for a 401 login reply without a message.
pub const LOGIN_REJECTED: &str = "Kredensial tidak valid";
/// Fallback message for any other failed login.
pub const LOGIN_FAILED: &str = "Gagal login, coba lagi";
const TOKEN_INVALID: &str = "token tidak valid";
const DEFAULT_FALLBACK: &str = "Permintaan gagal";

/// Which replies an endpoint treats as success.
///
/// The HTTP status must be 2xx in every case. A reply without an envelope
/// `code` is judged by its HTTP status instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Envelope code 200.
    Ok,
    /// Envelope code in the given set.
    Codes(&'static [i64]),
    /// Any 2xx reply.
    Transport,
}

impl Accept {
    /// Whether a reply with this HTTP status and envelope code counts as success.
    /// A missing envelope code falls back to the HTTP status.
    pub fn admits(self, status: StatusCode, code: Option<i64>) -> bool {
        if !status.is_success() {
            return false;
        }
        let code = code.unwrap_or_else(|| i64::from(status.as_u16()));
        match self {
            Accept::Ok => code == 200,
            Accept::Codes(codes) => codes.contains(&code),
            Accept::Transport => true,
        }
    }
}

/// Multipart body, rebuilt for every attempt since forms cannot be cloned.
#[derive(Debug, Clone, Default)]
pub(crate) struct FormSpec {
    fields: Vec<(&'static str, String)>,
    file: Option<(&'static str, ImageUpload)>,
}

impl FormSpec {
    pub(crate) fn text(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.fields.push((name, value.to_string()));
        }
        self
    }

    pub(crate) fn file(
        mut self,
        name: &'static str,
        image: Option<&ImageUpload>,
    ) -> Self {
        if let Some(image) = image {
            self.file = Some((name, image.clone()));
        }
        self
    }

    fn build(&self) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(*name, value.clone());
        }
        if let Some((name, image)) = &self.file {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)?;
            form = form.part(*name, part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Body {
    Empty,
    Json(Value),
    Form(FormSpec),
}

/// Everything needed to (re)issue one API call.
#[derive(Debug, Clone)]
pub(crate) struct RequestSpec {
    method: Method,
    path: String,
    query: QueryPairs,
    body: Body,
    accept: Accept,
    fallback: &'static str,
}

impl RequestSpec {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryPairs::new(),
            body: Body::Empty,
            accept: Accept::Ok,
            fallback: DEFAULT_FALLBACK,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn query(mut self, pairs: QueryPairs) -> Self {
        self.query.extend(pairs);
        self
    }

    pub(crate) fn json<T: Serialize + ?Sized>(
        mut self,
        body: &T,
    ) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub(crate) fn form(mut self, form: FormSpec) -> Self {
        self.body = Body::Form(form);
        self
    }

    pub(crate) fn accept(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }

    pub(crate) fn fallback(mut self, message: &'static str) -> Self {
        self.fallback = message;
        self
    }
}

/// A fully read reply. The body is kept raw for non-JSON downloads.
struct Reply {
    status: StatusCode,
    body: Vec<u8>,
    /// `None` for an empty body.
    parsed: Option<Result<Envelope<Value>, serde_json::Error>>,
}

fn empty_envelope() -> Envelope<Value> {
    Envelope {
        code: None,
        message: None,
        data: None,
        meta: None,
    }
}

impl Reply {
    async fn read(response: Response) -> Result<Self, ApiError> {
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice::<Envelope<Value>>(&body))
        };
        Ok(Self {
            status,
            body,
            parsed,
        })
    }

    fn envelope(&self) -> Option<&Envelope<Value>> {
        self.parsed.as_ref().and_then(|parsed| parsed.as_ref().ok())
    }

    fn is_unauthorized(&self) -> bool {
        if self.status == StatusCode::UNAUTHORIZED {
            return true;
        }
        self.envelope().is_some_and(|envelope| {
            envelope.code == Some(401)
                || envelope
                    .message()
                    .is_some_and(|m| m.to_lowercase().contains(TOKEN_INVALID))
        })
    }

    /// The envelope, or an empty one when the body was blank or not JSON.
    fn take_envelope(self) -> Envelope<Value> {
        match self.parsed {
            Some(Ok(envelope)) => envelope,
            _ => empty_envelope(),
        }
    }

    fn into_envelope(
        self,
        accept: Accept,
        fallback: &str,
    ) -> Result<Envelope<Value>, ApiError> {
        let status = self.status;
        let envelope = match self.parsed {
            Some(Ok(envelope)) => envelope,
            Some(Err(err)) if status.is_success() => return Err(err.into()),
            _ => empty_envelope(),
        };

        if !accept.admits(status, envelope.code) {
            return Err(ApiError::rejected(
                status,
                envelope.code,
                envelope.message().unwrap_or(fallback),
            ));
        }
        Ok(envelope)
    }
}

/// API client with session-backed authentication.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: Client,
    /// No overall timeout: the scan event stream stays open indefinitely.
    pub(crate) stream_http: Client,
    base_url: String,
    session: SessionStore,
    refresh_gate: Arc<Mutex<()>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.session.access_token().is_some())
            .finish()
    }
}

impl ApiClient {
    /// Build the HTTP clients for `config`. Nothing is sent yet.
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let base_url = config.api_base.trim_end_matches('/').to_string();
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        let stream_http = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;

        info!(base_url = %base_url, "API client ready");
        Ok(Self {
            http,
            stream_http,
            base_url,
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Join `path` onto the API base.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The API base, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session the client reads tokens from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `POST /login`. On success the grant is stored in the session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response =
            self.http.post(self.build_url("/login")).json(&body).send().await?;
        let reply = Reply::read(response).await?;
        let status = reply.status;
        let envelope = reply.take_envelope();

        if !Accept::Ok.admits(status, envelope.code) {
            let message = envelope.message().map(str::to_string).unwrap_or_else(
                || {
                    if status == StatusCode::UNAUTHORIZED {
                        LOGIN_REJECTED.to_string()
                    } else {
                        LOGIN_FAILED.to_string()
                    }
                },
            );
            return Err(ApiError::rejected(status, envelope.code, message));
        }

        let grant: TokenGrant = envelope.decode()?.into_data()?;
        let user = grant.user.as_ref().map(|u| u.label());
        info!(user = user.as_deref(), "signed in");
        self.session.dispatch(SessionAction::SignedIn(grant.clone()));
        Ok(grant)
    }

    /// Forget the stored session. The server is not contacted.
    pub fn logout(&self) {
        self.session
            .dispatch(SessionAction::Clear(ClearReason::SignedOut));
    }

    /// `POST /refresh`, returning the new access token. Any failure clears
    /// the session and yields [`ApiError::SessionExpired`].
    pub async fn refresh(&self) -> Result<String, ApiError> {
        match self.request_refresh().await {
            Ok(grant) => {
                let token = grant.access_token.clone();
                self.session.dispatch(SessionAction::Refreshed(grant));
                info!("access token refreshed");
                Ok(token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed; clearing session");
                self.session
                    .dispatch(SessionAction::Clear(ClearReason::Expired));
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn request_refresh(&self) -> Result<TokenGrant, ApiError> {
        let mut request = self.http.post(self.build_url("/refresh"));
        if let Some(refresh_token) = self.session.refresh_token() {
            request = request.json(&RefreshRequest {
                refresh_token: Some(refresh_token),
            });
        }

        let reply = Reply::read(request.send().await?).await?;
        if !reply.status.is_success() {
            return Err(ApiError::rejected(
                reply.status,
                reply.envelope().and_then(|e| e.code),
                "refresh rejected",
            ));
        }

        let grant: TokenGrant = reply.take_envelope().decode()?.into_data()?;
        if grant.access_token.is_empty() {
            return Err(ApiError::Invalid(
                "refresh reply carried no access token".to_string(),
            ));
        }
        Ok(grant)
    }

    /// Refresh unless another caller already replaced `rejected`.
    async fn refresh_after(&self, rejected: &str) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.session.access_token()
            && current != rejected
        {
            return Ok(current);
        }
        self.refresh().await
    }

    fn request(
        &self,
        spec: &RequestSpec,
        token: &str,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = self
            .http
            .request(spec.method.clone(), self.build_url(&spec.path))
            .bearer_auth(token);
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        builder = match &spec.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(form) => builder.multipart(form.build()?),
        };
        Ok(builder)
    }

    async fn attempt(
        &self,
        spec: &RequestSpec,
        token: &str,
    ) -> Result<Reply, ApiError> {
        debug!(method = %spec.method, path = %spec.path, "sending request");
        let response = self.request(spec, token)?.send().await?;
        Reply::read(response).await
    }

    async fn execute(&self, spec: &RequestSpec) -> Result<Reply, ApiError> {
        let token = self
            .session
            .access_token()
            .ok_or(ApiError::NotAuthenticated)?;

        let reply = self.attempt(spec, &token).await?;
        if !reply.is_unauthorized() {
            return Ok(reply);
        }

        info!(path = %spec.path, "access token rejected; refreshing");
        let token = self.refresh_after(&token).await?;
        let reply = self.attempt(spec, &token).await?;
        if reply.is_unauthorized() {
            warn!(path = %spec.path, "still unauthorized after refresh");
            self.session
                .dispatch(SessionAction::Clear(ClearReason::Expired));
            return Err(ApiError::SessionExpired);
        }
        Ok(reply)
    }

    pub(crate) async fn send(
        &self,
        spec: RequestSpec,
    ) -> Result<Envelope<Value>, ApiError> {
        let reply = self.execute(&spec).await?;
        reply.into_envelope(spec.accept, spec.fallback)
    }

    /// Single typed payload from `data`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<T, ApiError> {
        let envelope = self.send(spec).await?;
        Ok(envelope.decode::<T>()?.into_data()?)
    }

    /// List payload: `data` must be an array.
    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<Page<T>, ApiError> {
        let envelope = self.send(spec).await?;
        Ok(Page::from_envelope(envelope.decode::<Vec<T>>()?)?)
    }

    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> Result<Vec<T>, ApiError> {
        Ok(self.fetch_page(spec).await?.items)
    }

    /// Mutation whose reply only matters for its message.
    pub(crate) async fn acknowledge(
        &self,
        spec: RequestSpec,
        success: &str,
    ) -> Result<Ack, ApiError> {
        let envelope = self.send(spec).await?;
        Ok(Ack::from_envelope(&envelope, success))
    }

    /// Raw body of a non-JSON download.
    pub(crate) async fn download(
        &self,
        spec: RequestSpec,
    ) -> Result<Vec<u8>, ApiError> {
        let reply = self.execute(&spec).await?;
        if reply.status.is_success() {
            return Ok(reply.body);
        }

        let status = reply.status;
        let code = reply.envelope().and_then(|e| e.code);
        let message = reply
            .envelope()
            .and_then(|e| e.message().map(str::to_string))
            .or_else(|| {
                let text = String::from_utf8_lossy(&reply.body);
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .unwrap_or_else(|| spec.fallback.to_string());
        Err(ApiError::rejected(status, code, message))
    }
}
