//! Async client for the Dracin admin API.
//!
//! The pieces are layered bottom-up:
//!
//! - [`storage`]: a tiny key/value store standing in for browser storage,
//! - [`session`]: the token/user store with subscribe/dispatch semantics,
//! - [`flash`]: one-shot messages handed from one command to the next,
//! - [`client`]: the authenticated request pipeline (refresh-once on 401),
//! - [`endpoints`]: typed wrappers per API area,
//! - [`scan`]: the scan monitor state machine driven by the event stream.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod flash;
pub mod scan;
pub mod session;
pub mod storage;

pub use client::{Accept, ApiClient};
pub use error::ApiError;
pub use flash::{FlashKind, FlashMessage, FlashStore};
pub use scan::{
    AuthoritativeReport, Notice, Phase, ReportBoard, ScanApi, ScanError,
    ScanLog, ScanSession, ScanSessionOptions, ScanStream, ScanUpdate,
    ScanValidationError, StartScanParams, StreamEvent,
};
pub use session::{
    ClearReason, SessionAction, SessionChange, SessionState, SessionStore,
    SessionSubscription,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub use dracin_model as model;
