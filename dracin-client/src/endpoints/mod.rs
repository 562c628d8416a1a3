//! Typed endpoint wrappers, grouped the way the admin API groups its routes.
//!
//! Each function is a thin `impl ApiClient` method that builds a request,
//! picks the acceptance policy the backend needs, and decodes the payload.

pub mod app;
pub mod content;
pub mod payments;
pub mod scan;
pub mod settings;
pub mod users;

use dracin_model::ResourceId;

/// `<prefix>/<id>` with the id escaped as one segment.
pub(crate) fn item_path(prefix: &str, id: &ResourceId) -> String {
    format!("{prefix}/{}", id.as_path_segment())
}

/// Accepted by plan writes.
pub(crate) const CREATED: &[i64] = &[200, 201];
/// Accepted by deletions and writes that may answer without a body.
pub(crate) const NO_CONTENT: &[i64] = &[200, 204];
