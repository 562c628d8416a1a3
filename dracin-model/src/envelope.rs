//! The `{code, message, data, meta}` wrapper shared by every endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Uniform response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(200),
            message: None,
            data: Some(data),
            meta: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Server message when present and non-blank.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    pub fn into_data(self) -> Result<T> {
        self.data.ok_or(ModelError::MissingData)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
            meta: self.meta,
        }
    }
}

impl Envelope<serde_json::Value> {
    /// Decode the untyped payload into `T`.
    ///
    /// A `null` or absent payload decodes as JSON `null`, so `Option<T>` and
    /// unit targets accept it while struct targets reject it.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Envelope<T>> {
        let data = self.data.unwrap_or(serde_json::Value::Null);
        let typed = serde_json::from_value(data)?;
        Ok(Envelope {
            code: self.code,
            message: self.message,
            data: Some(typed),
            meta: self.meta,
        })
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default, alias = "total")]
    pub total_items: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl PageMeta {
    pub fn single(total_items: u64) -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            total_items,
            per_page: None,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Build a page from a list envelope. Endpoints that do not paginate
    /// omit `meta`; they are treated as a single complete page.
    pub fn from_envelope(envelope: Envelope<Vec<T>>) -> Result<Self> {
        let meta = envelope.meta.clone();
        let items = envelope.into_data()?;
        let meta =
            meta.unwrap_or_else(|| PageMeta::single(items.len() as u64));
        Ok(Self { items, meta })
    }

    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.last_page
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Message-only acknowledgement returned by mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub code: i64,
    pub message: String,
}

impl Ack {
    pub fn from_envelope<T>(envelope: &Envelope<T>, fallback: &str) -> Self {
        Self {
            code: envelope.code.unwrap_or(200),
            message: envelope.message().unwrap_or(fallback).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_payload_must_be_an_array() {
        let raw: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"code":200,"message":"ok","data":{"items":[1,2]}}"#,
        )
        .unwrap();
        assert!(raw.decode::<Vec<u32>>().is_err());
    }

    #[test]
    fn page_without_meta_is_single_page() {
        let raw: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code":200,"data":[1,2,3]}"#).unwrap();
        let page = Page::from_envelope(raw.decode::<Vec<u32>>().unwrap())
            .unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.meta.total_items, 3);
        assert!(!page.has_next());
    }

    #[test]
    fn page_meta_reads_pagination() {
        let raw: Envelope<serde_json::Value> = serde_json::from_str(
            r#"{"code":200,"data":[],"meta":{"current_page":2,"last_page":5,"total_items":48}}"#,
        )
        .unwrap();
        let page = Page::from_envelope(raw.decode::<Vec<u32>>().unwrap())
            .unwrap();
        assert!(page.has_next());
        assert_eq!(page.meta.total_items, 48);
    }

    #[test]
    fn blank_message_is_ignored() {
        let env: Envelope<()> =
            serde_json::from_str(r#"{"code":200,"message":"  "}"#).unwrap();
        assert_eq!(env.message(), None);
        assert_eq!(Ack::from_envelope(&env, "Tersimpan").message, "Tersimpan");
    }
}
