//! Generic `/settings` key/value table.

use dracin_model::{Ack, AdminSetting, SettingsMap};
use serde_json::{Value, json};

use super::NO_CONTENT;
use crate::client::{Accept, ApiClient, RequestSpec};
use crate::error::ApiError;

fn key_path(key: &str) -> String {
    format!("/settings/{}", urlencoding::encode(key))
}

impl ApiClient {
    /// `GET /settings`
    pub async fn list_settings(&self) -> Result<SettingsMap, ApiError> {
        self.fetch(RequestSpec::get("/settings").fallback("Gagal memuat settings"))
            .await
    }

    /// Bulk update; `payload` is an object of key → value.
    pub async fn update_settings(
        &self,
        payload: &Value,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put("/settings")
                .json(payload)?
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal memperbarui settings"),
            "Settings diperbarui",
        )
        .await
    }

    /// A single key. Servers answer with either `{key, value}` or the bare
    /// value.
    pub async fn get_setting(&self, key: &str) -> Result<AdminSetting, ApiError> {
        let data: Value = self
            .fetch(RequestSpec::get(key_path(key)).fallback("Gagal memuat setting"))
            .await?;
        let is_entry = matches!(
            &data,
            Value::Object(map) if map.contains_key("key") && map.contains_key("value")
        );
        if is_entry {
            return Ok(serde_json::from_value(data)?);
        }
        Ok(AdminSetting {
            key: key.to_string(),
            value: data,
        })
    }

    /// `PUT /settings/{key}`
    pub async fn put_setting(
        &self,
        key: &str,
        value: Value,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(key_path(key))
                .json(&json!({ "value": value }))?
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal menyimpan setting"),
            "Setting disimpan",
        )
        .await
    }

    /// `DELETE /settings/{key}`
    pub async fn delete_setting(&self, key: &str) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(key_path(key))
                .accept(Accept::Codes(NO_CONTENT))
                .fallback("Gagal menghapus setting"),
            "Setting dihapus",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_escaped_as_one_segment() {
        assert_eq!(key_path("APP_NAME"), "/settings/APP_NAME");
        assert_eq!(key_path("a/b c"), "/settings/a%2Fb%20c");
    }
}
