use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value entry of the generic admin settings table. Values are opaque
/// JSON; the backend decides what each key means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSetting {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// `GET /settings` answers with every key at once, as an object.
pub type SettingsMap = BTreeMap<String, serde_json::Value>;

/// Flatten a settings object into entries, in key order.
pub fn settings_entries(map: SettingsMap) -> Vec<AdminSetting> {
    map.into_iter()
        .map(|(key, value)| AdminSetting { key, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_object_flattens_in_key_order() {
        let map: SettingsMap = serde_json::from_str(
            r#"{"SCAN_ENABLED":true,"APP_NAME":"Dracin","TOP_FOLDERS":["A","B"]}"#,
        )
        .unwrap();
        let entries = settings_entries(map);
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["APP_NAME", "SCAN_ENABLED", "TOP_FOLDERS"]);
        assert_eq!(entries[1].value, serde_json::json!(true));
    }
}
