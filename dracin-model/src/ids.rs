use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifier of a server-side record.
///
/// The admin API is not consistent about id types: most tables use integer
/// keys while a few (orders, settings) use strings. The id keeps whichever
/// form the server sent so it serializes back unchanged.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl ResourceId {
    /// Render the id as a single, percent-safe path segment.
    pub fn as_path_segment(&self) -> String {
        match self {
            ResourceId::Int(n) => n.to_string(),
            ResourceId::Text(s) => s
                .bytes()
                .map(|b| match b {
                    b'A'..=b'Z'
                    | b'a'..=b'z'
                    | b'0'..=b'9'
                    | b'-'
                    | b'_'
                    | b'.'
                    | b'~' => (b as char).to_string(),
                    other => format!("%{other:02X}"),
                })
                .collect(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(n) => write!(f, "{n}"),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ResourceId {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(raw.to_string()));
        }
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => ResourceId::Int(n),
            Err(_) => ResourceId::Text(trimmed.to_string()),
        })
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Int(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numeric_and_text_ids() {
        let ids: Vec<ResourceId> =
            serde_json::from_str(r#"[42, "INV-2024-001"]"#).unwrap();
        assert_eq!(ids[0], ResourceId::Int(42));
        assert_eq!(ids[1], ResourceId::Text("INV-2024-001".into()));
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[42,"INV-2024-001"]"#);
    }

    #[test]
    fn parses_cli_input() {
        assert_eq!("17".parse::<ResourceId>().unwrap(), ResourceId::Int(17));
        assert_eq!(
            " abc ".parse::<ResourceId>().unwrap(),
            ResourceId::Text("abc".into())
        );
        assert!("   ".parse::<ResourceId>().is_err());
    }

    #[test]
    fn escapes_path_segments() {
        let id = ResourceId::Text("ads/home page".into());
        assert_eq!(id.as_path_segment(), "ads%2Fhome%20page");
    }
}
