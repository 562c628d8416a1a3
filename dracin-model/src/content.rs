//! Series, episodes and tags.

use serde::{Deserialize, Serialize};

use crate::QueryPairs;
use crate::ids::ResourceId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub episode_count: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<ResourceId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: ResourceId,
    #[serde(default)]
    pub series_id: Option<ResourceId>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
}

/// Usage count of a tag across series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagUsage {
    #[serde(default)]
    pub id: Option<ResourceId>,
    pub name: String,
    #[serde(default, alias = "count")]
    pub usage: u64,
}

/// Filters shared by the series, episode and tag listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub q: Option<String>,
    /// Only meaningful for `/episodes`.
    pub series_id: Option<ResourceId>,
}

impl ContentQuery {
    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        if let Some(series_id) = &self.series_id {
            pairs.push(("series_id", series_id.to_string()));
        }
        pairs
    }
}

/// `GET /content/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStats {
    #[serde(default)]
    pub series_total: u64,
    #[serde(default)]
    pub episodes_total: u64,
    #[serde(default)]
    pub tags_total: u64,
    #[serde(default)]
    pub storage_total_size: u64,
}

/// Stored bytes per month, from `GET /episodes/size/aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePoint {
    pub month: String,
    #[serde(default)]
    pub total_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_query_carries_series_filter() {
        let query = ContentQuery {
            q: Some(String::new()),
            series_id: Some(ResourceId::Int(3)),
            ..Default::default()
        };
        assert_eq!(query.to_pairs(), vec![("series_id", "3".to_string())]);
    }

    #[test]
    fn tag_payload_serializes_only_set_fields() {
        let payload = TagPayload {
            name: Some("Romance".into()),
            aliases: Some(vec!["romantis".into()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"name":"Romance","aliases":["romantis"]})
        );
    }
}
