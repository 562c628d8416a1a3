use serde::{Deserialize, Serialize};

use crate::QueryPairs;
use crate::ids::ResourceId;

/// An end-user account of the streaming app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub premium_until: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Filters for `GET /users` and `GET /users/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub q: Option<String>,
    pub disabled: Option<bool>,
    pub is_premium: Option<bool>,
    pub sort: Option<String>,
}

impl UserQuery {
    /// A non-blank search term routes the listing to `/users/search`.
    pub fn is_search(&self) -> bool {
        self.q.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

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
        if let Some(disabled) = self.disabled {
            pairs.push(("disabled", disabled.to_string()));
        }
        if let Some(is_premium) = self.is_premium {
            pairs.push(("is_premium", is_premium.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort", sort.to_string()));
        }
        pairs
    }
}

/// Partial update for `PUT /users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_until: Option<String>,
}

/// One bucket of a monthly trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_a_plain_listing() {
        let query = UserQuery {
            q: Some("   ".into()),
            ..Default::default()
        };
        assert!(!query.is_search());
    }

    #[test]
    fn query_pairs_skip_unset_filters() {
        let query = UserQuery {
            page: Some(2),
            per_page: Some(20),
            is_premium: Some(false),
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_string()),
                ("per_page", "20".to_string()),
                ("is_premium", "false".to_string()),
            ]
        );
    }

    #[test]
    fn user_defaults_missing_flags() {
        let user: User =
            serde_json::from_str(r#"{"id":7,"email":"a@b.c"}"#).unwrap();
        assert!(!user.is_premium);
        assert!(!user.disabled);
    }
}
