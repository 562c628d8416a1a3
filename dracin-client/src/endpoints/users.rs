use dracin_model::{
    Ack, MonthlyCount, Page, QueryPairs, ResourceId, User, UserQuery,
    UserUpdate,
};

use super::item_path;
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;

impl ApiClient {
    /// `GET /users`, or `GET /users/search` when the query has a search term.
    pub async fn list_users(
        &self,
        query: &UserQuery,
    ) -> Result<Page<User>, ApiError> {
        let path = if query.is_search() {
            "/users/search"
        } else {
            "/users"
        };
        self.fetch_page(
            RequestSpec::get(path)
                .query(query.to_pairs())
                .fallback("Gagal memuat users"),
        )
        .await
    }

    /// `GET /users/{id}`
    pub async fn get_user(&self, id: &ResourceId) -> Result<User, ApiError> {
        self.fetch(
            RequestSpec::get(item_path("/users", id))
                .fallback("Gagal memuat user"),
        )
        .await
    }

    /// `PUT /users/{id}`
    pub async fn update_user(
        &self,
        id: &ResourceId,
        update: &UserUpdate,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path("/users", id))
                .json(update)?
                .fallback("Gagal memperbarui user"),
            "User diperbarui",
        )
        .await
    }

    /// `DELETE /users/{id}`
    pub async fn delete_user(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path("/users", id))
                .fallback("Gagal menghapus user"),
            "User dihapus",
        )
        .await
    }

    /// New sign-ups per month.
    pub async fn new_users_trend(
        &self,
        period: Option<&str>,
    ) -> Result<Vec<MonthlyCount>, ApiError> {
        let mut query = QueryPairs::new();
        if let Some(period) = period.filter(|p| !p.is_empty()) {
            query.push(("period", period.to_string()));
        }
        self.fetch_list(
            RequestSpec::get("/users/new/trend")
                .query(query)
                .fallback("Gagal memuat trend user baru"),
        )
        .await
    }
}
