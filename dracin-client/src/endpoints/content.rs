//! Catalogue: series, episodes, tags and their aggregates.

use dracin_model::{
    Ack, ContentQuery, ContentStats, Episode, EpisodePayload, Page,
    QueryPairs, ResourceId, Series, SeriesPayload, SizePoint, Tag, TagPayload,
    TagUsage,
};

use super::item_path;
use crate::client::{ApiClient, RequestSpec};
use crate::error::ApiError;

fn limit_pair(name: &'static str, limit: Option<u32>) -> QueryPairs {
    limit
        .filter(|l| *l > 0)
        .map(|l| vec![(name, l.to_string())])
        .unwrap_or_default()
}

impl ApiClient {
    /// `GET /series`
    pub async fn list_series(
        &self,
        query: &ContentQuery,
    ) -> Result<Page<Series>, ApiError> {
        self.fetch_page(
            RequestSpec::get("/series")
                .query(query.to_pairs())
                .fallback("Gagal memuat series"),
        )
        .await
    }

    /// `GET /series/recent`
    pub async fn recent_series(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Series>, ApiError> {
        self.fetch_list(
            RequestSpec::get("/series/recent")
                .query(limit_pair("limit", limit))
                .fallback("Gagal memuat series terbaru"),
        )
        .await
    }

    /// `GET /series/{id}`
    pub async fn get_series(&self, id: &ResourceId) -> Result<Series, ApiError> {
        self.fetch(
            RequestSpec::get(item_path("/series", id))
                .fallback("Gagal memuat series"),
        )
        .await
    }

    /// `POST /series`
    pub async fn create_series(
        &self,
        payload: &SeriesPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post("/series")
                .json(payload)?
                .fallback("Gagal membuat series"),
            "Series dibuat",
        )
        .await
    }

    /// `PUT /series/{id}`
    pub async fn update_series(
        &self,
        id: &ResourceId,
        payload: &SeriesPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path("/series", id))
                .json(payload)?
                .fallback("Gagal memperbarui series"),
            "Series diperbarui",
        )
        .await
    }

    /// `DELETE /series/{id}`
    pub async fn delete_series(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path("/series", id))
                .fallback("Gagal menghapus series"),
            "Series dihapus",
        )
        .await
    }

    /// `GET /tags`
    pub async fn list_tags(
        &self,
        query: &ContentQuery,
    ) -> Result<Page<Tag>, ApiError> {
        self.fetch_page(
            RequestSpec::get("/tags")
                .query(query.to_pairs())
                .fallback("Gagal memuat tags"),
        )
        .await
    }

    /// Most used tags, `top` entries at most.
    pub async fn tag_usage(
        &self,
        top: Option<u32>,
    ) -> Result<Vec<TagUsage>, ApiError> {
        self.fetch_list(
            RequestSpec::get("/tags/usage")
                .query(limit_pair("top", top))
                .fallback("Gagal memuat penggunaan tag teratas"),
        )
        .await
    }

    /// `GET /tags/{id}`
    pub async fn get_tag(&self, id: &ResourceId) -> Result<Tag, ApiError> {
        self.fetch(
            RequestSpec::get(item_path("/tags", id)).fallback("Gagal memuat tag"),
        )
        .await
    }

    /// `POST /tags`
    pub async fn create_tag(&self, payload: &TagPayload) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post("/tags")
                .json(payload)?
                .fallback("Gagal membuat tag"),
            "Tag dibuat",
        )
        .await
    }

    /// `PUT /tags/{id}`
    pub async fn update_tag(
        &self,
        id: &ResourceId,
        payload: &TagPayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path("/tags", id))
                .json(payload)?
                .fallback("Gagal memperbarui tag"),
            "Tag diperbarui",
        )
        .await
    }

    /// `DELETE /tags/{id}`
    pub async fn delete_tag(&self, id: &ResourceId) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path("/tags", id))
                .fallback("Gagal menghapus tag"),
            "Tag dihapus",
        )
        .await
    }

    /// `GET /episodes`
    pub async fn list_episodes(
        &self,
        query: &ContentQuery,
    ) -> Result<Page<Episode>, ApiError> {
        self.fetch_page(
            RequestSpec::get("/episodes")
                .query(query.to_pairs())
                .fallback("Gagal memuat episodes"),
        )
        .await
    }

    /// Latest uploads. `embed` asks the server to inline relations, e.g.
    /// `series`.
    pub async fn recent_episodes(
        &self,
        limit: Option<u32>,
        embed: Option<&str>,
    ) -> Result<Vec<Episode>, ApiError> {
        let mut query = limit_pair("limit", limit);
        if let Some(embed) = embed.filter(|e| !e.is_empty()) {
            query.push(("embed", embed.to_string()));
        }
        self.fetch_list(
            RequestSpec::get("/episodes/recent")
                .query(query)
                .fallback("Gagal memuat episodes terbaru"),
        )
        .await
    }

    /// `GET /episodes/{id}`
    pub async fn get_episode(
        &self,
        id: &ResourceId,
    ) -> Result<Episode, ApiError> {
        self.fetch(
            RequestSpec::get(item_path("/episodes", id))
                .fallback("Gagal memuat episode"),
        )
        .await
    }

    /// `POST /episodes`
    pub async fn create_episode(
        &self,
        payload: &EpisodePayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::post("/episodes")
                .json(payload)?
                .fallback("Gagal membuat episode"),
            "Episode dibuat",
        )
        .await
    }

    /// `PUT /episodes/{id}`
    pub async fn update_episode(
        &self,
        id: &ResourceId,
        payload: &EpisodePayload,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::put(item_path("/episodes", id))
                .json(payload)?
                .fallback("Gagal memperbarui episode"),
            "Episode diperbarui",
        )
        .await
    }

    /// `DELETE /episodes/{id}`
    pub async fn delete_episode(
        &self,
        id: &ResourceId,
    ) -> Result<Ack, ApiError> {
        self.acknowledge(
            RequestSpec::delete(item_path("/episodes", id))
                .fallback("Gagal menghapus episode"),
            "Episode dihapus",
        )
        .await
    }

    /// Stored bytes bucketed by `group` (e.g. `month`) over `period`.
    pub async fn episode_size_aggregate(
        &self,
        group: Option<&str>,
        period: Option<&str>,
    ) -> Result<Vec<SizePoint>, ApiError> {
        let query: QueryPairs = [("group", group), ("period", period)]
            .into_iter()
            .filter_map(|(key, value)| {
                value.filter(|v| !v.is_empty()).map(|v| (key, v.to_string()))
            })
            .collect();
        self.fetch_list(
            RequestSpec::get("/episodes/size/aggregate")
                .query(query)
                .fallback("Gagal memuat agregasi ukuran episode"),
        )
        .await
    }

    /// `GET /content/stats`
    pub async fn content_stats(&self) -> Result<ContentStats, ApiError> {
        self.fetch(
            RequestSpec::get("/content/stats")
                .fallback("Gagal memuat statistik konten"),
        )
        .await
    }
}
