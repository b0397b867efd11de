//! External view-count cache access
//!
//! The cache is refreshed by a collaborator; the core only reads it to
//! compute CTR. The upsert exists for that collaborator to call.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::models::{model_to_video_stat, VideoStat};
use super::SeaOrmStorage;
use crate::errors::{LinktrailError, Result};

use migration::entities::video_stat;

impl SeaOrmStorage {
    /// View count for a video, `None` when the cache has no entry
    pub async fn video_view_count(&self, video_id: &str) -> Result<Option<i64>> {
        video_stat::Entity::find_by_id(video_id)
            .one(&self.db)
            .await
            .map(|opt| opt.map(|m| m.view_count))
            .map_err(|e| {
                LinktrailError::database_operation(format!("Video stat lookup failed: {}", e))
            })
    }

    pub async fn get_video_stat(&self, video_id: &str) -> Result<Option<VideoStat>> {
        video_stat::Entity::find_by_id(video_id)
            .one(&self.db)
            .await
            .map(|opt| opt.map(model_to_video_stat))
            .map_err(|e| {
                LinktrailError::database_operation(format!("Video stat lookup failed: {}", e))
            })
    }

    /// View counts for a set of videos; missing entries are simply absent
    pub async fn video_view_counts(&self, video_ids: &[String]) -> Result<HashMap<String, i64>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        video_stat::Entity::find()
            .filter(video_stat::Column::VideoId.is_in(video_ids.to_vec()))
            .all(&self.db)
            .await
            .map(|models| {
                models
                    .into_iter()
                    .map(|m| (m.video_id, m.view_count))
                    .collect()
            })
            .map_err(|e| {
                LinktrailError::database_operation(format!("Video stats query failed: {}", e))
            })
    }

    pub async fn upsert_video_stat(
        &self,
        video_id: &str,
        view_count: i64,
        refreshed_at: DateTime<Utc>,
    ) -> Result<()> {
        let model = video_stat::ActiveModel {
            video_id: Set(video_id.to_string()),
            view_count: Set(view_count),
            refreshed_at: Set(refreshed_at),
        };

        video_stat::Entity::insert(model)
            .on_conflict(
                OnConflict::column(video_stat::Column::VideoId)
                    .update_columns([
                        video_stat::Column::ViewCount,
                        video_stat::Column::RefreshedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Video stat upsert failed: {}", e))
            })?;

        Ok(())
    }
}

/// Seam for alternative view-count sources (e.g. a platform API client
/// living outside this crate). The storage-backed cache is the default.
#[async_trait::async_trait]
pub trait ViewCountSource: Send + Sync {
    async fn view_count(&self, video_id: &str) -> Result<Option<i64>>;
}

#[async_trait::async_trait]
impl ViewCountSource for SeaOrmStorage {
    async fn view_count(&self, video_id: &str) -> Result<Option<i64>> {
        self.video_view_count(video_id).await
    }
}
