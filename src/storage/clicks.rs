//! Click event queries and mutations

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use super::models::{model_to_click, ClickEvent, NewClickEvent};
use super::SeaOrmStorage;
use crate::errors::{LinktrailError, Result};

use migration::entities::click_event;

impl SeaOrmStorage {
    pub async fn insert_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        let model = click_event::ActiveModel {
            link_id: Set(click.link_id),
            tracking_id: Set(click.tracking_id),
            ip_address: Set(click.ip_address),
            user_agent: Set(click.user_agent),
            referrer: Set(click.referrer),
            clicked_at: Set(click.clicked_at),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map(model_to_click)
            .map_err(|e| {
                LinktrailError::database_operation(format!("Failed to insert click: {}", e))
            })
    }

    /// All clicks for a tracking id, most recent first
    pub async fn clicks_for_tracking(&self, tracking_id: &str) -> Result<Vec<ClickEvent>> {
        click_event::Entity::find()
            .filter(click_event::Column::TrackingId.eq(tracking_id))
            .order_by_desc(click_event::Column::ClickedAt)
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(model_to_click).collect())
            .map_err(|e| {
                LinktrailError::database_operation(format!("Click lookup failed: {}", e))
            })
    }

    /// Most recent click for a tracking id (the attribution anchor).
    /// Ties on clicked_at are broken arbitrarily.
    pub async fn latest_click_for_tracking(&self, tracking_id: &str) -> Result<Option<ClickEvent>> {
        click_event::Entity::find()
            .filter(click_event::Column::TrackingId.eq(tracking_id))
            .order_by_desc(click_event::Column::ClickedAt)
            .one(&self.db)
            .await
            .map(|opt| opt.map(model_to_click))
            .map_err(|e| {
                LinktrailError::database_operation(format!("Click lookup failed: {}", e))
            })
    }

    pub async fn count_clicks_for_link(&self, link_id: i64) -> Result<u64> {
        click_event::Entity::find()
            .filter(click_event::Column::LinkId.eq(link_id))
            .count(&self.db)
            .await
            .map_err(|e| LinktrailError::database_operation(format!("Click count failed: {}", e)))
    }

    /// Bulk purge of old click history. Single bounded statement so the
    /// duration stays predictable under large backlogs.
    pub async fn purge_clicks_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = click_event::Entity::delete_many()
            .filter(click_event::Column::ClickedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Click purge failed: {}", e))
            })?;

        Ok(result.rows_affected)
    }
}
