//! Campaign link queries and mutations

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::info;

use super::models::{model_to_link, CampaignLink, NewCampaignLink};
use super::SeaOrmStorage;
use crate::errors::{LinktrailError, Result};

use migration::entities::campaign_link;

impl SeaOrmStorage {
    /// Insert a new link.
    ///
    /// The unique indexes on short_code and custom_alias are the
    /// authoritative gate: any availability pre-check is an optimization,
    /// so an insert-time violation maps to `Conflict`, never gets ignored.
    pub async fn insert_link(&self, link: NewCampaignLink) -> Result<CampaignLink> {
        let now = Utc::now();
        let model = campaign_link::ActiveModel {
            campaign_id: Set(link.campaign_id),
            short_code: Set(link.short_code.clone()),
            custom_alias: Set(link.custom_alias.clone()),
            destination_url: Set(link.destination_url),
            video_id: Set(link.video_id),
            video_title: Set(link.video_title),
            video_thumbnail: Set(link.video_thumbnail),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
                LinktrailError::conflict(format!(
                    "Path segment '{}' is already taken",
                    link.custom_alias.as_deref().unwrap_or(&link.short_code)
                ))
            } else {
                LinktrailError::database_operation(format!("Failed to insert link: {}", e))
            }
        })?;

        info!(
            "Storage: created link {} (code '{}', campaign {})",
            inserted.id, inserted.short_code, inserted.campaign_id
        );

        Ok(model_to_link(inserted))
    }

    /// Resolve a path segment: short code first, custom alias second.
    ///
    /// Codes and aliases share one namespace, so the order is only a lookup
    /// optimization (generated codes dominate traffic).
    pub async fn find_link_by_path_segment(&self, segment: &str) -> Result<Option<CampaignLink>> {
        let by_code = campaign_link::Entity::find()
            .filter(campaign_link::Column::ShortCode.eq(segment))
            .one(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Code lookup failed: {}", e))
            })?;

        if let Some(model) = by_code {
            return Ok(Some(model_to_link(model)));
        }

        let by_alias = campaign_link::Entity::find()
            .filter(campaign_link::Column::CustomAlias.eq(segment))
            .one(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Alias lookup failed: {}", e))
            })?;

        Ok(by_alias.map(model_to_link))
    }

    pub async fn find_link_by_id(&self, id: i64) -> Result<Option<CampaignLink>> {
        campaign_link::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|opt| opt.map(model_to_link))
            .map_err(|e| LinktrailError::database_operation(format!("Link lookup failed: {}", e)))
    }

    /// Availability pre-check against both halves of the namespace
    pub async fn path_segment_taken(&self, segment: &str) -> Result<bool> {
        let count = campaign_link::Entity::find()
            .filter(
                Condition::any()
                    .add(campaign_link::Column::ShortCode.eq(segment))
                    .add(campaign_link::Column::CustomAlias.eq(segment)),
            )
            .count(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Availability check failed: {}", e))
            })?;

        Ok(count > 0)
    }

    pub async fn links_for_campaign(&self, campaign_id: i64) -> Result<Vec<CampaignLink>> {
        campaign_link::Entity::find()
            .filter(campaign_link::Column::CampaignId.eq(campaign_id))
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(model_to_link).collect())
            .map_err(|e| {
                LinktrailError::database_operation(format!("Campaign links query failed: {}", e))
            })
    }

    pub async fn load_all_links(&self) -> Result<Vec<CampaignLink>> {
        campaign_link::Entity::find()
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(model_to_link).collect())
            .map_err(|e| {
                LinktrailError::database_operation(format!("Failed to load links: {}", e))
            })
    }
}
