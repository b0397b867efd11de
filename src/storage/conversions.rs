//! Conversion event queries and mutations

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder};

use super::models::{
    decimal_to_cents, model_to_conversion, ConversionEvent, NewConversionEvent,
};
use super::SeaOrmStorage;
use crate::errors::{LinktrailError, Result};

use migration::entities::{click_event, conversion_event};

impl SeaOrmStorage {
    pub async fn insert_conversion(&self, conversion: NewConversionEvent) -> Result<ConversionEvent> {
        let revenue_cents = conversion.revenue.map(decimal_to_cents).transpose()?;

        let model = conversion_event::ActiveModel {
            tracking_id: Set(conversion.tracking_id),
            link_id: Set(conversion.link_id),
            kind: Set(conversion.kind.to_string()),
            revenue_cents: Set(revenue_cents),
            event_data: Set(conversion.event_data),
            converted_at: Set(conversion.converted_at),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            LinktrailError::database_operation(format!("Failed to insert conversion: {}", e))
        })?;

        model_to_conversion(inserted)
    }

    /// All conversions credited to a tracking id, oldest first
    pub async fn conversions_for_tracking(&self, tracking_id: &str) -> Result<Vec<ConversionEvent>> {
        let models = conversion_event::Entity::find()
            .filter(conversion_event::Column::TrackingId.eq(tracking_id))
            .order_by_asc(conversion_event::Column::ConvertedAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Conversion lookup failed: {}", e))
            })?;

        models.into_iter().map(model_to_conversion).collect()
    }

    /// Delete conversions whose attribution anchor has aged out: no click
    /// for the tracking id strictly newer than the cutoff (measured from
    /// the click, not from the conversion's own age). One bounded statement.
    pub async fn purge_conversions_without_recent_click(
        &self,
        click_cutoff: DateTime<Utc>,
    ) -> Result<u64> {
        let recent_tracking_ids = Query::select()
            .column(click_event::Column::TrackingId)
            .from(click_event::Entity)
            .and_where(Expr::col(click_event::Column::ClickedAt).gt(click_cutoff))
            .to_owned();

        let result = conversion_event::Entity::delete_many()
            .filter(conversion_event::Column::TrackingId.not_in_subquery(recent_tracking_ids))
            .exec(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Conversion purge failed: {}", e))
            })?;

        Ok(result.rows_affected)
    }
}
