//! Aggregate queries feeding the analytics rollups
//!
//! 所有聚合都直接在事件表上做 GROUP BY，读路径无共享状态。

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::models::ConversionKind;
use super::SeaOrmStorage;
use crate::errors::{LinktrailError, Result};

use migration::entities::{click_event, conversion_event};

/// Optional filters applied to conversion-side aggregates. The date range
/// filters on conversion time; clicks are never date-filtered here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionFilter {
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub kind: Option<ConversionKind>,
}

#[derive(Debug, FromQueryResult)]
pub struct KindBreakdownRow {
    pub kind: String,
    pub conversions: i64,
    pub revenue_cents: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
pub struct DailyConversionRow {
    pub day: String,
    pub conversions: i64,
    pub revenue_cents: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
pub struct LinkClickRow {
    pub link_id: i64,
    pub clicks: i64,
    pub unique_clicks: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct LinkConversionRow {
    pub link_id: i64,
    pub conversions: i64,
    pub revenue_cents: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    conversions: i64,
    revenue_cents: Option<i64>,
}

fn conversion_condition(link_ids: &[i64], filter: &ConversionFilter) -> Condition {
    let mut condition =
        Condition::all().add(conversion_event::Column::LinkId.is_in(link_ids.to_vec()));

    if let Some((start, end)) = filter.range {
        condition = condition.add(conversion_event::Column::ConvertedAt.gte(start));
        condition = condition.add(conversion_event::Column::ConvertedAt.lte(end));
    }

    if let Some(kind) = filter.kind {
        condition = condition.add(conversion_event::Column::Kind.eq(kind.to_string()));
    }

    condition
}

fn filter_only_condition(filter: &ConversionFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some((start, end)) = filter.range {
        condition = condition.add(conversion_event::Column::ConvertedAt.gte(start));
        condition = condition.add(conversion_event::Column::ConvertedAt.lte(end));
    }

    if let Some(kind) = filter.kind {
        condition = condition.add(conversion_event::Column::Kind.eq(kind.to_string()));
    }

    condition
}

impl SeaOrmStorage {
    /// 按天分组的跨后端日期表达式
    fn daily_bucket_expr(&self) -> Expr {
        match self.db.get_database_backend() {
            DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', converted_at)"),
            DbBackend::MySql => Expr::cust("DATE_FORMAT(converted_at, '%Y-%m-%d')"),
            _ => Expr::cust("TO_CHAR(converted_at, 'YYYY-MM-DD')"),
        }
    }

    pub async fn count_clicks_for_links(&self, link_ids: &[i64]) -> Result<u64> {
        if link_ids.is_empty() {
            return Ok(0);
        }

        click_event::Entity::find()
            .filter(click_event::Column::LinkId.is_in(link_ids.to_vec()))
            .count(&self.db)
            .await
            .map_err(|e| LinktrailError::database_operation(format!("Click count failed: {}", e)))
    }

    /// Distinct tracking ids across the given links
    pub async fn count_unique_clicks_for_links(&self, link_ids: &[i64]) -> Result<u64> {
        if link_ids.is_empty() {
            return Ok(0);
        }

        let count: Option<i64> = click_event::Entity::find()
            .select_only()
            .column_as(
                Expr::expr(Func::count_distinct(Expr::col(
                    click_event::Column::TrackingId,
                ))),
                "unique_clicks",
            )
            .filter(click_event::Column::LinkId.is_in(link_ids.to_vec()))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Unique click count failed: {}", e))
            })?;

        Ok(count.unwrap_or(0).max(0) as u64)
    }

    /// Conversion count and exact revenue (in cents) for a link set
    pub async fn conversion_totals(
        &self,
        link_ids: &[i64],
        filter: &ConversionFilter,
    ) -> Result<(u64, i64)> {
        if link_ids.is_empty() {
            return Ok((0, 0));
        }

        let row = conversion_event::Entity::find()
            .select_only()
            .column_as(conversion_event::Column::Id.count(), "conversions")
            .column_as(conversion_event::Column::RevenueCents.sum(), "revenue_cents")
            .filter(conversion_condition(link_ids, filter))
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Conversion totals failed: {}", e))
            })?;

        match row {
            Some(totals) => Ok((
                totals.conversions.max(0) as u64,
                totals.revenue_cents.unwrap_or(0),
            )),
            None => Ok((0, 0)),
        }
    }

    /// Per-kind conversion counts and revenue for a link set
    pub async fn kind_breakdown(
        &self,
        link_ids: &[i64],
        filter: &ConversionFilter,
    ) -> Result<Vec<KindBreakdownRow>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        conversion_event::Entity::find()
            .select_only()
            .column(conversion_event::Column::Kind)
            .column_as(conversion_event::Column::Id.count(), "conversions")
            .column_as(conversion_event::Column::RevenueCents.sum(), "revenue_cents")
            .filter(conversion_condition(link_ids, filter))
            .group_by(conversion_event::Column::Kind)
            .into_model::<KindBreakdownRow>()
            .all(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Kind breakdown failed: {}", e))
            })
    }

    /// Daily conversion/revenue series for a link set, most recent day
    /// first, capped at `limit` rows.
    pub async fn daily_conversion_series(
        &self,
        link_ids: &[i64],
        filter: &ConversionFilter,
        limit: u64,
    ) -> Result<Vec<DailyConversionRow>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        let day_expr = self.daily_bucket_expr();

        conversion_event::Entity::find()
            .select_only()
            .column_as(day_expr.clone(), "day")
            .column_as(conversion_event::Column::Id.count(), "conversions")
            .column_as(conversion_event::Column::RevenueCents.sum(), "revenue_cents")
            .filter(conversion_condition(link_ids, filter))
            .group_by(day_expr.clone())
            .order_by_desc(day_expr)
            .limit(limit)
            .into_model::<DailyConversionRow>()
            .all(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Daily series failed: {}", e))
            })
    }

    /// Click counts grouped per link, across all links
    pub async fn clicks_grouped_by_link(&self) -> Result<Vec<LinkClickRow>> {
        click_event::Entity::find()
            .select_only()
            .column(click_event::Column::LinkId)
            .column_as(click_event::Column::Id.count(), "clicks")
            .column_as(
                Expr::expr(Func::count_distinct(Expr::col(
                    click_event::Column::TrackingId,
                ))),
                "unique_clicks",
            )
            .group_by(click_event::Column::LinkId)
            .into_model::<LinkClickRow>()
            .all(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!("Grouped click query failed: {}", e))
            })
    }

    /// Conversion aggregates grouped per link, across all links
    pub async fn conversions_grouped_by_link(
        &self,
        filter: &ConversionFilter,
    ) -> Result<Vec<LinkConversionRow>> {
        conversion_event::Entity::find()
            .select_only()
            .column(conversion_event::Column::LinkId)
            .column_as(conversion_event::Column::Id.count(), "conversions")
            .column_as(conversion_event::Column::RevenueCents.sum(), "revenue_cents")
            .filter(filter_only_condition(filter))
            .group_by(conversion_event::Column::LinkId)
            .into_model::<LinkConversionRow>()
            .all(&self.db)
            .await
            .map_err(|e| {
                LinktrailError::database_operation(format!(
                    "Grouped conversion query failed: {}",
                    e
                ))
            })
    }
}
