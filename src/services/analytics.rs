//! Analytics rollups computed from the raw click/conversion streams
//!
//! All reads, no caching: every query aggregates directly off the event
//! tables, so there is nothing to invalidate between requests.
//!
//! Rounding policy, applied uniformly: percentages to 2 decimal places,
//! except CTR which gets 4 (CTR on video views is typically sub-1% and
//! loses meaning at 2); currency to 2 decimal places, round-half-up on the
//! cent boundary.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{LinktrailError, Result};
use crate::storage::models::cents_to_decimal;
use crate::storage::{ConversionFilter, ConversionKind, SeaOrmStorage, ViewCountSource};

// ============ Rollup types ============

#[derive(Debug, Clone, Serialize)]
pub struct LinkMetrics {
    pub link_id: i64,
    pub campaign_id: i64,
    pub short_code: String,
    pub total_clicks: u64,
    pub unique_clicks: u64,
    pub video_views: u64,
    /// total_clicks / video_views × 100, 4 decimal places, 0 without views
    pub ctr: f64,
    pub conversions: u64,
    /// conversions / total_clicks × 100, 2 decimal places, 0 without clicks
    pub conversion_rate: f64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignMetrics {
    pub campaign_id: i64,
    pub link_count: usize,
    pub total_clicks: u64,
    pub unique_clicks: u64,
    pub conversions: u64,
    /// Recomputed from the summed totals, never averaged from per-link rates
    pub conversion_rate: f64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelStep {
    pub name: String,
    pub count: u64,
    pub rate: f64,
    pub drop_off_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueBreakdown {
    pub kind: ConversionKind,
    pub revenue: Decimal,
    pub conversions: u64,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: Decimal,
    pub conversions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    pub breakdown: Vec<RevenueBreakdown>,
    /// Most recent days first, capped at 30 rows
    pub daily: Vec<DailyRevenue>,
}

/// Metric a top-links ranking can sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingMetric {
    #[default]
    Clicks,
    Conversions,
    Revenue,
    Ctr,
}

impl FromStr for RankingMetric {
    type Err = LinktrailError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clicks" => Ok(Self::Clicks),
            "conversions" => Ok(Self::Conversions),
            "revenue" => Ok(Self::Revenue),
            "ctr" => Ok(Self::Ctr),
            _ => Err(LinktrailError::validation(format!(
                "Unknown ranking metric '{}'. Valid: clicks, conversions, revenue, ctr",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopLink {
    pub link_id: i64,
    pub campaign_id: i64,
    pub short_code: String,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: Decimal,
    pub ctr: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignComparison {
    pub campaign_id: i64,
    pub clicks: u64,
    pub unique_clicks: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    pub revenue: Decimal,
    pub average_order_value: Decimal,
}

// ============ Rounding helpers ============

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn ctr_percentage(clicks: u64, views: u64) -> f64 {
    if views == 0 {
        0.0
    } else {
        round4(clicks as f64 / views as f64 * 100.0)
    }
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
    /// View counts come through a seam so an external platform client can
    /// replace the storage-backed cache; defaults to the cache.
    views: Arc<dyn ViewCountSource>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let views = storage.clone();
        Self { storage, views }
    }

    pub fn with_view_source(storage: Arc<SeaOrmStorage>, views: Arc<dyn ViewCountSource>) -> Self {
        Self { storage, views }
    }

    /// Strict date-range parsing: RFC3339 or YYYY-MM-DD, both ends or
    /// neither, start ≤ end. No silent fallback.
    pub fn parse_date_range_strict(
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        match (start_date, end_date) {
            (Some(s), Some(e)) => {
                let start = Self::parse_date(s).ok_or_else(|| {
                    LinktrailError::date_parse(format!(
                        "Invalid start date '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        s
                    ))
                })?;
                let end = Self::parse_date(e).ok_or_else(|| {
                    LinktrailError::date_parse(format!(
                        "Invalid end date '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        e
                    ))
                })?;
                if start > end {
                    return Err(LinktrailError::validation(
                        "Start date must not be later than end date",
                    ));
                }
                Ok(Some((start, end)))
            }
            (Some(_), None) => Err(LinktrailError::validation(
                "Start date is provided but end date is missing",
            )),
            (None, Some(_)) => Err(LinktrailError::validation(
                "End date is provided but start date is missing",
            )),
            (None, None) => Ok(None),
        }
    }

    fn parse_date(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    }

    /// Per-link rollup
    pub async fn link_metrics(
        &self,
        link_id: i64,
        filter: &ConversionFilter,
    ) -> Result<LinkMetrics> {
        let link = self
            .storage
            .find_link_by_id(link_id)
            .await?
            .ok_or_else(|| LinktrailError::not_found(format!("Link {} not found", link_id)))?;

        let ids = [link_id];
        let total_clicks = self.storage.count_clicks_for_links(&ids).await?;
        let unique_clicks = self.storage.count_unique_clicks_for_links(&ids).await?;
        let video_views = self
            .views
            .view_count(&link.video_id)
            .await?
            .unwrap_or(0)
            .max(0) as u64;
        let (conversions, revenue_cents) = self.storage.conversion_totals(&ids, filter).await?;

        debug!(
            "Analytics: link {} -> {} clicks, {} conversions",
            link_id, total_clicks, conversions
        );

        Ok(LinkMetrics {
            link_id: link.id,
            campaign_id: link.campaign_id,
            short_code: link.short_code,
            total_clicks,
            unique_clicks,
            video_views,
            ctr: ctr_percentage(total_clicks, video_views),
            conversions,
            conversion_rate: percentage(conversions, total_clicks),
            revenue: cents_to_decimal(revenue_cents),
        })
    }

    /// Per-campaign rollup: sums of the constituent links
    pub async fn campaign_metrics(
        &self,
        campaign_id: i64,
        filter: &ConversionFilter,
    ) -> Result<CampaignMetrics> {
        let ids = self.campaign_link_ids(campaign_id).await?;

        let total_clicks = self.storage.count_clicks_for_links(&ids).await?;
        let unique_clicks = self.storage.count_unique_clicks_for_links(&ids).await?;
        let (conversions, revenue_cents) = self.storage.conversion_totals(&ids, filter).await?;

        Ok(CampaignMetrics {
            campaign_id,
            link_count: ids.len(),
            total_clicks,
            unique_clicks,
            conversions,
            conversion_rate: percentage(conversions, total_clicks),
            revenue: cents_to_decimal(revenue_cents),
        })
    }

    pub async fn link_funnel(
        &self,
        link_id: i64,
        filter: &ConversionFilter,
    ) -> Result<Vec<FunnelStep>> {
        if self.storage.find_link_by_id(link_id).await?.is_none() {
            return Err(LinktrailError::not_found(format!(
                "Link {} not found",
                link_id
            )));
        }
        self.funnel_for_links(&[link_id], filter).await
    }

    pub async fn campaign_funnel(
        &self,
        campaign_id: i64,
        filter: &ConversionFilter,
    ) -> Result<Vec<FunnelStep>> {
        let ids = self.campaign_link_ids(campaign_id).await?;
        self.funnel_for_links(&ids, filter).await
    }

    /// Funnel: a fixed `clicks` head step, then one step per conversion
    /// kind present, ordered signup → enrollment → purchase.
    async fn funnel_for_links(
        &self,
        link_ids: &[i64],
        filter: &ConversionFilter,
    ) -> Result<Vec<FunnelStep>> {
        let total_clicks = self.storage.count_clicks_for_links(link_ids).await?;

        let mut steps = vec![FunnelStep {
            name: "clicks".to_string(),
            count: total_clicks,
            rate: 100.0,
            drop_off_rate: 0.0,
        }];

        if total_clicks == 0 {
            return Ok(steps);
        }

        let mut rows = Vec::new();
        for row in self.storage.kind_breakdown(link_ids, filter).await? {
            let kind: ConversionKind = row.kind.parse().map_err(|_| {
                LinktrailError::database_operation(format!(
                    "Unknown conversion kind '{}' in breakdown",
                    row.kind
                ))
            })?;
            rows.push((kind, row.conversions.max(0) as u64));
        }
        rows.sort_by_key(|(kind, _)| kind.funnel_precedence());

        let mut previous = total_clicks;
        for (kind, count) in rows {
            let drop_off_rate = if previous == 0 {
                0.0
            } else {
                round2((previous - count.min(previous)) as f64 / previous as f64 * 100.0)
            };
            steps.push(FunnelStep {
                name: kind.to_string(),
                count,
                rate: percentage(count, total_clicks),
                drop_off_rate,
            });
            previous = count;
        }

        Ok(steps)
    }

    pub async fn link_revenue_report(
        &self,
        link_id: i64,
        filter: &ConversionFilter,
    ) -> Result<RevenueReport> {
        if self.storage.find_link_by_id(link_id).await?.is_none() {
            return Err(LinktrailError::not_found(format!(
                "Link {} not found",
                link_id
            )));
        }
        self.revenue_report_for_links(&[link_id], filter).await
    }

    pub async fn campaign_revenue_report(
        &self,
        campaign_id: i64,
        filter: &ConversionFilter,
    ) -> Result<RevenueReport> {
        let ids = self.campaign_link_ids(campaign_id).await?;
        self.revenue_report_for_links(&ids, filter).await
    }

    async fn revenue_report_for_links(
        &self,
        link_ids: &[i64],
        filter: &ConversionFilter,
    ) -> Result<RevenueReport> {
        let (_, total_cents) = self.storage.conversion_totals(link_ids, filter).await?;

        let mut breakdown = Vec::new();
        for row in self.storage.kind_breakdown(link_ids, filter).await? {
            let kind: ConversionKind = row.kind.parse().map_err(|_| {
                LinktrailError::database_operation(format!(
                    "Unknown conversion kind '{}' in breakdown",
                    row.kind
                ))
            })?;
            let conversions = row.conversions.max(0) as u64;
            let revenue = cents_to_decimal(row.revenue_cents.unwrap_or(0));
            let average_order_value = if conversions == 0 {
                Decimal::ZERO
            } else {
                round_currency(revenue / Decimal::from(conversions))
            };
            breakdown.push(RevenueBreakdown {
                kind,
                revenue,
                conversions,
                average_order_value,
            });
        }
        breakdown.sort_by_key(|b| b.kind.funnel_precedence());

        let daily = self
            .storage
            .daily_conversion_series(link_ids, filter, 30)
            .await?
            .into_iter()
            .map(|row| DailyRevenue {
                date: row.day,
                revenue: cents_to_decimal(row.revenue_cents.unwrap_or(0)),
                conversions: row.conversions.max(0) as u64,
            })
            .collect();

        Ok(RevenueReport {
            total_revenue: cents_to_decimal(total_cents),
            breakdown,
            daily,
        })
    }

    /// Rank all links by the requested metric
    pub async fn top_links(
        &self,
        metric: RankingMetric,
        limit: usize,
        filter: &ConversionFilter,
    ) -> Result<Vec<TopLink>> {
        let links = self.storage.load_all_links().await?;

        let click_rows: HashMap<i64, (u64, u64)> = self
            .storage
            .clicks_grouped_by_link()
            .await?
            .into_iter()
            .map(|row| {
                (
                    row.link_id,
                    (row.clicks.max(0) as u64, row.unique_clicks.max(0) as u64),
                )
            })
            .collect();

        let conversion_rows: HashMap<i64, (u64, i64)> = self
            .storage
            .conversions_grouped_by_link(filter)
            .await?
            .into_iter()
            .map(|row| {
                (
                    row.link_id,
                    (row.conversions.max(0) as u64, row.revenue_cents.unwrap_or(0)),
                )
            })
            .collect();

        let video_ids: Vec<String> = links.iter().map(|l| l.video_id.clone()).collect();
        let views = self.storage.video_view_counts(&video_ids).await?;

        let mut ranked: Vec<TopLink> = links
            .into_iter()
            .map(|link| {
                let (clicks, _unique) = click_rows.get(&link.id).copied().unwrap_or((0, 0));
                let (conversions, revenue_cents) =
                    conversion_rows.get(&link.id).copied().unwrap_or((0, 0));
                let video_views = views.get(&link.video_id).copied().unwrap_or(0).max(0) as u64;
                TopLink {
                    link_id: link.id,
                    campaign_id: link.campaign_id,
                    short_code: link.short_code,
                    clicks,
                    conversions,
                    revenue: cents_to_decimal(revenue_cents),
                    ctr: ctr_percentage(clicks, video_views),
                }
            })
            .collect();

        match metric {
            RankingMetric::Clicks => ranked.sort_by(|a, b| b.clicks.cmp(&a.clicks)),
            RankingMetric::Conversions => ranked.sort_by(|a, b| b.conversions.cmp(&a.conversions)),
            RankingMetric::Revenue => ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue)),
            RankingMetric::Ctr => ranked.sort_by(|a, b| b.ctr.total_cmp(&a.ctr)),
        }
        ranked.truncate(limit);

        info!(
            "Analytics: top_links by {:?} returned {} rows",
            metric,
            ranked.len()
        );

        Ok(ranked)
    }

    /// Side-by-side campaign comparison. Campaigns that no longer exist
    /// (no links) are silently skipped.
    pub async fn compare_campaigns(
        &self,
        campaign_ids: &[i64],
        filter: &ConversionFilter,
    ) -> Result<Vec<CampaignComparison>> {
        let mut rows = Vec::with_capacity(campaign_ids.len());

        for &campaign_id in campaign_ids {
            let links = self.storage.links_for_campaign(campaign_id).await?;
            if links.is_empty() {
                debug!("Analytics: skipping unknown campaign {}", campaign_id);
                continue;
            }
            let ids: Vec<i64> = links.iter().map(|l| l.id).collect();

            let clicks = self.storage.count_clicks_for_links(&ids).await?;
            let unique_clicks = self.storage.count_unique_clicks_for_links(&ids).await?;
            let (conversions, revenue_cents) =
                self.storage.conversion_totals(&ids, filter).await?;

            let revenue = cents_to_decimal(revenue_cents);
            let average_order_value = if conversions == 0 {
                Decimal::ZERO
            } else {
                round_currency(revenue / Decimal::from(conversions))
            };

            rows.push(CampaignComparison {
                campaign_id,
                clicks,
                unique_clicks,
                conversions,
                conversion_rate: percentage(conversions, clicks),
                revenue,
                average_order_value,
            });
        }

        Ok(rows)
    }

    async fn campaign_link_ids(&self, campaign_id: i64) -> Result<Vec<i64>> {
        let links = self.storage.links_for_campaign(campaign_id).await?;
        if links.is_empty() {
            return Err(LinktrailError::not_found(format!(
                "Campaign {} has no links",
                campaign_id
            )));
        }
        Ok(links.into_iter().map(|l| l.id).collect())
    }
}
