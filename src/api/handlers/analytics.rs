//! Analytics read endpoints

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};

use crate::api::helpers::{api_result, error_from_linktrail};
use crate::api::types::{AnalyticsQueryParams, CompareQueryParams, TopLinksQueryParams};
use crate::errors::LinktrailError;
use crate::services::{AnalyticsService, RankingMetric};
use crate::storage::{ConversionFilter, ConversionKind};

/// Build the shared conversion-side filter from query params
fn parse_filter(
    start_date: Option<&str>,
    end_date: Option<&str>,
    kind: Option<&str>,
) -> Result<ConversionFilter, LinktrailError> {
    let range = AnalyticsService::parse_date_range_strict(start_date, end_date)?;

    let kind = match kind {
        Some(raw) => Some(raw.parse::<ConversionKind>().map_err(|_| {
            LinktrailError::validation(format!(
                "Unknown conversion kind '{}'. Valid: signup, purchase, enrollment",
                raw
            ))
        })?),
        None => None,
    };

    Ok(ConversionFilter { range, kind })
}

fn filter_from_params(
    params: &AnalyticsQueryParams,
) -> Result<ConversionFilter, LinktrailError> {
    parse_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.kind.as_deref(),
    )
}

pub async fn get_link_analytics(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics.link_metrics(path.into_inner(), &filter).await,
    ))
}

pub async fn get_link_funnel(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics.link_funnel(path.into_inner(), &filter).await,
    ))
}

pub async fn get_link_revenue(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics
            .link_revenue_report(path.into_inner(), &filter)
            .await,
    ))
}

pub async fn get_campaign_analytics(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics
            .campaign_metrics(path.into_inner(), &filter)
            .await,
    ))
}

pub async fn get_campaign_funnel(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics.campaign_funnel(path.into_inner(), &filter).await,
    ))
}

pub async fn get_campaign_revenue(
    path: web::Path<i64>,
    query: web::Query<AnalyticsQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let filter = match filter_from_params(&query) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };
    Ok(api_result(
        analytics
            .campaign_revenue_report(path.into_inner(), &filter)
            .await,
    ))
}

pub async fn get_top_links(
    query: web::Query<TopLinksQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let params = query.into_inner();

    let filter = match parse_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.kind.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    let metric = match params.metric.as_deref() {
        Some(raw) => match raw.parse::<RankingMetric>() {
            Ok(metric) => metric,
            Err(e) => return Ok(error_from_linktrail(&e)),
        },
        None => RankingMetric::default(),
    };

    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    Ok(api_result(
        analytics.top_links(metric, limit, &filter).await,
    ))
}

pub async fn compare_campaigns(
    query: web::Query<CompareQueryParams>,
    analytics: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let params = query.into_inner();

    let filter = match parse_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.kind.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    let mut campaign_ids = Vec::new();
    for raw in params.ids.split(',').filter(|s| !s.trim().is_empty()) {
        match raw.trim().parse::<i64>() {
            Ok(id) => campaign_ids.push(id),
            Err(_) => {
                return Ok(error_from_linktrail(&LinktrailError::validation(format!(
                    "Invalid campaign id '{}'",
                    raw
                ))));
            }
        }
    }

    Ok(api_result(
        analytics.compare_campaigns(&campaign_ids, &filter).await,
    ))
}
