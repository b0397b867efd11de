//! Domain models and entity converters

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{LinktrailError, Result};
use migration::entities::{campaign_link, click_event, conversion_event, video_stat};

/// A trackable short link inside a campaign
#[derive(Debug, Clone, Serialize)]
pub struct CampaignLink {
    pub id: i64,
    pub campaign_id: i64,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub destination_url: String,
    pub video_id: String,
    pub video_title: Option<String>,
    pub video_thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignLink {
    /// The segment visitors actually use: alias wins over the generated code
    pub fn path_segment(&self) -> &str {
        self.custom_alias.as_deref().unwrap_or(&self.short_code)
    }
}

#[derive(Debug, Clone)]
pub struct NewCampaignLink {
    pub campaign_id: i64,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub destination_url: String,
    pub video_id: String,
    pub video_title: Option<String>,
    pub video_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: i64,
    pub tracking_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub link_id: i64,
    pub tracking_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

/// Closed set of creditable downstream actions
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversionKind {
    Signup,
    Purchase,
    Enrollment,
}

impl ConversionKind {
    /// Funnel step ordering: signup, enrollment, purchase
    pub fn funnel_precedence(&self) -> u8 {
        match self {
            ConversionKind::Signup => 0,
            ConversionKind::Enrollment => 1,
            ConversionKind::Purchase => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionEvent {
    pub id: i64,
    pub tracking_id: String,
    pub link_id: i64,
    pub kind: ConversionKind,
    pub revenue: Option<Decimal>,
    pub event_data: Option<serde_json::Value>,
    pub converted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewConversionEvent {
    pub tracking_id: String,
    pub link_id: i64,
    pub kind: ConversionKind,
    pub revenue: Option<Decimal>,
    pub event_data: Option<serde_json::Value>,
    pub converted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoStat {
    pub video_id: String,
    pub view_count: i64,
    pub refreshed_at: DateTime<Utc>,
}

// ============ Currency conversion ============

/// Normalize to 2 decimal places (round-half-up on the cent boundary) and
/// convert to integer cents for storage.
pub fn decimal_to_cents(amount: Decimal) -> Result<i64> {
    let normalized = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    (normalized * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .ok_or_else(|| {
            LinktrailError::validation(format!("Revenue amount out of range: {}", amount))
        })
}

pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// ============ Entity converters ============

pub(crate) fn model_to_link(model: campaign_link::Model) -> CampaignLink {
    CampaignLink {
        id: model.id,
        campaign_id: model.campaign_id,
        short_code: model.short_code,
        custom_alias: model.custom_alias,
        destination_url: model.destination_url,
        video_id: model.video_id,
        video_title: model.video_title,
        video_thumbnail: model.video_thumbnail,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn model_to_click(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        link_id: model.link_id,
        tracking_id: model.tracking_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        referrer: model.referrer,
        clicked_at: model.clicked_at,
    }
}

pub(crate) fn model_to_conversion(model: conversion_event::Model) -> Result<ConversionEvent> {
    let kind: ConversionKind = model.kind.parse().map_err(|_| {
        LinktrailError::database_operation(format!(
            "Unknown conversion kind '{}' in row {}",
            model.kind, model.id
        ))
    })?;

    Ok(ConversionEvent {
        id: model.id,
        tracking_id: model.tracking_id,
        link_id: model.link_id,
        kind,
        revenue: model.revenue_cents.map(cents_to_decimal),
        event_data: model.event_data,
        converted_at: model.converted_at,
    })
}

pub(crate) fn model_to_video_stat(model: video_stat::Model) -> VideoStat {
    VideoStat {
        video_id: model.video_id,
        view_count: model.view_count,
        refreshed_at: model.refreshed_at,
    }
}
