//! API request/response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::services::RedirectTarget;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

// ============ Links ============

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateLinkRequest {
    pub campaign_id: i64,
    pub destination_url: String,
    pub video_id: String,
    pub custom_alias: Option<String>,
    pub video_title: Option<String>,
    pub video_thumbnail: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateLinkResponse {
    pub campaign_link_id: i64,
    pub short_code: String,
    pub short_url: String,
}

// ============ Batch clicks ============

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BatchClickRequest {
    pub items: Vec<BatchClickRequestItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BatchClickRequestItem {
    pub path_segment: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct BatchClickResponse {
    pub success: Vec<BatchClickSuccessItem>,
    pub failed: Vec<BatchClickFailedItem>,
}

#[derive(Serialize, Clone, Debug)]
pub struct BatchClickSuccessItem {
    pub path_segment: String,
    pub tracking_id: String,
    pub link_id: i64,
    pub url: String,
}

impl BatchClickSuccessItem {
    pub fn from_target(path_segment: String, target: RedirectTarget) -> Self {
        Self {
            path_segment,
            tracking_id: target.tracking_id,
            link_id: target.link_id,
            url: target.url,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct BatchClickFailedItem {
    pub path_segment: String,
    pub reason: String,
}

// ============ Conversions ============

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecordConversionRequest {
    pub tracking_id: String,
    pub link_id: i64,
    /// Parsed against the closed kind enum in the handler so malformed
    /// values get a stable error code instead of a framework 400
    pub kind: String,
    pub revenue: Option<Decimal>,
    pub event_data: Option<serde_json::Value>,
}

// ============ Analytics ============

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AnalyticsQueryParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TopLinksQueryParams {
    pub metric: Option<String>,
    pub limit: Option<usize>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CompareQueryParams {
    /// Comma-separated campaign ids
    pub ids: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub kind: Option<String>,
}

// ============ Cleanup / video stats ============

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CleanupRequest {
    /// When present, also purge click history older than this many days
    pub clicks_older_than_days: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RefreshVideoStatRequest {
    pub view_count: i64,
}
