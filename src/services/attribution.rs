//! Attribution chain reconstruction and the shared window predicate
//!
//! The window arithmetic lives here and ONLY here: the conversion recorder
//! and the resolver both call it, so the two can never disagree about
//! whether a click is still creditable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{LinktrailError, Result};
use crate::storage::{ConversionEvent, SeaOrmStorage};

/// Conversions are credited to a click for this many days, inclusive.
pub const ATTRIBUTION_WINDOW_DAYS: i64 = 30;

/// Whole days elapsed since the anchor click (floor)
pub fn days_since(anchor: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - anchor).num_days()
}

/// A conversion exactly `ATTRIBUTION_WINDOW_DAYS` days after the click is
/// still valid; one day later is not.
pub fn is_within_window(anchor: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    days_since(anchor, now) <= ATTRIBUTION_WINDOW_DAYS
}

/// Full attribution chain for one tracking id
#[derive(Debug, Clone, Serialize)]
pub struct AttributionSnapshot {
    pub tracking_id: String,
    /// Link of the most recent click (the anchor)
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub days_since_click: i64,
    pub is_within_window: bool,
    pub click_count: u64,
    pub conversions: Vec<ConversionEvent>,
    /// Exact to the cent; conversions without revenue count as zero
    pub total_revenue: Decimal,
}

pub struct AttributionService {
    storage: Arc<SeaOrmStorage>,
}

impl AttributionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Reconstruct the attribution chain for a tracking id
    pub async fn resolve(&self, tracking_id: &str) -> Result<AttributionSnapshot> {
        let clicks = self.storage.clicks_for_tracking(tracking_id).await?;

        let anchor = clicks.first().ok_or_else(|| {
            LinktrailError::not_found(format!(
                "No click found for tracking id '{}'",
                tracking_id
            ))
        })?;

        let conversions = self.storage.conversions_for_tracking(tracking_id).await?;

        let total_revenue: Decimal = conversions.iter().filter_map(|c| c.revenue).sum();

        let now = Utc::now();
        let snapshot = AttributionSnapshot {
            tracking_id: tracking_id.to_string(),
            link_id: anchor.link_id,
            clicked_at: anchor.clicked_at,
            days_since_click: days_since(anchor.clicked_at, now),
            is_within_window: is_within_window(anchor.clicked_at, now),
            click_count: clicks.len() as u64,
            conversions,
            total_revenue,
        };

        debug!(
            "Attribution: '{}' -> link {}, {} clicks, {} conversions, revenue {}",
            tracking_id,
            snapshot.link_id,
            snapshot.click_count,
            snapshot.conversions.len(),
            snapshot.total_revenue
        );

        Ok(snapshot)
    }
}
