//! Conversion recording with attribution-window validation
//!
//! Validation is fail-fast and ordered: structure, then the per-kind
//! revenue rule, then "does this visitor exist at all", then the window,
//! then the link reference. Only after all five gates pass is the event
//! persisted.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::attribution::{days_since, is_within_window, ATTRIBUTION_WINDOW_DAYS};
use crate::errors::{LinktrailError, Result};
use crate::storage::{
    ConversionEvent, ConversionKind, NewConversionEvent, SeaOrmStorage,
};

#[derive(Debug, Clone)]
pub struct NewConversion {
    pub tracking_id: String,
    pub link_id: i64,
    pub kind: ConversionKind,
    pub revenue: Option<Decimal>,
    pub event_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub conversion: ConversionEvent,
    /// Non-fatal advisory (e.g. revenue supplied on a signup)
    pub warning: Option<String>,
}

pub struct ConversionService {
    storage: Arc<SeaOrmStorage>,
}

impl ConversionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn record(&self, request: NewConversion) -> Result<ConversionOutcome> {
        // 1. Structural
        if request.tracking_id.trim().is_empty() {
            return Err(LinktrailError::validation("tracking_id is required"));
        }
        if request.link_id <= 0 {
            return Err(LinktrailError::validation("link_id is required"));
        }

        // 2. Kind-specific revenue rule
        let warning = validate_revenue_for_kind(request.kind, request.revenue)?;
        if let Some(ref w) = warning {
            warn!(
                "ConversionService: {} (tracking {})",
                w, request.tracking_id
            );
        }

        // 3. Attribution existence. An unknown visitor is NOT a window
        //    failure; the two are surfaced distinctly.
        let anchor = self
            .storage
            .latest_click_for_tracking(&request.tracking_id)
            .await?
            .ok_or_else(|| {
                LinktrailError::not_found(format!(
                    "No click recorded for tracking id '{}'",
                    request.tracking_id
                ))
            })?;

        // 4. Window, anchored on the most recent click
        let now = Utc::now();
        if !is_within_window(anchor.clicked_at, now) {
            return Err(LinktrailError::window_expired(format!(
                "Most recent click is {} days old; the attribution window is {} days",
                days_since(anchor.clicked_at, now),
                ATTRIBUTION_WINDOW_DAYS
            )));
        }

        // 5. Referential
        let link = self
            .storage
            .find_link_by_id(request.link_id)
            .await?
            .ok_or_else(|| {
                LinktrailError::not_found(format!("Link {} not found", request.link_id))
            })?;

        let stored = self
            .storage
            .insert_conversion(NewConversionEvent {
                tracking_id: request.tracking_id,
                link_id: link.id,
                kind: request.kind,
                revenue: request.revenue,
                event_data: request.event_data,
                converted_at: now,
            })
            .await?;

        info!(
            "ConversionService: recorded {} conversion {} for link {} (tracking {})",
            stored.kind, stored.id, stored.link_id, stored.tracking_id
        );

        Ok(ConversionOutcome {
            conversion: stored,
            warning,
        })
    }
}

// ============ Per-kind revenue rules ============

/// Tagged dispatch: one rule per enum case, no string matching.
fn validate_revenue_for_kind(
    kind: ConversionKind,
    revenue: Option<Decimal>,
) -> Result<Option<String>> {
    match kind {
        ConversionKind::Purchase => validate_purchase_revenue(revenue),
        ConversionKind::Enrollment => validate_enrollment_revenue(revenue),
        ConversionKind::Signup => validate_signup_revenue(revenue),
    }
}

fn validate_purchase_revenue(revenue: Option<Decimal>) -> Result<Option<String>> {
    match revenue {
        Some(amount) if amount > Decimal::ZERO => Ok(None),
        Some(amount) => Err(LinktrailError::validation(format!(
            "Purchase revenue must be greater than zero, got {}",
            amount
        ))),
        None => Err(LinktrailError::validation(
            "Purchase conversions require a revenue amount",
        )),
    }
}

fn validate_enrollment_revenue(revenue: Option<Decimal>) -> Result<Option<String>> {
    match revenue {
        None => Ok(None),
        Some(amount) if amount > Decimal::ZERO => Ok(None),
        Some(amount) => Err(LinktrailError::validation(format!(
            "Enrollment revenue must be positive when present, got {}",
            amount
        ))),
    }
}

fn validate_signup_revenue(revenue: Option<Decimal>) -> Result<Option<String>> {
    match revenue {
        None => Ok(None),
        Some(amount) if amount > Decimal::ZERO => Ok(Some(
            "Revenue on a signup conversion is unusual; stored anyway".to_string(),
        )),
        Some(amount) => Err(LinktrailError::validation(format!(
            "Signup revenue must be positive when present, got {}",
            amount
        ))),
    }
}
