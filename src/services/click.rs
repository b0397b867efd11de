//! Click recording and tracking-id propagation
//!
//! Every visit mints a fresh tracking id and appends one ClickEvent; the
//! destination URL is returned with attribution tags for downstream tag
//! managers.

use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};
use url::Url;

use crate::config::get_config;
use crate::errors::{LinktrailError, Result};
use crate::storage::{NewClickEvent, SeaOrmStorage};
use crate::utils::generate_tracking_id;

/// Query parameters the recorder owns on tagged URLs. Existing values for
/// these keys are overwritten, everything else is preserved.
const TAGGED_PARAMS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "campaign_link_id",
    "tracking_id",
    "click_id",
];

/// Optional client context, stored verbatim (no validation, no scrubbing —
/// that is the caller's responsibility).
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RedirectTarget {
    pub url: String,
    pub tracking_id: String,
    pub link_id: i64,
}

#[derive(Debug, Clone)]
pub struct BatchClickItem {
    pub path_segment: String,
    pub context: ClientContext,
}

#[derive(Debug, Clone)]
pub struct BatchClickSuccess {
    pub path_segment: String,
    pub target: RedirectTarget,
}

#[derive(Debug, Clone)]
pub struct BatchClickFailure {
    pub path_segment: String,
    pub reason: String,
}

/// Per-item outcome of a batch recording; partial failure is the expected
/// shape, never a batch-level error.
#[derive(Debug, Clone, Default)]
pub struct BatchClickResult {
    pub success: Vec<BatchClickSuccess>,
    pub failed: Vec<BatchClickFailure>,
}

pub struct ClickService {
    storage: Arc<SeaOrmStorage>,
    utm_source: String,
    utm_medium: String,
}

impl ClickService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let config = get_config();
        Self {
            storage,
            utm_source: config.tracking.utm_source.clone(),
            utm_medium: config.tracking.utm_medium.clone(),
        }
    }

    /// Record a visit: resolve the path segment, mint a tracking id,
    /// persist the click, and return the tagged destination.
    pub async fn record(&self, path_segment: &str, context: ClientContext) -> Result<RedirectTarget> {
        let link = self
            .storage
            .find_link_by_path_segment(path_segment)
            .await?
            .ok_or_else(|| {
                LinktrailError::not_found(format!("No link for path '{}'", path_segment))
            })?;

        // Fresh id per visit: each click is its own attribution opportunity
        let tracking_id = generate_tracking_id();

        self.storage
            .insert_click(NewClickEvent {
                link_id: link.id,
                tracking_id: tracking_id.clone(),
                ip_address: context.ip_address,
                user_agent: context.user_agent,
                referrer: context.referrer,
                clicked_at: Utc::now(),
            })
            .await?;

        let url = self.build_tagged_url(&link.destination_url, link.id, &tracking_id)?;

        info!(
            "ClickService: recorded click on '{}' (link {}, tracking {})",
            path_segment, link.id, tracking_id
        );

        Ok(RedirectTarget {
            url,
            tracking_id,
            link_id: link.id,
        })
    }

    /// Record many visits concurrently with bounded parallelism. One
    /// failing item never aborts the rest.
    pub async fn record_batch(&self, items: Vec<BatchClickItem>) -> BatchClickResult {
        let parallelism = num_cpus::get().clamp(2, 16);
        let total = items.len();

        let outcomes: Vec<(String, Result<RedirectTarget>)> = stream::iter(items)
            .map(|item| async move {
                let outcome = self.record(&item.path_segment, item.context).await;
                (item.path_segment, outcome)
            })
            .buffer_unordered(parallelism)
            .collect()
            .await;

        let mut result = BatchClickResult::default();
        for (path_segment, outcome) in outcomes {
            match outcome {
                Ok(target) => result.success.push(BatchClickSuccess {
                    path_segment,
                    target,
                }),
                Err(e) => result.failed.push(BatchClickFailure {
                    path_segment,
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            "ClickService: batch recorded {}/{} clicks ({} failed)",
            result.success.len(),
            total,
            result.failed.len()
        );

        result
    }

    /// Append/overwrite the five attribution parameters on the destination.
    /// The tracking id rides under two keys (`tracking_id` and `click_id`)
    /// for compatibility with differing tag managers.
    fn build_tagged_url(&self, destination: &str, link_id: i64, tracking_id: &str) -> Result<String> {
        let mut url = Url::parse(destination)?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !TAGGED_PARAMS.contains(&key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("utm_source", &self.utm_source);
            pairs.append_pair("utm_medium", &self.utm_medium);
            pairs.append_pair("campaign_link_id", &link_id.to_string());
            pairs.append_pair("tracking_id", tracking_id);
            pairs.append_pair("click_id", tracking_id);
        }

        debug!("ClickService: tagged destination for link {}", link_id);

        Ok(url.into())
    }
}
