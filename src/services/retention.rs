//! Retention cleanup
//!
//! Conversions are pruned once their attribution anchor has aged out of
//! the window; click history is retained independently under its own age
//! cutoff so attribution audits stay possible after conversions are gone.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tracing::{error, info};

use super::attribution::ATTRIBUTION_WINDOW_DAYS;
use crate::errors::Result;
use crate::storage::SeaOrmStorage;

/// 清理报告
#[derive(Debug, Default, serde::Serialize)]
pub struct RetentionReport {
    pub conversions_deleted: u64,
    pub clicks_deleted: u64,
}

pub struct RetentionService {
    storage: Arc<SeaOrmStorage>,
}

impl RetentionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Delete conversions whose tracking id has no click inside the
    /// attribution window anymore. Anchored on the click's age, never the
    /// conversion's own age; clicks themselves are untouched.
    pub async fn purge_expired_conversions(&self) -> Result<u64> {
        // A click is still a valid anchor while days_since <= window, i.e.
        // strictly younger than window+1 days.
        let cutoff = Utc::now() - Duration::days(ATTRIBUTION_WINDOW_DAYS + 1);

        let deleted = self
            .storage
            .purge_conversions_without_recent_click(cutoff)
            .await?;

        info!(
            "RetentionService: purged {} conversions outside the {}-day window",
            deleted, ATTRIBUTION_WINDOW_DAYS
        );

        Ok(deleted)
    }

    /// Purge click history older than the given cutoff. Independent of the
    /// attribution window; defaults to 90 days at the call sites.
    pub async fn purge_old_clicks(&self, days_to_keep: u64) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(days_to_keep as i64);

        let deleted = self.storage.purge_clicks_older_than(cutoff).await?;

        info!(
            "RetentionService: purged {} clicks older than {} days",
            deleted, days_to_keep
        );

        Ok(deleted)
    }

    /// 运行完整的清理流程
    pub async fn run_cleanup(&self, click_retention_days: u64) -> anyhow::Result<RetentionReport> {
        let mut report = RetentionReport::default();

        match self.purge_expired_conversions().await {
            Ok(deleted) => report.conversions_deleted = deleted,
            Err(e) => error!("Failed to purge expired conversions: {}", e),
        }

        match self.purge_old_clicks(click_retention_days).await {
            Ok(deleted) => report.clicks_deleted = deleted,
            Err(e) => error!("Failed to purge old clicks: {}", e),
        }

        info!(
            "Retention cleanup completed: conversions {}, clicks {}",
            report.conversions_deleted, report.clicks_deleted
        );

        Ok(report)
    }

    /// 启动后台清理任务
    pub fn spawn_background_task(
        self: Arc<Self>,
        interval_hours: u64,
        click_retention_days: u64,
    ) {
        tokio::spawn(async move {
            let interval = StdDuration::from_secs(interval_hours * 60 * 60);

            // 首次运行延迟 5 分钟
            tokio::time::sleep(StdDuration::from_secs(300)).await;

            loop {
                if let Err(e) = self.run_cleanup(click_retention_days).await {
                    error!("Retention cleanup task failed: {}", e);
                }

                tokio::time::sleep(interval).await;
            }
        });

        info!(
            "Retention cleanup background task started (interval: {} hours)",
            interval_hours
        );
    }
}
