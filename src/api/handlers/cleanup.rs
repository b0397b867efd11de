//! Administrative retention trigger

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};

use crate::api::helpers::{error_from_linktrail, success_response};
use crate::api::types::CleanupRequest;
use crate::services::{RetentionReport, RetentionService};

/// Purge expired conversions; optionally also purge click history when a
/// cutoff is supplied. Click purging never happens implicitly.
pub async fn run_cleanup(
    payload: Option<web::Json<CleanupRequest>>,
    retention: web::Data<Arc<RetentionService>>,
) -> ActixResult<impl Responder> {
    let request = payload.map(|p| p.into_inner()).unwrap_or_default();

    let conversions_deleted = match retention.purge_expired_conversions().await {
        Ok(deleted) => deleted,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    let clicks_deleted = match request.clicks_older_than_days {
        Some(days) => match retention.purge_old_clicks(days).await {
            Ok(deleted) => deleted,
            Err(e) => return Ok(error_from_linktrail(&e)),
        },
        None => 0,
    };

    Ok(success_response(RetentionReport {
        conversions_deleted,
        clicks_deleted,
    }))
}
