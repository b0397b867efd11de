//! Batch click recording (load scenarios)

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};

use crate::api::helpers::success_response;
use crate::api::types::{
    BatchClickFailedItem, BatchClickRequest, BatchClickResponse, BatchClickSuccessItem,
};
use crate::services::{BatchClickItem, ClickService, ClientContext};

/// Fan the items out with bounded parallelism; the response carries one
/// entry per item, success or failure, never a batch-level error.
pub async fn batch_record_clicks(
    payload: web::Json<BatchClickRequest>,
    clicks: web::Data<Arc<ClickService>>,
) -> ActixResult<impl Responder> {
    let items: Vec<BatchClickItem> = payload
        .into_inner()
        .items
        .into_iter()
        .map(|item| BatchClickItem {
            path_segment: item.path_segment,
            context: ClientContext {
                ip_address: item.ip_address,
                user_agent: item.user_agent,
                referrer: item.referrer,
            },
        })
        .collect();

    let result = clicks.record_batch(items).await;

    let response = BatchClickResponse {
        success: result
            .success
            .into_iter()
            .map(|s| BatchClickSuccessItem::from_target(s.path_segment, s.target))
            .collect(),
        failed: result
            .failed
            .into_iter()
            .map(|f| BatchClickFailedItem {
                path_segment: f.path_segment,
                reason: f.reason,
            })
            .collect(),
    };

    Ok(success_response(response))
}
