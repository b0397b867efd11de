//! Collaborator-facing view-count refresh

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};
use chrono::Utc;

use crate::api::helpers::api_result;
use crate::api::types::RefreshVideoStatRequest;
use crate::errors::LinktrailError;
use crate::storage::SeaOrmStorage;

pub async fn refresh_video_stat(
    path: web::Path<String>,
    payload: web::Json<RefreshVideoStatRequest>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let video_id = path.into_inner();

    let result = storage
        .upsert_video_stat(&video_id, payload.view_count, Utc::now())
        .await;

    Ok(api_result(result.map(|_| serde_json::json!({
        "video_id": video_id,
        "view_count": payload.view_count,
    }))))
}

pub async fn get_video_stat(
    path: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let video_id = path.into_inner();

    let result = storage.get_video_stat(&video_id).await.and_then(|opt| {
        opt.ok_or_else(|| {
            LinktrailError::not_found(format!("No cached stats for video '{}'", video_id))
        })
    });

    Ok(api_result(result))
}
