//! Attribution lookup endpoint

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};

use crate::api::helpers::api_result;
use crate::services::AttributionService;

pub async fn get_attribution(
    path: web::Path<String>,
    attribution: web::Data<Arc<AttributionService>>,
) -> ActixResult<impl Responder> {
    let tracking_id = path.into_inner();
    Ok(api_result(attribution.resolve(&tracking_id).await))
}
