//! Conversion recording endpoint

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, Responder, Result as ActixResult};
use serde::Serialize;

use crate::api::error_code::ErrorCode;
use crate::api::helpers::{created_response, error_from_linktrail, error_response};
use crate::api::types::RecordConversionRequest;
use crate::services::{
    AttributionService, AttributionSnapshot, ConversionService, NewConversion,
};
use crate::storage::{ConversionEvent, ConversionKind};

#[derive(Debug, Serialize)]
pub struct RecordConversionResponse {
    pub conversion: ConversionEvent,
    pub attribution: AttributionSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 201 with the stored event plus the current attribution snapshot;
/// 400/404 with a stable error code on any validation failure.
pub async fn record_conversion(
    payload: web::Json<RecordConversionRequest>,
    conversions: web::Data<Arc<ConversionService>>,
    attribution: web::Data<Arc<AttributionService>>,
) -> ActixResult<impl Responder> {
    let request = payload.into_inner();

    let kind: ConversionKind = match request.kind.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::ConversionInvalid,
                &format!(
                    "Unknown conversion kind '{}'. Valid: signup, purchase, enrollment",
                    request.kind
                ),
            ));
        }
    };

    let outcome = conversions
        .record(NewConversion {
            tracking_id: request.tracking_id.clone(),
            link_id: request.link_id,
            kind,
            revenue: request.revenue,
            event_data: request.event_data,
        })
        .await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    let snapshot = match attribution.resolve(&request.tracking_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    Ok(created_response(RecordConversionResponse {
        conversion: outcome.conversion,
        attribution: snapshot,
        warning: outcome.warning,
    }))
}
