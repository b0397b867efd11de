//! Health check

use std::sync::Arc;

use actix_web::{web, Responder, Result as ActixResult};
use chrono::Utc;
use serde::Serialize;

use crate::api::helpers::success_response;
use crate::storage::SeaOrmStorage;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: StorageCheck,
}

#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let storage_check = match storage.get_db().ping().await {
        Ok(()) => StorageCheck {
            status: "ok".to_string(),
            error: None,
        },
        Err(e) => StorageCheck {
            status: "unavailable".to_string(),
            error: Some(e.to_string()),
        },
    };

    let status = if storage_check.status == "ok" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(success_response(HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        storage: storage_check,
    }))
}
