//! Link shortening

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, Result as ActixResult};
use tracing::{error, info};
use url::Url;

use crate::api::error_code::ErrorCode;
use crate::api::helpers::{api_result, created_response, error_from_linktrail, error_response};
use crate::api::types::{CreateLinkRequest, CreateLinkResponse};
use crate::config::get_config;
use crate::errors::LinktrailError;
use crate::services::ShortCodeGenerator;
use crate::storage::{NewCampaignLink, SeaOrmStorage};
use crate::utils::is_valid_video_id;

/// Destinations must be plain web URLs
fn validate_destination_url(destination: &str) -> Result<(), LinktrailError> {
    let url = Url::parse(destination).map_err(|e| {
        LinktrailError::validation(format!("Invalid destination URL: {}", e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LinktrailError::validation(format!(
            "Destination URL must be http or https, got '{}'",
            other
        ))),
    }
}

pub async fn create_link(
    payload: web::Json<CreateLinkRequest>,
    generator: web::Data<Arc<ShortCodeGenerator>>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let request = payload.into_inner();

    if let Err(e) = validate_destination_url(&request.destination_url) {
        error!("Shorten API: invalid destination - {}", e.message());
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::LinkInvalidUrl,
            e.message(),
        ));
    }

    if !is_valid_video_id(&request.video_id) {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::LinkInvalidVideoId,
            &format!("Invalid video id '{}'", request.video_id),
        ));
    }

    // Alias format + availability; the generated code always exists besides it
    if let Some(ref alias) = request.custom_alias {
        if let Err(e) = generator.validate_alias(alias).await {
            let code = match e {
                LinktrailError::Conflict(_) => ErrorCode::AliasTaken,
                _ => ErrorCode::LinkInvalidAlias,
            };
            return Ok(error_response(e.http_status(), code, e.message()));
        }
    }

    let short_code = match generator.issue().await {
        Ok(code) => code,
        Err(e) => return Ok(error_from_linktrail(&e)),
    };

    let inserted = storage
        .insert_link(NewCampaignLink {
            campaign_id: request.campaign_id,
            short_code,
            custom_alias: request.custom_alias,
            destination_url: request.destination_url,
            video_id: request.video_id,
            video_title: request.video_title,
            video_thumbnail: request.video_thumbnail,
        })
        .await;

    match inserted {
        Ok(link) => {
            let public_url = get_config().server.public_url.trim_end_matches('/').to_string();
            let short_url = format!("{}/{}", public_url, link.path_segment());

            info!(
                "Shorten API: created link {} -> {}",
                link.id, link.destination_url
            );

            Ok(created_response(CreateLinkResponse {
                campaign_link_id: link.id,
                short_code: link.short_code,
                short_url,
            }))
        }
        // Insert is the authoritative uniqueness gate; a lost race shows
        // up here even after the pre-check passed.
        Err(e) => Ok(error_from_linktrail(&e)),
    }
}

pub async fn get_link(
    path: web::Path<i64>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let link_id = path.into_inner();

    let result = storage.find_link_by_id(link_id).await.and_then(|opt| {
        opt.ok_or_else(|| LinktrailError::not_found(format!("Link {} not found", link_id)))
    });

    Ok(api_result(result))
}
