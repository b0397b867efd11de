//! Redirect endpoint: the hot path
//!
//! `GET /{segment}` records a click and answers 302 with the tagged
//! destination. Misses render a friendly fallback page, never a raw error.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::debug;

use crate::api::helpers::error_from_linktrail;
use crate::errors::LinktrailError;
use crate::services::{ClickService, ClientContext};

const FALLBACK_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Link not found</title></head>\n<body>\n<h1>This link doesn't exist</h1>\n<p>The short link you followed is unknown or has been removed.</p>\n</body>\n</html>\n";

pub async fn handle_redirect(
    path: web::Path<String>,
    req: HttpRequest,
    clicks: web::Data<Arc<ClickService>>,
) -> impl Responder {
    let segment = path.into_inner();

    let context = client_context(&req);

    match clicks.record(&segment, context).await {
        Ok(target) => HttpResponse::Found()
            .insert_header(("Location", target.url))
            .finish(),
        Err(LinktrailError::NotFound(_)) => {
            debug!("Redirect miss for path: {}", segment);
            HttpResponse::build(StatusCode::NOT_FOUND)
                .insert_header(("Content-Type", "text/html; charset=utf-8"))
                .insert_header(("Cache-Control", "public, max-age=60")) // 缓存404
                .body(FALLBACK_PAGE)
        }
        Err(e) => error_from_linktrail(&e),
    }
}

/// Client context is captured verbatim; nothing here is validated or
/// scrubbed — that is the caller's concern.
fn client_context(req: &HttpRequest) -> ClientContext {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    ClientContext {
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string()),
        user_agent: header("User-Agent"),
        referrer: header("Referer"),
    }
}
