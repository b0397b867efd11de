//! API integration tests
//!
//! Full-app tests over the /api scope: shorten, conversions, attribution
//! lookup, analytics reads and the cleanup trigger.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use chrono::{Duration, Utc};
use tempfile::TempDir;

use linktrail::api::routes::{api_routes, health_routes};
use linktrail::services::{
    AnalyticsService, AttributionService, ClickService, ConversionService, RetentionService,
    ShortCodeGenerator,
};
use linktrail::storage::{NewCampaignLink, NewClickEvent, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

async fn create_test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("api_test.db");
    let url = format!("sqlite://{}?mode=rwc", p.display());
    let storage = SeaOrmStorage::connect(&url).await.unwrap();
    (Arc::new(storage), td)
}

macro_rules! test_app {
    ($storage:expr) => {{
        let storage = $storage.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(Arc::new(ShortCodeGenerator::new(
                    storage.clone(),
                ))))
                .app_data(web::Data::new(Arc::new(ClickService::new(storage.clone()))))
                .app_data(web::Data::new(Arc::new(ConversionService::new(
                    storage.clone(),
                ))))
                .app_data(web::Data::new(Arc::new(AttributionService::new(
                    storage.clone(),
                ))))
                .app_data(web::Data::new(Arc::new(AnalyticsService::new(
                    storage.clone(),
                ))))
                .app_data(web::Data::new(Arc::new(RetentionService::new(
                    storage.clone(),
                ))))
                .service(api_routes())
                .service(health_routes()),
        )
        .await
    }};
}

async fn seed_link(storage: &SeaOrmStorage, code: &str) -> i64 {
    storage
        .insert_link(NewCampaignLink {
            campaign_id: 1,
            short_code: code.to_string(),
            custom_alias: None,
            destination_url: "https://example.com/landing".to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            video_title: None,
            video_thumbnail: None,
        })
        .await
        .unwrap()
        .id
}

async fn seed_click(storage: &SeaOrmStorage, link_id: i64, tracking_id: &str, days_ago: i64) {
    storage
        .insert_click(NewClickEvent {
            link_id,
            tracking_id: tracking_id.to_string(),
            ip_address: None,
            user_agent: None,
            referrer: None,
            clicked_at: Utc::now() - Duration::days(days_ago),
        })
        .await
        .unwrap();
}

// =============================================================================
// Shorten
// =============================================================================

#[actix_rt::test]
async fn test_shorten_returns_code_and_short_url() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/links")
            .set_json(serde_json::json!({
                "campaign_id": 1,
                "destination_url": "https://example.com/landing",
                "video_id": "dQw4w9WgXcQ",
                "custom_alias": "promo-2026"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["short_code"].as_str().unwrap().len(), 8);
    assert!(body["data"]["short_url"]
        .as_str()
        .unwrap()
        .ends_with("/promo-2026"));
    assert!(body["data"]["campaign_link_id"].as_i64().unwrap() > 0);
}

#[actix_rt::test]
async fn test_shorten_alias_conflict_is_409() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let request = serde_json::json!({
        "campaign_id": 1,
        "destination_url": "https://example.com/landing",
        "video_id": "dQw4w9WgXcQ",
        "custom_alias": "only-once"
    });

    let first = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/links")
            .set_json(request.clone())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/links")
            .set_json(request)
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(second).await;
    assert_eq!(body["code"], 3001);
}

#[actix_rt::test]
async fn test_shorten_rejects_non_http_destination() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/links")
            .set_json(serde_json::json!({
                "campaign_id": 1,
                "destination_url": "ftp://example.com/file",
                "video_id": "dQw4w9WgXcQ"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3002);
}

#[actix_rt::test]
async fn test_shorten_rejects_malformed_video_id() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/links")
            .set_json(serde_json::json!({
                "campaign_id": 1,
                "destination_url": "https://example.com/landing",
                "video_id": "nope"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3004);
}

// =============================================================================
// Conversions
// =============================================================================

#[actix_rt::test]
async fn test_record_conversion_returns_event_and_snapshot() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiConv01").await;
    seed_click(&storage, link_id, "t-api-1", 2).await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/conversions")
            .set_json(serde_json::json!({
                "tracking_id": "t-api-1",
                "link_id": link_id,
                "kind": "purchase",
                "revenue": 49.99
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["conversion"]["kind"], "purchase");
    assert_eq!(body["data"]["attribution"]["total_revenue"], "49.99");
    assert_eq!(body["data"]["attribution"]["is_within_window"], true);
}

#[actix_rt::test]
async fn test_record_conversion_window_expired_is_400() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiConv02").await;
    seed_click(&storage, link_id, "t-api-2", 35).await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/conversions")
            .set_json(serde_json::json!({
                "tracking_id": "t-api-2",
                "link_id": link_id,
                "kind": "signup"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4002);
}

#[actix_rt::test]
async fn test_record_conversion_unknown_kind_is_400() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiConv03").await;
    seed_click(&storage, link_id, "t-api-3", 1).await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/conversions")
            .set_json(serde_json::json!({
                "tracking_id": "t-api-3",
                "link_id": link_id,
                "kind": "refund"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4000);
}

// =============================================================================
// Attribution lookup
// =============================================================================

#[actix_rt::test]
async fn test_attribution_lookup() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiAttr01").await;
    seed_click(&storage, link_id, "t-api-4", 1).await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/attribution/t-api-4")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["link_id"].as_i64().unwrap(), link_id);

    let miss = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/attribution/nobody")
            .to_request(),
    )
    .await;
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Analytics reads
// =============================================================================

#[actix_rt::test]
async fn test_link_analytics_endpoint_with_date_filter() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiAna01").await;
    seed_click(&storage, link_id, "t-api-5", 0).await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/api/links/{}/analytics", link_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_clicks"], 1);

    // Half-open ranges are rejected, not silently defaulted
    let bad = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!(
                "/api/links/{}/analytics?start_date=2026-01-01",
                link_id
            ))
            .to_request(),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_top_links_endpoint_rejects_unknown_metric() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/analytics/top-links?metric=bounce")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cleanup and health
// =============================================================================

#[actix_rt::test]
async fn test_cleanup_endpoint_reports_counts() {
    let (storage, _td) = create_test_storage().await;
    let link_id = seed_link(&storage, "ApiClean1").await;
    seed_click(&storage, link_id, "t-api-6", 45).await;
    storage
        .insert_conversion(linktrail::storage::NewConversionEvent {
            tracking_id: "t-api-6".to_string(),
            link_id,
            kind: linktrail::storage::ConversionKind::Signup,
            revenue: None,
            event_data: None,
            converted_at: Utc::now(),
        })
        .await
        .unwrap();
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/cleanup")
            .set_json(serde_json::json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["conversions_deleted"], 1);
    assert_eq!(body["data"]["clicks_deleted"], 0);

    // Click history untouched without an explicit cutoff
    assert_eq!(storage.count_clicks_for_link(link_id).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_video_stat_refresh_and_health() {
    let (storage, _td) = create_test_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        TestRequest::put()
            .uri("/api/videos/dQw4w9WgXcQ/stats")
            .set_json(serde_json::json!({"view_count": 12345}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        storage.video_view_count("dQw4w9WgXcQ").await.unwrap(),
        Some(12345)
    );

    let health = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(health.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(health).await;
    assert_eq!(body["data"]["status"], "healthy");
}
