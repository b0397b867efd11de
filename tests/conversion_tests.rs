//! Conversion attribution tests
//!
//! Window boundary arithmetic (29/30/31 days), validation ordering, and
//! the per-kind revenue rules as enforced end to end by the service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;

use linktrail::errors::LinktrailError;
use linktrail::services::{ConversionService, NewConversion};
use linktrail::storage::{
    ConversionKind, NewCampaignLink, NewClickEvent, SeaOrmStorage,
};

// =============================================================================
// Test Setup
// =============================================================================

async fn create_test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("conversion_test.db");
    let url = format!("sqlite://{}?mode=rwc", p.display());
    let storage = SeaOrmStorage::connect(&url).await.unwrap();
    (Arc::new(storage), td)
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

fn conversion(tracking_id: &str, link_id: i64, kind: ConversionKind) -> NewConversion {
    NewConversion {
        tracking_id: tracking_id.to_string(),
        link_id,
        kind,
        revenue: None,
        event_data: None,
    }
}

fn with_revenue(mut req: NewConversion, amount: &str) -> NewConversion {
    req.revenue = Some(amount.parse().unwrap());
    req
}

// =============================================================================
// Window boundaries
// =============================================================================

#[tokio::test]
async fn test_conversion_accepted_at_29_days() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code2901").await;
    seed_click(&storage, link_id, "t-29", 29).await;

    let outcome = service
        .record(conversion("t-29", link_id, ConversionKind::Signup))
        .await
        .unwrap();
    assert_eq!(outcome.conversion.kind, ConversionKind::Signup);
}

#[tokio::test]
async fn test_conversion_accepted_at_exactly_30_days() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code3001").await;
    seed_click(&storage, link_id, "t-30", 30).await;

    assert!(service
        .record(conversion("t-30", link_id, ConversionKind::Signup))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_conversion_rejected_at_31_days() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code3101").await;
    seed_click(&storage, link_id, "t-31", 31).await;

    let err = service
        .record(conversion("t-31", link_id, ConversionKind::Signup))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::WindowExpired(_)));
}

#[tokio::test]
async fn test_window_anchors_on_most_recent_click() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code3501").await;

    // Old click alone would be expired, but a fresh one re-opens the window
    seed_click(&storage, link_id, "t-mix", 35).await;
    seed_click(&storage, link_id, "t-mix", 2).await;

    assert!(service
        .record(conversion("t-mix", link_id, ConversionKind::Signup))
        .await
        .is_ok());
}

// =============================================================================
// Validation ordering
// =============================================================================

#[tokio::test]
async fn test_unknown_visitor_is_not_window_expired() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0001").await;

    let err = service
        .record(conversion("never-clicked", link_id, ConversionKind::Signup))
        .await
        .unwrap_err();
    // "No click" is unknown-visitor, distinctly NOT window expiry
    assert!(matches!(err, LinktrailError::NotFound(_)));
}

#[tokio::test]
async fn test_window_check_runs_before_link_referential_check() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0002").await;
    seed_click(&storage, link_id, "t-old", 40).await;

    // Both the window and the link reference are wrong; the window wins
    let err = service
        .record(conversion("t-old", 999_999, ConversionKind::Signup))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::WindowExpired(_)));
}

#[tokio::test]
async fn test_missing_link_after_valid_window() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0003").await;
    seed_click(&storage, link_id, "t-ok", 1).await;

    let err = service
        .record(conversion("t-ok", 999_999, ConversionKind::Signup))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::NotFound(_)));
}

#[tokio::test]
async fn test_blank_tracking_id_fails_structurally() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0004").await;

    let err = service
        .record(conversion("  ", link_id, ConversionKind::Signup))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::Validation(_)));
}

// =============================================================================
// Kind-specific revenue rules
// =============================================================================

#[tokio::test]
async fn test_purchase_without_revenue_is_rejected() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0005").await;
    seed_click(&storage, link_id, "t-p", 1).await;

    let err = service
        .record(conversion("t-p", link_id, ConversionKind::Purchase))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::Validation(_)));

    let err = service
        .record(with_revenue(
            conversion("t-p", link_id, ConversionKind::Purchase),
            "0",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::Validation(_)));
}

#[tokio::test]
async fn test_purchase_with_revenue_is_stored_exactly() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0006").await;
    seed_click(&storage, link_id, "t-p2", 1).await;

    let outcome = service
        .record(with_revenue(
            conversion("t-p2", link_id, ConversionKind::Purchase),
            "49.99",
        ))
        .await
        .unwrap();
    assert_eq!(outcome.conversion.revenue, Some(Decimal::new(4999, 2)));
    assert!(outcome.warning.is_none());
}

#[tokio::test]
async fn test_revenue_is_normalized_to_cents_half_up() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0007").await;
    seed_click(&storage, link_id, "t-p3", 1).await;

    let outcome = service
        .record(with_revenue(
            conversion("t-p3", link_id, ConversionKind::Purchase),
            "10.005",
        ))
        .await
        .unwrap();
    assert_eq!(outcome.conversion.revenue, Some(Decimal::new(1001, 2)));
}

#[tokio::test]
async fn test_enrollment_revenue_optional() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0008").await;
    seed_click(&storage, link_id, "t-e", 1).await;

    assert!(service
        .record(conversion("t-e", link_id, ConversionKind::Enrollment))
        .await
        .is_ok());

    let err = service
        .record(with_revenue(
            conversion("t-e", link_id, ConversionKind::Enrollment),
            "-5",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LinktrailError::Validation(_)));
}

#[tokio::test]
async fn test_signup_with_revenue_warns_but_stores() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0009").await;
    seed_click(&storage, link_id, "t-s", 1).await;

    let outcome = service
        .record(with_revenue(
            conversion("t-s", link_id, ConversionKind::Signup),
            "5.00",
        ))
        .await
        .unwrap();
    assert!(outcome.warning.is_some());
    assert_eq!(outcome.conversion.revenue, Some(Decimal::new(500, 2)));

    // And the row actually landed
    let stored = storage.conversions_for_tracking("t-s").await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_event_data_is_stored_verbatim() {
    let (storage, _td) = create_test_storage().await;
    let service = ConversionService::new(storage.clone());
    let link_id = seed_link(&storage, "Code0010").await;
    seed_click(&storage, link_id, "t-d", 1).await;

    let mut req = conversion("t-d", link_id, ConversionKind::Signup);
    req.event_data = Some(serde_json::json!({"plan": "pro", "seats": 3}));

    let outcome = service.record(req).await.unwrap();
    assert_eq!(
        outcome.conversion.event_data,
        Some(serde_json::json!({"plan": "pro", "seats": 3}))
    );
}
