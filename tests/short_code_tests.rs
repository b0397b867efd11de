//! Short code issuance tests
//!
//! Covers issue/resolve round-trips, alias validation, concurrent
//! issuance without persisted collisions, and the bounded retry ceiling.

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;

use linktrail::services::ShortCodeGenerator;
use linktrail::storage::{NewCampaignLink, SeaOrmStorage};

// =============================================================================
// Test Setup
// =============================================================================

async fn create_test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let td = TempDir::new().unwrap();
    let p = td.path().join("short_code_test.db");
    let url = format!("sqlite://{}?mode=rwc", p.display());
    let storage = SeaOrmStorage::connect(&url).await.unwrap();
    (Arc::new(storage), td)
}

fn new_link(campaign_id: i64, code: &str, alias: Option<&str>) -> NewCampaignLink {
    NewCampaignLink {
        campaign_id,
        short_code: code.to_string(),
        custom_alias: alias.map(|a| a.to_string()),
        destination_url: "https://example.com/landing".to_string(),
        video_id: "dQw4w9WgXcQ".to_string(),
        video_title: None,
        video_thumbnail: None,
    }
}

// =============================================================================
// Round trip
// =============================================================================

#[tokio::test]
async fn test_issued_code_resolves_to_same_link() {
    let (storage, _td) = create_test_storage().await;
    let generator = ShortCodeGenerator::new(storage.clone());

    let code = generator.issue().await.unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));

    let created = storage.insert_link(new_link(1, &code, None)).await.unwrap();

    let resolved = storage
        .find_link_by_path_segment(&code)
        .await
        .unwrap()
        .expect("issued code must resolve");
    assert_eq!(resolved.id, created.id);
}

#[tokio::test]
async fn test_alias_resolves_and_takes_precedence_in_short_url() {
    let (storage, _td) = create_test_storage().await;

    let created = storage
        .insert_link(new_link(1, "Xy12Ab34", Some("summer-sale")))
        .await
        .unwrap();

    let by_alias = storage
        .find_link_by_path_segment("summer-sale")
        .await
        .unwrap()
        .expect("alias must resolve");
    assert_eq!(by_alias.id, created.id);
    assert_eq!(created.path_segment(), "summer-sale");

    // The generated code keeps resolving too: one namespace, two keys
    let by_code = storage
        .find_link_by_path_segment("Xy12Ab34")
        .await
        .unwrap()
        .expect("code must resolve");
    assert_eq!(by_code.id, created.id);
}

// =============================================================================
// Uniqueness
// =============================================================================

#[tokio::test]
async fn test_duplicate_code_insert_is_a_conflict() {
    let (storage, _td) = create_test_storage().await;

    storage.insert_link(new_link(1, "AbCd1234", None)).await.unwrap();
    let err = storage
        .insert_link(new_link(2, "AbCd1234", None))
        .await
        .unwrap_err();

    assert!(matches!(err, linktrail::errors::LinktrailError::Conflict(_)));
}

#[tokio::test]
async fn test_duplicate_alias_insert_is_a_conflict() {
    let (storage, _td) = create_test_storage().await;

    storage
        .insert_link(new_link(1, "AbCd1234", Some("launch")))
        .await
        .unwrap();
    let err = storage
        .insert_link(new_link(2, "EfGh5678", Some("launch")))
        .await
        .unwrap_err();

    assert!(matches!(err, linktrail::errors::LinktrailError::Conflict(_)));
}

#[tokio::test]
async fn test_concurrent_issuance_produces_no_persisted_collisions() {
    let (storage, _td) = create_test_storage().await;

    let mut handles = Vec::new();
    for i in 0..100 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            let generator = ShortCodeGenerator::new(storage.clone());
            let code = generator.issue().await.unwrap();
            storage
                .insert_link(new_link(i, &code, None))
                .await
                .map(|link| link.short_code)
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        let code = handle.await.unwrap().expect("insert must not collide");
        assert!(codes.insert(code), "collision reached persistence");
    }
    assert_eq!(codes.len(), 100);
}

// =============================================================================
// Alias validation
// =============================================================================

#[tokio::test]
async fn test_alias_format_rules() {
    let (storage, _td) = create_test_storage().await;
    let generator = ShortCodeGenerator::new(storage.clone());

    assert!(generator.validate_alias("my-launch_24").await.is_ok());
    assert!(generator.validate_alias("ab").await.is_err());
    assert!(generator.validate_alias(&"x".repeat(51)).await.is_err());
    assert!(generator.validate_alias("has space").await.is_err());
    assert!(generator.validate_alias("has.dot").await.is_err());
}

#[tokio::test]
async fn test_alias_availability_checked_against_both_namespaces() {
    let (storage, _td) = create_test_storage().await;
    let generator = ShortCodeGenerator::new(storage.clone());

    storage
        .insert_link(new_link(1, "CodeOnly1", Some("taken-alias")))
        .await
        .unwrap();

    // Taken as an alias
    assert!(generator.validate_alias("taken-alias").await.is_err());
    // Taken as a generated code
    assert!(generator.validate_alias("CodeOnly1").await.is_err());
    assert!(generator.validate_alias("still-free").await.is_ok());
}

// =============================================================================
// Bounded retry
// =============================================================================

#[tokio::test]
async fn test_exhausted_attempts_when_code_space_is_full() {
    let (storage, _td) = create_test_storage().await;
    let generator = ShortCodeGenerator::new(storage.clone());

    // Fill the entire length-1 code space (62 symbols)
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    for (i, b) in ALPHABET.iter().enumerate() {
        let code = (*b as char).to_string();
        storage
            .insert_link(new_link(i as i64, &code, None))
            .await
            .unwrap();
    }

    let err = generator.issue_with_length(1).await.unwrap_err();
    assert!(matches!(
        err,
        linktrail::errors::LinktrailError::ExhaustedAttempts(_)
    ));
}
