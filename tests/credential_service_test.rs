//! Registry bookkeeping through CredentialService.

mod common;

use chrono::{Duration, Utc};
use common::{auto_record, InMemoryBackend};
use tokio_test::{assert_err, assert_ok};
use tokn::domain::models::{CredentialStatus, RotationType};
use tokn::domain::DomainError;
use tokn::services::{CredentialService, CredentialUpdate};

#[tokio::test]
async fn test_track_and_get() {
    let backend = InMemoryBackend::empty();
    let service = CredentialService::new(backend.clone());

    let record = auto_record("cf-token", "cloudflare", &["A"]);
    service.track(record.clone()).await.unwrap();

    assert_eq!(service.get("cf-token").await.unwrap(), record);
    assert_eq!(backend.saves(), 1);
    assert!(backend.snapshot().last_sync.is_some());
}

#[tokio::test]
async fn test_track_rejects_duplicates() {
    let record = auto_record("cf-token", "cloudflare", &["A"]);
    let backend = InMemoryBackend::with_records([record.clone()]);
    let service = CredentialService::new(backend.clone());

    let err = service.track(record).await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicateCredential(name) if name == "cf-token"));
    assert_eq!(backend.saves(), 0);
}

#[tokio::test]
async fn test_track_rejects_record_without_locations() {
    let backend = InMemoryBackend::empty();
    let service = CredentialService::new(backend);

    let err = service
        .track(auto_record("cf-token", "cloudflare", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(msg) if msg.contains("location")));
}

#[tokio::test]
async fn test_get_missing() {
    let service = CredentialService::new(InMemoryBackend::empty());
    let err = assert_err!(service.get("nope").await);
    assert_eq!(err.to_string(), "Credential not found: nope");
}

#[tokio::test]
async fn test_list_expiring_filters_active() {
    let now = Utc::now();
    let fresh = auto_record("fresh", "cloudflare", &["A"]).with_expiry(now + Duration::days(60));
    let soon = auto_record("soon", "cloudflare", &["B"]).with_expiry(now + Duration::days(3));
    let gone = auto_record("gone", "cloudflare", &["C"]).with_expiry(now - Duration::days(1));
    let backend = InMemoryBackend::with_records([fresh, soon, gone]);
    let service = CredentialService::new(backend);

    let (all, registry) = service.list(false).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(registry.len(), 3);

    let (expiring, _) = service.list(true).await.unwrap();
    let names: Vec<_> = expiring.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["gone", "soon"]);
    assert_eq!(expiring[0].status(), CredentialStatus::Expired);
    assert_eq!(expiring[1].status(), CredentialStatus::ExpiringSoon);
}

#[tokio::test]
async fn test_update_fields() {
    let backend = InMemoryBackend::with_records([auto_record("cf-token", "cloudflare", &["A"])]);
    let service = CredentialService::new(backend.clone());

    let updated = service
        .update(
            "cf-token",
            CredentialUpdate {
                expiry_days: Some(10),
                notes: Some("owned by platform".to_string()),
                rotation_type: Some(RotationType::Manual),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.notes, "owned by platform");
    assert_eq!(updated.rotation_type, RotationType::Manual);
    assert_eq!(updated.days_until_expiry(), Some(9));
    assert_eq!(backend.record("cf-token").unwrap(), updated);
}

#[tokio::test]
async fn test_update_rejects_empty_and_non_positive_expiry() {
    let backend = InMemoryBackend::with_records([auto_record("cf-token", "cloudflare", &["A"])]);
    let service = CredentialService::new(backend.clone());

    assert!(matches!(
        service.update("cf-token", CredentialUpdate::default()).await,
        Err(DomainError::ValidationFailed(_))
    ));

    let zero = CredentialUpdate {
        expiry_days: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        service.update("cf-token", zero).await,
        Err(DomainError::ValidationFailed(msg)) if msg.contains("must be positive")
    ));

    let huge = CredentialUpdate {
        expiry_days: Some(i64::MAX),
        ..Default::default()
    };
    assert!(matches!(
        service.update("cf-token", huge).await,
        Err(DomainError::ValidationFailed(msg)) if msg.contains("out of range")
    ));
    assert_eq!(backend.saves(), 0);
}

#[tokio::test]
async fn test_remove() {
    let backend = InMemoryBackend::with_records([auto_record("cf-token", "cloudflare", &["A"])]);
    let service = CredentialService::new(backend.clone());

    assert_ok!(service.remove("cf-token").await);
    assert!(backend.snapshot().is_empty());

    assert!(matches!(
        service.remove("cf-token").await,
        Err(DomainError::CredentialNotFound(_))
    ));
}

#[tokio::test]
async fn test_sync_surfaces_backend_errors() {
    let backend = InMemoryBackend::empty();
    backend.fail_loads();
    let service = CredentialService::new(backend);

    let err = service.sync().await.unwrap_err();
    assert!(matches!(err, DomainError::BackendError(_)));
}
