use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use credvault_core::{
    load_snapshot, save_snapshot, strength, ActivityKind, ManualClock, User, VaultConfig,
    VaultContext,
};
use tempfile::TempDir;

fn anna() -> User {
    User::new("Anna", "Kowalska", "anna@mail.com")
}

#[test]
fn test_add_then_upsert_same_record() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(),
    ));
    let mut ctx = VaultContext::new(Some(anna()), VaultConfig::default(), clock.clone());

    let created = ctx.add_password("Facebook", "anna@mail.com", "abc").unwrap();
    assert_eq!(created.strength, strength::score("abc").value);
    assert_eq!(ctx.recent_activity(10).len(), 1);
    assert!(ctx.recent_activity(10)[0].name.contains("Facebook"));

    clock.advance(Duration::minutes(2));
    let updated = ctx
        .update_password("StrongPass123!", "Facebook", "anna@mail.com")
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.password, "StrongPass123!");
    assert!(updated.strength > created.strength);
    assert_eq!(ctx.password_count(), 1);

    let activity = ctx.recent_activity(10);
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0].kind, ActivityKind::Updated);
    assert_eq!(activity[1].kind, ActivityKind::Created);
}

#[test]
fn test_guest_cannot_write() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut ctx = VaultContext::guest(VaultConfig::default(), clock);

    let err = ctx.add_password("Facebook", "anna@mail.com", "abc").unwrap_err();
    assert!(err.is_unauthenticated());
    assert!(ctx.recent_passwords(5).is_empty());
    assert!(ctx.recent_activity(5).is_empty());
}

#[tokio::test]
async fn test_session_survives_storage_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let base_dir = temp_dir.path();
    let user = anna();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(),
    ));

    let mut ctx = VaultContext::new(Some(user.clone()), VaultConfig::default(), clock.clone());
    ctx.add_password("https://mail.google.com/", "anna", "pw").unwrap();
    clock.advance(Duration::minutes(1));
    ctx.add_password("Netflix", "anna", "Another#1").unwrap();
    save_snapshot(base_dir, &user.id, &ctx.snapshot().unwrap())
        .await
        .unwrap();
    ctx.sign_out();

    let snapshot = load_snapshot(base_dir, &user.id).await.unwrap();
    let restored = VaultContext::restore(user, snapshot, VaultConfig::default(), clock).unwrap();

    let platforms: Vec<String> = restored
        .recent_passwords(10)
        .into_iter()
        .map(|r| r.platform)
        .collect();
    assert_eq!(platforms, vec!["Netflix", "https://mail.google.com/"]);
    assert_eq!(restored.recent_activity(10).len(), 2);
    assert_eq!(restored.recent_domains(10)[1].domain, "google.com");
}
