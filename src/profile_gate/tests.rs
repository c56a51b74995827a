//! Tests for the profile completion gate
//!
//! These tests cover:
//! - The ordered decision path (server flag, cache, snooze, required fields)
//! - Debounced dialog display and its cancellation
//! - Dismiss, acknowledge and snooze side effects
//! - User normalization and completion form validation

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::super::store::PROFILE_COMPLETED_KEY;
    use super::super::validators::{CompleteProfileRequest, CompleteProfileValidator};
    use super::super::*;
    use crate::common::config::GateConfig;
    use crate::common::Validator;
    use crate::portal::models::{WirePreferences, WireUser};
    use crate::portal::ClientError;
    use crate::test_support::{employer, new_signup, FakePortal, RecordingUi};
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    struct Harness {
        gate: ProfileGateController,
        storage: MemoryStorage,
        cache: CompletionCache,
        portal: Arc<FakePortal>,
        ui: Arc<RecordingUi>,
    }

    fn harness_with(config: GateConfig) -> Harness {
        let storage = MemoryStorage::new();
        let cache = CompletionCache::new(Arc::new(storage.clone()));
        let portal = Arc::new(FakePortal::default());
        let ui = Arc::new(RecordingUi::default());
        let gate = ProfileGateController::new(
            Arc::new(cache.clone()),
            portal.clone(),
            ui.clone(),
            config,
        );

        Harness {
            gate,
            storage,
            cache,
            portal,
            ui,
        }
    }

    fn harness() -> Harness {
        harness_with(GateConfig::default())
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(StdDuration::from_millis(ms)).await;
    }

    // ============================================================================
    // Decision Path
    // ============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_server_completion_dominates_every_other_signal() {
        let h = harness();
        let now = Utc::now();
        let mut user = new_signup();
        user.phone = None;
        user.company_id = None;
        user.preferences.profile_completed = Some(true);
        user.preferences.profile_completion_skipped_until = Some(now - Duration::hours(3));

        let decision = h.gate.evaluate(Some(&user), now).await;
        assert_eq!(decision, Some(GateDecision::HIDE));

        let record = h.cache.read().await.unwrap().expect("record written");
        assert!(record.completed);
        assert_eq!(record.user_type, "employer");
        assert_eq!(record.timestamp, now.timestamp_millis());

        advance(5000).await;
        assert!(!h.gate.dialog_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_completion_latches_for_the_session() {
        let h = harness();
        let now = Utc::now();
        let mut completed = new_signup();
        completed.preferences.profile_completed = Some(true);
        h.gate.evaluate(Some(&completed), now).await;

        // A stale snapshot without the flag must not reopen the gate, even without the cache
        h.cache.clear().await.unwrap();
        let stale = new_signup();
        assert_eq!(
            h.gate.evaluate(Some(&stale), now).await,
            Some(GateDecision::HIDE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cache_record_suppresses_dialog() {
        let h = harness();
        let now = Utc::now();
        h.cache
            .write(&PersistedCompletionRecord::completed_at(
                UserType::Employer,
                now - Duration::days(29),
            ))
            .await
            .unwrap();

        let decision = h.gate.evaluate(Some(&new_signup()), now).await;
        assert_eq!(decision, Some(GateDecision::HIDE));
        assert!(h.cache.read().await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cache_record_is_purged() {
        let h = harness();
        let now = Utc::now();
        h.cache
            .write(&PersistedCompletionRecord::completed_at(
                UserType::Employer,
                now - Duration::days(31),
            ))
            .await
            .unwrap();

        let decision = h.gate.evaluate(Some(&new_signup()), now).await;
        assert_eq!(decision, Some(GateDecision::SHOW));
        assert!(h.cache.read().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_record_for_another_user_type_is_ignored() {
        let h = harness();
        let now = Utc::now();
        h.cache
            .write(&PersistedCompletionRecord::completed_at(UserType::Employer, now))
            .await
            .unwrap();

        let mut admin = new_signup();
        admin.user_type = UserType::Admin;
        admin.phone = None;

        let decision = h.gate.evaluate(Some(&admin), now).await;
        assert_eq!(decision, Some(GateDecision::SHOW));
        assert!(h.cache.read().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_record_does_not_cover_employer() {
        let h = harness();
        let now = Utc::now();
        h.cache
            .write(&PersistedCompletionRecord::completed_at(UserType::Admin, now))
            .await
            .unwrap();

        let decision = h.gate.evaluate(Some(&new_signup()), now).await;
        assert_eq!(decision, Some(GateDecision::SHOW));
    }

    #[tokio::test(start_paused = true)]
    async fn test_incomplete_cache_record_is_purged() {
        let h = harness();
        let now = Utc::now();
        h.cache
            .write(&PersistedCompletionRecord {
                completed: false,
                timestamp: now.timestamp_millis(),
                user_type: "employer".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            h.gate.evaluate(Some(&new_signup()), now).await,
            Some(GateDecision::SHOW)
        );
        assert!(h.cache.read().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_cache_is_cleared_and_evaluation_continues() {
        let h = harness();
        let now = Utc::now();
        h.storage
            .set(PROFILE_COMPLETED_KEY, "{\"completed\": tru")
            .await
            .unwrap();

        assert_eq!(
            h.gate.evaluate(Some(&employer()), now).await,
            Some(GateDecision::HIDE)
        );
        assert!(h.storage.get(PROFILE_COMPLETED_KEY).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_window_is_honored_until_it_passes() {
        let h = harness();
        let now = Utc::now();
        let mut user = new_signup();

        user.preferences.profile_completion_skipped_until = Some(now + Duration::hours(1));
        assert_eq!(
            h.gate.evaluate(Some(&user), now).await,
            Some(GateDecision::HIDE)
        );

        user.preferences.profile_completion_skipped_until = Some(now - Duration::hours(1));
        assert_eq!(
            h.gate.evaluate(Some(&user), now).await,
            Some(GateDecision::SHOW)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_required_fields_complete_hides_dialog() {
        let h = harness();
        let now = Utc::now();

        assert_eq!(
            h.gate.evaluate(Some(&employer()), now).await,
            Some(GateDecision::HIDE)
        );
        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_designation_shows_dialog_after_debounce() {
        let h = harness();
        let now = Utc::now();

        assert_eq!(
            h.gate.evaluate(Some(&new_signup()), now).await,
            Some(GateDecision::SHOW)
        );
        assert!(!h.gate.dialog_visible());

        advance(999).await;
        assert!(!h.gate.dialog_visible());

        advance(2).await;
        assert!(h.gate.dialog_visible());
        assert_eq!(h.ui.visibility_changes(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_does_not_need_company() {
        let h = harness();
        let now = Utc::now();
        let mut admin = employer();
        admin.user_type = UserType::Admin;
        admin.company_id = None;

        assert_eq!(
            h.gate.evaluate(Some(&admin), now).await,
            Some(GateDecision::HIDE)
        );

        let mut recruiter = admin.clone();
        recruiter.user_type = UserType::Recruiter;
        assert_eq!(
            h.gate.evaluate(Some(&recruiter), now).await,
            Some(GateDecision::SHOW)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exempt_email_never_sees_dialog() {
        let mut config = GateConfig::default();
        config.exempt_emails.insert("hiring@acme.test".to_string());
        let h = harness_with(config);

        assert_eq!(
            h.gate.evaluate(Some(&new_signup()), Utc::now()).await,
            Some(GateDecision::HIDE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_user_yields_no_decision() {
        let h = harness();
        h.gate.evaluate(Some(&new_signup()), Utc::now()).await;

        assert_eq!(h.gate.evaluate(None, Utc::now()).await, None);
        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    // ============================================================================
    // Debounce and Idempotence
    // ============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_new_evaluation_cancels_pending_show() {
        let h = harness();
        let now = Utc::now();

        h.gate.evaluate(Some(&new_signup()), now).await;
        advance(600).await;
        h.gate.evaluate(Some(&employer()), now).await;

        advance(3000).await;
        assert!(!h.gate.dialog_visible());
        assert!(h.ui.visibility_changes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_show_fires() {
        let h = harness();
        let now = Utc::now();

        h.gate.evaluate(Some(&new_signup()), now).await;
        advance(600).await;

        let mut other = new_signup();
        other.phone = None;
        h.gate.evaluate(Some(&other), now).await;

        advance(500).await;
        assert!(!h.gate.dialog_visible(), "first timer must have been cancelled");

        advance(600).await;
        assert!(h.gate.dialog_visible());
        assert_eq!(h.ui.visibility_changes(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_evaluation_is_stable() {
        let h = harness();
        let now = Utc::now();
        let user = new_signup();

        let first = h.gate.evaluate(Some(&user), now).await;
        let second = h.gate.evaluate(Some(&user), now).await;
        assert_eq!(first, second);

        let complete = employer();
        let first = h.gate.evaluate(Some(&complete), now).await;
        let second = h.gate.evaluate(Some(&complete), now).await;
        assert_eq!(first, second);
        assert_eq!(h.gate.last_decision(), Some(GateDecision::HIDE));
    }

    // ============================================================================
    // Side Effects
    // ============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_hides_without_persisting() {
        let h = harness();
        let now = Utc::now();
        let user = new_signup();

        h.gate.evaluate(Some(&user), now).await;
        advance(1001).await;
        assert!(h.gate.dialog_visible());

        h.gate.dismiss();
        assert!(!h.gate.dialog_visible());
        assert!(h.cache.read().await.unwrap().is_none());

        // Next navigation re-derives from scratch
        assert_eq!(
            h.gate.evaluate(Some(&user), now).await,
            Some(GateDecision::SHOW)
        );
        advance(1001).await;
        assert!(h.gate.dialog_visible());
        assert_eq!(h.ui.visibility_changes(), vec![true, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_pending_show() {
        let h = harness();
        h.gate.evaluate(Some(&new_signup()), Utc::now()).await;

        h.gate.dismiss();
        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acknowledge_with_failed_refresh_keeps_dialog_hidden() {
        let h = harness();
        let now = Utc::now();
        h.gate.evaluate(Some(&new_signup()), now).await;
        advance(1001).await;

        h.portal
            .push_user(Err(ClientError::Api("gateway timeout".to_string())));
        assert!(h.gate.acknowledge_profile_update(now).await.is_none());
        assert!(!h.gate.dialog_visible());

        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_records_window_upstream() {
        let h = harness();
        let now = Utc::now();
        let user = new_signup();
        h.gate.evaluate(Some(&user), now).await;
        advance(1001).await;

        let refreshed = h.gate.snooze(&user, now).await;

        let expected_until = now + Duration::hours(12);
        assert_eq!(
            refreshed.preferences.profile_completion_skipped_until,
            Some(expected_until)
        );

        let updates = h.portal.updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 1);
        let sent = updates[0]
            .preferences
            .as_ref()
            .and_then(|p| p.profile_completion_skipped_until.clone());
        assert_eq!(sent, Some(expected_until.to_rfc3339()));

        assert_eq!(h.gate.last_decision(), Some(GateDecision::HIDE));
        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_is_honored_locally_when_portal_fails() {
        let h = harness();
        let now = Utc::now();
        *h.portal.update_response.lock().unwrap() =
            Some(Err(ClientError::Api("unavailable".to_string())));

        let refreshed = h.gate.snooze(&new_signup(), now).await;
        assert!(refreshed.preferences.profile_completion_skipped_until.is_some());
        assert_eq!(h.gate.last_decision(), Some(GateDecision::HIDE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_show() {
        let h = harness();
        h.gate.evaluate(Some(&new_signup()), Utc::now()).await;

        h.gate.shutdown();
        advance(2000).await;
        assert!(!h.gate.dialog_visible());
    }

    // ============================================================================
    // End to End
    // ============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_signup_complete_and_reload() {
        let h = harness();
        let now = Utc::now();
        let signup = new_signup();

        // Sign-up: nothing cached, no skip, designation missing
        assert_eq!(
            h.gate.evaluate(Some(&signup), now).await,
            Some(GateDecision::SHOW)
        );
        advance(1001).await;
        assert!(h.gate.dialog_visible());

        // Form submitted; the server now reports completion
        let mut confirmed = employer();
        confirmed.preferences.profile_completed = Some(true);
        h.portal.push_user(Ok(confirmed.clone()));

        let (refreshed, decision) = h
            .gate
            .acknowledge_profile_update(now)
            .await
            .expect("refresh succeeds");
        assert_eq!(refreshed, confirmed);
        assert_eq!(decision, GateDecision::HIDE);
        assert!(!h.gate.dialog_visible());

        let record = h.cache.read().await.unwrap().expect("completion cached");
        assert_eq!(
            record,
            PersistedCompletionRecord::completed_at(UserType::Employer, now)
        );

        // Page reload: fresh controller, same client storage, same user object
        let reloaded = ProfileGateController::new(
            Arc::new(h.cache.clone()),
            h.portal.clone(),
            h.ui.clone(),
            GateConfig::default(),
        );
        let later = now + Duration::minutes(5);
        assert_eq!(
            reloaded.evaluate(Some(&confirmed), later).await,
            Some(GateDecision::HIDE)
        );
        advance(2000).await;
        assert!(!reloaded.dialog_visible());
    }

    // ============================================================================
    // Boundary Normalization
    // ============================================================================

    #[test]
    fn test_from_wire_normalizes_fields() {
        let wire = WireUser {
            id: Some(serde_json::json!(42)),
            email: Some(" owner@acme.test ".to_string()),
            user_type: Some("Employer".to_string()),
            phone: Some("   ".to_string()),
            designation: Some("CTO".to_string()),
            company_id: Some(serde_json::json!("c-9")),
            preferences: Some(WirePreferences {
                profile_completed: None,
                profile_completion_skipped_until: Some("not-a-date".to_string()),
            }),
            ..Default::default()
        };

        let user = UserProfile::from_wire(wire).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.email, "owner@acme.test");
        assert_eq!(user.user_type, UserType::Employer);
        assert_eq!(user.phone, None);
        assert_eq!(user.company_id.as_deref(), Some("c-9"));
        assert_eq!(user.preferences.profile_completion_skipped_until, None);
        assert!(!user.has_required_fields());
    }

    #[test]
    fn test_from_wire_parses_skip_timestamp() {
        let wire: WireUser = serde_json::from_str(
            r#"{"id":"u1","email":"a@b.co","user_type":"jobseeker",
                "preferences":{"profileCompleted":false,
                               "profileCompletionSkippedUntil":"2026-10-20T08:00:00.000Z"}}"#,
        )
        .unwrap();

        let user = UserProfile::from_wire(wire).unwrap();
        assert_eq!(user.preferences.profile_completed, Some(false));
        assert_eq!(
            user.preferences
                .profile_completion_skipped_until
                .map(|t| t.to_rfc3339()),
            Some("2026-10-20T08:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_from_wire_rejects_unknown_user_type() {
        let wire = WireUser {
            id: Some(serde_json::json!("u1")),
            email: Some("a@b.co".to_string()),
            user_type: Some("guest".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            UserProfile::from_wire(wire),
            Err(ClientError::InvalidPayload(_))
        ));
    }

    // ============================================================================
    // Completion Form Validation
    // ============================================================================

    #[test]
    fn test_completion_form_valid() {
        let request = CompleteProfileRequest {
            first_name: Some("Dana".to_string()),
            last_name: None,
            phone: "+1 (555) 010-0200".to_string(),
            designation: "Talent Lead".to_string(),
        };

        let result = CompleteProfileValidator.validate(&request);
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_completion_form_requires_phone_and_designation() {
        let request = CompleteProfileRequest {
            first_name: None,
            last_name: None,
            phone: "call me".to_string(),
            designation: "  ".to_string(),
        };

        let result = CompleteProfileValidator.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "phone"));
        assert!(result.errors.iter().any(|e| e.field == "designation"));
    }
}
