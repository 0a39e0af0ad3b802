//! OnboardingController drives the become-a-punter form through user load,
//! username checks, field edits and submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::category::PrimaryCategory;
use super::form::{FormState, UsernameStatus};
use super::navigation::Navigator;
use super::notify::Notifier;
use super::scope::ComponentScope;
use super::state::FormPhase;
use crate::api::{PunterApi, UserRecord};
use crate::config::ClientConfig;
use crate::error::{LoadError, OnboardingError, ValidationError};
use crate::store::TokenStore;

/// Shown when a registration goes through.
pub const SUCCESS_MESSAGE: &str = "Congratulations! You are now a punter.";

/// Timing and routing knobs for the form.
#[derive(Debug, Clone)]
pub struct OnboardingSettings {
    /// Grace period between success and navigation.
    pub redirect_delay: Duration,
    /// Where to go after a successful registration.
    pub landing_route: String,
}

impl Default for OnboardingSettings {
    fn default() -> Self {
        Self {
            redirect_delay: Duration::from_millis(3000),
            landing_route: "/".to_string(),
        }
    }
}

impl From<&ClientConfig> for OnboardingSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            redirect_delay: config.redirect_delay,
            landing_route: config.landing_route.clone(),
        }
    }
}

/// Everything the renderer needs to draw the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormSnapshot {
    pub phase: FormPhase,
    pub form: FormState,
    pub secondary_options: &'static [&'static str],
    pub can_check_username: bool,
    pub can_submit: bool,
}

struct Inner {
    phase: FormPhase,
    form: FormState,
}

impl Inner {
    fn transition(&mut self, target: FormPhase) -> Result<(), OnboardingError> {
        if !self.phase.can_transition_to(target) {
            return Err(OnboardingError::InvalidTransition {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }
        debug!(from = %self.phase, to = %target, "Form phase transition");
        self.phase = target;
        Ok(())
    }
}

/// Coordinates form state with the backend, notifications, and navigation.
///
/// All async work is bound to the controller's `ComponentScope`; after
/// `unmount()` (or drop) late results are discarded.
pub struct OnboardingController {
    api: Arc<dyn PunterApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<Notifier>,
    navigator: Arc<dyn Navigator>,
    settings: OnboardingSettings,
    inner: RwLock<Inner>,
    scope: ComponentScope,
    mount_started: AtomicBool,
}

impl OnboardingController {
    pub fn new(
        api: Arc<dyn PunterApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: OnboardingSettings,
    ) -> Self {
        Self {
            api,
            tokens,
            notifier,
            navigator,
            settings,
            inner: RwLock::new(Inner {
                phase: FormPhase::Loading,
                form: FormState::default(),
            }),
            scope: ComponentScope::new(),
            mount_started: AtomicBool::new(false),
        }
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn is_mounted(&self) -> bool {
        self.scope.is_mounted()
    }

    pub async fn phase(&self) -> FormPhase {
        self.inner.read().await.phase
    }

    pub async fn current_user(&self) -> Option<UserRecord> {
        self.inner.read().await.form.current_user.clone()
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        let inner = self.inner.read().await;
        FormSnapshot {
            phase: inner.phase,
            form: inner.form.clone(),
            secondary_options: inner.form.secondary_options(),
            can_check_username: inner.form.can_check_username(),
            can_submit: inner.phase == FormPhase::Ready && inner.form.can_submit(),
        }
    }

    fn ensure_mounted(&self) -> Result<(), OnboardingError> {
        if self.scope.is_mounted() {
            Ok(())
        } else {
            Err(OnboardingError::Unmounted)
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Load the signed-in user. Runs once; later calls report the outcome
    /// of the first load without touching the network.
    ///
    /// Whatever the outcome, the form ends up `Ready`.
    pub async fn mount(&self) -> Result<UserRecord, LoadError> {
        if self.mount_started.swap(true, Ordering::SeqCst) {
            return self.current_user().await.ok_or(LoadError::NotLoaded);
        }

        let Some(result) = self.scope.run(self.fetch_current_user()).await else {
            debug!("Form unmounted before user load finished; result dropped");
            return Err(LoadError::Unmounted);
        };

        let mut inner = self.inner.write().await;
        match &result {
            Ok(user) => {
                info!(user_id = %user.id, "Current user loaded");
                inner.form.current_user = Some(user.clone());
            }
            Err(e) => {
                warn!(error = %e, "Failed to load current user");
                inner.form.current_user = None;
                inner.form.last_error = Some(e.to_string());
            }
        }
        if inner.phase == FormPhase::Loading {
            inner.phase = FormPhase::Ready;
        }
        result
    }

    async fn fetch_current_user(&self) -> Result<UserRecord, LoadError> {
        let token = self
            .tokens
            .get_token()
            .await?
            .ok_or(LoadError::MissingToken)?;
        Ok(self.api.get_user(&token).await?)
    }

    /// Tear the form down. Pending calls and the redirect timer are dropped.
    pub fn unmount(&self) {
        if self.scope.is_mounted() {
            info!("Onboarding form unmounted");
        }
        self.scope.unmount();
    }

    // ── Field edits ─────────────────────────────────────────────────

    pub async fn set_username(&self, username: impl Into<String>) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;
        self.inner.write().await.form.set_username(username);
        Ok(())
    }

    pub async fn set_primary_category(
        &self,
        primary: Option<PrimaryCategory>,
    ) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;
        self.inner.write().await.form.set_primary_category(primary);
        Ok(())
    }

    pub async fn set_secondary_category(&self, secondary: &str) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;
        let mut inner = self.inner.write().await;
        if let Err(e) = inner.form.set_secondary_category(secondary) {
            inner.form.last_error = Some(e.to_string());
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn set_price(&self, price: impl Into<String>) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;
        self.inner.write().await.form.set_price(price);
        Ok(())
    }

    pub async fn set_agreed_to_terms(&self, agreed: bool) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;
        self.inner.write().await.form.set_agreed_to_terms(agreed);
        Ok(())
    }

    // ── Username availability ───────────────────────────────────────

    /// Ask the backend whether the current username is free.
    ///
    /// A result for a username that was edited while the request was in
    /// flight is ignored.
    pub async fn check_username(&self) -> Result<UsernameStatus, OnboardingError> {
        self.ensure_mounted()?;

        let username = {
            let mut inner = self.inner.write().await;
            if inner.form.username_status == UsernameStatus::Checking {
                return Err(OnboardingError::CheckInFlight);
            }
            let username = inner.form.trimmed_username().to_string();
            if username.is_empty() {
                let e = ValidationError::EmptyUsername;
                inner.form.last_error = Some(e.to_string());
                return Err(e.into());
            }
            inner.form.username_status = UsernameStatus::Checking;
            username
        };

        let Some(result) = self.scope.run(self.api.check_username(&username)).await else {
            debug!(%username, "Form unmounted during username check; result dropped");
            return Err(OnboardingError::Unmounted);
        };

        let mut inner = self.inner.write().await;
        if inner.form.trimmed_username() != username
            || inner.form.username_status != UsernameStatus::Checking
        {
            debug!(%username, "Username changed during check; stale result dropped");
            return Ok(inner.form.username_status);
        }

        match result {
            Ok(true) => {
                info!(%username, "Username available");
                inner.form.username_status = UsernameStatus::Available;
                inner.form.last_error = None;
                Ok(UsernameStatus::Available)
            }
            Ok(false) => {
                info!(%username, "Username taken");
                inner.form.username_status = UsernameStatus::Unavailable;
                inner.form.last_error = Some(ValidationError::UsernameUnavailable.to_string());
                Ok(UsernameStatus::Unavailable)
            }
            Err(e) => {
                warn!(%username, error = %e, "Username check failed");
                inner.form.username_status = UsernameStatus::Unset;
                inner.form.last_error =
                    Some(format!("Could not check username availability: {e}"));
                Err(e.into())
            }
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate, post the registration, and on success schedule navigation
    /// to the landing route after the redirect delay.
    pub async fn submit(&self) -> Result<(), OnboardingError> {
        self.ensure_mounted()?;

        let request = {
            let mut inner = self.inner.write().await;
            if inner.form.submission_in_progress {
                return Err(OnboardingError::SubmissionInFlight);
            }
            let request = match inner.form.build_request() {
                Ok(r) => r,
                Err(e) => {
                    inner.form.last_error = Some(e.to_string());
                    return Err(e.into());
                }
            };
            inner.transition(FormPhase::Submitting)?;
            inner.form.submission_in_progress = true;
            inner.form.last_error = None;
            request
        };

        info!(
            user_id = %request.user_id,
            username = %request.username,
            category = %request.primary_category,
            sub_category = %request.secondary_category,
            price = request.price,
            "Submitting punter registration"
        );

        let Some(result) = self.scope.run(self.api.become_punter(&request)).await else {
            debug!("Form unmounted during submission; result dropped");
            return Err(OnboardingError::Unmounted);
        };

        {
            let mut inner = self.inner.write().await;
            inner.form.submission_in_progress = false;
            match &result {
                Ok(()) => inner.transition(FormPhase::Succeeded)?,
                Err(e) => {
                    inner.transition(FormPhase::Ready)?;
                    inner.form.last_error = Some(format!("Registration failed: {e}"));
                }
            }
        }

        match result {
            Ok(()) => {
                info!(user_id = %request.user_id, "Punter registration succeeded");
                self.notifier.success(SUCCESS_MESSAGE).await;
                self.schedule_redirect();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Punter registration failed");
                self.notifier.clear().await;
                Err(e.into())
            }
        }
    }

    fn schedule_redirect(&self) {
        let navigator = Arc::clone(&self.navigator);
        let route = self.settings.landing_route.clone();
        let deadline = tokio::time::Instant::now() + self.settings.redirect_delay;
        let spawned = self.scope.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            navigator.navigate(&route);
        });
        if spawned.is_none() {
            debug!("Form unmounted before redirect could be scheduled");
        }
    }
}

impl Drop for OnboardingController {
    fn drop(&mut self) {
        self.scope.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::api::BecomePunterRequest;
    use crate::error::ApiError;
    use crate::onboarding::navigation::RecordingNavigator;
    use crate::onboarding::notify::ToastKind;
    use crate::store::LibSqlTokenStore;

    const CALL_LATENCY: Duration = Duration::from_millis(200);

    /// Stub backend with configurable outcomes (no real API calls).
    #[derive(Default)]
    struct StubApi {
        user_fails: AtomicBool,
        taken: Vec<String>,
        check_fails: AtomicBool,
        submit_fails: AtomicBool,
        get_user_calls: AtomicUsize,
        check_calls: AtomicUsize,
        submitted: Mutex<Vec<BecomePunterRequest>>,
    }

    impl StubApi {
        fn submissions(&self) -> Vec<BecomePunterRequest> {
            self.submitted.lock().unwrap().clone()
        }

        fn failure(endpoint: &str) -> ApiError {
            ApiError::Status {
                endpoint: endpoint.into(),
                status: 500,
                message: "Internal Server Error".into(),
            }
        }
    }

    #[async_trait]
    impl PunterApi for StubApi {
        async fn get_user(&self, _token: &SecretString) -> Result<UserRecord, ApiError> {
            self.get_user_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(CALL_LATENCY).await;
            if self.user_fails.load(Ordering::SeqCst) {
                return Err(Self::failure("/client/getUser"));
            }
            Ok(UserRecord::with_id("u1"))
        }

        async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
            self.check_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(CALL_LATENCY).await;
            if self.check_fails.load(Ordering::SeqCst) {
                return Err(Self::failure("/client/checkUsername"));
            }
            Ok(!self.taken.iter().any(|t| t == username))
        }

        async fn become_punter(&self, request: &BecomePunterRequest) -> Result<(), ApiError> {
            tokio::time::sleep(CALL_LATENCY).await;
            self.submitted.lock().unwrap().push(request.clone());
            if self.submit_fails.load(Ordering::SeqCst) {
                return Err(Self::failure("/client/becomePunter"));
            }
            Ok(())
        }
    }

    struct Fixture {
        api: Arc<StubApi>,
        nav: Arc<RecordingNavigator>,
        ctrl: Arc<OnboardingController>,
    }

    async fn fixture_with(api: StubApi, token: Option<&str>) -> Fixture {
        let api = Arc::new(api);
        let store = LibSqlTokenStore::new_memory().await.unwrap();
        if let Some(token) = token {
            store.set_token(&SecretString::from(token)).await.unwrap();
        }
        let nav = Arc::new(RecordingNavigator::new());
        let ctrl = Arc::new(OnboardingController::new(
            api.clone(),
            Arc::new(store),
            Notifier::new(Duration::from_millis(3000)),
            nav.clone(),
            OnboardingSettings::default(),
        ));
        Fixture { api, nav, ctrl }
    }

    async fn fixture() -> Fixture {
        fixture_with(
            StubApi {
                taken: vec!["alice".into()],
                ..Default::default()
            },
            Some("tok"),
        )
        .await
    }

    /// Let spawned tasks run without moving the clock.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    /// Fill every field with valid values and verify the username.
    async fn fill_valid(ctrl: &OnboardingController) {
        ctrl.set_username("trader1").await.unwrap();
        assert_eq!(
            ctrl.check_username().await.unwrap(),
            UsernameStatus::Available
        );
        ctrl.set_primary_category(Some(PrimaryCategory::Trading))
            .await
            .unwrap();
        ctrl.set_secondary_category("forex").await.unwrap();
        ctrl.set_price("50").await.unwrap();
        ctrl.set_agreed_to_terms(true).await.unwrap();
    }

    // ── Load ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn mount_loads_user_once() {
        let f = fixture().await;
        assert_eq!(f.ctrl.phase().await, FormPhase::Loading);

        let user = f.ctrl.mount().await.unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(f.ctrl.phase().await, FormPhase::Ready);

        // Second mount does not hit the backend again
        let again = f.ctrl.mount().await.unwrap();
        assert_eq!(again.id, "u1");
        assert_eq!(f.api.get_user_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn mount_without_token_is_ready_with_error() {
        let f = fixture_with(StubApi::default(), None).await;
        let err = f.ctrl.mount().await.unwrap_err();
        assert!(matches!(err, LoadError::MissingToken));
        assert_eq!(f.api.get_user_calls.load(Ordering::SeqCst), 0);

        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Ready);
        assert!(snap.form.current_user.is_none());
        assert!(snap.form.last_error.is_some());

        // Independent fields still work
        f.ctrl.set_price("10").await.unwrap();
        assert_eq!(f.ctrl.snapshot().await.form.price_per_week, "10");
    }

    #[tokio::test(start_paused = true)]
    async fn mount_backend_failure_is_ready_with_error() {
        let api = StubApi::default();
        api.user_fails.store(true, Ordering::SeqCst);
        let f = fixture_with(api, Some("tok")).await;

        assert!(matches!(f.ctrl.mount().await, Err(LoadError::Api(_))));
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Ready);
        assert!(snap.form.current_user.is_none());
        assert!(snap.form.last_error.is_some());
    }

    // ── Username check ──────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn empty_username_fails_without_network() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("   ").await.unwrap();

        assert_eq!(
            f.ctrl.check_username().await,
            Err(OnboardingError::Validation(ValidationError::EmptyUsername))
        );
        assert_eq!(f.api.check_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            f.ctrl.snapshot().await.form.username_status,
            UsernameStatus::Unset
        );
    }

    #[tokio::test(start_paused = true)]
    async fn edit_after_available_resets_status() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("bob").await.unwrap();
        assert_eq!(
            f.ctrl.check_username().await.unwrap(),
            UsernameStatus::Available
        );

        f.ctrl.set_username("bob2").await.unwrap();
        assert_eq!(
            f.ctrl.snapshot().await.form.username_status,
            UsernameStatus::Unset
        );
    }

    #[tokio::test(start_paused = true)]
    async fn taken_username_is_unavailable() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("alice").await.unwrap();

        assert_eq!(
            f.ctrl.check_username().await.unwrap(),
            UsernameStatus::Unavailable
        );
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.form.username_status, UsernameStatus::Unavailable);
        assert!(!snap.can_submit);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_check_resets_to_unset() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.api.check_fails.store(true, Ordering::SeqCst);
        f.ctrl.set_username("carol").await.unwrap();

        assert!(matches!(
            f.ctrl.check_username().await,
            Err(OnboardingError::Api(_))
        ));
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.form.username_status, UsernameStatus::Unset);
        assert!(snap.form.last_error.is_some());

        // Manual retry works once the backend recovers
        f.api.check_fails.store(false, Ordering::SeqCst);
        assert_eq!(
            f.ctrl.check_username().await.unwrap(),
            UsernameStatus::Available
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_check_is_refused() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("dave").await.unwrap();

        let ctrl = Arc::clone(&f.ctrl);
        let first = tokio::spawn(async move { ctrl.check_username().await });
        settle().await;

        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.form.username_status, UsernameStatus::Checking);
        assert!(!snap.can_check_username);
        assert_eq!(
            f.ctrl.check_username().await,
            Err(OnboardingError::CheckInFlight)
        );

        assert_eq!(first.await.unwrap(), Ok(UsernameStatus::Available));
        assert_eq!(f.api.check_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_check_result_is_dropped() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("erin").await.unwrap();

        let ctrl = Arc::clone(&f.ctrl);
        let first = tokio::spawn(async move { ctrl.check_username().await });
        settle().await;

        // Edit while the check is in flight
        f.ctrl.set_username("alice").await.unwrap();

        assert_eq!(first.await.unwrap(), Ok(UsernameStatus::Unset));
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.form.username, "alice");
        assert_eq!(snap.form.username_status, UsernameStatus::Unset);
    }

    // ── Categories ──────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn sports_then_trading_clears_secondary() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl
            .set_primary_category(Some(PrimaryCategory::Sports))
            .await
            .unwrap();
        f.ctrl.set_secondary_category("football").await.unwrap();

        f.ctrl
            .set_primary_category(Some(PrimaryCategory::Trading))
            .await
            .unwrap();
        let snap = f.ctrl.snapshot().await;
        assert!(snap.form.secondary_category.is_empty());
        assert_eq!(
            snap.secondary_options,
            &["forex", "crypto", "stocks", "commodities", "indices"]
        );
    }

    // ── Submission ──────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn submit_gates_report_first_failure() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;
        f.ctrl.set_price("abc").await.unwrap();
        f.ctrl.set_agreed_to_terms(false).await.unwrap();

        assert_eq!(
            f.ctrl.submit().await,
            Err(OnboardingError::Validation(ValidationError::InvalidPrice))
        );
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Ready);
        assert!(!snap.form.submission_in_progress);
        assert_eq!(snap.form.price_per_week, "abc");
        assert_eq!(snap.form.secondary_category, "forex");
        assert!(f.api.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_without_user_is_not_signed_in() {
        let f = fixture_with(StubApi::default(), None).await;
        let _ = f.ctrl.mount().await;
        fill_valid(&f.ctrl).await;

        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Ready);
        assert!(snap.form.validate().is_ok());
        assert!(!snap.can_submit);

        assert_eq!(
            f.ctrl.submit().await,
            Err(OnboardingError::Validation(ValidationError::NotSignedIn))
        );
        assert!(f.api.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_success_navigates_once() {
        let f = fixture().await;
        let mut toasts = f.ctrl.notifier().subscribe();
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;
        assert!(f.ctrl.snapshot().await.can_submit);

        f.ctrl.submit().await.unwrap();

        let sent = f.api.submissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            BecomePunterRequest {
                user_id: "u1".into(),
                username: "trader1".into(),
                primary_category: PrimaryCategory::Trading,
                secondary_category: "forex".into(),
                price: 50.0,
            }
        );

        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Succeeded);
        assert!(!snap.form.submission_in_progress);
        assert!(snap.form.last_error.is_none());
        assert!(snap.form.validate().is_ok());
        assert!(!snap.can_submit);

        match toasts.recv().await.unwrap() {
            crate::onboarding::notify::ToastEvent::Shown(t) => {
                assert_eq!(t.kind, ToastKind::Success);
                assert_eq!(t.message, SUCCESS_MESSAGE);
            }
            other => panic!("Expected success toast, got {other:?}"),
        }

        // Not before the grace period
        tokio::time::sleep(Duration::from_millis(2999)).await;
        settle().await;
        assert!(f.nav.routes().is_empty());

        tokio::time::sleep(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(f.nav.routes(), vec!["/"]);

        // Exactly once
        tokio::time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(f.nav.routes().len(), 1);

        // Terminal: a second submit cannot start
        assert!(matches!(
            f.ctrl.submit().await,
            Err(OnboardingError::InvalidTransition { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_failure_preserves_fields_and_allows_retry() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;
        f.ctrl.notifier().info("stale toast").await;
        f.api.submit_fails.store(true, Ordering::SeqCst);

        let before = f.ctrl.snapshot().await.form;
        assert!(matches!(f.ctrl.submit().await, Err(OnboardingError::Api(_))));

        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Ready);
        assert!(!snap.form.submission_in_progress);
        assert!(snap.form.last_error.is_some());
        assert_eq!(snap.form.username, before.username);
        assert_eq!(snap.form.username_status, UsernameStatus::Available);
        assert_eq!(snap.form.primary_category, before.primary_category);
        assert_eq!(snap.form.secondary_category, before.secondary_category);
        assert_eq!(snap.form.price_per_week, before.price_per_week);
        assert!(snap.form.agreed_to_terms);
        assert!(snap.can_submit);
        assert!(f.ctrl.notifier().active_toasts().await.is_empty());

        // Retry succeeds
        f.api.submit_fails.store(false, Ordering::SeqCst);
        f.ctrl.submit().await.unwrap();
        assert_eq!(f.ctrl.phase().await, FormPhase::Succeeded);
        assert_eq!(f.api.submissions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_submit_is_refused_while_in_flight() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;

        let ctrl = Arc::clone(&f.ctrl);
        let first = tokio::spawn(async move { ctrl.submit().await });
        settle().await;

        let snap = f.ctrl.snapshot().await;
        assert!(snap.form.submission_in_progress);
        assert!(!snap.can_submit);
        assert_eq!(
            f.ctrl.submit().await,
            Err(OnboardingError::SubmissionInFlight)
        );

        first.await.unwrap().unwrap();
        assert_eq!(f.api.submissions().len(), 1);
    }

    // ── Teardown ────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn unmount_during_submit_leaves_state_alone() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;

        let ctrl = Arc::clone(&f.ctrl);
        let pending = tokio::spawn(async move { ctrl.submit().await });
        settle().await;
        f.ctrl.unmount();

        assert_eq!(pending.await.unwrap(), Err(OnboardingError::Unmounted));
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.phase, FormPhase::Submitting);
        assert!(f.ctrl.notifier().active_toasts().await.is_empty());
        assert_eq!(
            f.ctrl.set_username("x").await,
            Err(OnboardingError::Unmounted)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_during_check_leaves_status_alone() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        f.ctrl.set_username("frank").await.unwrap();

        let ctrl = Arc::clone(&f.ctrl);
        let pending = tokio::spawn(async move { ctrl.check_username().await });
        settle().await;
        f.ctrl.unmount();

        assert_eq!(pending.await.unwrap(), Err(OnboardingError::Unmounted));

        // The backend reply would have landed by now
        tokio::time::sleep(CALL_LATENCY * 2).await;
        settle().await;
        let snap = f.ctrl.snapshot().await;
        assert_eq!(snap.form.username_status, UsernameStatus::Checking);
        assert!(snap.form.last_error.is_none());
        assert_eq!(f.api.check_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.ctrl.check_username().await,
            Err(OnboardingError::Unmounted)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_pending_redirect() {
        let f = fixture().await;
        f.ctrl.mount().await.unwrap();
        fill_valid(&f.ctrl).await;
        f.ctrl.submit().await.unwrap();

        f.ctrl.unmount();
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert!(f.nav.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_before_user_loads_drops_result() {
        let f = fixture().await;
        let ctrl = Arc::clone(&f.ctrl);
        let pending = tokio::spawn(async move { ctrl.mount().await });
        settle().await;
        f.ctrl.unmount();

        assert!(matches!(pending.await.unwrap(), Err(LoadError::Unmounted)));
        assert_eq!(f.ctrl.phase().await, FormPhase::Loading);
        assert!(f.ctrl.current_user().await.is_none());
    }
}
