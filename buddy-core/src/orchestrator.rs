//! Submit lifecycle for forecast queries.
//!
//! `Idle → Validating → Loading → Rendered | Failed`, re-entrant at any time.
//! Every issued request takes a token; only the response holding the most
//! recent token may touch the view, so a slow earlier request can never
//! overwrite a newer one.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    Config,
    error::{ForecastError, ValidationError},
    model::QueryForm,
    normalize::normalize,
    render::Dashboard,
    source::{ForecastSource, SourceKind, source_from_config},
    view::{Notice, ViewSurface, Visibility},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Loading,
    Rendered,
    Failed,
}

/// How a single submission ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Rejected before any request was made.
    Invalid(ValidationError),
    Rendered(Dashboard),
    Failed(ForecastError),
    /// A newer submission was issued while this one was loading; its result
    /// was discarded.
    Superseded,
}

pub struct QueryOrchestrator {
    mock: Arc<dyn ForecastSource>,
    network: Arc<dyn ForecastSource>,
    view: Arc<dyn ViewSurface>,
    use_mock: AtomicBool,
    notice_duration: Duration,
    latest: AtomicU64,
    phase: Mutex<Phase>,
}

impl QueryOrchestrator {
    pub fn new(
        mock: Arc<dyn ForecastSource>,
        network: Arc<dyn ForecastSource>,
        view: Arc<dyn ViewSurface>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            mock,
            network,
            view,
            use_mock: AtomicBool::new(defaults.use_mock),
            notice_duration: defaults.notice_duration(),
            latest: AtomicU64::new(0),
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn from_config(config: &Config, view: Arc<dyn ViewSurface>) -> anyhow::Result<Self> {
        let mock = source_from_config(SourceKind::Mock, config)?;
        let network = source_from_config(SourceKind::Network, config)?;

        Ok(Self::new(mock, network, view)
            .with_mock(config.use_mock)
            .with_notice_duration(config.notice_duration()))
    }

    pub fn with_mock(self, use_mock: bool) -> Self {
        self.use_mock.store(use_mock, Ordering::SeqCst);
        self
    }

    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    pub fn source_kind(&self) -> SourceKind {
        SourceKind::from_mock_flag(self.use_mock.load(Ordering::SeqCst))
    }

    /// Flip the mock toggle. Applies from the next submission on.
    pub fn set_mock(&self, enabled: bool) {
        self.use_mock.store(enabled, Ordering::SeqCst);
        let state = if enabled { "enabled" } else { "disabled" };
        self.notify(format!("Mock data {state}."));
    }

    /// Drop any shown results and go back to the empty pane.
    pub fn clear(&self) {
        self.view.set_visibility(Visibility::Empty);
        self.transition(Phase::Idle);
    }

    pub async fn submit(&self, form: &QueryForm) -> SubmitOutcome {
        // A rejected form leaves an in-flight request and its phase alone.
        let in_flight = self.phase() == Phase::Loading;
        if !in_flight {
            self.transition(Phase::Validating);
        }

        let query = match form.validate() {
            Ok(query) => query,
            Err(err) => {
                tracing::info!(error = %err, "query rejected");
                self.notify(err.user_message());
                if !in_flight {
                    self.transition(Phase::Idle);
                }
                return SubmitOutcome::Invalid(err);
            }
        };

        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let kind = self.source_kind();
        let source = match kind {
            SourceKind::Mock => &self.mock,
            SourceKind::Network => &self.network,
        };

        self.view.set_visibility(Visibility::Loading);
        self.transition(Phase::Loading);
        tracing::debug!(token, source = %kind, location = %query.location, "loading forecast");

        let result = source.produce(&query).await;

        if !self.is_latest(token) {
            match &result {
                Ok(_) => tracing::warn!(token, "discarding superseded forecast response"),
                Err(err) => tracing::error!(
                    token,
                    error = %err,
                    source = %kind,
                    "superseded forecast request failed"
                ),
            }
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(raw) => {
                let dashboard = Dashboard::render(&normalize(raw));
                self.view.show_dashboard(&dashboard);
                self.view.set_visibility(Visibility::Results);
                self.transition(Phase::Rendered);
                tracing::info!(
                    location = %query.location,
                    badge = dashboard.badge.text,
                    "forecast rendered"
                );
                SubmitOutcome::Rendered(dashboard)
            }
            Err(err) => {
                tracing::error!(error = %err, source = %kind, "forecast request failed");
                self.view.set_visibility(Visibility::Empty);
                self.notify(err.user_message());
                self.transition(Phase::Failed);
                SubmitOutcome::Failed(err)
            }
        }
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    fn notify(&self, message: String) {
        self.view.notice(Notice::new(message, self.notice_duration));
    }

    fn transition(&self, next: Phase) {
        let mut phase = self.phase.lock();
        tracing::debug!(from = ?*phase, to = ?next, "orchestrator phase");
        *phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Query, RawForecast};
    use crate::source::mock::MockSource;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct RecordingView {
        visibility: Mutex<Vec<Visibility>>,
        notices: Mutex<Vec<Notice>>,
        dashboards: Mutex<Vec<Dashboard>>,
    }

    impl RecordingView {
        fn last_visibility(&self) -> Option<Visibility> {
            self.visibility.lock().last().copied()
        }

        fn notice_messages(&self) -> Vec<String> {
            self.notices.lock().iter().map(|n| n.message.clone()).collect()
        }
    }

    impl ViewSurface for RecordingView {
        fn set_visibility(&self, visibility: Visibility) {
            self.visibility.lock().push(visibility);
        }

        fn notice(&self, notice: Notice) {
            self.notices.lock().push(notice);
        }

        fn show_dashboard(&self, dashboard: &Dashboard) {
            self.dashboards.lock().push(dashboard.clone());
        }
    }

    /// Counts calls and answers with a fixed status or payload.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl ForecastSource for ScriptedSource {
        async fn produce(&self, query: &Query) -> Result<Option<RawForecast>, ForecastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(ForecastError::Backend {
                    status,
                    status_text: "Internal Server Error".into(),
                }),
                None => Ok(Some(RawForecast {
                    overall: Some("High".into()),
                    summary: Some(format!("Network forecast for {}", query.location)),
                    ..RawForecast::default()
                })),
            }
        }
    }

    /// Holds requests for "slow" locations until released. With `fail_slow`
    /// the held request fails once released.
    #[derive(Debug, Default)]
    struct GatedSource {
        gate: Notify,
        fail_slow: bool,
    }

    #[async_trait]
    impl ForecastSource for GatedSource {
        async fn produce(&self, query: &Query) -> Result<Option<RawForecast>, ForecastError> {
            if query.location == "slow" {
                self.gate.notified().await;
                if self.fail_slow {
                    return Err(ForecastError::Backend {
                        status: 503,
                        status_text: "Service Unavailable".into(),
                    });
                }
            }
            Ok(Some(RawForecast { summary: Some(query.location.clone()), ..RawForecast::default() }))
        }
    }

    fn paris() -> QueryForm {
        QueryForm::new("Paris", "2024-07-01", "14:00")
    }

    fn orchestrator(network: Arc<dyn ForecastSource>, view: Arc<RecordingView>) -> QueryOrchestrator {
        QueryOrchestrator::new(Arc::new(MockSource), network, view)
    }

    #[tokio::test]
    async fn empty_location_never_reaches_the_source() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(ScriptedSource::default());
        let orch = orchestrator(network.clone(), view.clone());

        let outcome = orch.submit(&QueryForm::new("", "2024-07-01", "14:00")).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ValidationError::MissingField("location"))));
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
        assert!(view.visibility.lock().is_empty());
        assert_eq!(view.notice_messages(), ["Please fill location, date and time."]);
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn mock_submission_renders_results() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(ScriptedSource::default());
        let orch = orchestrator(network.clone(), view.clone()).with_mock(true);

        let SubmitOutcome::Rendered(dashboard) = orch.submit(&paris()).await else {
            panic!("expected rendered outcome");
        };

        assert_eq!(dashboard.badge.text, "MODERATE");
        assert_eq!(dashboard.timeline.len(), 3);
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
        assert_eq!(*view.visibility.lock(), [Visibility::Loading, Visibility::Results]);
        assert_eq!(view.dashboards.lock().len(), 1);
        assert_eq!(orch.phase(), Phase::Rendered);
    }

    #[tokio::test]
    async fn backend_failure_reverts_to_empty_with_status_notice() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(ScriptedSource { fail_with: Some(500), ..Default::default() });
        let orch = orchestrator(network.clone(), view.clone());

        let outcome = orch.submit(&paris()).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ForecastError::Backend { status: 500, .. })));
        assert_eq!(network.calls.load(Ordering::SeqCst), 1);
        assert_eq!(view.last_visibility(), Some(Visibility::Empty));
        assert!(view.notice_messages().iter().any(|m| m.contains("500")));
        assert!(view.dashboards.lock().is_empty());
        assert_eq!(orch.phase(), Phase::Failed);
    }

    #[tokio::test]
    async fn toggle_takes_effect_on_next_submission() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(ScriptedSource::default());
        let orch = orchestrator(network.clone(), view.clone());

        let SubmitOutcome::Rendered(first) = orch.submit(&paris()).await else {
            panic!("expected rendered outcome");
        };
        assert_eq!(first.badge.text, "HIGH RISK");
        assert_eq!(network.calls.load(Ordering::SeqCst), 1);

        orch.set_mock(true);
        assert_eq!(orch.source_kind(), SourceKind::Mock);
        assert_eq!(view.notice_messages(), ["Mock data enabled."]);

        let SubmitOutcome::Rendered(second) = orch.submit(&paris()).await else {
            panic!("expected rendered outcome");
        };
        assert_eq!(second.badge.text, "MODERATE");
        assert_eq!(network.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_one() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(GatedSource::default());
        let orch = orchestrator(network.clone(), view.clone());

        let slow = QueryForm::new("slow", "2024-07-01", "14:00");
        let fast = QueryForm::new("fast", "2024-07-01", "15:00");

        let (stale, fresh) = tokio::join!(orch.submit(&slow), async {
            let outcome = orch.submit(&fast).await;
            network.gate.notify_one();
            outcome
        });

        assert!(matches!(stale, SubmitOutcome::Superseded));
        assert!(matches!(fresh, SubmitOutcome::Rendered(_)));

        let dashboards = view.dashboards.lock();
        assert_eq!(dashboards.len(), 1);
        assert_eq!(dashboards[0].summary, "fast");
        assert_eq!(view.last_visibility(), Some(Visibility::Results));
    }

    #[tokio::test]
    async fn superseded_failure_stays_off_the_view() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(GatedSource { fail_slow: true, ..Default::default() });
        let orch = orchestrator(network.clone(), view.clone());

        let slow = QueryForm::new("slow", "2024-07-01", "14:00");
        let fast = QueryForm::new("fast", "2024-07-01", "15:00");

        let (stale, fresh) = tokio::join!(orch.submit(&slow), async {
            let outcome = orch.submit(&fast).await;
            network.gate.notify_one();
            outcome
        });

        assert!(matches!(stale, SubmitOutcome::Superseded));
        assert!(matches!(fresh, SubmitOutcome::Rendered(_)));
        assert!(view.notice_messages().is_empty());
        assert_eq!(view.last_visibility(), Some(Visibility::Results));
        assert_eq!(orch.phase(), Phase::Rendered);
    }

    #[tokio::test]
    async fn invalid_submission_keeps_loading_phase() {
        let view = Arc::new(RecordingView::default());
        let network = Arc::new(GatedSource::default());
        let orch = orchestrator(network.clone(), view.clone());

        let slow = QueryForm::new("slow", "2024-07-01", "14:00");
        let blank = QueryForm::new("", "2024-07-01", "14:00");

        let (first, second) = tokio::join!(orch.submit(&slow), async {
            tokio::task::yield_now().await;
            assert_eq!(orch.phase(), Phase::Loading);

            let outcome = orch.submit(&blank).await;
            assert_eq!(orch.phase(), Phase::Loading);
            assert_eq!(view.last_visibility(), Some(Visibility::Loading));

            network.gate.notify_one();
            outcome
        });

        assert!(matches!(second, SubmitOutcome::Invalid(_)));
        assert!(matches!(first, SubmitOutcome::Rendered(_)));
        assert_eq!(view.notice_messages(), ["Please fill location, date and time."]);
        assert_eq!(orch.phase(), Phase::Rendered);
    }

    #[tokio::test]
    async fn clear_returns_to_empty() {
        let view = Arc::new(RecordingView::default());
        let orch = orchestrator(Arc::new(ScriptedSource::default()), view.clone()).with_mock(true);

        orch.submit(&paris()).await;
        orch.clear();

        assert_eq!(view.last_visibility(), Some(Visibility::Empty));
        assert_eq!(orch.phase(), Phase::Idle);
    }
}
