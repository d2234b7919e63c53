use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fakefinder_core::model::{QuizSettings, Side};

use super::service::{QuizSession, SessionState};
use super::view::{AnswerFeedback, FinalReport, RoundView};
use crate::Clock;
use crate::catalog_service::{CatalogHandle, CatalogNotice, LoadedCatalog};
use crate::error::SessionError;
use crate::sequencer::RoundSequencer;

/// Where a restart lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartTarget {
    /// Fresh rounds, back on the welcome screen.
    Welcome,
    /// Fresh rounds, straight into the first round.
    Play,
}

/// User intents a renderer forwards to the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizIntent {
    Start,
    Select(Side),
    Advance,
    Restart(RestartTarget),
    GoHome,
}

/// What the renderer should show after an intent was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizUpdate {
    Round(RoundView),
    Answered(AnswerFeedback),
    Finished(FinalReport),
    Home,
}

/// Drives a `QuizSession` from user intents.
///
/// Owns the randomness source and clock so every transition is reproducible with a
/// seeded generator and a fixed clock.
pub struct QuizService<R = StdRng> {
    settings: QuizSettings,
    catalog: CatalogHandle,
    sequencer: RoundSequencer,
    session: QuizSession,
    rng: R,
    clock: Clock,
}

impl QuizService<StdRng> {
    /// Service seeded from the operating system.
    #[must_use]
    pub fn new(settings: QuizSettings, catalog: CatalogHandle) -> Self {
        Self::with_rng(settings, catalog, StdRng::from_os_rng())
    }

    /// Service with a deterministic round sequence.
    #[must_use]
    pub fn seeded(settings: QuizSettings, catalog: CatalogHandle, seed: u64) -> Self {
        Self::with_rng(settings, catalog, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuizService<R> {
    #[must_use]
    pub fn with_rng(settings: QuizSettings, catalog: CatalogHandle, rng: R) -> Self {
        let sequencer = RoundSequencer::from_settings(&settings);
        let session = QuizSession::new(*settings.tiers());
        Self {
            settings,
            catalog,
            sequencer,
            session,
            rng,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_catalog_ready(&self) -> bool {
        self.catalog.is_ready()
    }

    /// Degraded-mode notice for the UI, if the fallback catalog is in use.
    #[must_use]
    pub fn catalog_notice(&self) -> Option<CatalogNotice> {
        self.catalog.current().and_then(|loaded| loaded.notice)
    }

    /// Apply one intent.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` of the underlying transition. The session is left
    /// unchanged on error.
    pub fn apply(&mut self, intent: QuizIntent) -> Result<QuizUpdate, SessionError> {
        match intent {
            QuizIntent::Start => self.start().map(QuizUpdate::Round),
            QuizIntent::Select(side) => self.select_answer(side).map(QuizUpdate::Answered),
            QuizIntent::Advance => self.advance(),
            QuizIntent::Restart(target) => self.restart(target),
            QuizIntent::GoHome => {
                self.go_home();
                Ok(QuizUpdate::Home)
            }
        }
    }

    /// Begin the quiz, generating rounds first if the session has none.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotReady` while the catalog is loading,
    /// `SessionError::InsufficientData` if no pairs are available and
    /// `SessionError::InvalidTransition` outside the welcome screen.
    pub fn start(&mut self) -> Result<RoundView, SessionError> {
        if self.session.state() == SessionState::Welcome && !self.session.has_rounds() {
            let loaded = self.catalog.current().ok_or(SessionError::NotReady)?;
            self.prepare_rounds(&loaded)?;
        }
        self.session.start(self.clock.now())?;
        self.round_view()
    }

    /// Wait for the catalog, then `start`.
    ///
    /// # Errors
    ///
    /// Same as `start`, except `NotReady`.
    pub async fn start_when_ready(&mut self) -> Result<RoundView, SessionError> {
        if self.session.state() == SessionState::Welcome && !self.session.has_rounds() {
            let loaded = self.catalog.wait().await;
            self.prepare_rounds(&loaded)?;
        }
        self.start()
    }

    /// # Errors
    ///
    /// Returns `SessionError::DuplicateSelection` if the round is already answered and
    /// `SessionError::InvalidTransition` outside a round.
    pub fn select_answer(&mut self, side: Side) -> Result<AnswerFeedback, SessionError> {
        let record = self.session.select_answer(side)?.clone();
        Ok(AnswerFeedback::new(&record, &self.session))
    }

    /// Move to the next round, or to the results after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the current round is answered.
    pub fn advance(&mut self) -> Result<QuizUpdate, SessionError> {
        match self.session.advance(self.clock.now())? {
            SessionState::Finished => self.final_report().map(QuizUpdate::Finished),
            _ => self.round_view().map(QuizUpdate::Round),
        }
    }

    /// Regenerate rounds and reset the score. Valid from any state.
    ///
    /// While the catalog is still loading, rounds are generated on the next start.
    ///
    /// # Errors
    ///
    /// `RestartTarget::Play` fails like `start`.
    pub fn restart(&mut self, target: RestartTarget) -> Result<QuizUpdate, SessionError> {
        match self.catalog.current() {
            Some(loaded) => self.prepare_rounds(&loaded)?,
            None => self.session.reset(Vec::new()),
        }
        tracing::debug!(?target, "quiz restarted");
        match target {
            RestartTarget::Welcome => Ok(QuizUpdate::Home),
            RestartTarget::Play => self.start().map(QuizUpdate::Round),
        }
    }

    /// Restart straight into the first round.
    ///
    /// # Errors
    ///
    /// Fails like `start`.
    pub fn play_again(&mut self) -> Result<RoundView, SessionError> {
        match self.restart(RestartTarget::Play)? {
            QuizUpdate::Round(view) => Ok(view),
            _ => self.round_view(),
        }
    }

    /// Abandon the session. Rounds regenerate on the next start.
    pub fn go_home(&mut self) {
        self.session.go_home();
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is finished.
    pub fn final_report(&self) -> Result<FinalReport, SessionError> {
        Ok(self.session.build_summary()?.into())
    }

    fn round_view(&self) -> Result<RoundView, SessionError> {
        RoundView::from_session(&self.session).ok_or(SessionError::Empty)
    }

    fn prepare_rounds(&mut self, loaded: &LoadedCatalog) -> Result<(), SessionError> {
        let count = usize::try_from(self.settings.total_rounds()).unwrap_or(usize::MAX);
        let plan = self
            .sequencer
            .generate(loaded.catalog.pairs(), count, &mut self.rng)?;
        tracing::debug!(
            rounds = plan.len(),
            distinct = plan.distinct_pairs,
            repeated = plan.repeated,
            degraded = loaded.is_degraded(),
            "rounds generated"
        );
        self.session.reset(plan.rounds);
        Ok(())
    }
}

impl<R> std::fmt::Debug for QuizService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizService")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogLoadError;
    use fakefinder_core::model::{Catalog, CatalogError, ImagePairDraft, QuizSettingsDraft};
    use fakefinder_core::time::fixed_now;

    fn catalog(n: usize) -> CatalogHandle {
        let drafts = (0..n).map(|i| {
            ImagePairDraft::new(format!("pair_{i}"), format!("real_{i}.jpg"), format!("fake_{i}.jpg"))
        });
        let (catalog, report) = Catalog::from_drafts(drafts).unwrap();
        CatalogHandle::ready(LoadedCatalog::new(catalog, &report))
    }

    fn service(rounds: u32, pairs: usize) -> QuizService {
        let settings = QuizSettingsDraft::new()
            .with_total_rounds(rounds)
            .validate()
            .unwrap();
        QuizService::seeded(settings, catalog(pairs), 11).with_clock(Clock::fixed(fixed_now()))
    }

    #[test]
    fn start_while_loading_is_not_ready() {
        let (_publisher, handle) = CatalogHandle::pending();
        let mut service = QuizService::seeded(QuizSettings::default(), handle, 1);
        assert_eq!(service.start().unwrap_err(), SessionError::NotReady);
        assert_eq!(service.session().state(), SessionState::Welcome);
        assert!(service.catalog_notice().is_none());
    }

    #[test]
    fn start_generates_rounds_lazily() {
        let mut service = service(4, 10);
        assert!(!service.session().has_rounds());

        let view = service.start().unwrap();
        assert_eq!(view.round_number, 1);
        assert_eq!(view.total_rounds, 4);
        assert_eq!(service.session().rounds().len(), 4);
    }

    #[test]
    fn select_reports_feedback_and_advance_moves_on() {
        let mut service = service(2, 5);
        service.start().unwrap();
        let synthetic = service.session().current_round().unwrap().synthetic_side();

        let feedback = service.select_answer(synthetic).unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.message, "Correct! You identified the deepfake!");
        assert_eq!(feedback.percentage, 50);

        match service.advance().unwrap() {
            QuizUpdate::Round(view) => assert_eq!(view.round_number, 2),
            other => panic!("expected next round, got {other:?}"),
        }
    }

    #[test]
    fn last_advance_finishes_with_report() {
        let mut service = service(1, 3);
        service.start().unwrap();
        service.select_answer(Side::Left).unwrap();
        let update = service.advance().unwrap();
        assert!(matches!(update, QuizUpdate::Finished(_)));
        assert!(service.session().is_complete());
    }

    #[test]
    fn restart_to_welcome_regenerates_rounds() {
        let mut service = service(3, 10);
        service.start().unwrap();
        service.select_answer(Side::Right).unwrap();

        let update = service.restart(RestartTarget::Welcome).unwrap();
        assert_eq!(update, QuizUpdate::Home);
        assert_eq!(service.session().state(), SessionState::Welcome);
        assert_eq!(service.session().rounds().len(), 3);
        assert_eq!(service.session().score(), 0);
    }

    #[test]
    fn play_again_goes_straight_into_a_round() {
        let mut service = service(2, 10);
        service.start().unwrap();
        service.select_answer(Side::Left).unwrap();
        service.advance().unwrap();
        service.select_answer(Side::Left).unwrap();
        service.advance().unwrap();

        let view = service.play_again().unwrap();
        assert_eq!(view.round_number, 1);
        assert_eq!(view.score, 0);
        assert_eq!(service.session().state(), SessionState::InProgress);
    }

    #[test]
    fn go_home_drops_rounds_until_next_start() {
        let mut service = service(3, 10);
        service.start().unwrap();
        assert_eq!(service.apply(QuizIntent::GoHome).unwrap(), QuizUpdate::Home);
        assert!(!service.session().has_rounds());

        service.apply(QuizIntent::Start).unwrap();
        assert_eq!(service.session().rounds().len(), 3);
    }

    #[test]
    fn rejected_intent_leaves_session_unchanged() {
        let mut service = service(2, 10);
        let err = service.apply(QuizIntent::Advance).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(service.session().state(), SessionState::Welcome);
    }

    #[test]
    fn degraded_catalog_is_reported() {
        let err = CatalogLoadError::Invalid(CatalogError::Empty);
        let handle = CatalogHandle::ready(LoadedCatalog::fallback(&err));
        let mut service = QuizService::seeded(QuizSettings::default(), handle, 3);

        assert!(service.catalog_notice().is_some());
        service.start().unwrap();
        assert_eq!(service.session().rounds().len(), 10);
    }
}
