//! The game session controller.
//!
//! `GameController` owns the live `Session` and the best score, sequences
//! calls to the card service and runs their results through the pure
//! transitions in `rules`. All operations take `&self` so the controller can
//! be shared as `Arc<GameController>` between an input loop and the tasks it
//! spawns.
//!
//! ## Ordering
//!
//! - `start`, `draw` and `guess` hold a busy flag while they wait on the
//!   service; a second operation arriving meanwhile gets `GameError::Busy`
//!   and never reaches the service
//! - `stop`/`end` never wait and are always accepted. Ending a session
//!   frees the busy flag, so `start` is available at once even if a call
//!   from the ended session is still out
//! - A service result is applied only if the session it was issued for is
//!   still running (same epoch); otherwise it is dropped
//!
//! ## Failures
//!
//! A failed or timed-out service call leaves the session exactly as it
//! was, emits an error feedback and releases the busy flag. Nothing is
//! retried automatically.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::guard::{BusyGuard, BusySlot};
use crate::assets::{AssetLoader, NoopAssetLoader};
use crate::core::{Card, DeckId, GameConfig, GameError, RoundRecord, ServiceCall, ServiceError, Session};
use crate::events::{FeedbackKind, GameEvent, Presenter};
use crate::rules::{self, Direction, Draw, Outcome, Step};
use crate::service::{CardService, Drawn};
use crate::store::BestScore;

/// Result of `draw`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// A new face-up card.
    Revealed(Card),
    /// The deck was empty; the session has ended.
    Exhausted,
    /// The session was stopped while the draw was in flight.
    Discarded,
}

/// Result of `guess`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess was judged. `session_ended` is set when that was the last
    /// card.
    Judged {
        round: RoundRecord,
        session_ended: bool,
    },
    /// There was no face-up card to compare against; the drawn card was
    /// only revealed.
    Revealed(Card),
    /// The deck was empty; the session has ended.
    Exhausted,
    /// The session was stopped while the guess was in flight.
    Discarded,
}

/// Game session controller.
pub struct GameController {
    config: GameConfig,
    service: Arc<dyn CardService>,
    assets: Arc<dyn AssetLoader>,
    presenter: Arc<dyn Presenter>,
    best: BestScore,
    session: Mutex<Session>,
    busy: BusySlot,
}

impl GameController {
    /// Create an idle controller. Images are not preloaded until an
    /// `AssetLoader` is supplied with `with_assets`.
    #[must_use]
    pub fn new(
        config: GameConfig,
        service: Arc<dyn CardService>,
        presenter: Arc<dyn Presenter>,
        best: BestScore,
    ) -> Self {
        Self {
            config,
            service,
            assets: Arc::new(NoopAssetLoader),
            presenter,
            best,
            session: Mutex::new(Session::idle()),
            busy: BusySlot::new(),
        }
    }

    /// Preload card images with `assets` before revealing them.
    #[must_use]
    pub fn with_assets(mut self, assets: Arc<dyn AssetLoader>) -> Self {
        self.assets = assets;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.lock().running
    }

    /// True while an operation is waiting on the service.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_held()
    }

    #[must_use]
    pub fn best_score(&self) -> i32 {
        self.best.get()
    }

    /// Bring a fresh presenter up to date: controls and numeric displays.
    pub fn present_current(&self) {
        let session = self.session();
        self.emit(GameEvent::Controls {
            running: session.running,
        });
        if let Some(card) = &session.current_card {
            self.emit(GameEvent::CardRevealed { card: card.clone() });
        }
        self.emit(self.scoreboard(&session));
        self.emit(GameEvent::Stats(session.tally));
    }

    // === Operations ===

    /// Shuffle a new deck and reveal its first card.
    ///
    /// Nothing is committed until both the shuffle and the first draw have
    /// succeeded; on failure the previous session is left untouched.
    pub async fn start(&self) -> Result<Card, GameError> {
        if self.is_running() {
            return Err(GameError::AlreadyRunning);
        }
        let _busy = self.acquire()?;

        self.emit(GameEvent::Loading { active: true });
        let result = self.start_inner().await;
        self.emit(GameEvent::Loading { active: false });

        if let Err(err) = &result {
            self.report(err, "Could not start the game");
        }
        result
    }

    async fn start_inner(&self) -> Result<Card, GameError> {
        let deck = self
            .call(ServiceCall::Shuffle, self.service.shuffle_new_deck(self.config.deck_count))
            .await?;
        let epoch = self.session.lock().epoch + 1;
        let fresh = rules::begin_session(deck.id.clone(), deck.remaining, epoch);

        let drawn = self
            .call(ServiceCall::Draw, self.service.draw(&deck.id, 1))
            .await?;
        let Step { session, .. } = rules::apply_draw(fresh, into_draw(drawn));
        let Some(card) = session.current_card.clone() else {
            return Err(GameError::unavailable(
                ServiceCall::Draw,
                ServiceError::Decode(format!("new deck {} dealt no cards", deck.id)),
            ));
        };
        self.preload(&card).await;

        let board = self.scoreboard(&session);
        *self.session.lock() = session;
        info!(deck = %deck.id, epoch, "session started");

        self.emit(GameEvent::StatsReset);
        self.emit(GameEvent::Controls { running: true });
        self.emit(GameEvent::CardRevealed { card: card.clone() });
        self.emit(board);
        Ok(card)
    }

    /// Reveal the next card without judging it.
    pub async fn draw(&self) -> Result<DrawOutcome, GameError> {
        let (deck, epoch) = self.running_deck()?;
        let _busy = self.acquire()?;

        self.emit(GameEvent::Loading { active: true });
        let result = self.draw_inner(&deck, epoch).await;
        if !self.superseded(epoch) {
            self.emit(GameEvent::Loading { active: false });
        }

        if let Err(err) = &result {
            self.report(err, "Could not draw a card");
        }
        result
    }

    async fn draw_inner(&self, deck: &DeckId, epoch: u64) -> Result<DrawOutcome, GameError> {
        let drawn = self.call(ServiceCall::Draw, self.service.draw(deck, 1)).await?;
        let draw = into_draw(drawn);
        if let Some(card) = &draw.card {
            self.preload(card).await;
        }

        let (exhausted, card, board) = {
            let mut session = self.session.lock();
            if !session.accepts(epoch) {
                debug!(epoch, "late draw result dropped");
                return Ok(DrawOutcome::Discarded);
            }
            let step = rules::apply_draw(std::mem::take(&mut *session), draw);
            let out = (
                step.exhausted,
                step.session.current_card.clone(),
                self.scoreboard(&step.session),
            );
            *session = step.session;
            out
        };

        if exhausted {
            self.end();
            return Ok(DrawOutcome::Exhausted);
        }
        let Some(card) = card else {
            return Ok(DrawOutcome::Exhausted);
        };
        debug!(card = %card, "card drawn");
        self.emit(GameEvent::CardRevealed { card: card.clone() });
        self.emit(board);
        Ok(DrawOutcome::Revealed(card))
    }

    /// Guess whether the next card is higher or lower than the face-up one.
    pub async fn guess(&self, direction: Direction) -> Result<GuessOutcome, GameError> {
        let (deck, epoch) = self.running_deck()?;
        let _busy = self.acquire()?;

        self.emit(GameEvent::GuessControls { enabled: false });
        self.emit(GameEvent::Loading { active: true });
        let result = self.guess_inner(direction, &deck, epoch).await;
        // A newer session owns the controls now.
        if !self.superseded(epoch) {
            self.emit(GameEvent::Loading { active: false });
            self.emit(GameEvent::GuessControls {
                enabled: self.is_running(),
            });
        }

        if let Err(err) = &result {
            self.report(err, "Could not check your guess");
        }
        result
    }

    async fn guess_inner(
        &self,
        direction: Direction,
        deck: &DeckId,
        epoch: u64,
    ) -> Result<GuessOutcome, GameError> {
        let drawn = self.call(ServiceCall::Guess, self.service.draw(deck, 1)).await?;
        let draw = into_draw(drawn);
        if let Some(card) = &draw.card {
            self.preload(card).await;
        }

        let (step_round, exhausted, card, board, tally) = {
            let mut session = self.session.lock();
            if !session.accepts(epoch) {
                debug!(epoch, "late guess result dropped");
                return Ok(GuessOutcome::Discarded);
            }
            let step = rules::apply_guess(std::mem::take(&mut *session), direction, draw);
            let out = (
                step.round,
                step.exhausted,
                step.session.current_card.clone(),
                self.scoreboard(&step.session),
                step.session.tally,
            );
            *session = step.session;
            out
        };

        let Some(round) = step_round else {
            return match card {
                Some(card) if !exhausted => {
                    self.emit(GameEvent::CardRevealed { card: card.clone() });
                    self.emit(board);
                    Ok(GuessOutcome::Revealed(card))
                }
                _ => {
                    self.end();
                    Ok(GuessOutcome::Exhausted)
                }
            };
        };

        debug!(
            previous = %round.previous,
            drawn = %round.drawn,
            %direction,
            outcome = ?round.outcome,
            score = round.score_after,
            "guess judged"
        );
        self.emit(outcome_feedback(round.outcome));
        self.emit(GameEvent::CardRevealed {
            card: round.drawn.clone(),
        });
        self.emit(board);
        self.emit(GameEvent::Stats(tally));

        if exhausted {
            if !self.config.exhaustion_delay.is_zero() {
                tokio::time::sleep(self.config.exhaustion_delay).await;
            }
            if self.session.lock().accepts(epoch) {
                self.end();
            }
        }
        Ok(GuessOutcome::Judged {
            round,
            session_ended: exhausted,
        })
    }

    /// User-initiated end of the session.
    pub fn stop(&self) -> Option<i32> {
        self.end()
    }

    /// End the session: stop accepting guesses, release the deck and raise
    /// the best score if it was beaten. Returns the final score, or `None`
    /// if no session was running.
    pub fn end(&self) -> Option<i32> {
        let final_score = {
            let mut session = self.session.lock();
            let (next, final_score) = rules::end_session(std::mem::take(&mut *session));
            *session = next;
            final_score
        }?;
        // Any call still out belongs to the ended session and will be
        // discarded; it must not hold up the next start.
        self.busy.release();

        let record = self.best.offer(final_score);
        info!(final_score, record, "session ended");
        if record {
            self.emit(GameEvent::NewRecord { score: final_score });
            self.emit(GameEvent::feedback(
                FeedbackKind::Success,
                format!("New record: {final_score}!"),
            ));
        }

        let session = self.session();
        self.emit(GameEvent::Controls { running: false });
        self.emit(self.scoreboard(&session));
        self.emit(GameEvent::SessionEnded { final_score });
        Some(final_score)
    }

    // === Helpers ===

    fn acquire(&self) -> Result<BusyGuard<'_>, GameError> {
        self.busy.try_acquire().ok_or(GameError::Busy)
    }

    /// A session newer than `epoch` has started.
    fn superseded(&self, epoch: u64) -> bool {
        self.session.lock().epoch != epoch
    }

    fn running_deck(&self) -> Result<(DeckId, u64), GameError> {
        let session = self.session.lock();
        match (&session.deck_id, session.running) {
            (Some(deck), true) => Ok((deck.clone(), session.epoch)),
            _ => Err(GameError::NotRunning),
        }
    }

    /// Run one service call under the configured timeout.
    async fn call<T>(
        &self,
        call: ServiceCall,
        fut: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, GameError> {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(|err| GameError::unavailable(call, err)),
            Err(_) => Err(GameError::unavailable(call, ServiceError::Timeout(limit))),
        }
    }

    /// Best-effort image preload; a failure only costs a visible fetch.
    async fn preload(&self, card: &Card) {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, self.assets.preload(card)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!(card = %card, error = %err, "image preload failed"),
            Err(_) => debug!(card = %card, "image preload timed out"),
        }
    }

    fn scoreboard(&self, session: &Session) -> GameEvent {
        GameEvent::Scoreboard {
            score: session.score,
            remaining: session.remaining,
            best_score: self.best.get(),
        }
    }

    fn report(&self, err: &GameError, message: &str) {
        if err.is_service_unavailable() {
            tracing::warn!(error = %err, "{message}");
            self.emit(GameEvent::feedback(FeedbackKind::Error, message));
        }
    }

    fn emit(&self, event: GameEvent) {
        self.presenter.present(&event);
    }
}

impl std::fmt::Debug for GameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("session", &*self.session.lock())
            .field("best", &self.best)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

fn into_draw(drawn: Drawn) -> Draw {
    let remaining = drawn.remaining;
    Draw {
        card: drawn.into_first(),
        remaining,
    }
}

fn outcome_feedback(outcome: Outcome) -> GameEvent {
    match outcome {
        Outcome::Correct => GameEvent::feedback(FeedbackKind::Success, "Correct! +1"),
        Outcome::Incorrect => GameEvent::feedback(FeedbackKind::Error, "Wrong! -1"),
        Outcome::Tie => GameEvent::feedback(FeedbackKind::Tie, "Tie!"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rank, Suit, Tally};
    use crate::events::RecordingPresenter;
    use crate::service::local::LocalFault;
    use crate::service::{Deck, LocalDeckService};
    use async_trait::async_trait;

    fn controller(service: Arc<dyn CardService>) -> (GameController, Arc<RecordingPresenter>) {
        let presenter = Arc::new(RecordingPresenter::new());
        let controller = GameController::new(
            GameConfig::for_tests(),
            service,
            presenter.clone(),
            BestScore::in_memory(),
        );
        (controller, presenter)
    }

    fn scripted(codes: &[&str]) -> Arc<LocalDeckService> {
        Arc::new(LocalDeckService::from_codes(codes).unwrap())
    }

    /// Shuffles fine, never answers a draw.
    struct HangingDraws;

    #[async_trait]
    impl CardService for HangingDraws {
        async fn shuffle_new_deck(&self, _deck_count: u8) -> Result<Deck, ServiceError> {
            Ok(Deck {
                id: DeckId::new("hang"),
                remaining: 52,
            })
        }

        async fn draw(&self, _deck: &DeckId, _count: u8) -> Result<Drawn, ServiceError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_start_reveals_first_card() {
        let (game, presenter) = controller(scripted(&["5S", "9H", "2C"]));

        let card = game.start().await.unwrap();

        assert_eq!(card, Card::new(Rank::Five, Suit::Spades));
        let session = game.session();
        assert!(session.running);
        assert_eq!(session.epoch, 1);
        assert_eq!(session.remaining, 2);
        assert_eq!(session.score, 0);
        assert!(!game.is_busy());
        assert_eq!(
            presenter.events(),
            vec![
                GameEvent::Loading { active: true },
                GameEvent::StatsReset,
                GameEvent::Controls { running: true },
                GameEvent::CardRevealed { card: card.clone() },
                GameEvent::Scoreboard {
                    score: 0,
                    remaining: 2,
                    best_score: 0
                },
                GameEvent::Loading { active: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_start_while_running_is_rejected() {
        let service = scripted(&["5S", "9H", "2C"]);
        let (game, _) = controller(service.clone());
        game.start().await.unwrap();

        let err = game.start().await.unwrap_err();
        assert!(matches!(err, GameError::AlreadyRunning));
        assert_eq!(service.shuffle_calls(), 1);
    }

    #[tokio::test]
    async fn test_operations_need_a_running_session() {
        let (game, _) = controller(scripted(&["5S"]));

        assert!(matches!(game.draw().await, Err(GameError::NotRunning)));
        assert!(matches!(
            game.guess(Direction::Higher).await,
            Err(GameError::NotRunning)
        ));
        assert_eq!(game.end(), None);
    }

    #[tokio::test]
    async fn test_guess_event_order() {
        let (game, presenter) = controller(scripted(&["5S", "9H", "2C"]));
        game.start().await.unwrap();
        presenter.take();

        let outcome = game.guess(Direction::Higher).await.unwrap();

        let GuessOutcome::Judged { round, session_ended } = outcome else {
            panic!("expected a judged guess, got {outcome:?}");
        };
        assert_eq!(round.outcome, Outcome::Correct);
        assert!(!session_ended);

        let mut tally = Tally::default();
        tally.record(Outcome::Correct);
        assert_eq!(
            presenter.events(),
            vec![
                GameEvent::GuessControls { enabled: false },
                GameEvent::Loading { active: true },
                GameEvent::feedback(FeedbackKind::Success, "Correct! +1"),
                GameEvent::CardRevealed {
                    card: Card::new(Rank::Nine, Suit::Hearts)
                },
                GameEvent::Scoreboard {
                    score: 1,
                    remaining: 1,
                    best_score: 0
                },
                GameEvent::Stats(tally),
                GameEvent::Loading { active: false },
                GameEvent::GuessControls { enabled: true },
            ]
        );
    }

    #[tokio::test]
    async fn test_draw_reveals_without_judging() {
        let (game, _) = controller(scripted(&["5S", "9H", "2C"]));
        game.start().await.unwrap();

        let outcome = game.draw().await.unwrap();

        assert_eq!(outcome, DrawOutcome::Revealed(Card::new(Rank::Nine, Suit::Hearts)));
        let session = game.session();
        assert_eq!(session.tally.total(), 0);
        assert_eq!(session.score, 0);
        assert_eq!(session.remaining, 1);
    }

    #[tokio::test]
    async fn test_last_card_ends_session() {
        let (game, presenter) = controller(scripted(&["5S", "9H"]));
        game.start().await.unwrap();

        let outcome = game.guess(Direction::Lower).await.unwrap();

        assert!(matches!(
            outcome,
            GuessOutcome::Judged {
                session_ended: true,
                ..
            }
        ));
        assert!(!game.is_running());
        assert_eq!(game.best_score(), 0);
        assert!(presenter.any(|e| *e == GameEvent::SessionEnded { final_score: -1 }));
        assert_eq!(
            presenter.events().last(),
            Some(&GameEvent::GuessControls { enabled: false })
        );
    }

    #[tokio::test]
    async fn test_new_record_on_end() {
        let (game, presenter) = controller(scripted(&["5S", "9H"]));
        game.start().await.unwrap();

        game.guess(Direction::Higher).await.unwrap();

        assert_eq!(game.best_score(), 1);
        assert!(presenter.any(|e| *e == GameEvent::NewRecord { score: 1 }));
        assert_eq!(
            presenter.feedback(FeedbackKind::Success),
            vec!["Correct! +1".to_string(), "New record: 1!".to_string()]
        );
    }

    #[tokio::test]
    async fn test_draw_on_empty_deck_ends_session() {
        let (game, _) = controller(scripted(&["5S"]));
        game.start().await.unwrap();
        assert_eq!(game.session().remaining, 0);

        let outcome = game.draw().await.unwrap();

        assert_eq!(outcome, DrawOutcome::Exhausted);
        assert!(!game.is_running());
    }

    #[tokio::test]
    async fn test_failed_start_leaves_session_idle() {
        let service = scripted(&["5S", "9H"]);
        service.fail_next(LocalFault::Shuffle);
        let (game, presenter) = controller(service.clone());

        let err = game.start().await.unwrap_err();

        assert!(matches!(
            err,
            GameError::ServiceUnavailable {
                call: ServiceCall::Shuffle,
                ..
            }
        ));
        assert_eq!(game.session(), Session::idle());
        assert!(!game.is_busy());
        assert_eq!(
            presenter.feedback(FeedbackKind::Error),
            vec!["Could not start the game".to_string()]
        );

        // Retrying works once the service is back.
        assert!(game.start().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_guess_changes_nothing() {
        let service = scripted(&["5S", "9H", "2C"]);
        let (game, presenter) = controller(service.clone());
        game.start().await.unwrap();
        let before = game.session();

        service.fail_next(LocalFault::Draw);
        let err = game.guess(Direction::Higher).await.unwrap_err();

        assert!(err.is_service_unavailable());
        assert_eq!(game.session(), before);
        assert!(!game.is_busy());
        assert_eq!(
            presenter.feedback(FeedbackKind::Error),
            vec!["Could not check your guess".to_string()]
        );
        assert!(game.guess(Direction::Higher).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_service_times_out() {
        let (game, _) = controller(Arc::new(HangingDraws));

        let err = game.start().await.unwrap_err();

        match err {
            GameError::ServiceUnavailable { call, source } => {
                assert_eq!(call, ServiceCall::Draw);
                assert!(matches!(source, ServiceError::Timeout(_)));
            }
            other => panic!("expected a timeout, got {other:?}"),
        }
        assert!(!game.is_running());
        assert!(!game.is_busy());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (game, presenter) = controller(scripted(&["5S", "9H", "2C"]));
        game.start().await.unwrap();
        game.guess(Direction::Higher).await.unwrap();

        assert_eq!(game.stop(), Some(1));
        let events = presenter.events().len();
        assert_eq!(game.stop(), None);
        assert_eq!(game.end(), None);
        assert_eq!(presenter.events().len(), events);
        assert!(game.session().deck_id.is_none());
    }
}
