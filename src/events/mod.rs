//! Presentation events.
//!
//! The controller never renders anything. It reports state changes as
//! `GameEvent`s to a `Presenter`, which decides how to show them: a
//! terminal UI, a log, or a test recorder.
//!
//! ## Event Order
//!
//! A successful guess emits, in order:
//! `GuessControls{false}`, `Loading{true}`, `Feedback`, `CardRevealed`,
//! `Scoreboard`, `Stats`, `Loading{false}`, `GuessControls{true}`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{Card, Tally};

/// Tone of a transient feedback message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackKind {
    Success,
    Error,
    Tie,
    Info,
}

/// Something the presentation layer should reflect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Busy indicator on or off.
    Loading { active: bool },

    /// Start/stop controls. While not running the start control and the
    /// statistics chart are shown; while running the game area and stop.
    Controls { running: bool },

    /// Enable or disable the higher/lower controls around a guess.
    GuessControls { enabled: bool },

    /// A new face-up card, image already preloaded.
    CardRevealed { card: Card },

    /// Transient message.
    Feedback { kind: FeedbackKind, message: String },

    /// Numeric displays.
    Scoreboard {
        score: i32,
        remaining: u8,
        best_score: i32,
    },

    /// Correct/incorrect/tie buckets.
    Stats(Tally),

    /// Statistics chart cleared for a new session.
    StatsReset,

    /// A finished session beat the best score.
    NewRecord { score: i32 },

    /// The session is over.
    SessionEnded { final_score: i32 },
}

impl GameEvent {
    #[must_use]
    pub fn feedback(kind: FeedbackKind, message: impl Into<String>) -> Self {
        GameEvent::Feedback {
            kind,
            message: message.into(),
        }
    }
}

/// Receiver of game events.
pub trait Presenter: Send + Sync {
    fn present(&self, event: &GameEvent);
}

/// Presenter that keeps every event, for tests and replays.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events so far.
    #[must_use]
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all events so far.
    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Feedback messages of the given kind.
    #[must_use]
    pub fn feedback(&self, kind: FeedbackKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                GameEvent::Feedback { kind: k, message } if *k == kind => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// True if any recorded event satisfies `pred`.
    #[must_use]
    pub fn any(&self, pred: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.lock().iter().any(pred)
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, event: &GameEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_presenter() {
        let presenter = RecordingPresenter::new();
        presenter.present(&GameEvent::Loading { active: true });
        presenter.present(&GameEvent::feedback(FeedbackKind::Tie, "Tie!"));
        presenter.present(&GameEvent::feedback(FeedbackKind::Error, "Wrong! -1"));

        assert_eq!(presenter.events().len(), 3);
        assert_eq!(presenter.feedback(FeedbackKind::Tie), vec!["Tie!".to_string()]);
        assert!(presenter.any(|e| matches!(e, GameEvent::Loading { active: true })));

        let taken = presenter.take();
        assert_eq!(taken.len(), 3);
        assert!(presenter.events().is_empty());
    }

    #[test]
    fn test_event_serde_tag() {
        let json = serde_json::to_string(&GameEvent::NewRecord { score: 4 }).unwrap();
        assert_eq!(json, r#"{"type":"new_record","score":4}"#);
    }
}
