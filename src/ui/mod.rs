//! Terminal presenter.
//!
//! Renders `GameEvent`s as lines of text. The terminal is in raw mode while
//! the game runs, so every line ends with `\r\n`. The statistics chart is
//! only drawn between sessions, never during play.
//!
//! The loading indicator has no line break of its own. It sits on the
//! cursor line until it is cleared, either by `Loading{false}` or by the
//! next line printed while it is up.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use parking_lot::Mutex;
use tracing::debug;

use crate::core::{Card, Tally, FULL_DECK};
use crate::events::{FeedbackKind, GameEvent, Presenter};

/// Widest bar in the statistics chart, in cells.
const CHART_WIDTH: usize = 30;

const HELP_IDLE: &str = "n / Enter: new game   q: quit";
const HELP_RUNNING: &str = "Up / w: higher   Down / s: lower   d: draw   x / Esc: stop";

/// Statistics chart rows: label, bar, count.
#[must_use]
pub fn chart(tally: &Tally) -> Vec<String> {
    let labels = ["Correct", "Wrong", "Tie"];
    let buckets = tally.buckets();
    // A full deck is the largest any bucket can get; scale to that so
    // charts from different sessions are comparable.
    let scale = u32::from(FULL_DECK - 1);
    labels
        .iter()
        .zip(buckets)
        .map(|(label, count)| {
            let cells = (count.min(scale) as usize * CHART_WIDTH).div_ceil(scale as usize);
            format!(
                "{label:<8}|{:<width$}| {count}",
                "#".repeat(cells),
                width = CHART_WIDTH
            )
        })
        .collect()
}

/// One-line numeric display.
#[must_use]
pub fn scoreboard(score: i32, remaining: u8, best_score: i32) -> String {
    format!("Score {score:>3}   Cards left {remaining:>2}   Best {best_score:>3}")
}

/// Card as shown to the player, e.g. `A♠  (ACE of SPADES)`.
#[must_use]
pub fn card_line(card: &Card) -> String {
    format!("{card}  ({} of {})", card.rank.api_name(), card.suit.api_name())
}

struct Screen<W> {
    out: W,
    color: bool,
    tally: Tally,
    // Loading dots are on the cursor line.
    indicator: bool,
}

impl<W: Write> Screen<W> {
    fn clear_indicator(&mut self) -> io::Result<()> {
        if self.indicator {
            queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.indicator = false;
        }
        Ok(())
    }

    fn line(&mut self, color: Option<Color>, text: &str) -> io::Result<()> {
        self.clear_indicator()?;
        match color.filter(|_| self.color) {
            Some(color) => queue!(
                self.out,
                SetForegroundColor(color),
                Print(text),
                ResetColor,
                Print("\r\n")
            )?,
            None => queue!(self.out, Print(text), Print("\r\n"))?,
        }
        Ok(())
    }

    fn render(&mut self, event: &GameEvent) -> io::Result<()> {
        match event {
            GameEvent::Loading { active: true } => {
                if !self.indicator {
                    queue!(self.out, Print("  ..."))?;
                    self.indicator = true;
                }
            }
            GameEvent::Loading { active: false } => self.clear_indicator()?,
            GameEvent::Controls { running: true } => {
                self.line(Some(Color::Cyan), "New game.")?;
                self.line(None, HELP_RUNNING)?;
            }
            GameEvent::Controls { running: false } => {
                self.line(None, "")?;
                for row in chart(&self.tally) {
                    self.line(None, &row)?;
                }
                self.line(None, HELP_IDLE)?;
            }
            GameEvent::GuessControls { .. } | GameEvent::NewRecord { .. } => {}
            GameEvent::CardRevealed { card } => {
                let color = card.suit.is_red().then_some(Color::Red);
                self.line(color, &card_line(card))?;
            }
            GameEvent::Feedback { kind, message } => {
                let color = match kind {
                    FeedbackKind::Success => Color::Green,
                    FeedbackKind::Error => Color::Red,
                    FeedbackKind::Tie => Color::Yellow,
                    FeedbackKind::Info => Color::Blue,
                };
                self.line(Some(color), message)?;
            }
            GameEvent::Scoreboard {
                score,
                remaining,
                best_score,
            } => {
                self.line(None, &scoreboard(*score, *remaining, *best_score))?;
            }
            GameEvent::Stats(tally) => self.tally = *tally,
            GameEvent::StatsReset => self.tally = Tally::default(),
            GameEvent::SessionEnded { final_score } => {
                self.line(Some(Color::Cyan), &format!("Game over. Final score: {final_score}"))?;
            }
        }
        self.out.flush()
    }
}

/// Presenter writing to a terminal (or any writer).
pub struct TerminalPresenter<W: Write + Send> {
    screen: Mutex<Screen<W>>,
}

impl TerminalPresenter<io::Stdout> {
    /// Presenter on standard output, with colours.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                color: true,
                tally: Tally::default(),
                indicator: false,
            }),
        }
    }

    /// Enable or disable colour escapes.
    #[must_use]
    pub fn with_color(self, color: bool) -> Self {
        self.screen.lock().color = color;
        self
    }

    /// Print an informational line outside the event stream.
    pub fn notice(&self, message: &str) {
        self.present(&GameEvent::feedback(FeedbackKind::Info, message));
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.screen.into_inner().out
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&self, event: &GameEvent) {
        if let Err(err) = self.screen.lock().render(event) {
            debug!(error = %err, "terminal write failed");
        }
    }
}
