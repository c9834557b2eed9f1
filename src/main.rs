//! Higher-or-lower in the terminal.
//!
//! Plays against deckofcardsapi.com (or the deck API at `--api-url`).
//! Logs go to `--log-file` or stderr.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{event, terminal};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use higher_lower::assets::{self, HttpAssetLoader};
use higher_lower::core::DEFAULT_API_URL;
use higher_lower::telemetry;
use higher_lower::{
    BestScore, Command, DeckApiClient, FileScoreStore, GameConfig, GameController, GameError,
    TerminalPresenter,
};

#[derive(Parser)]
#[command(name = "higher-lower")]
#[command(about = "Guess whether the next card ranks higher or lower")]
struct Args {
    /// Base URL of the deck API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout for each call to the deck API, in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// File the best score is kept in (default: platform data directory)
    #[arg(long)]
    score_file: Option<PathBuf>,

    /// Do not preload card images at startup
    #[arg(long)]
    no_warm_up: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> GameConfig {
        let mut config = GameConfig::new()
            .with_api_url(self.api_url.as_str())
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_warm_up(!self.no_warm_up);
        if let Some(path) = &self.score_file {
            config = config.with_score_file(path);
        }
        config
    }
}

type Screen = TerminalPresenter<Stdout>;

/// Raw mode for as long as this is alive, including unwinding.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(error = %err, "could not restore the terminal");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose, args.log_file.as_deref())?;
    let config = args.config();

    let client = Arc::new(DeckApiClient::new(&config)?);
    let images = Arc::new(HttpAssetLoader::new(client.http().clone()));

    let score_path = config.score_path();
    debug!(path = %score_path.display(), "best score file");
    let best = BestScore::load(Box::new(FileScoreStore::new(score_path)), config.score_key.as_str());

    let screen = Arc::new(TerminalPresenter::stdout());
    let game = Arc::new(
        GameController::new(config.clone(), client.clone(), screen.clone(), best)
            .with_assets(images.clone()),
    );

    if config.warm_up {
        tokio::spawn(async move {
            if let Err(err) = assets::warm_up(&*client, &*images).await {
                warn!(error = %err, "image warm-up failed");
            }
        });
    }

    let _raw = RawMode::enable()?;
    run(&game, &screen).await;
    Ok(())
}

async fn run(game: &Arc<GameController>, screen: &Arc<Screen>) {
    screen.notice("Higher or Lower");
    game.present_current();

    let (tx, mut rx) = mpsc::unbounded_channel();
    // crossterm reads block; keep them off the runtime so shutdown never
    // waits on a pending key.
    std::thread::spawn(move || read_keys(&tx));

    while let Some(command) = rx.recv().await {
        if command == Command::Quit {
            break;
        }
        if command.needs_session() && !game.is_running() {
            continue;
        }
        dispatch(game, screen, command);
    }
    game.stop();
}

fn read_keys(tx: &UnboundedSender<Command>) {
    loop {
        match event::read() {
            Ok(event) => {
                let Some(command) = Command::from_event(&event) else {
                    continue;
                };
                if tx.send(command).is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "terminal input failed");
                let _ = tx.send(Command::Quit);
                return;
            }
        }
    }
}

/// Run a command without blocking the input loop. A second key press while
/// a call is in flight reaches the controller and is turned away as busy.
fn dispatch(game: &Arc<GameController>, screen: &Arc<Screen>, command: Command) {
    let (game, screen) = (Arc::clone(game), Arc::clone(screen));
    match command {
        Command::Stop => {
            game.stop();
        }
        Command::Quit => {}
        Command::Start => {
            tokio::spawn(async move { rejected(&screen, game.start().await.err()) });
        }
        Command::Draw => {
            tokio::spawn(async move { rejected(&screen, game.draw().await.err()) });
        }
        Command::Guess(direction) => {
            tokio::spawn(async move { rejected(&screen, game.guess(direction).await.err()) });
        }
    }
}

fn rejected(screen: &Screen, err: Option<GameError>) {
    match err {
        None => {}
        Some(GameError::AlreadyRunning) => screen.notice("A game is running; press x to stop it first"),
        // Service failures were already shown as feedback.
        Some(err) => debug!(error = %err, "command rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_always_plays_against_the_api() {
        assert!(Args::try_parse_from(["higher-lower", "--seed", "7"]).is_err());

        let args = Args::try_parse_from(["higher-lower", "--api-url", "http://localhost:8000"]).unwrap();
        let config = args.config();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.warm_up);
    }
}
