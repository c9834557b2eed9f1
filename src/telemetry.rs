//! Tracing subscriber setup.
//!
//! The game owns the terminal in raw mode, so log output goes to a file
//! when one is given and to stderr otherwise. The level comes from
//! `RUST_LOG` if set; else `debug` with `--verbose`, `warn` without.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for the binary.
pub fn init_tracing(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    // Already installed (tests, embedding): keep the existing one.
    let _ = result;
    Ok(())
}

static TEST_INIT: Once = Once::new();

/// Quiet test logging, captured by the test harness. `TEST_LOG` or
/// `RUST_LOG` raise the level. Safe to call from every test.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
