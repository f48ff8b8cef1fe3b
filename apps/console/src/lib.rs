//! # Tally Console Library
//!
//! Host for a document editing session. The frontend (or a script) drives
//! it with one JSON command per line on stdin and reads one JSON response
//! per line on stdout.
//!
//! ## Module Organization
//! ```text
//! tally_console_lib/
//! ├── lib.rs          ◄─── You are here (startup & session loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── document.rs ◄─── Session document (Arc<Mutex<Document>>)
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Request/response types, dispatch
//! │   ├── document.rs ◄─── Item, discount, tax, header, status commands
//! │   ├── record.rs   ◄─── Stored record commands, validation
//! │   └── config.rs   ◄─── Config and currency list
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Session Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin                               stdout                             │
//! │  ─────                               ──────                             │
//! │  {"cmd":"add_item"}           ───►   {"ok":{"document":..,"breakdown":..}}│
//! │  {"cmd":"mark_sent"}          ───►   {"ok":{...}}                       │
//! │  {"cmd":"mark_sent"}          ───►   {"error":{"code":"BUSINESS_LOGIC",  │
//! │                                                "message":"..."}}        │
//! │  not json                     ───►   {"error":{"code":"VALIDATION_ERROR",│
//! │                                                "message":"..."}}        │
//! │  <EOF>                        ───►   (session ends)                     │
//! │                                                                         │
//! │  stderr: tracing logs (RUST_LOG, default info,tally=debug)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use commands::{dispatch, Request, Response};
use error::ApiError;
use state::{ConfigState, DocumentState};

/// Runs a session over stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Session Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, writing to stderr             │
/// │     • Default: info,tally=debug, can be overridden with RUST_LOG        │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • $TALLY_CONFIG or platform config dir, then TALLY_* env vars       │
/// │     • Falls back to defaults on any error                               │
/// │                                                                         │
/// │  3. Create Blank Document ────────────────────────────────────────────► │
/// │     • Kind, currency, tax mode and discount type from config            │
/// │                                                                         │
/// │  4. Serve Commands ───────────────────────────────────────────────────► │
/// │     • One request per line until EOF                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> io::Result<()> {
    init_tracing();

    info!("Starting Tally console v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigState::load_or_default(None);
    let doc = DocumentState::new(config.new_document(None));
    info!(
        currency = %config.default_currency,
        kind = %config.default_kind,
        "Session ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let handled = run_session(stdin.lock(), stdout.lock(), &doc, &config)?;

    info!(commands = handled, "Session ended");
    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `ERROR`: Unrecoverable failures
/// - `WARN`: Recoverable issues (bad config values, malformed lines)
/// - `INFO`: Session lifecycle, record loads
/// - `DEBUG`: Every command
///
/// ## Environment Variable
/// Set `RUST_LOG` to control log level:
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=tally_console_lib=trace` - Trace the session host only
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tally=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Serves commands from `input` until EOF, writing one response line per
/// request to `output`. Blank lines are skipped. Returns the number of
/// requests answered.
pub fn run_session<R, W>(
    input: R,
    mut output: W,
    doc: &DocumentState,
    config: &ConfigState,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut handled = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => Response::from(dispatch(&request, doc, config)),
            Err(e) => {
                warn!(error = %e, "Malformed request line");
                Response::Error(ApiError::from(e))
            }
        };

        if let Response::Error(err) = &response {
            debug!(code = ?err.code, message = %err.message, "Command failed");
        }

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
        handled += 1;
    }

    Ok(handled)
}
