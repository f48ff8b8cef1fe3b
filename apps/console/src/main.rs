//! # Tally Console Entry Point
//!
//! Reads JSON commands from stdin, writes JSON responses to stdout.
//!
//! ```text
//! $ echo '{"cmd":"add_item"}' | tally-console
//! {"ok":{"document":{...},"breakdown":{...}}}
//! ```
//!
//! The actual setup is in lib.rs for better testability.

fn main() {
    if let Err(e) = tally_console_lib::run() {
        eprintln!("tally-console: {}", e);
        std::process::exit(1);
    }
}
