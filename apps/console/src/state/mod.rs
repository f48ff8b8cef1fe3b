//! # State Module
//!
//! Manages session state for the console host.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │          ┌──────────────────┬──────────────────┐                       │
//! │          ▼                                     ▼                        │
//! │  ┌──────────────────┐                 ┌──────────────────┐              │
//! │  │  DocumentState   │                 │   ConfigState    │              │
//! │  │                  │                 │                  │              │
//! │  │  Arc<Mutex<      │                 │  currency        │              │
//! │  │    Document      │                 │  kind, tax       │              │
//! │  │  >>              │                 │  discount type   │              │
//! │  └──────────────────┘                 └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DocumentState: Protected by Arc<Mutex<T>> for exclusive access      │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs.

mod config;
mod document;

pub use config::{ConfigError, ConfigState};
pub use document::DocumentState;
