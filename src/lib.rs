//! # file2json
//!
//! Submit a local file to a remote JSON conversion service and summarise
//! the result.
//!
//! The service does the heavy lifting (PDF, PowerPoint, Excel, CSV, Word,
//! XML, plain-text and log parsing) and answers with a fixed envelope:
//!
//! ```json
//! { "success": true, "message": "...", "data": { ... }, "error": null }
//! ```
//!
//! This crate is the client side of that exchange: it owns the
//! select → convert → result lifecycle, turns every way the request can end
//! into one [`ConversionOutcome`], extracts a small ordered set of key metrics
//! from whatever shape `data` happens to have, and saves `data` as a
//! `<name>_converted.json` artifact.
//!
//! ## Lifecycle
//!
//! ```text
//! picker / drop ──▶ selection ──▶ session ──▶ client ──▶ session
//!                                                         │
//!                                       summary ◀─────────┤
//!                                       export  ◀─────────┘
//! ```
//!
//! 1. [`selection`] — first file of a picker change or drop, no extension
//!    enforcement
//! 2. [`session`]   — the state machine; `Converting` guards against a
//!    second request
//! 3. [`client`]    — one multipart POST, no retries
//! 4. [`summary`]   — ordered probes over the untyped payload
//! 5. [`export`]    — pretty JSON artifact, written atomically
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use file2json::{ClientConfig, ConversionClient, SelectedFile, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConversionClient::new(&ClientConfig::default())?;
//!     let mut session = SessionController::new(client);
//!
//!     session.select(SelectedFile::from_path("report.pdf")?);
//!     session.convert().await;
//!
//!     if let Some(summary) = session.summary() {
//!         for metric in &summary.metrics {
//!             println!("{metric}");
//!         }
//!         session.export_artifact(".")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `file2json` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod progress;
pub mod selection;
pub mod session;
pub mod summary;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{ConversionClient, ConversionOutcome, Converter};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::File2JsonError;
pub use export::{artifact_file_name, export_as_download};
pub use progress::{NoopObserver, ObserverHandle, SessionObserver};
pub use selection::{
    format_file_size, select_from_drop, select_from_picker, DragEvent, PickerInput, SelectedFile,
};
pub use session::{Phase, SessionController, SessionEvent, SessionState};
pub use summary::{summarize, summarize_categories, CategoryCount, Emphasis, Metric, Severity, Summary};
