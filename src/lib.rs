//! `talukscope` - Taluk-level analysis client
//!
//! Uploads a case spreadsheet to an analysis server, fills a Taluk selector from
//! the reply, and injects the server-rendered analysis sections for the selected
//! Taluk into a report page.
//!
//! `AnalysisController` owns the UI surface and runs on the UI thread; each
//! request runs on its own worker thread through an `AnalysisApi`
//! implementation and reports back over a channel.

// Module declarations
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{AnalyzerError, ErrorKind, Result};
