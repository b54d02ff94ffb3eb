//! Upload and analysis controller module
//!
//! This module wires user actions to analysis server requests and applies the
//! replies to the page.
//!
//! # Overview
//!
//! The controller is the only component that mutates the UI surface:
//! - **Dispatches requests** on worker threads so the UI never blocks
//! - **Receives outcomes** over an mpsc channel on the UI thread
//! - **Updates the Taluk selector** from `/upload` replies
//! - **Fills the analysis containers** from `/analyze` replies
//! - **Shows one notice** per submission outcome
//!
//! # Event Flow
//!
//! ```text
//! user action → submit_upload / submit_analysis → worker thread → AnalysisApi
//!                                                        ↓
//!                       UI thread ← ControllerEvent ← mpsc channel
//!                           ↓
//!                  selector / containers / notices
//! ```
//!
//! # Ordering
//!
//! Submissions are not fenced against each other. Outcomes are applied in the
//! order they arrive, so when two requests overlap the later reply wins.

pub mod analysis_controller;

pub use analysis_controller::{AnalysisController, ControllerEvent};
