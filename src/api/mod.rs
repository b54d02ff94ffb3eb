//! Analysis server API module
//!
//! The controller talks to the server only through the [`AnalysisApi`] trait,
//! so the real HTTP client can be swapped for a scripted one in tests.
//!
//! # Endpoints
//!
//! ```text
//! POST {base_url}/upload   multipart, field "file"   → {"taluks": [...]}
//! POST {base_url}/analyze  {"taluk": "..."}          → {"html", "villageHtml",
//!                                                       "demographicHtml", "detectionHtml"}
//! ```

pub mod http_client;
pub mod models;

pub use http_client::HttpAnalysisClient;
pub use models::{AnalysisResult, FragmentSlot, UploadFile, UploadResult};

use crate::error::Result;

/// Blocking access to the analysis server
///
/// Implementations are called from worker threads, never from the UI thread.
pub trait AnalysisApi: Send + Sync {
    /// Upload a spreadsheet and return the Taluks it contains
    fn upload(&self, file: &UploadFile) -> Result<UploadResult>;

    /// Request the rendered analysis for one Taluk
    fn analyze(&self, taluk: &str) -> Result<AnalysisResult>;
}
