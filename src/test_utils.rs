//! Shared test utilities for `talukscope` unit tests.
//!
//! It is only compiled during testing (`#[cfg(test)]`).

use crate::api::models::{ANALYZE_ENDPOINT, UPLOAD_ENDPOINT};
use crate::api::{AnalysisApi, AnalysisResult, UploadFile, UploadResult};
use crate::controller::AnalysisController;
use crate::error::{AnalyzerError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Global mutex to serialize tests that modify the APPDATA environment variable.
static APPDATA_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that points APPDATA at a temp directory for a test scope
/// and restores the original value when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because other
/// threads may read the environment concurrently. `APPDATA_LOCK` is held for
/// the guard's whole lifetime, so only one test touches APPDATA at a time, and
/// the only reader of APPDATA in this crate is `ConfigManager`.
pub struct AppdataGuard {
    original: Option<String>,
    // Held for the guard's lifetime to serialize APPDATA access
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables under APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Create a new guard that sets APPDATA to the given temp directory path.
    pub fn new(temp_dir: &TempDir) -> Self {
        // A test that panicked while holding the lock leaves it poisoned; the
        // guard restored APPDATA on unwind, so the state is still consistent
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK serializes all APPDATA writers in tests.
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables under APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: still holding APPDATA_LOCK; see `AppdataGuard::new`.
        if let Some(ref original) = self.original {
            unsafe {
                std::env::set_var("APPDATA", original);
            }
        } else {
            unsafe {
                std::env::remove_var("APPDATA");
            }
        }
    }
}

/// Scripted reply of a [`FakeApi`] endpoint
#[derive(Debug, Clone)]
enum Reply<T> {
    Success(T),
    Status { status: u16, body: String },
}

impl<T: Clone> Reply<T> {
    fn produce(&self, endpoint: &'static str) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value.clone()),
            Self::Status { status, body } => Err(AnalyzerError::ServerStatus {
                endpoint,
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// In-process stand-in for the analysis server that counts its calls
#[derive(Debug)]
pub struct FakeApi {
    upload_reply: Mutex<Reply<UploadResult>>,
    /// Per-call (delay, taluks) consumed before `upload_reply` applies
    upload_script: Mutex<VecDeque<(Duration, Vec<String>)>>,
    analysis_reply: Mutex<Reply<AnalysisResult>>,
    upload_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    last_taluk: Mutex<Option<String>>,
}

impl FakeApi {
    /// Replies with no Taluks and no fragments
    pub fn new() -> Self {
        Self {
            upload_reply: Mutex::new(Reply::Success(UploadResult::default())),
            upload_script: Mutex::new(VecDeque::new()),
            analysis_reply: Mutex::new(Reply::Success(AnalysisResult::default())),
            upload_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            last_taluk: Mutex::new(None),
        }
    }

    /// Uploads reply with `taluks`
    pub fn with_taluks(self, taluks: &[&str]) -> Self {
        self.with_taluk_list(taluks.iter().map(ToString::to_string).collect())
    }

    /// Uploads reply with `taluks`
    pub fn with_taluk_list(self, taluks: Vec<String>) -> Self {
        *self.upload_reply.lock() = Reply::Success(UploadResult { taluks });
        self
    }

    /// The n-th upload sleeps for `script[n].0`, then replies with `script[n].1`
    pub fn with_upload_script(self, script: &[(Duration, &[&str])]) -> Self {
        *self.upload_script.lock() = script
            .iter()
            .map(|(delay, taluks)| (*delay, taluks.iter().map(ToString::to_string).collect()))
            .collect();
        self
    }

    /// Analyses reply with `result`
    pub fn with_analysis(self, result: AnalysisResult) -> Self {
        *self.analysis_reply.lock() = Reply::Success(result);
        self
    }

    /// From now on uploads fail with an HTTP error
    pub fn fail_uploads_with_status(&self, status: u16, body: &str) {
        *self.upload_reply.lock() = Reply::Status {
            status,
            body: body.to_string(),
        };
    }

    /// From now on analyses fail with an HTTP error
    pub fn fail_analyses_with_status(&self, status: u16, body: &str) {
        *self.analysis_reply.lock() = Reply::Status {
            status,
            body: body.to_string(),
        };
    }

    /// Number of upload requests received
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of analysis requests received
    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    /// Taluk of the most recent analysis request
    pub fn last_taluk(&self) -> Option<String> {
        self.last_taluk.lock().clone()
    }
}

impl AnalysisApi for FakeApi {
    fn upload(&self, _file: &UploadFile) -> Result<UploadResult> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.upload_script.lock().pop_front();
        if let Some((delay, taluks)) = scripted {
            std::thread::sleep(delay);
            return Ok(UploadResult { taluks });
        }
        self.upload_reply.lock().produce(UPLOAD_ENDPOINT)
    }

    fn analyze(&self, taluk: &str) -> Result<AnalysisResult> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_taluk.lock() = Some(taluk.to_string());
        self.analysis_reply.lock().produce(ANALYZE_ENDPOINT)
    }
}

/// Apply outcomes until no request is pending, failing the test after 5s of silence
pub fn wait_for_all(controller: &AnalysisController) {
    while controller.pending_requests() > 0 {
        assert!(
            controller.wait_for_event(Duration::from_secs(5)),
            "request did not complete within 5s"
        );
    }
}
