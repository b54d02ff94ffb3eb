//! Upload and analysis controller implementation
//!
//! This module implements the controller that turns user actions into
//! analysis server requests and applies the replies to the UI surface.

use crate::api::{AnalysisApi, AnalysisResult, FragmentSlot, UploadFile, UploadResult};
use crate::config::AbsentFragmentPolicy;
use crate::error::{AnalyzerError, Result};
use crate::ui::{Notice, UiSurface};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use uuid::Uuid;

/// Completion of a request, delivered to the UI thread
#[derive(Debug)]
pub enum ControllerEvent {
    /// `/upload` finished
    UploadFinished {
        /// Id logged when the request was dispatched
        request_id: Uuid,
        /// Reply or failure
        outcome: Result<UploadResult>,
    },
    /// `/analyze` finished
    AnalysisFinished {
        /// Id logged when the request was dispatched
        request_id: Uuid,
        /// Taluk the analysis was requested for
        taluk: String,
        /// Reply or failure
        outcome: Result<AnalysisResult>,
    },
}

/// Upload and analysis controller
///
/// Owned by the UI thread. Requests run on worker threads; their outcomes come
/// back over a channel and are applied by [`AnalysisController::handle_event`]
/// in arrival order, so the last reply to arrive wins.
pub struct AnalysisController {
    /// Analysis server access, shared with worker threads
    api: Arc<dyn AnalysisApi>,
    /// Injected UI handles
    ui: UiSurface,
    /// Handling of fragments missing from a non-empty analysis reply
    absent_fragment_policy: AbsentFragmentPolicy,
    /// Cloned into each worker thread
    event_sender: mpsc::Sender<ControllerEvent>,
    /// Completed requests waiting to be applied
    event_receiver: mpsc::Receiver<ControllerEvent>,
    /// Requests dispatched but not yet applied
    pending_requests: AtomicUsize,
}

impl AnalysisController {
    /// Create a controller over an API and a UI surface
    pub fn new(
        api: Arc<dyn AnalysisApi>,
        ui: UiSurface,
        absent_fragment_policy: AbsentFragmentPolicy,
    ) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();
        Self {
            api,
            ui,
            absent_fragment_policy,
            event_sender,
            event_receiver,
            pending_requests: AtomicUsize::new(0),
        }
    }

    /// Put the UI into its initial state: no Taluks, selector disabled.
    /// Call once before the host starts forwarding user actions.
    pub fn initialize(&self) {
        use tracing::info;

        self.ui.selector.replace_options(&[]);
        self.ui.selector.set_enabled(false);
        info!(
            "Controller initialized (absent fragment policy: {:?})",
            self.absent_fragment_policy
        );
    }

    /// Upload `file` and refill the Taluk selector from the reply.
    ///
    /// Returns as soon as the request is dispatched. `None` fails with
    /// `NoFileSelected` without contacting the server.
    pub fn submit_upload(&self, file: Option<UploadFile>) -> Result<Uuid> {
        use tracing::{info, warn};

        let Some(file) = file else {
            warn!("Upload submitted without a file");
            self.ui.notices.show(&Notice::no_file_selected());
            return Err(AnalyzerError::NoFileSelected);
        };

        let request_id = Uuid::new_v4();
        info!(
            "[{}] Uploading {} ({} bytes)",
            request_id,
            file.file_name,
            file.bytes.len()
        );

        let api = Arc::clone(&self.api);
        self.dispatch("upload", &Notice::upload_failed(), move || {
            ControllerEvent::UploadFinished {
                request_id,
                outcome: api.upload(&file),
            }
        })?;

        Ok(request_id)
    }

    /// Request the analysis for the Taluk currently selected in the selector
    pub fn submit_analysis(&self) -> Result<Uuid> {
        let selected = self.ui.selector.selected();
        self.submit_analysis_for(selected.as_deref())
    }

    /// Request the analysis for `selected`.
    ///
    /// Returns as soon as the request is dispatched. `None` or an empty name
    /// fails with `NoRegionSelected` without contacting the server.
    pub fn submit_analysis_for(&self, selected: Option<&str>) -> Result<Uuid> {
        use tracing::{info, warn};

        let Some(taluk) = selected.filter(|t| !t.is_empty()) else {
            warn!("Analysis submitted without a selected Taluk");
            self.ui.notices.show(&Notice::no_region_selected());
            return Err(AnalyzerError::NoRegionSelected);
        };

        let request_id = Uuid::new_v4();
        info!("[{}] Requesting analysis for Taluk '{}'", request_id, taluk);

        let api = Arc::clone(&self.api);
        let taluk = taluk.to_string();
        self.dispatch("analyze", &Notice::analysis_failed(), move || {
            let outcome = api.analyze(&taluk);
            ControllerEvent::AnalysisFinished {
                request_id,
                taluk,
                outcome,
            }
        })?;

        Ok(request_id)
    }

    /// Run `request` on a named worker thread and send its event back
    ///
    /// `failure` is shown when the thread cannot be started.
    fn dispatch<F>(&self, name: &str, failure: &Notice, request: F) -> Result<()>
    where
        F: FnOnce() -> ControllerEvent + Send + 'static,
    {
        use tracing::warn;

        let sender = self.event_sender.clone();
        self.pending_requests.fetch_add(1, Ordering::SeqCst);

        let spawned = std::thread::Builder::new()
            .name(format!("{name}-request"))
            .spawn(move || {
                let event = request();
                if sender.send(event).is_err() {
                    warn!("Controller dropped before request completed; reply discarded");
                }
            });

        self.finish_dispatch(name, failure, spawned.map(drop))
    }

    /// Undo the pending count and notify the user if the worker never started
    fn finish_dispatch(
        &self,
        name: &str,
        failure: &Notice,
        spawned: std::io::Result<()>,
    ) -> Result<()> {
        use tracing::error;

        if let Err(e) = spawned {
            self.release_pending();
            error!("Failed to spawn {} request thread: {}", name, e);
            self.ui.notices.show(failure);
            return Err(AnalyzerError::IoError(e));
        }
        Ok(())
    }

    /// Saturating: events may be fed in directly by a host or test
    fn release_pending(&self) {
        let _ = self
            .pending_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            });
    }

    /// Number of dispatched requests whose outcome has not been applied yet
    pub fn pending_requests(&self) -> usize {
        self.pending_requests.load(Ordering::SeqCst)
    }

    /// Apply every outcome that has already arrived. Never blocks.
    ///
    /// Returns the number of outcomes applied.
    pub fn process_pending_events(&self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for one outcome and apply it.
    ///
    /// Returns `false` if nothing arrived in time.
    pub fn wait_for_event(&self, timeout: Duration) -> bool {
        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(_) => false,
        }
    }

    /// Apply one request outcome to the UI
    pub fn handle_event(&self, event: ControllerEvent) {
        self.release_pending();

        match event {
            ControllerEvent::UploadFinished {
                request_id,
                outcome,
            } => self.apply_upload_outcome(request_id, outcome),
            ControllerEvent::AnalysisFinished {
                request_id,
                taluk,
                outcome,
            } => self.apply_analysis_outcome(request_id, &taluk, outcome),
        }
    }

    fn apply_upload_outcome(&self, request_id: Uuid, outcome: Result<UploadResult>) {
        use tracing::{debug, info, warn};

        match outcome {
            Ok(result) if result.taluks.is_empty() => {
                info!("[{}] Upload succeeded but contained no Taluks", request_id);
                self.ui.selector.replace_options(&[]);
                self.ui.selector.set_enabled(false);
                self.ui.notices.show(&Notice::no_taluks_found());
            }
            Ok(result) => {
                info!(
                    "[{}] Upload succeeded with {} Taluk(s)",
                    request_id,
                    result.taluks.len()
                );
                debug!("[{}] Taluks: {:?}", request_id, result.taluks);
                self.ui.selector.replace_options(&result.taluks);
                self.ui.selector.set_enabled(true);
                self.ui.notices.show(&Notice::upload_succeeded());
            }
            Err(e) => {
                log_request_failure(request_id, "Upload", &e);
                warn!("[{}] Selector left unchanged", request_id);
                self.ui.notices.show(&Notice::upload_failed());
            }
        }
    }

    fn apply_analysis_outcome(
        &self,
        request_id: Uuid,
        taluk: &str,
        outcome: Result<AnalysisResult>,
    ) {
        use tracing::{debug, info};

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                log_request_failure(request_id, "Analysis", &e);
                self.ui.notices.show(&Notice::analysis_failed());
                return;
            }
        };

        if result.is_empty() {
            info!("[{}] No data available for Taluk '{}'", request_id, taluk);
            self.ui.notices.show(&Notice::no_data());
            return;
        }

        for slot in FragmentSlot::ALL {
            let container = self.ui.containers.get(slot);
            match (result.fragment(slot), self.absent_fragment_policy) {
                (Some(markup), _) => {
                    debug!(
                        "[{}] #{} <- {} bytes",
                        request_id,
                        slot.container_id(),
                        markup.len()
                    );
                    container.set_html(markup);
                }
                (None, AbsentFragmentPolicy::Clear) => {
                    debug!("[{}] #{} cleared", request_id, slot.container_id());
                    container.set_html("");
                }
                (None, AbsentFragmentPolicy::Preserve) => {}
            }
        }

        info!(
            "[{}] Analysis for Taluk '{}' applied ({} section(s))",
            request_id,
            taluk,
            result.present_fragments().len()
        );
    }
}

/// Log a failed request with the raw response body, if any, for diagnosis
fn log_request_failure(request_id: Uuid, what: &str, error: &AnalyzerError) {
    use tracing::error;

    error!("[{}] {} error: {}", request_id, what, error);
    if let Some(body) = error.raw_body() {
        error!("[{}] {} error response body: {}", request_id, what, body);
    }
}
