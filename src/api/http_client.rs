//! HTTP client for the analysis server
//!
//! Uses reqwest's blocking API; each call runs on a worker thread spawned by the
//! controller, so no async runtime is needed.

use crate::api::AnalysisApi;
use crate::api::models::{
    ANALYZE_ENDPOINT, AnalysisResult, AnalyzeRequest, UPLOAD_ENDPOINT, UploadFile, UploadResult,
};
use crate::config::ServerSettings;
use crate::error::{AnalyzerError, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Analysis server client
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    /// Normalized origin without trailing slash
    base_url: String,
    client: Client,
}

impl HttpAnalysisClient {
    /// Build a client from server settings
    ///
    /// Fails when `base_url` is invalid or the TLS backend cannot be initialized.
    pub fn new(settings: &ServerSettings) -> Result<Self> {
        let base_url = settings.normalized_base_url()?;

        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| {
            warn!("Failed to create HTTP client: {}", e);
            // Preserve error chain by wrapping the source error
            AnalyzerError::ConfigError(Box::new(e))
        })?;

        info!("Analysis server client ready for {}", base_url);
        Ok(Self { base_url, client })
    }

    /// Origin this client sends requests to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

impl AnalysisApi for HttpAnalysisClient {
    fn upload(&self, file: &UploadFile) -> Result<UploadResult> {
        debug!(
            "Uploading {} ({} bytes, {})",
            file.file_name,
            file.bytes.len(),
            file.mime_type
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| AnalyzerError::ConfigError(Box::new(e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(UPLOAD_ENDPOINT))
            .multipart(form)
            .send()
            .map_err(|e| network_error(UPLOAD_ENDPOINT, e))?;

        let body = read_success_body(UPLOAD_ENDPOINT, response)?;
        UploadResult::from_body(&body)
    }

    fn analyze(&self, taluk: &str) -> Result<AnalysisResult> {
        debug!("Requesting analysis for Taluk '{}'", taluk);

        let response = self
            .client
            .post(self.url(ANALYZE_ENDPOINT))
            .json(&AnalyzeRequest { taluk })
            .send()
            .map_err(|e| network_error(ANALYZE_ENDPOINT, e))?;

        let body = read_success_body(ANALYZE_ENDPOINT, response)?;
        AnalysisResult::from_body(&body)
    }
}

fn network_error(endpoint: &'static str, e: reqwest::Error) -> AnalyzerError {
    warn!("Request to {} failed: {}", endpoint, e);
    // Preserve error chain by wrapping the source error
    AnalyzerError::Network {
        endpoint,
        source: Box::new(e),
    }
}

/// Read the body of a response, failing on non-2xx status
fn read_success_body(endpoint: &'static str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().map_err(|e| network_error(endpoint, e))?;

    if !status.is_success() {
        match server_error_message(&body) {
            Some(message) => warn!("{} returned {}: {}", endpoint, status, message),
            None => warn!("{} returned {}", endpoint, status),
        }
        return Err(AnalyzerError::ServerStatus {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }

    debug!("{} returned {} ({} bytes)", endpoint, status, body.len());
    Ok(body)
}

/// The `error` field the server puts in its failure replies
fn server_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
