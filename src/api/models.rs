//! Request and reply types exchanged with the analysis server

use crate::error::{AnalyzerError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

/// Endpoint path for spreadsheet uploads
pub const UPLOAD_ENDPOINT: &str = "/upload";
/// Endpoint path for per-Taluk analysis
pub const ANALYZE_ENDPOINT: &str = "/analyze";

/// A file chosen for upload, already read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent in the multipart part
    pub file_name: String,
    /// MIME type sent in the multipart part
    pub mime_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create an upload from in-memory contents, guessing the MIME type from the name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

/// MIME type for the spreadsheet formats the server accepts
fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// Body of a `/analyze` request
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    /// Selected Taluk
    pub taluk: &'a str,
}

/// Successful `/upload` reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    /// Taluk names in server order; empty when the file had none
    pub taluks: Vec<String>,
}

#[derive(Deserialize)]
struct UploadReply {
    #[serde(default)]
    taluks: Option<Vec<String>>,
}

impl UploadResult {
    /// Decode a 2xx `/upload` body
    ///
    /// A JSON object without `taluks` decodes to an empty result.
    pub fn from_body(body: &str) -> Result<Self> {
        let reply: UploadReply = decode_object(UPLOAD_ENDPOINT, body)?;
        Ok(Self {
            taluks: reply.taluks.unwrap_or_default(),
        })
    }
}

/// Page container that receives one analysis fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentSlot {
    /// Yearly and monthly case charts
    Charts,
    /// Village-level heatmap
    VillageHeatmap,
    /// Age and gender distribution
    Demographics,
    /// Detection delay versus severity
    DetectionDelay,
}

impl FragmentSlot {
    /// All slots in page order
    pub const ALL: [Self; 4] = [
        Self::Charts,
        Self::VillageHeatmap,
        Self::Demographics,
        Self::DetectionDelay,
    ];

    /// Field name in the `/analyze` reply
    pub fn response_field(self) -> &'static str {
        match self {
            Self::Charts => "html",
            Self::VillageHeatmap => "villageHtml",
            Self::Demographics => "demographicHtml",
            Self::DetectionDelay => "detectionHtml",
        }
    }

    /// Element id of the page container
    pub fn container_id(self) -> &'static str {
        match self {
            Self::Charts => "charts",
            Self::VillageHeatmap => "villageHeatmap",
            Self::Demographics => "ageGenderDistribution",
            Self::DetectionDelay => "detectionDelayAnalysis",
        }
    }

    /// Position in [`FragmentSlot::ALL`]
    pub fn index(self) -> usize {
        match self {
            Self::Charts => 0,
            Self::VillageHeatmap => 1,
            Self::Demographics => 2,
            Self::DetectionDelay => 3,
        }
    }
}

/// Successful `/analyze` reply
///
/// A fragment counts as present only when it is a non-empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Markup for `#charts`
    #[serde(default)]
    pub html: Option<String>,
    /// Markup for `#villageHeatmap`
    #[serde(default)]
    pub village_html: Option<String>,
    /// Markup for `#ageGenderDistribution`
    #[serde(default)]
    pub demographic_html: Option<String>,
    /// Markup for `#detectionDelayAnalysis`
    #[serde(default)]
    pub detection_html: Option<String>,
}

impl AnalysisResult {
    /// Decode a 2xx `/analyze` body
    pub fn from_body(body: &str) -> Result<Self> {
        decode_object(ANALYZE_ENDPOINT, body)
    }

    /// Fragment for `slot`, if present
    pub fn fragment(&self, slot: FragmentSlot) -> Option<&str> {
        let value = match slot {
            FragmentSlot::Charts => &self.html,
            FragmentSlot::VillageHeatmap => &self.village_html,
            FragmentSlot::Demographics => &self.demographic_html,
            FragmentSlot::DetectionDelay => &self.detection_html,
        };
        value.as_deref().filter(|markup| !markup.is_empty())
    }

    /// Present fragments in page order
    pub fn present_fragments(&self) -> SmallVec<[(FragmentSlot, &str); 4]> {
        FragmentSlot::ALL
            .iter()
            .filter_map(|&slot| self.fragment(slot).map(|markup| (slot, markup)))
            .collect()
    }

    /// True when no fragment is present
    pub fn is_empty(&self) -> bool {
        FragmentSlot::ALL
            .iter()
            .all(|&slot| self.fragment(slot).is_none())
    }
}

/// Decode a reply body that must be a JSON object
fn decode_object<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    let malformed = |reason: String| AnalyzerError::MalformedResponse {
        endpoint,
        reason,
        body: body.to_string(),
    };

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(malformed("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| malformed(format!("unexpected field type: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_upload_result_reads_taluks_in_order() {
        let result = UploadResult::from_body(r#"{"taluks": ["North", "South"]}"#).unwrap();
        assert_eq!(result.taluks, vec!["North", "South"]);
    }

    #[test]
    fn test_upload_result_missing_taluks_is_empty() {
        assert!(UploadResult::from_body("{}").unwrap().taluks.is_empty());
        assert!(
            UploadResult::from_body(r#"{"taluks": null}"#)
                .unwrap()
                .taluks
                .is_empty()
        );
    }

    #[test]
    fn test_upload_result_rejects_non_object() {
        let err = UploadResult::from_body("<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert_eq!(err.raw_body(), Some("<html>oops</html>"));

        let err = UploadResult::from_body(r#"["North"]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_upload_result_rejects_wrong_taluk_type() {
        let err = UploadResult::from_body(r#"{"taluks": "North"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_analysis_result_camel_case_fields() {
        let body = r#"{"html": "<div>A</div>", "villageHtml": "<p>V</p>",
                       "demographicHtml": "", "detectionHtml": null}"#;
        let result = AnalysisResult::from_body(body).unwrap();
        assert_eq!(result.fragment(FragmentSlot::Charts), Some("<div>A</div>"));
        assert_eq!(result.fragment(FragmentSlot::VillageHeatmap), Some("<p>V</p>"));
        assert_eq!(result.fragment(FragmentSlot::Demographics), None);
        assert_eq!(result.fragment(FragmentSlot::DetectionDelay), None);
        assert_eq!(result.present_fragments().len(), 2);
    }

    #[test]
    fn test_analysis_result_all_absent_is_empty() {
        assert!(AnalysisResult::from_body("{}").unwrap().is_empty());
        let all_blank = r#"{"html": "", "villageHtml": "", "demographicHtml": "", "detectionHtml": ""}"#;
        assert!(AnalysisResult::from_body(all_blank).unwrap().is_empty());
    }

    #[test]
    fn test_analysis_result_ignores_unknown_fields() {
        let result = AnalysisResult::from_body(r#"{"detectionHtml": "<i>d</i>", "extra": 1}"#)
            .unwrap();
        assert_eq!(
            result.present_fragments().as_slice(),
            &[(FragmentSlot::DetectionDelay, "<i>d</i>")]
        );
    }

    #[test]
    fn test_slot_mapping() {
        for (i, slot) in FragmentSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
        assert_eq!(FragmentSlot::Charts.container_id(), "charts");
        assert_eq!(
            FragmentSlot::Demographics.response_field(),
            "demographicHtml"
        );
    }

    #[test]
    fn test_upload_file_mime_guess() {
        assert_eq!(UploadFile::new("cases.CSV", vec![]).mime_type, "text/csv");
        assert_eq!(
            UploadFile::new("cases.xls", vec![]).mime_type,
            "application/vnd.ms-excel"
        );
        assert_eq!(
            UploadFile::new("cases", vec![]).mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_upload_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dengue.csv");
        std::fs::write(&path, "Taluk,Cases\nNorth,3\n").unwrap();

        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "dengue.csv");
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(file.bytes, b"Taluk,Cases\nNorth,3\n");
    }
}
