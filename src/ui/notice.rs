//! User-facing notices

use std::fmt;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded
    Info,
    /// Nothing went wrong, but there is nothing to show
    Warning,
    /// Operation failed
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the user
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }

    /// Upload succeeded and the selector was filled
    pub fn upload_succeeded() -> Self {
        Self::new(
            NoticeLevel::Info,
            "File uploaded successfully! Select a Taluk to analyze.",
        )
    }

    /// Upload succeeded but the file had no Taluks
    pub fn no_taluks_found() -> Self {
        Self::new(NoticeLevel::Warning, "No Taluks found in the uploaded file.")
    }

    /// Upload request failed
    pub fn upload_failed() -> Self {
        Self::new(NoticeLevel::Error, "Error uploading file. Please try again.")
    }

    /// Upload submitted without a file
    pub fn no_file_selected() -> Self {
        Self::new(NoticeLevel::Warning, "Please select a file to upload.")
    }

    /// Analysis submitted without a Taluk
    pub fn no_region_selected() -> Self {
        Self::new(NoticeLevel::Warning, "Please select a Taluk to analyze.")
    }

    /// Analysis reply carried no fragments
    pub fn no_data() -> Self {
        Self::new(NoticeLevel::Warning, "No data available to display.")
    }

    /// Analysis request failed
    pub fn analysis_failed() -> Self {
        Self::new(
            NoticeLevel::Error,
            "Error generating charts. Please try again.",
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{prefix}] {}", self.message)
    }
}
