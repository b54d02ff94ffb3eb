//! In-memory report page
//!
//! `HtmlPage` models the page the controller drives: the Taluk dropdown, the
//! four analysis containers and a log of notices. The console host renders it
//! to a standalone HTML document after every applied reply; tests inspect it
//! directly.

use crate::api::FragmentSlot;
use crate::error::{AnalyzerError, Result};
use crate::ui::{
    FragmentContainer, FragmentContainers, Notice, NoticePresenter, RegionSelector, UiSurface,
};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct PageState {
    options: Vec<String>,
    selected: Option<String>,
    selector_enabled: bool,
    fragments: [String; 4],
    notices: Vec<Notice>,
}

/// Shared handle to the page; clones refer to the same page
#[derive(Debug, Clone, Default)]
pub struct HtmlPage {
    state: Arc<Mutex<PageState>>,
}

impl HtmlPage {
    /// Empty page with a disabled selector
    pub fn new() -> Self {
        Self::default()
    }

    /// UI surface backed by this page, recording notices on the page
    pub fn surface(&self) -> UiSurface {
        self.surface_with_notices(Box::new(PageNotices(self.clone())))
    }

    /// UI surface backed by this page with a custom notice presenter
    pub fn surface_with_notices(&self, notices: Box<dyn NoticePresenter>) -> UiSurface {
        let container = |slot: FragmentSlot| -> Box<dyn FragmentContainer> {
            Box::new(PageContainer {
                page: self.clone(),
                slot,
            })
        };

        UiSurface {
            selector: Box::new(PageSelector(self.clone())),
            containers: FragmentContainers {
                charts: container(FragmentSlot::Charts),
                village_heatmap: container(FragmentSlot::VillageHeatmap),
                demographics: container(FragmentSlot::Demographics),
                detection_delay: container(FragmentSlot::DetectionDelay),
            },
            notices,
        }
    }

    /// Select a Taluk as the user would
    ///
    /// Returns `false` when the selector is disabled or `taluk` is not an option.
    pub fn select(&self, taluk: &str) -> bool {
        let mut state = self.state.lock();
        if !state.selector_enabled || !state.options.iter().any(|o| o == taluk) {
            return false;
        }
        state.selected = Some(taluk.to_string());
        true
    }

    /// Current dropdown options
    pub fn options(&self) -> Vec<String> {
        self.state.lock().options.clone()
    }

    /// Current selection
    pub fn selected(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    /// Whether the dropdown accepts input
    pub fn is_selector_enabled(&self) -> bool {
        self.state.lock().selector_enabled
    }

    /// Content of a container
    pub fn container_html(&self, slot: FragmentSlot) -> String {
        self.state.lock().fragments[slot.index()].clone()
    }

    /// Replace a container's content directly
    pub fn set_container_html(&self, slot: FragmentSlot, markup: &str) {
        self.state.lock().fragments[slot.index()] = markup.to_string();
    }

    /// Append a notice to the page's notice log
    pub fn record_notice(&self, notice: &Notice) {
        self.state.lock().notices.push(notice.clone());
    }

    /// All notices shown so far, oldest first
    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().notices.clone()
    }

    /// Most recent notice
    pub fn last_notice(&self) -> Option<Notice> {
        self.state.lock().notices.last().cloned()
    }

    /// Render the page as a standalone HTML document
    pub fn render(&self) -> String {
        let state = self.state.lock();
        let mut html = String::from(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Taluk analysis</title>\n</head>\n<body>\n",
        );

        if let Some(notice) = state.notices.last() {
            let _ = writeln!(
                html,
                "<p id=\"notice\">{}</p>",
                escape_html(&notice.message)
            );
        }

        let disabled = if state.selector_enabled { "" } else { " disabled" };
        let _ = writeln!(html, "<select id=\"talukSelect\"{disabled}>");
        for option in &state.options {
            let selected = if state.selected.as_deref() == Some(option.as_str()) {
                " selected"
            } else {
                ""
            };
            let escaped = escape_html(option);
            let _ = writeln!(html, "<option value=\"{escaped}\"{selected}>{escaped}</option>");
        }
        html.push_str("</select>\n");

        for slot in FragmentSlot::ALL {
            let _ = writeln!(
                html,
                "<div id=\"{}\">{}</div>",
                slot.container_id(),
                state.fragments[slot.index()]
            );
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Render the page and write it to `path` atomically
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        // Atomic write: write to temp file in the same directory, then rename
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(self.render().as_bytes())?;
        temp.persist(path).map_err(|e| AnalyzerError::IoError(e.error))?;

        debug!("Report page written to {}", path.display());
        Ok(())
    }
}

/// Escape text for use in element content and attribute values
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

struct PageSelector(HtmlPage);

impl RegionSelector for PageSelector {
    fn replace_options(&self, options: &[String]) {
        let mut state = self.0.state.lock();
        state.options = options.to_vec();
        state.selected = options.first().cloned();
    }

    fn set_enabled(&self, enabled: bool) {
        self.0.state.lock().selector_enabled = enabled;
    }

    fn selected(&self) -> Option<String> {
        self.0.selected()
    }
}

struct PageContainer {
    page: HtmlPage,
    slot: FragmentSlot,
}

impl FragmentContainer for PageContainer {
    fn set_html(&self, markup: &str) {
        self.page.set_container_html(self.slot, markup);
    }
}

struct PageNotices(HtmlPage);

impl NoticePresenter for PageNotices {
    fn show(&self, notice: &Notice) {
        self.0.record_notice(notice);
    }
}
