//! UI surface module
//!
//! The controller never touches a concrete widget toolkit. It mutates the page
//! through the handles bundled in [`UiSurface`], which the host injects:
//!
//! - a [`RegionSelector`] for the Taluk dropdown,
//! - one [`FragmentContainer`] per analysis section,
//! - a [`NoticePresenter`] for user-facing messages.
//!
//! Handles are only called from the UI thread, so they take `&self` and use
//! interior mutability instead of requiring `Send`.

pub mod html_page;
pub mod notice;

pub use html_page::HtmlPage;
pub use notice::{Notice, NoticeLevel};

use crate::api::FragmentSlot;

/// Taluk dropdown
pub trait RegionSelector {
    /// Replace all options; the first option (if any) becomes the selection
    fn replace_options(&self, options: &[String]);

    /// Enable or disable user interaction
    fn set_enabled(&self, enabled: bool);

    /// Currently selected Taluk
    fn selected(&self) -> Option<String>;
}

/// Page container receiving server-rendered markup
pub trait FragmentContainer {
    /// Replace the container's content with `markup`, unmodified
    fn set_html(&self, markup: &str);
}

/// Shows notices to the user
pub trait NoticePresenter {
    /// Show one notice
    fn show(&self, notice: &Notice);
}

/// The four analysis containers, one per [`FragmentSlot`]
pub struct FragmentContainers {
    /// `#charts`
    pub charts: Box<dyn FragmentContainer>,
    /// `#villageHeatmap`
    pub village_heatmap: Box<dyn FragmentContainer>,
    /// `#ageGenderDistribution`
    pub demographics: Box<dyn FragmentContainer>,
    /// `#detectionDelayAnalysis`
    pub detection_delay: Box<dyn FragmentContainer>,
}

impl FragmentContainers {
    /// Container for `slot`
    pub fn get(&self, slot: FragmentSlot) -> &dyn FragmentContainer {
        match slot {
            FragmentSlot::Charts => self.charts.as_ref(),
            FragmentSlot::VillageHeatmap => self.village_heatmap.as_ref(),
            FragmentSlot::Demographics => self.demographics.as_ref(),
            FragmentSlot::DetectionDelay => self.detection_delay.as_ref(),
        }
    }
}

/// Everything the controller may mutate
pub struct UiSurface {
    /// Taluk dropdown
    pub selector: Box<dyn RegionSelector>,
    /// Analysis containers
    pub containers: FragmentContainers,
    /// Notice presenter
    pub notices: Box<dyn NoticePresenter>,
}
