//! `talukscope` - Taluk-level analysis client
//!
//! Console front end: upload a case spreadsheet, pick a Taluk, and view the
//! server-rendered analysis in a generated HTML report page.

// Console host is only in the binary, not the library
mod console;

use anyhow::{Context, Result};
use console::{ConsoleHost, ConsoleNotices};
use std::sync::Arc;
use talukscope::{
    api::HttpAnalysisClient,
    config::ConfigManager,
    controller::AnalysisController,
    error::get_user_friendly_error,
    ui::HtmlPage,
    utils,
};
use tracing::{error, info};

/// Main entry point for the application
fn main() -> Result<()> {
    utils::init_logging().context("Failed to initialize logging system")?;

    info!("talukscope v{} starting...", env!("CARGO_PKG_VERSION"));

    let config =
        ConfigManager::load_or_init().context("Failed to load application configuration")?;
    info!(
        "Configuration loaded: server {}, report {}",
        config.server.base_url,
        config.page.report_path.display()
    );

    let client = match HttpAnalysisClient::new(&config.server) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create analysis server client: {}", e);
            eprintln!("{}", get_user_friendly_error(&e));
            return Err(e).context("Failed to create analysis server client");
        }
    };

    let page = HtmlPage::new();
    let surface = page.surface_with_notices(Box::new(ConsoleNotices::new(page.clone())));
    let controller = AnalysisController::new(
        Arc::new(client),
        surface,
        config.page.absent_fragment_policy,
    );
    controller.initialize();

    info!("Starting console event loop");
    ConsoleHost::new(controller, page, config.page.report_path.clone())
        .run()
        .context("Console event loop terminated with error")?;

    info!("talukscope shutting down");

    Ok(())
}
