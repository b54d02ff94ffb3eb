//! Console host
//!
//! Drives the controller from line-oriented commands on stdin. Notices are
//! printed as they happen; the report page is re-rendered to disk whenever a
//! reply has been applied.
//!
//! Stdin is read on its own thread so replies keep being applied while the
//! user is typing, mirroring the single UI thread of a windowed host.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use talukscope::api::UploadFile;
use talukscope::controller::AnalysisController;
use talukscope::error::get_user_friendly_error;
use talukscope::ui::{HtmlPage, Notice, NoticePresenter};
use tracing::{debug, info, warn};

/// How long the loop waits for input before checking for replies
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for in-flight replies once stdin is closed
const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

const HELP: &str = "\
Commands:
  upload <path>    upload a spreadsheet and load its Taluks
  regions          list the loaded Taluks
  select <taluk>   choose the Taluk to analyze
  analyze          request the analysis for the selected Taluk
  help             show this help
  quit             exit";

/// Prints notices and records them on the page
pub struct ConsoleNotices {
    page: HtmlPage,
}

impl ConsoleNotices {
    /// Presenter recording into `page`
    pub fn new(page: HtmlPage) -> Self {
        Self { page }
    }
}

impl NoticePresenter for ConsoleNotices {
    fn show(&self, notice: &Notice) {
        println!("{notice}");
        self.page.record_notice(notice);
    }
}

/// One parsed input line
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `upload [path]`
    Upload(Option<PathBuf>),
    /// `regions`
    Regions,
    /// `select <taluk>`
    Select(String),
    /// `analyze`
    Analyze,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
    /// Blank line
    Empty,
    /// Anything else
    Unknown(String),
}

/// Parse one input line; arguments keep their inner spaces
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "upload" => Command::Upload((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "regions" | "taluks" => Command::Regions,
        "select" => Command::Select(rest.to_string()),
        "analyze" | "analyse" => Command::Analyze,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(word.to_string()),
    }
}

/// Console front end around the controller
pub struct ConsoleHost {
    controller: AnalysisController,
    page: HtmlPage,
    report_path: PathBuf,
}

impl ConsoleHost {
    /// Host for an initialized controller driving `page`
    pub fn new(controller: AnalysisController, page: HtmlPage, report_path: PathBuf) -> Self {
        Self {
            controller,
            page,
            report_path,
        }
    }

    /// Run until `quit` or end of input
    pub fn run(&self) -> Result<()> {
        let (line_sender, line_receiver) = mpsc::channel::<String>();
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if line_sender.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to read from stdin: {}", e);
                            break;
                        }
                    }
                }
            })
            .context("Failed to spawn stdin reader thread")?;

        self.render_report();
        println!("{HELP}");
        println!("Report page: {}", self.report_path.display());
        prompt();

        info!("Entering console event loop");
        loop {
            match line_receiver.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    if self.handle_command(parse_command(&line)).is_break() {
                        break;
                    }
                    prompt();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Input closed");
                    self.drain_pending();
                    break;
                }
            }

            if self.controller.process_pending_events() > 0 {
                self.render_report();
                prompt();
            }
        }
        info!("Console event loop exited");

        Ok(())
    }

    fn handle_command(&self, command: Command) -> ControlFlow<()> {
        debug!("Console command: {:?}", command);

        match command {
            Command::Upload(path) => self.upload(path.as_deref()),
            Command::Regions => self.print_regions(),
            Command::Select(taluk) => {
                if self.page.select(&taluk) {
                    println!("Selected {taluk}");
                    self.render_report();
                } else {
                    println!("Unknown Taluk '{taluk}'. Use `regions` to list the loaded Taluks.");
                }
            }
            Command::Analyze => {
                // Every failure has already been shown as a notice
                if let Err(e) = self.controller.submit_analysis() {
                    debug!("Analysis not dispatched: {}", e);
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return ControlFlow::Break(()),
            Command::Empty => {}
            Command::Unknown(word) => println!("Unknown command '{word}'. Type `help`."),
        }
        ControlFlow::Continue(())
    }

    fn upload(&self, path: Option<&Path>) {
        let file = match path.map(UploadFile::from_path).transpose() {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to read upload file: {}", e);
                println!("{}", get_user_friendly_error(&e));
                return;
            }
        };

        if let Err(e) = self.controller.submit_upload(file) {
            debug!("Upload not dispatched: {}", e);
        }
    }

    fn print_regions(&self) {
        let options = self.page.options();
        if options.is_empty() {
            println!("No Taluks loaded. Upload a file first.");
            return;
        }

        let selected = self.page.selected();
        for option in options {
            let marker = if selected.as_deref() == Some(option.as_str()) {
                '*'
            } else {
                ' '
            };
            println!(" {marker} {option}");
        }
    }

    /// Apply replies still in flight when input ends
    fn drain_pending(&self) {
        while self.controller.pending_requests() > 0 {
            if !self.controller.wait_for_event(DRAIN_TIMEOUT) {
                warn!(
                    "Gave up waiting for {} pending request(s)",
                    self.controller.pending_requests()
                );
                break;
            }
            self.render_report();
        }
    }

    fn render_report(&self) {
        if let Err(e) = self.page.write_to(&self.report_path) {
            warn!(
                "Failed to write report page to {}: {}",
                self.report_path.display(),
                e
            );
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
