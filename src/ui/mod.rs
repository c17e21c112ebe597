//! Operator feedback
//!
//! Provides a simple API for displaying launcher state:
//! - Current phase (Checking, Downloading, Extracting, Propagating, Launching)
//! - Installed, available and selected builds
//! - Progress (current/total with optional details)
//! - Activity log (status lines such as "Copying X mod to game dir")
//!
//! [`ConsoleUi`] prints plain lines with an `indicatif` bar, [`UiApp`] is a full-screen
//! `ratatui` dashboard, and [`SilentUi`]/[`RecordingUi`] serve tests and scripted use.

mod components;
mod console;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{LogPanel, ProgressPanel, StatusPanel};

pub use console::ConsoleUi;

/// Workflow phases shown in the status panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Checking,
    Downloading,
    Extracting,
    Propagating,
    Launching,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Checking => write!(f, "Checking for builds"),
            Phase::Downloading => write!(f, "Downloading build"),
            Phase::Extracting => write!(f, "Extracting build"),
            Phase::Propagating => write!(f, "Copying templates and extras"),
            Phase::Launching => write!(f, "Launching game"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    /// Fraction done; 0.0 when the total is unknown
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Installed versus available builds, as found while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// The build this run prepares
    pub selected: u32,
    /// Latest local build before this run
    pub installed: Option<u32>,
    /// Most recently released build in the listing
    pub available: Option<u32>,
    /// Release time of the selected build
    pub released: String,
}

impl BuildSummary {
    /// Whether the selected build is newer than anything installed
    pub fn is_upgrade(&self) -> bool {
        self.installed.map_or(true, |installed| installed < self.selected)
    }
}

/// Trait for UI implementations - allows both real TUI and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn show_builds(&mut self, summary: &BuildSummary);
    /// `total` is 0 when the size is not known up front
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

/// Full-screen dashboard
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl UiApp {
    /// Create a new UI application and enter the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            log: LogPanel::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(7), // Status panel
                    Constraint::Length(3), // Progress bar
                    Constraint::Min(5),    // Log panel
                ])
                .split(area);

            status.render(frame, chunks[0]);
            progress.render(frame, chunks[1]);
            log.render(frame, chunks[2]);
        })?;

        Ok(())
    }

    /// Show a final summary, wait for a key, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn show_builds(&mut self, summary: &BuildSummary) {
        self.status.set_builds(summary.clone());
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn show_builds(&mut self, _summary: &BuildSummary) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

/// Keeps everything it is told, for assertions
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub phases: Vec<Phase>,
    pub messages: Vec<String>,
    /// Last `(current, total)` reported
    pub progress: Option<(u64, u64)>,
    pub builds: Option<BuildSummary>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl Ui for RecordingUi {
    fn set_phase(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.messages.push(info.into());
    }

    fn show_builds(&mut self, summary: &BuildSummary) {
        self.builds = Some(summary.clone());
    }

    fn set_progress(&mut self, current: u64, total: u64, _label: impl Into<String>) {
        self.progress = Some((current, total));
    }

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(5, 10, "x").ratio(), 0.5);
        assert_eq!(Progress::new(5, 0, "x").ratio(), 0.0);
    }

    #[test]
    fn test_build_summary_upgrade() {
        let summary = |installed| BuildSummary {
            selected: 12,
            installed,
            available: Some(12),
            released: String::new(),
        };
        assert!(summary(None).is_upgrade());
        assert!(summary(Some(10)).is_upgrade());
        assert!(!summary(Some(12)).is_upgrade());
        assert!(!summary(Some(14)).is_upgrade());
    }

    #[test]
    fn test_recording_ui() {
        let mut ui = RecordingUi::new();
        ui.set_phase(Phase::Downloading);
        ui.log("Downloading build #12");
        ui.set_progress(3, 9, "3 B / 9 B");

        assert_eq!(ui.phases, vec![Phase::Downloading]);
        assert!(ui.saw("#12"));
        assert_eq!(ui.progress, Some((3, 9)));
    }
}
