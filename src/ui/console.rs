//! Line-oriented terminal output

use indicatif::{ProgressBar, ProgressStyle};

use super::{BuildSummary, Phase, Ui};

/// Prints status lines to stdout and draws a progress bar while one is active
#[derive(Default)]
pub struct ConsoleUi {
    bar: Option<ProgressBar>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar_for(&mut self, total: u64) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            if total == 0 {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            } else {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("[{bar:40.cyan/blue}] {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=>-"),
                );
                bar
            }
        })
    }

    fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!("Phase: {}", phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.println(&info.into());
    }

    fn show_builds(&mut self, summary: &BuildSummary) {
        // The resolver already printed the same facts as status lines.
        tracing::debug!("Builds: {:?}", summary);
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let bar = self.bar_for(total);
        bar.set_position(current);
        bar.set_message(label.into());
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        self.println(&message.into());
    }
}
