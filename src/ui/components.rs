//! Panels of the full-screen dashboard

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{BuildSummary, Phase, Progress};

const LOG_CAPACITY: usize = 200;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase plus what is installed against what the listing offers
pub struct StatusPanel {
    phase: Phase,
    builds: Option<BuildSummary>,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Checking,
            builds: None,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_builds(&mut self, builds: BuildSummary) {
        self.builds = Some(builds);
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    fn phase_line(&self) -> Line<'_> {
        let (glyph, color) = match self.phase {
            Phase::Checking => ("?", Color::Cyan),
            Phase::Downloading => ("↓", Color::Yellow),
            Phase::Extracting => ("▤", Color::Yellow),
            Phase::Propagating => ("⇉", Color::Cyan),
            Phase::Launching => ("▶", Color::Magenta),
            Phase::Complete => ("✓", Color::Green),
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled(format!(" {} ", glyph), style),
            Span::styled(self.phase.to_string(), style),
        ])
    }

    fn build_lines(&self) -> Vec<Line<'_>> {
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
        let number = |build: Option<u32>| match build {
            Some(n) => format!("#{}", n),
            None => "none".to_string(),
        };

        let Some(builds) = &self.builds else {
            return vec![Line::from(vec![label("   Looking up builds...")])];
        };

        let selected_style = if builds.is_upgrade() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };

        vec![
            Line::from(vec![
                label("   Installed  "),
                Span::raw(number(builds.installed)),
            ]),
            Line::from(vec![
                label("   Available  "),
                Span::raw(number(builds.available)),
            ]),
            Line::from(vec![
                label("   Running    "),
                Span::styled(format!("#{}", builds.selected), selected_style),
                Span::styled(
                    format!("  released {}", builds.released),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![self.phase_line()];
        lines.extend(self.build_lines());
        if !self.info.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(panel(" catalauncher ")), area);
    }
}

/// Download progress; an unknown total shows the byte count without a bar
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        match &self.progress {
            Some(progress) if progress.total > 0 => {
                let gauge = Gauge::default()
                    .block(block)
                    .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
                    .ratio(progress.ratio().min(1.0))
                    .label(format!(
                        "{} ({:.0}%)",
                        progress.label,
                        progress.ratio() * 100.0
                    ));
                frame.render_widget(gauge, area);
            }
            Some(progress) => {
                let text = Line::from(Span::styled(
                    format!(" {} so far", progress.label),
                    Style::default().fg(Color::Cyan),
                ));
                frame.render_widget(Paragraph::new(text).block(block), area);
            }
            None => frame.render_widget(Paragraph::new("").block(block), area),
        }
    }
}

/// Most recent status lines, newest at the bottom
pub struct LogPanel {
    entries: VecDeque<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = usize::from(area.height.saturating_sub(2));
        let start = self.entries.len().saturating_sub(visible);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self
            .entries
            .range(start..)
            .zip(start..)
            .map(|(entry, index)| {
                let color = if index == newest {
                    Color::White
                } else if entry.starts_with("Copying") {
                    Color::DarkGray
                } else {
                    Color::Gray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_status_panel_shows_installed_and_available_builds() {
        let mut status = StatusPanel::new();
        status.set_phase(Phase::Downloading);
        status.set_builds(BuildSummary {
            selected: 12,
            installed: Some(10),
            available: Some(12),
            released: "2024-02-01 10:00".to_string(),
        });

        let mut terminal = Terminal::new(TestBackend::new(60, 7)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                status.render(frame, area);
            })
            .unwrap();

        let screen = rendered(&terminal);
        assert!(screen.contains("Downloading build"));
        assert!(screen.contains("Installed  #10"));
        assert!(screen.contains("Available  #12"));
        assert!(screen.contains("released 2024-02-01 10:00"));
    }

    #[test]
    fn test_status_panel_before_lookup() {
        let status = StatusPanel::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                status.render(frame, area);
            })
            .unwrap();
        assert!(rendered(&terminal).contains("Looking up builds"));
    }

    #[test]
    fn test_progress_panel_without_total() {
        let mut progress = ProgressPanel::new();
        progress.set_progress(Progress::new(4096, 0, "4.1 KB"));

        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                progress.render(frame, area);
            })
            .unwrap();
        assert!(rendered(&terminal).contains("4.1 KB so far"));
    }

    #[test]
    fn test_log_panel_keeps_most_recent_entries() {
        let mut log = LogPanel::new();
        for i in 0..250 {
            log.add(format!("line {}", i));
        }
        assert_eq!(log.entries.len(), LOG_CAPACITY);
        assert_eq!(log.entries.front().map(String::as_str), Some("line 50"));

        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                log.render(frame, area);
            })
            .unwrap();
        let screen = rendered(&terminal);
        assert!(screen.contains("line 249"));
        assert!(screen.contains("line 248"));
        assert!(!screen.contains("line 247"));
    }
}
