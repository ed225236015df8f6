// Interactive terminal dashboard. Runs on its own blocking thread and only ever reads the
// snapshots pushed through the watch channel; it has no access to live aggregator state.

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{ProbeResult, Snapshot, format_duration};

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Static labels for the view; everything dynamic comes from the snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub interface: String,
    pub lease_interval: Duration,
    pub connectivity_interval: Duration,
}

impl DashboardView {
    pub fn render(&self, frame: &mut Frame, snapshot: &Snapshot) {
        let [stats_area, recent_area, latest_area] = Layout::vertical([
            Constraint::Length(8),
            Constraint::Min(8),
            Constraint::Length(15),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(self.stats_lines(snapshot))
                .alignment(Alignment::Center)
                .block(Block::bordered().title(" NOC Watch ")),
            stats_area,
        );
        frame.render_widget(
            Paragraph::new(self.recent_lines(snapshot))
                .block(Block::bordered().title(" Test Results ")),
            recent_area,
        );
        frame.render_widget(
            Paragraph::new(latest_lines(snapshot))
                .block(Block::bordered().title(" Latest Test Results ")),
            latest_area,
        );
    }

    pub fn stats_lines(&self, s: &Snapshot) -> Vec<Line<'static>> {
        vec![
            Line::from(format!("WiFi Quality Monitor - {}", self.interface)),
            Line::from(vec![
                Span::raw("Current Time: "),
                Span::styled(
                    s.taken_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(vec![
                Span::raw(format!("Total Tests: {} | ", s.total_count)),
                Span::styled(
                    format!("Success: {}", s.success_count),
                    Style::default().fg(Color::Green),
                ),
                Span::raw(" | "),
                Span::styled(
                    format!("Failure: {}", s.failure_count()),
                    Style::default().fg(Color::Red),
                ),
            ]),
            rate_line("Success Rate", s.success_rate),
            rate_line("DHCP Success Rate", s.lease_success_rate),
            rate_line("Ping Success Rate", s.connectivity_success_rate),
        ]
    }

    pub fn recent_lines(&self, s: &Snapshot) -> Vec<Line<'static>> {
        let mut lines = vec![heading(format!(
            "DHCP Test Results (Every {}):",
            cadence(self.lease_interval)
        ))];
        if s.recent_lease.is_empty() {
            lines.push(waiting("  Waiting for first DHCP test..."));
        }
        for (i, r) in s.recent_lease.iter().enumerate() {
            lines.push(result_line(
                i,
                r,
                format!(
                    "DHCP: {}",
                    format_duration(r.lease_renew_duration().unwrap_or_default())
                ),
            ));
        }

        lines.push(Line::default());
        lines.push(heading(format!(
            "Ping Test Results (Every {}):",
            cadence(self.connectivity_interval)
        )));
        if s.recent_connectivity.is_empty() {
            lines.push(waiting("  Waiting for first ping test..."));
        }
        for (i, r) in s.recent_connectivity.iter().enumerate() {
            lines.push(result_line(
                i,
                r,
                format!(
                    "IPv4: {} IPv6: {} Latency: {}",
                    r.ipv4_reachable(),
                    r.ipv6_reachable(),
                    format_duration(r.latency())
                ),
            ));
        }
        lines
    }
}

pub fn latest_lines(s: &Snapshot) -> Vec<Line<'static>> {
    let mut lines = vec![heading("Latest DHCP Test:".into())];
    match s.latest_lease() {
        Some(r) => {
            lines.push(Line::from(format!("Time: {}", r.timestamp().format("%H:%M:%S"))));
            lines.push(Line::from(format!(
                "DHCP Renew: {}",
                format_duration(r.lease_renew_duration().unwrap_or_default())
            )));
            lines.push(Line::from(format!("Success: {}", r.success())));
        }
        None => lines.push(waiting("No DHCP tests completed yet.")),
    }

    lines.push(Line::default());
    lines.push(heading("Latest Ping Test:".into()));
    match s.latest_connectivity() {
        Some(r) => {
            lines.push(Line::from(format!("Time: {}", r.timestamp().format("%H:%M:%S"))));
            lines.push(Line::from(format!("IPv4: {}", r.ipv4_reachable())));
            lines.push(Line::from(format!("IPv6: {}", r.ipv6_reachable())));
            lines.push(Line::from(format!("Latency: {}", format_duration(r.latency()))));
            lines.push(Line::from(format!("Success: {}", r.success())));
        }
        None => lines.push(waiting("No ping tests completed yet.")),
    }
    lines
}

fn heading(text: String) -> Line<'static> {
    Line::styled(text, Style::default().fg(Color::Yellow))
}

fn waiting(text: &'static str) -> Line<'static> {
    Line::styled(text, Style::default().fg(Color::Yellow))
}

fn rate_line(label: &'static str, rate: f64) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(format!("{rate:.2}%"), Style::default().fg(Color::Yellow)),
    ])
}

fn result_line(index: usize, r: &ProbeResult, detail: String) -> Line<'static> {
    let marker = if r.success() {
        Span::styled("o", Style::default().fg(Color::Green))
    } else {
        Span::styled("x", Style::default().fg(Color::Red))
    };
    Line::from(vec![
        Span::raw(format!("  [{}] ", index + 1)),
        marker,
        Span::raw(format!(" {detail}")),
    ])
}

/// "5 minutes", "1 minute", "30 seconds".
fn cadence(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        60 => "1 minute".into(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".into(),
        s => format!("{s} seconds"),
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Terminal modes switched on so far. Dropping the guard switches them off again, so an error
/// halfway through setup never leaves the shell in raw mode.
struct TerminalGuard {
    raw_mode: bool,
    alternate_screen: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self, DashboardError> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw_mode: true,
            alternate_screen: false,
        };
        stdout().execute(EnterAlternateScreen)?;
        guard.alternate_screen = true;
        Ok(guard)
    }

    /// Undoes the modes that were entered, each at most once.
    fn restore_with(
        &mut self,
        leave_alternate_screen: impl FnOnce() -> io::Result<()>,
        disable_raw: impl FnOnce() -> io::Result<()>,
    ) -> io::Result<()> {
        let mut first_err = None;
        if std::mem::take(&mut self.alternate_screen) {
            first_err = leave_alternate_screen().err();
        }
        if std::mem::take(&mut self.raw_mode) {
            if let Err(e) = disable_raw() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn restore(&mut self) -> io::Result<()> {
        self.restore_with(
            || stdout().execute(LeaveAlternateScreen).map(|_| ()),
            disable_raw_mode,
        )
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Takes over the terminal until the user quits or the snapshot sender goes away.
/// Terminal setup failure is returned to the caller; there is no degraded mode.
pub fn run(rx: watch::Receiver<Snapshot>, view: DashboardView) -> Result<(), DashboardError> {
    let mut guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = event_loop(&mut terminal, rx, &view);

    guard.restore()?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    mut rx: watch::Receiver<Snapshot>,
    view: &DashboardView,
) -> Result<(), DashboardError> {
    let mut dirty = true;
    loop {
        if dirty {
            let snapshot = rx.borrow_and_update().clone();
            terminal.draw(|frame| view.render(frame, &snapshot))?;
        }

        dirty = false;
        if event::poll(POLL_TIMEOUT)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press && is_quit(&key) => {
                    return Ok(());
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        match rx.has_changed() {
            Ok(changed) => dirty |= changed,
            Err(_) => return Ok(()),
        }
    }
}
