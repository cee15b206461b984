//! TUI application and event loop
//!
//! Owns terminal setup/teardown, keyboard handling and the tab selection.
//! Everything it shows is read from the dashboard's shared state.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
};
use tokio::runtime::Handle;
use tracing::debug;

use super::views::{
    render_consistency_view, render_events_view, render_footer, render_stats_view, render_tabs,
};
use crate::dashboard::Dashboard;
use crate::fetch::Fetcher;
use crate::view::{View, ViewState};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// How long to wait for input before redrawing
    pub frame_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
        }
    }
}

/// Result type for TUI operations
pub type TuiResult<T> = std::result::Result<T, TuiError>;

/// Errors that can occur in the TUI
#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The main TUI application
pub struct App<F: Fetcher + 'static> {
    dashboard: Dashboard<F>,
    runtime: Handle,
    config: AppConfig,
    view_state: ViewState,
    should_quit: bool,
}

impl<F: Fetcher + 'static> App<F> {
    pub fn new(dashboard: Dashboard<F>, runtime: Handle, config: AppConfig) -> Self {
        Self {
            dashboard,
            runtime,
            config,
            view_state: ViewState::default(),
            should_quit: false,
        }
    }

    #[must_use]
    pub fn active_view(&self) -> View {
        self.view_state.active()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the event loop until the user quits
    pub fn run(&mut self) -> TuiResult<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        let result = self.event_loop(&mut terminal);

        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> TuiResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| {
                self.render(frame.area(), frame.buffer_mut());
            })?;

            if event::poll(self.config.frame_interval)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('c') => self.trigger_check(),
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.view_state.select_prev();
            }
            KeyCode::Tab => self.view_state.select_next(),
            KeyCode::BackTab => self.view_state.select_prev(),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c.to_digit(10).unwrap_or(0) as usize;
                if let Some(view) = idx.checked_sub(1).and_then(View::from_index) {
                    self.view_state.select(view);
                }
            }
            _ => {}
        }
    }

    fn trigger_check(&self) {
        let orchestrator = std::sync::Arc::clone(self.dashboard.orchestrator());
        if orchestrator.is_in_flight() {
            debug!("Trigger ignored, check already running");
            return;
        }
        self.runtime.spawn(async move {
            orchestrator.trigger().await;
        });
    }

    fn request_refresh(&self) {
        let poller = std::sync::Arc::clone(self.dashboard.poller());
        self.runtime.spawn(async move {
            poller.poll_once().await;
        });
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Tab bar
                Constraint::Min(8),    // Main content
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let state = self.dashboard.state().snapshot();
        let active = self.view_state.active();
        render_tabs(active, chunks[0], buf);
        match active {
            View::Stats => render_stats_view(&state, chunks[1], buf),
            View::Events => render_events_view(&state, chunks[1], buf),
            View::Consistency => render_consistency_view(&state.check, chunks[1], buf),
        }
        render_footer(&state, chunks[2], buf);
    }
}

/// Run the TUI on the current thread until the user quits.
///
/// Must be called from a thread that may block, with `runtime` pointing at
/// the runtime that drives the dashboard's tasks.
pub fn run_tui<F: Fetcher + 'static>(
    dashboard: Dashboard<F>,
    runtime: Handle,
    config: AppConfig,
) -> TuiResult<()> {
    App::new(dashboard, runtime, config).run()
}
