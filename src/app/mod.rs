use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    calendar::{self, Clock, MonthPartition},
    config::AppConfig,
    notify::{Severity, Toasts},
    ui::draw,
};

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub clock:      Clock,
    pub today:      NaiveDate,
    /// Zero-based, as `partition_month` takes it.
    pub view_month: i32,
    pub view_year:  i32,
    pub partition:  MonthPartition,
    pub toasts:     Toasts,
    pub running:    bool,
}

impl App {
    pub fn new(cfg: &AppConfig) -> Self {
        let clock = cfg.clock();
        let today = clock.today();
        let mut app = Self {
            clock,
            today,
            view_month: today.month0() as i32,
            view_year:  today.year(),
            partition:  MonthPartition::default(),
            toasts:     cfg.toasts(),
            running:    true,
        };
        app.refresh();
        app
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term);

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen)?;
        term.show_cursor()?;
        result
    }

    fn event_loop(&mut self, term: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick = std::time::Duration::from_millis(100);
        while self.running {
            self.toasts.expire();
            term.draw(|f| draw(f, self))?;

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc   => self.running = false,
            KeyCode::Char(']') | KeyCode::Right => self.shift_month(1),
            KeyCode::Char('[') | KeyCode::Left  => self.shift_month(-1),
            KeyCode::Char('}') | KeyCode::Down  => self.shift_month(12),
            KeyCode::Char('{') | KeyCode::Up    => self.shift_month(-12),
            KeyCode::Char('t') => self.jump_today(),
            _ => {
                self.toasts.push("Keys: [ ] month  { } year  t today  q quit", Severity::Info);
            }
        }
    }

    pub fn shift_month(&mut self, delta: i32) {
        let (year, month) = calendar::normalize_month(self.view_month.saturating_add(delta), self.view_year);
        self.view_year  = year;
        self.view_month = month as i32 - 1;
        self.refresh();
    }

    pub fn jump_today(&mut self) {
        self.today = self.clock.today();
        let (month, year) = (self.today.month0() as i32, self.today.year());
        if (month, year) == (self.view_month, self.view_year) {
            self.toasts.push("Already showing the current month", Severity::Info);
            return;
        }
        self.view_month = month;
        self.view_year  = year;
        self.refresh();
    }

    /// Month number for display, 1..=12.
    pub fn view_month_number(&self) -> u32 {
        self.view_month as u32 + 1
    }

    fn refresh(&mut self) {
        self.partition = calendar::partition_month(self.view_month, self.view_year);
        if self.partition.is_empty() {
            self.toasts.push("Month is outside the supported date range", Severity::Warning);
        }
        tracing::debug!(month = self.view_month, year = self.view_year, "viewing month");
    }
}
