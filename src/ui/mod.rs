use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::calendar::{month_name, Week};
use crate::notify::Severity;

// ─── Palette ──────────────────────────────────────────────────────────────────

const BG:      Color = Color::Rgb(0x1e, 0x1e, 0x2e);
const FG:      Color = Color::Rgb(0xcd, 0xd6, 0xf4);
const DIM:     Color = Color::Rgb(0x6c, 0x70, 0x86);
const ACCENT:  Color = Color::Rgb(0x89, 0xb4, 0xfa);
const BORDER:  Color = Color::Rgb(0x45, 0x47, 0x5a);
const WEEKEND: Color = Color::Rgb(0xf3, 0x8b, 0xa8);
const TODAY:   Color = Color::Rgb(0xcb, 0xa6, 0xf7);

fn severity_color(s: Severity) -> Color {
    match s {
        Severity::Success => Color::Rgb(0xa6, 0xe3, 0xa1),
        Severity::Error   => Color::Rgb(0xf3, 0x8b, 0xa8),
        Severity::Warning => Color::Rgb(0xf9, 0xe2, 0xaf),
        Severity::Info    => ACCENT,
    }
}

/// Which part of the partition a row came from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RowKind { ExtraStart, Full, ExtraEnd }

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(BG).fg(FG)), area);

    // Layout: [ content | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)]).split(area);

    // Content: [ calendar(34) | summary ]
    let cols = Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)]).split(root[0]);

    draw_calendar(f, app, cols[0]);
    draw_summary(f, app, cols[1]);
    draw_statusbar(f, app, root[1]);
}

// ─── Calendar ─────────────────────────────────────────────────────────────────

fn draw_calendar(f: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(Span::styled(
        format!(" {} {} ", month_name(app.view_month_number()), app.view_year),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(BG));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = vec![];

    // Header row: Mo Tu We Th Fr Sa Su
    let hdrs: Vec<Span> = ["Mo","Tu","We","Th","Fr","Sa","Su"].iter().enumerate().map(|(i, d)| {
        let fg = if i >= 5 { WEEKEND } else { DIM };
        Span::styled(format!(" {d} "), Style::default().fg(fg).add_modifier(Modifier::BOLD))
    }).collect();
    lines.push(Line::from(hdrs));
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(BORDER),
    )));

    let p = &app.partition;
    let rows = p.extra_start_week.iter().map(|w| (w, RowKind::ExtraStart))
        .chain(p.full_weeks.iter().map(|w| (w, RowKind::Full)))
        .chain(p.extra_end_week.iter().map(|w| (w, RowKind::ExtraEnd)));
    for (week, kind) in rows {
        lines.push(week_line(week, kind, app.today));
    }

    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(BG)).alignment(Alignment::Left),
        inner,
    );
}

fn week_line(week: &Week, kind: RowKind, today: NaiveDate) -> Line<'static> {
    let spans: Vec<Span> = week.iter().enumerate().map(|(col, slot)| {
        let Some(date) = slot else { return Span::raw("    ") };
        let style = if *date == today {
            Style::default().bg(TODAY).fg(BG).add_modifier(Modifier::BOLD)
        } else if kind != RowKind::Full {
            Style::default().fg(DIM)
        } else if col >= 5 {
            Style::default().fg(WEEKEND)
        } else {
            Style::default().fg(FG)
        };
        Span::styled(format!(" {:2} ", date.day()), style)
    }).collect();
    Line::from(spans)
}

// ─── Summary panel ────────────────────────────────────────────────────────────

fn draw_summary(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Line::from(Span::styled(" Weeks ", Style::default().fg(ACCENT))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(BG));

    let p   = &app.partition;
    let dim = Style::default().fg(DIM);
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let lines = vec![
        Line::from(Span::styled(format!("  Full weeks      {}", p.full_weeks.len()), Style::default().fg(FG))),
        Line::from(Span::styled(format!("  Extra start     {}", yes_no(p.extra_start_week.is_some())), dim)),
        Line::from(Span::styled(format!("  Extra end       {}", yes_no(p.extra_end_week.is_some())), dim)),
        Line::from(Span::styled(format!("  Days            {}", p.dates().count()), dim)),
        Line::from(""),
        Line::from(Span::styled("  [ / ]  month   { / }  year", dim)),
        Line::from(Span::styled("  t      today   q      quit", dim)),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.toasts.latest() {
        Some(n) => Line::from(Span::styled(
            format!(" {} ", n.message),
            Style::default().fg(severity_color(n.severity)),
        )),
        None => Line::from(Span::styled(
            format!(" today {} ", app.today.format("%A, %B %-d")),
            Style::default().fg(DIM),
        )),
    };
    f.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}
