//! TUI views
//!
//! Each function draws one region from an owned copy of the dashboard
//! state. Table contents come from the pure reconciliation model.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget, Wrap},
};

use crate::model::{EventKind, Subsystem};
use crate::reconcile::{KeyValueTable, MissingList, NO_DATA, key_value_table};
use crate::snapshot::Panel;
use crate::state::{CheckState, CheckStatus, DashboardState};
use crate::view::View;

/// Render the navigation tabs at the top
pub fn render_tabs(current_view: View, area: Rect, buf: &mut Buffer) {
    let titles: Vec<Line> = View::all()
        .iter()
        .map(|v| {
            let style = if *v == current_view {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{} {}", v.index() + 1, v.name()), style))
        })
        .collect();

    Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(current_view.index())
        .highlight_style(Style::default().fg(Color::Yellow))
        .render(area, buf);
}

fn table_lines(table: &KeyValueTable) -> Vec<Line<'static>> {
    match table {
        KeyValueTable::NoData => vec![Line::from(Span::styled(
            NO_DATA,
            Style::default().fg(Color::Gray),
        ))],
        KeyValueTable::Rows(rows) => {
            let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
            rows.iter()
                .map(|row| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:<width$}  ", row.key),
                            Style::default().fg(Color::Cyan),
                        ),
                        Span::raw(row.value.clone()),
                    ])
                })
                .collect()
        }
    }
}

fn render_panel(title: &str, panel: &Panel, area: Rect, buf: &mut Buffer) {
    let lines = match panel {
        Panel::Loading => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))],
        Panel::Ready { data } => table_lines(&key_value_table(Some(data))),
        Panel::Failed { message } => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
    };
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .render(area, buf);
}

fn halves(area: Rect, direction: Direction) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Processing and analyzer stats side by side
pub fn render_stats_view(state: &DashboardState, area: Rect, buf: &mut Buffer) {
    let chunks = halves(area, Direction::Horizontal);
    render_panel(
        "Processing Stats",
        &state.ambient.processing_stats,
        chunks[0],
        buf,
    );
    render_panel("Analyzer Stats", &state.ambient.analyzer_stats, chunks[1], buf);
}

/// Most recent motion and temperature events
pub fn render_events_view(state: &DashboardState, area: Rect, buf: &mut Buffer) {
    let chunks = halves(area, Direction::Horizontal);
    render_panel(
        "Latest Motion Event",
        state.ambient.latest(EventKind::Motion),
        chunks[0],
        buf,
    );
    render_panel(
        "Latest Temperature Event",
        state.ambient.latest(EventKind::Temperature),
        chunks[1],
        buf,
    );
}

fn status_style(status: &CheckStatus) -> Style {
    match status {
        CheckStatus::Idle => Style::default().fg(Color::Gray),
        CheckStatus::Running => Style::default().fg(Color::Yellow),
        CheckStatus::Completed { .. } => Style::default().fg(Color::Green),
        CheckStatus::NotYetRun => Style::default().fg(Color::Gray),
        CheckStatus::Failed { .. } | CheckStatus::TriggerFailed { .. } => {
            Style::default().fg(Color::Red)
        }
    }
}

fn missing_lines(list: &MissingList) -> Vec<Line<'static>> {
    let summary_style = if list.rows.is_empty() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let mut lines = vec![Line::from(Span::styled(list.summary.clone(), summary_style))];
    if !list.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{:<12} {:<24} {}", "type", "event_id", "trace_id"),
            Style::default().add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines.extend(list.rows.iter().map(|row| {
        Line::from(format!(
            "{:<12} {:<24} {}",
            row.kind.as_str(),
            row.event_id,
            row.trace_id
        ))
    }));
    lines
}

/// Status line, count matrix and both missing lists
pub fn render_consistency_view(check: &CheckState, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Status
            Constraint::Length(7), // Counts
            Constraint::Min(4),    // Missing lists
        ])
        .split(area);

    let trigger_hint = if check.trigger_enabled() {
        Span::styled("[c] run check", Style::default().fg(Color::Cyan))
    } else {
        Span::styled("running...", Style::default().fg(Color::DarkGray))
    };
    let mut status_lines = vec![Line::from(vec![
        Span::styled(check.status.message(), status_style(&check.status)),
        Span::raw("  "),
        trigger_hint,
    ])];
    if let Some(ms) = check.last_run_ms {
        status_lines.push(Line::from(Span::styled(
            format!("Last run took {ms}ms"),
            Style::default().fg(Color::Gray),
        )));
    }
    Paragraph::new(status_lines)
        .block(
            Block::default()
                .title("Consistency Check")
                .borders(Borders::ALL),
        )
        .render(chunks[0], buf);

    // Never audited: leave the results area empty rather than zeroed.
    let Some(view) = check.view() else {
        return;
    };

    let mut count_lines = vec![Line::from(Span::styled(
        format!("{:<12} {:>8} {:>12}", "subsystem", "motion", "temperature"),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ))];
    for subsystem in Subsystem::ALL {
        let cell = |kind| view.count(subsystem, kind).unwrap_or(0);
        count_lines.push(Line::from(format!(
            "{:<12} {:>8} {:>12}",
            subsystem.as_str(),
            cell(EventKind::Motion),
            cell(EventKind::Temperature)
        )));
    }
    let counts_title = view.last_updated.as_deref().map_or_else(
        || "Counts".to_string(),
        |ts| format!("Counts (audited {ts})"),
    );
    Paragraph::new(count_lines)
        .block(Block::default().title(counts_title).borders(Borders::ALL))
        .render(chunks[1], buf);

    let lists = halves(chunks[2], Direction::Horizontal);
    Paragraph::new(missing_lines(&view.missing_in_db))
        .block(Block::default().title("Missing in DB").borders(Borders::ALL))
        .render(lists[0], buf);
    Paragraph::new(missing_lines(&view.missing_in_queue))
        .block(
            Block::default()
                .title("Missing in Queue")
                .borders(Borders::ALL),
        )
        .render(lists[1], buf);
}

/// Last-updated time and key hints
pub fn render_footer(state: &DashboardState, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Line::from(vec![
        Span::styled(state.last_updated_label(), Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(
            "q quit  Tab/1-3 switch  r refresh  c check",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConsistencyCheckResult, ConsistencyCounts, EventRecord, KindCounts};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn consistency_view_hides_results_until_audited() {
        let area = Rect::new(0, 0, 90, 24);
        let mut buf = Buffer::empty(area);
        let check = CheckState {
            status: CheckStatus::NotYetRun,
            ..CheckState::default()
        };
        render_consistency_view(&check, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("No consistency checks have been run yet"));
        assert!(!text.contains("Missing in Queue"));
    }

    #[test]
    fn consistency_view_shows_diff_rows() {
        let area = Rect::new(0, 0, 120, 24);
        let mut buf = Buffer::empty(area);
        let check = CheckState {
            result: Some(ConsistencyCheckResult {
                counts: ConsistencyCounts {
                    db: KindCounts {
                        motion: 5,
                        temperature: 3,
                    },
                    queue: KindCounts {
                        motion: 5,
                        temperature: 2,
                    },
                    processing: KindCounts {
                        motion: 5,
                        temperature: 3,
                    },
                },
                missing_in_db: Vec::new(),
                missing_in_queue: vec![EventRecord {
                    kind: EventKind::Temperature,
                    event_id: "e1".to_string(),
                    trace_id: "t1".to_string(),
                    timestamp: None,
                }],
                last_updated: None,
                processing_time_ms: None,
            }),
            in_flight: true,
            ..CheckState::default()
        };
        render_consistency_view(&check, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("1 events missing"));
        assert!(text.contains("0 events missing"));
        assert!(text.contains("e1"));
        assert!(text.contains("t1"));
        assert!(text.contains("running..."));
    }

    #[test]
    fn stats_view_renders_notice_for_empty_snapshot() {
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        let mut state = DashboardState::default();
        state.ambient.processing_stats = Panel::Ready {
            data: serde_json::json!({}),
        };
        render_stats_view(&state, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains(NO_DATA));
        assert!(text.contains("Loading..."));
    }
}
