use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Sparkline, Table};

use crate::format::{format_bytes, format_signed, format_signed_bytes};
use crate::system::sample::ResourceUsageSample;
use crate::system::snapshot::ProcessSnapshot;
use crate::ui::theme::Theme;

const SUMMARY_HEIGHT: u16 = 9;
const SPARKLINE_HEIGHT: u16 = 4;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    process: Option<&ProcessSnapshot>,
    baseline: Option<&ResourceUsageSample>,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Resource History ",
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(process) = process else {
        frame.render_widget(
            Paragraph::new(" No process selected").style(Style::default().fg(theme.text_secondary)),
            inner,
        );
        return;
    };

    // One consistent copy for the whole frame; the scan thread may append meanwhile.
    let history = process.history();

    let [summary_area, spark_area, table_area] = Layout::vertical([
        Constraint::Length(SUMMARY_HEIGHT),
        Constraint::Length(SPARKLINE_HEIGHT),
        Constraint::Min(0),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(summary_lines(process, history.last(), baseline, theme)),
        summary_area,
    );

    let handles: Vec<u64> = history.iter().map(|s| s.handles as u64).collect();
    let visible = handles.len().saturating_sub(spark_area.width as usize);
    frame.render_widget(
        Sparkline::default()
            .block(Block::default().borders(Borders::TOP).title(" Handles "))
            .data(handles[visible..].to_vec())
            .style(Style::default().fg(theme.sparkline_color)),
        spark_area,
    );

    render_table(frame, table_area, &history, theme);
}

fn summary_lines<'a>(
    process: &ProcessSnapshot,
    latest: Option<&ResourceUsageSample>,
    baseline: Option<&ResourceUsageSample>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let status = if process.is_alive() {
        Span::styled("running", Style::default().fg(theme.status_ok))
    } else {
        Span::styled(
            "exited",
            Style::default()
                .fg(theme.text_dead)
                .add_modifier(Modifier::ITALIC),
        )
    };
    let title = if process.window_title().is_empty() {
        "(none)".to_string()
    } else {
        process.window_title().to_string()
    };

    let mut lines = vec![
        detail_line("PID", Span::raw(process.pid().to_string()), theme),
        detail_line("Name", Span::raw(process.name().to_string()), theme),
        detail_line("Title", Span::raw(title), theme),
        detail_line("Status", status, theme),
        detail_line(
            "Samples",
            Span::raw(process.history_len().to_string()),
            theme,
        ),
    ];

    let Some(latest) = latest else {
        lines.push(detail_line(
            "Handles",
            Span::styled("no sample", Style::default().fg(theme.text_secondary)),
            theme,
        ));
        return lines;
    };

    let delta = baseline.map(|b| latest.delta_since(b));
    let mut handles = vec![Span::raw(latest.handles.to_string())];
    if let (Some(gdi), Some(user)) = (latest.gdi_objects, latest.user_objects) {
        handles.push(Span::styled(
            format!("  GDI {gdi}  USER {user}"),
            Style::default().fg(theme.text_secondary),
        ));
    }
    if let Some(d) = delta {
        handles.push(delta_span(format_signed(d.handles), d.handles, theme));
    }
    lines.push(detail_spans("Handles", handles, theme));

    let mut working_set = vec![Span::raw(format_bytes(latest.working_set_bytes))];
    if let Some(d) = delta {
        working_set.push(delta_span(
            format_signed_bytes(d.working_set_bytes),
            d.working_set_bytes,
            theme,
        ));
    }
    lines.push(detail_spans("Working", working_set, theme));

    let mut virtual_mem = vec![Span::raw(format_bytes(latest.virtual_bytes))];
    if let Some(d) = delta {
        virtual_mem.push(delta_span(
            format_signed_bytes(d.virtual_bytes),
            d.virtual_bytes,
            theme,
        ));
    }
    lines.push(detail_spans("Virtual", virtual_mem, theme));

    lines
}

fn render_table(frame: &mut Frame, area: Rect, history: &[ResourceUsageSample], theme: &Theme) {
    let header = Row::new(["#", "Handles", "GDI", "USER", "Working", "Virtual"]).style(
        Style::default()
            .fg(theme.pill_key_bg)
            .add_modifier(Modifier::BOLD),
    );

    // Newest first
    let rows = history.iter().enumerate().rev().map(|(i, s)| {
        let opt = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
        Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(s.handles.to_string()),
            Cell::from(opt(s.gdi_objects)),
            Cell::from(opt(s.user_objects)),
            Cell::from(format_bytes(s.working_set_bytes)),
            Cell::from(format_bytes(s.virtual_bytes)),
        ])
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(theme.text_primary));
    frame.render_widget(table, area);
}

fn delta_span<'a>(text: String, delta: i64, theme: &Theme) -> Span<'a> {
    Span::styled(
        format!("  ({text})"),
        Style::default().fg(theme.delta_color(delta)),
    )
}

fn detail_line<'a>(label: &str, value: Span<'a>, theme: &Theme) -> Line<'a> {
    detail_spans(label, vec![value], theme)
}

fn detail_spans<'a>(label: &str, values: Vec<Span<'a>>, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!(" {label:<9}"),
        Style::default()
            .fg(theme.pill_key_bg)
            .add_modifier(Modifier::BOLD),
    )];
    spans.extend(values);
    Line::from(spans)
}
