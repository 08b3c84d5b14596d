use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;

pub struct HeaderInfo {
    pub listed: usize,
    pub alive: usize,
    pub scanning: bool,
    pub scan_interval_ms: u64,
}

pub fn render(frame: &mut Frame, area: Rect, info: &HeaderInfo, theme: &Theme) {
    let mut spans = vec![
        Span::styled(
            " handlescope ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} processes ({} alive)", info.listed, info.alive),
            Style::default().fg(theme.text_primary),
        ),
        Span::styled(
            format!("  every {} ms", info.scan_interval_ms),
            Style::default().fg(theme.text_secondary),
        ),
    ];
    if info.scanning {
        spans.push(Span::styled(
            "  scanning\u{2026}",
            Style::default()
                .fg(theme.current_marker)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
