use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

use crate::system::snapshot::ProcessSnapshot;
use crate::ui::theme::Theme;

/// Process list. Exited processes stay listed, dimmed and in italics; our
/// own process carries a `*` marker.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[Arc<ProcessSnapshot>],
    selected: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Processes ",
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let items: Vec<ListItem> = processes.iter().map(|p| list_item(p, theme)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .fg(theme.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25b6} ");

    let mut state = ListState::default().with_selected(if processes.is_empty() {
        None
    } else {
        Some(selected.min(processes.len() - 1))
    });
    frame.render_stateful_widget(list, area, &mut state);
}

fn list_item<'a>(process: &ProcessSnapshot, theme: &Theme) -> ListItem<'a> {
    let text_style = if process.is_alive() {
        Style::default().fg(theme.text_primary)
    } else {
        Style::default()
            .fg(theme.text_dead)
            .add_modifier(Modifier::ITALIC)
    };
    let marker = if process.is_current() {
        Span::styled("* ", Style::default().fg(theme.current_marker))
    } else {
        Span::raw("  ")
    };

    ListItem::new(Line::from(vec![
        marker,
        Span::styled(process.display_text(), text_style),
        Span::styled(
            format!(" [{}]", process.pid()),
            Style::default().fg(theme.text_secondary),
        ),
    ]))
}
