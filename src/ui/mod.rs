pub mod header;
pub mod help;
pub mod history_panel;
pub mod process_list;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::App;
use crate::system::directory::ProcessSource;
use crate::system::sampler::ResourceSampler;

pub fn draw<S: ProcessSource, R: ResourceSampler + 'static>(frame: &mut Frame, app: &App<S, R>) {
    let [header_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [list_area, history_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(content_area);

    header::render(
        frame,
        header_area,
        &header::HeaderInfo {
            listed: app.processes.len(),
            alive: app.processes.iter().filter(|p| p.is_alive()).count(),
            scanning: app.scheduler.is_scanning(),
            scan_interval_ms: app.scan_interval().as_millis() as u64,
        },
        &app.theme,
    );

    process_list::render(
        frame,
        list_area,
        &app.processes,
        app.selected_index,
        &app.theme,
    );

    history_panel::render(
        frame,
        history_area,
        app.selected_process().map(|p| p.as_ref()),
        app.selected_baseline(),
        &app.theme,
    );

    statusbar::render(
        frame,
        status_area,
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Help overlay, rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}
