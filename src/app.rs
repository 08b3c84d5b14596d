use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::directory::{ProcessDirectory, ProcessFilter, ProcessSource, merge};
use crate::system::sample::ResourceUsageSample;
use crate::system::sampler::ResourceSampler;
use crate::system::scheduler::{ScanScheduler, ScanTimer};
use crate::system::snapshot::ProcessSnapshot;
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub rescan: KeyCode,
    pub scan_now: KeyCode,
    pub baseline: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            rescan: parse_key(&kb.rescan).unwrap_or(KeyCode::Char('r')),
            scan_now: parse_key(&kb.scan_now).unwrap_or(KeyCode::Char('s')),
            baseline: parse_key(&kb.baseline).unwrap_or(KeyCode::Char('b')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.rescan), "Rescan process list"),
            (key_label(self.scan_now), "Sample selected now"),
            (key_label(self.baseline), "Mark/clear baseline"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓".to_string(), "Select process"));
        entries.push(("Home/End".to_string(), "First/last process"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

/// Settings every view is built from. Passed in explicitly so that two
/// views never share mutable global state.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub self_pid: u32,
    pub filter: ProcessFilter,
    pub scan_interval: Duration,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            self_pid: std::process::id(),
            filter: ProcessFilter::new(config.filter.exclude.as_slice(), config.filter.require_window),
            scan_interval: Duration::from_millis(config.general.scan_interval_ms.max(1)),
            theme: Theme::from_name(&config.general.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        }
    }
}

/// Reference reading for before/after comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub pid: u32,
    pub sample: ResourceUsageSample,
}

pub struct App<S: ProcessSource, R: ResourceSampler> {
    pub running: bool,
    pub processes: Vec<Arc<ProcessSnapshot>>,
    /// Our own entry, when it passed the filter.
    pub current: Option<Arc<ProcessSnapshot>>,
    pub selected_index: usize,
    pub input_mode: InputMode,
    pub baseline: Option<Baseline>,
    pub status_message: Option<(String, Instant)>,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    pub scheduler: Arc<ScanScheduler<R>>,
    directory: ProcessDirectory<S>,
    scan_interval: Duration,
    scan_timer: Option<ScanTimer>,
}

impl<S: ProcessSource, R: ResourceSampler + 'static> App<S, R> {
    /// `notify` is called from whichever thread finished a scan.
    pub fn new(
        ctx: AppContext,
        source: S,
        sampler: R,
        notify: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let mut app = App {
            running: true,
            processes: Vec::new(),
            current: None,
            selected_index: 0,
            input_mode: InputMode::Normal,
            baseline: None,
            status_message: None,
            theme: ctx.theme,
            keybinds: ctx.keybinds,
            scheduler: Arc::new(ScanScheduler::new(sampler, notify)),
            directory: ProcessDirectory::new(source, ctx.filter, ctx.self_pid),
            scan_interval: ctx.scan_interval,
            scan_timer: None,
        };
        app.refresh_directory();
        app.select_index(0);
        app
    }

    /// Start the periodic scan timer. Needs a tokio runtime.
    pub fn start_scanning(&mut self) {
        self.scan_timer = Some(self.scheduler.start(self.scan_interval));
    }

    pub fn stop_scanning(&mut self) {
        self.scan_timer = None;
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Re-enumerate processes and merge them in, keeping the selection on
    /// the same pid.
    pub fn refresh_directory(&mut self) {
        let selected_pid = self.selected_pid();
        let found = self.directory.search();
        let current_pid = found.current.as_ref().map(|p| p.pid());

        self.processes = merge(&self.processes, found.processes);
        self.current = current_pid.and_then(|pid| self.find(pid));

        if let Some(index) = selected_pid.and_then(|pid| self.index_of(pid)) {
            self.selected_index = index;
        } else if self.selected_index >= self.processes.len() {
            self.selected_index = self.processes.len().saturating_sub(1);
        }
        self.scheduler.select(self.selected_process().cloned());

        tracing::debug!(
            listed = self.processes.len(),
            alive = self.processes.iter().filter(|p| p.is_alive()).count(),
            "process list refreshed"
        );

        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= 3
        {
            self.status_message = None;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.rescan {
            return Action::Rescan;
        }
        if code == kb.scan_now {
            return Action::ScanNow;
        }
        if code == kb.baseline {
            return Action::ToggleBaseline;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.running = false;
                self.stop_scanning();
            }
            Action::Navigate(dir) => self.navigate(dir),
            Action::Rescan => self.refresh_directory(),
            Action::ScanNow => {
                self.scheduler.scan_selected(true);
            }
            Action::ToggleBaseline => self.toggle_baseline(),
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        if self.processes.is_empty() {
            return;
        }
        let last = self.processes.len() - 1;
        let target = match direction {
            Direction::Up => self.selected_index.saturating_sub(1),
            Direction::Down => (self.selected_index + 1).min(last),
            Direction::Top => 0,
            Direction::Bottom => last,
        };
        if target != self.selected_index {
            self.select_index(target);
        }
    }

    /// Change the selection and scan the new process immediately.
    pub fn select_index(&mut self, index: usize) {
        self.selected_index = index;
        let selected = self.selected_process().cloned();
        self.scheduler.select(selected.clone());
        self.scheduler.run_scan(selected.as_deref(), true);
    }

    fn toggle_baseline(&mut self) {
        let Some(process) = self.selected_process().cloned() else {
            return;
        };
        let pid = process.pid();
        let msg = if self.baseline.is_some_and(|b| b.pid == pid) {
            self.baseline = None;
            "Baseline cleared".to_string()
        } else if let Some(sample) = process.last_sample() {
            self.baseline = Some(Baseline { pid, sample });
            format!("Baseline set for PID {pid}")
        } else {
            format!("No sample yet for PID {pid}")
        };
        self.status_message = Some((msg, Instant::now()));
    }

    /// Baseline for the selected process, if one was marked for it.
    pub fn selected_baseline(&self) -> Option<&ResourceUsageSample> {
        let pid = self.selected_pid()?;
        self.baseline
            .as_ref()
            .filter(|b| b.pid == pid)
            .map(|b| &b.sample)
    }

    pub fn selected_process(&self) -> Option<&Arc<ProcessSnapshot>> {
        self.processes.get(self.selected_index)
    }

    pub fn selected_pid(&self) -> Option<u32> {
        self.selected_process().map(|p| p.pid())
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    fn index_of(&self, pid: u32) -> Option<usize> {
        self.processes.iter().position(|p| p.pid() == pid)
    }

    fn find(&self, pid: u32) -> Option<Arc<ProcessSnapshot>> {
        self.processes.iter().find(|p| p.pid() == pid).cloned()
    }
}
