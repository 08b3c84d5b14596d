use std::collections::HashMap;
use std::sync::Arc;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use super::platform;
use super::snapshot::ProcessSnapshot;

/// One row of the OS process table, before filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProcess {
    pub pid: u32,
    pub name: String,
    /// `None` when the process owns no main window.
    pub window_title: Option<String>,
}

/// Enumerates live OS processes. Processes that cannot be inspected are
/// simply left out.
pub trait ProcessSource {
    fn processes(&mut self) -> Vec<RawProcess>;
}

pub struct SysinfoSource {
    sys: System,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        SysinfoSource { sys: System::new() }
    }
}

impl ProcessSource for SysinfoSource {
    fn processes(&mut self) -> Vec<RawProcess> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let pids: Vec<u32> = self
            .sys
            .processes()
            .iter()
            .filter(|(_, p)| p.thread_kind().is_none())
            .map(|(pid, _)| pid.as_u32())
            .collect();
        let mut windows = platform::main_windows(&pids);

        pids.into_iter()
            .filter_map(|pid| {
                let process = self.sys.process(sysinfo::Pid::from_u32(pid))?;
                Some(RawProcess {
                    pid,
                    name: process.name().to_string_lossy().to_string(),
                    window_title: windows.remove(&pid),
                })
            })
            .collect()
    }
}

/// Drops noise processes by name and, optionally, processes without a window.
#[derive(Clone, Debug)]
pub struct ProcessFilter {
    exclude: Vec<String>,
    require_window: bool,
}

impl ProcessFilter {
    pub fn new<S: AsRef<str>>(exclude: &[S], require_window: bool) -> Self {
        Self {
            exclude: exclude.iter().map(|s| normalize_name(s.as_ref())).collect(),
            require_window,
        }
    }

    pub fn accepts(&self, process: &RawProcess) -> bool {
        if self.require_window && process.window_title.is_none() {
            return false;
        }
        let name = normalize_name(&process.name);
        !self.exclude.iter().any(|ex| *ex == name)
    }
}

fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    match lowered.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lowered,
    }
}

/// Result of one directory search.
#[derive(Debug, Default)]
pub struct DirectorySearch {
    pub processes: Vec<Arc<ProcessSnapshot>>,
    /// Our own process, when it passed the filter.
    pub current: Option<Arc<ProcessSnapshot>>,
}

pub struct ProcessDirectory<S: ProcessSource> {
    source: S,
    filter: ProcessFilter,
    self_pid: u32,
}

impl<S: ProcessSource> ProcessDirectory<S> {
    pub fn new(source: S, filter: ProcessFilter, self_pid: u32) -> Self {
        Self {
            source,
            filter,
            self_pid,
        }
    }

    /// Fresh, filtered view of the process table, sorted by display text.
    /// Every returned snapshot is new, alive and has an empty history.
    pub fn search(&mut self) -> DirectorySearch {
        let raw = self.source.processes();
        let total = raw.len();

        let mut processes: Vec<Arc<ProcessSnapshot>> = raw
            .into_iter()
            .filter(|p| self.filter.accepts(p))
            .map(|p| {
                let snapshot = ProcessSnapshot::new(
                    p.pid,
                    p.name,
                    p.window_title.unwrap_or_default(),
                    p.pid == self.self_pid,
                );
                snapshot.set_alive(true);
                Arc::new(snapshot)
            })
            .collect();
        sort_by_display(&mut processes);

        tracing::debug!(
            total,
            accepted = processes.len(),
            "process directory search"
        );

        let current = processes.iter().find(|p| p.is_current()).cloned();
        DirectorySearch { processes, current }
    }
}

/// Fold a fresh search into the previously known set.
///
/// Known pids keep their existing snapshot (and history); everything from
/// `previous` that is missing in `current` stays, marked not alive.
pub fn merge(
    previous: &[Arc<ProcessSnapshot>],
    current: Vec<Arc<ProcessSnapshot>>,
) -> Vec<Arc<ProcessSnapshot>> {
    let mut by_pid: HashMap<u32, Arc<ProcessSnapshot>> =
        HashMap::with_capacity(previous.len() + current.len());
    for snapshot in previous {
        snapshot.set_alive(false);
        by_pid
            .entry(snapshot.pid())
            .or_insert_with(|| Arc::clone(snapshot));
    }

    for fresh in current {
        match by_pid.get(&fresh.pid()) {
            Some(known) => known.set_alive(true),
            None => {
                fresh.set_alive(true);
                by_pid.insert(fresh.pid(), fresh);
            }
        }
    }

    let mut merged: Vec<Arc<ProcessSnapshot>> = by_pid.into_values().collect();
    sort_by_display(&mut merged);
    merged
}

fn sort_by_display(processes: &mut [Arc<ProcessSnapshot>]) {
    processes.sort_by_cached_key(|p| (p.display_text(), p.pid()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::sample::ResourceUsageSample;

    struct FixedSource(Vec<RawProcess>);

    impl ProcessSource for FixedSource {
        fn processes(&mut self) -> Vec<RawProcess> {
            self.0.clone()
        }
    }

    fn raw(pid: u32, name: &str, title: Option<&str>) -> RawProcess {
        RawProcess {
            pid,
            name: name.to_string(),
            window_title: title.map(str::to_string),
        }
    }

    fn snap(pid: u32, name: &str) -> Arc<ProcessSnapshot> {
        Arc::new(ProcessSnapshot::new(pid, name, "", false))
    }

    #[test]
    fn filter_excludes_names_case_insensitively() {
        let filter = ProcessFilter::new(&["Chrome", "svchost"], false);
        assert!(!filter.accepts(&raw(1, "chrome.exe", Some("x"))));
        assert!(!filter.accepts(&raw(2, "SVCHOST", None)));
        assert!(filter.accepts(&raw(3, "chromium", Some("x"))));
    }

    #[test]
    fn filter_drops_windowless_when_required() {
        let filter = ProcessFilter::new::<&str>(&[], true);
        assert!(!filter.accepts(&raw(1, "daemon", None)));
        assert!(filter.accepts(&raw(2, "editor", Some(""))));
    }

    #[test]
    fn search_marks_current_and_sorts() {
        let source = FixedSource(vec![
            raw(7, "zeta", Some("")),
            raw(3, "explorer", Some("Desktop")),
            raw(42, "handlescope", Some("")),
            raw(9, "worker", None),
            raw(5, "notes", Some("A notebook")),
        ]);
        let filter = ProcessFilter::new(&["explorer"], true);
        let mut directory = ProcessDirectory::new(source, filter, 42);

        let found = directory.search();
        let labels: Vec<String> = found.processes.iter().map(|p| p.display_text()).collect();
        assert_eq!(labels, vec!["(handlescope)", "(zeta)", "A notebook"]);
        assert!(found.processes.iter().all(|p| p.is_alive()));

        let current = found.current.expect("own process should be found");
        assert_eq!(current.pid(), 42);
        assert!(current.is_current());
    }

    #[test]
    fn search_without_own_process_has_no_current() {
        let source = FixedSource(vec![raw(1, "a", Some(""))]);
        let mut directory = ProcessDirectory::new(source, ProcessFilter::new::<&str>(&[], true), 99);
        assert!(directory.search().current.is_none());
    }

    #[test]
    fn merge_keeps_known_instance() {
        let known = snap(20, "beta");
        known.record(ResourceUsageSample {
            handles: 5,
            ..Default::default()
        });
        let previous = vec![Arc::clone(&known)];

        let merged = merge(&previous, vec![snap(20, "beta")]);
        assert_eq!(merged.len(), 1);
        assert!(Arc::ptr_eq(&merged[0], &known));
        assert_eq!(merged[0].history_len(), 1);
        assert!(merged[0].is_alive());
    }

    #[test]
    fn merge_marks_missing_processes_dead() {
        let gone = snap(10, "alpha");
        gone.set_alive(true);
        let merged = merge(&[Arc::clone(&gone)], vec![snap(30, "gamma")]);
        assert_eq!(merged.len(), 2);
        assert!(!gone.is_alive());
        assert!(merged.iter().find(|p| p.pid() == 30).unwrap().is_alive());
    }

    #[test]
    fn merge_orders_equal_text_by_pid() {
        let merged = merge(&[], vec![snap(9, "same"), snap(2, "same")]);
        let pids: Vec<u32> = merged.iter().map(|p| p.pid()).collect();
        assert_eq!(pids, vec![2, 9]);
    }
}
