use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::sample::ResourceUsageSample;

/// Identity of one observed process plus its accumulated sample history.
///
/// Snapshots are shared between the UI thread and the scan thread behind an
/// `Arc`, so liveness is atomic and the history sits behind a lock. The pid,
/// name, title and `is_current` never change after construction.
#[derive(Debug)]
pub struct ProcessSnapshot {
    pid: u32,
    name: String,
    window_title: String,
    is_current: bool,
    alive: AtomicBool,
    history: RwLock<Vec<ResourceUsageSample>>,
}

impl ProcessSnapshot {
    pub fn new(
        pid: u32,
        name: impl Into<String>,
        window_title: impl Into<String>,
        is_current: bool,
    ) -> Self {
        Self {
            pid,
            name: name.into(),
            window_title: window_title.into(),
            is_current,
            alive: AtomicBool::new(false),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Window title when there is one, otherwise the process name in parens.
    pub fn display_text(&self) -> String {
        if self.window_title.is_empty() {
            format!("({})", self.name)
        } else {
            self.window_title.clone()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Append `sample` unless it equals the last recorded one.
    /// Returns whether the history grew.
    pub fn record(&self, sample: ResourceUsageSample) -> bool {
        let mut history = self.write_history();
        if history.last() == Some(&sample) {
            return false;
        }
        history.push(sample);
        true
    }

    pub fn last_sample(&self) -> Option<ResourceUsageSample> {
        self.read_history().last().copied()
    }

    /// Copy of the full history, oldest first.
    pub fn history(&self) -> Vec<ResourceUsageSample> {
        self.read_history().clone()
    }

    pub fn history_len(&self) -> usize {
        self.read_history().len()
    }

    // A writer that panicked mid-push leaves a valid Vec behind, so poisoning
    // is ignored.
    fn read_history(&self) -> RwLockReadGuard<'_, Vec<ResourceUsageSample>> {
        self.history.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_history(&self) -> RwLockWriteGuard<'_, Vec<ResourceUsageSample>> {
        self.history.write().unwrap_or_else(|e| e.into_inner())
    }
}
