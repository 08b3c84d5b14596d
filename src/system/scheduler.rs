use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, TryLockError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::sampler::ResourceSampler;
use super::snapshot::ProcessSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Another scan was running; this request was ignored.
    Dropped,
    /// Nothing selected, process gone, or the sample matched the last one.
    Unchanged,
    /// A new sample was appended to the selected process's history.
    Changed,
    /// The sampler reported an OS error.
    Failed,
}

type NotifyFn = Box<dyn Fn() + Send + Sync>;

/// Runs resource scans for the selected process, at most one at a time.
///
/// Triggers that arrive while a scan is in flight are dropped, not queued.
/// The notify callback fires after a scan that appended a sample (or when
/// forced), and always after the lock has been released.
pub struct ScanScheduler<S: ResourceSampler> {
    sampler: Mutex<S>,
    scanning: AtomicBool,
    selected: RwLock<Option<Arc<ProcessSnapshot>>>,
    notify: NotifyFn,
}

/// Clears the scanning flag however the scan body exits.
struct ResetOnDrop<'a>(&'a AtomicBool);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ResourceSampler> ScanScheduler<S> {
    pub fn new(sampler: S, notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            sampler: Mutex::new(sampler),
            scanning: AtomicBool::new(false),
            selected: RwLock::new(None),
            notify: Box::new(notify),
        }
    }

    pub fn state(&self) -> ScanState {
        if self.is_scanning() {
            ScanState::Scanning
        } else {
            ScanState::Idle
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Set the process that periodic scans sample.
    pub fn select(&self, snapshot: Option<Arc<ProcessSnapshot>>) {
        let mut selected = self.selected.write().unwrap_or_else(|e| e.into_inner());
        *selected = snapshot;
    }

    pub fn selected(&self) -> Option<Arc<ProcessSnapshot>> {
        self.selected
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn scan_selected(&self, force_notify: bool) -> ScanOutcome {
        let selected = self.selected();
        self.run_scan(selected.as_deref(), force_notify)
    }

    pub fn run_scan(&self, selected: Option<&ProcessSnapshot>, force_notify: bool) -> ScanOutcome {
        // Cheap early exit; the try_lock below is what actually decides.
        if self.is_scanning() {
            return ScanOutcome::Dropped;
        }
        let mut sampler = match self.sampler.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return ScanOutcome::Dropped,
            // A sampler that panicked is still usable for the next reading.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        if self.scanning.swap(true, Ordering::AcqRel) {
            return ScanOutcome::Dropped;
        }

        let outcome = {
            let _reset = ResetOnDrop(&self.scanning);
            match selected {
                None => ScanOutcome::Unchanged,
                Some(snapshot) => match sampler.sample(snapshot.pid()) {
                    Ok(Some(sample)) if snapshot.record(sample) => ScanOutcome::Changed,
                    Ok(_) => ScanOutcome::Unchanged,
                    Err(err) => {
                        tracing::warn!(pid = snapshot.pid(), error = %err, "resource scan failed");
                        ScanOutcome::Failed
                    }
                },
            }
        };
        drop(sampler);

        tracing::trace!(?outcome, force_notify, "resource scan finished");
        if outcome == ScanOutcome::Changed || force_notify {
            (self.notify)();
        }
        outcome
    }
}

/// Periodic scan task. Dropping it stops the timer.
pub struct ScanTimer {
    task: JoinHandle<()>,
}

impl Drop for ScanTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<S: ResourceSampler + 'static> ScanScheduler<S> {
    /// Scan the selected process every `interval` until the returned timer
    /// is dropped. Must be called inside a tokio runtime.
    pub fn start(self: &Arc<Self>, interval: Duration) -> ScanTimer {
        let scheduler = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let scheduler = Arc::clone(&scheduler);
                // OS queries block, keep them off the runtime thread
                let scan = tokio::task::spawn_blocking(move || scheduler.scan_selected(false));
                if let Err(err) = scan.await {
                    tracing::error!(error = %err, "scan task panicked");
                }
            }
        });
        ScanTimer { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;

    use crate::system::sample::ResourceUsageSample;
    use crate::system::sampler::SampleError;

    /// Hands out queued readings; `None` when the queue is empty.
    struct ScriptedSampler(Vec<Option<ResourceUsageSample>>);

    impl ResourceSampler for ScriptedSampler {
        fn sample(&mut self, _pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
            if self.0.is_empty() {
                Ok(None)
            } else {
                Ok(self.0.remove(0))
            }
        }
    }

    struct FailingSampler;

    impl ResourceSampler for FailingSampler {
        fn sample(&mut self, pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
            Err(SampleError::Handles {
                pid,
                source: std::io::Error::other("boom"),
            })
        }
    }

    struct PanickingSampler;

    impl ResourceSampler for PanickingSampler {
        fn sample(&mut self, _pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
            panic!("sampler blew up");
        }
    }

    /// Blocks inside `sample` until released, to hold a scan open.
    struct GateSampler {
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
    }

    impl ResourceSampler for GateSampler {
        fn sample(&mut self, _pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
            let _ = self.entered.send(());
            let _ = self.release.recv();
            Ok(Some(reading(1)))
        }
    }

    fn reading(handles: u32) -> ResourceUsageSample {
        ResourceUsageSample {
            handles,
            working_set_bytes: 1024,
            ..Default::default()
        }
    }

    fn counting_notify() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn changed_sample_appends_and_notifies() {
        let (notified, notify) = counting_notify();
        let scheduler = ScanScheduler::new(
            ScriptedSampler(vec![Some(reading(10)), Some(reading(10)), Some(reading(12))]),
            notify,
        );
        let snap = ProcessSnapshot::new(5, "app", "", false);

        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Changed);
        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Unchanged);
        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Changed);
        assert_eq!(snap.history_len(), 2);
        assert_eq!(notified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn force_notify_without_changes() {
        let (notified, notify) = counting_notify();
        let scheduler = ScanScheduler::new(ScriptedSampler(vec![]), notify);
        assert_eq!(scheduler.run_scan(None, true), ScanOutcome::Unchanged);
        assert_eq!(scheduler.run_scan(None, false), ScanOutcome::Unchanged);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn vanished_process_is_not_an_error() {
        let scheduler = ScanScheduler::new(ScriptedSampler(vec![None]), || {});
        let snap = ProcessSnapshot::new(5, "app", "", false);
        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Unchanged);
        assert_eq!(snap.history_len(), 0);
    }

    #[test]
    fn sampler_error_returns_to_idle() {
        let scheduler = ScanScheduler::new(FailingSampler, || {});
        let snap = ProcessSnapshot::new(5, "app", "", false);
        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Failed);
        assert_eq!(scheduler.state(), ScanState::Idle);
        assert_eq!(scheduler.run_scan(Some(&snap), false), ScanOutcome::Failed);
    }

    #[test]
    fn sampler_panic_returns_to_idle() {
        let scheduler = ScanScheduler::new(PanickingSampler, || {});
        let snap = ProcessSnapshot::new(5, "app", "", false);
        let result = catch_unwind(AssertUnwindSafe(|| scheduler.run_scan(Some(&snap), false)));
        assert!(result.is_err());
        assert_eq!(scheduler.state(), ScanState::Idle);
        // The poisoned lock does not block later scans.
        assert_eq!(scheduler.run_scan(None, false), ScanOutcome::Unchanged);
    }

    #[test]
    fn overlapping_trigger_is_dropped() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let scheduler = Arc::new(ScanScheduler::new(
            GateSampler {
                entered: entered_tx,
                release: release_rx,
            },
            || {},
        ));
        let snap = Arc::new(ProcessSnapshot::new(5, "app", "", false));

        let first = {
            let scheduler = Arc::clone(&scheduler);
            let snap = Arc::clone(&snap);
            thread::spawn(move || scheduler.run_scan(Some(&snap), false))
        };
        entered_rx.recv().unwrap();
        assert_eq!(scheduler.state(), ScanState::Scanning);

        assert_eq!(scheduler.run_scan(Some(&snap), true), ScanOutcome::Dropped);

        release_tx.send(()).unwrap();
        assert_eq!(first.join().unwrap(), ScanOutcome::Changed);
        assert_eq!(scheduler.state(), ScanState::Idle);
        assert_eq!(snap.history_len(), 1);
    }

    #[test]
    fn concurrent_scans_never_overlap() {
        struct CountingSampler {
            active: Arc<AtomicUsize>,
            max_seen: Arc<AtomicUsize>,
            next: u32,
        }

        impl ResourceSampler for CountingSampler {
            fn sample(&mut self, _pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_seen.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(2));
                self.active.fetch_sub(1, Ordering::SeqCst);
                self.next += 1;
                Ok(Some(reading(self.next)))
            }
        }

        let max_seen = Arc::new(AtomicUsize::new(0));
        let scheduler = Arc::new(ScanScheduler::new(
            CountingSampler {
                active: Arc::new(AtomicUsize::new(0)),
                max_seen: Arc::clone(&max_seen),
                next: 0,
            },
            || {},
        ));
        let snap = Arc::new(ProcessSnapshot::new(5, "app", "", false));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                let snap = Arc::clone(&snap);
                thread::spawn(move || {
                    (0..20)
                        .filter(|_| scheduler.run_scan(Some(&snap), false) == ScanOutcome::Changed)
                        .count()
                })
            })
            .collect();
        let changed: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(changed, snap.history_len());
        assert_eq!(scheduler.state(), ScanState::Idle);
    }

    #[test]
    fn scan_selected_uses_current_selection() {
        let scheduler = ScanScheduler::new(ScriptedSampler(vec![Some(reading(3))]), || {});
        let snap = Arc::new(ProcessSnapshot::new(5, "app", "", false));
        assert_eq!(scheduler.scan_selected(false), ScanOutcome::Unchanged);

        scheduler.select(Some(Arc::clone(&snap)));
        assert_eq!(scheduler.scan_selected(false), ScanOutcome::Changed);
        assert_eq!(snap.last_sample(), Some(reading(3)));
    }

    #[tokio::test]
    async fn timer_scans_until_dropped() {
        struct Incrementing(u32);

        impl ResourceSampler for Incrementing {
            fn sample(&mut self, _pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
                self.0 += 1;
                Ok(Some(reading(self.0)))
            }
        }

        let scheduler = Arc::new(ScanScheduler::new(Incrementing(0), || {}));
        let snap = Arc::new(ProcessSnapshot::new(5, "app", "", false));
        scheduler.select(Some(Arc::clone(&snap)));

        let timer = scheduler.start(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(timer);
        assert!(snap.history_len() > 0);

        // Let any scan already handed to the blocking pool finish.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = snap.history_len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(snap.history_len(), settled);
    }
}
