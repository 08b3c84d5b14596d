use std::collections::HashMap;
use std::io;

/// Handle counts for one process. GDI/USER objects exist only on Windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleCounts {
    pub handles: u32,
    pub gdi_objects: Option<u32>,
    pub user_objects: Option<u32>,
}

pub trait PlatformExtensions {
    /// Open handle counts for `pid`. The OS handle used to query them is
    /// released before returning.
    fn process_handles(pid: u32) -> io::Result<HandleCounts>;

    /// Main-window titles for those of `pids` that own a top-level window.
    /// Processes missing from the map are considered windowless.
    fn main_windows(pids: &[u32]) -> HashMap<u32, String>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn process_handles(pid: u32) -> io::Result<HandleCounts> {
    platform_impl::Platform::process_handles(pid)
}

pub fn main_windows(pids: &[u32]) -> HashMap<u32, String> {
    platform_impl::Platform::main_windows(pids)
}
