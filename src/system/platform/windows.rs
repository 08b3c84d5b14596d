use std::collections::{HashMap, HashSet};
use std::io;

use windows_sys::Win32::Foundation::{BOOL, CloseHandle, HANDLE, HWND, LPARAM};
use windows_sys::Win32::System::Threading::{
    GR_GDIOBJECTS, GR_USEROBJECTS, GetGuiResources, GetProcessHandleCount, OpenProcess,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GW_OWNER, GetWindow, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsWindowVisible,
};

use super::{HandleCounts, PlatformExtensions};

pub struct Platform;

/// Process handle closed on drop.
struct ProcessHandle(HANDLE);

impl ProcessHandle {
    fn open(pid: u32) -> io::Result<Self> {
        let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self(handle))
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.0) };
    }
}

impl PlatformExtensions for Platform {
    fn process_handles(pid: u32) -> io::Result<HandleCounts> {
        let process = ProcessHandle::open(pid)?;
        let mut handles = 0u32;
        if unsafe { GetProcessHandleCount(process.0, &mut handles) } == 0 {
            return Err(io::Error::last_os_error());
        }
        // GetGuiResources returns 0 both for "none" and for failure
        let gdi = unsafe { GetGuiResources(process.0, GR_GDIOBJECTS) };
        let user = unsafe { GetGuiResources(process.0, GR_USEROBJECTS) };
        Ok(HandleCounts {
            handles,
            gdi_objects: Some(gdi),
            user_objects: Some(user),
        })
    }

    fn main_windows(pids: &[u32]) -> HashMap<u32, String> {
        let mut windows: HashMap<u32, String> = HashMap::new();
        unsafe {
            EnumWindows(
                Some(collect_main_window),
                &mut windows as *mut HashMap<u32, String> as LPARAM,
            );
        }
        let wanted: HashSet<u32> = pids.iter().copied().collect();
        windows.retain(|pid, _| wanted.contains(pid));
        windows
    }
}

/// First visible, unowned top-level window of each process is its main window.
unsafe extern "system" fn collect_main_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = unsafe { &mut *(lparam as *mut HashMap<u32, String>) };
    if unsafe { IsWindowVisible(hwnd) } == 0 || !unsafe { GetWindow(hwnd, GW_OWNER) }.is_null() {
        return 1;
    }
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(hwnd, &mut pid) };
    if pid != 0 && !windows.contains_key(&pid) {
        windows.insert(pid, window_title(hwnd));
    }
    1
}

fn window_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32) };
    String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}
