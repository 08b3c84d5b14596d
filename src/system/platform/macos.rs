use std::collections::HashMap;
use std::io;

use libproc::libproc::bsd_info::BSDInfo;
use libproc::libproc::file_info::ListFDs;
use libproc::libproc::proc_pid::{listpidinfo, pidinfo, pidpath};

use super::{HandleCounts, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn process_handles(pid: u32) -> io::Result<HandleCounts> {
        // libproc reports failures as strings; a vanished or protected
        // process both come back here.
        let info = pidinfo::<BSDInfo>(pid as i32, 0).map_err(not_found)?;
        let fds = listpidinfo::<ListFDs>(pid as i32, info.pbi_nfiles as usize).map_err(not_found)?;
        Ok(HandleCounts {
            handles: fds.len() as u32,
            gdi_objects: None,
            user_objects: None,
        })
    }

    fn main_windows(pids: &[u32]) -> HashMap<u32, String> {
        // Bundled apps are the ones that own windows
        pids.iter()
            .copied()
            .filter(|&pid| {
                pidpath(pid as i32)
                    .map(|path| path.contains(".app/Contents/MacOS/"))
                    .unwrap_or(false)
            })
            .map(|pid| (pid, String::new()))
            .collect()
    }
}

fn not_found(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, msg)
}
