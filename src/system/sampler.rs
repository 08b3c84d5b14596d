use std::io;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;

use super::platform;
use super::sample::ResourceUsageSample;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read handle counts for PID {pid}: {source}")]
    Handles {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// Captures one resource reading for a process.
///
/// `Ok(None)` means the process is gone or cannot be inspected; that is an
/// expected outcome, not an error.
pub trait ResourceSampler: Send {
    fn sample(&mut self, pid: u32) -> Result<Option<ResourceUsageSample>, SampleError>;
}

/// Memory from sysinfo, handle counts from the platform layer.
pub struct SystemSampler {
    sys: System,
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSampler {
    pub fn new() -> Self {
        SystemSampler { sys: System::new() }
    }
}

impl ResourceSampler for SystemSampler {
    fn sample(&mut self, pid: u32) -> Result<Option<ResourceUsageSample>, SampleError> {
        let sys_pid = Pid::from_u32(pid);
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let Some(process) = self.sys.process(sys_pid) else {
            return Ok(None);
        };
        let working_set_bytes = process.memory();
        let virtual_bytes = process.virtual_memory();

        let counts = match platform::process_handles(pid) {
            Ok(counts) => counts,
            Err(err) if is_absent(&err) => return Ok(None),
            Err(source) => return Err(SampleError::Handles { pid, source }),
        };

        Ok(Some(ResourceUsageSample {
            handles: counts.handles,
            gdi_objects: counts.gdi_objects,
            user_objects: counts.user_objects,
            working_set_bytes,
            virtual_bytes,
        }))
    }
}

/// OS errors that just mean "this process is not there for us".
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput
    )
}
