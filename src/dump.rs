use std::io::Write;

use color_eyre::eyre::Result;
use serde::Serialize;

use crate::system::directory::{ProcessDirectory, ProcessSource};
use crate::system::sample::ResourceUsageSample;
use crate::system::sampler::ResourceSampler;

/// One process in a headless capture.
#[derive(Debug, Serialize)]
pub struct DumpEntry {
    pub pid: u32,
    pub name: String,
    pub window_title: String,
    pub display_text: String,
    pub is_current: bool,
    /// `None` when the process vanished or could not be read.
    pub sample: Option<ResourceUsageSample>,
}

/// Search once and sample every listed process once.
pub fn capture<S: ProcessSource, R: ResourceSampler>(
    directory: &mut ProcessDirectory<S>,
    sampler: &mut R,
) -> Vec<DumpEntry> {
    directory
        .search()
        .processes
        .iter()
        .map(|p| {
            let sample = sampler.sample(p.pid()).unwrap_or_else(|err| {
                tracing::warn!(pid = p.pid(), error = %err, "sample failed during dump");
                None
            });
            DumpEntry {
                pid: p.pid(),
                name: p.name().to_string(),
                window_title: p.window_title().to_string(),
                display_text: p.display_text(),
                is_current: p.is_current(),
                sample,
            }
        })
        .collect()
}

pub fn write_json<W: Write>(entries: &[DumpEntry], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writeln!(writer)?;
    Ok(())
}
