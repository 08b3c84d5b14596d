use serde::Serialize;

/// One point-in-time resource reading for a process.
///
/// Samples carry no timestamp: ordering inside a history is capture order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResourceUsageSample {
    /// Open kernel handles (file descriptors on Unix).
    pub handles: u32,
    /// GDI objects held by the process. Windows only.
    pub gdi_objects: Option<u32>,
    /// USER objects held by the process. Windows only.
    pub user_objects: Option<u32>,
    pub working_set_bytes: u64,
    pub virtual_bytes: u64,
}

/// Signed difference between two samples, used for baseline comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleDelta {
    pub handles: i64,
    pub gdi_objects: Option<i64>,
    pub user_objects: Option<i64>,
    pub working_set_bytes: i64,
    pub virtual_bytes: i64,
}

impl ResourceUsageSample {
    /// Difference `self - baseline`.
    pub fn delta_since(&self, baseline: &ResourceUsageSample) -> SampleDelta {
        let opt = |now: Option<u32>, then: Option<u32>| match (now, then) {
            (Some(now), Some(then)) => Some(now as i64 - then as i64),
            _ => None,
        };
        SampleDelta {
            handles: self.handles as i64 - baseline.handles as i64,
            gdi_objects: opt(self.gdi_objects, baseline.gdi_objects),
            user_objects: opt(self.user_objects, baseline.user_objects),
            working_set_bytes: self.working_set_bytes as i64 - baseline.working_set_bytes as i64,
            virtual_bytes: self.virtual_bytes as i64 - baseline.virtual_bytes as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_signed() {
        let before = ResourceUsageSample {
            handles: 120,
            gdi_objects: Some(40),
            user_objects: None,
            working_set_bytes: 10_000,
            virtual_bytes: 50_000,
        };
        let after = ResourceUsageSample {
            handles: 100,
            gdi_objects: Some(55),
            user_objects: Some(3),
            working_set_bytes: 12_500,
            virtual_bytes: 50_000,
        };
        let delta = after.delta_since(&before);
        assert_eq!(delta.handles, -20);
        assert_eq!(delta.gdi_objects, Some(15));
        assert_eq!(delta.user_objects, None);
        assert_eq!(delta.working_set_bytes, 2_500);
        assert_eq!(delta.virtual_bytes, 0);
    }
}
