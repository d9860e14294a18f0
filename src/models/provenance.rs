//! Per-field provenance for metric records.
//!
//! A metric record keeps zero for anything it could not measure. The
//! provenance next to it says which source actually filled each field, so a
//! genuine zero reading (an idle process at 0% CPU) is distinguishable from a
//! missing one.

use serde::Serialize;

use super::metrics::{CpuMetrics, MemoryMetrics};

/// The diagnostic source a field value was extracted from.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// `/proc/[pid]/stat`
    ProcStat,
    /// `top -b -n 1 -p [pid]`
    Top,
    /// `TOTAL PSS:` line of `dumpsys meminfo`
    TotalPss,
    /// `Native Heap` table row of `dumpsys meminfo`
    NativeHeapRow,
    /// `Dalvik Heap` table row of `dumpsys meminfo`
    DalvikHeapRow,
    /// `Heap Size:` / `Heap Alloc:` summary lines of `dumpsys meminfo`
    HeapSummary,
}

/// Fields of [`CpuMetrics`].
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CpuField {
    Usage,
    UserTime,
    SystemTime,
}

/// Fields of [`MemoryMetrics`].
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MemoryField {
    Pss,
    HeapSize,
    HeapAlloc,
    NativeHeap,
}

/// Records which [`Origin`] filled each field of a record.
///
/// Fields absent from the provenance were never set and hold their default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provenance<F> {
    entries: Vec<(F, Origin)>,
}

impl<F> Default for Provenance<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: Copy + PartialEq> Provenance<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `field` as filled by `origin`, replacing any earlier origin.
    pub fn record(&mut self, field: F, origin: Origin) {
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = origin,
            None => self.entries.push((field, origin)),
        }
    }

    /// Returns the source that filled `field`, if any.
    pub fn origin(&self, field: F) -> Option<Origin> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, origin)| *origin)
    }

    pub fn is_set(&self, field: F) -> bool {
        self.origin(field).is_some()
    }

    /// Iterates over set fields in the order they were first recorded.
    pub fn iter(&self) -> impl Iterator<Item = (F, Origin)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// CPU metrics together with the provenance of each field.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CpuReport {
    pub metrics: CpuMetrics,
    pub provenance: Provenance<CpuField>,
}

impl CpuReport {
    /// Whether `usage` came from a live sample rather than the zero default.
    pub fn usage_known(&self) -> bool {
        self.provenance.is_set(CpuField::Usage)
    }
}

/// Memory metrics together with the provenance of each field.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MemoryReport {
    pub metrics: MemoryMetrics,
    pub provenance: Provenance<MemoryField>,
}
