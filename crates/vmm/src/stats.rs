//! Run counters.

use core::fmt;

/// Counters collected over one simulation run.
///
/// Every counter only ever grows. A hit or a miss is recorded for every reference, so
/// `hits + misses == references` once an access has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub(crate) hits: u64,
    pub(crate) misses: u64,
    pub(crate) references: u64,
    pub(crate) evict_clean: u64,
    pub(crate) evict_dirty: u64,
}

impl Statistics {
    /// Accesses that found their page resident.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Accesses that faulted.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Total accesses.
    pub fn references(&self) -> u64 {
        self.references
    }

    /// Victims dropped or left on swap without a write.
    pub fn evict_clean(&self) -> u64 {
        self.evict_clean
    }

    /// Victims written to swap before their frame was reused.
    pub fn evict_dirty(&self) -> u64 {
        self.evict_dirty
    }

    /// Total evictions.
    pub fn evictions(&self) -> u64 {
        self.evict_clean + self.evict_dirty
    }

    /// Hits as a percentage of references, or zero before the first reference.
    pub fn hit_rate(&self) -> f64 {
        percent(self.hits, self.references)
    }

    /// Misses as a percentage of references, or zero before the first reference.
    pub fn miss_rate(&self) -> f64 {
        percent(self.misses, self.references)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hit count: {}", self.hits)?;
        writeln!(f, "Miss count: {}", self.misses)?;
        writeln!(f, "Clean evictions: {}", self.evict_clean)?;
        writeln!(f, "Dirty evictions: {}", self.evict_dirty)?;
        writeln!(f, "Total references : {}", self.references)?;
        writeln!(f, "Hit rate: {:.4}", self.hit_rate())?;
        write!(f, "Miss rate: {:.4}", self.miss_rate())
    }
}
