//! Page replacement policies.
//!
//! A policy is told about every access through [`ReplacementPolicy::reference`] and is asked
//! for a victim through [`ReplacementPolicy::evict`] whenever a fault finds every frame in
//! use. Each policy keeps its own per-frame bookkeeping; only one policy is active per run.

use core::fmt;
use core::str::FromStr;

use crate::{Coremap, FrameNumber, PageNumber, VirtualAddress};

mod clock;
mod fifo;
mod lru;
mod opt;

pub use clock::Clock;
pub use fifo::Fifo;
pub use lru::Lru;
pub use opt::Opt;

/// A page replacement algorithm.
pub trait ReplacementPolicy: Send {
    /// Returns which algorithm this is.
    fn kind(&self) -> PolicyKind;

    /// Returns the number of frames this policy was set up for.
    fn capacity(&self) -> usize;

    /// Records an access to `page`, which is now resident in `frame`.
    ///
    /// Called once per access, hits included, after any fault has been resolved.
    fn reference(&mut self, frame: FrameNumber, page: PageNumber);

    /// Chooses the frame to reclaim.
    ///
    /// Only called when every frame in `coremap` is in use.
    fn evict(&mut self, coremap: &Coremap) -> FrameNumber;
}

/// The available replacement algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// First in, first out.
    Fifo,
    /// Exact least-recently-used.
    Lru,
    /// Clock (second chance).
    Clock,
    /// Belady's offline-optimal algorithm.
    Opt,
}

impl PolicyKind {
    /// Every policy, in presentation order.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Fifo,
        PolicyKind::Lru,
        PolicyKind::Clock,
        PolicyKind::Opt,
    ];

    /// Returns the short name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lru => "lru",
            PolicyKind::Clock => "clock",
            PolicyKind::Opt => "opt",
        }
    }

    /// Returns whether the policy needs the whole trace before the run starts.
    pub const fn needs_future(self) -> bool {
        matches!(self, PolicyKind::Opt)
    }

    /// Builds a policy for `frames` frames.
    ///
    /// `trace` is the full sequence of addresses the run will access; only [`Opt`] reads it.
    pub fn build(self, frames: usize, trace: &[VirtualAddress]) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::Fifo => Box::new(Fifo::new(frames)),
            PolicyKind::Lru => Box::new(Lru::new(frames)),
            PolicyKind::Clock => Box::new(Clock::new(frames)),
            PolicyKind::Opt => Box::new(Opt::new(
                frames,
                trace.iter().map(|addr| addr.page()).collect(),
            )),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError(String);

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown replacement policy '{}' (expected fifo, lru, clock or opt)",
            self.0
        )
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePolicyError(s.to_string()))
    }
}
