//! The translator.
//!
//! [`Simulator`] ties the page directory, the coremap, simulated physical memory, the
//! replacement policy and the swap store together. Each call to [`Simulator::access`] runs a
//! single reference to completion: page table walk, fault handling, eviction, swap traffic and
//! counter updates.

use core::fmt;
use core::ops::Range;

use crate::{
    AccessKind, Coremap, FrameNumber, FrameOwner, PageDirectory, PageState, PageTableEntry,
    PhysicalAddress, PteHandle, ReplacementPolicy, Statistics, SwapError, SwapOffset, SwapStore,
    VirtualAddress,
    layout::{MARKER_OFFSET, PAGE_SIZE, SIM_PAGE_SIZE},
};

/// Parameters of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of simulated physical frames.
    pub frames: usize,
    /// Treat a freshly zero-filled page as dirty, so that it is always written to swap when
    /// evicted even if it was only ever read.
    pub zero_fill_dirty: bool,
}

impl SimConfig {
    /// Creates a configuration for `frames` frames.
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            zero_fill_dirty: false,
        }
    }

    /// Sets whether zero-filled pages start dirty.
    pub fn with_zero_fill_dirty(mut self, zero_fill_dirty: bool) -> Self {
        self.zero_fill_dirty = zero_fill_dirty;
        self
    }

    /// Returns the logical size of simulated physical memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.frames * PAGE_SIZE
    }

    /// Checks that the configuration describes a usable machine.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.frames == 0 {
            return Err(SimError::InvalidFrameCount(self.frames));
        }
        Ok(())
    }
}

/// Errors that end a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The machine must have at least one frame.
    InvalidFrameCount(usize),
    /// The policy was built for a different number of frames.
    PolicyCapacity { policy: usize, frames: usize },
    /// The swap store failed a pageout or pagein.
    Swap(SwapError),
    /// A frame did not hold the page its page table entry points at.
    FrameContentMismatch {
        frame: FrameNumber,
        expected: VirtualAddress,
        found: VirtualAddress,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidFrameCount(frames) => {
                write!(f, "invalid memory size: {} frames", frames)
            }
            SimError::PolicyCapacity { policy, frames } => write!(
                f,
                "replacement policy sized for {} frames, memory has {}",
                policy, frames
            ),
            SimError::Swap(err) => write!(f, "{}", err),
            SimError::FrameContentMismatch {
                frame,
                expected,
                found,
            } => write!(
                f,
                "frame {} holds page {}, expected page {}",
                frame, found, expected
            ),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Swap(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SwapError> for SimError {
    fn from(err: SwapError) -> Self {
        SimError::Swap(err)
    }
}

/// Byte range of a frame inside simulated physical memory.
fn frame_range(frame: FrameNumber) -> Range<usize> {
    let start = frame.as_usize() * SIM_PAGE_SIZE;
    start..start + SIM_PAGE_SIZE
}

/// A single-address-space demand paging simulation.
///
/// The simulator owns every piece of state for one run; independent runs never share
/// anything. A run ends at the first error, after which the state should be discarded.
pub struct Simulator<S> {
    config: SimConfig,
    directory: PageDirectory,
    coremap: Coremap,
    memory: Box<[u8]>,
    policy: Box<dyn ReplacementPolicy>,
    swap: S,
    stats: Statistics,
}

impl<S: SwapStore> Simulator<S> {
    /// Creates a simulator with every frame free and an empty page directory.
    pub fn new(
        config: SimConfig,
        policy: Box<dyn ReplacementPolicy>,
        swap: S,
    ) -> Result<Self, SimError> {
        config.validate()?;
        if policy.capacity() != config.frames {
            return Err(SimError::PolicyCapacity {
                policy: policy.capacity(),
                frames: config.frames,
            });
        }

        log::info!(
            "simulating {} frames with {} replacement",
            config.frames,
            policy.kind()
        );

        Ok(Self {
            config,
            directory: PageDirectory::new(),
            coremap: Coremap::new(config.frames),
            memory: vec![0u8; config.frames * SIM_PAGE_SIZE].into_boxed_slice(),
            policy,
            swap,
            stats: Statistics::default(),
        })
    }

    /// Translates one access, faulting the page in if needed.
    ///
    /// Returns the physical address the access resolves to.
    pub fn access(
        &mut self,
        vaddr: VirtualAddress,
        kind: AccessKind,
    ) -> Result<PhysicalAddress, SimError> {
        let handle = self.directory.walk_or_create(vaddr);
        let entry = *self.directory.entry(handle);

        let frame = match entry.state() {
            PageState::InMemory { frame, .. } => {
                self.stats.hits += 1;
                log::trace!("hit {} in frame {}", vaddr, frame);
                frame
            }
            PageState::Unmapped | PageState::OnSwap { .. } => {
                self.stats.misses += 1;
                self.fault(handle, vaddr, entry.swap_offset())?
            }
        };

        self.check_frame(frame, vaddr)?;

        let entry = self.directory.entry_mut(handle);
        entry.mark_referenced();
        if kind.is_write() {
            entry.mark_dirty();
        }

        self.stats.references += 1;
        self.policy.reference(frame, vaddr.page());

        Ok(frame.start() + vaddr.page_offset())
    }

    /// Replays a sequence of accesses, stopping at the first error.
    pub fn run<I>(&mut self, trace: I) -> Result<&Statistics, SimError>
    where
        I: IntoIterator<Item = (VirtualAddress, AccessKind)>,
    {
        for (vaddr, kind) in trace {
            self.access(vaddr, kind)?;
        }
        Ok(&self.stats)
    }

    /// Brings the page behind `handle` into a frame.
    ///
    /// Pages with a swap copy are read back and start clean; anything else is zero-filled.
    fn fault(
        &mut self,
        handle: PteHandle,
        vaddr: VirtualAddress,
        offset: Option<SwapOffset>,
    ) -> Result<FrameNumber, SimError> {
        let owner = FrameOwner {
            pte: handle,
            page: vaddr.page(),
        };
        let frame = self.allocate_frame(owner)?;

        let dirty = match offset {
            Some(offset) => {
                self.swap
                    .pagein(frame, offset, &mut self.memory[frame_range(frame)])
                    .inspect_err(|err| {
                        log::error!("pagein of {} at offset {} failed: {}", vaddr, offset, err)
                    })?;
                false
            }
            None => {
                self.init_frame(frame, vaddr);
                self.config.zero_fill_dirty
            }
        };

        self.directory.entry_mut(handle).map(frame, dirty);
        log::trace!("fault on {} resolved into frame {}", vaddr, frame);
        Ok(frame)
    }

    /// Finds a frame for `owner`, evicting a victim when none is free.
    fn allocate_frame(&mut self, owner: FrameOwner) -> Result<FrameNumber, SimError> {
        let frame = match self.coremap.find_free() {
            Some(frame) => frame,
            None => self.evict()?,
        };

        self.coremap.claim(frame, owner);
        Ok(frame)
    }

    /// Asks the policy for a victim and moves its page out of memory.
    fn evict(&mut self) -> Result<FrameNumber, SimError> {
        let victim = self.policy.evict(&self.coremap);
        let Some(owner) = self.coremap.descriptor(victim).owner() else {
            return Ok(victim);
        };

        let entry = *self.directory.entry(owner.pte);
        let offset = if entry.is_dirty() {
            let offset = self
                .swap
                .pageout(victim, &self.memory[frame_range(victim)], entry.swap_offset())
                .inspect_err(|err| {
                    log::error!("pageout of frame {} failed: {}", victim, err)
                })?;
            self.stats.evict_dirty += 1;
            Some(offset)
        } else {
            self.stats.evict_clean += 1;
            entry.swap_offset()
        };

        self.directory.entry_mut(owner.pte).evict(offset);
        log::debug!(
            "evicted page {} from frame {} ({}, swap offset {:?})",
            owner.page,
            victim,
            if entry.is_dirty() { "dirty" } else { "clean" },
            offset
        );

        Ok(victim)
    }

    /// Zero-fills a frame and stamps it with the page it now holds.
    fn init_frame(&mut self, frame: FrameNumber, vaddr: VirtualAddress) {
        let bytes = &mut self.memory[frame_range(frame)];
        bytes.fill(0);

        let marker = (vaddr.page_base().as_usize() as u64).to_le_bytes();
        bytes[MARKER_OFFSET..MARKER_OFFSET + marker.len()].copy_from_slice(&marker);
    }

    fn check_frame(&self, frame: FrameNumber, vaddr: VirtualAddress) -> Result<(), SimError> {
        let expected = vaddr.page_base();
        let found = self.frame_marker(frame);
        if found != expected {
            log::error!(
                "frame {} holds page {} but {} maps to it",
                frame,
                found,
                expected
            );
            return Err(SimError::FrameContentMismatch {
                frame,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Returns the page address stamped into a frame when it was zero-filled.
    pub fn frame_marker(&self, frame: FrameNumber) -> VirtualAddress {
        let bytes = self.frame_contents(frame);
        let mut marker = [0u8; size_of::<u64>()];
        marker.copy_from_slice(&bytes[MARKER_OFFSET..MARKER_OFFSET + size_of::<u64>()]);
        VirtualAddress::from(u64::from_le_bytes(marker))
    }

    /// Returns the simulated contents of a frame.
    pub fn frame_contents(&self, frame: FrameNumber) -> &[u8] {
        &self.memory[frame_range(frame)]
    }

    /// Looks up the page table entry for an address without touching any state.
    pub fn lookup(&self, vaddr: VirtualAddress) -> Option<&PageTableEntry> {
        self.directory.walk(vaddr)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn page_directory(&self) -> &PageDirectory {
        &self.directory
    }

    pub fn coremap(&self) -> &Coremap {
        &self.coremap
    }

    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    pub fn swap(&self) -> &S {
        &self.swap
    }
}
