//! Swap backing store.
//!
//! The simulator only talks to swap through the [`SwapStore`] trait. [`MemorySwap`] is a
//! fixed-capacity store kept in host memory, with one slot of `SIM_PAGE_SIZE` bytes per page.

use core::fmt;

use crate::{FrameNumber, SwapOffset, layout::SIM_PAGE_SIZE};

/// Errors reported by a swap store.
///
/// The simulator treats every one of these as fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// Every swap slot is allocated.
    Full,
    /// The offset does not name an allocated slot.
    InvalidOffset(SwapOffset),
    /// The underlying storage failed.
    Io(String),
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::Full => write!(f, "swap space is full"),
            SwapError::InvalidOffset(offset) => write!(f, "invalid swap offset {}", offset),
            SwapError::Io(reason) => write!(f, "swap I/O failed: {}", reason),
        }
    }
}

impl std::error::Error for SwapError {}

/// Backing store for evicted pages.
pub trait SwapStore {
    /// Writes the contents of `frame` out to swap.
    ///
    /// When `offset` is `Some`, the page already owns that slot and it is overwritten in
    /// place; otherwise a fresh slot is allocated. Returns the slot the page now lives in.
    fn pageout(
        &mut self,
        frame: FrameNumber,
        data: &[u8],
        offset: Option<SwapOffset>,
    ) -> Result<SwapOffset, SwapError>;

    /// Reads the page stored at `offset` into `frame`.
    ///
    /// The slot stays allocated to the page afterwards.
    fn pagein(
        &mut self,
        frame: FrameNumber,
        offset: SwapOffset,
        data: &mut [u8],
    ) -> Result<(), SwapError>;
}

/// A swap store held entirely in memory.
pub struct MemorySwap {
    storage: Box<[u8]>,
    used: Vec<u64>,
    slots: usize,
    pageouts: u64,
    pageins: u64,
}

impl MemorySwap {
    /// Creates a swap store with room for `slots` pages.
    pub fn new(slots: usize) -> Self {
        Self {
            storage: vec![0u8; slots * SIM_PAGE_SIZE].into_boxed_slice(),
            used: vec![0u64; slots.div_ceil(64)],
            slots,
            pageouts: 0,
            pageins: 0,
        }
    }

    /// Returns the number of slots in the store.
    pub fn capacity(&self) -> usize {
        self.slots
    }

    /// Returns the number of allocated slots.
    pub fn used_slots(&self) -> usize {
        self.used.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns the number of pageouts performed.
    pub fn pageouts(&self) -> u64 {
        self.pageouts
    }

    /// Returns the number of pageins performed.
    pub fn pageins(&self) -> u64 {
        self.pageins
    }

    fn is_used(&self, slot: usize) -> bool {
        self.used[slot / 64] & (1 << (slot % 64)) != 0
    }

    fn allocate_slot(&mut self) -> Option<usize> {
        let slot = (0..self.slots).find(|&slot| !self.is_used(slot))?;
        self.used[slot / 64] |= 1 << (slot % 64);
        Some(slot)
    }

    /// Resolves an offset to the byte range of an allocated slot.
    fn slot_range(&self, offset: SwapOffset) -> Result<core::ops::Range<usize>, SwapError> {
        match offset.slot() {
            Some(slot) if slot < self.slots && self.is_used(slot) => {
                let start = slot * SIM_PAGE_SIZE;
                Ok(start..start + SIM_PAGE_SIZE)
            }
            _ => Err(SwapError::InvalidOffset(offset)),
        }
    }
}

impl SwapStore for MemorySwap {
    fn pageout(
        &mut self,
        frame: FrameNumber,
        data: &[u8],
        offset: Option<SwapOffset>,
    ) -> Result<SwapOffset, SwapError> {
        let offset = match offset {
            Some(offset) => offset,
            None => SwapOffset::from_slot(self.allocate_slot().ok_or(SwapError::Full)?),
        };

        let range = self.slot_range(offset)?;
        let len = data.len().min(SIM_PAGE_SIZE);
        self.storage[range.clone()].fill(0);
        self.storage[range.start..range.start + len].copy_from_slice(&data[..len]);
        self.pageouts += 1;

        log::trace!("paged out frame {} to swap offset {}", frame, offset);
        Ok(offset)
    }

    fn pagein(
        &mut self,
        frame: FrameNumber,
        offset: SwapOffset,
        data: &mut [u8],
    ) -> Result<(), SwapError> {
        let range = self.slot_range(offset)?;
        let len = data.len().min(SIM_PAGE_SIZE);
        data[..len].copy_from_slice(&self.storage[range.start..range.start + len]);
        self.pageins += 1;

        log::trace!("paged in swap offset {} to frame {}", offset, frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(fill: u8) -> [u8; SIM_PAGE_SIZE] {
        [fill; SIM_PAGE_SIZE]
    }

    #[test]
    fn starts_empty() {
        let swap = MemorySwap::new(100);
        assert_eq!(swap.capacity(), 100);
        assert_eq!(swap.used_slots(), 0);
    }

    #[test]
    fn pageout_allocates_lowest_slot() {
        let mut swap = MemorySwap::new(4);
        let a = swap.pageout(FrameNumber::new(0), &page(1), None).unwrap();
        let b = swap.pageout(FrameNumber::new(1), &page(2), None).unwrap();

        assert_eq!(a, SwapOffset::from_slot(0));
        assert_eq!(b, SwapOffset::from_slot(1));
        assert_eq!(swap.used_slots(), 2);
    }

    #[test]
    fn pageout_with_offset_overwrites_in_place() {
        let mut swap = MemorySwap::new(4);
        let offset = swap.pageout(FrameNumber::new(0), &page(1), None).unwrap();
        let again = swap
            .pageout(FrameNumber::new(0), &page(9), Some(offset))
            .unwrap();
        assert_eq!(offset, again);
        assert_eq!(swap.used_slots(), 1);

        let mut buffer = page(0);
        swap.pagein(FrameNumber::new(3), offset, &mut buffer).unwrap();
        assert_eq!(buffer, page(9));
    }

    #[test]
    fn pagein_keeps_slot_allocated() {
        let mut swap = MemorySwap::new(2);
        let offset = swap.pageout(FrameNumber::new(0), &page(7), None).unwrap();

        let mut buffer = page(0);
        swap.pagein(FrameNumber::new(1), offset, &mut buffer).unwrap();
        assert_eq!(buffer, page(7));
        assert_eq!(swap.used_slots(), 1);
        assert_eq!(swap.pageouts(), 1);
        assert_eq!(swap.pageins(), 1);
    }

    #[test]
    fn full_store_rejects_new_pages() {
        let mut swap = MemorySwap::new(1);
        swap.pageout(FrameNumber::new(0), &page(1), None).unwrap();
        assert_eq!(
            swap.pageout(FrameNumber::new(1), &page(2), None),
            Err(SwapError::Full)
        );
    }

    #[test]
    fn pagein_unallocated_slot_fails() {
        let mut swap = MemorySwap::new(2);
        let mut buffer = page(0);
        let offset = SwapOffset::from_slot(1);
        assert_eq!(
            swap.pagein(FrameNumber::new(0), offset, &mut buffer),
            Err(SwapError::InvalidOffset(offset))
        );
    }

    #[test]
    fn misaligned_offset_is_invalid() {
        let mut swap = MemorySwap::new(2);
        swap.pageout(FrameNumber::new(0), &page(1), None).unwrap();
        let offset = SwapOffset::new(3);
        let mut buffer = page(0);
        assert_eq!(
            swap.pagein(FrameNumber::new(0), offset, &mut buffer),
            Err(SwapError::InvalidOffset(offset))
        );
    }

    #[test]
    fn tracks_slots_past_first_bitmap_word() {
        let mut swap = MemorySwap::new(70);
        for frame in 0..70 {
            swap.pageout(FrameNumber::new(frame), &page(frame as u8), None)
                .unwrap();
        }
        assert_eq!(swap.used_slots(), 70);
        assert_eq!(
            swap.pageout(FrameNumber::new(0), &page(0), None),
            Err(SwapError::Full)
        );
    }
}
