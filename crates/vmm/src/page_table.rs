//! Second-level page tables and their entries.

use crate::{FrameNumber, SwapOffset, layout::PTRS_PER_PGTBL};

/// Where the contents of a virtual page currently live.
///
/// Exactly one state holds at a time, so a page can never be both resident and on swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    /// The page has never been touched.
    #[default]
    Unmapped,
    /// The page occupies a frame.
    ///
    /// `swap` remembers the slot of an earlier pageout so that the next pageout can reuse it
    /// and a clean eviction can fall back to it.
    InMemory {
        frame: FrameNumber,
        dirty: bool,
        swap: Option<SwapOffset>,
    },
    /// The page was evicted.
    ///
    /// `offset` is `None` when the page was dropped without ever being written to swap; its
    /// next fault zero-fills a fresh frame.
    OnSwap { offset: Option<SwapOffset> },
}

/// A single page table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    state: PageState,
    referenced: bool,
}

impl PageTableEntry {
    /// Returns the location state of this entry.
    pub fn state(&self) -> PageState {
        self.state
    }

    /// Returns the frame holding this page, if it is resident.
    pub fn frame(&self) -> Option<FrameNumber> {
        match self.state {
            PageState::InMemory { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Returns whether the page is resident in a frame.
    pub fn is_valid(&self) -> bool {
        matches!(self.state, PageState::InMemory { .. })
    }

    /// Returns whether the page is resident and modified since it was loaded.
    pub fn is_dirty(&self) -> bool {
        matches!(self.state, PageState::InMemory { dirty: true, .. })
    }

    /// Returns whether the page has been evicted.
    pub fn is_on_swap(&self) -> bool {
        matches!(self.state, PageState::OnSwap { .. })
    }

    /// Returns whether the page has been accessed since the entry was created.
    pub fn is_referenced(&self) -> bool {
        self.referenced
    }

    /// Returns the swap slot associated with this page, if any.
    pub fn swap_offset(&self) -> Option<SwapOffset> {
        match self.state {
            PageState::InMemory { swap, .. } => swap,
            PageState::OnSwap { offset } => offset,
            PageState::Unmapped => None,
        }
    }

    /// Installs the page in `frame`, keeping any existing swap slot.
    pub(crate) fn map(&mut self, frame: FrameNumber, dirty: bool) {
        self.state = PageState::InMemory {
            frame,
            dirty,
            swap: self.swap_offset(),
        };
    }

    /// Marks a resident page as modified.
    pub(crate) fn mark_dirty(&mut self) {
        if let PageState::InMemory { dirty, .. } = &mut self.state {
            *dirty = true;
        }
    }

    pub(crate) fn mark_referenced(&mut self) {
        self.referenced = true;
    }

    /// Moves the page out of memory, recording where its contents went.
    pub(crate) fn evict(&mut self, offset: Option<SwapOffset>) {
        self.state = PageState::OnSwap { offset };
    }
}

/// A second-level page table.
///
/// Tables are allocated with every entry [`PageState::Unmapped`] and are never freed.
pub struct PageTable {
    entries: Box<[PageTableEntry]>,
}

impl PageTable {
    /// Creates a new table with all entries unmapped.
    pub fn new() -> Self {
        Self {
            entries: vec![PageTableEntry::default(); PTRS_PER_PGTBL].into_boxed_slice(),
        }
    }

    /// Returns the entry at the given index.
    ///
    /// # Panics
    /// Panics if `index >= PTRS_PER_PGTBL`.
    pub fn entry(&self, index: usize) -> &PageTableEntry {
        &self.entries[index]
    }

    /// Returns a mutable reference to the entry at the given index.
    ///
    /// # Panics
    /// Panics if `index >= PTRS_PER_PGTBL`.
    pub fn entry_mut(&mut self, index: usize) -> &mut PageTableEntry {
        &mut self.entries[index]
    }

    /// Returns the number of entries in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &PageTableEntry> {
        self.entries.iter()
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}
