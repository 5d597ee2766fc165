//! The coremap: one descriptor per simulated physical frame.

use crate::{FrameNumber, PageNumber, PteHandle};

/// The virtual page currently occupying a frame.
///
/// This is a back-reference only; the entry itself is owned by the page directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOwner {
    /// Handle of the page table entry mapped to the frame.
    pub pte: PteHandle,
    /// The virtual page that entry translates.
    pub page: PageNumber,
}

/// Metadata for a single simulated physical frame.
///
/// A frame is in use exactly when it has an owner, so a free frame can never carry a stale
/// back-reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameDescriptor {
    owner: Option<FrameOwner>,
}

impl FrameDescriptor {
    /// Returns whether the frame holds a page.
    pub fn in_use(&self) -> bool {
        self.owner.is_some()
    }

    /// Returns the page occupying this frame.
    pub fn owner(&self) -> Option<FrameOwner> {
        self.owner
    }
}

/// Fixed-size table of frame descriptors.
pub struct Coremap {
    frames: Box<[FrameDescriptor]>,
}

impl Coremap {
    /// Creates a coremap of `count` free frames.
    pub fn new(count: usize) -> Self {
        Self {
            frames: vec![FrameDescriptor::default(); count].into_boxed_slice(),
        }
    }

    /// Returns the number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns whether the coremap has no frames at all.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the number of frames currently holding a page.
    pub fn in_use_count(&self) -> usize {
        self.frames.iter().filter(|f| f.in_use()).count()
    }

    /// Returns the lowest-numbered free frame.
    pub fn find_free(&self) -> Option<FrameNumber> {
        self.frames
            .iter()
            .position(|f| !f.in_use())
            .map(FrameNumber::new)
    }

    /// Returns the descriptor of a frame.
    ///
    /// # Panics
    /// Panics if the frame number is out of range.
    pub fn descriptor(&self, frame: FrameNumber) -> &FrameDescriptor {
        &self.frames[frame.as_usize()]
    }

    /// Gives `frame` to a new owner, returning the previous one.
    pub(crate) fn claim(&mut self, frame: FrameNumber, owner: FrameOwner) -> Option<FrameOwner> {
        self.frames[frame.as_usize()].owner.replace(owner)
    }

    /// Iterates over all frames in index order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameNumber, &FrameDescriptor)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (FrameNumber::new(index), descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PageDirectory, VirtualAddress};

    fn owner_for(dir: &mut PageDirectory, addr: usize) -> FrameOwner {
        let addr = VirtualAddress::new(addr);
        FrameOwner {
            pte: dir.walk_or_create(addr),
            page: addr.page(),
        }
    }

    #[test]
    fn starts_free() {
        let coremap = Coremap::new(4);
        assert_eq!(coremap.len(), 4);
        assert_eq!(coremap.in_use_count(), 0);
        assert_eq!(coremap.find_free(), Some(FrameNumber::new(0)));
        assert!(coremap.iter().all(|(_, d)| d.owner().is_none()));
    }

    #[test]
    fn claim_fills_lowest_free_frame_first() {
        let mut dir = PageDirectory::new();
        let mut coremap = Coremap::new(2);

        let first = coremap.find_free().unwrap();
        assert_eq!(coremap.claim(first, owner_for(&mut dir, 0x1000)), None);
        assert_eq!(coremap.find_free(), Some(FrameNumber::new(1)));

        let second = coremap.find_free().unwrap();
        coremap.claim(second, owner_for(&mut dir, 0x2000));
        assert_eq!(coremap.find_free(), None);
        assert_eq!(coremap.in_use_count(), 2);
    }

    #[test]
    fn claim_returns_previous_owner() {
        let mut dir = PageDirectory::new();
        let mut coremap = Coremap::new(1);
        let a = owner_for(&mut dir, 0x1000);
        let b = owner_for(&mut dir, 0x2000);

        coremap.claim(FrameNumber::new(0), a);
        assert_eq!(coremap.claim(FrameNumber::new(0), b), Some(a));
        assert_eq!(coremap.descriptor(FrameNumber::new(0)).owner(), Some(b));
    }
}
