//! First-in, first-out replacement.

use crate::{Coremap, FrameNumber, PageNumber};

use super::{PolicyKind, ReplacementPolicy};

/// Evicts frames in the order they were filled.
///
/// Free frames are always handed out lowest-first, so once memory is full the fill order
/// is simply frame order and a rotating cursor tracks the oldest page.
pub struct Fifo {
    cursor: FrameNumber,
    frames: usize,
}

impl Fifo {
    pub fn new(frames: usize) -> Self {
        Self {
            cursor: FrameNumber::new(0),
            frames,
        }
    }
}

impl ReplacementPolicy for Fifo {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn capacity(&self) -> usize {
        self.frames
    }

    fn reference(&mut self, _frame: FrameNumber, _page: PageNumber) {}

    fn evict(&mut self, _coremap: &Coremap) -> FrameNumber {
        let victim = self.cursor;
        self.cursor = self.cursor.next_wrapping(self.frames);
        victim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testing::full_coremap;

    #[test]
    fn evicts_in_rotation() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut fifo = Fifo::new(3);

        let victims: Vec<usize> = (0..5).map(|_| fifo.evict(&coremap).as_usize()).collect();
        assert_eq!(victims, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn references_do_not_change_order() {
        let coremap = full_coremap(&[1, 2]);
        let mut fifo = Fifo::new(2);

        fifo.reference(FrameNumber::new(0), PageNumber::new(1));
        fifo.reference(FrameNumber::new(0), PageNumber::new(1));
        assert_eq!(fifo.evict(&coremap), FrameNumber::new(0));
    }
}
