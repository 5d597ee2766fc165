//! Exact least-recently-used replacement.

use crate::{Coremap, FrameNumber, PageNumber};

use super::{PolicyKind, ReplacementPolicy};

/// Evicts the frame whose last access is oldest.
///
/// Every frame carries a tick. An access resets the touched frame to zero and then ages every
/// frame by one, so the most negative tick belongs to the least recently used frame. Both
/// operations cost O(frames).
pub struct Lru {
    ticks: Box<[i64]>,
}

impl Lru {
    pub fn new(frames: usize) -> Self {
        Self {
            ticks: vec![0; frames].into_boxed_slice(),
        }
    }

    /// Returns the recency tick of a frame.
    pub fn tick(&self, frame: FrameNumber) -> i64 {
        self.ticks[frame.as_usize()]
    }
}

impl ReplacementPolicy for Lru {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }

    fn capacity(&self) -> usize {
        self.ticks.len()
    }

    fn reference(&mut self, frame: FrameNumber, _page: PageNumber) {
        self.ticks[frame.as_usize()] = 0;
        for tick in self.ticks.iter_mut() {
            *tick = tick.saturating_sub(1);
        }
    }

    fn evict(&mut self, _coremap: &Coremap) -> FrameNumber {
        let mut oldest = 0;
        for (index, &tick) in self.ticks.iter().enumerate() {
            if tick < self.ticks[oldest] {
                oldest = index;
            }
        }
        FrameNumber::new(oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testing::full_coremap;

    fn touch(lru: &mut Lru, frame: usize) {
        lru.reference(FrameNumber::new(frame), PageNumber::new(frame));
    }

    #[test]
    fn access_resets_then_ages() {
        let mut lru = Lru::new(3);
        touch(&mut lru, 1);
        assert_eq!(lru.tick(FrameNumber::new(1)), -1);
        assert_eq!(lru.tick(FrameNumber::new(0)), -1);

        touch(&mut lru, 0);
        assert_eq!(lru.tick(FrameNumber::new(0)), -1);
        assert_eq!(lru.tick(FrameNumber::new(1)), -2);
    }

    #[test]
    fn evicts_least_recent() {
        let coremap = full_coremap(&[10, 11, 12]);
        let mut lru = Lru::new(3);
        touch(&mut lru, 0);
        touch(&mut lru, 1);
        touch(&mut lru, 2);
        touch(&mut lru, 0);

        assert_eq!(lru.evict(&coremap), FrameNumber::new(1));
    }

    #[test]
    fn first_index_wins_ties() {
        let coremap = full_coremap(&[10, 11, 12]);
        let mut lru = Lru::new(3);
        assert_eq!(lru.evict(&coremap), FrameNumber::new(0));
    }
}
