//! Clock (second chance) replacement.

use crate::{Coremap, FrameNumber, PageNumber};

use super::{PolicyKind, ReplacementPolicy};

/// Sweeps a hand around the frames, evicting the first one whose reference count has run out.
///
/// Every frame starts with a count of one, and an access sets the count back to one. The
/// hand takes one from each frame it passes, so a frame survives at most one full sweep
/// without being touched.
pub struct Clock {
    counts: Box<[u8]>,
    hand: FrameNumber,
}

impl Clock {
    pub fn new(frames: usize) -> Self {
        Self {
            counts: vec![1; frames].into_boxed_slice(),
            hand: FrameNumber::new(0),
        }
    }

    /// Returns the frame the hand currently points at.
    pub fn hand(&self) -> FrameNumber {
        self.hand
    }

    /// Returns the reference count of a frame.
    pub fn count(&self, frame: FrameNumber) -> u8 {
        self.counts[frame.as_usize()]
    }
}

impl ReplacementPolicy for Clock {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Clock
    }

    fn capacity(&self) -> usize {
        self.counts.len()
    }

    fn reference(&mut self, frame: FrameNumber, _page: PageNumber) {
        self.counts[frame.as_usize()] = 1;
    }

    fn evict(&mut self, _coremap: &Coremap) -> FrameNumber {
        let frames = self.counts.len();
        // Counts only fall during the sweep, so one lap brings every frame to zero.
        loop {
            let hand = self.hand;
            self.hand = hand.next_wrapping(frames);

            let count = &mut self.counts[hand.as_usize()];
            if *count == 0 {
                return hand;
            }
            *count -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testing::full_coremap;

    #[test]
    fn starts_with_every_count_set() {
        let clock = Clock::new(3);
        assert_eq!(clock.hand(), FrameNumber::new(0));
        for frame in 0..3 {
            assert_eq!(clock.count(FrameNumber::new(frame)), 1);
        }
    }

    #[test]
    fn full_sweep_wraps_to_start() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut clock = Clock::new(3);

        // Every count is one, so the hand clears all three and wraps back to frame 0.
        assert_eq!(clock.evict(&coremap), FrameNumber::new(0));
        assert_eq!(clock.hand(), FrameNumber::new(1));
        assert_eq!(clock.count(FrameNumber::new(1)), 0);
        assert_eq!(clock.count(FrameNumber::new(2)), 0);
    }

    #[test]
    fn picks_first_cleared_frame_after_hand() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut clock = Clock::new(3);
        clock.evict(&coremap);

        // Frames 1 and 2 are at zero; touching 1 gives it a second chance.
        clock.reference(FrameNumber::new(1), PageNumber::new(2));
        assert_eq!(clock.evict(&coremap), FrameNumber::new(2));
        assert_eq!(clock.count(FrameNumber::new(1)), 0);
        assert_eq!(clock.hand(), FrameNumber::new(0));
    }

    #[test]
    fn referenced_frames_are_skipped_and_decremented() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut clock = Clock::new(3);
        clock.evict(&coremap);

        // Touch two frames back to one; the sweep starts at frame 1.
        clock.reference(FrameNumber::new(0), PageNumber::new(1));
        clock.reference(FrameNumber::new(1), PageNumber::new(2));

        assert_eq!(clock.evict(&coremap), FrameNumber::new(2));
        assert_eq!(clock.count(FrameNumber::new(1)), 0);
        assert_eq!(clock.count(FrameNumber::new(0)), 1);
    }
}
