//! Belady's offline-optimal replacement.

use crate::{Coremap, FrameNumber, PageNumber};

use super::{PolicyKind, ReplacementPolicy};

/// Evicts the page whose next use lies farthest in the future.
///
/// The whole reference string is loaded up front and consumed one entry per access. An
/// eviction scans the remaining references for every resident page, which costs
/// O(frames × remaining trace) in the worst case. A page that never appears again is chosen
/// as soon as it is found.
pub struct Opt {
    future: Vec<PageNumber>,
    cursor: usize,
    frames: usize,
}

impl Opt {
    /// Creates the policy from the pages the run will access, in order.
    pub fn new(frames: usize, future: Vec<PageNumber>) -> Self {
        Self {
            future,
            cursor: 0,
            frames,
        }
    }

    /// Returns the references that have not yet been consumed.
    pub fn remaining(&self) -> &[PageNumber] {
        &self.future[self.cursor.min(self.future.len())..]
    }

    /// Returns how many references ahead `page` is next used, if ever.
    pub fn next_use(&self, page: PageNumber) -> Option<usize> {
        self.remaining().iter().position(|&p| p == page)
    }
}

impl ReplacementPolicy for Opt {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Opt
    }

    fn capacity(&self) -> usize {
        self.frames
    }

    fn reference(&mut self, _frame: FrameNumber, page: PageNumber) {
        match self.future.get(self.cursor) {
            Some(&expected) if expected == page => {}
            Some(&expected) => log::warn!(
                "opt: reference #{} is page {}, trace predicted page {}",
                self.cursor,
                page,
                expected
            ),
            None => log::warn!(
                "opt: reference #{} to page {} is past the end of the trace",
                self.cursor,
                page
            ),
        }
        self.cursor += 1;
    }

    fn evict(&mut self, coremap: &Coremap) -> FrameNumber {
        let mut farthest: Option<(FrameNumber, usize)> = None;

        for (frame, descriptor) in coremap.iter() {
            let Some(owner) = descriptor.owner() else {
                continue;
            };

            match self.next_use(owner.page) {
                None => return frame,
                Some(distance) => {
                    if farthest.is_none_or(|(_, best)| distance > best) {
                        farthest = Some((frame, distance));
                    }
                }
            }
        }

        // The coremap is full whenever a victim is requested.
        farthest.map_or(FrameNumber::new(0), |(frame, _)| frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::testing::full_coremap;

    fn pages(raw: &[usize]) -> Vec<PageNumber> {
        raw.iter().copied().map(PageNumber::new).collect()
    }

    #[test]
    fn reference_consumes_trace() {
        let mut opt = Opt::new(2, pages(&[1, 2, 1]));
        opt.reference(FrameNumber::new(0), PageNumber::new(1));
        assert_eq!(opt.remaining(), pages(&[2, 1]).as_slice());
        assert_eq!(opt.next_use(PageNumber::new(1)), Some(1));
        assert_eq!(opt.next_use(PageNumber::new(3)), None);
    }

    #[test]
    fn evicts_page_never_used_again() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut opt = Opt::new(3, pages(&[4, 1, 2]));
        assert_eq!(opt.evict(&coremap), FrameNumber::new(2));
    }

    #[test]
    fn evicts_farthest_next_use() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut opt = Opt::new(3, pages(&[4, 2, 3, 1, 2]));
        assert_eq!(opt.evict(&coremap), FrameNumber::new(0));
    }

    #[test]
    fn unused_page_short_circuits_before_later_frames() {
        let coremap = full_coremap(&[1, 2, 3]);
        let mut opt = Opt::new(3, pages(&[4, 3]));
        // Frames 0 and 1 never recur; the first one found wins.
        assert_eq!(opt.evict(&coremap), FrameNumber::new(0));
    }

    #[test]
    fn exhausted_trace_treats_every_page_as_unused() {
        let coremap = full_coremap(&[1, 2]);
        let mut opt = Opt::new(2, pages(&[1]));
        opt.reference(FrameNumber::new(0), PageNumber::new(1));
        opt.reference(FrameNumber::new(0), PageNumber::new(1));
        assert!(opt.remaining().is_empty());
        assert_eq!(opt.evict(&coremap), FrameNumber::new(0));
    }
}
