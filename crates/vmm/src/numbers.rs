//! Frame, page and swap slot numbers.
//!
//! These newtypes keep the three index spaces of the simulator apart: physical frames in the
//! coremap, virtual pages in the address space and byte offsets into the swap store.

use core::fmt;

use crate::{PhysicalAddress, VirtualAddress, layout};

/// Macro to define common index newtype functionality.
macro_rules! impl_number_common {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new number from its raw value.
            #[inline]
            pub const fn new(number: usize) -> Self {
                Self(number)
            }

            /// Returns the raw value.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(number: usize) -> Self {
                Self(number)
            }
        }
    };
}

impl_number_common!(
    FrameNumber,
    "A simulated physical frame number.\n\n\
     Frame numbers index the coremap and are zero-based."
);

impl FrameNumber {
    /// Returns the physical address at the start of this frame.
    #[inline]
    pub const fn start(self) -> PhysicalAddress {
        PhysicalAddress::new(self.0 * layout::PAGE_SIZE)
    }

    /// Returns the next frame number, wrapping to zero at `count`.
    #[inline]
    pub const fn next_wrapping(self, count: usize) -> Self {
        if self.0 + 1 >= count {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }
}

impl_number_common!(
    PageNumber,
    "A virtual page number.\n\n\
     Two addresses share a page number exactly when they translate through the same\n\
     page table entry."
);

impl PageNumber {
    /// Returns the virtual address at the start of this page.
    #[inline]
    pub const fn start(self) -> VirtualAddress {
        VirtualAddress::new(self.0 << layout::PAGE_SHIFT)
    }
}

impl_number_common!(
    SwapOffset,
    "A byte offset into the swap store.\n\n\
     Offsets are handed out by the swap store on pageout and are always a multiple of\n\
     the swap slot size."
);

impl SwapOffset {
    /// Returns the swap offset of the given slot index.
    #[inline]
    pub const fn from_slot(slot: usize) -> Self {
        Self(slot * layout::SIM_PAGE_SIZE)
    }

    /// Returns the slot index for this offset, if it is slot-aligned.
    #[inline]
    pub const fn slot(self) -> Option<usize> {
        if self.0.is_multiple_of(layout::SIM_PAGE_SIZE) {
            Some(self.0 / layout::SIM_PAGE_SIZE)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod frame_number {
        use super::*;

        #[test]
        fn start_address() {
            let frame = FrameNumber::new(3);
            assert_eq!(frame.start().as_usize(), 3 * layout::PAGE_SIZE);
        }

        #[test]
        fn next_wraps_at_count() {
            assert_eq!(FrameNumber::new(0).next_wrapping(3), FrameNumber::new(1));
            assert_eq!(FrameNumber::new(2).next_wrapping(3), FrameNumber::new(0));
            assert_eq!(FrameNumber::new(0).next_wrapping(1), FrameNumber::new(0));
        }

        #[test]
        fn debug_format() {
            assert_eq!(format!("{:?}", FrameNumber::new(7)), "FrameNumber(7)");
        }
    }

    mod page_number {
        use super::*;

        #[test]
        fn start_address() {
            let page = PageNumber::new(0x42);
            assert_eq!(page.start().as_usize(), 0x42 << layout::PAGE_SHIFT);
        }
    }

    mod swap_offset {
        use super::*;

        #[test]
        fn slot_round_trip() {
            let offset = SwapOffset::from_slot(5);
            assert_eq!(offset.as_usize(), 5 * layout::SIM_PAGE_SIZE);
            assert_eq!(offset.slot(), Some(5));
        }

        #[test]
        fn misaligned_offset_has_no_slot() {
            assert_eq!(SwapOffset::new(layout::SIM_PAGE_SIZE + 1).slot(), None);
        }
    }
}
