//! Address types for the simulated virtual and physical address spaces.

use core::fmt;
use core::ops::Add;

use crate::{PageNumber, layout};

/// Macro to define common address type functionality.
///
/// This macro generates the basic structure and methods common to both physical
/// and virtual address types.
macro_rules! impl_address_common {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new address.
            #[inline]
            pub const fn new(addr: usize) -> Self {
                Self(addr)
            }

            /// Returns the raw address value.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0
            }

            /// Returns the offset of this address within its page.
            #[inline]
            pub const fn page_offset(self) -> usize {
                layout::page_offset(self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(addr: usize) -> Self {
                Self::new(addr)
            }
        }

        #[cfg(target_pointer_width = "64")]
        impl From<u64> for $name {
            #[inline]
            fn from(addr: u64) -> Self {
                Self::new(addr as usize)
            }
        }

        impl Add<usize> for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: usize) -> Self::Output {
                Self::new(self.0 + rhs)
            }
        }
    };
}

impl_address_common!(
    VirtualAddress,
    "A virtual address in the simulated address space.\n\n\
     The address is decomposed into a page directory index, a page table index and an\n\
     in-page offset according to the constants in the layout module."
);

impl VirtualAddress {
    /// Returns the index of this address in the page directory.
    #[inline]
    pub const fn directory_index(self) -> usize {
        layout::directory_index(self.0)
    }

    /// Returns the index of this address in its second-level page table.
    #[inline]
    pub const fn table_index(self) -> usize {
        layout::table_index(self.0)
    }

    /// Returns the virtual page number this address translates through.
    ///
    /// Only the bits used by the page table walk take part, so aliasing addresses share a
    /// page number.
    #[inline]
    pub const fn page(self) -> PageNumber {
        PageNumber::new((self.directory_index() * layout::PTRS_PER_PGTBL) + self.table_index())
    }

    /// Returns the address of the start of this address's page.
    #[inline]
    pub const fn page_base(self) -> Self {
        self.page().start()
    }
}

impl_address_common!(
    PhysicalAddress,
    "A physical address in simulated memory.\n\n\
     Physical addresses are frame base addresses combined with an in-page offset."
);
