//! Layout of the simulated address space.
//!
//! Virtual addresses are split into three fields:
//! - Bits 0-11: offset within the page (4 KiB pages)
//! - Bits 12-23: index into a second-level page table
//! - Bits 24-35: index into the page directory
//!
//! Bits above 35 are ignored by the translation, so addresses that differ only there alias
//! to the same page.
//!
//! Simulated frames only hold [`SIM_PAGE_SIZE`] bytes of content; the rest of each page is
//! never materialised.

/// Number of bits in the in-page offset.
pub const PAGE_SHIFT: usize = 12;

/// Logical page size in bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Shift of the page directory index.
pub const PGDIR_SHIFT: usize = 24;

/// Number of entries in the page directory.
pub const PTRS_PER_PGDIR: usize = 1 << 12;

/// Number of entries in a second-level page table.
pub const PTRS_PER_PGTBL: usize = 1 << (PGDIR_SHIFT - PAGE_SHIFT);

/// Bytes of backing storage per simulated frame and per swap slot.
pub const SIM_PAGE_SIZE: usize = 16;

/// Byte offset inside a frame where the owning page's address is recorded.
///
/// The first 32-bit word of the frame is left zeroed.
pub(crate) const MARKER_OFFSET: usize = core::mem::size_of::<u32>();

/// Returns the page directory index for a virtual address.
#[inline]
pub(crate) const fn directory_index(address: usize) -> usize {
    (address >> PGDIR_SHIFT) & (PTRS_PER_PGDIR - 1)
}

/// Returns the second-level table index for a virtual address.
#[inline]
pub(crate) const fn table_index(address: usize) -> usize {
    (address >> PAGE_SHIFT) & (PTRS_PER_PGTBL - 1)
}

/// Returns the offset within the page for a virtual address.
#[inline]
pub(crate) const fn page_offset(address: usize) -> usize {
    address & (PAGE_SIZE - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_fits_in_frame() {
        assert!(MARKER_OFFSET + core::mem::size_of::<u64>() <= SIM_PAGE_SIZE);
    }

    #[test]
    fn splits_address_fields() {
        let address = (0x123 << PGDIR_SHIFT) | (0x456 << PAGE_SHIFT) | 0x789;
        assert_eq!(directory_index(address), 0x123);
        assert_eq!(table_index(address), 0x456);
        assert_eq!(page_offset(address), 0x789);
    }

    #[test]
    fn ignores_bits_above_directory() {
        let address = (1 << 36) | (0x7 << PGDIR_SHIFT);
        assert_eq!(directory_index(address), 0x7);
    }
}
