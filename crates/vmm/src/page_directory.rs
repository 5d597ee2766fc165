//! The top-level page directory.
//!
//! This module provides the `PageDirectory` type, which owns every second-level page table
//! of the simulated address space and walks virtual addresses down to their entries.

use core::fmt;

use crate::{
    PageNumber, VirtualAddress,
    layout::{PTRS_PER_PGDIR, PTRS_PER_PGTBL},
    page_table::{PageState, PageTable, PageTableEntry},
};

/// A stable reference to a page table entry.
///
/// Handles are only produced for entries whose table has been allocated, and tables are never
/// freed, so a handle stays valid for the life of the directory that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PteHandle {
    directory: usize,
    table: usize,
}

impl PteHandle {
    /// Returns the page directory index of the entry.
    pub fn directory_index(self) -> usize {
        self.directory
    }

    /// Returns the index of the entry within its table.
    pub fn table_index(self) -> usize {
        self.table
    }

    /// Returns the virtual page the entry translates.
    pub fn page(self) -> PageNumber {
        PageNumber::new(self.directory * PTRS_PER_PGTBL + self.table)
    }
}

/// The page directory of the single simulated address space.
///
/// Second-level tables are allocated on first reference to any address in their range.
pub struct PageDirectory {
    tables: Box<[Option<PageTable>]>,
    allocated: usize,
}

impl PageDirectory {
    /// Creates a new page directory with every entry empty.
    pub fn new() -> Self {
        Self {
            tables: (0..PTRS_PER_PGDIR).map(|_| None).collect(),
            allocated: 0,
        }
    }

    /// Returns the number of second-level tables allocated so far.
    pub fn table_count(&self) -> usize {
        self.allocated
    }

    /// Returns the second-level table at a directory index, if allocated.
    pub fn table(&self, index: usize) -> Option<&PageTable> {
        self.tables.get(index)?.as_ref()
    }

    /// Looks up the entry for a virtual address without allocating anything.
    pub fn walk(&self, virt: VirtualAddress) -> Option<&PageTableEntry> {
        let table = self.table(virt.directory_index())?;
        Some(table.entry(virt.table_index()))
    }

    /// Walks to the entry for a virtual address, allocating its table if needed.
    ///
    /// Returns a handle to the entry rather than a borrow, so the caller can go on to
    /// modify other entries (an eviction victim, for example) before coming back to it.
    pub fn walk_or_create(&mut self, virt: VirtualAddress) -> PteHandle {
        let directory = virt.directory_index();
        let slot = &mut self.tables[directory];

        if slot.is_none() {
            *slot = Some(PageTable::new());
            self.allocated += 1;
            log::debug!(
                "allocated page table for directory entry {} (address {})",
                directory,
                virt
            );
        }

        PteHandle {
            directory,
            table: virt.table_index(),
        }
    }

    /// Returns the entry behind a handle, if its table is allocated in this directory.
    pub fn get(&self, handle: PteHandle) -> Option<&PageTableEntry> {
        let table = self.table(handle.directory)?;
        Some(table.entry(handle.table))
    }

    /// Returns the entry behind a handle issued by this directory.
    pub(crate) fn entry(&self, handle: PteHandle) -> &PageTableEntry {
        self.tables[handle.directory]
            .as_ref()
            .expect("handle refers to an allocated table")
            .entry(handle.table)
    }

    /// Returns the entry behind a handle, mutably.
    pub(crate) fn entry_mut(&mut self, handle: PteHandle) -> &mut PageTableEntry {
        self.tables[handle.directory]
            .as_mut()
            .expect("handle refers to an allocated table")
            .entry_mut(handle.table)
    }

    /// Iterates over every entry of every allocated table along with its handle.
    pub fn entries(&self) -> impl Iterator<Item = (PteHandle, &PageTableEntry)> {
        self.tables
            .iter()
            .enumerate()
            .filter_map(|(directory, table)| Some((directory, table.as_ref()?)))
            .flat_map(|(directory, table)| {
                table
                    .iter()
                    .enumerate()
                    .map(move |(index, entry)| (PteHandle { directory, table: index }, entry))
            })
    }
}

impl Default for PageDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes one table, folding consecutive untouched entries into a single INVALID line.
fn write_table(f: &mut fmt::Formatter<'_>, table: &PageTable) -> fmt::Result {
    let mut invalid_run: Option<(usize, usize)> = None;

    for (index, entry) in table.iter().enumerate() {
        if entry.state() == PageState::Unmapped {
            invalid_run = match invalid_run {
                Some((first, _)) => Some((first, index)),
                None => Some((index, index)),
            };
            continue;
        }

        if let Some((first, last)) = invalid_run.take() {
            writeln!(f, "\t[{}] - [{}]: INVALID", first, last)?;
        }

        write!(f, "\t[{}]: ", index)?;
        match entry.state() {
            PageState::InMemory { frame, dirty, .. } => {
                write!(f, "VALID, ")?;
                if dirty {
                    write!(f, "DIRTY, ")?;
                }
                writeln!(f, "in frame {}", frame)?;
            }
            PageState::OnSwap {
                offset: Some(offset),
            } => writeln!(f, "ONSWAP, at offset {}", offset)?,
            PageState::OnSwap { offset: None } => writeln!(f, "ONSWAP, not written")?,
            PageState::Unmapped => {}
        }
    }

    if let Some((first, last)) = invalid_run {
        writeln!(f, "\t[{}] - [{}]: INVALID", first, last)?;
    }

    Ok(())
}

impl fmt::Display for PageDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut invalid_run: Option<(usize, usize)> = None;

        for (index, table) in self.tables.iter().enumerate() {
            let Some(table) = table else {
                invalid_run = match invalid_run {
                    Some((first, _)) => Some((first, index)),
                    None => Some((index, index)),
                };
                continue;
            };

            if let Some((first, last)) = invalid_run.take() {
                writeln!(f, "[{}]: INVALID\n  to\n[{}]: INVALID", first, last)?;
            }

            let resident = table.iter().filter(|e| e.is_valid()).count();
            writeln!(f, "[{}]: table, {} resident", index, resident)?;
            write_table(f, table)?;
        }

        if let Some((first, last)) = invalid_run {
            writeln!(f, "[{}]: INVALID\n  to\n[{}]: INVALID", first, last)?;
        }

        Ok(())
    }
}
