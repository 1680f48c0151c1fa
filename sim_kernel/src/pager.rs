//! Simulated pager
//!
//! A stand-in for the memory manager the scheduler prefetches through.
//! Each process gets a page table of at most [`MAX_PAGES`] pages, and a
//! fixed number of frames is shared by all of them. Only counts are kept:
//! how many pages each table needs, how many are resident and how many
//! frames are free.

use crate::fault_injection::FaultInjector;
use core_types::{PageTableId, ProcessRecord};
use hal::{Pager, PagingError};
use log::trace;
use std::collections::HashMap;

/// Maximum number of pages per process
pub const MAX_PAGES: u64 = 16;

#[derive(Debug, Clone, Copy)]
struct PageTable {
    pages: usize,
    resident: usize,
}

/// Frame pool plus every page table
#[derive(Debug)]
pub struct SimPager {
    page_size: u64,
    page_load_cost: u64,
    frame_count: usize,
    free_frames: usize,
    tables: HashMap<PageTableId, PageTable>,
    next_table: u64,
    injector: Option<FaultInjector>,
}

impl SimPager {
    /// Creates a pager with `frame_count` frames of `page_size` bytes
    pub fn new(frame_count: usize, page_size: u64, page_load_cost: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            page_load_cost,
            frame_count,
            free_frames: frame_count,
            tables: HashMap::new(),
            next_table: 1,
            injector: None,
        }
    }

    /// Installs a fault injector
    pub fn with_fault_injector(mut self, injector: FaultInjector) -> Self {
        self.injector = Some(injector);
        self
    }

    pub fn set_fault_injector(&mut self, injector: FaultInjector) {
        self.injector = Some(injector);
    }

    /// Number of pages needed for `size_bytes`
    pub fn pages_for(&self, size_bytes: u64) -> u64 {
        size_bytes.div_ceil(self.page_size)
    }

    /// Creates a page table with nothing resident
    pub fn create_page_table(&mut self, size_bytes: u64) -> Result<PageTableId, PagingError> {
        let pages = self.pages_for(size_bytes);
        if pages > MAX_PAGES {
            return Err(PagingError::ProcessTooLarge { size_bytes });
        }

        let id = PageTableId::new(self.next_table);
        self.next_table += 1;
        self.tables.insert(
            id,
            PageTable {
                pages: pages as usize,
                resident: 0,
            },
        );
        Ok(id)
    }

    /// Drops a page table and returns the number of frames freed
    pub fn release(&mut self, id: PageTableId) -> Result<usize, PagingError> {
        let table = self
            .tables
            .remove(&id)
            .ok_or(PagingError::UnknownPageTable(id))?;
        self.free_frames += table.resident;
        trace!("released {} ({} frames)", id, table.resident);
        Ok(table.resident)
    }

    /// Resident page count for a table (0 if unknown)
    pub fn resident_pages(&self, id: PageTableId) -> usize {
        self.tables.get(&id).map_or(0, |table| table.resident)
    }

    pub fn free_frame_count(&self) -> usize {
        self.free_frames
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of failures injected so far
    pub fn injected_failures(&self) -> usize {
        self.injector
            .as_ref()
            .map_or(0, FaultInjector::injected_count)
    }
}

impl Pager for SimPager {
    fn prefetch(&mut self, process: &ProcessRecord) -> Result<(), PagingError> {
        if let Some(injector) = self.injector.as_mut() {
            if injector.should_fail_prefetch(process.id) {
                return Err(PagingError::Injected(process.id));
            }
        }

        let table = self
            .tables
            .get_mut(&process.page_table)
            .ok_or(PagingError::UnknownPageTable(process.page_table))?;

        let needed = table.pages - table.resident;
        if needed > self.free_frames {
            return Err(PagingError::OutOfFrames {
                needed,
                available: self.free_frames,
            });
        }

        self.free_frames -= needed;
        table.resident = table.pages;
        trace!("prefetched {} page(s) for {}", needed, process.id);
        Ok(())
    }

    fn startup_cost(&self, process: &ProcessRecord) -> u64 {
        self.tables.get(&process.page_table).map_or(0, |table| {
            (table.pages - table.resident) as u64 * self.page_load_cost
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ProcessId;

    fn record_for(pager: &mut SimPager, size_bytes: u64) -> ProcessRecord {
        let table = pager.create_page_table(size_bytes).unwrap();
        ProcessRecord::new(ProcessId::new(), table, size_bytes, 0)
    }

    #[test]
    fn test_pages_for_rounds_up() {
        let pager = SimPager::new(8, 512, 2);
        assert_eq!(pager.pages_for(0), 0);
        assert_eq!(pager.pages_for(1), 1);
        assert_eq!(pager.pages_for(512), 1);
        assert_eq!(pager.pages_for(513), 2);
    }

    #[test]
    fn test_process_too_large() {
        let mut pager = SimPager::new(64, 512, 2);
        let size = 512 * (MAX_PAGES + 1);
        assert_eq!(
            pager.create_page_table(size),
            Err(PagingError::ProcessTooLarge { size_bytes: size })
        );
    }

    #[test]
    fn test_prefetch_makes_pages_resident() {
        let mut pager = SimPager::new(8, 512, 2);
        let record = record_for(&mut pager, 1500);

        assert_eq!(pager.startup_cost(&record), 6);
        pager.prefetch(&record).unwrap();

        assert_eq!(pager.resident_pages(record.page_table), 3);
        assert_eq!(pager.free_frame_count(), 5);
        assert_eq!(pager.startup_cost(&record), 0);
    }

    #[test]
    fn test_prefetch_is_idempotent() {
        let mut pager = SimPager::new(8, 512, 2);
        let record = record_for(&mut pager, 1024);

        pager.prefetch(&record).unwrap();
        pager.prefetch(&record).unwrap();
        assert_eq!(pager.free_frame_count(), 6);
    }

    #[test]
    fn test_out_of_frames() {
        let mut pager = SimPager::new(2, 512, 2);
        let record = record_for(&mut pager, 2048);

        assert_eq!(
            pager.prefetch(&record),
            Err(PagingError::OutOfFrames {
                needed: 4,
                available: 2
            })
        );
        assert_eq!(pager.free_frame_count(), 2);
        assert_eq!(pager.resident_pages(record.page_table), 0);
    }

    #[test]
    fn test_release_returns_frames() {
        let mut pager = SimPager::new(4, 512, 2);
        let a = record_for(&mut pager, 1024);
        let b = record_for(&mut pager, 1024);
        pager.prefetch(&a).unwrap();
        pager.prefetch(&b).unwrap();
        assert_eq!(pager.free_frame_count(), 0);

        assert_eq!(pager.release(a.page_table), Ok(2));
        assert_eq!(pager.free_frame_count(), 2);
        assert_eq!(pager.resident_pages(a.page_table), 0);
        assert_eq!(pager.frame_count(), 4);
    }

    #[test]
    fn test_release_unknown_table() {
        let mut pager = SimPager::new(4, 512, 2);
        let id = PageTableId::new(99);
        assert_eq!(pager.release(id), Err(PagingError::UnknownPageTable(id)));
    }

    #[test]
    fn test_injected_failure() {
        use crate::fault_injection::{FaultPlan, PagingFault};

        let plan = FaultPlan::new().with_paging_fault(PagingFault::FailNextPrefetch { count: 1 });
        let mut pager = SimPager::new(4, 512, 2).with_fault_injector(FaultInjector::new(plan));
        let record = record_for(&mut pager, 512);

        assert_eq!(
            pager.prefetch(&record),
            Err(PagingError::Injected(record.id))
        );
        assert!(pager.prefetch(&record).is_ok());
        assert_eq!(pager.injected_failures(), 1);
    }
}
