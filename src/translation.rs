use log::{debug, trace};

use crate::constants::*;
use crate::error::Result;
use crate::frames::FreeFrameList;
use crate::memory::{Location, PhysicalMemory, SecondaryStore};

/// Represents the decomposed components of a Virtual Address
///
/// Layout is `[unused:5][s:9][p:9][w:9]`; `pw` is the page and offset taken
/// together, which is what the segment length bounds. The unused bits are
/// dropped so `s` always indexes the segment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: u32,
    pub s: u32,
    pub p: u32,
    pub w: u32,
    pub pw: u32,
}

impl VirtualAddress {
    /// Decompose a raw VA into its components
    pub fn from_raw(va: u32) -> Self {
        let s = (va >> S_SHIFT) & S_MASK;
        let p = (va >> P_SHIFT) & P_MASK;
        let w = va & W_MASK;
        let pw = va & PW_MASK;

        VirtualAddress { va, s, p, w, pw }
    }

    /// Build a VA from its fields. Each field is truncated to 9 bits.
    pub fn new(s: u32, p: u32, w: u32) -> Self {
        Self::from_raw(((s & S_MASK) << S_SHIFT) | ((p & P_MASK) << P_SHIFT) | (w & W_MASK))
    }
}

impl std::fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VA({}) = (s={}, p={}, w={}, pw={})",
            self.va, self.s, self.p, self.w, self.pw
        )
    }
}

/// Result of an address translation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationResult {
    Success(usize),
    /// `pw` reached the segment length. Nothing was touched.
    SegmentationFault,
}

impl TranslationResult {
    /// Convert to the output format (-1 for errors, PA otherwise)
    pub fn to_output(&self) -> i64 {
        match self {
            TranslationResult::Success(pa) => *pa as i64,
            TranslationResult::SegmentationFault => INVALID_ADDRESS,
        }
    }

    pub fn physical_address(&self) -> Option<usize> {
        match self {
            TranslationResult::Success(pa) => Some(*pa),
            TranslationResult::SegmentationFault => None,
        }
    }
}

/// Counters kept across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultStats {
    pub translations: u64,
    pub segmentation_faults: u64,
    pub page_table_faults: u64,
    pub page_faults: u64,
}

impl FaultStats {
    pub fn total_faults(&self) -> u64 {
        self.page_table_faults + self.page_faults
    }
}

/// The table cell that governs residency for one step of the walk.
#[derive(Debug, Clone, Copy)]
enum TableEntry {
    /// Page table location in the segment table.
    Segment(u32),
    /// Page location inside a resident page table.
    Page { pt_frame: usize, page: u32 },
}

impl TableEntry {
    fn read(self, pm: &PhysicalMemory) -> Location {
        match self {
            TableEntry::Segment(s) => pm.segment_location(s),
            TableEntry::Page { pt_frame, page } => pm.page_location(pt_frame, page),
        }
    }

    fn write(self, pm: &mut PhysicalMemory, location: Location) {
        match self {
            TableEntry::Segment(s) => pm.set_segment_location(s, location),
            TableEntry::Page { pt_frame, page } => pm.set_page_entry(pt_frame, page, location),
        }
    }
}

/// Make the block behind `entry` resident and return its frame.
///
/// On a fault: take a frame from the pool, copy the store block into it and
/// point the entry at the frame. The store block is not modified.
fn resolve_if_absent(
    entry: TableEntry,
    pm: &mut PhysicalMemory,
    store: &SecondaryStore,
    ffl: &mut FreeFrameList,
    stats: &mut FaultStats,
) -> Result<usize> {
    let block = match entry.read(pm) {
        Location::Resident(frame) => return Ok(frame),
        Location::OnStore(block) => block,
    };

    let frame = ffl.allocate()?;
    store.read_block(block, pm, frame);
    entry.write(pm, Location::Resident(frame));

    match entry {
        TableEntry::Segment(s) => {
            stats.page_table_faults += 1;
            debug!("page table fault: segment {} loaded block {} into frame {}", s, block, frame);
        }
        TableEntry::Page { page, .. } => {
            stats.page_faults += 1;
            debug!("page fault: page {} loaded block {} into frame {}", page, block, frame);
        }
    }
    Ok(frame)
}

/// Translate a virtual address to a physical address, swapping in the page
/// table and the page from the store when they are not resident.
///
/// A bound violation comes back as `Ok(SegmentationFault)`. The only error
/// is `PoolExhausted`, which leaves no way to make progress.
pub fn translate(
    va: &VirtualAddress,
    pm: &mut PhysicalMemory,
    store: &SecondaryStore,
    ffl: &mut FreeFrameList,
    stats: &mut FaultStats,
) -> Result<TranslationResult> {
    stats.translations += 1;

    if i64::from(va.pw) >= i64::from(pm.segment_length(va.s)) {
        stats.segmentation_faults += 1;
        trace!("{} -> segmentation fault", va);
        return Ok(TranslationResult::SegmentationFault);
    }

    let pt_frame = resolve_if_absent(TableEntry::Segment(va.s), pm, store, ffl, stats)?;
    let page_frame = resolve_if_absent(TableEntry::Page { pt_frame, page: va.p }, pm, store, ffl, stats)?;

    let pa = pm.frame_to_address(page_frame) + va.w as usize;
    trace!("{} -> PA {}", va, pa);
    Ok(TranslationResult::Success(pa))
}
