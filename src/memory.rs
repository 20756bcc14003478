use std::fmt;

use crate::config::VmConfig;

/// Where a page table or a page currently lives.
///
/// In memory this is a single signed cell: a non-negative value is a frame
/// id, a negative value is the negated store block id. Zero is frame 0, so
/// `OnStore(0)` has no cell encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Resident(usize),
    OnStore(usize),
}

impl Location {
    /// Decode a raw table cell by its sign.
    #[inline]
    pub fn from_cell(cell: i32) -> Self {
        if cell >= 0 {
            Location::Resident(cell as usize)
        } else {
            Location::OnStore(cell.unsigned_abs() as usize)
        }
    }

    #[inline]
    pub fn to_cell(self) -> i32 {
        match self {
            Location::Resident(frame) => frame as i32,
            Location::OnStore(block) => {
                debug_assert!(block != 0, "block 0 is indistinguishable from frame 0");
                -(block as i32)
            }
        }
    }

    #[inline]
    pub fn is_resident(self) -> bool {
        matches!(self, Location::Resident(_))
    }

    pub fn frame(self) -> Option<usize> {
        match self {
            Location::Resident(frame) => Some(frame),
            Location::OnStore(_) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Resident(frame) => write!(f, "frame {}", frame),
            Location::OnStore(block) => write!(f, "store block {}", block),
        }
    }
}

/// Simulated physical memory.
///
/// The low cells hold the segment table (`2s` = length, `2s+1` = page table
/// location). Everything else is addressed as `frame * frame_size + offset`.
/// Indexing past the end panics; the translator never produces such an
/// address.
pub struct PhysicalMemory {
    data: Box<[i32]>,
    frame_size: usize,
}

impl PhysicalMemory {
    /// Create a new physical memory initialized to all zeros
    pub fn new(config: &VmConfig) -> Self {
        PhysicalMemory {
            data: vec![0i32; config.memory_size()].into_boxed_slice(),
            frame_size: config.frame_size,
        }
    }

    #[inline]
    pub fn read(&self, address: usize) -> i32 {
        self.data[address]
    }

    #[inline]
    pub fn write(&mut self, address: usize, value: i32) {
        self.data[address] = value;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Get the length bound of a segment from the Segment Table
    #[inline]
    pub fn segment_length(&self, segment: u32) -> i32 {
        self.data[2 * segment as usize]
    }

    /// Get where the page table of a segment lives
    #[inline]
    pub fn segment_location(&self, segment: u32) -> Location {
        Location::from_cell(self.data[2 * segment as usize + 1])
    }

    pub fn set_segment_entry(&mut self, segment: u32, length: i32, pt_location: Location) {
        let base = 2 * segment as usize;
        self.data[base] = length;
        self.data[base + 1] = pt_location.to_cell();
    }

    pub fn set_segment_location(&mut self, segment: u32, pt_location: Location) {
        self.data[2 * segment as usize + 1] = pt_location.to_cell();
    }

    /// Get a Page Table entry from a resident page table
    #[inline]
    pub fn page_location(&self, pt_frame: usize, page: u32) -> Location {
        Location::from_cell(self.data[self.frame_to_address(pt_frame) + page as usize])
    }

    pub fn set_page_entry(&mut self, pt_frame: usize, page: u32, location: Location) {
        let address = self.frame_to_address(pt_frame) + page as usize;
        self.data[address] = location.to_cell();
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(&self, frame: usize) -> usize {
        frame * self.frame_size
    }

    /// The cells of one frame.
    pub fn frame(&self, frame: usize) -> &[i32] {
        let start = self.frame_to_address(frame);
        &self.data[start..start + self.frame_size]
    }

    fn frame_mut(&mut self, frame: usize) -> &mut [i32] {
        let start = self.frame_to_address(frame);
        let end = start + self.frame_size;
        &mut self.data[start..end]
    }
}

/// Secondary store holding swapped-out page tables and pages.
///
/// Same size as physical memory, addressed by `block * block_size + offset`.
pub struct SecondaryStore {
    data: Box<[i32]>,
    block_size: usize,
}

impl SecondaryStore {
    pub fn new(config: &VmConfig) -> Self {
        SecondaryStore {
            data: vec![0i32; config.memory_size()].into_boxed_slice(),
            block_size: config.frame_size,
        }
    }

    #[inline]
    pub fn read(&self, block: usize, offset: usize) -> i32 {
        assert!(offset < self.block_size, "offset {} outside block", offset);
        self.data[block * self.block_size + offset]
    }

    #[inline]
    pub fn write(&mut self, block: usize, offset: usize, value: i32) {
        assert!(offset < self.block_size, "offset {} outside block", offset);
        self.data[block * self.block_size + offset] = value;
    }

    pub fn block(&self, block: usize) -> &[i32] {
        let start = block * self.block_size;
        &self.data[start..start + self.block_size]
    }

    /// Copy an entire block into a frame of physical memory. The block
    /// itself is left as it was.
    pub fn read_block(&self, block: usize, pm: &mut PhysicalMemory, frame: usize) {
        pm.frame_mut(frame).copy_from_slice(self.block(block));
    }
}
