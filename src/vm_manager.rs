use std::collections::BTreeSet;

use log::{debug, trace, warn};

use crate::config::VmConfig;
use crate::constants::*;
use crate::error::{LocationKind, Result, VmError};
use crate::frames::FreeFrameList;
use crate::memory::{Location, PhysicalMemory, SecondaryStore};
use crate::translation::{self, FaultStats, TranslationResult, VirtualAddress};

/// Owns the simulated machine for one run: physical memory, the secondary
/// store, the free-frame pool and the fault counters.
pub struct VmManager {
    config: VmConfig,
    pm: PhysicalMemory,
    store: SecondaryStore,
    free_frames: FreeFrameList,
    stats: FaultStats,
}

impl VmManager {
    pub fn new(config: VmConfig) -> Result<Self> {
        config.validate()?;
        Ok(VmManager {
            pm: PhysicalMemory::new(&config),
            store: SecondaryStore::new(&config),
            free_frames: FreeFrameList::new(config.frame_count),
            stats: FaultStats::default(),
            config,
        })
    }

    /// Write the segment table entry for `segment`. A resident page table
    /// location takes its frame out of the pool.
    pub fn install_segment(&mut self, segment: u32, length: i32, location: i32) -> Result<()> {
        check_segment(segment)?;
        let location = self.checked_location(location)?;
        trace!("ST[{}] = (length {}, {})", segment, length, location);

        self.pm.set_segment_entry(segment, length, location);
        if let Location::Resident(frame) = location {
            self.take_frame(frame);
        }
        Ok(())
    }

    /// Write a page table entry wherever the segment's page table currently
    /// lives: into its frame when resident, otherwise into its store block.
    /// A resident page location takes its frame out of the pool either way.
    pub fn install_page(&mut self, segment: u32, page: u32, location: i32) -> Result<()> {
        check_segment(segment)?;
        if page as usize >= PT_SIZE {
            return Err(VmError::PageOutOfRange(page as usize));
        }
        let location = self.checked_location(location)?;

        if self.pm.segment_length(segment) == 0 {
            warn!("page {} installed for segment {} which has no length", page, segment);
        }

        match self.pm.segment_location(segment) {
            Location::Resident(pt_frame) => {
                trace!("PT[{}][{}] = {} (frame {})", segment, page, location, pt_frame);
                self.pm.set_page_entry(pt_frame, page, location);
            }
            Location::OnStore(block) => {
                trace!("PT[{}][{}] = {} (store block {})", segment, page, location, block);
                self.store.write(block, page as usize, location.to_cell());
            }
        }
        // Taken even when the page table is still on the store: it points
        // at the frame as soon as it is swapped in.
        if let Location::Resident(frame) = location {
            self.take_frame(frame);
        }
        Ok(())
    }

    /// Translate one raw virtual address.
    pub fn translate(&mut self, va: u32) -> Result<TranslationResult> {
        let va = VirtualAddress::from_raw(va);
        translation::translate(
            &va,
            &mut self.pm,
            &self.store,
            &mut self.free_frames,
            &mut self.stats,
        )
    }

    /// Translate a batch in order. Segmentation faults become `-1`; pool
    /// exhaustion stops the batch.
    pub fn translate_batch(&mut self, vas: &[u32]) -> Result<Vec<i64>> {
        vas.iter()
            .map(|&va| self.translate(va).map(|result| result.to_output()))
            .collect()
    }

    /// Every frame currently referenced by a resident segment or page table
    /// entry, leaving out the segment table frame. Segments with no length
    /// are not walked.
    pub fn resident_frames(&self) -> BTreeSet<usize> {
        let mut frames = BTreeSet::new();
        for segment in 0..MAX_SEGMENTS as u32 {
            if self.pm.segment_length(segment) <= 0 {
                continue;
            }
            let Location::Resident(pt_frame) = self.pm.segment_location(segment) else {
                continue;
            };
            if pt_frame == ST_FRAME {
                continue;
            }
            frames.insert(pt_frame);
            for page in 0..PT_SIZE as u32 {
                if let Location::Resident(frame) = self.pm.page_location(pt_frame, page) {
                    if frame != ST_FRAME {
                        frames.insert(frame);
                    }
                }
            }
        }
        frames
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.pm
    }

    pub fn store(&self) -> &SecondaryStore {
        &self.store
    }

    /// Direct access to the store, for seeding page contents.
    pub fn store_mut(&mut self) -> &mut SecondaryStore {
        &mut self.store
    }

    pub fn free_frames(&self) -> &FreeFrameList {
        &self.free_frames
    }

    pub fn stats(&self) -> &FaultStats {
        &self.stats
    }

    fn checked_location(&self, cell: i32) -> Result<Location> {
        let location = Location::from_cell(cell);
        let (kind, id) = match location {
            Location::Resident(frame) => (LocationKind::Frame, frame),
            Location::OnStore(block) => (LocationKind::Block, block),
        };
        if id >= self.config.frame_count {
            return Err(VmError::LocationOutOfRange {
                kind,
                id,
                limit: self.config.frame_count,
            });
        }
        Ok(location)
    }

    fn take_frame(&mut self, frame: usize) {
        if !self.free_frames.remove(frame) {
            debug!("frame {} already out of the free pool", frame);
        }
    }
}

fn check_segment(segment: u32) -> Result<()> {
    if segment as usize >= MAX_SEGMENTS {
        return Err(VmError::SegmentOutOfRange(segment as usize));
    }
    Ok(())
}
