use std::collections::VecDeque;

use crate::constants::ST_FRAME;
use crate::error::{Result, VmError};

/// Tracks which frames are available for allocation.
///
/// Frames are handed out in insertion order, which after `new` is ascending
/// id order starting at 1. Frame 0 holds the segment table and is never
/// pooled.
#[derive(Debug, Clone)]
pub struct FreeFrameList {
    free: VecDeque<usize>,
}

impl FreeFrameList {
    pub fn new(frame_count: usize) -> Self {
        FreeFrameList {
            free: (ST_FRAME + 1..frame_count).collect(),
        }
    }

    /// Take the head of the pool.
    pub fn allocate(&mut self) -> Result<usize> {
        self.free.pop_front().ok_or(VmError::PoolExhausted)
    }

    /// Return a frame to the back of the pool.
    pub fn release(&mut self, frame: usize) {
        debug_assert!(!self.contains(frame), "frame {} released twice", frame);
        self.free.push_back(frame);
    }

    /// Excise a frame wherever it sits in the pool. Returns whether it was
    /// present; removing an absent frame is a no-op.
    pub fn remove(&mut self, frame: usize) -> bool {
        match self.free.iter().position(|&f| f == frame) {
            Some(index) => {
                self.free.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, frame: usize) -> bool {
        self.free.contains(&frame)
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Free frames in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.free.iter().copied()
    }
}
