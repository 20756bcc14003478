use crate::constants::*;
use crate::error::{Result, VmError};

/// Geometry of the simulated physical memory and secondary store.
///
/// Both hold `frame_count * frame_size` cells; a store block is the same
/// size as a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub frame_size: usize,
    pub frame_count: usize,
}

impl VmConfig {
    pub fn new(frame_size: usize, frame_count: usize) -> Result<Self> {
        let config = VmConfig {
            frame_size,
            frame_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the 9-bit page and offset fields always land inside a
    /// frame and that every physical address fits in a memory cell.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_size.is_power_of_two() || self.frame_size < DEFAULT_FRAME_SIZE {
            return Err(VmError::Config(format!(
                "frame size {} must be a power of two of at least {}",
                self.frame_size, DEFAULT_FRAME_SIZE
            )));
        }
        if self.frame_count < 2 {
            return Err(VmError::Config(format!(
                "frame count {} leaves no allocatable frame",
                self.frame_count
            )));
        }
        match self.frame_size.checked_mul(self.frame_count) {
            Some(total) if total <= i32::MAX as usize => Ok(()),
            _ => Err(VmError::Config(format!(
                "{} frames of {} cells exceed the addressable range",
                self.frame_count, self.frame_size
            ))),
        }
    }

    /// Total number of cells in physical memory (and in the store).
    #[inline]
    pub fn memory_size(&self) -> usize {
        self.frame_size * self.frame_count
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            frame_size: DEFAULT_FRAME_SIZE,
            frame_count: DEFAULT_NUM_FRAMES,
        }
    }
}
