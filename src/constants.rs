pub const S_BITS: u32 = 9;
pub const P_BITS: u32 = 9;
pub const W_BITS: u32 = 9;

pub const PT_SIZE: usize = 1 << P_BITS;
pub const MAX_SEGMENTS: usize = 1 << S_BITS;
pub const ST_SIZE: usize = MAX_SEGMENTS * 2;

// Defaults; the live values come from `VmConfig`.
pub const DEFAULT_FRAME_SIZE: usize = 1 << W_BITS;
pub const DEFAULT_NUM_FRAMES: usize = 1024;

/// Frame 0 holds the segment table and is never handed out.
pub const ST_FRAME: usize = 0;

pub const S_MASK: u32 = (1 << S_BITS) - 1;
pub const W_MASK: u32 = (1 << W_BITS) - 1;
pub const P_MASK: u32 = (1 << P_BITS) - 1;
pub const PW_MASK: u32 = (1 << (P_BITS + W_BITS)) - 1;

pub const P_SHIFT: u32 = W_BITS;
pub const S_SHIFT: u32 = P_BITS + W_BITS;

pub const INVALID_ADDRESS: i64 = -1;

pub const DEFAULT_OUTPUT_FILE: &str = "output-dp.txt";
