pub mod config;
pub mod constants;
pub mod error;
pub mod frames;
pub mod io;
pub mod memory;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use config::VmConfig;
pub use constants::*;
pub use error::{Result, VmError};
pub use frames::FreeFrameList;
pub use memory::Location;
pub use translation::{FaultStats, TranslationResult, VirtualAddress};
pub use vm_manager::VmManager;
