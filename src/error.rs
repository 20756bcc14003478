//! Error type shared by the bootstrapper, the translator and the batch I/O.

use std::fmt;
use std::io;

/// What a seed location refers to, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Frame,
    Block,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Frame => write!(f, "frame"),
            LocationKind::Block => write!(f, "block"),
        }
    }
}

/// Errors raised by the VM manager.
///
/// A segment bound violation is not an error: it is reported per address as
/// [`TranslationResult::SegmentationFault`](crate::TranslationResult) and the
/// batch keeps going.
#[derive(Debug)]
pub enum VmError {
    /// A fault needed a frame and the free-frame pool was empty.
    PoolExhausted,
    /// A seed entry names a frame or block id outside the simulated memory.
    LocationOutOfRange {
        kind: LocationKind,
        id: usize,
        limit: usize,
    },
    /// Segment number does not fit the 9-bit segment field.
    SegmentOutOfRange(usize),
    /// Page number does not fit the 9-bit page field.
    PageOutOfRange(usize),
    /// Malformed seed or query text.
    Parse { line: usize, message: String },
    /// Invalid memory geometry.
    Config(String),
    /// Reading or writing a seed, query or output file.
    Io(io::Error),
}

impl VmError {
    /// Fatal errors abort the whole batch instead of a single address.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VmError::PoolExhausted)
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        VmError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::PoolExhausted => write!(f, "Free frame pool exhausted"),
            VmError::LocationOutOfRange { kind, id, limit } => {
                write!(f, "{} {} out of range (limit {})", kind, id, limit)
            }
            VmError::SegmentOutOfRange(s) => write!(f, "Segment number {} out of range", s),
            VmError::PageOutOfRange(p) => write!(f, "Page number {} out of range", p),
            VmError::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
            VmError::Config(msg) => write!(f, "Configuration error: {}", msg),
            VmError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for VmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VmError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for VmError {
    fn from(err: io::Error) -> Self {
        VmError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pool_exhaustion_is_fatal() {
        assert!(VmError::PoolExhausted.is_fatal());
        assert!(!VmError::SegmentOutOfRange(600).is_fatal());
        assert!(!VmError::parse(2, "bad token").is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = VmError::LocationOutOfRange {
            kind: LocationKind::Block,
            id: 2000,
            limit: 1024,
        };
        assert_eq!(err.to_string(), "block 2000 out of range (limit 1024)");
        assert_eq!(
            VmError::parse(1, "truncated triplet").to_string(),
            "Parse error on line 1: truncated triplet"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        let err: VmError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
