//! Host error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of a host primitive
///
/// `Ok` is the host's `EOK`.
pub type HostResult<T> = Result<T, HostError>;

/// Errors reported by host primitives
///
/// The host reports failures as small negative integers. Each variant keeps
/// its raw code so that callers holding a raw status can recover it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum HostError {
    /// Generic failure
    #[error("host error")]
    Error,

    /// Timed out (also returned for a zero-timeout take that would block)
    #[error("host operation timed out")]
    TimedOut,

    /// Resource is full
    #[error("host resource is full")]
    Full,

    /// Resource is empty
    #[error("host resource is empty")]
    Empty,

    /// Out of memory
    #[error("host is out of memory")]
    NoMemory,

    /// Operation not supported by the host
    #[error("operation not supported by host")]
    NoSystem,

    /// Host is busy
    #[error("host is busy")]
    Busy,

    /// I/O failure
    #[error("host i/o error")]
    Io,

    /// Interrupted system call
    #[error("host call interrupted")]
    Interrupted,

    /// Invalid argument
    #[error("invalid argument passed to host")]
    InvalidArgument,
}

impl HostError {
    /// Returns the raw (negative) host status code
    pub const fn code(self) -> i32 {
        match self {
            HostError::Error => -1,
            HostError::TimedOut => -2,
            HostError::Full => -3,
            HostError::Empty => -4,
            HostError::NoMemory => -5,
            HostError::NoSystem => -6,
            HostError::Busy => -7,
            HostError::Io => -8,
            HostError::Interrupted => -9,
            HostError::InvalidArgument => -10,
        }
    }

    /// Decodes a raw host status
    ///
    /// Returns `Ok(())` for `0`, the matching error for a known negative
    /// code, and `None` for anything the host never produces.
    pub const fn from_code(code: i32) -> Option<HostResult<()>> {
        let err = match code {
            0 => return Some(Ok(())),
            -1 => HostError::Error,
            -2 => HostError::TimedOut,
            -3 => HostError::Full,
            -4 => HostError::Empty,
            -5 => HostError::NoMemory,
            -6 => HostError::NoSystem,
            -7 => HostError::Busy,
            -8 => HostError::Io,
            -9 => HostError::Interrupted,
            -10 => HostError::InvalidArgument,
            _ => return None,
        };
        Some(Err(err))
    }
}
