//! Host object identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a host kernel object
///
/// Handles are issued by the host when an object is initialised and stay
/// meaningful until it is detached. A stale handle simply stops resolving
/// to an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostHandle(u32);

impl HostHandle {
    /// Creates a handle from its raw value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

/// The kind of a live host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    Thread,
    Semaphore,
    Mutex,
    Event,
    MessageQueue,
    Timer,
}

impl ObjectClass {
    /// Short lowercase name, for logs
    pub const fn name(&self) -> &'static str {
        match self {
            ObjectClass::Thread => "thread",
            ObjectClass::Semaphore => "semaphore",
            ObjectClass::Mutex => "mutex",
            ObjectClass::Event => "event",
            ObjectClass::MessageQueue => "message queue",
            ObjectClass::Timer => "timer",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
