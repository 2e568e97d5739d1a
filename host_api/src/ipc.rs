//! IPC object options

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Wake-up order for tasks pending on an IPC object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpcFlag {
    /// Waiters are woken in arrival order
    Fifo,
    /// The highest-priority waiter is woken first
    Priority,
}

bitflags! {
    /// Receive options for host events
    ///
    /// Exactly one of `AND` / `OR` must be set; `CLEAR` may be added to
    /// clear the matched bits on a successful receive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventOption: u8 {
        /// All requested bits must be set
        const AND = 0x01;
        /// Any requested bit suffices
        const OR = 0x02;
        /// Clear the requested bits once satisfied
        const CLEAR = 0x04;
    }
}

impl EventOption {
    /// Returns whether the combination is one the host accepts
    pub fn is_well_formed(&self) -> bool {
        self.contains(EventOption::AND) != self.contains(EventOption::OR)
    }
}
