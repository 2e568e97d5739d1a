//! Timeout reconciliation
//!
//! The guest says "wait forever" with a timeout of 0 and "don't wait" with
//! a separate option bit. The host folds both into the timeout value:
//! 0 is "don't wait" and a sentinel is "forever". [`WaitPolicy`] is built
//! once from the guest pair and converted once into the host encoding.

use crate::opt::PendMode;
use crate::types::OsTick;
use host_api::HostTimeout;
use std::num::NonZeroU32;

/// How long a pend may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Until the resource is available
    Forever,
    /// Not at all
    Immediate,
    /// At most this many ticks
    Bounded(NonZeroU32),
}

impl WaitPolicy {
    /// Builds the policy from a guest timeout and blocking mode
    ///
    /// Non-blocking ignores the numeric timeout; blocking with 0 is forever.
    pub fn from_guest(timeout: OsTick, mode: PendMode) -> Self {
        match mode {
            PendMode::NonBlocking => WaitPolicy::Immediate,
            PendMode::Blocking => match NonZeroU32::new(timeout) {
                None => WaitPolicy::Forever,
                Some(ticks) => WaitPolicy::Bounded(ticks),
            },
        }
    }

    /// Host encoding of this policy
    pub fn to_host(self) -> HostTimeout {
        match self {
            WaitPolicy::Forever => HostTimeout::FOREVER,
            WaitPolicy::Immediate => HostTimeout::IMMEDIATE,
            WaitPolicy::Bounded(ticks) => HostTimeout::ticks(ticks.get()),
        }
    }
}

/// Guest timeout and blocking mode straight to the host encoding
pub fn translate_timeout(timeout: OsTick, mode: PendMode) -> HostTimeout {
    WaitPolicy::from_guest(timeout, mode).to_host()
}
