//! Tick and timeout encodings of the host

use serde::{Deserialize, Serialize};

/// Host tick counter value
pub type Tick = u32;

/// A timeout in the host's encoding
///
/// The host folds "don't block" and "wait forever" into the timeout value
/// itself: `0` means return immediately, `-1` means wait forever, any
/// positive value is a bound in ticks. Construct it with the associated
/// constants or [`HostTimeout::ticks`]; the raw value is only exposed for
/// bindings that pass it straight to a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostTimeout(i32);

impl HostTimeout {
    /// Wait until the resource becomes available
    pub const FOREVER: HostTimeout = HostTimeout(-1);

    /// Do not block
    pub const IMMEDIATE: HostTimeout = HostTimeout(0);

    /// A bounded wait of `ticks`
    ///
    /// `0` yields [`HostTimeout::IMMEDIATE`]. Values beyond the host's
    /// signed range saturate to the longest bounded wait instead of wrapping
    /// into the forever sentinel.
    pub const fn ticks(ticks: Tick) -> Self {
        if ticks > i32::MAX as u32 {
            HostTimeout(i32::MAX)
        } else {
            HostTimeout(ticks as i32)
        }
    }

    /// Returns the raw host value
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns whether this is the forever sentinel
    pub const fn is_forever(self) -> bool {
        self.0 < 0
    }

    /// Returns whether this is the no-wait sentinel
    pub const fn is_immediate(self) -> bool {
        self.0 == 0
    }

    /// Returns the bound in ticks, `None` for forever
    pub const fn bound(self) -> Option<Tick> {
        if self.0 < 0 {
            None
        } else {
            Some(self.0 as Tick)
        }
    }
}
