//! Host software timers

use serde::{Deserialize, Serialize};

/// Host timer callback
///
/// The host invokes it with the single parameter supplied at
/// initialisation and nothing else.
pub type TimerCallback = Box<dyn FnMut(usize) + Send>;

/// Whether a timer re-arms itself after expiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerMode {
    OneShot,
    Periodic,
}
