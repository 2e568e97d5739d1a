//! Deterministic fault injection for testing
//!
//! This module lets tests force host primitives to fail with a chosen
//! [`HostError`], so the guest layer's translation of every host status can
//! be exercised without contriving the real failure condition.
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: faults fire on an exact call count, never at random
//! - **Composable**: several faults can target different primitives
//! - **Test-focused**: not intended for production use
//!
//! ## Example
//!
//! ```
//! use sim_host::fault_injection::{HostFault, HostFaultPlan, HostOp};
//! use host_api::HostError;
//!
//! let plan = HostFaultPlan::new()
//!     .with_fault(HostFault::FailNext { op: HostOp::SemRelease, error: HostError::Full })
//!     .with_fault(HostFault::FailAlways { op: HostOp::ThreadInit, error: HostError::NoMemory });
//! assert_eq!(plan.faults().len(), 2);
//! ```

use host_api::{HostError, HostResult};
use serde::{Deserialize, Serialize};

/// Host primitives that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostOp {
    SemInit,
    SemTake,
    SemRelease,
    MutexInit,
    MutexTake,
    MutexRelease,
    EventInit,
    EventSend,
    EventRecv,
    MqInit,
    MqSend,
    MqRecv,
    MqReset,
    TimerInit,
    TimerStart,
    TimerStop,
    ThreadInit,
    ThreadStartup,
    ThreadSuspend,
    ThreadResume,
    ThreadYield,
    ThreadDelay,
    ThreadSetPriority,
    Detach,
}

/// A fault to inject into a host primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFault {
    /// Fail the next call of `op` only
    FailNext { op: HostOp, error: HostError },

    /// Fail every call of `op`
    FailAlways { op: HostOp, error: HostError },

    /// Let `skip` calls of `op` through, then fail the next one
    FailAfter {
        op: HostOp,
        skip: usize,
        error: HostError,
    },
}

impl HostFault {
    fn op(&self) -> HostOp {
        match self {
            HostFault::FailNext { op, .. }
            | HostFault::FailAlways { op, .. }
            | HostFault::FailAfter { op, .. } => *op,
        }
    }
}

/// A plan describing all faults to inject
#[derive(Debug, Clone, Default)]
pub struct HostFaultPlan {
    faults: Vec<HostFault>,
}

impl HostFaultPlan {
    /// Creates a new empty fault plan
    pub fn new() -> Self {
        Self { faults: Vec::new() }
    }

    /// Adds a fault to the plan
    pub fn with_fault(mut self, fault: HostFault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Returns the planned faults
    pub fn faults(&self) -> &[HostFault] {
        &self.faults
    }
}

#[derive(Debug)]
struct ArmedFault {
    fault: HostFault,
    seen: usize,
    spent: bool,
}

/// Applies a [`HostFaultPlan`] to host primitive calls
#[derive(Debug)]
pub struct HostFaultInjector {
    armed: Vec<ArmedFault>,
    injected: usize,
}

impl HostFaultInjector {
    /// Creates an injector from a plan
    pub fn new(plan: HostFaultPlan) -> Self {
        let armed = plan
            .faults
            .into_iter()
            .map(|fault| ArmedFault {
                fault,
                seen: 0,
                spent: false,
            })
            .collect();
        Self { armed, injected: 0 }
    }

    /// Consults the plan for one call of `op`
    ///
    /// Returns the error to report instead of running the primitive, or
    /// `Ok(())` to let it run. The first matching live fault wins.
    pub fn check(&mut self, op: HostOp) -> HostResult<()> {
        for armed in self.armed.iter_mut().filter(|a| !a.spent && a.fault.op() == op) {
            armed.seen += 1;
            let fire = match armed.fault {
                HostFault::FailNext { error, .. } => {
                    armed.spent = true;
                    Some(error)
                }
                HostFault::FailAlways { error, .. } => Some(error),
                HostFault::FailAfter { skip, error, .. } => {
                    if armed.seen > skip {
                        armed.spent = true;
                        Some(error)
                    } else {
                        None
                    }
                }
            };
            if let Some(error) = fire {
                self.injected += 1;
                return Err(error);
            }
        }
        Ok(())
    }

    /// Number of faults injected so far
    pub fn injected_count(&self) -> usize {
        self.injected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_next_fires_once() {
        let plan = HostFaultPlan::new().with_fault(HostFault::FailNext {
            op: HostOp::SemTake,
            error: HostError::Busy,
        });
        let mut injector = HostFaultInjector::new(plan);

        assert_eq!(injector.check(HostOp::SemTake), Err(HostError::Busy));
        assert_eq!(injector.check(HostOp::SemTake), Ok(()));
        assert_eq!(injector.injected_count(), 1);
    }

    #[test]
    fn test_other_ops_unaffected() {
        let plan = HostFaultPlan::new().with_fault(HostFault::FailAlways {
            op: HostOp::MqSend,
            error: HostError::Io,
        });
        let mut injector = HostFaultInjector::new(plan);

        assert_eq!(injector.check(HostOp::MqRecv), Ok(()));
        assert_eq!(injector.check(HostOp::MqSend), Err(HostError::Io));
        assert_eq!(injector.check(HostOp::MqSend), Err(HostError::Io));
    }

    #[test]
    fn test_fail_after_skips() {
        let plan = HostFaultPlan::new().with_fault(HostFault::FailAfter {
            op: HostOp::ThreadInit,
            skip: 2,
            error: HostError::NoMemory,
        });
        let mut injector = HostFaultInjector::new(plan);

        assert_eq!(injector.check(HostOp::ThreadInit), Ok(()));
        assert_eq!(injector.check(HostOp::ThreadInit), Ok(()));
        assert_eq!(injector.check(HostOp::ThreadInit), Err(HostError::NoMemory));
        assert_eq!(injector.check(HostOp::ThreadInit), Ok(()));
    }

    #[test]
    fn test_empty_plan() {
        let mut injector = HostFaultInjector::new(HostFaultPlan::new());
        assert_eq!(injector.check(HostOp::Detach), Ok(()));
        assert_eq!(injector.injected_count(), 0);
    }
}
