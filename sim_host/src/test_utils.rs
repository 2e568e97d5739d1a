//! Test utilities for guest-layer testing
//!
//! Helpers that set up a simulated host in a particular context or drive it
//! through time, so tests read as scenarios.

use crate::fault_injection::HostFaultPlan;
use crate::SimulatedHost;
use host_api::{ExecutionContext, HostKernel, StackWord, Tick};

/// Runs a test with a fault plan applied
///
/// # Example
///
/// ```
/// use sim_host::test_utils::with_fault_plan;
/// use sim_host::fault_injection::{HostFault, HostFaultPlan, HostOp};
/// use host_api::HostError;
///
/// with_fault_plan(
///     HostFaultPlan::new().with_fault(HostFault::FailNext {
///         op: HostOp::SemInit,
///         error: HostError::NoMemory,
///     }),
///     |host| {
///         assert!(host.is_idle());
///     },
/// );
/// ```
pub fn with_fault_plan<F>(plan: HostFaultPlan, f: F)
where
    F: FnOnce(&mut SimulatedHost),
{
    let mut host = SimulatedHost::new().with_fault_plan(plan);
    f(&mut host);
}

/// Runs `f` as if inside an interrupt service routine
///
/// The nesting level is restored afterwards, whatever `f` did to it.
pub fn in_isr<T>(host: &mut SimulatedHost, f: impl FnOnce(&mut SimulatedHost) -> T) -> T {
    let nest = host.interrupt_nest();
    host.interrupt_enter();
    let out = f(host);
    while host.interrupt_nest() > nest {
        host.interrupt_leave();
    }
    out
}

/// Runs `f` with the scheduler locked once more than it is now
pub fn with_sched_locked<T>(
    host: &mut SimulatedHost,
    f: impl FnOnce(&mut SimulatedHost) -> T,
) -> T {
    let level = host.critical_level();
    host.enter_critical();
    let out = f(host);
    while host.critical_level() > level {
        host.exit_critical();
    }
    out
}

/// Advances time until every scheduled event has been delivered
///
/// Stops after `max_ticks` regardless.
pub fn advance_until_idle(host: &mut SimulatedHost, max_ticks: Tick) {
    let mut spent = 0;
    while !host.is_idle() && spent < max_ticks {
        host.advance_ticks(1);
        spent += 1;
    }
}

/// Leaks a zeroed stack region, as task stacks must outlive the test body
pub fn leak_stack(words: usize) -> &'static mut [StackWord] {
    Box::leak(vec![0; words].into_boxed_slice())
}
