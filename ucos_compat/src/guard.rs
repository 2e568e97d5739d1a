//! Context guards
//!
//! Checks on the caller's execution context that run before anything else
//! in an operation. A failing guard leaves every object untouched.

use crate::error::{OsErr, OsResult};
use host_api::ExecutionContext;

/// Whether the caller runs inside an interrupt service routine
pub fn in_isr<C: ExecutionContext + ?Sized>(ctx: &C) -> bool {
    ctx.interrupt_nest() > 0
}

/// Whether the scheduler is locked
pub fn sched_locked<C: ExecutionContext + ?Sized>(ctx: &C) -> bool {
    ctx.critical_level() > 0
}

/// Fails with `err` from interrupt context
pub fn not_in_isr<C: ExecutionContext + ?Sized>(ctx: &C, err: OsErr) -> OsResult<()> {
    if in_isr(ctx) {
        Err(err)
    } else {
        Ok(())
    }
}

/// Fails with `SCHED_LOCKED` while the scheduler is locked
pub fn not_locked<C: ExecutionContext + ?Sized>(ctx: &C) -> OsResult<()> {
    if sched_locked(ctx) {
        Err(OsErr::SchedLocked)
    } else {
        Ok(())
    }
}

/// Guards for an operation that may block: not from an ISR, not locked
pub fn may_block<C: ExecutionContext + ?Sized>(ctx: &C, isr_err: OsErr) -> OsResult<()> {
    not_in_isr(ctx, isr_err)?;
    not_locked(ctx)
}
