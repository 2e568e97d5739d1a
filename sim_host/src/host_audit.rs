//! Host Call Audit Trail
//!
//! Records every state-changing host primitive the simulated host executes,
//! in order, with the tick it ran at.
//!
//! ## Philosophy
//!
//! - Test-only: this is NOT production logging, it's for test verification
//! - Deterministic: calls are recorded in order for reproducible tests
//! - Queryable: tests assert on the trail to prove that a rejected guest
//!   call never reached the host, or which timeout encoding it passed down
//!
//! ## Example
//!
//! ```
//! use sim_host::host_audit::{HostAuditLog, HostCall};
//! use sim_host::fault_injection::HostOp;
//! use host_api::{HostHandle, HostTimeout};
//!
//! let mut audit_log = HostAuditLog::new();
//! audit_log.record(
//!     5,
//!     HostCall::with_timeout(HostOp::SemTake, HostHandle::from_raw(1), HostTimeout::FOREVER),
//! );
//!
//! assert_eq!(audit_log.count_op(HostOp::SemTake), 1);
//! assert_eq!(audit_log.timeouts_for(HostOp::SemTake), vec![HostTimeout::FOREVER]);
//! ```

use crate::fault_injection::HostOp;
use host_api::{HostHandle, HostTimeout, Tick};

/// One host primitive invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCall {
    /// Which primitive ran
    pub op: HostOp,
    /// Target object, if the primitive has one
    pub handle: Option<HostHandle>,
    /// Timeout passed, for blocking primitives
    pub timeout: Option<HostTimeout>,
}

impl HostCall {
    /// A call with no target object
    pub fn new(op: HostOp) -> Self {
        Self {
            op,
            handle: None,
            timeout: None,
        }
    }

    /// A call on `handle`
    pub fn on(op: HostOp, handle: HostHandle) -> Self {
        Self {
            op,
            handle: Some(handle),
            timeout: None,
        }
    }

    /// A blocking call on `handle`
    pub fn with_timeout(op: HostOp, handle: HostHandle, timeout: HostTimeout) -> Self {
        Self {
            op,
            handle: Some(handle),
            timeout: Some(timeout),
        }
    }
}

/// A recorded call with timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostAuditEvent {
    /// Simulated tick when the call started
    pub tick: Tick,
    /// The call
    pub call: HostCall,
}

/// Audit log of host primitive calls
#[derive(Debug, Default)]
pub struct HostAuditLog {
    events: Vec<HostAuditEvent>,
}

impl HostAuditLog {
    /// Creates a new empty audit log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Records a call at the specified tick
    pub fn record(&mut self, tick: Tick, call: HostCall) {
        self.events.push(HostAuditEvent { tick, call });
    }

    /// Returns all recorded calls
    pub fn get_events(&self) -> &[HostAuditEvent] {
        &self.events
    }

    /// Returns calls targeting a specific handle
    pub fn get_events_for(&self, handle: HostHandle) -> Vec<&HostAuditEvent> {
        self.events
            .iter()
            .filter(|e| e.call.handle == Some(handle))
            .collect()
    }

    /// Counts calls of one primitive
    pub fn count_op(&self, op: HostOp) -> usize {
        self.events.iter().filter(|e| e.call.op == op).count()
    }

    /// Returns whether any call of `op` was recorded
    pub fn has_op(&self, op: HostOp) -> bool {
        self.events.iter().any(|e| e.call.op == op)
    }

    /// Timeouts passed to `op`, in call order
    pub fn timeouts_for(&self, op: HostOp) -> Vec<HostTimeout> {
        self.events
            .iter()
            .filter(|e| e.call.op == op)
            .filter_map(|e| e.call.timeout)
            .collect()
    }

    /// Clears all recorded calls
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the number of recorded calls
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(raw: u32) -> HostHandle {
        HostHandle::from_raw(raw)
    }

    #[test]
    fn test_empty_log() {
        let log = HostAuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(!log.has_op(HostOp::SemTake));
    }

    #[test]
    fn test_record_and_query() {
        let mut log = HostAuditLog::new();
        log.record(0, HostCall::on(HostOp::SemInit, h(1)));
        log.record(1, HostCall::with_timeout(HostOp::SemTake, h(1), HostTimeout::IMMEDIATE));
        log.record(2, HostCall::on(HostOp::SemRelease, h(2)));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_op(HostOp::SemTake), 1);
        assert_eq!(log.get_events_for(h(1)).len(), 2);
        assert_eq!(log.get_events()[1].tick, 1);
    }

    #[test]
    fn test_timeouts_in_order() {
        let mut log = HostAuditLog::new();
        log.record(0, HostCall::with_timeout(HostOp::MqRecv, h(3), HostTimeout::FOREVER));
        log.record(0, HostCall::with_timeout(HostOp::MqRecv, h(3), HostTimeout::ticks(9)));

        assert_eq!(
            log.timeouts_for(HostOp::MqRecv),
            vec![HostTimeout::FOREVER, HostTimeout::ticks(9)]
        );
    }

    #[test]
    fn test_clear() {
        let mut log = HostAuditLog::new();
        log.record(0, HostCall::new(HostOp::ThreadYield));
        log.clear();
        assert!(log.is_empty());
    }
}
