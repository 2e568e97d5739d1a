//! Scheduler control, interrupt bookkeeping and version
//!
//! The guest scheduler lock maps onto the host critical-section depth, so
//! N locks need exactly N unlocks on either side.

use crate::error::{OsErr, OsResult};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::HostKernel;

impl<H: HostKernel> Os<H> {
    /// `OSSchedLock`
    pub fn sched_lock(&mut self, err: &mut OsErr) {
        settle(err, self.try_sched_lock())
    }

    fn try_sched_lock(&mut self) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::SchedLockIsr)?;
        if self.host.critical_level() >= u16::from(OsNestingCtr::MAX) {
            return Err(OsErr::LockNestingOvf);
        }
        self.host.enter_critical();
        Ok(())
    }

    /// `OSSchedUnlock`
    ///
    /// Reports `SCHED_LOCKED` while outer locks remain.
    pub fn sched_unlock(&mut self, err: &mut OsErr) {
        settle(err, self.try_sched_unlock())
    }

    fn try_sched_unlock(&mut self) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::SchedUnlockIsr)?;
        if !guard::sched_locked(&self.host) {
            return Err(OsErr::SchedNotLocked);
        }
        self.host.exit_critical();
        guard::not_locked(&self.host)
    }

    /// `OSSchedRoundRobinCfg`
    ///
    /// Round robin is always on in the host; the request is accepted and
    /// has no effect.
    pub fn sched_round_robin_cfg(&mut self, en: bool, dflt_time_quanta: OsTick, err: &mut OsErr) {
        log::debug!(
            "OSSchedRoundRobinCfg: enable={} quanta={} ignored",
            en,
            dflt_time_quanta
        );
        *err = OsErr::None;
    }

    /// `OSSchedRoundRobinYield`
    pub fn sched_round_robin_yield(&mut self, err: &mut OsErr) {
        settle(err, self.try_sched_round_robin_yield())
    }

    fn try_sched_round_robin_yield(&mut self) -> OsResult<()> {
        guard::may_block(&self.host, OsErr::YieldIsr)?;
        self.host.thread_yield()?;
        Ok(())
    }

    /// `OSSched`
    ///
    /// No-op from an ISR or with the scheduler locked.
    pub fn sched(&mut self) {
        if !guard::in_isr(&self.host) && !guard::sched_locked(&self.host) {
            self.host.schedule();
        }
    }

    /// `OSIntEnter`
    pub fn int_enter(&mut self) {
        self.host.interrupt_enter();
    }

    /// `OSIntExit`
    pub fn int_exit(&mut self) {
        self.host.interrupt_leave();
    }

    /// `OSVersion`: the host kernel's version number
    pub fn version(&self, err: &mut OsErr) -> u32 {
        *err = OsErr::None;
        self.host.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_api::ExecutionContext;
    use sim_host::fault_injection::HostOp;
    use sim_host::SimulatedHost;

    #[test]
    fn test_unlock_without_lock() {
        let mut os = Os::new(SimulatedHost::new());
        let mut err = OsErr::None;

        os.sched_unlock(&mut err);
        assert_eq!(err, OsErr::SchedNotLocked);
    }

    #[test]
    fn test_nested_locks() {
        let mut os = Os::new(SimulatedHost::new());
        let mut err = OsErr::None;

        os.sched_lock(&mut err);
        os.sched_lock(&mut err);
        assert_eq!(err, OsErr::None);
        assert_eq!(os.host().critical_level(), 2);

        os.sched_unlock(&mut err);
        assert_eq!(err, OsErr::SchedLocked);
        os.sched_unlock(&mut err);
        assert_eq!(err, OsErr::None);
        os.sched_unlock(&mut err);
        assert_eq!(err, OsErr::SchedNotLocked);
    }

    #[test]
    fn test_lock_overflow() {
        let mut os = Os::new(SimulatedHost::new());
        let mut err = OsErr::None;

        for _ in 0..OsNestingCtr::MAX {
            os.sched_lock(&mut err);
        }
        assert_eq!(err, OsErr::None);
        os.sched_lock(&mut err);
        assert_eq!(err, OsErr::LockNestingOvf);
        assert_eq!(os.host().critical_level(), 255);
    }

    #[test]
    fn test_isr_context() {
        let mut os = Os::new(SimulatedHost::new());
        let mut err = OsErr::None;

        os.int_enter();
        os.sched_lock(&mut err);
        assert_eq!(err, OsErr::SchedLockIsr);
        os.sched_unlock(&mut err);
        assert_eq!(err, OsErr::SchedUnlockIsr);
        os.sched_round_robin_yield(&mut err);
        assert_eq!(err, OsErr::YieldIsr);
        os.int_exit();
        assert_eq!(os.host().interrupt_nest(), 0);
    }

    #[test]
    fn test_yield() {
        let mut os = Os::new(SimulatedHost::new());
        let mut err = OsErr::None;

        os.sched_round_robin_yield(&mut err);
        assert_eq!(err, OsErr::None);
        assert!(os.host().audit_log().has_op(HostOp::ThreadYield));

        os.sched_lock(&mut err);
        os.sched_round_robin_yield(&mut err);
        assert_eq!(err, OsErr::SchedLocked);
    }

    #[test]
    fn test_round_robin_cfg_and_version() {
        let mut os = Os::new(SimulatedHost::new().with_version(30103));
        let mut err = OsErr::Timeout;

        os.sched_round_robin_cfg(true, 5, &mut err);
        assert_eq!(err, OsErr::None);

        err = OsErr::Timeout;
        assert_eq!(os.version(&mut err), 30103);
        assert_eq!(err, OsErr::None);
        os.sched();
    }
}
