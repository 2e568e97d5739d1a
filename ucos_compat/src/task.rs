//! Tasks
//!
//! A guest task is a host thread. Operations that name a task accept `None`
//! for "the calling task", as the guest API does with a null TCB pointer.

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, Identity, ObjectCell};
use crate::opt::{rejected, TaskOpt};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::{HostError, HostHandle, HostKernel, ObjectClass, ThreadConfig};
use serde::{Deserialize, Serialize};

/// Guest task control block storage
#[derive(Debug, Default)]
pub struct OsTcb {
    cell: ObjectCell,
}

impl OsTcb {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
        }
    }
}

guest_object!(OsTcb, ObjectClass::Thread);

/// Parameters of `task_create`
///
/// `stk_limit` and `q_size` are accepted for source compatibility and
/// ignored: the host has no stack watermark and no per-task queue.
#[derive(Debug, Default)]
pub struct TaskParams<'a> {
    pub name: Option<&'a str>,
    pub entry: Option<OsTaskPtr>,
    pub arg: usize,
    pub prio: OsPrio,
    pub stk_base: Option<&'static mut [CpuStk]>,
    pub stk_limit: CpuStkSize,
    pub stk_size: CpuStkSize,
    pub q_size: OsMsgQty,
    pub time_quanta: OsTick,
    pub opt: OsOpt,
}

/// Stack usage in words, as reported by `task_stk_chk`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStackUsage {
    pub free: CpuStkSize,
    pub used: CpuStkSize,
    /// High-water mark
    pub used_max: CpuStkSize,
}

fn words(n: usize) -> CpuStkSize {
    CpuStkSize::try_from(n).unwrap_or(CpuStkSize::MAX)
}

impl<H: HostKernel> Os<H> {
    /// `OSTaskCreate`
    ///
    /// The task is started right away. Only the first `stk_size` words of
    /// `stk_base` are handed to the host.
    pub fn task_create(
        &mut self,
        tcb: Option<&mut OsTcb>,
        params: TaskParams<'_>,
        err: &mut OsErr,
    ) {
        settle(err, self.try_task_create(tcb, params))
    }

    fn try_task_create(&mut self, tcb: Option<&mut OsTcb>, params: TaskParams<'_>) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TaskCreateIsr)?;
        let tcb = tcb.ok_or(OsErr::TcbInvalid)?;
        let name = params.name.ok_or(OsErr::Name)?;
        let entry = params.entry.ok_or(OsErr::TaskInvalid)?;
        self.vacant(&*tcb)?;
        self.check_prio(params.prio)?;
        let base = params.stk_base.ok_or(OsErr::StkInvalid)?;
        let size = usize::try_from(params.stk_size).unwrap_or(usize::MAX);
        if params.stk_size < self.config.stk_size_min || size > base.len() {
            return Err(OsErr::StkSizeInvalid);
        }
        let opt = TaskOpt::from_bits(params.opt)
            .ok_or_else(|| rejected("OSTaskCreate", params.opt))?;
        if params.stk_limit != 0 || params.q_size != 0 {
            log::debug!(
                "OSTaskCreate: stk_limit {} and q_size {} ignored",
                params.stk_limit,
                params.q_size
            );
        }
        log::trace!("OSTaskCreate: {} prio {} opt {:?}", name, params.prio, opt);

        let handle = self.host.thread_init(ThreadConfig {
            name: name.to_string(),
            entry,
            parameter: params.arg,
            stack: &mut base[..size],
            priority: params.prio,
            time_slice: self.quanta(params.time_quanta),
        })?;
        if let Err(e) = self.host.thread_startup(handle) {
            if let Err(detach) = self.host.thread_detach(handle) {
                log::warn!("OSTaskCreate: rollback of thread {} failed: {}", handle, detach);
            }
            return Err(e.into());
        }
        tcb.cell.bind(handle);
        Ok(())
    }

    /// `OSTaskDel`
    pub fn task_del(&mut self, tcb: Option<&mut OsTcb>, err: &mut OsErr) {
        settle(err, self.try_task_del(tcb))
    }

    fn try_task_del(&mut self, tcb: Option<&mut OsTcb>) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TaskDelIsr)?;
        let handle = self.task_target(tcb.as_deref())?;
        self.host.thread_detach(handle)?;
        if let Some(tcb) = tcb {
            tcb.cell.clear();
        }
        Ok(())
    }

    /// `OSTaskSuspend`
    pub fn task_suspend(&mut self, tcb: Option<&OsTcb>, err: &mut OsErr) {
        settle(err, self.try_task_suspend(tcb))
    }

    fn try_task_suspend(&mut self, tcb: Option<&OsTcb>) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TaskSuspendIsr)?;
        let handle = self.task_target(tcb)?;
        if self.is_caller(handle) {
            guard::not_locked(&self.host)?;
        }
        self.host.thread_suspend(handle)?;
        Ok(())
    }

    /// `OSTaskResume`
    pub fn task_resume(&mut self, tcb: Option<&OsTcb>, err: &mut OsErr) {
        settle(err, self.try_task_resume(tcb))
    }

    fn try_task_resume(&mut self, tcb: Option<&OsTcb>) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TaskResumeIsr)?;
        let handle = self.task_target(tcb)?;
        if tcb.is_none() || self.is_caller(handle) {
            return Err(OsErr::TaskResumeSelf);
        }
        match self.host.thread_resume(handle) {
            Ok(()) => Ok(()),
            Err(HostError::Error) => Err(OsErr::TaskNotSuspended),
            Err(e) => Err(e.into()),
        }
    }

    /// `OSTaskChangePrio`
    pub fn task_change_prio(&mut self, tcb: Option<&OsTcb>, prio: OsPrio, err: &mut OsErr) {
        settle(err, self.try_task_change_prio(tcb, prio))
    }

    fn try_task_change_prio(&mut self, tcb: Option<&OsTcb>, prio: OsPrio) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TaskChangePrioIsr)?;
        let handle = self.task_target(tcb)?;
        self.check_prio(prio)?;
        self.host.thread_set_priority(handle, prio)?;
        Ok(())
    }

    /// `OSTaskTimeQuantaSet`
    ///
    /// A quantum of 0 selects the default.
    pub fn task_time_quanta_set(
        &mut self,
        tcb: Option<&OsTcb>,
        time_quanta: OsTick,
        err: &mut OsErr,
    ) {
        settle(err, self.try_task_time_quanta_set(tcb, time_quanta))
    }

    fn try_task_time_quanta_set(
        &mut self,
        tcb: Option<&OsTcb>,
        time_quanta: OsTick,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::SetIsr)?;
        let handle = self.task_target(tcb)?;
        let ticks = self.quanta(time_quanta);
        self.host.thread_set_time_slice(handle, ticks)?;
        Ok(())
    }

    /// `OSTaskStkChk`
    pub fn task_stk_chk(&mut self, tcb: Option<&OsTcb>, err: &mut OsErr) -> TaskStackUsage {
        settle(err, self.try_task_stk_chk(tcb))
    }

    fn try_task_stk_chk(&self, tcb: Option<&OsTcb>) -> OsResult<TaskStackUsage> {
        guard::not_in_isr(&self.host, OsErr::TaskStkChkIsr)?;
        let handle = self.task_target(tcb)?;
        let usage = self.host.thread_stack_usage(handle)?;
        Ok(TaskStackUsage {
            free: words(usage.free()),
            used: words(usage.used),
            used_max: words(usage.max_used),
        })
    }

    /// Thread named by `tcb`, or the caller's own thread
    fn task_target(&self, tcb: Option<&OsTcb>) -> OsResult<HostHandle> {
        let Some(tcb) = tcb else {
            return self.host.thread_self().ok_or(OsErr::TaskNotExist);
        };
        match Identity::resolve(&self.host, Some(&tcb.cell), ObjectClass::Thread) {
            Identity::Live(handle) => Ok(handle),
            Identity::Other(..) => Err(OsErr::ObjType),
            Identity::Null | Identity::Vacant => Err(OsErr::TaskNotExist),
        }
    }

    fn is_caller(&self, thread: HostHandle) -> bool {
        self.host.thread_self() == Some(thread)
    }

    /// The lowest guest priority belongs to the idle task
    fn check_prio(&self, prio: OsPrio) -> OsResult<()> {
        if prio >= self.config.prio_max - 1 || prio >= self.host.max_priority() {
            Err(OsErr::PrioInvalid)
        } else {
            Ok(())
        }
    }

    fn quanta(&self, requested: OsTick) -> OsTick {
        match (requested, self.config.default_time_quanta) {
            (0, 0) => (self.host.tick_per_second() / 10).max(1),
            (0, default) => default,
            (ticks, _) => ticks,
        }
    }
}
