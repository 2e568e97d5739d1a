//! Counting semaphores

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, ObjectCell};
use crate::opt::{rejected, unsupported};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::{HostKernel, IpcFlag, ObjectClass};

/// Guest semaphore storage
#[derive(Debug, Default)]
pub struct OsSem {
    cell: ObjectCell,
}

impl OsSem {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
        }
    }
}

guest_object!(OsSem, ObjectClass::Semaphore);

impl<H: HostKernel> Os<H> {
    /// `OSSemCreate`
    pub fn sem_create(
        &mut self,
        sem: Option<&mut OsSem>,
        name: Option<&str>,
        cnt: OsSemCtr,
        err: &mut OsErr,
    ) {
        settle(err, self.try_sem_create(sem, name, cnt))
    }

    fn try_sem_create(
        &mut self,
        sem: Option<&mut OsSem>,
        name: Option<&str>,
        cnt: OsSemCtr,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::CreateIsr)?;
        let sem = sem.ok_or(OsErr::ObjPtrNull)?;
        let name = name.ok_or(OsErr::Name)?;
        self.vacant(&*sem)?;
        let handle = self.host.sem_init(name, cnt, IpcFlag::Priority)?;
        sem.cell.bind(handle);
        Ok(())
    }

    /// `OSSemDel`
    ///
    /// Only `OS_OPT_DEL_ALWAYS` is accepted. Returns the number of tasks
    /// readied, which the host does not report (always 0).
    pub fn sem_del(&mut self, sem: Option<&mut OsSem>, opt: OsOpt, err: &mut OsErr) -> OsObjQty {
        settle(err, self.try_sem_del(sem, opt))
    }

    fn try_sem_del(&mut self, sem: Option<&mut OsSem>, opt: OsOpt) -> OsResult<OsObjQty> {
        let handle = self.del_prologue("OSSemDel", sem.as_deref(), opt)?;
        self.host.sem_detach(handle)?;
        if let Some(sem) = sem {
            sem.cell.clear();
        }
        Ok(0)
    }

    /// `OSSemPend`
    ///
    /// Returns the count left after the pend, whether or not it succeeded.
    pub fn sem_pend(
        &mut self,
        sem: Option<&OsSem>,
        timeout: OsTick,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsSemCtr {
        let (handle, wait) = match self.pend_prologue("OSSemPend", sem, timeout, opt) {
            Ok(prologue) => prologue,
            Err(e) => {
                *err = e;
                return 0;
            }
        };
        *err = OsErr::from_host(&self.host.sem_take(handle, wait.to_host()));
        self.host.sem_value(handle).unwrap_or(0)
    }

    /// `OSSemPendAbort` (not available on this host)
    pub fn sem_pend_abort(&mut self, sem: Option<&OsSem>, opt: OsOpt, err: &mut OsErr) -> OsObjQty {
        log::debug!("OSSemPendAbort: opt {:#06x} ignored", opt);
        settle(err, self.pend_abort_unsupported("OSSemPendAbort", sem))
    }

    /// `OSSemPost`
    ///
    /// Only `OS_OPT_POST_1` is accepted. Returns the count after the post.
    pub fn sem_post(&mut self, sem: Option<&OsSem>, opt: OsOpt, err: &mut OsErr) -> OsSemCtr {
        settle(err, self.try_sem_post(sem, opt))
    }

    fn try_sem_post(&mut self, sem: Option<&OsSem>, opt: OsOpt) -> OsResult<OsSemCtr> {
        self.post_allowed()?;
        let handle = self.live(sem)?;
        if opt != OS_OPT_POST_1 {
            return Err(rejected("OSSemPost", opt));
        }
        self.host.sem_release(handle)?;
        Ok(self.host.sem_value(handle)?)
    }

    /// `OSSemSet` (not available on this host)
    pub fn sem_set(&mut self, sem: Option<&OsSem>, cnt: OsSemCtr, err: &mut OsErr) {
        settle(err, self.try_sem_set(sem, cnt))
    }

    fn try_sem_set(&mut self, sem: Option<&OsSem>, cnt: OsSemCtr) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::SetIsr)?;
        self.live(sem)?;
        log::debug!("OSSemSet: requested count {}", cnt);
        Err(unsupported("OSSemSet"))
    }
}
