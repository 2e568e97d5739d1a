//! Mutual exclusion semaphores
//!
//! Ownership and recursion are tracked by the host. The guest-visible
//! differences are reported as codes: a recursive pend succeeds with
//! `MUTEX_OWNER`, a post that leaves the mutex still held with
//! `MUTEX_NESTING`, and a post by a task that does not hold it with
//! `MUTEX_NOT_OWNER`.

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, ObjectCell};
use crate::opt::rejected;
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::{HostError, HostHandle, HostKernel, IpcFlag, ObjectClass};

/// Guest mutex storage
#[derive(Debug, Default)]
pub struct OsMutex {
    cell: ObjectCell,
}

impl OsMutex {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
        }
    }
}

guest_object!(OsMutex, ObjectClass::Mutex);

impl<H: HostKernel> Os<H> {
    /// `OSMutexCreate`
    pub fn mutex_create(
        &mut self,
        mutex: Option<&mut OsMutex>,
        name: Option<&str>,
        err: &mut OsErr,
    ) {
        settle(err, self.try_mutex_create(mutex, name))
    }

    fn try_mutex_create(
        &mut self,
        mutex: Option<&mut OsMutex>,
        name: Option<&str>,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::CreateIsr)?;
        let mutex = mutex.ok_or(OsErr::ObjPtrNull)?;
        let name = name.ok_or(OsErr::Name)?;
        self.vacant(&*mutex)?;
        let handle = self.host.mutex_init(name, IpcFlag::Priority)?;
        mutex.cell.bind(handle);
        Ok(())
    }

    /// `OSMutexDel`
    pub fn mutex_del(
        &mut self,
        mutex: Option<&mut OsMutex>,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsObjQty {
        settle(err, self.try_mutex_del(mutex, opt))
    }

    fn try_mutex_del(&mut self, mutex: Option<&mut OsMutex>, opt: OsOpt) -> OsResult<OsObjQty> {
        let handle = self.del_prologue("OSMutexDel", mutex.as_deref(), opt)?;
        self.host.mutex_detach(handle)?;
        if let Some(mutex) = mutex {
            mutex.cell.clear();
        }
        Ok(0)
    }

    /// `OSMutexPend`
    pub fn mutex_pend(
        &mut self,
        mutex: Option<&OsMutex>,
        timeout: OsTick,
        opt: OsOpt,
        err: &mut OsErr,
    ) {
        settle(err, self.try_mutex_pend(mutex, timeout, opt))
    }

    fn try_mutex_pend(
        &mut self,
        mutex: Option<&OsMutex>,
        timeout: OsTick,
        opt: OsOpt,
    ) -> OsResult<()> {
        let (handle, wait) = self.pend_prologue("OSMutexPend", mutex, timeout, opt)?;
        let recursive = self.held_by_caller(handle);
        self.host.mutex_take(handle, wait.to_host())?;
        if recursive {
            Err(OsErr::MutexOwner)
        } else {
            Ok(())
        }
    }

    /// `OSMutexPendAbort` (not available on this host)
    pub fn mutex_pend_abort(
        &mut self,
        mutex: Option<&OsMutex>,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsObjQty {
        log::debug!("OSMutexPendAbort: opt {:#06x} ignored", opt);
        settle(err, self.pend_abort_unsupported("OSMutexPendAbort", mutex))
    }

    /// `OSMutexPost`
    ///
    /// Never allowed from an ISR, whatever the configuration says.
    pub fn mutex_post(&mut self, mutex: Option<&OsMutex>, opt: OsOpt, err: &mut OsErr) {
        settle(err, self.try_mutex_post(mutex, opt))
    }

    fn try_mutex_post(&mut self, mutex: Option<&OsMutex>, opt: OsOpt) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::PostIsr)?;
        let handle = self.live(mutex)?;
        if opt != OS_OPT_POST_NONE {
            return Err(rejected("OSMutexPost", opt));
        }
        match self.host.mutex_release(handle) {
            Ok(()) if self.held_by_caller(handle) => Err(OsErr::MutexNesting),
            Ok(()) => Ok(()),
            Err(HostError::Error) if !self.held_by_caller(handle) => Err(OsErr::MutexNotOwner),
            Err(e) => Err(e.into()),
        }
    }

    fn held_by_caller(&self, mutex: HostHandle) -> bool {
        match (self.host.mutex_owner(mutex), self.host.thread_self()) {
            (Ok(Some(owner)), Some(me)) => owner == me,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_api::ThreadConfig;
    use sim_host::test_utils::leak_stack;
    use sim_host::{SimEvent, SimulatedHost};

    fn created(os: &mut Os<SimulatedHost>) -> OsMutex {
        let mut mutex = OsMutex::new();
        let mut err = OsErr::None;
        os.mutex_create(Some(&mut mutex), Some("mutex"), &mut err);
        assert_eq!(err, OsErr::None);
        mutex
    }

    fn other_thread(host: &mut SimulatedHost) -> HostHandle {
        fn idle(_: usize) {}
        host.thread_init(ThreadConfig {
            name: "other".to_string(),
            entry: idle,
            parameter: 0,
            stack: leak_stack(64),
            priority: 5,
            time_slice: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_pend_post() {
        let mut os = Os::new(SimulatedHost::new());
        let mutex = created(&mut os);
        let mut err = OsErr::None;

        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
        assert_eq!(err, OsErr::None);
        let me = os.host().main_thread();
        assert_eq!(os.host().mutex_owner(mutex.handle().unwrap()), Ok(Some(me)));

        os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
        assert_eq!(err, OsErr::None);
        assert_eq!(os.host().mutex_owner(mutex.handle().unwrap()), Ok(None));
    }

    #[test]
    fn test_recursive_pend_and_nesting() {
        let mut os = Os::new(SimulatedHost::new());
        let mutex = created(&mut os);
        let mut err = OsErr::None;

        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
        assert_eq!(err, OsErr::MutexOwner);

        os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
        assert_eq!(err, OsErr::MutexNesting);
        os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
        assert_eq!(err, OsErr::None);
    }

    #[test]
    fn test_post_by_non_owner() {
        let mut os = Os::new(SimulatedHost::new());
        let mutex = created(&mut os);
        let other = other_thread(os.host_mut());
        let main = os.host().main_thread();
        let mut err = OsErr::None;

        os.host_mut().set_current_thread(other);
        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
        assert_eq!(err, OsErr::None);

        os.host_mut().set_current_thread(main);
        os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
        assert_eq!(err, OsErr::MutexNotOwner);
        assert_eq!(os.host().mutex_owner(mutex.handle().unwrap()), Ok(Some(other)));
    }

    #[test]
    fn test_pend_waits_for_release() {
        let mut os = Os::new(SimulatedHost::new());
        let mutex = created(&mut os);
        let handle = mutex.handle().unwrap();
        let other = other_thread(os.host_mut());
        let main = os.host().main_thread();
        let mut err = OsErr::None;

        os.host_mut().set_current_thread(other);
        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
        os.host_mut().set_current_thread(main);

        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
        assert_eq!(err, OsErr::Timeout);

        os.host_mut().schedule_in(4, SimEvent::ReleaseMutex(handle));
        os.mutex_pend(Some(&mutex), 10, OS_OPT_PEND_BLOCKING, &mut err);
        assert_eq!(err, OsErr::None);
        assert_eq!(os.host().mutex_owner(handle), Ok(Some(main)));
    }

    #[test]
    fn test_post_from_isr_always_rejected() {
        let config = crate::OsConfig::default().with_post_from_isr(true);
        let mut os = Os::with_config(SimulatedHost::new(), config).unwrap();
        let mutex = created(&mut os);
        let mut err = OsErr::None;
        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);

        os.host_mut().interrupt_enter();
        os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
        assert_eq!(err, OsErr::PostIsr);
        os.host_mut().interrupt_leave();
        assert!(os.host().mutex_owner(mutex.handle().unwrap()).unwrap().is_some());
    }

    #[test]
    fn test_post_rejects_options() {
        let mut os = Os::new(SimulatedHost::new());
        let mutex = created(&mut os);
        let mut err = OsErr::None;
        os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);

        os.mutex_post(Some(&mutex), OS_OPT_POST_NO_SCHED, &mut err);
        assert_eq!(err, OsErr::OptInvalid);
        assert!(os.host().mutex_owner(mutex.handle().unwrap()).unwrap().is_some());
    }

    #[test]
    fn test_del_and_abort() {
        let mut os = Os::new(SimulatedHost::new());
        let mut mutex = created(&mut os);
        let mut err = OsErr::None;

        os.mutex_pend_abort(Some(&mutex), OS_OPT_PEND_ABORT_1, &mut err);
        assert_eq!(err, OsErr::OptInvalid);

        os.host_mut().interrupt_enter();
        os.mutex_del(Some(&mut mutex), OS_OPT_DEL_ALWAYS, &mut err);
        assert_eq!(err, OsErr::DelIsr);
        os.host_mut().interrupt_leave();

        os.mutex_del(Some(&mut mutex), OS_OPT_DEL_ALWAYS, &mut err);
        assert_eq!(err, OsErr::None);
        assert!(mutex.handle().is_none());
    }
}
