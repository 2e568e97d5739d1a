//! Event-flag groups
//!
//! The 32-bit flag pattern lives in the host event set and is read back
//! from it on every call; nothing is cached here.

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, ObjectCell};
use crate::opt::{rejected, FlagPendOptions, FlagPostMode};
use crate::types::*;
use crate::wait::WaitPolicy;
use crate::{guard, settle, Os};
use host_api::{HostHandle, HostKernel, IpcFlag, ObjectClass};

/// Guest event-flag group storage
#[derive(Debug, Default)]
pub struct OsFlagGrp {
    cell: ObjectCell,
}

impl OsFlagGrp {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
        }
    }
}

guest_object!(OsFlagGrp, ObjectClass::Event);

impl<H: HostKernel> Os<H> {
    /// `OSFlagCreate`
    pub fn flag_create(
        &mut self,
        grp: Option<&mut OsFlagGrp>,
        name: Option<&str>,
        flags: OsFlags,
        err: &mut OsErr,
    ) {
        settle(err, self.try_flag_create(grp, name, flags))
    }

    fn try_flag_create(
        &mut self,
        grp: Option<&mut OsFlagGrp>,
        name: Option<&str>,
        flags: OsFlags,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::CreateIsr)?;
        let grp = grp.ok_or(OsErr::ObjPtrNull)?;
        let name = name.ok_or(OsErr::Name)?;
        self.vacant(&*grp)?;
        let handle = self.host.event_init(name, IpcFlag::Fifo)?;
        if flags != 0 {
            if let Err(e) = self.host.event_send(handle, flags) {
                if let Err(detach) = self.host.event_detach(handle) {
                    log::warn!("OSFlagCreate: rollback of group {} failed: {}", handle, detach);
                }
                return Err(e.into());
            }
        }
        grp.cell.bind(handle);
        Ok(())
    }

    /// `OSFlagDel`
    pub fn flag_del(
        &mut self,
        grp: Option<&mut OsFlagGrp>,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsObjQty {
        settle(err, self.try_flag_del(grp, opt))
    }

    fn try_flag_del(&mut self, grp: Option<&mut OsFlagGrp>, opt: OsOpt) -> OsResult<OsObjQty> {
        let handle = self.del_prologue("OSFlagDel", grp.as_deref(), opt)?;
        self.host.event_detach(handle)?;
        if let Some(grp) = grp {
            grp.cell.clear();
        }
        Ok(0)
    }

    /// `OSFlagPend`
    ///
    /// Returns the flags that satisfied the wait, or 0 on failure. Waits for
    /// cleared flags are served as waits for set flags.
    pub fn flag_pend(
        &mut self,
        grp: Option<&OsFlagGrp>,
        flags: OsFlags,
        timeout: OsTick,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsFlags {
        settle(err, self.try_flag_pend(grp, flags, timeout, opt))
    }

    fn try_flag_pend(
        &mut self,
        grp: Option<&OsFlagGrp>,
        flags: OsFlags,
        timeout: OsTick,
        opt: OsOpt,
    ) -> OsResult<OsFlags> {
        guard::may_block(&self.host, OsErr::PendIsr)?;
        let handle = self.live(grp)?;
        let options = FlagPendOptions::parse(opt).ok_or_else(|| rejected("OSFlagPend", opt))?;
        let wait = WaitPolicy::from_guest(timeout, options.blocking);
        Ok(self
            .host
            .event_recv(handle, flags, options.host_option(), wait.to_host())?)
    }

    /// `OSFlagPendAbort` (not available on this host)
    pub fn flag_pend_abort(
        &mut self,
        grp: Option<&OsFlagGrp>,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsObjQty {
        log::debug!("OSFlagPendAbort: opt {:#06x} ignored", opt);
        settle(err, self.pend_abort_unsupported("OSFlagPendAbort", grp))
    }

    /// `OSFlagPost`
    ///
    /// The host can only set flags, so a clear request sets them as well.
    /// Once the group is resolved, the group's flag pattern is returned
    /// whether or not the post went through.
    pub fn flag_post(
        &mut self,
        grp: Option<&OsFlagGrp>,
        flags: OsFlags,
        opt: OsOpt,
        err: &mut OsErr,
    ) -> OsFlags {
        let handle = match self.flag_post_target(grp) {
            Ok(handle) => handle,
            Err(e) => {
                *err = e;
                return 0;
            }
        };
        *err = match self.try_flag_post(handle, flags, opt) {
            Ok(()) => OsErr::None,
            Err(e) => e,
        };
        self.host.event_value(handle).unwrap_or(0)
    }

    fn flag_post_target(&self, grp: Option<&OsFlagGrp>) -> OsResult<HostHandle> {
        self.post_allowed()?;
        self.live(grp)
    }

    fn try_flag_post(&mut self, handle: HostHandle, flags: OsFlags, opt: OsOpt) -> OsResult<()> {
        match FlagPostMode::parse(opt) {
            Some(FlagPostMode::Set) => {}
            Some(FlagPostMode::Clr) => {
                log::debug!("OSFlagPost: clear of {:#010x} delivered as set", flags);
            }
            None => return Err(rejected("OSFlagPost", opt)),
        }
        self.host.event_send(handle, flags)?;
        Ok(())
    }
}
