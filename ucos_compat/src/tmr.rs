//! Software timers
//!
//! Guest timer callbacks take the timer and an argument; host callbacks take
//! only the argument. The host callback is a closure that carries the guest
//! callback and learns the timer's host handle once the host has issued it.

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, Identity, ObjectCell};
use crate::opt::{rejected, TmrMode, TmrStopAction};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::{HostHandle, HostKernel, ObjectClass, TimerCallback, TimerMode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Guest timer callback: the timer's host handle, then the argument
pub type OsTmrCallbackPtr = fn(HostHandle, usize);

/// Timer state as reported by `tmr_state_get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OsTmrState {
    Unused = 0,
    Stopped = 1,
    Running = 2,
    /// A one-shot timer that has expired
    Completed = 3,
}

/// Guest timer storage
#[derive(Debug, Default)]
pub struct OsTmr {
    cell: ObjectCell,
    callback: Option<OsTmrCallbackPtr>,
    callback_arg: usize,
    periodic: bool,
    /// Started since the last stop
    armed: bool,
}

impl OsTmr {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
            callback: None,
            callback_arg: 0,
            periodic: false,
            armed: false,
        }
    }
}

guest_object!(OsTmr, ObjectClass::Timer);

impl From<TmrMode> for TimerMode {
    fn from(mode: TmrMode) -> Self {
        match mode {
            TmrMode::OneShot => TimerMode::OneShot,
            TmrMode::Periodic => TimerMode::Periodic,
        }
    }
}

/// Host callback that calls `callback(handle, arg)` once `handle` is known
fn bridge(callback: Option<OsTmrCallbackPtr>, handle: Arc<OnceLock<HostHandle>>) -> TimerCallback {
    Box::new(move |arg| {
        if let (Some(callback), Some(&handle)) = (callback, handle.get()) {
            callback(handle, arg);
        }
    })
}

impl<H: HostKernel> Os<H> {
    /// `OSTmrCreate`
    ///
    /// One-shot timers expire after `dly`; periodic timers every `period`
    /// ticks, with the first expiry after `period` as well.
    #[allow(clippy::too_many_arguments)]
    pub fn tmr_create(
        &mut self,
        tmr: Option<&mut OsTmr>,
        name: Option<&str>,
        dly: OsTick,
        period: OsTick,
        opt: OsOpt,
        callback: Option<OsTmrCallbackPtr>,
        callback_arg: usize,
        err: &mut OsErr,
    ) {
        let result = self.try_tmr_create(tmr, name, dly, period, opt, callback, callback_arg);
        settle(err, result)
    }

    #[allow(clippy::too_many_arguments)]
    fn try_tmr_create(
        &mut self,
        tmr: Option<&mut OsTmr>,
        name: Option<&str>,
        dly: OsTick,
        period: OsTick,
        opt: OsOpt,
        callback: Option<OsTmrCallbackPtr>,
        callback_arg: usize,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::TmrIsr)?;
        let tmr = tmr.ok_or(OsErr::ObjPtrNull)?;
        let name = name.ok_or(OsErr::Name)?;
        self.vacant(&*tmr)?;
        let mode = TmrMode::parse(opt).ok_or_else(|| rejected("OSTmrCreate", opt))?;
        let ticks = match mode {
            TmrMode::OneShot if dly == 0 => return Err(OsErr::TmrInvalidDly),
            TmrMode::OneShot => dly,
            TmrMode::Periodic if period == 0 => return Err(OsErr::TmrInvalidPeriod),
            TmrMode::Periodic => {
                if dly != 0 && dly != period {
                    log::debug!("OSTmrCreate: initial delay {} ignored, period {}", dly, period);
                }
                period
            }
        };

        let slot = Arc::new(OnceLock::new());
        let handle = self.host.timer_init(
            name,
            bridge(callback, Arc::clone(&slot)),
            callback_arg,
            ticks,
            mode.into(),
        )?;
        let _ = slot.set(handle);

        *tmr = OsTmr {
            callback,
            callback_arg,
            periodic: mode == TmrMode::Periodic,
            ..OsTmr::new()
        };
        tmr.cell.bind(handle);
        Ok(())
    }

    /// Timer handle for every operation but create and state query
    fn live_tmr(&self, tmr: Option<&OsTmr>) -> OsResult<HostHandle> {
        guard::not_in_isr(&self.host, OsErr::TmrIsr)?;
        self.live(Some(tmr.ok_or(OsErr::TmrInvalid)?))
    }

    /// `OSTmrDel`
    pub fn tmr_del(&mut self, tmr: Option<&mut OsTmr>, err: &mut OsErr) -> bool {
        settle(err, self.try_tmr_del(tmr))
    }

    fn try_tmr_del(&mut self, tmr: Option<&mut OsTmr>) -> OsResult<bool> {
        let handle = self.live_tmr(tmr.as_deref())?;
        self.host.timer_detach(handle)?;
        if let Some(tmr) = tmr {
            *tmr = OsTmr::new();
        }
        Ok(true)
    }

    /// `OSTmrStart`
    ///
    /// Starting a running timer restarts it.
    pub fn tmr_start(&mut self, tmr: Option<&mut OsTmr>, err: &mut OsErr) -> bool {
        settle(err, self.try_tmr_start(tmr))
    }

    fn try_tmr_start(&mut self, tmr: Option<&mut OsTmr>) -> OsResult<bool> {
        let handle = self.live_tmr(tmr.as_deref())?;
        self.host.timer_start(handle)?;
        if let Some(tmr) = tmr {
            tmr.armed = true;
        }
        Ok(true)
    }

    /// `OSTmrStop`
    ///
    /// `OS_OPT_TMR_CALLBACK` runs the callback with its stored argument once
    /// stopped, `OS_OPT_TMR_CALLBACK_ARG` with `callback_arg`. A callback
    /// option on a timer without a callback reports `TMR_NO_CALLBACK` and
    /// leaves the timer running. Stopping a timer that is not running
    /// reports `TMR_STOPPED` and returns false.
    pub fn tmr_stop(
        &mut self,
        tmr: Option<&mut OsTmr>,
        opt: OsOpt,
        callback_arg: usize,
        err: &mut OsErr,
    ) -> bool {
        settle(err, self.try_tmr_stop(tmr, opt, callback_arg))
    }

    fn try_tmr_stop(
        &mut self,
        tmr: Option<&mut OsTmr>,
        opt: OsOpt,
        callback_arg: usize,
    ) -> OsResult<bool> {
        let handle = self.live_tmr(tmr.as_deref())?;
        let action = TmrStopAction::parse(opt).ok_or_else(|| rejected("OSTmrStop", opt))?;
        let tmr = tmr.ok_or(OsErr::TmrInvalid)?;
        if !self.host.timer_is_active(handle)? {
            tmr.armed = false;
            return Err(OsErr::TmrStopped);
        }
        let call = match action {
            TmrStopAction::Nothing => None,
            TmrStopAction::Callback => Some(tmr.callback_arg),
            TmrStopAction::CallbackArg => Some(callback_arg),
        };
        let call = match (call, tmr.callback) {
            (None, _) => None,
            (Some(arg), Some(callback)) => Some((callback, arg)),
            (Some(_), None) => return Err(OsErr::TmrNoCallback),
        };
        self.host.timer_stop(handle)?;
        tmr.armed = false;
        if let Some((callback, arg)) = call {
            callback(handle, arg);
        }
        Ok(true)
    }

    /// `OSTmrRemainGet`
    pub fn tmr_remain_get(&mut self, tmr: Option<&OsTmr>, err: &mut OsErr) -> OsTick {
        settle(err, self.try_tmr_remain_get(tmr))
    }

    fn try_tmr_remain_get(&self, tmr: Option<&OsTmr>) -> OsResult<OsTick> {
        let handle = self.live_tmr(tmr)?;
        Ok(self.host.timer_remaining(handle)?)
    }

    /// `OSTmrStateGet`
    pub fn tmr_state_get(&mut self, tmr: Option<&OsTmr>, err: &mut OsErr) -> OsTmrState {
        match self.try_tmr_state_get(tmr) {
            Ok(state) => {
                *err = OsErr::None;
                state
            }
            Err(e) => {
                *err = e;
                OsTmrState::Unused
            }
        }
    }

    fn try_tmr_state_get(&self, tmr: Option<&OsTmr>) -> OsResult<OsTmrState> {
        guard::not_in_isr(&self.host, OsErr::TmrIsr)?;
        let tmr = tmr.ok_or(OsErr::TmrInvalid)?;
        let handle = match Identity::resolve(&self.host, Some(&tmr.cell), ObjectClass::Timer) {
            Identity::Live(handle) => handle,
            _ => return Err(OsErr::ObjType),
        };
        Ok(if self.host.timer_is_active(handle)? {
            OsTmrState::Running
        } else if tmr.armed && !tmr.periodic {
            OsTmrState::Completed
        } else {
            OsTmrState::Stopped
        })
    }
}
