//! Time management

use crate::error::{OsErr, OsResult};
use crate::opt::{rejected, DelayMode, HmsmOptions};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::HostKernel;

/// Strict (clock face) limits
const HOURS_MAX: u16 = 99;
const MINUTES_MAX: u16 = 59;
const SECONDS_MAX: u16 = 59;
const MILLIS_MAX: u32 = 999;

/// Non-strict limits; seconds are bounded by their type
const HOURS_MAX_NON_STRICT: u16 = 999;
const MINUTES_MAX_NON_STRICT: u16 = 9999;

/// Ticks for a duration, rounding milliseconds to the nearest tick
///
/// Saturates at `OsTick::MAX`.
pub fn hmsm_to_ticks(hours: u16, minutes: u16, seconds: u16, milli: u32, rate: OsRateHz) -> OsTick {
    let rate = u64::from(rate);
    let whole = (u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds)) * rate;
    let frac = rate * (u64::from(milli) + 500 / rate.max(1)) / 1000;
    OsTick::try_from(whole + frac).unwrap_or(OsTick::MAX)
}

fn check_hmsm(hours: u16, minutes: u16, seconds: u16, milli: u32, strict: bool) -> OsResult<()> {
    if strict {
        if hours > HOURS_MAX {
            return Err(OsErr::TimeInvalidHours);
        }
        if minutes > MINUTES_MAX {
            return Err(OsErr::TimeInvalidMinutes);
        }
        if seconds > SECONDS_MAX {
            return Err(OsErr::TimeInvalidSeconds);
        }
        if milli > MILLIS_MAX {
            return Err(OsErr::TimeInvalidMilliseconds);
        }
    } else {
        if hours > HOURS_MAX_NON_STRICT {
            return Err(OsErr::TimeInvalidHours);
        }
        if minutes > MINUTES_MAX_NON_STRICT {
            return Err(OsErr::TimeInvalidMinutes);
        }
    }
    Ok(())
}

impl<H: HostKernel> Os<H> {
    /// `OSTimeDly`
    ///
    /// `OS_OPT_TIME_MATCH` waits until the tick counter reaches `dly`;
    /// every other mode waits `dly` ticks from now.
    pub fn time_dly(&mut self, dly: OsTick, opt: OsOpt, err: &mut OsErr) {
        settle(err, self.try_time_dly(dly, opt))
    }

    fn try_time_dly(&mut self, dly: OsTick, opt: OsOpt) -> OsResult<()> {
        guard::may_block(&self.host, OsErr::TimeDlyIsr)?;
        let mode = DelayMode::parse(opt).ok_or_else(|| rejected("OSTimeDly", opt))?;
        self.delay(mode, dly)
    }

    /// `OSTimeDlyHMSM`
    pub fn time_dly_hmsm(
        &mut self,
        hours: u16,
        minutes: u16,
        seconds: u16,
        milli: u32,
        opt: OsOpt,
        err: &mut OsErr,
    ) {
        settle(err, self.try_time_dly_hmsm(hours, minutes, seconds, milli, opt))
    }

    fn try_time_dly_hmsm(
        &mut self,
        hours: u16,
        minutes: u16,
        seconds: u16,
        milli: u32,
        opt: OsOpt,
    ) -> OsResult<()> {
        guard::may_block(&self.host, OsErr::TimeDlyIsr)?;
        let options = HmsmOptions::parse(opt).ok_or_else(|| rejected("OSTimeDlyHMSM", opt))?;
        check_hmsm(hours, minutes, seconds, milli, options.strict)?;
        let ticks = hmsm_to_ticks(hours, minutes, seconds, milli, self.host.tick_per_second());
        self.delay(options.mode, ticks)
    }

    fn delay(&mut self, mode: DelayMode, dly: OsTick) -> OsResult<()> {
        let ticks = match mode {
            DelayMode::Relative => dly,
            DelayMode::Match => dly.wrapping_sub(self.host.tick_get()),
        };
        if ticks == 0 {
            return Err(OsErr::TimeZeroDly);
        }
        self.host.thread_delay(ticks)?;
        Ok(())
    }

    /// `OSTimeGet`
    pub fn time_get(&mut self, err: &mut OsErr) -> OsTick {
        *err = OsErr::None;
        self.host.tick_get()
    }

    /// `OSTimeSet`
    pub fn time_set(&mut self, ticks: OsTick, err: &mut OsErr) {
        self.host.tick_set(ticks);
        *err = OsErr::None;
    }
}
