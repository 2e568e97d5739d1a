//! Option words
//!
//! Each guest option word is parsed into a closed type before anything
//! reaches the host. Parsers return `None` for any bit pattern outside the
//! allow-list; callers turn that into `OPT_INVALID` with [`rejected`].

use crate::error::OsErr;
use crate::types::*;
use bitflags::bitflags;
use host_api::EventOption;

/// Logs and returns the error for an option the host cannot honour
pub(crate) fn rejected(op: &str, opt: OsOpt) -> OsErr {
    log::debug!("{}: wrapper can't accept option {:#06x}", op, opt);
    OsErr::OptInvalid
}

/// Logs and returns the error for an operation the host has no primitive for
pub(crate) fn unsupported(op: &str) -> OsErr {
    log::warn!("{}: not supported on this host", op);
    OsErr::OptInvalid
}

/// Whether a pend may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendMode {
    Blocking,
    NonBlocking,
}

impl PendMode {
    /// Parses a semaphore, mutex or queue pend option
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_PEND_BLOCKING => Some(PendMode::Blocking),
            OS_OPT_PEND_NON_BLOCKING => Some(PendMode::NonBlocking),
            _ => None,
        }
    }

    fn from_bit(opt: OsOpt) -> Self {
        if opt & OS_OPT_PEND_NON_BLOCKING != 0 {
            PendMode::NonBlocking
        } else {
            PendMode::Blocking
        }
    }
}

/// Which flag condition an event-flag pend waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagWaitMode {
    SetAll,
    SetAny,
    ClrAll,
    ClrAny,
}

impl FlagWaitMode {
    /// Host receive mode
    ///
    /// The host has no notion of waiting for clear bits, so the clear modes
    /// fold onto their set counterparts.
    pub fn host_option(self) -> EventOption {
        match self {
            FlagWaitMode::SetAll | FlagWaitMode::ClrAll => EventOption::AND,
            FlagWaitMode::SetAny | FlagWaitMode::ClrAny => EventOption::OR,
        }
    }
}

/// Parsed event-flag pend option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPendOptions {
    pub mode: FlagWaitMode,
    /// Clear the matched flags once satisfied
    pub consume: bool,
    pub blocking: PendMode,
}

impl FlagPendOptions {
    const ALLOWED: OsOpt =
        OS_OPT_PEND_FLAG_MASK | OS_OPT_PEND_FLAG_CONSUME | OS_OPT_PEND_NON_BLOCKING;

    /// Parses an event-flag pend option
    ///
    /// Exactly one wait mode, optionally with CONSUME and NON_BLOCKING.
    pub fn parse(opt: OsOpt) -> Option<Self> {
        if opt & !Self::ALLOWED != 0 {
            return None;
        }
        let mode = match opt & OS_OPT_PEND_FLAG_MASK {
            OS_OPT_PEND_FLAG_SET_ALL => FlagWaitMode::SetAll,
            OS_OPT_PEND_FLAG_SET_ANY => FlagWaitMode::SetAny,
            OS_OPT_PEND_FLAG_CLR_ALL => FlagWaitMode::ClrAll,
            OS_OPT_PEND_FLAG_CLR_ANY => FlagWaitMode::ClrAny,
            _ => return None,
        };
        Some(Self {
            mode,
            consume: opt & OS_OPT_PEND_FLAG_CONSUME != 0,
            blocking: PendMode::from_bit(opt),
        })
    }

    /// Host receive option
    pub fn host_option(&self) -> EventOption {
        let option = self.mode.host_option();
        if self.consume {
            option | EventOption::CLEAR
        } else {
            option
        }
    }
}

/// Event-flag post operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPostMode {
    Set,
    Clr,
}

impl FlagPostMode {
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_POST_FLAG_SET => Some(FlagPostMode::Set),
            OS_OPT_POST_FLAG_CLR => Some(FlagPostMode::Clr),
            _ => None,
        }
    }
}

/// Delete mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Only if nobody is pending
    NoPend,
    /// Unconditionally
    Always,
}

impl DeleteMode {
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_DEL_NO_PEND => Some(DeleteMode::NoPend),
            OS_OPT_DEL_ALWAYS => Some(DeleteMode::Always),
            _ => None,
        }
    }
}

/// Where a queue post enqueues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QPostMode {
    Fifo,
    Lifo,
}

impl QPostMode {
    /// Parses a queue post option
    ///
    /// Broadcast and no-reschedule posts have no host equivalent and are
    /// not part of the allow-list.
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_POST_FIFO => Some(QPostMode::Fifo),
            OS_OPT_POST_LIFO => Some(QPostMode::Lifo),
            _ => None,
        }
    }
}

bitflags! {
    /// Task creation options
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TaskOpt: OsOpt {
        const STK_CHK = OS_OPT_TASK_STK_CHK;
        const STK_CLR = OS_OPT_TASK_STK_CLR;
        const SAVE_FP = OS_OPT_TASK_SAVE_FP;
        const NO_TLS = OS_OPT_TASK_NO_TLS;
    }
}

/// Timer reload mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmrMode {
    OneShot,
    Periodic,
}

impl TmrMode {
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_TMR_ONE_SHOT => Some(TmrMode::OneShot),
            OS_OPT_TMR_PERIODIC => Some(TmrMode::Periodic),
            _ => None,
        }
    }
}

/// What a timer stop does besides stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmrStopAction {
    Nothing,
    /// Call the callback with its stored argument
    Callback,
    /// Call the callback with the argument given to stop
    CallbackArg,
}

impl TmrStopAction {
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_TMR_NONE => Some(TmrStopAction::Nothing),
            OS_OPT_TMR_CALLBACK => Some(TmrStopAction::Callback),
            OS_OPT_TMR_CALLBACK_ARG => Some(TmrStopAction::CallbackArg),
            _ => None,
        }
    }
}

/// How a delay value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    /// Ticks from now (DLY, TIMEOUT and PERIODIC)
    Relative,
    /// Until the tick counter reaches the value (MATCH)
    Match,
}

impl DelayMode {
    /// Parses a `time_dly` option
    pub fn parse(opt: OsOpt) -> Option<Self> {
        match opt {
            OS_OPT_TIME_DLY | OS_OPT_TIME_TIMEOUT | OS_OPT_TIME_PERIODIC => {
                Some(DelayMode::Relative)
            }
            OS_OPT_TIME_MATCH => Some(DelayMode::Match),
            _ => None,
        }
    }
}

/// Parsed `time_dly_hmsm` option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HmsmOptions {
    pub mode: DelayMode,
    /// Enforce clock-face ranges (minutes < 60 ...)
    pub strict: bool,
}

impl HmsmOptions {
    pub fn parse(opt: OsOpt) -> Option<Self> {
        if opt & !OS_OPT_TIME_OPTS_MASK != 0 {
            return None;
        }
        Some(Self {
            mode: DelayMode::parse(opt & OS_OPT_TIME_MASK)?,
            strict: opt & OS_OPT_TIME_HMSM_NON_STRICT == 0,
        })
    }
}
