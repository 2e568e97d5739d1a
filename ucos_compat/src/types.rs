//! Guest scalar types and option constants
//!
//! Names and values follow the guest API so application code keeps its
//! vocabulary. Option words are validated by the typed parsers in
//! [`crate::opt`]; nothing here is passed to the host directly.

/// Kernel version number times 10000 (3.03.00)
pub const OS_VERSION: u32 = 30300;

pub type OsTick = u32;
pub type OsOpt = u16;
pub type OsSemCtr = u32;
pub type OsFlags = u32;
pub type OsMsgQty = u16;
pub type OsMsgSize = u16;
pub type OsPrio = u8;
pub type OsObjQty = u16;
pub type OsNestingCtr = u8;
pub type OsRateHz = u32;

/// One word of task stack
pub type CpuStk = host_api::StackWord;
/// Stack size in words
pub type CpuStkSize = u32;

/// Message pointer carried by queues; never dereferenced by this crate
pub type OsMsgPtr = *mut core::ffi::c_void;

/// Task entry point
pub type OsTaskPtr = fn(usize);

pub const OS_OPT_NONE: OsOpt = 0x0000;

// Delete
pub const OS_OPT_DEL_NO_PEND: OsOpt = 0x0000;
pub const OS_OPT_DEL_ALWAYS: OsOpt = 0x0001;

// Pend
pub const OS_OPT_PEND_FLAG_MASK: OsOpt = 0x000F;
pub const OS_OPT_PEND_FLAG_CLR_ALL: OsOpt = 0x0001;
pub const OS_OPT_PEND_FLAG_CLR_AND: OsOpt = 0x0001;
pub const OS_OPT_PEND_FLAG_CLR_ANY: OsOpt = 0x0002;
pub const OS_OPT_PEND_FLAG_CLR_OR: OsOpt = 0x0002;
pub const OS_OPT_PEND_FLAG_SET_ALL: OsOpt = 0x0004;
pub const OS_OPT_PEND_FLAG_SET_AND: OsOpt = 0x0004;
pub const OS_OPT_PEND_FLAG_SET_ANY: OsOpt = 0x0008;
pub const OS_OPT_PEND_FLAG_SET_OR: OsOpt = 0x0008;
pub const OS_OPT_PEND_FLAG_CONSUME: OsOpt = 0x0100;
pub const OS_OPT_PEND_BLOCKING: OsOpt = 0x0000;
pub const OS_OPT_PEND_NON_BLOCKING: OsOpt = 0x8000;

// Pend abort
pub const OS_OPT_PEND_ABORT_1: OsOpt = 0x0000;
pub const OS_OPT_PEND_ABORT_ALL: OsOpt = 0x0100;

// Post
pub const OS_OPT_POST_NONE: OsOpt = 0x0000;
pub const OS_OPT_POST_FLAG_SET: OsOpt = 0x0000;
pub const OS_OPT_POST_FLAG_CLR: OsOpt = 0x0001;
pub const OS_OPT_POST_FIFO: OsOpt = 0x0000;
pub const OS_OPT_POST_LIFO: OsOpt = 0x0010;
pub const OS_OPT_POST_1: OsOpt = 0x0000;
pub const OS_OPT_POST_ALL: OsOpt = 0x0200;
pub const OS_OPT_POST_NO_SCHED: OsOpt = 0x8000;

// Task
pub const OS_OPT_TASK_NONE: OsOpt = 0x0000;
pub const OS_OPT_TASK_STK_CHK: OsOpt = 0x0001;
pub const OS_OPT_TASK_STK_CLR: OsOpt = 0x0002;
pub const OS_OPT_TASK_SAVE_FP: OsOpt = 0x0004;
pub const OS_OPT_TASK_NO_TLS: OsOpt = 0x0008;

// Time
pub const OS_OPT_TIME_DLY: OsOpt = 0x0000;
pub const OS_OPT_TIME_TIMEOUT: OsOpt = 0x0002;
pub const OS_OPT_TIME_MATCH: OsOpt = 0x0004;
pub const OS_OPT_TIME_PERIODIC: OsOpt = 0x0008;
pub const OS_OPT_TIME_HMSM_STRICT: OsOpt = 0x0000;
pub const OS_OPT_TIME_HMSM_NON_STRICT: OsOpt = 0x0010;
pub const OS_OPT_TIME_MASK: OsOpt =
    OS_OPT_TIME_DLY | OS_OPT_TIME_TIMEOUT | OS_OPT_TIME_PERIODIC | OS_OPT_TIME_MATCH;
pub const OS_OPT_TIME_OPTS_MASK: OsOpt = OS_OPT_TIME_MASK | OS_OPT_TIME_HMSM_NON_STRICT;

// Timer
pub const OS_OPT_TMR_NONE: OsOpt = 0;
pub const OS_OPT_TMR_ONE_SHOT: OsOpt = 1;
pub const OS_OPT_TMR_PERIODIC: OsOpt = 2;
pub const OS_OPT_TMR_CALLBACK: OsOpt = 3;
pub const OS_OPT_TMR_CALLBACK_ARG: OsOpt = 4;
