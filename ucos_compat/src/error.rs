//! Guest error codes and the host status translator
//!
//! The guest reports every outcome through an error slot holding one of
//! several hundred codes, grouped in letter ranges (`A` = 10000, `B` = 11000,
//! ...). Only a subset is ever produced here; the rest exist so application
//! code that names them keeps compiling. The host-specific `RT_*` range
//! carries host failures that have no closer guest equivalent.

use host_api::{HostError, HostResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type used between the validation steps of an operation
pub type OsResult<T> = Result<T, OsErr>;

macro_rules! os_errors {
    ($($variant:ident = $code:literal, $name:literal;)*) => {
        /// Guest error code
        ///
        /// `OsErr::None` is success. The discriminant is the numeric guest
        /// code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u32)]
        pub enum OsErr {
            $($variant = $code,)*
        }

        impl OsErr {
            /// Every defined code, in ascending order
            pub const ALL: &'static [OsErr] = &[$(OsErr::$variant,)*];

            /// Looks a numeric code up
            pub const fn from_code(code: u32) -> Option<OsErr> {
                match code {
                    $($code => Some(OsErr::$variant),)*
                    _ => None,
                }
            }

            /// The code's guest name, e.g. `"OS_ERR_PEND_ISR"`
            pub const fn name(self) -> &'static str {
                match self {
                    $(OsErr::$variant => $name,)*
                }
            }
        }
    };
}

os_errors! {
        None = 0, "OS_ERR_NONE";
        A = 10000, "OS_ERR_A";
        AcceptIsr = 10001, "OS_ERR_ACCEPT_ISR";
        B = 11000, "OS_ERR_B";
        C = 12000, "OS_ERR_C";
        CreateIsr = 12001, "OS_ERR_CREATE_ISR";
        D = 13000, "OS_ERR_D";
        DelIsr = 13001, "OS_ERR_DEL_ISR";
        E = 14000, "OS_ERR_E";
        F = 15000, "OS_ERR_F";
        FatalReturn = 15001, "OS_ERR_FATAL_RETURN";
        FlagGrpDepleted = 15101, "OS_ERR_FLAG_GRP_DEPLETED";
        FlagNotRdy = 15102, "OS_ERR_FLAG_NOT_RDY";
        FlagPendOpt = 15103, "OS_ERR_FLAG_PEND_OPT";
        FlushIsr = 15104, "OS_ERR_FLUSH_ISR";
        G = 16000, "OS_ERR_G";
        H = 17000, "OS_ERR_H";
        I = 18000, "OS_ERR_I";
        IllegalCreateRunTime = 18001, "OS_ERR_ILLEGAL_CREATE_RUN_TIME";
        IntQ = 18002, "OS_ERR_INT_Q";
        IntQFull = 18003, "OS_ERR_INT_Q_FULL";
        IntQSize = 18004, "OS_ERR_INT_Q_SIZE";
        IntQStkInvalid = 18005, "OS_ERR_INT_Q_STK_INVALID";
        IntQStkSizeInvalid = 18006, "OS_ERR_INT_Q_STK_SIZE_INVALID";
        J = 19000, "OS_ERR_J";
        K = 20000, "OS_ERR_K";
        L = 21000, "OS_ERR_L";
        LockNestingOvf = 21001, "OS_ERR_LOCK_NESTING_OVF";
        M = 22000, "OS_ERR_M";
        MemCreateIsr = 22201, "OS_ERR_MEM_CREATE_ISR";
        MemFull = 22202, "OS_ERR_MEM_FULL";
        MemInvalidPAddr = 22203, "OS_ERR_MEM_INVALID_P_ADDR";
        MemInvalidBlks = 22204, "OS_ERR_MEM_INVALID_BLKS";
        MemInvalidPart = 22205, "OS_ERR_MEM_INVALID_PART";
        MemInvalidPBlk = 22206, "OS_ERR_MEM_INVALID_P_BLK";
        MemInvalidPMem = 22207, "OS_ERR_MEM_INVALID_P_MEM";
        MemInvalidPData = 22208, "OS_ERR_MEM_INVALID_P_DATA";
        MemInvalidSize = 22209, "OS_ERR_MEM_INVALID_SIZE";
        MemNoFreeBlks = 22210, "OS_ERR_MEM_NO_FREE_BLKS";
        MsgPoolEmpty = 22301, "OS_ERR_MSG_POOL_EMPTY";
        MsgPoolNullPtr = 22302, "OS_ERR_MSG_POOL_NULL_PTR";
        MutexNotOwner = 22401, "OS_ERR_MUTEX_NOT_OWNER";
        MutexOwner = 22402, "OS_ERR_MUTEX_OWNER";
        MutexNesting = 22403, "OS_ERR_MUTEX_NESTING";
        N = 23000, "OS_ERR_N";
        Name = 23001, "OS_ERR_NAME";
        NoMoreIdAvail = 23002, "OS_ERR_NO_MORE_ID_AVAIL";
        O = 24000, "OS_ERR_O";
        ObjCreated = 24001, "OS_ERR_OBJ_CREATED";
        ObjDel = 24002, "OS_ERR_OBJ_DEL";
        ObjPtrNull = 24003, "OS_ERR_OBJ_PTR_NULL";
        ObjType = 24004, "OS_ERR_OBJ_TYPE";
        OptInvalid = 24101, "OS_ERR_OPT_INVALID";
        OsNotRunning = 24201, "OS_ERR_OS_NOT_RUNNING";
        OsRunning = 24202, "OS_ERR_OS_RUNNING";
        P = 25000, "OS_ERR_P";
        PendAbort = 25001, "OS_ERR_PEND_ABORT";
        PendAbortIsr = 25002, "OS_ERR_PEND_ABORT_ISR";
        PendAbortNone = 25003, "OS_ERR_PEND_ABORT_NONE";
        PendAbortSelf = 25004, "OS_ERR_PEND_ABORT_SELF";
        PendDel = 25005, "OS_ERR_PEND_DEL";
        PendIsr = 25006, "OS_ERR_PEND_ISR";
        PendLocked = 25007, "OS_ERR_PEND_LOCKED";
        PendWouldBlock = 25008, "OS_ERR_PEND_WOULD_BLOCK";
        PostNullPtr = 25101, "OS_ERR_POST_NULL_PTR";
        PostIsr = 25102, "OS_ERR_POST_ISR";
        PrioExist = 25201, "OS_ERR_PRIO_EXIST";
        Prio = 25202, "OS_ERR_PRIO";
        PrioInvalid = 25203, "OS_ERR_PRIO_INVALID";
        PtrInvalid = 25301, "OS_ERR_PTR_INVALID";
        Q = 26000, "OS_ERR_Q";
        QFull = 26001, "OS_ERR_Q_FULL";
        QEmpty = 26002, "OS_ERR_Q_EMPTY";
        QMax = 26003, "OS_ERR_Q_MAX";
        QSize = 26004, "OS_ERR_Q_SIZE";
        R = 27000, "OS_ERR_R";
        RegIdInvalid = 27001, "OS_ERR_REG_ID_INVALID";
        RoundRobin1 = 27002, "OS_ERR_ROUND_ROBIN_1";
        RoundRobinDisabled = 27003, "OS_ERR_ROUND_ROBIN_DISABLED";
        S = 28000, "OS_ERR_S";
        SchedInvalidTimeSlice = 28001, "OS_ERR_SCHED_INVALID_TIME_SLICE";
        SchedLockIsr = 28002, "OS_ERR_SCHED_LOCK_ISR";
        SchedLocked = 28003, "OS_ERR_SCHED_LOCKED";
        SchedNotLocked = 28004, "OS_ERR_SCHED_NOT_LOCKED";
        SchedUnlockIsr = 28005, "OS_ERR_SCHED_UNLOCK_ISR";
        SemOvf = 28101, "OS_ERR_SEM_OVF";
        SetIsr = 28102, "OS_ERR_SET_ISR";
        StatResetIsr = 28201, "OS_ERR_STAT_RESET_ISR";
        StatPrioInvalid = 28202, "OS_ERR_STAT_PRIO_INVALID";
        StatStkInvalid = 28203, "OS_ERR_STAT_STK_INVALID";
        StatStkSizeInvalid = 28204, "OS_ERR_STAT_STK_SIZE_INVALID";
        StateInvalid = 28205, "OS_ERR_STATE_INVALID";
        StatusInvalid = 28206, "OS_ERR_STATUS_INVALID";
        StkInvalid = 28207, "OS_ERR_STK_INVALID";
        StkSizeInvalid = 28208, "OS_ERR_STK_SIZE_INVALID";
        StkLimitInvalid = 28209, "OS_ERR_STK_LIMIT_INVALID";
        T = 29000, "OS_ERR_T";
        TaskChangePrioIsr = 29001, "OS_ERR_TASK_CHANGE_PRIO_ISR";
        TaskCreateIsr = 29002, "OS_ERR_TASK_CREATE_ISR";
        TaskDel = 29003, "OS_ERR_TASK_DEL";
        TaskDelIdle = 29004, "OS_ERR_TASK_DEL_IDLE";
        TaskDelInvalid = 29005, "OS_ERR_TASK_DEL_INVALID";
        TaskDelIsr = 29006, "OS_ERR_TASK_DEL_ISR";
        TaskInvalid = 29007, "OS_ERR_TASK_INVALID";
        TaskNoMoreTcb = 29008, "OS_ERR_TASK_NO_MORE_TCB";
        TaskNotDly = 29009, "OS_ERR_TASK_NOT_DLY";
        TaskNotExist = 29010, "OS_ERR_TASK_NOT_EXIST";
        TaskNotSuspended = 29011, "OS_ERR_TASK_NOT_SUSPENDED";
        TaskOpt = 29012, "OS_ERR_TASK_OPT";
        TaskResumeIsr = 29013, "OS_ERR_TASK_RESUME_ISR";
        TaskResumePrio = 29014, "OS_ERR_TASK_RESUME_PRIO";
        TaskResumeSelf = 29015, "OS_ERR_TASK_RESUME_SELF";
        TaskRunning = 29016, "OS_ERR_TASK_RUNNING";
        TaskStkChkIsr = 29017, "OS_ERR_TASK_STK_CHK_ISR";
        TaskSuspended = 29018, "OS_ERR_TASK_SUSPENDED";
        TaskSuspendIdle = 29019, "OS_ERR_TASK_SUSPEND_IDLE";
        TaskSuspendIntHandler = 29020, "OS_ERR_TASK_SUSPEND_INT_HANDLER";
        TaskSuspendIsr = 29021, "OS_ERR_TASK_SUSPEND_ISR";
        TaskSuspendPrio = 29022, "OS_ERR_TASK_SUSPEND_PRIO";
        TaskWaiting = 29023, "OS_ERR_TASK_WAITING";
        TcbInvalid = 29101, "OS_ERR_TCB_INVALID";
        TlsIdInvalid = 29120, "OS_ERR_TLS_ID_INVALID";
        TlsIsr = 29121, "OS_ERR_TLS_ISR";
        TlsNoMoreAvail = 29122, "OS_ERR_TLS_NO_MORE_AVAIL";
        TlsNotEn = 29123, "OS_ERR_TLS_NOT_EN";
        TlsDestructAssigned = 29124, "OS_ERR_TLS_DESTRUCT_ASSIGNED";
        TickPrioInvalid = 29201, "OS_ERR_TICK_PRIO_INVALID";
        TickStkInvalid = 29202, "OS_ERR_TICK_STK_INVALID";
        TickStkSizeInvalid = 29203, "OS_ERR_TICK_STK_SIZE_INVALID";
        TickWheelSize = 29204, "OS_ERR_TICK_WHEEL_SIZE";
        TimeDlyIsr = 29301, "OS_ERR_TIME_DLY_ISR";
        TimeDlyResumeIsr = 29302, "OS_ERR_TIME_DLY_RESUME_ISR";
        TimeGetIsr = 29303, "OS_ERR_TIME_GET_ISR";
        TimeInvalidHours = 29304, "OS_ERR_TIME_INVALID_HOURS";
        TimeInvalidMinutes = 29305, "OS_ERR_TIME_INVALID_MINUTES";
        TimeInvalidSeconds = 29306, "OS_ERR_TIME_INVALID_SECONDS";
        TimeInvalidMilliseconds = 29307, "OS_ERR_TIME_INVALID_MILLISECONDS";
        TimeNotDly = 29308, "OS_ERR_TIME_NOT_DLY";
        TimeSetIsr = 29309, "OS_ERR_TIME_SET_ISR";
        TimeZeroDly = 29310, "OS_ERR_TIME_ZERO_DLY";
        Timeout = 29401, "OS_ERR_TIMEOUT";
        TmrInactive = 29501, "OS_ERR_TMR_INACTIVE";
        TmrInvalidDest = 29502, "OS_ERR_TMR_INVALID_DEST";
        TmrInvalidDly = 29503, "OS_ERR_TMR_INVALID_DLY";
        TmrInvalidPeriod = 29504, "OS_ERR_TMR_INVALID_PERIOD";
        TmrInvalidState = 29505, "OS_ERR_TMR_INVALID_STATE";
        TmrInvalid = 29506, "OS_ERR_TMR_INVALID";
        TmrIsr = 29507, "OS_ERR_TMR_ISR";
        TmrNoCallback = 29508, "OS_ERR_TMR_NO_CALLBACK";
        TmrNonAvail = 29509, "OS_ERR_TMR_NON_AVAIL";
        TmrPrioInvalid = 29510, "OS_ERR_TMR_PRIO_INVALID";
        TmrStkInvalid = 29511, "OS_ERR_TMR_STK_INVALID";
        TmrStkSizeInvalid = 29512, "OS_ERR_TMR_STK_SIZE_INVALID";
        TmrStopped = 29513, "OS_ERR_TMR_STOPPED";
        U = 30000, "OS_ERR_U";
        V = 31000, "OS_ERR_V";
        W = 32000, "OS_ERR_W";
        X = 33000, "OS_ERR_X";
        Y = 34000, "OS_ERR_Y";
        YieldIsr = 34001, "OS_ERR_YIELD_ISR";
        Z = 35000, "OS_ERR_Z";
        Rt = 36000, "OS_ERR_RT";
        RtError = 36001, "OS_ERR_RT_ERROR";
        RtEempty = 36002, "OS_ERR_RT_EEMPTY";
        RtEnomem = 36003, "OS_ERR_RT_ENOMEM";
        RtEnosys = 36004, "OS_ERR_RT_ENOSYS";
        RtEbusy = 36005, "OS_ERR_RT_EBUSY";
        RtEio = 36006, "OS_ERR_RT_EIO";
        RtEintr = 36007, "OS_ERR_RT_EINTR";
}

impl OsErr {
    /// Numeric guest code
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Whether this is `OsErr::None`
    pub const fn is_ok(self) -> bool {
        matches!(self, OsErr::None)
    }

    /// Translates a host outcome
    ///
    /// Success becomes `OsErr::None`; failures go through the table in
    /// `From<HostError>`.
    pub fn from_host<T>(result: &HostResult<T>) -> OsErr {
        match result {
            Ok(_) => OsErr::None,
            Err(e) => OsErr::from(*e),
        }
    }

    /// Translates a raw host status code
    ///
    /// Total: codes the host is not known to produce land in `RtError`.
    pub fn from_host_code(code: i32) -> OsErr {
        match HostError::from_code(code) {
            Some(result) => OsErr::from_host(&result),
            None => OsErr::RtError,
        }
    }
}

impl From<HostError> for OsErr {
    fn from(e: HostError) -> Self {
        match e {
            HostError::TimedOut => OsErr::Timeout,
            HostError::Full => OsErr::QMax,
            HostError::Empty => OsErr::RtEempty,
            HostError::NoMemory => OsErr::RtEnomem,
            HostError::NoSystem => OsErr::RtEnosys,
            HostError::Busy => OsErr::RtEbusy,
            HostError::Io => OsErr::RtEio,
            HostError::Interrupted => OsErr::RtEintr,
            HostError::Error | HostError::InvalidArgument => OsErr::RtError,
        }
    }
}

impl Default for OsErr {
    fn default() -> Self {
        OsErr::None
    }
}

impl fmt::Display for OsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
