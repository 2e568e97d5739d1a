//! # uC/OS-III Compatibility Layer
//!
//! This crate lets application code written against the uC/OS-III 3.03 task
//! and synchronisation API run on top of a different real-time kernel (the
//! host, see `host_api`).
//!
//! ## Philosophy
//!
//! The host does the work, this layer does the **translation**:
//! - Call-context checks (ISR, scheduler lock) before anything else
//! - Object identity checks against the host's own object registry
//! - Option words parsed into closed types, anything else rejected
//! - Guest timeouts (0 = forever) reconciled with host timeouts (0 = poll)
//! - Host status codes mapped onto guest error codes
//!
//! Nothing here schedules, blocks or keeps a shadow copy of host state.
//!
//! ## Shape of an operation
//!
//! Guest operations keep their guest shape: an optional object reference
//! (`None` stands for a null pointer), the guest parameters, and an error
//! slot that always holds the outcome on return. Internally every step is a
//! `Result<_, OsErr>` so the first failure short-circuits and leaves the
//! object untouched.
//!
//! ```
//! use sim_host::SimulatedHost;
//! use ucos_compat::{Os, OsErr, OsSem, OS_OPT_PEND_BLOCKING, OS_OPT_POST_1};
//!
//! let mut os = Os::new(SimulatedHost::new());
//! let mut sem = OsSem::new();
//! let mut err = OsErr::None;
//!
//! os.sem_create(Some(&mut sem), Some("sem"), 1, &mut err);
//! assert_eq!(err, OsErr::None);
//!
//! let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_BLOCKING, &mut err);
//! assert_eq!((err, left), (OsErr::None, 0));
//!
//! let now = os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
//! assert_eq!((err, now), (OsErr::None, 1));
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod opt;
pub mod types;
pub mod wait;

mod flag;
mod mutex;
mod q;
mod sched;
mod sem;
mod task;
mod time;
mod tmr;

pub use config::{ConfigError, OsConfig};
pub use error::{OsErr, OsResult};
pub use flag::OsFlagGrp;
pub use identity::{GuestObject, Identity, ObjectCell};
pub use mutex::OsMutex;
pub use q::{MsgDescriptor, OsQ};
pub use sem::OsSem;
pub use task::{OsTcb, TaskParams, TaskStackUsage};
pub use time::hmsm_to_ticks;
pub use tmr::{OsTmr, OsTmrCallbackPtr, OsTmrState};
pub use types::*;
pub use wait::{translate_timeout, WaitPolicy};

use host_api::{HostHandle, HostKernel};

/// The guest kernel, bound to one host
///
/// Every guest API function is a method; the host is reached only through
/// this value.
pub struct Os<H: HostKernel> {
    host: H,
    config: OsConfig,
}

impl<H: HostKernel> Os<H> {
    /// Creates a guest kernel with the default configuration
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: OsConfig::default(),
        }
    }

    /// Creates a guest kernel with a validated configuration
    pub fn with_config(host: H, config: OsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { host, config })
    }

    /// The host this kernel runs on
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to drive a simulation
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Gives the host back
    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &OsConfig {
        &self.config
    }

    /// Handle of a live object of `T`'s class
    pub(crate) fn live<T: GuestObject>(&self, object: Option<&T>) -> OsResult<HostHandle> {
        Identity::resolve(&self.host, object.map(GuestObject::cell), T::CLASS).for_use()
    }

    /// Succeeds only for storage that holds no live object
    pub(crate) fn vacant<T: GuestObject>(&self, object: &T) -> OsResult<()> {
        Identity::resolve(&self.host, Some(object.cell()), T::CLASS).for_create()
    }

    /// Posts from interrupt context are allowed only when configured
    pub(crate) fn post_allowed(&self) -> OsResult<()> {
        if self.config.post_from_isr {
            Ok(())
        } else {
            guard::not_in_isr(&self.host, OsErr::PostIsr)
        }
    }

    /// Common prologue of semaphore, mutex and queue pends
    ///
    /// ISR, scheduler lock, identity, then the option word.
    pub(crate) fn pend_prologue<T: GuestObject>(
        &self,
        op: &str,
        object: Option<&T>,
        timeout: OsTick,
        opt: OsOpt,
    ) -> OsResult<(HostHandle, WaitPolicy)> {
        guard::may_block(&self.host, OsErr::PendIsr)?;
        let handle = self.live(object)?;
        let mode = opt::PendMode::parse(opt).ok_or_else(|| opt::rejected(op, opt))?;
        Ok((handle, WaitPolicy::from_guest(timeout, mode)))
    }

    /// Common part of the pend-abort entry points, which the host cannot honour
    pub(crate) fn pend_abort_unsupported<T: GuestObject>(
        &self,
        op: &str,
        object: Option<&T>,
    ) -> OsResult<OsObjQty> {
        guard::not_in_isr(&self.host, OsErr::PendAbortIsr)?;
        self.live(object)?;
        Err(opt::unsupported(op))
    }

    /// Common part of the delete entry points
    ///
    /// Returns the handle to detach once the delete mode is acceptable.
    pub(crate) fn del_prologue<T: GuestObject>(
        &self,
        op: &str,
        object: Option<&T>,
        opt: OsOpt,
    ) -> OsResult<HostHandle> {
        guard::not_in_isr(&self.host, OsErr::DelIsr)?;
        let handle = self.live(object)?;
        match opt::DeleteMode::parse(opt) {
            Some(opt::DeleteMode::Always) => Ok(handle),
            Some(opt::DeleteMode::NoPend) => Err(opt::unsupported(op)),
            None => Err(opt::rejected(op, opt)),
        }
    }
}

/// Writes the outcome of an operation into the caller's error slot
///
/// Failures yield the type's default (0, false, null).
pub(crate) fn settle<T: Default>(slot: &mut OsErr, result: OsResult<T>) -> T {
    match result {
        Ok(value) => {
            *slot = OsErr::None;
            value
        }
        Err(e) => {
            *slot = e;
            T::default()
        }
    }
}
