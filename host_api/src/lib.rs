//! # Host API
//!
//! This crate defines the interface between the guest compatibility layer
//! and the real-time kernel that actually runs the system (the *host*).
//!
//! ## Philosophy
//!
//! The host kernel provides **primitives**, the compatibility layer
//! provides **translation**:
//! - Object init/detach (semaphore, mutex, event, message queue, timer, thread)
//! - Take/release/send/receive with the host's own timeout encoding
//! - Interrupt nesting and critical-section depth queries
//! - Tick and version queries
//!
//! ## Design Goals
//!
//! 1. **Testability**: the whole host can be simulated (see `sim_host`)
//! 2. **Explicitness**: global kernel state is reached through a trait, never ambiently
//! 3. **Host vocabulary**: errors, timeouts and options use the host's encodings
//!    so translation happens in exactly one place (the guest layer)
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A scheduler (the host schedules)
//! - The guest API (see `ucos_compat`)
//! - A specific kernel binding (the trait can be implemented many ways)

pub mod error;
pub mod ipc;
pub mod kernel;
pub mod object;
pub mod thread;
pub mod time;
pub mod timer;

pub use error::{HostError, HostResult};
pub use ipc::{EventOption, IpcFlag};
pub use kernel::{ExecutionContext, HostKernel};
pub use object::{HostHandle, ObjectClass};
pub use thread::{StackUsage, StackWord, ThreadConfig, ThreadEntry, STACK_FILL_WORD};
pub use time::{HostTimeout, Tick};
pub use timer::{TimerCallback, TimerMode};
