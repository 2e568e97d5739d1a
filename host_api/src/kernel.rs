//! Host kernel trait

use crate::{
    EventOption, HostHandle, HostResult, HostTimeout, IpcFlag, ObjectClass, StackUsage,
    ThreadConfig, Tick, TimerCallback, TimerMode,
};

/// Read-only view of the host's execution context
///
/// This is the global kernel state every guest operation consults before
/// doing anything else. It is split from [`HostKernel`] so that guards can be
/// exercised against any context source, not only a full kernel.
pub trait ExecutionContext {
    /// Current interrupt nesting depth (0 in task context)
    fn interrupt_nest(&self) -> u8;

    /// Current critical-section (scheduler lock) depth
    fn critical_level(&self) -> u16;
}

/// The host kernel trait
///
/// This defines every host primitive the compatibility layer consumes.
/// Multiple implementations are possible:
/// - Simulated host (for testing)
/// - Bindings to a real kernel
///
/// # Contract
///
/// **Host semantics**: all timeouts, options and errors use the host's own
/// vocabulary. No guest concepts leak into this trait.
///
/// **Object lifetime**: `*_init` issues a handle; `*_detach` retires it.
/// After detach, [`HostKernel::object_class`] returns `None` for that handle
/// and every other primitive fails with [`crate::HostError::Error`].
///
/// **Blocking**: only the take/receive/delay primitives may suspend the
/// caller, and only within the given [`HostTimeout`].
pub trait HostKernel: ExecutionContext {
    // ---------------------------------------------------------------------
    // Interrupts, scheduler, time
    // ---------------------------------------------------------------------

    /// Notifies the host that an interrupt service routine starts
    fn interrupt_enter(&mut self);

    /// Notifies the host that an interrupt service routine ends
    fn interrupt_leave(&mut self);

    /// Enters a critical section (locks the scheduler, nests)
    fn enter_critical(&mut self);

    /// Leaves one level of critical section
    fn exit_critical(&mut self);

    /// Runs the scheduler
    fn schedule(&mut self);

    /// Host kernel version number
    fn version(&self) -> u32;

    /// Current tick count
    fn tick_get(&self) -> Tick;

    /// Overwrites the tick count
    fn tick_set(&mut self, tick: Tick);

    /// Ticks per second
    fn tick_per_second(&self) -> u32;

    /// Number of priority levels (valid priorities are `0..max_priority`)
    fn max_priority(&self) -> u8;

    /// Returns the class of the live object behind `handle`, if any
    fn object_class(&self, handle: HostHandle) -> Option<ObjectClass>;

    // ---------------------------------------------------------------------
    // Semaphores
    // ---------------------------------------------------------------------

    /// Initialises a counting semaphore
    fn sem_init(&mut self, name: &str, value: u32, flag: IpcFlag) -> HostResult<HostHandle>;

    /// Detaches a semaphore, waking every waiter
    fn sem_detach(&mut self, sem: HostHandle) -> HostResult<()>;

    /// Takes a semaphore
    fn sem_take(&mut self, sem: HostHandle, timeout: HostTimeout) -> HostResult<()>;

    /// Releases a semaphore (wakes the first waiter)
    fn sem_release(&mut self, sem: HostHandle) -> HostResult<()>;

    /// Current semaphore count
    fn sem_value(&self, sem: HostHandle) -> HostResult<u32>;

    // ---------------------------------------------------------------------
    // Mutexes
    // ---------------------------------------------------------------------

    /// Initialises a mutex
    fn mutex_init(&mut self, name: &str, flag: IpcFlag) -> HostResult<HostHandle>;

    /// Detaches a mutex
    fn mutex_detach(&mut self, mutex: HostHandle) -> HostResult<()>;

    /// Takes a mutex (recursive for the owner)
    fn mutex_take(&mut self, mutex: HostHandle, timeout: HostTimeout) -> HostResult<()>;

    /// Releases a mutex; fails for any thread other than the owner
    fn mutex_release(&mut self, mutex: HostHandle) -> HostResult<()>;

    /// Current owner, if held
    fn mutex_owner(&self, mutex: HostHandle) -> HostResult<Option<HostHandle>>;

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Initialises an event set with all bits clear
    fn event_init(&mut self, name: &str, flag: IpcFlag) -> HostResult<HostHandle>;

    /// Detaches an event set
    fn event_detach(&mut self, event: HostHandle) -> HostResult<()>;

    /// Sets bits in an event set
    fn event_send(&mut self, event: HostHandle, set: u32) -> HostResult<()>;

    /// Waits for bits in an event set
    ///
    /// Returns the requested bits that were set at the moment the wait was
    /// satisfied (before any clear-on-read).
    fn event_recv(
        &mut self,
        event: HostHandle,
        set: u32,
        option: EventOption,
        timeout: HostTimeout,
    ) -> HostResult<u32>;

    /// Current bit pattern
    fn event_value(&self, event: HostHandle) -> HostResult<u32>;

    // ---------------------------------------------------------------------
    // Message queues
    // ---------------------------------------------------------------------

    /// Initialises a message queue of `max_msgs` records of `msg_size` bytes
    fn mq_init(
        &mut self,
        name: &str,
        msg_size: usize,
        max_msgs: usize,
        flag: IpcFlag,
    ) -> HostResult<HostHandle>;

    /// Detaches a message queue
    fn mq_detach(&mut self, mq: HostHandle) -> HostResult<()>;

    /// Copies `buffer` into a record at the back of the queue
    fn mq_send(&mut self, mq: HostHandle, buffer: &[u8]) -> HostResult<()>;

    /// Copies `buffer` into a record at the front of the queue
    fn mq_urgent(&mut self, mq: HostHandle, buffer: &[u8]) -> HostResult<()>;

    /// Copies the front record into `buffer`
    fn mq_recv(&mut self, mq: HostHandle, buffer: &mut [u8], timeout: HostTimeout)
        -> HostResult<()>;

    /// Discards every queued record
    fn mq_reset(&mut self, mq: HostHandle) -> HostResult<()>;

    /// Number of queued records
    fn mq_entries(&self, mq: HostHandle) -> HostResult<usize>;

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    /// Initialises a stopped timer that fires every `ticks`
    fn timer_init(
        &mut self,
        name: &str,
        callback: TimerCallback,
        parameter: usize,
        ticks: Tick,
        mode: TimerMode,
    ) -> HostResult<HostHandle>;

    /// Detaches a timer
    fn timer_detach(&mut self, timer: HostHandle) -> HostResult<()>;

    /// (Re)starts a timer
    fn timer_start(&mut self, timer: HostHandle) -> HostResult<()>;

    /// Stops a running timer; fails if it is not running
    fn timer_stop(&mut self, timer: HostHandle) -> HostResult<()>;

    /// Ticks until the next expiry (0 when stopped)
    fn timer_remaining(&self, timer: HostHandle) -> HostResult<Tick>;

    /// Whether the timer is running
    fn timer_is_active(&self, timer: HostHandle) -> HostResult<bool>;

    // ---------------------------------------------------------------------
    // Threads
    // ---------------------------------------------------------------------

    /// Initialises a thread (not yet runnable)
    fn thread_init(&mut self, config: ThreadConfig) -> HostResult<HostHandle>;

    /// Makes an initialised thread runnable
    fn thread_startup(&mut self, thread: HostHandle) -> HostResult<()>;

    /// Detaches a thread
    fn thread_detach(&mut self, thread: HostHandle) -> HostResult<()>;

    /// The calling thread
    fn thread_self(&self) -> Option<HostHandle>;

    /// Suspends a thread
    fn thread_suspend(&mut self, thread: HostHandle) -> HostResult<()>;

    /// Resumes a suspended thread; fails if it is not suspended
    fn thread_resume(&mut self, thread: HostHandle) -> HostResult<()>;

    /// Gives up the processor to a thread of equal priority
    fn thread_yield(&mut self) -> HostResult<()>;

    /// Suspends the calling thread for `ticks`
    fn thread_delay(&mut self, ticks: Tick) -> HostResult<()>;

    /// Changes a thread's priority
    fn thread_set_priority(&mut self, thread: HostHandle, priority: u8) -> HostResult<()>;

    /// Changes a thread's round-robin time slice
    fn thread_set_time_slice(&mut self, thread: HostHandle, ticks: Tick) -> HostResult<()>;

    /// Stack usage of a thread
    fn thread_stack_usage(&self, thread: HostHandle) -> HostResult<StackUsage>;
}
