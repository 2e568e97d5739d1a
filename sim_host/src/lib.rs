//! # Simulated Host
//!
//! This crate provides a simulated implementation of the host kernel API.
//!
//! ## Purpose
//!
//! The simulated host allows testing the guest layer without a real kernel:
//! - Runs under `cargo test`
//! - Deterministic (controlled ticks, no real concurrency)
//! - Fast (no context switches)
//! - Inspectable (all state is accessible)
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! There is only ever one running thread in the simulation. A blocking
//! primitive that cannot complete immediately advances simulated time tick
//! by tick, delivering scheduled events (posts "from other tasks") and
//! firing timers, until it is satisfied or its timeout expires. A wait that
//! nothing scheduled could ever satisfy fails instead of hanging the test.

pub mod fault_injection;
pub mod host_audit;
pub mod message_queue;
pub mod test_utils;

use fault_injection::{HostFaultInjector, HostFaultPlan, HostOp};
use host_api::{
    EventOption, ExecutionContext, HostError, HostHandle, HostKernel, HostResult, HostTimeout,
    IpcFlag, ObjectClass, StackUsage, StackWord, ThreadConfig, ThreadEntry, Tick, TimerCallback,
    TimerMode, STACK_FILL_WORD,
};
use host_audit::{HostAuditLog, HostCall};
use message_queue::{QueueError, RecordQueue};
use std::collections::HashMap;

/// Ticks per second unless configured otherwise
pub const DEFAULT_TICK_PER_SECOND: u32 = 1000;

/// Priority levels unless configured otherwise
pub const DEFAULT_MAX_PRIORITY: u8 = 32;

/// Reported kernel version (3.1.3)
pub const DEFAULT_VERSION: u32 = 30103;

/// Largest count a host semaphore can hold
pub const SEM_VALUE_MAX: u32 = 0xFFFF;

/// Stack words given to the built-in main thread
const MAIN_STACK_WORDS: usize = 256;

/// Something "another task" does at a later tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// Release a semaphore once
    ReleaseSemaphore(HostHandle),
    /// Set bits in an event set
    SendEvent(HostHandle, u32),
    /// Enqueue a record on a message queue
    SendMessage(HostHandle, Vec<u8>),
    /// Force a mutex free, whoever holds it
    ReleaseMutex(HostHandle),
}

/// Lifecycle state of a simulated thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Initialised, not started
    Init,
    /// Runnable
    Ready,
    /// Suspended
    Suspended,
}

/// Simulated host kernel
///
/// This maintains all the state of the host. Unlike a real kernel, this
/// state is directly accessible for testing.
pub struct SimulatedHost {
    /// Live objects
    objects: HashMap<HostHandle, SimObject>,
    /// Next handle to issue
    next_handle: u32,
    /// The thread that is "running"
    current: HostHandle,
    /// Built-in thread the simulation starts in
    main_thread: HostHandle,
    interrupt_nest: u8,
    critical_level: u16,
    /// Kernel tick counter (settable)
    tick: Tick,
    /// Monotonic ticks since creation; deadlines are measured against this
    elapsed: u64,
    tick_per_second: u32,
    max_priority: u8,
    version: u32,
    /// Events waiting for their tick
    scheduled: Vec<ScheduledEvent>,
    fault_injector: Option<HostFaultInjector>,
    audit: HostAuditLog,
}

enum SimObject {
    Semaphore(SimSemaphore),
    Mutex(SimMutex),
    Event(SimEventSet),
    MessageQueue(SimMessageQueue),
    Timer(SimTimer),
    Thread(SimThread),
}

struct SimSemaphore {
    name: String,
    value: u32,
}

struct SimMutex {
    name: String,
    owner: Option<HostHandle>,
    hold: u32,
}

struct SimEventSet {
    name: String,
    set: u32,
}

struct SimMessageQueue {
    name: String,
    queue: RecordQueue,
}

struct SimTimer {
    name: String,
    callback: TimerCallback,
    parameter: usize,
    period: Tick,
    mode: TimerMode,
    active: bool,
    deadline: u64,
}

struct SimThread {
    name: String,
    entry: Option<ThreadEntry>,
    parameter: usize,
    stack: &'static mut [StackWord],
    priority: u8,
    time_slice: Tick,
    state: ThreadState,
}

struct ScheduledEvent {
    event: SimEvent,
    deliver_at: u64,
}

impl SimObject {
    fn class(&self) -> ObjectClass {
        match self {
            SimObject::Semaphore(_) => ObjectClass::Semaphore,
            SimObject::Mutex(_) => ObjectClass::Mutex,
            SimObject::Event(_) => ObjectClass::Event,
            SimObject::MessageQueue(_) => ObjectClass::MessageQueue,
            SimObject::Timer(_) => ObjectClass::Timer,
            SimObject::Thread(_) => ObjectClass::Thread,
        }
    }

    fn name(&self) -> &str {
        match self {
            SimObject::Semaphore(o) => &o.name,
            SimObject::Mutex(o) => &o.name,
            SimObject::Event(o) => &o.name,
            SimObject::MessageQueue(o) => &o.name,
            SimObject::Timer(o) => &o.name,
            SimObject::Thread(o) => &o.name,
        }
    }
}

impl SimulatedHost {
    /// Creates a new simulated host running its built-in main thread
    pub fn new() -> Self {
        let main_thread = HostHandle::from_raw(1);
        let stack: &'static mut [StackWord] =
            Box::leak(vec![STACK_FILL_WORD; MAIN_STACK_WORDS].into_boxed_slice());
        let mut objects = HashMap::new();
        objects.insert(
            main_thread,
            SimObject::Thread(SimThread {
                name: "main".to_string(),
                entry: None,
                parameter: 0,
                stack,
                priority: DEFAULT_MAX_PRIORITY / 3,
                time_slice: DEFAULT_TICK_PER_SECOND / 100,
                state: ThreadState::Ready,
            }),
        );

        Self {
            objects,
            next_handle: 2,
            current: main_thread,
            main_thread,
            interrupt_nest: 0,
            critical_level: 0,
            tick: 0,
            elapsed: 0,
            tick_per_second: DEFAULT_TICK_PER_SECOND,
            max_priority: DEFAULT_MAX_PRIORITY,
            version: DEFAULT_VERSION,
            scheduled: Vec::new(),
            fault_injector: None,
            audit: HostAuditLog::new(),
        }
    }

    /// Sets the tick rate
    pub fn with_tick_rate(mut self, tick_per_second: u32) -> Self {
        self.tick_per_second = tick_per_second;
        self
    }

    /// Sets the number of priority levels
    pub fn with_max_priority(mut self, max_priority: u8) -> Self {
        self.max_priority = max_priority;
        self
    }

    /// Sets the reported kernel version
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the fault injector for this host
    pub fn with_fault_injector(mut self, injector: HostFaultInjector) -> Self {
        self.fault_injector = Some(injector);
        self
    }

    /// Sets the fault plan for this host
    ///
    /// Convenience method that creates a fault injector from a plan.
    pub fn with_fault_plan(self, plan: HostFaultPlan) -> Self {
        self.with_fault_injector(HostFaultInjector::new(plan))
    }

    /// The built-in thread the simulation starts in
    pub fn main_thread(&self) -> HostHandle {
        self.main_thread
    }

    /// Makes `thread` the running thread
    ///
    /// Used to act as "another task", e.g. to take a mutex the main thread
    /// will then fail to release.
    pub fn set_current_thread(&mut self, thread: HostHandle) {
        self.current = thread;
    }

    /// Schedules `event` to happen `ticks` from now
    pub fn schedule_in(&mut self, ticks: Tick, event: SimEvent) {
        self.scheduled.push(ScheduledEvent {
            event,
            deliver_at: self.elapsed + u64::from(ticks),
        });
    }

    /// Advances simulated time, delivering events and firing timers
    pub fn advance_ticks(&mut self, ticks: Tick) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Ticks elapsed since creation (unaffected by `tick_set`)
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Checks if no scheduled event is pending
    pub fn is_idle(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Returns the number of live objects, threads included
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Name an object was initialised with
    pub fn object_name(&self, handle: HostHandle) -> Option<&str> {
        self.objects.get(&handle).map(SimObject::name)
    }

    /// Returns a reference to the host call audit log
    pub fn audit_log(&self) -> &HostAuditLog {
        &self.audit
    }

    /// Forgets every recorded host call
    pub fn clear_audit_log(&mut self) {
        self.audit.clear();
    }

    /// Lifecycle state of a thread
    pub fn thread_state(&self, thread: HostHandle) -> Option<ThreadState> {
        self.thread(thread).ok().map(|t| t.state)
    }

    /// Current priority of a thread
    pub fn thread_priority(&self, thread: HostHandle) -> Option<u8> {
        self.thread(thread).ok().map(|t| t.priority)
    }

    /// Current time slice of a thread
    pub fn thread_time_slice(&self, thread: HostHandle) -> Option<Tick> {
        self.thread(thread).ok().map(|t| t.time_slice)
    }

    /// Mutable access to a thread's stack, to simulate usage
    pub fn thread_stack_mut(&mut self, thread: HostHandle) -> Option<&mut [StackWord]> {
        self.thread_mut(thread).ok().map(|t| &mut *t.stack)
    }

    /// Runs a thread's entry point once with its parameter
    ///
    /// Returns `false` if the thread does not exist or has no entry.
    pub fn run_thread_entry(&mut self, thread: HostHandle) -> bool {
        let Ok(t) = self.thread(thread) else {
            return false;
        };
        let (entry, parameter) = (t.entry, t.parameter);
        match entry {
            Some(entry) => {
                let previous = self.current;
                self.current = thread;
                entry(parameter);
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Logs, audits and applies fault injection for one primitive
    fn enter(&mut self, call: HostCall) -> HostResult<()> {
        log::trace!(
            "host {:?} handle={:?} timeout={:?} tick={}",
            call.op,
            call.handle,
            call.timeout,
            self.tick
        );
        self.audit.record(self.tick, call);
        match self.fault_injector.as_mut() {
            Some(injector) => injector.check(call.op),
            None => Ok(()),
        }
    }

    fn issue(&mut self, object: SimObject) -> HostHandle {
        let handle = HostHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(handle, object);
        handle
    }

    fn detach(&mut self, handle: HostHandle, class: ObjectClass) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::Detach, handle))?;
        if self.object_class(handle) != Some(class) {
            return Err(HostError::Error);
        }
        self.objects.remove(&handle);
        Ok(())
    }

    /// One tick: deliver due events, then fire due timers
    fn step(&mut self) {
        self.elapsed += 1;
        self.tick = self.tick.wrapping_add(1);
        self.process_scheduled_events();
        self.fire_timers();
    }

    fn process_scheduled_events(&mut self) {
        let now = self.elapsed;
        let mut ready = Vec::new();

        self.scheduled.retain(|scheduled| {
            if scheduled.deliver_at <= now {
                ready.push(scheduled.event.clone());
                false
            } else {
                true
            }
        });

        for event in ready {
            self.deliver(event);
        }
    }

    fn deliver(&mut self, event: SimEvent) {
        let delivered = match &event {
            SimEvent::ReleaseSemaphore(h) => match self.objects.get_mut(h) {
                Some(SimObject::Semaphore(s)) if s.value < SEM_VALUE_MAX => {
                    s.value += 1;
                    true
                }
                _ => false,
            },
            SimEvent::SendEvent(h, bits) => match self.objects.get_mut(h) {
                Some(SimObject::Event(e)) => {
                    e.set |= *bits;
                    true
                }
                _ => false,
            },
            SimEvent::SendMessage(h, record) => match self.objects.get_mut(h) {
                Some(SimObject::MessageQueue(q)) => q.queue.push(record).is_ok(),
                _ => false,
            },
            SimEvent::ReleaseMutex(h) => match self.objects.get_mut(h) {
                Some(SimObject::Mutex(m)) => {
                    m.owner = None;
                    m.hold = 0;
                    true
                }
                _ => false,
            },
        };
        if !delivered {
            log::warn!("scheduled {:?} could not be delivered", event);
        }
    }

    fn fire_timers(&mut self) {
        let now = self.elapsed;
        let mut due: Vec<HostHandle> = self
            .objects
            .iter()
            .filter_map(|(h, o)| match o {
                SimObject::Timer(t) if t.active && t.deadline <= now => Some(*h),
                _ => None,
            })
            .collect();
        due.sort();

        for handle in due {
            if let Some(SimObject::Timer(t)) = self.objects.get_mut(&handle) {
                match t.mode {
                    TimerMode::OneShot => t.active = false,
                    TimerMode::Periodic => t.deadline = now + u64::from(t.period),
                }
                log::trace!("timer {} fired at tick {}", handle, self.tick);
                (t.callback)(t.parameter);
            }
        }
    }

    /// Retries `attempt` as simulated time passes, within `timeout`
    ///
    /// `attempt` returns `None` while the caller would stay blocked.
    fn block_on<T>(
        &mut self,
        timeout: HostTimeout,
        what: &str,
        mut attempt: impl FnMut(&mut Self) -> Option<HostResult<T>>,
    ) -> HostResult<T> {
        if let Some(result) = attempt(self) {
            return result;
        }

        match timeout.bound() {
            Some(ticks) => {
                for _ in 0..ticks {
                    self.step();
                    if let Some(result) = attempt(self) {
                        return result;
                    }
                }
                Err(HostError::TimedOut)
            }
            None => loop {
                let Some(next) = self.scheduled.iter().map(|s| s.deliver_at).min() else {
                    log::warn!("{} would block forever; nothing scheduled can satisfy it", what);
                    return Err(HostError::Error);
                };
                while self.elapsed < next {
                    self.step();
                }
                if let Some(result) = attempt(self) {
                    return result;
                }
            },
        }
    }

    fn semaphore_mut(&mut self, h: HostHandle) -> HostResult<&mut SimSemaphore> {
        match self.objects.get_mut(&h) {
            Some(SimObject::Semaphore(s)) => Ok(s),
            _ => Err(HostError::Error),
        }
    }

    fn mutex_mut(&mut self, h: HostHandle) -> HostResult<&mut SimMutex> {
        match self.objects.get_mut(&h) {
            Some(SimObject::Mutex(m)) => Ok(m),
            _ => Err(HostError::Error),
        }
    }

    fn event_mut(&mut self, h: HostHandle) -> HostResult<&mut SimEventSet> {
        match self.objects.get_mut(&h) {
            Some(SimObject::Event(e)) => Ok(e),
            _ => Err(HostError::Error),
        }
    }

    fn mq_mut(&mut self, h: HostHandle) -> HostResult<&mut SimMessageQueue> {
        match self.objects.get_mut(&h) {
            Some(SimObject::MessageQueue(q)) => Ok(q),
            _ => Err(HostError::Error),
        }
    }

    fn timer(&self, h: HostHandle) -> HostResult<&SimTimer> {
        match self.objects.get(&h) {
            Some(SimObject::Timer(t)) => Ok(t),
            _ => Err(HostError::Error),
        }
    }

    fn timer_mut(&mut self, h: HostHandle) -> HostResult<&mut SimTimer> {
        match self.objects.get_mut(&h) {
            Some(SimObject::Timer(t)) => Ok(t),
            _ => Err(HostError::Error),
        }
    }

    fn thread(&self, h: HostHandle) -> HostResult<&SimThread> {
        match self.objects.get(&h) {
            Some(SimObject::Thread(t)) => Ok(t),
            _ => Err(HostError::Error),
        }
    }

    fn thread_mut(&mut self, h: HostHandle) -> HostResult<&mut SimThread> {
        match self.objects.get_mut(&h) {
            Some(SimObject::Thread(t)) => Ok(t),
            _ => Err(HostError::Error),
        }
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for SimulatedHost {
    fn interrupt_nest(&self) -> u8 {
        self.interrupt_nest
    }

    fn critical_level(&self) -> u16 {
        self.critical_level
    }
}

impl HostKernel for SimulatedHost {
    fn interrupt_enter(&mut self) {
        self.interrupt_nest = self.interrupt_nest.saturating_add(1);
    }

    fn interrupt_leave(&mut self) {
        self.interrupt_nest = self.interrupt_nest.saturating_sub(1);
    }

    fn enter_critical(&mut self) {
        self.critical_level = self.critical_level.saturating_add(1);
    }

    fn exit_critical(&mut self) {
        self.critical_level = self.critical_level.saturating_sub(1);
    }

    fn schedule(&mut self) {
        log::trace!("host schedule at tick {}", self.tick);
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn tick_get(&self) -> Tick {
        self.tick
    }

    fn tick_set(&mut self, tick: Tick) {
        self.tick = tick;
    }

    fn tick_per_second(&self) -> u32 {
        self.tick_per_second
    }

    fn max_priority(&self) -> u8 {
        self.max_priority
    }

    fn object_class(&self, handle: HostHandle) -> Option<ObjectClass> {
        self.objects.get(&handle).map(SimObject::class)
    }

    // Semaphores

    fn sem_init(&mut self, name: &str, value: u32, _flag: IpcFlag) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::SemInit))?;
        if value > SEM_VALUE_MAX {
            return Err(HostError::InvalidArgument);
        }
        Ok(self.issue(SimObject::Semaphore(SimSemaphore {
            name: name.to_string(),
            value,
        })))
    }

    fn sem_detach(&mut self, sem: HostHandle) -> HostResult<()> {
        self.detach(sem, ObjectClass::Semaphore)
    }

    fn sem_take(&mut self, sem: HostHandle, timeout: HostTimeout) -> HostResult<()> {
        self.enter(HostCall::with_timeout(HostOp::SemTake, sem, timeout))?;
        self.block_on(timeout, "semaphore take", |host| {
            let s = match host.semaphore_mut(sem) {
                Ok(s) => s,
                Err(e) => return Some(Err(e)),
            };
            if s.value > 0 {
                s.value -= 1;
                Some(Ok(()))
            } else {
                None
            }
        })
    }

    fn sem_release(&mut self, sem: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::SemRelease, sem))?;
        let s = self.semaphore_mut(sem)?;
        if s.value >= SEM_VALUE_MAX {
            return Err(HostError::Full);
        }
        s.value += 1;
        Ok(())
    }

    fn sem_value(&self, sem: HostHandle) -> HostResult<u32> {
        match self.objects.get(&sem) {
            Some(SimObject::Semaphore(s)) => Ok(s.value),
            _ => Err(HostError::Error),
        }
    }

    // Mutexes

    fn mutex_init(&mut self, name: &str, _flag: IpcFlag) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::MutexInit))?;
        Ok(self.issue(SimObject::Mutex(SimMutex {
            name: name.to_string(),
            owner: None,
            hold: 0,
        })))
    }

    fn mutex_detach(&mut self, mutex: HostHandle) -> HostResult<()> {
        self.detach(mutex, ObjectClass::Mutex)
    }

    fn mutex_take(&mut self, mutex: HostHandle, timeout: HostTimeout) -> HostResult<()> {
        self.enter(HostCall::with_timeout(HostOp::MutexTake, mutex, timeout))?;
        self.block_on(timeout, "mutex take", |host| {
            let me = host.current;
            let m = match host.mutex_mut(mutex) {
                Ok(m) => m,
                Err(e) => return Some(Err(e)),
            };
            match m.owner {
                None => {
                    m.owner = Some(me);
                    m.hold = 1;
                    Some(Ok(()))
                }
                Some(owner) if owner == me => {
                    m.hold += 1;
                    Some(Ok(()))
                }
                Some(_) => None,
            }
        })
    }

    fn mutex_release(&mut self, mutex: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::MutexRelease, mutex))?;
        let me = self.current;
        let m = self.mutex_mut(mutex)?;
        if m.owner != Some(me) {
            return Err(HostError::Error);
        }
        m.hold -= 1;
        if m.hold == 0 {
            m.owner = None;
        }
        Ok(())
    }

    fn mutex_owner(&self, mutex: HostHandle) -> HostResult<Option<HostHandle>> {
        match self.objects.get(&mutex) {
            Some(SimObject::Mutex(m)) => Ok(m.owner),
            _ => Err(HostError::Error),
        }
    }

    // Events

    fn event_init(&mut self, name: &str, _flag: IpcFlag) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::EventInit))?;
        Ok(self.issue(SimObject::Event(SimEventSet {
            name: name.to_string(),
            set: 0,
        })))
    }

    fn event_detach(&mut self, event: HostHandle) -> HostResult<()> {
        self.detach(event, ObjectClass::Event)
    }

    fn event_send(&mut self, event: HostHandle, set: u32) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::EventSend, event))?;
        if set == 0 {
            return Err(HostError::Error);
        }
        self.event_mut(event)?.set |= set;
        Ok(())
    }

    fn event_recv(
        &mut self,
        event: HostHandle,
        set: u32,
        option: EventOption,
        timeout: HostTimeout,
    ) -> HostResult<u32> {
        self.enter(HostCall::with_timeout(HostOp::EventRecv, event, timeout))?;
        if !option.is_well_formed() {
            return Err(HostError::InvalidArgument);
        }
        if set == 0 {
            return Err(HostError::Error);
        }
        self.block_on(timeout, "event receive", |host| {
            let e = match host.event_mut(event) {
                Ok(e) => e,
                Err(err) => return Some(Err(err)),
            };
            let satisfied = if option.contains(EventOption::AND) {
                e.set & set == set
            } else {
                e.set & set != 0
            };
            if !satisfied {
                return None;
            }
            let recved = e.set & set;
            if option.contains(EventOption::CLEAR) {
                e.set &= !set;
            }
            Some(Ok(recved))
        })
    }

    fn event_value(&self, event: HostHandle) -> HostResult<u32> {
        match self.objects.get(&event) {
            Some(SimObject::Event(e)) => Ok(e.set),
            _ => Err(HostError::Error),
        }
    }

    // Message queues

    fn mq_init(
        &mut self,
        name: &str,
        msg_size: usize,
        max_msgs: usize,
        _flag: IpcFlag,
    ) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::MqInit))?;
        if msg_size == 0 || max_msgs == 0 {
            return Err(HostError::InvalidArgument);
        }
        Ok(self.issue(SimObject::MessageQueue(SimMessageQueue {
            name: name.to_string(),
            queue: RecordQueue::with_capacity(max_msgs, msg_size),
        })))
    }

    fn mq_detach(&mut self, mq: HostHandle) -> HostResult<()> {
        self.detach(mq, ObjectClass::MessageQueue)
    }

    fn mq_send(&mut self, mq: HostHandle, buffer: &[u8]) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::MqSend, mq))?;
        self.mq_mut(mq)?.queue.push(buffer).map_err(|e| match e {
            QueueError::Full => HostError::Full,
            QueueError::Oversized => HostError::Error,
        })
    }

    fn mq_urgent(&mut self, mq: HostHandle, buffer: &[u8]) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::MqSend, mq))?;
        self.mq_mut(mq)?
            .queue
            .push_urgent(buffer)
            .map_err(|e| match e {
                QueueError::Full => HostError::Full,
                QueueError::Oversized => HostError::Error,
            })
    }

    fn mq_recv(
        &mut self,
        mq: HostHandle,
        buffer: &mut [u8],
        timeout: HostTimeout,
    ) -> HostResult<()> {
        self.enter(HostCall::with_timeout(HostOp::MqRecv, mq, timeout))?;
        self.block_on(timeout, "message receive", |host| {
            let q = match host.mq_mut(mq) {
                Ok(q) => q,
                Err(e) => return Some(Err(e)),
            };
            let record = q.queue.pop()?;
            let n = record.len().min(buffer.len());
            buffer[..n].copy_from_slice(&record[..n]);
            Some(Ok(()))
        })
    }

    fn mq_reset(&mut self, mq: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::MqReset, mq))?;
        self.mq_mut(mq)?.queue.clear();
        Ok(())
    }

    fn mq_entries(&self, mq: HostHandle) -> HostResult<usize> {
        match self.objects.get(&mq) {
            Some(SimObject::MessageQueue(q)) => Ok(q.queue.len()),
            _ => Err(HostError::Error),
        }
    }

    // Timers

    fn timer_init(
        &mut self,
        name: &str,
        callback: TimerCallback,
        parameter: usize,
        ticks: Tick,
        mode: TimerMode,
    ) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::TimerInit))?;
        if ticks == 0 {
            return Err(HostError::InvalidArgument);
        }
        Ok(self.issue(SimObject::Timer(SimTimer {
            name: name.to_string(),
            callback,
            parameter,
            period: ticks,
            mode,
            active: false,
            deadline: 0,
        })))
    }

    fn timer_detach(&mut self, timer: HostHandle) -> HostResult<()> {
        self.detach(timer, ObjectClass::Timer)
    }

    fn timer_start(&mut self, timer: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::TimerStart, timer))?;
        let now = self.elapsed;
        let t = self.timer_mut(timer)?;
        t.active = true;
        t.deadline = now + u64::from(t.period);
        Ok(())
    }

    fn timer_stop(&mut self, timer: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::TimerStop, timer))?;
        let t = self.timer_mut(timer)?;
        if !t.active {
            return Err(HostError::Error);
        }
        t.active = false;
        Ok(())
    }

    fn timer_remaining(&self, timer: HostHandle) -> HostResult<Tick> {
        let t = self.timer(timer)?;
        if !t.active {
            return Ok(0);
        }
        let left = t.deadline.saturating_sub(self.elapsed);
        Ok(Tick::try_from(left).unwrap_or(Tick::MAX))
    }

    fn timer_is_active(&self, timer: HostHandle) -> HostResult<bool> {
        Ok(self.timer(timer)?.active)
    }

    // Threads

    fn thread_init(&mut self, config: ThreadConfig) -> HostResult<HostHandle> {
        self.enter(HostCall::new(HostOp::ThreadInit))?;
        if config.priority >= self.max_priority || config.stack.is_empty() {
            return Err(HostError::InvalidArgument);
        }
        config.stack.fill(STACK_FILL_WORD);
        Ok(self.issue(SimObject::Thread(SimThread {
            name: config.name,
            entry: Some(config.entry),
            parameter: config.parameter,
            stack: config.stack,
            priority: config.priority,
            time_slice: config.time_slice,
            state: ThreadState::Init,
        })))
    }

    fn thread_startup(&mut self, thread: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::ThreadStartup, thread))?;
        let t = self.thread_mut(thread)?;
        if t.state != ThreadState::Init {
            return Err(HostError::Error);
        }
        t.state = ThreadState::Ready;
        Ok(())
    }

    fn thread_detach(&mut self, thread: HostHandle) -> HostResult<()> {
        self.detach(thread, ObjectClass::Thread)?;
        if thread == self.current {
            self.current = self.main_thread;
        }
        Ok(())
    }

    fn thread_self(&self) -> Option<HostHandle> {
        self.objects
            .contains_key(&self.current)
            .then_some(self.current)
    }

    fn thread_suspend(&mut self, thread: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::ThreadSuspend, thread))?;
        let t = self.thread_mut(thread)?;
        if t.state != ThreadState::Ready {
            return Err(HostError::Error);
        }
        t.state = ThreadState::Suspended;
        Ok(())
    }

    fn thread_resume(&mut self, thread: HostHandle) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::ThreadResume, thread))?;
        let t = self.thread_mut(thread)?;
        if t.state != ThreadState::Suspended {
            return Err(HostError::Error);
        }
        t.state = ThreadState::Ready;
        Ok(())
    }

    fn thread_yield(&mut self) -> HostResult<()> {
        self.enter(HostCall::new(HostOp::ThreadYield))
    }

    fn thread_delay(&mut self, ticks: Tick) -> HostResult<()> {
        self.enter(HostCall::with_timeout(
            HostOp::ThreadDelay,
            self.current,
            HostTimeout::ticks(ticks),
        ))?;
        self.advance_ticks(ticks);
        Ok(())
    }

    fn thread_set_priority(&mut self, thread: HostHandle, priority: u8) -> HostResult<()> {
        self.enter(HostCall::on(HostOp::ThreadSetPriority, thread))?;
        if priority >= self.max_priority {
            return Err(HostError::InvalidArgument);
        }
        self.thread_mut(thread)?.priority = priority;
        Ok(())
    }

    fn thread_set_time_slice(&mut self, thread: HostHandle, ticks: Tick) -> HostResult<()> {
        self.thread_mut(thread)?.time_slice = ticks;
        Ok(())
    }

    fn thread_stack_usage(&self, thread: HostHandle) -> HostResult<StackUsage> {
        let t = self.thread(thread)?;
        // The stack grows down; untouched fill words sit at the low end
        let untouched = t
            .stack
            .iter()
            .take_while(|&&word| word == STACK_FILL_WORD)
            .count();
        let size = t.stack.len();
        let max_used = size - untouched;
        Ok(StackUsage {
            size,
            used: max_used,
            max_used,
        })
    }
}
