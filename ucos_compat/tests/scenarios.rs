//! # Guest Scenario Tests
//!
//! End-to-end runs of guest API call sequences against the simulated host.
//! Each test plays one application scenario and checks both the values the
//! guest sees and what reached the host.

use host_api::{ExecutionContext, HostError, HostTimeout};
use sim_host::fault_injection::{HostFault, HostFaultPlan, HostOp};
use sim_host::test_utils::{advance_until_idle, leak_stack, with_sched_locked};
use sim_host::{SimEvent, SimulatedHost, ThreadState};
use std::sync::atomic::{AtomicUsize, Ordering};
use ucos_compat::*;

fn os() -> Os<SimulatedHost> {
    Os::new(SimulatedHost::new())
}

/// Test: counting semaphore from empty to signalled and back
///
/// This validates that:
/// 1. A non-blocking pend on an empty semaphore times out at once
/// 2. A post is reflected in the returned count
/// 3. A blocking pend with timeout 0 is a forever wait on the host
#[test]
fn test_semaphore_signal_cycle() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;

    os.sem_create(Some(&mut sem), Some("s1"), 0, &mut err);
    assert_eq!(err, OsErr::None);

    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::Timeout, 0));
    assert_eq!(os.host().elapsed(), 0);

    let now = os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    assert_eq!((err, now), (OsErr::None, 1));

    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::None, 0));

    let timeouts = os.host().audit_log().timeouts_for(HostOp::SemTake);
    assert_eq!(timeouts, vec![HostTimeout::IMMEDIATE, HostTimeout::FOREVER]);
}

/// Test: a blocked pend is released by another task's post
///
/// This validates that:
/// 1. A bounded pend waits on the host for the scheduled release
/// 2. A bounded pend with nothing coming reports a timeout after its bound
#[test]
fn test_semaphore_released_by_other_task() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;

    os.sem_create(Some(&mut sem), Some("s2"), 0, &mut err);
    let handle = sem.handle().unwrap();
    os.host_mut().schedule_in(7, SimEvent::ReleaseSemaphore(handle));

    os.sem_pend(Some(&sem), 50, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(os.host().elapsed(), 7);

    os.sem_pend(Some(&sem), 10, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!(err, OsErr::Timeout);
    assert_eq!(os.host().elapsed(), 17);
}

/// Test: event flags with and without consumption
///
/// This validates that:
/// 1. An ALL wait returns the matched flags and leaves them set
/// 2. An ALL wait with CONSUME clears the matched flags
/// 3. A later non-blocking wait sees the empty group
#[test]
fn test_flag_consume_scenario() {
    let mut os = os();
    let mut grp = OsFlagGrp::new();
    let mut err = OsErr::None;

    os.flag_create(Some(&mut grp), Some("f"), 0, &mut err);
    assert_eq!(err, OsErr::None);

    os.flag_post(Some(&grp), 0x03, OS_OPT_POST_FLAG_SET, &mut err);
    assert_eq!(err, OsErr::None);

    let got = os.flag_pend(Some(&grp), 0x03, 0, OS_OPT_PEND_FLAG_SET_ALL, &mut err);
    assert_eq!((err, got), (OsErr::None, 0x03));

    let got = os.flag_pend(
        Some(&grp),
        0x03,
        0,
        OS_OPT_PEND_FLAG_SET_ALL | OS_OPT_PEND_FLAG_CONSUME,
        &mut err,
    );
    assert_eq!((err, got), (OsErr::None, 0x03));

    let got = os.flag_pend(
        Some(&grp),
        0x01,
        0,
        OS_OPT_PEND_FLAG_SET_ANY | OS_OPT_PEND_NON_BLOCKING,
        &mut err,
    );
    assert_eq!((err, got), (OsErr::Timeout, 0));
}

/// Test: an ANY wait is satisfied by a flag set later
#[test]
fn test_flag_any_wait_released() {
    let mut os = os();
    let mut grp = OsFlagGrp::new();
    let mut err = OsErr::None;

    os.flag_create(Some(&mut grp), Some("f"), 0, &mut err);
    let handle = grp.handle().unwrap();
    os.host_mut().schedule_in(3, SimEvent::SendEvent(handle, 0x10));

    let got = os.flag_pend(Some(&grp), 0x30, 0, OS_OPT_PEND_FLAG_SET_ANY, &mut err);
    assert_eq!((err, got), (OsErr::None, 0x10));
    assert_eq!(os.host().elapsed(), 3);
}

/// Test: creating over a live object
///
/// This validates that:
/// 1. Every object kind reports OBJ_CREATED for live storage
/// 2. The live object keeps working afterwards
/// 3. No second host object is made
#[test]
fn test_double_create_is_rejected() {
    let mut os = os();
    let mut err = OsErr::None;

    let mut sem = OsSem::new();
    os.sem_create(Some(&mut sem), Some("s"), 2, &mut err);
    let mut mutex = OsMutex::new();
    os.mutex_create(Some(&mut mutex), Some("m"), &mut err);
    let mut grp = OsFlagGrp::new();
    os.flag_create(Some(&mut grp), Some("f"), 0, &mut err);
    let mut q = OsQ::new();
    os.q_create(Some(&mut q), Some("q"), 4, &mut err);
    assert_eq!(err, OsErr::None);
    let objects = os.host().object_count();
    let sem_handle = sem.handle();

    os.sem_create(Some(&mut sem), Some("s"), 9, &mut err);
    assert_eq!(err, OsErr::ObjCreated);
    os.mutex_create(Some(&mut mutex), Some("m"), &mut err);
    assert_eq!(err, OsErr::ObjCreated);
    os.flag_create(Some(&mut grp), Some("f"), 0x1, &mut err);
    assert_eq!(err, OsErr::ObjCreated);
    os.q_create(Some(&mut q), Some("q"), 4, &mut err);
    assert_eq!(err, OsErr::ObjCreated);

    assert_eq!(os.host().object_count(), objects);
    assert_eq!(sem.handle(), sem_handle);
    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::None, 1));
}

/// Test: interrupt context restrictions
///
/// This validates that:
/// 1. Pends and deletes are refused from an ISR with their own codes
/// 2. Posts are refused unless posting from ISRs is configured
/// 3. Refused calls leave the object as it was
#[test]
fn test_isr_context_leaves_state_untouched() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut q = OsQ::new();
    let mut err = OsErr::None;

    os.sem_create(Some(&mut sem), Some("s"), 1, &mut err);
    os.q_create(Some(&mut q), Some("q"), 2, &mut err);

    os.int_enter();
    os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!(err, OsErr::PendIsr);
    os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    assert_eq!(err, OsErr::PostIsr);
    os.sem_del(Some(&mut sem), OS_OPT_DEL_ALWAYS, &mut err);
    assert_eq!(err, OsErr::DelIsr);
    os.q_flush(Some(&q), &mut err);
    assert_eq!(err, OsErr::FlushIsr);
    os.int_exit();

    assert!(sem.handle().is_some());
    assert!(!os.host().audit_log().has_op(HostOp::SemTake));
    assert!(!os.host().audit_log().has_op(HostOp::SemRelease));
    assert!(!os.host().audit_log().has_op(HostOp::Detach));

    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::None, 0));
}

/// Test: posting from an ISR when configured
#[test]
fn test_isr_post_when_enabled() {
    let config = OsConfig::default().with_post_from_isr(true);
    let mut os = Os::with_config(SimulatedHost::new(), config).unwrap();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;

    os.sem_create(Some(&mut sem), Some("s"), 0, &mut err);

    os.int_enter();
    let now = os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    os.int_exit();
    assert_eq!((err, now), (OsErr::None, 1));
}

/// Test: storage of one kind used as another
///
/// This validates that:
/// 1. A semaphore cell viewed as any other object reports OBJ_TYPE
/// 2. A task view of a non-task reports OBJ_TYPE, not TASK_NOT_EXIST
#[test]
fn test_cross_type_misuse() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;
    os.sem_create(Some(&mut sem), Some("s"), 1, &mut err);
    let cell = sem.into_storage();

    let mutex = OsMutex::from_storage(cell);
    os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!(err, OsErr::ObjType);

    let grp = OsFlagGrp::from_storage(mutex.into_storage());
    os.flag_post(Some(&grp), 0x1, OS_OPT_POST_FLAG_SET, &mut err);
    assert_eq!(err, OsErr::ObjType);

    let mut q = OsQ::from_storage(grp.into_storage());
    os.q_post(Some(&mut q), std::ptr::null_mut(), 0, OS_OPT_POST_FIFO, &mut err);
    assert_eq!(err, OsErr::ObjType);

    let tmr = OsTmr::from_storage(q.into_storage());
    os.tmr_remain_get(Some(&tmr), &mut err);
    assert_eq!(err, OsErr::ObjType);

    let tcb = OsTcb::from_storage(tmr.into_storage());
    os.task_suspend(Some(&tcb), &mut err);
    assert_eq!(err, OsErr::ObjType);

    let sem = OsSem::from_storage(tcb.into_storage());
    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::None, 0));
}

/// Test: null and deleted objects
#[test]
fn test_null_and_deleted_objects() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;

    os.sem_post(None, OS_OPT_POST_1, &mut err);
    assert_eq!(err, OsErr::ObjPtrNull);
    os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    assert_eq!(err, OsErr::ObjType);

    os.sem_create(Some(&mut sem), Some("s"), 0, &mut err);
    os.sem_del(Some(&mut sem), OS_OPT_DEL_ALWAYS, &mut err);
    assert_eq!(err, OsErr::None);
    assert!(sem.handle().is_none());
    os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    assert_eq!(err, OsErr::ObjType);

    os.sem_create(Some(&mut sem), Some("s"), 3, &mut err);
    assert_eq!(err, OsErr::None);
}

/// Test: host failures surface as guest error codes
///
/// This validates that:
/// 1. Out-of-memory on create maps to the host-specific memory code
/// 2. A full message queue maps to Q_MAX
/// 3. A failing create leaves the storage vacant
#[test]
fn test_host_failures_are_translated() {
    let plan = HostFaultPlan::new()
        .with_fault(HostFault::FailNext {
            op: HostOp::SemInit,
            error: HostError::NoMemory,
        })
        .with_fault(HostFault::FailNext {
            op: HostOp::EventRecv,
            error: HostError::Io,
        });
    let mut os = Os::new(SimulatedHost::new().with_fault_plan(plan));
    let mut err = OsErr::None;

    let mut sem = OsSem::new();
    os.sem_create(Some(&mut sem), Some("s"), 0, &mut err);
    assert_eq!(err, OsErr::RtEnomem);
    assert!(sem.handle().is_none());
    os.sem_create(Some(&mut sem), Some("s"), 0, &mut err);
    assert_eq!(err, OsErr::None);

    let mut q = OsQ::new();
    os.q_create(Some(&mut q), Some("q"), 1, &mut err);
    os.q_post(Some(&mut q), std::ptr::null_mut(), 0, OS_OPT_POST_FIFO, &mut err);
    assert_eq!(err, OsErr::None);
    os.q_post(Some(&mut q), std::ptr::null_mut(), 0, OS_OPT_POST_FIFO, &mut err);
    assert_eq!(err, OsErr::QMax);

    let mut grp = OsFlagGrp::new();
    os.flag_create(Some(&mut grp), Some("f"), 0x1, &mut err);
    let got = os.flag_pend(Some(&grp), 0x1, 0, OS_OPT_PEND_FLAG_SET_ANY, &mut err);
    assert_eq!((err, got), (OsErr::RtEio, 0));
}

/// Test: a host primitive that keeps failing fails every guest call
///
/// This validates that:
/// 1. Each post reaches the host and gets the mapped error back
/// 2. The failed posts leave the count untouched, so one pend still succeeds
#[test]
fn test_persistent_host_failure() {
    let plan = HostFaultPlan::new().with_fault(HostFault::FailAlways {
        op: HostOp::SemRelease,
        error: HostError::Busy,
    });
    let mut os = Os::new(SimulatedHost::new().with_fault_plan(plan));
    let mut sem = OsSem::new();
    let mut err = OsErr::None;
    os.sem_create(Some(&mut sem), Some("s"), 1, &mut err);
    assert_eq!(err, OsErr::None);
    let handle = sem.handle().unwrap();
    os.host_mut().clear_audit_log();

    for _ in 0..3 {
        assert_eq!(os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err), 0);
        assert_eq!(err, OsErr::RtEbusy);
    }
    let calls = os.host().audit_log().get_events_for(handle);
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|e| e.call.op == HostOp::SemRelease));

    assert_eq!(os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err), 0);
    assert_eq!(err, OsErr::None);
}

/// Test: messages keep their pointer and size across the host queue
#[test]
fn test_queue_fifo_and_lifo() {
    let mut os = os();
    let mut q = OsQ::new();
    let mut err = OsErr::None;
    let mut size: OsMsgSize = 0;

    os.q_create(Some(&mut q), Some("q"), 3, &mut err);
    let a = 0x1000usize as OsMsgPtr;
    let b = 0x2000usize as OsMsgPtr;
    let c = 0x3000usize as OsMsgPtr;
    os.q_post(Some(&mut q), a, 10, OS_OPT_POST_FIFO, &mut err);
    os.q_post(Some(&mut q), b, 20, OS_OPT_POST_FIFO, &mut err);
    os.q_post(Some(&mut q), c, 30, OS_OPT_POST_LIFO, &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(q.last_posted(), MsgDescriptor::new(c, 30));

    let order: Vec<(OsMsgPtr, OsMsgSize)> = (0..3)
        .map(|_| {
            let p = os.q_pend(Some(&q), 0, OS_OPT_PEND_NON_BLOCKING, &mut size, &mut err);
            assert_eq!(err, OsErr::None);
            (p, size)
        })
        .collect();
    assert_eq!(order, vec![(c, 30), (a, 10), (b, 20)]);

    size = 99;
    let p = os.q_pend(Some(&q), 0, OS_OPT_PEND_NON_BLOCKING, &mut size, &mut err);
    assert_eq!(err, OsErr::Timeout);
    assert!(p.is_null());
    assert_eq!(size, 0);
}

/// Test: a flush drops pending messages and reports how many
#[test]
fn test_queue_flush() {
    let mut os = os();
    let mut q = OsQ::new();
    let mut err = OsErr::None;

    os.q_create(Some(&mut q), Some("q"), 4, &mut err);
    for i in 1..=3usize {
        os.q_post(Some(&mut q), i as OsMsgPtr, 0, OS_OPT_POST_FIFO, &mut err);
    }
    let dropped = os.q_flush(Some(&q), &mut err);
    assert_eq!((err, dropped), (OsErr::None, 3));

    let mut size = 0;
    os.q_pend(Some(&q), 0, OS_OPT_PEND_NON_BLOCKING, &mut size, &mut err);
    assert_eq!(err, OsErr::Timeout);
}

static ONE_SHOT_ARG: AtomicUsize = AtomicUsize::new(0);
static PERIODIC_HITS: AtomicUsize = AtomicUsize::new(0);

fn record_arg(_tmr: host_api::HostHandle, arg: usize) {
    ONE_SHOT_ARG.store(arg, Ordering::SeqCst);
}

fn count_hit(_tmr: host_api::HostHandle, _arg: usize) {
    PERIODIC_HITS.fetch_add(1, Ordering::SeqCst);
}

/// Test: one-shot timer lifecycle
///
/// This validates that:
/// 1. The callback runs once with the registered argument
/// 2. The state moves from STOPPED to RUNNING to COMPLETED
/// 3. A stop after completion reports the timer as stopped
#[test]
fn test_one_shot_timer_fires_with_argument() {
    let mut os = os();
    let mut tmr = OsTmr::new();
    let mut err = OsErr::None;

    os.tmr_create(
        Some(&mut tmr),
        Some("t"),
        5,
        0,
        OS_OPT_TMR_ONE_SHOT,
        Some(record_arg),
        0xBEEF,
        &mut err,
    );
    assert_eq!(err, OsErr::None);
    assert_eq!(os.tmr_state_get(Some(&tmr), &mut err), OsTmrState::Stopped);

    assert!(os.tmr_start(Some(&mut tmr), &mut err));
    assert_eq!(os.tmr_state_get(Some(&tmr), &mut err), OsTmrState::Running);
    assert_eq!(os.tmr_remain_get(Some(&tmr), &mut err), 5);

    os.host_mut().advance_ticks(5);
    assert_eq!(ONE_SHOT_ARG.load(Ordering::SeqCst), 0xBEEF);
    assert_eq!(os.tmr_state_get(Some(&tmr), &mut err), OsTmrState::Completed);

    assert!(!os.tmr_stop(Some(&mut tmr), OS_OPT_TMR_NONE, 0, &mut err));
    assert_eq!(err, OsErr::TmrStopped);

    assert!(os.tmr_del(Some(&mut tmr), &mut err));
    assert_eq!(os.tmr_state_get(Some(&tmr), &mut err), OsTmrState::Unused);
}

/// Test: periodic timer keeps firing until stopped
#[test]
fn test_periodic_timer() {
    let mut os = os();
    let mut tmr = OsTmr::new();
    let mut err = OsErr::None;

    os.tmr_create(
        Some(&mut tmr),
        Some("p"),
        0,
        4,
        OS_OPT_TMR_PERIODIC,
        Some(count_hit),
        0,
        &mut err,
    );
    os.tmr_start(Some(&mut tmr), &mut err);
    os.host_mut().advance_ticks(12);
    assert_eq!(PERIODIC_HITS.load(Ordering::SeqCst), 3);

    assert!(os.tmr_stop(Some(&mut tmr), OS_OPT_TMR_NONE, 0, &mut err));
    assert_eq!(err, OsErr::None);
    os.host_mut().advance_ticks(12);
    assert_eq!(PERIODIC_HITS.load(Ordering::SeqCst), 3);
    assert_eq!(os.tmr_state_get(Some(&tmr), &mut err), OsTmrState::Stopped);
}

fn task_body(_arg: usize) {}

static TASK_ARG: AtomicUsize = AtomicUsize::new(0);

fn record_task_arg(arg: usize) {
    TASK_ARG.store(arg, Ordering::SeqCst);
}

/// Test: task lifecycle on the host
///
/// This validates that:
/// 1. A created task is started on the host with the guest priority
/// 2. Suspend and resume move the host thread between states
/// 3. Resuming a task that is not suspended is reported
/// 4. The entry runs with the argument given at create
/// 5. Delete frees the storage for reuse
#[test]
fn test_task_lifecycle() {
    let mut os = os();
    let mut tcb = OsTcb::new();
    let mut err = OsErr::None;

    os.task_create(
        Some(&mut tcb),
        TaskParams {
            name: Some("worker"),
            entry: Some(record_task_arg),
            arg: 7,
            prio: 5,
            stk_base: Some(leak_stack(128)),
            stk_size: 128,
            opt: OS_OPT_TASK_STK_CHK | OS_OPT_TASK_STK_CLR,
            ..TaskParams::default()
        },
        &mut err,
    );
    assert_eq!(err, OsErr::None);
    let thread = tcb.handle().unwrap();
    assert_eq!(os.host().thread_state(thread), Some(ThreadState::Ready));
    assert_eq!(os.host().thread_priority(thread), Some(5));
    assert_eq!(os.host().object_name(thread), Some("worker"));

    os.task_suspend(Some(&tcb), &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(os.host().thread_state(thread), Some(ThreadState::Suspended));
    os.task_resume(Some(&tcb), &mut err);
    assert_eq!(err, OsErr::None);
    os.task_resume(Some(&tcb), &mut err);
    assert_eq!(err, OsErr::TaskNotSuspended);

    os.task_change_prio(Some(&tcb), 9, &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(os.host().thread_priority(thread), Some(9));

    assert!(os.host_mut().run_thread_entry(thread));
    assert_eq!(TASK_ARG.load(Ordering::SeqCst), 7);

    os.task_del(Some(&mut tcb), &mut err);
    assert_eq!(err, OsErr::None);
    assert!(tcb.handle().is_none());
    os.task_suspend(Some(&tcb), &mut err);
    assert_eq!(err, OsErr::TaskNotExist);
}

fn task_params(name: &'static str) -> TaskParams<'static> {
    TaskParams {
        name: Some(name),
        entry: Some(task_body),
        prio: 3,
        stk_base: Some(leak_stack(64)),
        stk_size: 64,
        ..TaskParams::default()
    }
}

/// Test: a task that cannot start leaves nothing behind on the host
///
/// This validates that:
/// 1. Tasks created before the failure are untouched
/// 2. The failing create reports the startup error
/// 3. The half-built thread is detached again
#[test]
fn test_task_startup_failure_rolls_back() {
    let plan = HostFaultPlan::new().with_fault(HostFault::FailAfter {
        op: HostOp::ThreadStartup,
        skip: 1,
        error: HostError::Busy,
    });
    let mut os = Os::new(SimulatedHost::new().with_fault_plan(plan));
    let mut err = OsErr::None;

    let mut first = OsTcb::new();
    os.task_create(Some(&mut first), task_params("first"), &mut err);
    assert_eq!(err, OsErr::None);
    let objects = os.host().object_count();

    let mut second = OsTcb::new();
    os.task_create(Some(&mut second), task_params("second"), &mut err);
    assert_eq!(err, OsErr::RtEbusy);
    assert!(second.handle().is_none());
    assert_eq!(os.host().object_count(), objects);
    assert_eq!(os.host().audit_log().count_op(HostOp::Detach), 1);

    let thread = first.handle().unwrap();
    assert_eq!(os.host().thread_state(thread), Some(ThreadState::Ready));
}

/// Test: a failed rollback still reports the startup error
#[test]
fn test_task_rollback_failure_keeps_startup_error() {
    let plan = HostFaultPlan::new()
        .with_fault(HostFault::FailNext {
            op: HostOp::ThreadStartup,
            error: HostError::NoMemory,
        })
        .with_fault(HostFault::FailNext {
            op: HostOp::Detach,
            error: HostError::Io,
        });
    let mut os = Os::new(SimulatedHost::new().with_fault_plan(plan));
    let objects = os.host().object_count();
    let mut tcb = OsTcb::new();
    let mut err = OsErr::None;

    os.task_create(Some(&mut tcb), task_params("t"), &mut err);
    assert_eq!(err, OsErr::RtEnomem);
    assert!(tcb.handle().is_none());
    assert_eq!(os.host().object_count(), objects + 1);
    assert_eq!(os.host().audit_log().count_op(HostOp::Detach), 1);
}

/// Test: the scheduler lock gates every blocking call
///
/// This validates that:
/// 1. Pends and delays are refused while locked, even non-blocking ones
/// 2. Posts still go through
/// 3. Unlocking restores blocking calls
#[test]
fn test_scheduler_lock_gates_blocking_calls() {
    let mut os = os();
    let mut sem = OsSem::new();
    let mut err = OsErr::None;
    os.sem_create(Some(&mut sem), Some("s"), 1, &mut err);

    os.sched_lock(&mut err);
    assert_eq!(err, OsErr::None);
    os.sem_pend(Some(&sem), 5, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!(err, OsErr::SchedLocked);
    os.time_dly(5, OS_OPT_TIME_DLY, &mut err);
    assert_eq!(err, OsErr::SchedLocked);
    os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!(err, OsErr::SchedLocked);
    let now = os.sem_post(Some(&sem), OS_OPT_POST_1, &mut err);
    assert_eq!((err, now), (OsErr::None, 2));
    os.sched_unlock(&mut err);
    assert_eq!(err, OsErr::None);

    os.time_dly(5, OS_OPT_TIME_DLY, &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(os.host().elapsed(), 5);

    let left = with_sched_locked(os.host_mut(), |host| host.critical_level());
    assert_eq!(left, 1);
}

/// Test: mutex ownership rules
#[test]
fn test_mutex_ownership() {
    let mut os = os();
    let mut mutex = OsMutex::new();
    let mut err = OsErr::None;

    os.mutex_create(Some(&mut mutex), Some("m"), &mut err);
    os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!(err, OsErr::None);
    os.mutex_pend(Some(&mutex), 0, OS_OPT_PEND_BLOCKING, &mut err);
    assert_eq!(err, OsErr::MutexOwner);
    os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
    assert_eq!(err, OsErr::MutexNesting);
    os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
    assert_eq!(err, OsErr::None);
    os.mutex_post(Some(&mutex), OS_OPT_POST_NONE, &mut err);
    assert_eq!(err, OsErr::MutexNotOwner);
}

/// Test: HMSM delays run the scheduled work they span
#[test]
fn test_hmsm_delay_spans_scheduled_events() {
    let mut os = Os::new(SimulatedHost::new().with_tick_rate(100));
    let mut sem = OsSem::new();
    let mut err = OsErr::None;

    os.sem_create(Some(&mut sem), Some("s"), 0, &mut err);
    let handle = sem.handle().unwrap();
    os.host_mut().schedule_in(50, SimEvent::ReleaseSemaphore(handle));

    os.time_dly_hmsm(0, 0, 1, 0, OS_OPT_TIME_HMSM_STRICT, &mut err);
    assert_eq!(err, OsErr::None);
    assert_eq!(os.host().elapsed(), 100);
    advance_until_idle(os.host_mut(), 10);

    let left = os.sem_pend(Some(&sem), 0, OS_OPT_PEND_NON_BLOCKING, &mut err);
    assert_eq!((err, left), (OsErr::None, 0));
}
