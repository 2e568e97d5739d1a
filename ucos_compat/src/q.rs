//! Message queues
//!
//! Guest queues carry (pointer, size) pairs, never the bytes behind the
//! pointer. Each pair travels through the host queue as one fixed-size
//! descriptor record, so the host copies the record and the message itself
//! stays where the sender put it.

use crate::error::{OsErr, OsResult};
use crate::identity::{guest_object, ObjectCell};
use crate::opt::{rejected, QPostMode};
use crate::types::*;
use crate::{guard, settle, Os};
use host_api::{HostKernel, IpcFlag, ObjectClass};
use std::mem::size_of;

const RECORD_SIZE: usize = size_of::<usize>() + size_of::<OsMsgSize>();

/// One queued message: where it is and how long it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgDescriptor {
    data_ptr: usize,
    data_size: OsMsgSize,
}

impl MsgDescriptor {
    /// Size of an encoded descriptor in bytes
    pub const RECORD_SIZE: usize = RECORD_SIZE;

    pub fn new(ptr: OsMsgPtr, size: OsMsgSize) -> Self {
        Self {
            data_ptr: ptr as usize,
            data_size: size,
        }
    }

    pub fn ptr(&self) -> OsMsgPtr {
        self.data_ptr as OsMsgPtr
    }

    pub fn size(&self) -> OsMsgSize {
        self.data_size
    }

    /// Host record for this descriptor
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut record = [0u8; RECORD_SIZE];
        let (ptr, size) = record.split_at_mut(size_of::<usize>());
        ptr.copy_from_slice(&self.data_ptr.to_ne_bytes());
        size.copy_from_slice(&self.data_size.to_ne_bytes());
        record
    }

    pub fn decode(record: &[u8; RECORD_SIZE]) -> Self {
        let mut ptr = [0u8; size_of::<usize>()];
        let mut size = [0u8; size_of::<OsMsgSize>()];
        let (head, tail) = record.split_at(size_of::<usize>());
        ptr.copy_from_slice(head);
        size.copy_from_slice(tail);
        Self {
            data_ptr: usize::from_ne_bytes(ptr),
            data_size: OsMsgSize::from_ne_bytes(size),
        }
    }
}

/// Guest message queue storage
///
/// Holds the descriptor of the last message posted through it.
#[derive(Debug, Default)]
pub struct OsQ {
    cell: ObjectCell,
    staged: MsgDescriptor,
}

impl OsQ {
    pub const fn new() -> Self {
        Self {
            cell: ObjectCell::new(),
            staged: MsgDescriptor {
                data_ptr: 0,
                data_size: 0,
            },
        }
    }

    /// Descriptor of the last message posted through this storage
    pub fn last_posted(&self) -> MsgDescriptor {
        self.staged
    }
}

guest_object!(OsQ, ObjectClass::MessageQueue);

impl<H: HostKernel> Os<H> {
    /// `OSQCreate`
    pub fn q_create(
        &mut self,
        q: Option<&mut OsQ>,
        name: Option<&str>,
        max_qty: OsMsgQty,
        err: &mut OsErr,
    ) {
        settle(err, self.try_q_create(q, name, max_qty))
    }

    fn try_q_create(
        &mut self,
        q: Option<&mut OsQ>,
        name: Option<&str>,
        max_qty: OsMsgQty,
    ) -> OsResult<()> {
        guard::not_in_isr(&self.host, OsErr::CreateIsr)?;
        let q = q.ok_or(OsErr::ObjPtrNull)?;
        let name = name.ok_or(OsErr::Name)?;
        self.vacant(&*q)?;
        if max_qty == 0 {
            return Err(OsErr::QSize);
        }
        let handle = self.host.mq_init(
            name,
            MsgDescriptor::RECORD_SIZE,
            usize::from(max_qty),
            IpcFlag::Priority,
        )?;
        q.cell.bind(handle);
        q.staged = MsgDescriptor::default();
        Ok(())
    }

    /// `OSQDel`
    pub fn q_del(&mut self, q: Option<&mut OsQ>, opt: OsOpt, err: &mut OsErr) -> OsObjQty {
        settle(err, self.try_q_del(q, opt))
    }

    fn try_q_del(&mut self, q: Option<&mut OsQ>, opt: OsOpt) -> OsResult<OsObjQty> {
        let handle = self.del_prologue("OSQDel", q.as_deref(), opt)?;
        self.host.mq_detach(handle)?;
        if let Some(q) = q {
            q.cell.clear();
        }
        Ok(0)
    }

    /// `OSQFlush`
    ///
    /// Returns the number of messages discarded.
    pub fn q_flush(&mut self, q: Option<&OsQ>, err: &mut OsErr) -> OsMsgQty {
        settle(err, self.try_q_flush(q))
    }

    fn try_q_flush(&mut self, q: Option<&OsQ>) -> OsResult<OsMsgQty> {
        guard::not_in_isr(&self.host, OsErr::FlushIsr)?;
        let handle = self.live(q)?;
        let entries = self.host.mq_entries(handle)?;
        self.host.mq_reset(handle)?;
        Ok(OsMsgQty::try_from(entries).unwrap_or(OsMsgQty::MAX))
    }

    /// `OSQPend`
    ///
    /// Returns the message pointer and writes its size, or null and 0.
    pub fn q_pend(
        &mut self,
        q: Option<&OsQ>,
        timeout: OsTick,
        opt: OsOpt,
        msg_size: &mut OsMsgSize,
        err: &mut OsErr,
    ) -> OsMsgPtr {
        *msg_size = 0;
        match self.try_q_pend(q, timeout, opt) {
            Ok(msg) => {
                *err = OsErr::None;
                *msg_size = msg.size();
                msg.ptr()
            }
            Err(e) => {
                *err = e;
                std::ptr::null_mut()
            }
        }
    }

    fn try_q_pend(
        &mut self,
        q: Option<&OsQ>,
        timeout: OsTick,
        opt: OsOpt,
    ) -> OsResult<MsgDescriptor> {
        let (handle, wait) = self.pend_prologue("OSQPend", q, timeout, opt)?;
        let mut record = [0u8; RECORD_SIZE];
        self.host.mq_recv(handle, &mut record, wait.to_host())?;
        Ok(MsgDescriptor::decode(&record))
    }

    /// `OSQPendAbort` (not available on this host)
    pub fn q_pend_abort(&mut self, q: Option<&OsQ>, opt: OsOpt, err: &mut OsErr) -> OsObjQty {
        log::debug!("OSQPendAbort: opt {:#06x} ignored", opt);
        settle(err, self.pend_abort_unsupported("OSQPendAbort", q))
    }

    /// `OSQPost`
    ///
    /// FIFO and LIFO posts only; broadcast and no-reschedule are rejected.
    pub fn q_post(
        &mut self,
        q: Option<&mut OsQ>,
        msg: OsMsgPtr,
        msg_size: OsMsgSize,
        opt: OsOpt,
        err: &mut OsErr,
    ) {
        settle(err, self.try_q_post(q, msg, msg_size, opt))
    }

    fn try_q_post(
        &mut self,
        q: Option<&mut OsQ>,
        msg: OsMsgPtr,
        msg_size: OsMsgSize,
        opt: OsOpt,
    ) -> OsResult<()> {
        self.post_allowed()?;
        let handle = self.live(q.as_deref())?;
        let mode = QPostMode::parse(opt).ok_or_else(|| rejected("OSQPost", opt))?;
        let descriptor = MsgDescriptor::new(msg, msg_size);
        if let Some(q) = q {
            q.staged = descriptor;
        }
        let record = descriptor.encode();
        match mode {
            QPostMode::Fifo => self.host.mq_send(handle, &record)?,
            QPostMode::Lifo => self.host.mq_urgent(handle, &record)?,
        }
        Ok(())
    }
}
