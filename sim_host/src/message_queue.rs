//! Bounded record queue backing simulated host message queues
//!
//! Records are fixed-size byte buffers copied in and out, the way the host
//! copies messages. Capacity and record size are set at creation.

use std::collections::VecDeque;

/// Queue error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    Full,
    /// The record does not fit the queue's record size
    Oversized,
}

/// Bounded FIFO of fixed-size records with an urgent (front) lane
#[derive(Debug, Clone)]
pub struct RecordQueue {
    capacity: usize,
    record_size: usize,
    records: VecDeque<Vec<u8>>,
}

impl RecordQueue {
    /// Creates a queue holding up to `capacity` records of `record_size` bytes
    pub fn with_capacity(capacity: usize, record_size: usize) -> Self {
        Self {
            capacity,
            record_size,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns the configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured record size
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Returns the number of queued records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns remaining capacity
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.records.len())
    }

    /// Copies `buffer` into a record at the back
    pub fn push(&mut self, buffer: &[u8]) -> Result<(), QueueError> {
        let record = self.admit(buffer)?;
        self.records.push_back(record);
        Ok(())
    }

    /// Copies `buffer` into a record at the front
    pub fn push_urgent(&mut self, buffer: &[u8]) -> Result<(), QueueError> {
        let record = self.admit(buffer)?;
        self.records.push_front(record);
        Ok(())
    }

    /// Pops the front record
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.records.pop_front()
    }

    /// Discards every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn admit(&self, buffer: &[u8]) -> Result<Vec<u8>, QueueError> {
        if buffer.len() > self.record_size {
            return Err(QueueError::Oversized);
        }
        if self.records.len() >= self.capacity {
            return Err(QueueError::Full);
        }
        // Short records are zero-padded to the slot size
        let mut record = vec![0u8; self.record_size];
        record[..buffer.len()].copy_from_slice(buffer);
        Ok(record)
    }
}
