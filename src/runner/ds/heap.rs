//! Accounting for the bytes held by array buffer data blocks.
//!
//! The runtime does not manage object memory itself. What it does bound is binary storage:
//! every data block created, grown, shrunk or released by an `ArrayBuffer` goes through the
//! heap so that an embedder can cap it.

use std::cell::Cell;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;

/// Configuration for the heap.
#[derive(Debug, Clone)]
pub struct HeapConfig {
    /// Maximum number of data block bytes. None means unlimited.
    pub max_bytes: Option<usize>,
}

impl HeapConfig {
    pub fn unlimited() -> Self {
        HeapConfig { max_bytes: None }
    }

    pub fn with_limit(max_bytes: usize) -> Self {
        HeapConfig {
            max_bytes: Some(max_bytes),
        }
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Counter shared by the heap and every outstanding reservation.
#[derive(Debug)]
struct HeapAccount {
    config: HeapConfig,
    allocated_bytes: Cell<usize>,
}

impl HeapAccount {
    fn can_charge(&self, bytes: usize) -> bool {
        match self.config.max_bytes {
            Some(max_bytes) => self
                .allocated_bytes
                .get()
                .checked_add(bytes)
                .map_or(false, |total| total <= max_bytes),
            None => true,
        }
    }

    fn charge(&self, bytes: usize) -> Result<(), JErrorType> {
        if !self.can_charge(bytes) {
            return Err(JErrorType::RangeError(format!(
                "Array buffer allocation of {} bytes failed",
                bytes
            )));
        }
        let total = self.allocated_bytes.get() + bytes;
        self.allocated_bytes.set(total);
        tracing::trace!(bytes, total, "heap allocate");
        Ok(())
    }

    fn release(&self, bytes: usize) {
        let total = self.allocated_bytes.get().saturating_sub(bytes);
        self.allocated_bytes.set(total);
        tracing::trace!(bytes, total, "heap deallocate");
    }
}

/// Bytes held by one data block. The bytes go back to the heap when the reservation is
/// dropped, so a buffer that becomes unreachable stops counting against the limit.
#[derive(Debug)]
pub struct HeapReservation {
    account: Rc<HeapAccount>,
    bytes: usize,
}

impl HeapReservation {
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Moves the reservation to `new_bytes`. Growth past the limit fails and leaves the
    /// reservation unchanged; shrinking always succeeds.
    pub fn resize(&mut self, new_bytes: usize) -> Result<(), JErrorType> {
        if new_bytes > self.bytes {
            self.account.charge(new_bytes - self.bytes)?;
        } else {
            self.account.release(self.bytes - new_bytes);
        }
        self.bytes = new_bytes;
        Ok(())
    }
}

impl Drop for HeapReservation {
    fn drop(&mut self) {
        self.account.release(self.bytes);
    }
}

#[derive(Debug)]
pub struct Heap {
    account: Rc<HeapAccount>,
}

impl Heap {
    pub fn new(config: HeapConfig) -> Self {
        Heap {
            account: Rc::new(HeapAccount {
                config,
                allocated_bytes: Cell::new(0),
            }),
        }
    }

    /// Reserves `bytes` for a new data block.
    ///
    /// Fails with a RangeError when the reservation would exceed the limit; nothing is
    /// reserved in that case.
    pub fn reserve(&self, bytes: usize) -> Result<HeapReservation, JErrorType> {
        self.account.charge(bytes)?;
        Ok(HeapReservation {
            account: self.account.clone(),
            bytes,
        })
    }

    /// Bytes currently held by live reservations.
    pub fn get_allocated(&self) -> usize {
        self.account.allocated_bytes.get()
    }

    pub fn can_allocate(&self, bytes: usize) -> bool {
        self.account.can_charge(bytes)
    }

    /// Remaining bytes, if limited.
    pub fn available_bytes(&self) -> Option<usize> {
        self.account
            .config
            .max_bytes
            .map(|max| max.saturating_sub(self.get_allocated()))
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(HeapConfig::default())
    }
}
