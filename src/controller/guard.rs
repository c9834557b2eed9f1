//! Reentrancy guard for operations that wait on the card service.
//!
//! The slot holds the token of whoever is in; 0 means free. Each acquire
//! takes a fresh token, and a guard only clears the slot if it still holds
//! its own token. That lets the controller free the slot for a new session
//! while a call from the ended one is still out, without the late guard
//! later freeing it under someone else.

use std::sync::atomic::{AtomicU64, Ordering};

const FREE: u64 = 0;

#[derive(Debug, Default)]
pub(crate) struct BusySlot {
    holder: AtomicU64,
    issued: AtomicU64,
}

impl BusySlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take the slot, or `None` if someone else holds it.
    pub(crate) fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let token = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        self.holder
            .compare_exchange(FREE, token, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { slot: self, token })
    }

    /// Free the slot whoever holds it. The holder's guard becomes inert.
    pub(crate) fn release(&self) {
        self.holder.store(FREE, Ordering::Release);
    }

    pub(crate) fn is_held(&self) -> bool {
        self.holder.load(Ordering::Acquire) != FREE
    }
}

/// Held while an operation is waiting on the service. Dropping it, on any
/// exit path, lets the next operation in.
#[derive(Debug)]
pub(crate) struct BusyGuard<'a> {
    slot: &'a BusySlot,
    token: u64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        // Fails if the slot was released and taken again meanwhile.
        let _ = self.slot.holder.compare_exchange(
            self.token,
            FREE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
