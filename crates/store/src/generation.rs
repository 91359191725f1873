//! Per-slot generation tickets.
//!
//! Every store operation that writes a piece of local state takes a
//! [`Ticket`] for the slot it will write before the remote call is issued.
//! When the response arrives it is applied only if no later ticket was
//! issued for the same slot in the meantime.

use std::collections::HashMap;

use subtitler_core::types::DbId;

/// A region of local state written by store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncSlot {
    Projects,
    CurrentProject,
    Subtitles,
    Styles,
    Exports,
    /// Status refreshes of one project.
    ProjectStatus(DbId),
    /// Mutations of one subtitle entry (update, delete, split, merge).
    Entry(DbId),
}

/// Issued when an operation starts; redeemed when its response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slot: SyncSlot,
    generation: u64,
}

impl Ticket {
    pub fn slot(&self) -> SyncSlot {
        self.slot
    }
}

#[derive(Debug, Default)]
pub struct Generations {
    next: u64,
    latest: HashMap<SyncSlot, u64>,
}

impl Generations {
    pub fn issue(&mut self, slot: SyncSlot) -> Ticket {
        self.next += 1;
        self.latest.insert(slot, self.next);
        Ticket {
            slot,
            generation: self.next,
        }
    }

    /// True if no ticket for the same slot was issued after `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.slot) == Some(&ticket.generation)
    }

    /// Redeem `ticket`: returns whether its response may be applied.
    ///
    /// Redeeming the latest ticket of a slot forgets the slot, so per-entry
    /// slots do not accumulate.
    pub fn redeem(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.latest.remove(&ticket.slot);
        true
    }

    /// Drop `ticket` after its operation failed.
    pub fn abandon(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.latest.remove(&ticket.slot);
        }
    }

    /// Supersede every outstanding ticket of `slot`.
    pub fn invalidate(&mut self, slot: SyncSlot) {
        if self.latest.contains_key(&slot) {
            self.issue(slot);
        }
    }

    /// Number of slots with an outstanding ticket.
    pub fn outstanding(&self) -> usize {
        self.latest.len()
    }
}
