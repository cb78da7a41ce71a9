use super::CommandHistoryEntry;
use std::collections::VecDeque;

/// Bounded undo/redo double stack.
///
/// Entries move between the stacks, they are never copied. Pushing a new
/// entry invalidates the redo stack; the undo stack evicts its oldest entry
/// once it exceeds the capacity.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    undo: VecDeque<CommandHistoryEntry>,
    redo: Vec<CommandHistoryEntry>,
    capacity: usize,
    /// Bumped whenever the redo stack is invalidated.
    generation: u64,
}

/// An entry detached from the undo stack while its undo runs.
///
/// It sits on neither stack, so dispatches interleaving with a suspended
/// undo cannot see or consume it. Settle it with [`HistoryStore::finish_undo`].
#[derive(Debug)]
#[must_use = "a pending undo must be settled or the entry is lost"]
pub struct PendingUndo {
    pub entry: CommandHistoryEntry,
    generation: u64,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(100)
    }
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            generation: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a fresh execution. Clears the redo stack.
    pub fn push(&mut self, entry: CommandHistoryEntry) {
        self.redo.clear();
        self.generation += 1;
        self.push_replayed(entry);
    }

    /// Record a replayed (redone) execution without touching the redo stack.
    pub fn push_replayed(&mut self, entry: CommandHistoryEntry) {
        self.undo.push_back(entry);
        while self.undo.len() > self.capacity {
            if let Some(evicted) = self.undo.pop_front() {
                tracing::trace!(command = %evicted.command, "history entry evicted");
            }
        }
    }

    pub fn peek_undo(&self) -> Option<&CommandHistoryEntry> {
        self.undo.back()
    }

    pub fn peek_redo(&self) -> Option<&CommandHistoryEntry> {
        self.redo.last()
    }

    /// Move the newest undo entry onto the redo stack and return it.
    pub fn pop_undo(&mut self) -> Option<CommandHistoryEntry> {
        let entry = self.undo.pop_back()?;
        self.push_redo(entry.clone());
        Some(entry)
    }

    /// Move the newest redo entry back onto the undo stack and return it.
    pub fn pop_redo(&mut self) -> Option<CommandHistoryEntry> {
        let entry = self.redo.pop()?;
        self.push_replayed(entry.clone());
        Some(entry)
    }

    /// Detach the newest undo entry for an undo that may suspend.
    pub fn begin_undo(&mut self) -> Option<PendingUndo> {
        let entry = self.undo.pop_back()?;
        Some(PendingUndo {
            entry,
            generation: self.generation,
        })
    }

    /// Settle a pending undo. A successful undo moves the entry onto the redo
    /// stack, unless a newer push invalidated redo in the meantime; a failed
    /// one puts it back on the undo stack. Returns whether the entry was kept.
    pub fn finish_undo(&mut self, pending: PendingUndo, undone: bool) -> bool {
        if !undone {
            self.push_replayed(pending.entry);
            return true;
        }
        if pending.generation != self.generation {
            tracing::debug!(command = %pending.entry.command, "undone entry dropped, redo was invalidated");
            return false;
        }
        self.push_redo(pending.entry);
        true
    }

    /// Detach the newest redo entry without placing it anywhere.
    pub fn take_redo(&mut self) -> Option<CommandHistoryEntry> {
        self.redo.pop()
    }

    /// Put a detached redo entry back on top of the redo stack.
    pub fn restore_redo(&mut self, entry: CommandHistoryEntry) {
        self.push_redo(entry);
    }

    fn push_redo(&mut self, entry: CommandHistoryEntry) {
        self.redo.push(entry);
        if self.redo.len() > self.capacity {
            self.redo.remove(0);
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.generation += 1;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Entries on both stacks.
    pub fn size(&self) -> usize {
        self.undo.len() + self.redo.len()
    }

    /// Chronological view: undo stack oldest to newest, then the redo stack
    /// from the entry undone last to the one undone first.
    pub fn all(&self) -> Vec<CommandHistoryEntry> {
        self.undo
            .iter()
            .chain(self.redo.iter().rev())
            .cloned()
            .collect()
    }
}
