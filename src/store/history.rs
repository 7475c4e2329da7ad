use std::collections::VecDeque;

use crate::store::state::CanvasState;

/// Undo/redo stacks of full [`CanvasState`] snapshots.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: VecDeque<CanvasState>,
    redo: Vec<CanvasState>,
    /// 0 means unbounded.
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the pre-mutation state and drop the redo branch.
    pub fn push(&mut self, prev: CanvasState) {
        self.undo.push_back(prev);
        self.redo.clear();
        if self.limit > 0 {
            while self.undo.len() > self.limit {
                self.undo.pop_front();
            }
        }
    }

    /// Replace `current` with the most recent undo snapshot. Returns `false` when empty.
    pub fn undo(&mut self, current: &mut CanvasState) -> bool {
        let Some(prev) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, prev));
        true
    }

    /// Replace `current` with the most recent redo snapshot. Returns `false` when empty.
    pub fn redo(&mut self, current: &mut CanvasState) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    /// Drop the newest undo entry if it equals `current` (an edit that changed nothing).
    pub fn discard_if_unchanged(&mut self, current: &CanvasState) -> bool {
        if self.undo.back() == Some(current) {
            self.undo.pop_back();
            return true;
        }
        false
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

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Visit every stored snapshot (used to patch in late-loaded assets).
    pub fn for_each_state_mut(&mut self, mut f: impl FnMut(&mut CanvasState)) {
        for s in self.undo.iter_mut() {
            f(s);
        }
        for s in self.redo.iter_mut() {
            f(s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/history.rs"]
mod tests;
