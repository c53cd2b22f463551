use std::collections::VecDeque;

use crate::canvas::RasterBuffer;

/// Snapshots kept when nothing else is configured.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 25;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Full copy of the buffer after one committed edit.
#[derive(Clone, Debug)]
pub struct CanvasSnapshot {
    description: String,
    buffer: RasterBuffer,
}

impl CanvasSnapshot {
    pub fn capture(buffer: &RasterBuffer, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            buffer: buffer.clone(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    pub fn memory_size(&self) -> usize {
        self.buffer.memory_bytes()
    }
}

// ============================================================================
// HISTORY MANAGER
// ============================================================================

/// Bounded undo/redo over full-frame snapshots.
///
/// The top of `undo_stack` always mirrors the live buffer.  The bottom entry
/// is the baseline: undo never pops it, so a fresh session reports nothing
/// to undo.  Exceeding `max_history_size` evicts from the bottom.
pub struct HistoryManager {
    undo_stack: VecDeque<CanvasSnapshot>,
    redo_stack: VecDeque<CanvasSnapshot>,
    max_history_size: usize,
    max_memory_bytes: Option<usize>,
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_STEPS)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            max_memory_bytes: None,
            total_memory: 0,
        }
    }

    /// Additionally evict old snapshots once the undo stack holds more than
    /// `bytes`.  The newest entry is always kept.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self.prune();
        self
    }

    /// Drop all history and install `buffer` as the new baseline.
    pub fn reset(&mut self, buffer: &RasterBuffer, description: impl Into<String>) {
        self.clear();
        self.snapshot(buffer, description);
    }

    /// Record a committed edit.  Any redo history is discarded.
    pub fn snapshot(&mut self, buffer: &RasterBuffer, description: impl Into<String>) {
        self.redo_stack.clear();

        let snap = CanvasSnapshot::capture(buffer, description);
        log::debug!("history: snapshot '{}'", snap.description());
        self.total_memory += snap.memory_size();
        self.undo_stack.push_back(snap);

        self.prune();
    }

    /// Step back one edit.  Returns the buffer to restore, or `None` when only
    /// the baseline is left.
    pub fn undo(&mut self) -> Option<RasterBuffer> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let undone = self.undo_stack.pop_back()?;
        self.total_memory = self.total_memory.saturating_sub(undone.memory_size());
        log::debug!("history: undo '{}'", undone.description());
        self.redo_stack.push_back(undone);
        self.undo_stack.back().map(|s| s.buffer.clone())
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> Option<RasterBuffer> {
        let snap = self.redo_stack.pop_back()?;
        log::debug!("history: redo '{}'", snap.description());
        let restored = snap.buffer.clone();
        self.total_memory += snap.memory_size();
        self.undo_stack.push_back(snap);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.undo_stack.back().map(|s| s.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|s| s.description())
    }

    /// Get all undo descriptions (most recent first)
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(|s| s.description.clone()).collect()
    }

    /// Bytes held by undo snapshots (redo entries are not counted).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    /// Most recent snapshot, which matches the live buffer.
    pub fn current(&self) -> Option<&RasterBuffer> {
        self.undo_stack.back().map(|s| &s.buffer)
    }

    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }

        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.undo_stack.len() > 1 {
                if let Some(removed) = self.undo_stack.pop_front() {
                    self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
