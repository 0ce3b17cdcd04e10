//! Undo/redo history: one step per user action.
//!
//! Edits go through [`History::insert`] and [`History::delete`] between a
//! [`begin`](History::begin) and a [`commit`](History::commit). Everything
//! recorded in between becomes one step, so a keystroke, a paste, an
//! emphasis toggle and a whole replace-all each undo in one go.
//!
//! ```text
//!   begin(cursor) ─▶ insert / delete ... ─▶ commit(cursor)
//!                                              │
//!             undone ◀── undo ── done ◀────────┘
//!                    ─── redo ─▶
//! ```
//!
//! A step that recorded nothing is dropped on commit. Committing a new step
//! clears the redo side. Neither side is capped.

use tracing::debug;

use crate::buffer::{Buffer, normalize_line_endings};
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One recorded buffer change, text in `\n` form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Inserted { at: Position, text: String },
    Removed { at: Position, text: String },
}

impl Change {
    fn span(at: Position, text: &str) -> Range {
        Range::ordered(at, end_after_insert(at, text))
    }

    fn apply(&self, buf: &mut Buffer) {
        match self {
            Self::Inserted { at, text } => {
                buf.insert(*at, text);
            }
            Self::Removed { at, text } => {
                buf.delete(Self::span(*at, text));
            }
        }
    }

    fn unapply(&self, buf: &mut Buffer) {
        match self {
            Self::Inserted { at, text } => {
                buf.delete(Self::span(*at, text));
            }
            Self::Removed { at, text } => {
                buf.insert(*at, text);
            }
        }
    }
}

/// The changes of one user action and the cursor on either side of it.
#[derive(Debug, Clone)]
struct Step {
    changes: Vec<Change>,
    cursor_before: Position,
    cursor_after: Position,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Linear undo/redo for one buffer.
#[derive(Debug, Default)]
pub struct History {
    done: Vec<Step>,
    undone: Vec<Step>,
    open: Option<Step>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            open: None,
        }
    }

    /// Open a step. `cursor` is where undo puts the cursor back.
    /// A step left open by an earlier `begin` is committed first.
    pub fn begin(&mut self, cursor: Position) {
        if self.open.is_some() {
            self.commit(cursor);
        }
        self.open = Some(Step {
            changes: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
        });
    }

    /// Insert `text` at `pos` and record it in the open step. Returns the
    /// position just past the inserted text.
    pub fn insert(&mut self, buf: &mut Buffer, pos: Position, text: &str) -> Position {
        let at = buf.clamp_position(pos);
        let end = buf.insert(at, text);
        if !text.is_empty() {
            self.record(Change::Inserted {
                at,
                text: normalize_line_endings(text).into_owned(),
            });
        }
        end
    }

    /// Delete `range` and record it in the open step. Returns what was removed.
    pub fn delete(&mut self, buf: &mut Buffer, range: Range) -> String {
        let at = buf.clamp_position(range.start);
        let text = buf.delete(range);
        if !text.is_empty() {
            self.record(Change::Removed { at, text: text.clone() });
        }
        text
    }

    fn record(&mut self, change: Change) {
        if let Some(step) = &mut self.open {
            step.changes.push(change);
        }
    }

    /// Close the open step. `cursor` is where redo puts the cursor.
    pub fn commit(&mut self, cursor: Position) {
        let Some(mut step) = self.open.take() else {
            return;
        };
        if step.changes.is_empty() {
            return;
        }
        step.cursor_after = cursor;
        debug!(
            target: "editor.history",
            changes = step.changes.len(),
            dropped_redo = self.undone.len(),
            "commit"
        );
        self.undone.clear();
        self.done.push(step);
    }

    /// Revert the latest step and return the cursor from before it. An open
    /// step is committed first.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        if let Some(after) = self.open.as_ref().map(|s| s.cursor_after) {
            self.commit(after);
        }
        let step = self.done.pop()?;
        for change in step.changes.iter().rev() {
            change.unapply(buf);
        }
        let cursor = step.cursor_before;
        self.undone.push(step);
        debug!(target: "editor.history", done = self.done.len(), undone = self.undone.len(), "undo");
        Some(cursor)
    }

    /// Replay the latest undone step and return the cursor from after it.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let step = self.undone.pop()?;
        for change in &step.changes {
            change.apply(buf);
        }
        let cursor = step.cursor_after;
        self.done.push(step);
        debug!(target: "editor.history", done = self.done.len(), undone = self.undone.len(), "redo");
        Some(cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty() || self.open.as_ref().is_some_and(|s| !s.changes.is_empty())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Committed steps available to undo.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.undone.len()
    }
}

/// Where the cursor lands after inserting `text` (`\n` endings) at `start`.
pub(crate) fn end_after_insert(start: Position, text: &str) -> Position {
    text.chars().fold(start, |pos, ch| {
        if ch == '\n' {
            Position::new(pos.line + 1, 0)
        } else {
            Position::new(pos.line, pos.col + 1)
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
