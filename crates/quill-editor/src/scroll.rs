//! Viewport scroller: which visual row sits at the top of the screen.
//!
//! The scroll state is an **anchor**: a logical line plus the number of that
//! line's visual rows scrolled above the viewport top. It persists across
//! renders and is nudged, never recomputed from the document start:
//!
//! ```text
//!            ┌──────────────────┐
//! line 2 ─┬─ │ gamma            │ ◀ anchor (2, 0)
//!         ├─ │ delta            │
//!         ├─ │ epsilon          │ ◀ cursor row 2
//!         └─ │ zeta eta         │
//!            └──────────────────┘
//! ```
//!
//! [`reveal`](Scroller::reveal) runs once before each render:
//!
//! 1. Clamp the anchor if the document shrank or the width changed.
//! 2. Measure the cursor's row relative to the anchor by walking only the
//!    lines between them.
//! 3. Cursor above the top: step the anchor back by exactly the deficit.
//! 4. Cursor below the bottom: step it forward by `row - height + 1`.
//! 5. Unless scrolling past the end is allowed, pull the anchor back while
//!    the rows left below it can't fill the viewport.
//!
//! Steps move one visual row at a time, so a one-row cursor move scrolls by
//! at most one row even inside a tall wrapped paragraph.

use tracing::trace;

use crate::buffer::{Buffer, LineEdit};
use crate::error::{Result, check_viewport};
use crate::position::Position;
use crate::wrap::WrapCache;

/// One visual row: segment `seg` of logical line `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    pub line: usize,
    pub seg: usize,
}

/// Persistent scroll state for one editing session.
#[derive(Debug, Clone, Default)]
pub struct Scroller {
    /// Logical line at (or partly above) the viewport top.
    line: usize,
    /// Visual rows of `line` scrolled above the top.
    offset: usize,
    scroll_past_end: bool,
}

impl Scroller {
    #[must_use]
    pub const fn new(scroll_past_end: bool) -> Self {
        Self {
            line: 0,
            offset: 0,
            scroll_past_end,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// `(anchor_line, anchor_visual_offset)`.
    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> (usize, usize) {
        (self.line, self.offset)
    }

    // -- Edits --------------------------------------------------------------

    /// Keep the anchor on the same text when lines above it were replaced.
    pub fn apply_edits(&mut self, edits: &[LineEdit]) {
        for edit in edits {
            if self.line <= edit.line {
                continue;
            }
            let rel = self.line - edit.line;
            self.line = if rel > edit.removed {
                self.line - edit.removed + edit.inserted
            } else {
                edit.line + rel.min(edit.inserted)
            };
        }
    }

    // -- Reveal -------------------------------------------------------------

    /// Adjust the anchor so `cursor` lies within the `height` rows of the
    /// viewport. Returns the cursor's row on screen.
    ///
    /// # Errors
    ///
    /// [`InvalidViewport`](crate::EditorError::InvalidViewport) when `height`
    /// is 0. The anchor is left untouched.
    pub fn reveal(
        &mut self,
        cursor: Position,
        height: usize,
        buf: &Buffer,
        wraps: &mut WrapCache,
    ) -> Result<usize> {
        check_viewport(wraps.width(), height)?;
        let before = self.anchor();

        self.clamp(buf, wraps);

        let row = self.row_of(cursor, buf, wraps);
        if row < 0 {
            self.retreat(row.unsigned_abs(), buf, wraps);
        } else if row.unsigned_abs() >= height {
            self.advance(row.unsigned_abs() - height + 1, buf, wraps);
        }

        if !self.scroll_past_end {
            let remaining = self.rows_to_end(height, buf, wraps);
            if remaining < height {
                self.retreat(height - remaining, buf, wraps);
            }
        }

        if self.anchor() != before {
            trace!(
                target: "editor.scroll",
                from = ?before,
                to = ?self.anchor(),
                cursor = %cursor,
                "anchor moved"
            );
        }

        let row = self.row_of(cursor, buf, wraps);
        Ok(row.unsigned_abs().min(height - 1))
    }

    /// The cursor's visual row relative to the anchor row. Negative when the
    /// cursor is above the viewport. Walks only the lines between the two.
    #[must_use]
    pub fn row_of(&self, pos: Position, buf: &Buffer, wraps: &mut WrapCache) -> isize {
        let seg = wraps.segment_of(buf, pos.line, pos.col);
        if pos.line >= self.line {
            let between: usize = (self.line..pos.line)
                .map(|l| wraps.segment_count(buf, l))
                .sum();
            signed(between + seg) - signed(self.offset)
        } else {
            let between: usize = (pos.line..self.line)
                .map(|l| wraps.segment_count(buf, l))
                .sum();
            signed(seg) - signed(between + self.offset)
        }
    }

    /// The rows on screen, top to bottom, at most `height` of them.
    #[must_use]
    pub fn visible_rows(&self, height: usize, buf: &Buffer, wraps: &mut WrapCache) -> Vec<RowRef> {
        let mut rows = Vec::with_capacity(height);
        let mut line = self.line;
        let mut seg = self.offset;
        while rows.len() < height && line < buf.line_count() {
            let count = wraps.segment_count(buf, line);
            while seg < count && rows.len() < height {
                rows.push(RowRef { line, seg });
                seg += 1;
            }
            line += 1;
            seg = 0;
        }
        rows
    }

    // -- Anchor walking -----------------------------------------------------

    fn clamp(&mut self, buf: &Buffer, wraps: &mut WrapCache) {
        let last = buf.line_count() - 1;
        if self.line > last {
            self.line = last;
            self.offset = wraps.segment_count(buf, last) - 1;
        }
        let count = wraps.segment_count(buf, self.line);
        if self.offset >= count {
            self.offset = count - 1;
        }
    }

    /// Step the anchor `n` rows down, stopping at the last row.
    fn advance(&mut self, n: usize, buf: &Buffer, wraps: &mut WrapCache) {
        for _ in 0..n {
            if self.offset + 1 < wraps.segment_count(buf, self.line) {
                self.offset += 1;
            } else if self.line + 1 < buf.line_count() {
                self.line += 1;
                self.offset = 0;
            } else {
                break;
            }
        }
    }

    /// Step the anchor `n` rows up, stopping at the document start.
    fn retreat(&mut self, n: usize, buf: &Buffer, wraps: &mut WrapCache) {
        for _ in 0..n {
            if self.offset > 0 {
                self.offset -= 1;
            } else if self.line > 0 {
                self.line -= 1;
                self.offset = wraps.segment_count(buf, self.line) - 1;
            } else {
                break;
            }
        }
    }

    /// Rows from the anchor to the document end, counting no further than
    /// `cap`.
    fn rows_to_end(&self, cap: usize, buf: &Buffer, wraps: &mut WrapCache) -> usize {
        let mut rows = wraps.segment_count(buf, self.line) - self.offset;
        let mut line = self.line + 1;
        while rows < cap && line < buf.line_count() {
            rows += wraps.segment_count(buf, line);
            line += 1;
        }
        rows
    }
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) const fn signed(n: usize) -> isize {
    n as isize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
