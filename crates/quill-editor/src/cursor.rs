//! Cursor: position tracking with movement and selection.
//!
//! The `Cursor` tracks a position in a buffer, a goal column for vertical
//! movement, and an optional selection anchor. Every movement keeps the
//! position inside the document; there is no way to point past it.
//!
//! # Visual rows
//!
//! Lines are soft-wrapped, so Up and Down move between **visual rows**, not
//! logical lines. Inside a wrapped paragraph, Down moves to the next row of
//! the same paragraph. Vertical moves take the [`WrapCache`] for the current
//! width.
//!
//! # Goal column
//!
//! The goal column is a terminal column inside the row. Moving down through
//! a short row and then onto a long one lands back on the remembered column.
//! Any horizontal movement forgets it.
//!
//! # Graphemes
//!
//! Left and Right step over whole extended grapheme clusters, so the cursor
//! never lands between a base character and its combining marks.

use unicode_segmentation::UnicodeSegmentation;

use crate::buffer::Buffer;
use crate::position::{Position, Range, Selection};
use crate::word;
use crate::wrap::{WrapCache, char_width};

/// A cursor in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    /// Terminal column inside the visual row that Up/Down aim for.
    goal_x: Option<usize>,
    /// Other end of the selection, if any.
    anchor: Option<Position>,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            goal_x: None,
            anchor: None,
        }
    }

    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            goal_x: None,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// The selection, if one is active and non-empty.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.anchor
            .map(|anchor| Selection::new(anchor, self.pos))
            .filter(|sel| !sel.is_empty())
    }

    /// The selected range, ordered, if one is active and non-empty.
    #[must_use]
    pub fn selected_range(&self) -> Option<Range> {
        self.selection().map(Selection::range)
    }

    // -- Selection control --------------------------------------------------

    /// Start a selection here unless one is already anchored.
    pub const fn ensure_anchor(&mut self) {
        if self.anchor.is_none() {
            self.anchor = Some(self.pos);
        }
    }

    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Select `sel`, leaving the cursor on its active end.
    pub fn select(&mut self, sel: Selection, buf: &Buffer) {
        self.pos = buf.clamp_position(sel.active);
        self.anchor = Some(buf.clamp_position(sel.anchor));
        self.goal_x = None;
    }

    // -- Absolute placement -------------------------------------------------

    /// Move to `pos`, clamped into the document. Keeps any selection anchor.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer) {
        self.pos = buf.clamp_position(pos);
        self.goal_x = None;
    }

    // -- Horizontal motion --------------------------------------------------

    /// One grapheme left; from column 0, to the end of the previous line.
    pub fn move_left(&mut self, buf: &Buffer) {
        let target = if self.pos.col > 0 {
            Position::new(self.pos.line, prev_grapheme_col(&buf.line_string(self.pos.line), self.pos.col))
        } else if self.pos.line > 0 {
            let line = self.pos.line - 1;
            Position::new(line, buf.line_len(line))
        } else {
            self.pos
        };
        self.set_position(target, buf);
    }

    /// One grapheme right; from the line end, to the start of the next line.
    pub fn move_right(&mut self, buf: &Buffer) {
        let len = buf.line_len(self.pos.line);
        let target = if self.pos.col < len {
            Position::new(self.pos.line, next_grapheme_col(&buf.line_string(self.pos.line), self.pos.col))
        } else if self.pos.line + 1 < buf.line_count() {
            Position::new(self.pos.line + 1, 0)
        } else {
            self.pos
        };
        self.set_position(target, buf);
    }

    pub fn word_left(&mut self, buf: &Buffer) {
        self.set_position(word::word_left(buf, self.pos), buf);
    }

    pub fn word_right(&mut self, buf: &Buffer) {
        self.set_position(word::word_right(buf, self.pos), buf);
    }

    /// Start of the logical line.
    pub fn move_to_line_start(&mut self, buf: &Buffer) {
        self.set_position(Position::new(self.pos.line, 0), buf);
    }

    /// End of the logical line.
    pub fn move_to_line_end(&mut self, buf: &Buffer) {
        self.set_position(Position::new(self.pos.line, buf.line_len(self.pos.line)), buf);
    }

    pub fn move_to_document_start(&mut self, buf: &Buffer) {
        self.set_position(Position::ZERO, buf);
    }

    pub fn move_to_document_end(&mut self, buf: &Buffer) {
        self.set_position(buf.end_position(), buf);
    }

    // -- Vertical motion ----------------------------------------------------

    /// Move `rows` visual rows down (positive) or up (negative), aiming for
    /// the goal column. Stops at the first or last row of the document.
    pub fn move_visual(&mut self, rows: isize, buf: &Buffer, wraps: &mut WrapCache) {
        let tab_width = wraps.tab_width();
        let mut line = self.pos.line;
        let mut seg = wraps.segment_of(buf, line, self.pos.col);
        let (start, _) = wraps.bounds(buf, line, seg);
        let goal_x = self.goal_x.unwrap_or_else(|| {
            buf.line_string(line)
                .chars()
                .skip(start)
                .take(self.pos.col.saturating_sub(start))
                .map(|ch| char_width(ch, tab_width))
                .sum()
        });

        for _ in 0..rows.unsigned_abs() {
            if rows > 0 {
                if seg + 1 < wraps.segment_count(buf, line) {
                    seg += 1;
                } else if line + 1 < buf.line_count() {
                    line += 1;
                    seg = 0;
                } else {
                    break;
                }
            } else if seg > 0 {
                seg -= 1;
            } else if line > 0 {
                line -= 1;
                seg = wraps.segment_count(buf, line) - 1;
            } else {
                break;
            }
        }

        let col = col_at_x(buf, wraps, line, seg, goal_x);
        self.pos = Position::new(line, col);
        self.goal_x = Some(goal_x);
    }
}

/// Char column in segment `seg` of `line` closest to terminal column `x`
/// without passing it. Never returns the start of the following segment.
fn col_at_x(buf: &Buffer, wraps: &mut WrapCache, line: usize, seg: usize, x: usize) -> usize {
    let tab_width = wraps.tab_width();
    let last = seg + 1 >= wraps.segment_count(buf, line);
    let (start, end) = wraps.bounds(buf, line, seg);
    let limit = if last || end == start { end } else { end - 1 };

    let text = buf.line_string(line);
    let mut acc = 0;
    let mut col = start;
    for ch in text.chars().skip(start).take(end - start) {
        let cw = char_width(ch, tab_width);
        if acc + cw > x {
            break;
        }
        acc += cw;
        col += 1;
    }

    // Don't stop inside a grapheme cluster.
    let col = col.min(limit);
    if col > start && col < buf.line_len(line) {
        prev_grapheme_col(&text, col + 1).max(start)
    } else {
        col
    }
}

// ---------------------------------------------------------------------------
// Grapheme boundaries
// ---------------------------------------------------------------------------

/// Char offsets of every grapheme boundary in `line`, starting with 0 and
/// ending with the line length.
fn grapheme_boundaries(line: &str) -> impl Iterator<Item = usize> + '_ {
    let mut col = 0;
    std::iter::once(0).chain(line.graphemes(true).map(move |g| {
        col += g.chars().count();
        col
    }))
}

/// The grapheme boundary after `col`, or the line length.
#[must_use]
pub fn next_grapheme_col(line: &str, col: usize) -> usize {
    grapheme_boundaries(line)
        .find(|&b| b > col)
        .unwrap_or_else(|| line.chars().count())
}

/// The grapheme boundary before `col`, or 0.
#[must_use]
pub fn prev_grapheme_col(line: &str, col: usize) -> usize {
    grapheme_boundaries(line)
        .take_while(|&b| b < col)
        .last()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
