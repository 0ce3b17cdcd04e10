//! Document coordinates: positions, ranges, and selections.
//!
//! All coordinates are **0-indexed**. `line` indexes logical lines (no line
//! terminator included); `col` counts Unicode scalar values (chars) from the
//! start of that line, never bytes and never terminal columns. Terminal
//! columns only exist in the wrap and render layers.
//!
//! The status line converts to 1-indexed; that conversion never happens here
//! except in the `Display` impls.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A place in the document: (logical line, char column).
///
/// A column equal to the line's length is valid and means "after the last
/// character"; the editor is non-modal, so the cursor can always sit there.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Document start.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open span `[start, end)` with `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range from two positions in either order.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at `pos`.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.line == self.end.line && self.start.col == self.end.col
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A selection: the `anchor` stays put, the `active` end follows the cursor.
///
/// Unlike [`Range`], a selection remembers its direction. Find/replace uses
/// that to park the cursor on a match's start while the anchor sits on its
/// end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    #[inline]
    #[must_use]
    pub const fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// The selected span, ordered.
    #[inline]
    #[must_use]
    pub fn range(self) -> Range {
        Range::ordered(self.anchor, self.active)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.anchor == self.active
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position -----------------------------------------------------------

    #[test]
    fn ordering_is_line_then_column() {
        let positions = [
            Position::ZERO,
            Position::new(0, 1),
            Position::new(0, 100),
            Position::new(1, 0),
            Position::new(10, 0),
        ];
        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should be < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn display_is_one_indexed() {
        assert_eq!(Position::ZERO.to_string(), "1:1");
        assert_eq!(Position::new(9, 14).to_string(), "10:15");
        assert_eq!(format!("{:?}", Position::new(2, 5)), "Pos(2:5)");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn ordered_swaps_backwards_input() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let r = Range::ordered(a, b);
        assert_eq!(r.start, b);
        assert_eq!(r.end, a);
    }

    #[test]
    fn point_range_is_empty() {
        assert!(Range::point(Position::new(5, 5)).is_empty());
        assert!(!Range::ordered(Position::new(1, 0), Position::new(0, 9)).is_empty());
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn selection_keeps_direction_but_range_is_ordered() {
        let sel = Selection::new(Position::new(0, 9), Position::new(0, 4));
        assert_eq!(sel.active, Position::new(0, 4));
        assert_eq!(sel.range().start, Position::new(0, 4));
        assert_eq!(sel.range().end, Position::new(0, 9));
        assert!(!sel.is_empty());
        assert!(Selection::new(Position::ZERO, Position::ZERO).is_empty());
    }
}
