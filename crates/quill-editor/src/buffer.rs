//! Document buffer: the ordered sequence of logical lines.
//!
//! A `Buffer` wraps a [`ropey::Rope`] holding the document with every line
//! ending normalized to `\n`. Logical lines are the `\n`-separated pieces;
//! none of the public accessors ever hand out a line terminator.
//!
//! # Design choices
//!
//! - **Columns are char offsets.** Byte offsets never leak out of this
//!   module. Grapheme handling lives one layer up, in the cursor motions.
//!
//! - **Line endings are detected on load** and re-applied by
//!   [`text`](Buffer::text), so a CRLF file is saved back as CRLF even though
//!   the editor only ever sees `\n`.
//!
//! - **Out-of-range input is clamped.** Deleting past the end of the
//!   document deletes up to the end; inserting past the end of a line inserts
//!   at its end. Nothing here panics on bad coordinates.
//!
//! - **Damage log.** Every mutation appends a [`LineEdit`] describing which
//!   logical lines it replaced. The wrap cache drains the log so it only
//!   re-wraps lines an edit actually touched.
//!
//! - **No undo here.** History wraps buffer mutations one layer up.

use std::borrow::Cow;
use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the dominant line ending style: the most frequent of `\n`,
    /// `\r\n` and lone `\r`, ties going to the one seen first. Text with no
    /// line endings is `Lf`.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        // (style, count, first seen at)
        let mut tally = [
            (Self::Lf, 0_usize, usize::MAX),
            (Self::CrLf, 0, usize::MAX),
            (Self::Cr, 0, usize::MAX),
        ];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let (slot, step) = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => (1, 2),
                b'\r' => (2, 1),
                b'\n' => (0, 1),
                _ => {
                    i += 1;
                    continue;
                }
            };
            let entry = &mut tally[slot];
            entry.1 += 1;
            entry.2 = entry.2.min(i);
            i += step;
        }
        tally
            .iter()
            .filter(|(_, count, _)| *count > 0)
            .max_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)))
            .map_or(Self::Lf, |(style, _, _)| *style)
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

/// Rewrite `\r\n` and lone `\r` as `\n`. Borrows when there is nothing to do.
#[must_use]
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// Damage log
// ---------------------------------------------------------------------------

/// The logical lines replaced by one mutation.
///
/// Old lines `line ..= line + removed` were replaced by new lines
/// `line ..= line + inserted`. A single-line edit is `removed == inserted == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
    pub line: usize,
    pub removed: usize,
    pub inserted: usize,
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The document text, as logical lines.
pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
    modified: bool,
    edits: Vec<LineEdit>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty document: one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::Lf,
            modified: false,
            edits: Vec::new(),
        }
    }

    /// Build a buffer from text in any line ending style.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            line_ending: LineEnding::detect(text),
            rope: Rope::from_str(&normalize_line_endings(text)),
            modified: false,
            edits: Vec::new(),
        }
    }

    // -- Text access --------------------------------------------------------

    /// The underlying rope (`\n` line endings only).
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of logical lines. Never zero: an empty document has one empty
    /// line, and a trailing `\n` starts a final empty line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A logical line without its terminator, or `None` past the end.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// A logical line as an owned string (empty past the end).
    #[must_use]
    pub fn line_string(&self, line: usize) -> String {
        self.line(line).map(String::from).unwrap_or_default()
    }

    /// Length of a logical line in chars, 0 past the end.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |l| l.len_chars())
    }

    /// The whole document with `\n` line endings.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// The whole document with the line endings it was loaded with.
    #[must_use]
    pub fn text(&self) -> String {
        let raw = self.rope.to_string();
        match self.line_ending {
            LineEnding::Lf => raw,
            other => raw.replace('\n', other.as_str()),
        }
    }

    /// Text in a range, clamped to the document.
    #[must_use]
    pub fn slice(&self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end).max(start);
        self.rope.slice(start..end).to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of a position after clamping it into the document.
    #[must_use]
    pub fn char_idx(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// Position of an absolute char index, clamped to the document end.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Position {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    /// Nearest valid position: line clamped to the last line, column clamped
    /// to the line's length.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// The position after the last character of the document.
    #[must_use]
    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len(last))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos` (clamped) and return the position just after
    /// the inserted text. `text` may hold any line ending style.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let text = normalize_line_endings(text);
        let pos = self.clamp_position(pos);
        let idx = self.rope.line_to_char(pos.line) + pos.col;
        self.rope.insert(idx, &text);
        self.modified = true;
        self.edits.push(LineEdit {
            line: pos.line,
            removed: 0,
            inserted: text.matches('\n').count(),
        });
        self.char_idx_to_pos(idx + text.chars().count())
    }

    /// Delete the text in `range` (clamped) and return what was removed.
    /// An empty range is a no-op and returns an empty string.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        if start >= end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        let first = self.rope.char_to_line(start);
        self.rope.remove(start..end);
        self.modified = true;
        self.edits.push(LineEdit {
            line: first,
            removed: removed.matches('\n').count(),
            inserted: 0,
        });
        removed
    }

    // -- Metadata -----------------------------------------------------------

    /// True when the text changed since load or the last [`mark_saved`](Self::mark_saved).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Called by the shell after it persisted [`text`](Self::text).
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Drain the damage log accumulated since the last call.
    pub fn take_line_edits(&mut self) -> Vec<LineEdit> {
        std::mem::take(&mut self.edits)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
