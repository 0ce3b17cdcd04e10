//! Word motions for a non-modal editor.
//!
//! | Motion | Key | Lands on |
//! |--------|-----|----------|
//! | [`word_right`] | Ctrl-Right | end of the current or next word |
//! | [`word_left`] | Ctrl-Left | start of the current or previous word |
//!
//! A **word** is a run of word characters (letters, digits, underscore) or a
//! run of other non-blank characters. `hello.world` holds three words. Both
//! motions skip blanks and line breaks freely; they stop only at the document
//! ends.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Word,
    Punctuation,
    /// Spaces, tabs, and the `\n` between lines.
    Blank,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// Forward past any blanks, then to the end of the word that follows.
#[must_use]
pub fn word_right(buf: &Buffer, pos: Position) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();
    let mut idx = buf.char_idx(pos);

    while idx < total && classify(rope.char(idx)) == CharClass::Blank {
        idx += 1;
    }
    if idx < total {
        let class = classify(rope.char(idx));
        while idx < total && classify(rope.char(idx)) == class {
            idx += 1;
        }
    }

    buf.char_idx_to_pos(idx)
}

/// Backward past any blanks, then to the start of the word before them.
#[must_use]
pub fn word_left(buf: &Buffer, pos: Position) -> Position {
    let rope = buf.rope();
    let mut idx = buf.char_idx(pos);

    while idx > 0 && classify(rope.char(idx - 1)) == CharClass::Blank {
        idx -= 1;
    }
    if idx > 0 {
        let class = classify(rope.char(idx - 1));
        while idx > 0 && classify(rope.char(idx - 1)) == class {
            idx -= 1;
        }
    }

    buf.char_idx_to_pos(idx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
