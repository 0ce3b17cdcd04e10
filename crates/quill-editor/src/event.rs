//! Input events and feedback notices.
//!
//! [`Event`] is the key-binding surface: the shell maps physical keys onto
//! these and hands them to [`Session::dispatch`](crate::Session::dispatch)
//! one at a time. [`Notice`] is the one-shot feedback that comes back on the
//! render model.

use std::fmt;

/// A cursor motion. Used plain (clears the selection) or with
/// [`Event::Select`] (extends it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// One grapheme left, wrapping to the previous line.
    Left,
    /// One grapheme right, wrapping to the next line.
    Right,
    WordLeft,
    WordRight,
    /// One visual row up.
    Up,
    /// One visual row down.
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    /// First line after the leading metadata block.
    BodyStart,
    /// `height - 1` visual rows up.
    PageUp,
    /// `height - 1` visual rows down.
    PageDown,
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Text ---------------------------------------------------------------
    /// Type one character. While the find panel is open, edits the focused
    /// field instead.
    Insert(char),
    /// Paste or programmatic insert; one undo step regardless of length.
    InsertText(String),
    /// Enter. In the find panel, commits the term or replaces one match.
    Newline,
    DeleteBackward,
    DeleteForward,

    // -- Cursor and selection -----------------------------------------------
    Move(Motion),
    Select(Motion),
    SelectAll,
    Copy,
    Cut,

    // -- History ------------------------------------------------------------
    Undo,
    Redo,

    // -- Markdown -----------------------------------------------------------
    ToggleBold,
    ToggleItalic,
    InsertFootnote,
    InsertFrontmatter,

    // -- Find/replace -------------------------------------------------------
    /// Open the panel, or flip focus between it and the document when it is
    /// already open.
    FindOpen,
    FindCommit,
    FindNext,
    FindPrevious,
    /// Move focus between the term and replacement fields.
    FindSwitchField,
    /// Close the panel (back to Idle).
    FindClose,
    ReplaceOne,
    ReplaceAll,

    // -- Display ------------------------------------------------------------
    /// Flip the status line between word and paragraph counts.
    ToggleStatsDisplay,
    /// Re-render only (e.g. after a terminal resize).
    Refresh,
}

/// One-shot feedback for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The committed term does not occur in the document.
    NoMatches { term: String },
    /// Find was committed with a blank term.
    EmptySearchTerm,
    /// Now on match `index` (1-based) of `total`.
    Match { index: usize, total: usize },
    Replaced { count: usize },
    FrontmatterInserted,
    /// Every configured frontmatter field is already present.
    FrontmatterComplete,
    Copied,
    Cut,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatches { term } => write!(f, "No matches for \"{term}\""),
            Self::EmptySearchTerm => f.write_str("Nothing to search for"),
            Self::Match { index, total } => write!(f, "Match {index} of {total}"),
            Self::Replaced { count: 1 } => f.write_str("Replaced 1 occurrence"),
            Self::Replaced { count } => write!(f, "Replaced {count} occurrences"),
            Self::FrontmatterInserted => f.write_str("Frontmatter inserted"),
            Self::FrontmatterComplete => f.write_str("All frontmatter properties already present"),
            Self::Copied => f.write_str("Copied"),
            Self::Cut => f.write_str("Cut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_read_naturally() {
        assert_eq!(Notice::Match { index: 2, total: 5 }.to_string(), "Match 2 of 5");
        assert_eq!(Notice::Replaced { count: 1 }.to_string(), "Replaced 1 occurrence");
        assert_eq!(Notice::Replaced { count: 3 }.to_string(), "Replaced 3 occurrences");
        assert_eq!(
            Notice::NoMatches { term: "the".into() }.to_string(),
            "No matches for \"the\""
        );
    }
}
