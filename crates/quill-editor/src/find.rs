//! Find/replace: a state machine over the buffer and cursor.
//!
//! ```text
//!            open                commit (matches)
//!   Idle ──────────▶ AwaitingTerm ────────────────▶ Navigating ◀──┐
//!    ▲                 ▲   ▲  │ commit (none/empty)   │  │  ▲      │ next/prev
//!    │                 │   │  └─────────────────────┘  │  │      │
//!    │ close           │   └── replace-all ────────────┘  │ replace-one
//!    └─────────────────┴── (any state)                    ▼      │
//!                                                     ReplaceOne ─┘
//! ```
//!
//! Matching is a case-sensitive literal scan for non-overlapping
//! occurrences, left to right. Match offsets are absolute char indices into
//! the document (with `\n` line endings).
//!
//! The controller moves the cursor and sets the selection to the current
//! match (anchor on its end, cursor on its start). It never touches the
//! scroller; the session reveals the cursor before rendering, which is all a
//! "reveal request" amounts to.
//!
//! Replacing one match shifts the offsets of the later matches by the length
//! difference instead of rescanning, so the replacement text is never
//! re-matched. Replace-all is a single history transaction.

use tracing::debug;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::error::{EditorError, Result};
use crate::event::Notice;
use crate::history::History;
use crate::position::{Range, Selection};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the find/replace machine is. `Idle` means no panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FindMode {
    #[default]
    Idle,
    AwaitingTerm,
    Navigating,
    /// Navigating, with at least one match replaced since the last commit.
    ReplaceOne,
    /// Only observable while a replace-all is being applied.
    ReplaceAll,
}

impl FindMode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "EDIT",
            Self::AwaitingTerm => "FIND",
            Self::Navigating => "MATCH",
            Self::ReplaceOne => "REPLACE",
            Self::ReplaceAll => "REPLACE ALL",
        }
    }
}

/// The panel field receiving typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FindField {
    #[default]
    Term,
    Replacement,
}

/// One occurrence: absolute char index and length in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub len: usize,
}

impl Match {
    #[inline]
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }
}

/// What the shell draws for the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindPanel {
    pub term: String,
    pub replacement: String,
    pub field: FindField,
    pub focused: bool,
    /// 1-based index of the current match, when navigating.
    pub current: Option<usize>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Every non-overlapping occurrence of `term` in `text`, as char offsets.
#[must_use]
pub fn find_all(text: &str, term: &str) -> Vec<Match> {
    if term.is_empty() {
        return Vec::new();
    }
    let len = term.chars().count();
    let mut matches = Vec::new();
    let mut chars_before = 0;
    let mut last_byte = 0;
    for (byte, _) in text.match_indices(term) {
        chars_before += text[last_byte..byte].chars().count();
        matches.push(Match {
            start: chars_before,
            len,
        });
        chars_before += len;
        last_byte = byte + term.len();
    }
    matches
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Find/replace session state. Exists only while the panel is open.
#[derive(Debug, Clone)]
pub struct FindReplace {
    mode: FindMode,
    term: String,
    replacement: String,
    field: FindField,
    focused: bool,
    matches: Vec<Match>,
    current: usize,
}

impl FindReplace {
    /// Open the panel (Idle → AwaitingTerm), pre-filled with `last_term`.
    #[must_use]
    pub fn open(last_term: &str) -> Self {
        debug!(target: "editor.find", term = last_term, "open");
        Self {
            mode: FindMode::AwaitingTerm,
            term: last_term.to_string(),
            replacement: String::new(),
            field: FindField::Term,
            focused: true,
            matches: Vec::new(),
            current: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> FindMode {
        self.mode
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    #[inline]
    #[must_use]
    pub const fn field(&self) -> FindField {
        self.field
    }

    /// True when typed characters go to the panel rather than the document.
    #[inline]
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// The current match, while navigating.
    #[must_use]
    pub fn current_match(&self) -> Option<Match> {
        if self.is_navigating() {
            self.matches.get(self.current).copied()
        } else {
            None
        }
    }

    const fn is_navigating(&self) -> bool {
        matches!(self.mode, FindMode::Navigating | FindMode::ReplaceOne)
    }

    #[must_use]
    pub fn panel(&self) -> FindPanel {
        FindPanel {
            term: self.term.clone(),
            replacement: self.replacement.clone(),
            field: self.field,
            focused: self.focused,
            current: self.current_match().map(|_| self.current + 1),
            total: self.matches.len(),
        }
    }

    // -- Panel editing ------------------------------------------------------

    pub const fn toggle_focus(&mut self) {
        self.focused = !self.focused;
    }

    pub const fn switch_field(&mut self) {
        self.field = match self.field {
            FindField::Term => FindField::Replacement,
            FindField::Replacement => FindField::Term,
        };
        self.focused = true;
    }

    /// Append text to the focused field. Fields are single-line; line breaks
    /// are dropped. Editing the term drops back to AwaitingTerm.
    pub fn type_text(&mut self, text: &str) {
        let text: String = text.chars().filter(|&c| c != '\n' && c != '\r').collect();
        if text.is_empty() {
            return;
        }
        match self.field {
            FindField::Term => {
                self.term.push_str(&text);
                self.term_changed();
            }
            FindField::Replacement => self.replacement.push_str(&text),
        }
    }

    /// Delete the last character of the focused field.
    pub fn backspace(&mut self) {
        match self.field {
            FindField::Term => {
                if self.term.pop().is_some() {
                    self.term_changed();
                }
            }
            FindField::Replacement => {
                self.replacement.pop();
            }
        }
    }

    fn term_changed(&mut self) {
        if self.mode != FindMode::AwaitingTerm {
            self.transition(FindMode::AwaitingTerm);
        }
        self.matches.clear();
        self.current = 0;
    }

    fn transition(&mut self, to: FindMode) {
        debug!(target: "editor.find", from = ?self.mode, to = ?to, "transition");
        self.mode = to;
    }

    // -- Commit and navigation ----------------------------------------------

    /// Scan for the term (AwaitingTerm → Navigating) and select the first
    /// match at or after the cursor, wrapping to the first match.
    ///
    /// # Errors
    ///
    /// [`EmptySearchTerm`](EditorError::EmptySearchTerm) or
    /// [`NoMatches`](EditorError::NoMatches). Either way the controller stays
    /// in AwaitingTerm and the cursor is not moved.
    pub fn commit(&mut self, buf: &Buffer, cursor: &mut Cursor) -> Result<Notice> {
        self.matches.clear();
        self.current = 0;
        if self.mode != FindMode::AwaitingTerm {
            self.transition(FindMode::AwaitingTerm);
        }
        if self.term.is_empty() {
            return Err(EditorError::EmptySearchTerm);
        }

        let matches = find_all(&buf.contents(), &self.term);
        debug!(target: "editor.find", term = %self.term, matches = matches.len(), "scan");
        if matches.is_empty() {
            return Err(EditorError::NoMatches {
                term: self.term.clone(),
            });
        }

        let at = buf.char_idx(cursor.position());
        self.current = matches.iter().position(|m| m.start >= at).unwrap_or(0);
        self.matches = matches;
        self.transition(FindMode::Navigating);
        Ok(self.select_current(buf, cursor))
    }

    /// Advance to the next match, wrapping from last to first.
    ///
    /// # Errors
    ///
    /// From AwaitingTerm this commits first; see [`commit`](Self::commit).
    pub fn next(&mut self, buf: &Buffer, cursor: &mut Cursor) -> Result<Notice> {
        self.step(buf, cursor, true)
    }

    /// Retreat to the previous match, wrapping from first to last.
    ///
    /// # Errors
    ///
    /// From AwaitingTerm this commits first; see [`commit`](Self::commit).
    pub fn previous(&mut self, buf: &Buffer, cursor: &mut Cursor) -> Result<Notice> {
        self.step(buf, cursor, false)
    }

    fn step(&mut self, buf: &Buffer, cursor: &mut Cursor, forward: bool) -> Result<Notice> {
        if !self.is_navigating() {
            return self.commit(buf, cursor);
        }
        let total = self.matches.len();
        self.current = if forward {
            (self.current + 1) % total
        } else {
            (self.current + total - 1) % total
        };
        if self.mode == FindMode::ReplaceOne {
            self.transition(FindMode::Navigating);
        }
        Ok(self.select_current(buf, cursor))
    }

    fn select_current(&self, buf: &Buffer, cursor: &mut Cursor) -> Notice {
        let m = self.matches[self.current];
        let sel = Selection::new(buf.char_idx_to_pos(m.end()), buf.char_idx_to_pos(m.start));
        cursor.select(sel, buf);
        Notice::Match {
            index: self.current + 1,
            total: self.matches.len(),
        }
    }

    /// Rescan after the document changed outside find/replace (typing in the
    /// editor, undo, redo). Stays on the match nearest the cursor.
    pub fn rescan(&mut self, buf: &Buffer, cursor: &Cursor) {
        if !self.is_navigating() {
            return;
        }
        self.matches = find_all(&buf.contents(), &self.term);
        if self.matches.is_empty() {
            self.transition(FindMode::AwaitingTerm);
            self.current = 0;
            return;
        }
        let at = buf.char_idx(cursor.position());
        self.current = self.matches.iter().position(|m| m.end() > at).unwrap_or(0);
    }

    // -- Replacing ----------------------------------------------------------

    /// Replace the current match, then move on to the one after it.
    ///
    /// # Errors
    ///
    /// From AwaitingTerm this commits first; see [`commit`](Self::commit).
    pub fn replace_one(&mut self, buf: &mut Buffer, cursor: &mut Cursor, history: &mut History) -> Result<Notice> {
        if !self.is_navigating() {
            self.commit(buf, cursor)?;
        }
        let m = self.matches.remove(self.current);
        let repl_len = self.replacement.chars().count();

        let start = buf.char_idx_to_pos(m.start);
        history.begin(cursor.position());
        history.delete(buf, Range::ordered(start, buf.char_idx_to_pos(m.end())));
        let after = history.insert(buf, start, &self.replacement);
        history.commit(after);

        for later in &mut self.matches[self.current..] {
            later.start = later.start - m.len + repl_len;
        }
        debug!(target: "editor.find", at = m.start, left = self.matches.len(), "replace one");

        if self.matches.is_empty() {
            self.transition(FindMode::AwaitingTerm);
            self.current = 0;
            cursor.clear_anchor();
            cursor.set_position(after, buf);
        } else {
            self.current %= self.matches.len();
            self.transition(FindMode::ReplaceOne);
            self.select_current(buf, cursor);
        }
        Ok(Notice::Replaced { count: 1 })
    }

    /// Replace every match as one undo step, then return to AwaitingTerm
    /// with an empty match list.
    ///
    /// # Errors
    ///
    /// From AwaitingTerm this commits first; see [`commit`](Self::commit).
    pub fn replace_all(&mut self, buf: &mut Buffer, cursor: &mut Cursor, history: &mut History) -> Result<Notice> {
        if !self.is_navigating() {
            self.commit(buf, cursor)?;
        }
        self.transition(FindMode::ReplaceAll);
        let count = self.matches.len();
        let repl_len = self.replacement.chars().count();

        history.begin(cursor.position());
        for m in self.matches.iter().rev() {
            let start = buf.char_idx_to_pos(m.start);
            history.delete(buf, Range::ordered(start, buf.char_idx_to_pos(m.end())));
            history.insert(buf, start, &self.replacement);
        }
        // The current match's replacement, shifted by those before it.
        let current = self.matches[self.current];
        let landing = current.start - self.current * current.len + self.current * repl_len;
        let landing = buf.char_idx_to_pos(landing);
        history.commit(landing);

        cursor.clear_anchor();
        cursor.set_position(landing, buf);
        self.matches.clear();
        self.current = 0;
        debug!(target: "editor.find", count, "replace all");
        self.transition(FindMode::AwaitingTerm);
        Ok(Notice::Replaced { count })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn committed(text: &str, term: &str, at: Position) -> (Buffer, Cursor, FindReplace) {
        let buf = Buffer::from_text(text);
        let mut cursor = Cursor::at(at);
        let mut find = FindReplace::open("");
        find.type_text(term);
        find.commit(&buf, &mut cursor).unwrap();
        (buf, cursor, find)
    }

    // -- Scanning -----------------------------------------------------------

    #[test]
    fn find_all_is_literal_case_sensitive_and_non_overlapping() {
        assert_eq!(
            find_all("aaaa", "aa"),
            vec![Match { start: 0, len: 2 }, Match { start: 2, len: 2 }]
        );
        assert_eq!(find_all("The the THE", "the"), vec![Match { start: 4, len: 3 }]);
        assert_eq!(find_all("a.b a*b", "a*b"), vec![Match { start: 4, len: 3 }]);
        assert!(find_all("abc", "").is_empty());
    }

    #[test]
    fn find_all_reports_char_offsets() {
        assert_eq!(find_all("café café", "café"), vec![
            Match { start: 0, len: 4 },
            Match { start: 5, len: 4 },
        ]);
    }

    // -- Commit -------------------------------------------------------------

    #[test]
    fn commit_selects_first_match_after_cursor() {
        let (_, cursor, find) = committed("one two one\ntwo one", "one", pos(0, 3));
        assert_eq!(find.mode(), FindMode::Navigating);
        assert_eq!(find.matches().len(), 3);
        assert_eq!(cursor.position(), pos(0, 8));
        assert_eq!(cursor.anchor(), Some(pos(0, 11)));
    }

    #[test]
    fn commit_wraps_to_first_match() {
        let (_, cursor, find) = committed("one two\nthree", "one", pos(1, 2));
        assert_eq!(find.current_match(), Some(Match { start: 0, len: 3 }));
        assert_eq!(cursor.position(), pos(0, 0));
    }

    #[test]
    fn no_matches_stays_awaiting_and_keeps_cursor() {
        let buf = Buffer::from_text("alpha beta gamma");
        let mut cursor = Cursor::at(pos(0, 4));
        let mut find = FindReplace::open("the");
        let err = find.commit(&buf, &mut cursor).unwrap_err();
        assert!(matches!(err, EditorError::NoMatches { ref term } if term == "the"));
        assert_eq!(find.mode(), FindMode::AwaitingTerm);
        assert_eq!(cursor.position(), pos(0, 4));
        assert_eq!(cursor.anchor(), None);
    }

    #[test]
    fn empty_term_is_rejected() {
        let buf = Buffer::from_text("text");
        let mut cursor = Cursor::new();
        let mut find = FindReplace::open("");
        assert!(matches!(find.commit(&buf, &mut cursor), Err(EditorError::EmptySearchTerm)));
        assert_eq!(find.mode(), FindMode::AwaitingTerm);
    }

    #[test]
    fn editing_term_returns_to_awaiting() {
        let (_, _, mut find) = committed("ab ab", "ab", Position::ZERO);
        find.backspace();
        assert_eq!(find.mode(), FindMode::AwaitingTerm);
        assert!(find.matches().is_empty());
        assert_eq!(find.term(), "a");
    }

    #[test]
    fn replacement_field_edits_keep_navigating() {
        let (_, _, mut find) = committed("ab ab", "ab", Position::ZERO);
        find.switch_field();
        find.type_text("x\ny");
        assert_eq!(find.replacement(), "xy");
        assert_eq!(find.mode(), FindMode::Navigating);
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn next_and_previous_cycle() {
        let (buf, mut cursor, mut find) = committed("x a x b x", "x", Position::ZERO);
        assert_eq!(find.next(&buf, &mut cursor).unwrap(), Notice::Match { index: 2, total: 3 });
        assert_eq!(find.next(&buf, &mut cursor).unwrap(), Notice::Match { index: 3, total: 3 });
        assert_eq!(find.next(&buf, &mut cursor).unwrap(), Notice::Match { index: 1, total: 3 });
        assert_eq!(cursor.position(), pos(0, 0));
        assert_eq!(find.previous(&buf, &mut cursor).unwrap(), Notice::Match { index: 3, total: 3 });
        assert_eq!(cursor.position(), pos(0, 8));
    }

    #[test]
    fn next_from_awaiting_commits() {
        let buf = Buffer::from_text("find me");
        let mut cursor = Cursor::new();
        let mut find = FindReplace::open("me");
        assert_eq!(find.next(&buf, &mut cursor).unwrap(), Notice::Match { index: 1, total: 1 });
        assert_eq!(find.mode(), FindMode::Navigating);
    }

    // -- Replace one --------------------------------------------------------

    #[test]
    fn replace_one_shifts_later_matches() {
        let (mut buf, mut cursor, mut find) = committed("cat cat cat", "cat", Position::ZERO);
        let mut history = History::new();
        find.switch_field();
        find.type_text("tiger");

        let notice = find.replace_one(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(notice, Notice::Replaced { count: 1 });
        assert_eq!(buf.contents(), "tiger cat cat");
        assert_eq!(find.mode(), FindMode::ReplaceOne);
        assert_eq!(
            find.matches(),
            &[Match { start: 6, len: 3 }, Match { start: 10, len: 3 }]
        );
        assert_eq!(cursor.position(), pos(0, 6));
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn replace_one_never_rematches_replacement() {
        let (mut buf, mut cursor, mut find) = committed("a b a", "a", Position::ZERO);
        let mut history = History::new();
        find.switch_field();
        find.type_text("aa");
        find.replace_one(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(buf.contents(), "aa b a");
        assert_eq!(find.matches(), &[Match { start: 5, len: 1 }]);
        find.replace_one(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(buf.contents(), "aa b aa");
        assert_eq!(find.mode(), FindMode::AwaitingTerm);
        assert_eq!(cursor.position(), pos(0, 7));
        assert_eq!(cursor.anchor(), None);
    }

    #[test]
    fn replace_one_on_last_match_wraps() {
        let (mut buf, mut cursor, mut find) = committed("x y x y", "y", pos(0, 4));
        let mut history = History::new();
        assert_eq!(find.current_match(), Some(Match { start: 6, len: 1 }));
        find.replace_one(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(buf.contents(), "x y x ");
        assert_eq!(find.current_match(), Some(Match { start: 2, len: 1 }));
    }

    // -- Replace all --------------------------------------------------------

    #[test]
    fn replace_all_is_one_history_entry() {
        let (mut buf, mut cursor, mut find) = committed("the cat\nthe hat\nthe end", "the", Position::ZERO);
        let mut history = History::new();
        find.switch_field();
        find.type_text("a");

        let notice = find.replace_all(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(notice, Notice::Replaced { count: 3 });
        assert_eq!(buf.contents(), "a cat\na hat\na end");
        assert!(find_all(&buf.contents(), "the").is_empty());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(find.mode(), FindMode::AwaitingTerm);
        assert!(find.matches().is_empty());

        history.undo(&mut buf);
        assert_eq!(buf.contents(), "the cat\nthe hat\nthe end");
    }

    #[test]
    fn replace_all_lands_on_current_match() {
        let (mut buf, mut cursor, mut find) = committed("ab ab ab", "ab", pos(0, 3));
        let mut history = History::new();
        find.switch_field();
        find.type_text("xyz");
        find.replace_all(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(buf.contents(), "xyz xyz xyz");
        assert_eq!(cursor.position(), pos(0, 4));
    }

    #[test]
    fn replace_all_from_awaiting_commits_first() {
        let mut buf = Buffer::from_text("a a");
        let mut cursor = Cursor::new();
        let mut history = History::new();
        let mut find = FindReplace::open("a");
        find.replace_all(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(buf.contents(), " ");

        let mut find = FindReplace::open("zzz");
        assert!(find.replace_all(&mut buf, &mut cursor, &mut history).is_err());
        assert_eq!(history.undo_count(), 1);
    }

    // -- Rescan -------------------------------------------------------------

    #[test]
    fn rescan_after_undo() {
        let (mut buf, mut cursor, mut find) = committed("a a", "a", Position::ZERO);
        let mut history = History::new();
        find.replace_one(&mut buf, &mut cursor, &mut history).unwrap();
        assert_eq!(find.matches().len(), 1);
        let restored = history.undo(&mut buf).unwrap();
        cursor.set_position(restored, &buf);
        find.rescan(&buf, &cursor);
        assert_eq!(find.matches().len(), 2);
        assert_eq!(find.current_match(), Some(Match { start: 0, len: 1 }));
    }
}
