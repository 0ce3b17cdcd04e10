//! Editing session: one document, its history, its scroll state, and the
//! find/replace panel, driven one event at a time.
//!
//! The shell owns the terminal. It calls [`Session::dispatch`] with each
//! input event and the current viewport size, and draws the returned
//! [`RenderModel`]. Every event runs to completion before `dispatch`
//! returns: the buffer edit, its history transaction, the wrap cache
//! splice, and the scroll reveal all land together.
//!
//! ```text
//!   Event ──▶ handle ──▶ Buffer / History / Cursor / FindReplace
//!                            │ damage log
//!                            ▼
//!                 WrapCache + Scroller::apply_edits
//!                            │
//!                            ▼
//!                   Scroller::reveal ──▶ RenderModel
//! ```

use tracing::{debug, info, trace, warn};

use crate::buffer::{Buffer, normalize_line_endings};
use crate::config::EditorConfig;
use crate::cursor::Cursor;
use crate::error::{EditorError, Result, check_viewport};
use crate::event::{Event, Motion, Notice};
use crate::find::{FindField, FindMode, FindPanel, FindReplace};
use crate::history::{History, end_after_insert};
use crate::markdown::{self, Emphasis, Rewrite};
use crate::position::{Position, Range, Selection};
use crate::scroll::{RowRef, Scroller, signed};
use crate::wrap::{WrapCache, display_width};

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// Terminal area the document is laid out in, in columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// A cell on screen, 0-indexed from the viewport's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPos {
    pub row: usize,
    pub col: usize,
}

/// One visual row of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualRow {
    /// Logical line the row belongs to.
    pub line: usize,
    /// Char range `[start, end)` of the line shown on this row.
    pub start: usize,
    pub end: usize,
    /// The row's text with tabs expanded to spaces.
    pub text: String,
    /// Selected display columns `[from, to)`, if any.
    pub selection: Option<(usize, usize)>,
}

/// Which count the status line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsDisplay {
    Words,
    #[default]
    Paragraphs,
}

impl StatsDisplay {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Words => Self::Paragraphs,
            Self::Paragraphs => Self::Words,
        }
    }
}

/// Everything the status line needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// 1-based cursor line.
    pub line: usize,
    /// 1-based cursor column, in chars.
    pub column: usize,
    pub display: StatsDisplay,
    /// Word or paragraph count, per `display`.
    pub count: usize,
    pub modified: bool,
}

/// What the shell draws after one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub rows: Vec<VisualRow>,
    /// Where to put the terminal cursor. `None` while the find panel has
    /// focus; the shell places it in the panel instead.
    pub cursor: Option<ScreenPos>,
    pub mode: FindMode,
    pub find: Option<FindPanel>,
    pub status: StatusLine,
    pub notice: Option<Notice>,
    /// Text copied or cut by this event, for the system clipboard.
    pub clipboard: Option<String>,
}

/// Cursor location and document statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSummary {
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in chars.
    pub column: usize,
    pub words: usize,
    pub paragraphs: usize,
}

/// Side outputs of one event.
#[derive(Debug, Default)]
struct Outcome {
    notice: Option<Notice>,
    clipboard: Option<String>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One open document and everything attached to it.
#[derive(Debug)]
pub struct Session {
    buffer: Buffer,
    cursor: Cursor,
    history: History,
    scroller: Scroller,
    wraps: WrapCache,
    find: Option<FindReplace>,
    /// Most recent term committed or left in the panel; pre-fills the next open.
    last_find_term: String,
    stats_display: StatsDisplay,
    config: EditorConfig,
}

impl Session {
    /// Open `text` with default settings. The cursor starts on the first
    /// line after a leading metadata block.
    #[must_use]
    pub fn load(text: &str) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    /// Open `text` with `config`.
    #[must_use]
    pub fn with_config(text: &str, config: EditorConfig) -> Self {
        let buffer = Buffer::from_text(text);
        let cursor = Cursor::at(markdown::body_start(&buffer));
        let mut wraps = WrapCache::default();
        wraps.set_tab_width(config.tab_width);
        info!(
            target: "editor.session",
            lines = buffer.line_count(),
            line_ending = %buffer.line_ending(),
            cursor = %cursor.position(),
            "load"
        );
        Self {
            buffer,
            cursor,
            history: History::new(),
            scroller: Scroller::new(config.scroll_past_end),
            wraps,
            find: None,
            last_find_term: String::new(),
            stats_display: if config.show_word_count {
                StatsDisplay::Words
            } else {
                StatsDisplay::Paragraphs
            },
            config,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The document as a flat string, with its original line endings.
    #[must_use]
    pub fn current_text(&self) -> String {
        self.buffer.text()
    }

    /// Cursor line and column (1-based) with word and paragraph counts.
    #[must_use]
    pub fn cursor_summary(&self) -> CursorSummary {
        let stats = markdown::stats(&self.buffer.contents());
        let pos = self.cursor.position();
        CursorSummary {
            line: pos.line + 1,
            column: pos.col + 1,
            words: stats.words,
            paragraphs: stats.paragraphs,
        }
    }

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn scroller(&self) -> &Scroller {
        &self.scroller
    }

    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> FindMode {
        self.find.as_ref().map_or(FindMode::Idle, FindReplace::mode)
    }

    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Record that [`current_text`](Self::current_text) was written out.
    pub const fn mark_saved(&mut self) {
        self.buffer.mark_saved();
    }

    // -- Dispatch -----------------------------------------------------------

    /// Apply one event and lay out the viewport.
    ///
    /// # Errors
    ///
    /// [`InvalidViewport`](EditorError::InvalidViewport) when the viewport
    /// is narrower than 2 columns or has no rows. The event is not applied.
    pub fn dispatch(&mut self, event: Event, viewport: Viewport) -> Result<RenderModel> {
        check_viewport(viewport.width, viewport.height)?;
        self.wraps.set_width(viewport.width)?;
        trace!(target: "editor.session", ?event, "dispatch");

        let mut out = Outcome::default();
        self.handle(event, viewport.height, &mut out);

        let edits = self.buffer.take_line_edits();
        if !edits.is_empty() {
            self.wraps.apply_edits(&edits);
            self.scroller.apply_edits(&edits);
        }

        let row = self.scroller.reveal(
            self.cursor.position(),
            viewport.height,
            &self.buffer,
            &mut self.wraps,
        )?;
        Ok(self.render(viewport, row, out))
    }

    fn handle(&mut self, event: Event, height: usize, out: &mut Outcome) {
        let panel_focused = self.find.as_ref().is_some_and(FindReplace::is_focused);

        match event {
            // -- Text -----------------------------------------------------
            Event::Insert(ch) => {
                let mut text = [0; 4];
                self.type_text(ch.encode_utf8(&mut text), panel_focused);
            }
            Event::InsertText(text) => self.type_text(&text, panel_focused),
            Event::Newline if panel_focused => {
                let field = self.find.as_ref().map_or(FindField::Term, FindReplace::field);
                match field {
                    FindField::Term => self.find_commit(out),
                    FindField::Replacement => self.replace(false, out),
                }
            }
            Event::Newline => self.replace_selection("\n"),
            Event::DeleteBackward if panel_focused => {
                if let Some(find) = &mut self.find {
                    find.backspace();
                }
            }
            Event::DeleteBackward => self.delete(false),
            Event::DeleteForward if panel_focused => {}
            Event::DeleteForward => self.delete(true),

            // -- Cursor and selection -------------------------------------
            Event::Move(motion) => {
                self.cursor.clear_anchor();
                self.apply_motion(motion, height);
            }
            Event::Select(motion) => {
                self.cursor.ensure_anchor();
                self.apply_motion(motion, height);
            }
            Event::SelectAll => {
                let all = Selection::new(Position::ZERO, self.buffer.end_position());
                self.cursor.select(all, &self.buffer);
            }
            Event::Copy => {
                if let Some(range) = self.cursor.selected_range() {
                    out.clipboard = Some(self.buffer.slice(range));
                    out.notice = Some(Notice::Copied);
                }
                self.cursor.clear_anchor();
            }
            Event::Cut => {
                if let Some(range) = self.cursor.selected_range() {
                    out.clipboard = Some(self.buffer.slice(range));
                    out.notice = Some(Notice::Cut);
                    self.apply(Rewrite {
                        range,
                        text: String::new(),
                        cursor: range.start,
                    });
                }
            }

            // -- History --------------------------------------------------
            Event::Undo => {
                let restored = self.history.undo(&mut self.buffer);
                self.restore(restored);
            }
            Event::Redo => {
                let restored = self.history.redo(&mut self.buffer);
                self.restore(restored);
            }

            // -- Markdown -------------------------------------------------
            Event::ToggleBold => self.toggle_emphasis(Emphasis::Bold),
            Event::ToggleItalic => self.toggle_emphasis(Emphasis::Italic),
            Event::InsertFootnote => {
                self.cursor.clear_anchor();
                self.apply(markdown::insert_footnote(self.cursor.position()));
            }
            Event::InsertFrontmatter => {
                match markdown::insert_frontmatter(&self.buffer, self.config.frontmatter_fields.as_slice()) {
                    Some(rewrite) => {
                        self.apply(rewrite);
                        out.notice = Some(Notice::FrontmatterInserted);
                    }
                    None => out.notice = Some(Notice::FrontmatterComplete),
                }
            }

            // -- Find/replace ---------------------------------------------
            Event::FindOpen => match &mut self.find {
                Some(find) => find.toggle_focus(),
                None => self.find = Some(FindReplace::open(&self.last_find_term)),
            },
            Event::FindCommit => self.find_commit(out),
            Event::FindNext => self.find_step(true, out),
            Event::FindPrevious => self.find_step(false, out),
            Event::FindSwitchField => {
                if let Some(find) = &mut self.find {
                    find.switch_field();
                }
            }
            Event::FindClose => {
                if let Some(find) = self.find.take() {
                    if !find.term().is_empty() {
                        self.last_find_term = find.term().to_string();
                    }
                    debug!(target: "editor.session", "find panel closed");
                }
            }
            Event::ReplaceOne => self.replace(false, out),
            Event::ReplaceAll => self.replace(true, out),

            // -- Display --------------------------------------------------
            Event::ToggleStatsDisplay => self.stats_display = self.stats_display.toggled(),
            Event::Refresh => {}
        }
    }

    fn apply_motion(&mut self, motion: Motion, height: usize) {
        let page = signed(height.saturating_sub(1).max(1));
        let buf = &self.buffer;
        let cursor = &mut self.cursor;
        match motion {
            Motion::Left => cursor.move_left(buf),
            Motion::Right => cursor.move_right(buf),
            Motion::WordLeft => cursor.word_left(buf),
            Motion::WordRight => cursor.word_right(buf),
            Motion::Up => cursor.move_visual(-1, buf, &mut self.wraps),
            Motion::Down => cursor.move_visual(1, buf, &mut self.wraps),
            Motion::LineStart => cursor.move_to_line_start(buf),
            Motion::LineEnd => cursor.move_to_line_end(buf),
            Motion::DocumentStart => cursor.move_to_document_start(buf),
            Motion::DocumentEnd => cursor.move_to_document_end(buf),
            Motion::BodyStart => cursor.set_position(markdown::body_start(buf), buf),
            Motion::PageUp => cursor.move_visual(-page, buf, &mut self.wraps),
            Motion::PageDown => cursor.move_visual(page, buf, &mut self.wraps),
        }
    }

    // -- Editing ------------------------------------------------------------

    fn type_text(&mut self, text: &str, panel_focused: bool) {
        if panel_focused {
            if let Some(find) = &mut self.find {
                find.type_text(text);
            }
        } else {
            self.replace_selection(text);
        }
    }

    /// Insert `text` at the cursor, replacing the selection if there is one.
    fn replace_selection(&mut self, text: &str) {
        let range = self
            .cursor
            .selected_range()
            .unwrap_or_else(|| Range::point(self.cursor.position()));
        let cursor = end_after_insert(range.start, &normalize_line_endings(text));
        self.apply(Rewrite {
            range,
            text: text.to_string(),
            cursor,
        });
    }

    /// Delete the selection, or one grapheme before or after the cursor.
    fn delete(&mut self, forward: bool) {
        let range = self.cursor.selected_range().unwrap_or_else(|| {
            let mut edge = self.cursor.clone();
            if forward {
                edge.move_right(&self.buffer);
            } else {
                edge.move_left(&self.buffer);
            }
            Range::ordered(self.cursor.position(), edge.position())
        });
        if range.is_empty() {
            self.cursor.clear_anchor();
            return;
        }
        self.apply(Rewrite {
            range,
            text: String::new(),
            cursor: range.start,
        });
    }

    fn toggle_emphasis(&mut self, kind: Emphasis) {
        let rewrite = markdown::toggle_emphasis(
            &self.buffer,
            self.cursor.position(),
            self.cursor.selected_range(),
            kind,
        );
        self.apply(rewrite);
    }

    /// Apply a rewrite as one history transaction.
    fn apply(&mut self, rewrite: Rewrite) {
        self.history.begin(self.cursor.position());
        self.history.delete(&mut self.buffer, rewrite.range);
        if !rewrite.text.is_empty() {
            self.history.insert(&mut self.buffer, rewrite.range.start, &rewrite.text);
        }
        self.history.commit(rewrite.cursor);

        self.cursor.clear_anchor();
        self.cursor.set_position(rewrite.cursor, &self.buffer);
        self.document_changed();
    }

    fn restore(&mut self, restored: Option<Position>) {
        if let Some(pos) = restored {
            self.cursor.clear_anchor();
            self.cursor.set_position(pos, &self.buffer);
            self.document_changed();
        }
    }

    /// The document changed outside find/replace; refresh its matches.
    fn document_changed(&mut self) {
        if let Some(find) = &mut self.find {
            find.rescan(&self.buffer, &self.cursor);
        }
    }

    // -- Find/replace -------------------------------------------------------

    fn find_commit(&mut self, out: &mut Outcome) {
        if let Some(find) = &mut self.find {
            out.notice = into_notice(find.commit(&self.buffer, &mut self.cursor));
            if find.mode() == FindMode::Navigating {
                self.last_find_term = find.term().to_string();
            }
        }
    }

    fn find_step(&mut self, forward: bool, out: &mut Outcome) {
        if let Some(find) = &mut self.find {
            let result = if forward {
                find.next(&self.buffer, &mut self.cursor)
            } else {
                find.previous(&self.buffer, &mut self.cursor)
            };
            out.notice = into_notice(result);
            if find.mode() == FindMode::Navigating {
                self.last_find_term = find.term().to_string();
            }
        }
    }

    fn replace(&mut self, all: bool, out: &mut Outcome) {
        if let Some(find) = &mut self.find {
            let (buf, cursor, history) = (&mut self.buffer, &mut self.cursor, &mut self.history);
            let result = if all {
                find.replace_all(buf, cursor, history)
            } else {
                find.replace_one(buf, cursor, history)
            };
            out.notice = into_notice(result);
            if !find.term().is_empty() {
                self.last_find_term = find.term().to_string();
            }
        }
    }

    // -- Layout -------------------------------------------------------------

    fn render(&mut self, viewport: Viewport, cursor_row: usize, out: Outcome) -> RenderModel {
        let tab_width = self.wraps.tab_width();
        let selection = self.cursor.selected_range();
        let rows = self
            .scroller
            .visible_rows(viewport.height, &self.buffer, &mut self.wraps)
            .into_iter()
            .map(|row| self.visual_row(row, selection, tab_width))
            .collect();

        let panel_focused = self.find.as_ref().is_some_and(FindReplace::is_focused);
        let cursor = (!panel_focused).then(|| {
            let pos = self.cursor.position();
            let seg = self.wraps.segment_of(&self.buffer, pos.line, pos.col);
            let (start, _) = self.wraps.bounds(&self.buffer, pos.line, seg);
            let x = self.buffer.line(pos.line).map_or(0, |line| {
                display_width(line.chars().skip(start).take(pos.col.saturating_sub(start)), tab_width)
            });
            ScreenPos {
                row: cursor_row,
                col: x.min(viewport.width - 1),
            }
        });

        let summary = self.cursor_summary();
        RenderModel {
            rows,
            cursor,
            mode: self.mode(),
            find: self.find.as_ref().map(FindReplace::panel),
            status: StatusLine {
                line: summary.line,
                column: summary.column,
                display: self.stats_display,
                count: match self.stats_display {
                    StatsDisplay::Words => summary.words,
                    StatsDisplay::Paragraphs => summary.paragraphs,
                },
                modified: self.buffer.is_modified(),
            },
            notice: out.notice,
            clipboard: out.clipboard,
        }
    }

    fn visual_row(&mut self, row: RowRef, selection: Option<Range>, tab_width: usize) -> VisualRow {
        let (start, end) = self.wraps.bounds(&self.buffer, row.line, row.seg);
        let chars: Vec<char> = self
            .buffer
            .line(row.line)
            .map(|line| line.chars().skip(start).take(end - start).collect())
            .unwrap_or_default();

        let mut text = String::with_capacity(chars.len());
        for &ch in &chars {
            if ch == '\t' {
                text.extend(std::iter::repeat_n(' ', tab_width));
            } else {
                text.push(ch);
            }
        }

        let selection = selection.and_then(|range| {
            let line_len = self.buffer.line_len(row.line);
            let from = match range.start.line.cmp(&row.line) {
                std::cmp::Ordering::Less => 0,
                std::cmp::Ordering::Equal => range.start.col,
                std::cmp::Ordering::Greater => return None,
            };
            let to = match range.end.line.cmp(&row.line) {
                std::cmp::Ordering::Greater => line_len,
                std::cmp::Ordering::Equal => range.end.col,
                std::cmp::Ordering::Less => return None,
            };
            let (from, to) = (from.max(start), to.min(end));
            (from < to).then(|| {
                let x = |col: usize| display_width(chars[..col - start].iter().copied(), tab_width);
                (x(from), x(to))
            })
        });

        VisualRow {
            line: row.line,
            start,
            end,
            text,
            selection,
        }
    }
}

/// Turn a find/replace outcome into status-line feedback.
fn into_notice(result: Result<Notice>) -> Option<Notice> {
    match result {
        Ok(notice) => Some(notice),
        Err(EditorError::EmptySearchTerm) => Some(Notice::EmptySearchTerm),
        Err(EditorError::NoMatches { term }) => Some(Notice::NoMatches { term }),
        Err(err) => {
            warn!(target: "editor.session", %err, "unexpected find error");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VIEW: Viewport = Viewport::new(40, 10);

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn run(session: &mut Session, events: impl IntoIterator<Item = Event>) -> RenderModel {
        let mut last = None;
        for event in events {
            last = Some(session.dispatch(event, VIEW).unwrap());
        }
        last.unwrap_or_else(|| session.dispatch(Event::Refresh, VIEW).unwrap())
    }

    fn typed(text: &str) -> Vec<Event> {
        text.chars().map(Event::Insert).collect()
    }

    // -- Loading ------------------------------------------------------------

    #[test]
    fn load_starts_after_metadata() {
        let s = Session::load("---\ntitle: X\n---\nBody here.\n");
        assert_eq!(s.cursor().position(), pos(3, 0));
        assert_eq!(Session::load("no metadata").cursor().position(), pos(0, 0));
        // An unclosed block is not metadata.
        assert_eq!(Session::load("---\ntitle: X\n").cursor().position(), pos(0, 0));
    }

    #[test]
    fn current_text_round_trips_line_endings() {
        for text in ["plain\ntext\n", "dos\r\nfile\r\n", "", "no newline"] {
            assert_eq!(Session::load(text).current_text(), text);
        }
    }

    #[test]
    fn cursor_summary_counts_body_only() {
        let s = Session::load("---\ntitle: A B C\n---\none two\nthree\n\nfour\n");
        assert_eq!(
            s.cursor_summary(),
            CursorSummary {
                line: 4,
                column: 1,
                words: 4,
                paragraphs: 2,
            }
        );
    }

    // -- Viewport -----------------------------------------------------------

    #[test]
    fn invalid_viewport_is_rejected_before_the_event() {
        let mut s = Session::load("abc");
        for view in [Viewport::new(1, 5), Viewport::new(0, 5), Viewport::new(10, 0)] {
            assert!(matches!(
                s.dispatch(Event::Insert('x'), view),
                Err(EditorError::InvalidViewport { .. })
            ));
        }
        assert_eq!(s.current_text(), "abc");
        assert!(!s.history().can_undo());
    }

    #[test]
    fn scenario_scrolls_one_row_at_a_time() {
        let mut s = Session::load("alpha beta\n\ngamma delta epsilon zeta eta");
        let view = Viewport::new(10, 2);
        let mut anchors = Vec::new();
        let mut model = s.dispatch(Event::Refresh, view).unwrap();
        for _ in 0..3 {
            model = s.dispatch(Event::Move(Motion::Down), view).unwrap();
            anchors.push(s.scroller().anchor());
        }
        assert_eq!(anchors, vec![(0, 0), (1, 0), (2, 0)]);
        assert_eq!(s.cursor().position(), pos(2, 6));
        assert_eq!(model.cursor, Some(ScreenPos { row: 1, col: 0 }));
        assert_eq!(model.rows[0].text, "gamma ");
        assert_eq!(model.rows[1].text, "delta ");

        s.dispatch(Event::Move(Motion::Down), view).unwrap();
        assert_eq!(s.scroller().anchor(), (2, 1));
    }

    #[test]
    fn cursor_column_is_clamped_to_the_last_cell() {
        let mut s = Session::load("abcdefghij");
        let model = s
            .dispatch(Event::Move(Motion::LineEnd), Viewport::new(10, 3))
            .unwrap();
        assert_eq!(model.cursor, Some(ScreenPos { row: 0, col: 9 }));
    }

    #[test]
    fn rows_expand_tabs_and_mark_selection() {
        let mut s = Session::load("a\tb\nsecond");
        let model = run(&mut s, [Event::Select(Motion::Right), Event::Select(Motion::Right)]);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows[0].text, "a    b");
        assert_eq!(model.rows[0].selection, Some((0, 5)));
        assert_eq!(model.rows[1].selection, None);
        assert_eq!(model.cursor, Some(ScreenPos { row: 0, col: 5 }));
    }

    #[test]
    fn selection_spans_lines() {
        let mut s = Session::load("one\ntwo\nthree");
        let model = run(&mut s, [Event::Move(Motion::Right), Event::Select(Motion::Down), Event::Select(Motion::Down)]);
        assert_eq!(model.rows[0].selection, Some((1, 3)));
        assert_eq!(model.rows[1].selection, Some((0, 3)));
        assert_eq!(model.rows[2].selection, Some((0, 1)));
    }

    // -- Editing and history ------------------------------------------------

    #[test]
    fn n_inserts_then_n_undos_restore_everything() {
        for doc in ["", "hello world", "line one\nline two\n", "---\nt: x\n---\nbody"] {
            let mut s = Session::load(doc);
            run(&mut s, [Event::Move(Motion::Right)]);
            let before = (s.current_text(), s.cursor().position());
            let input = "ab\nc d";
            run(&mut s, typed(input));
            assert_ne!(s.current_text(), before.0);
            run(&mut s, std::iter::repeat_n(Event::Undo, input.chars().count()));
            assert_eq!((s.current_text(), s.cursor().position()), before, "doc {doc:?}");
        }
    }

    #[test]
    fn redo_restores_until_a_new_edit() {
        let mut s = Session::load("base");
        run(&mut s, [Event::Move(Motion::LineEnd), Event::Insert('!')]);
        let after = (s.current_text(), s.cursor().position());
        run(&mut s, [Event::Undo, Event::Redo]);
        assert_eq!((s.current_text(), s.cursor().position()), after);

        run(&mut s, [Event::Undo, Event::Insert('?'), Event::Redo]);
        assert_eq!(s.current_text(), "base?");
        assert!(!s.history().can_redo());
    }

    #[test]
    fn typing_over_a_selection_is_one_step() {
        let mut s = Session::load("hello world");
        run(&mut s, [Event::Select(Motion::WordRight)]);
        run(&mut s, [Event::InsertText("bye".into())]);
        assert_eq!(s.current_text(), "bye world");
        assert_eq!(s.history().undo_count(), 1);
        run(&mut s, [Event::Undo]);
        assert_eq!(s.current_text(), "hello world");
    }

    #[test]
    fn delete_backward_and_forward() {
        let mut s = Session::load("ab\ncd");
        run(&mut s, [Event::Move(Motion::Down), Event::DeleteBackward]);
        assert_eq!(s.current_text(), "abcd");
        assert_eq!(s.cursor().position(), pos(0, 2));
        run(&mut s, [Event::DeleteForward]);
        assert_eq!(s.current_text(), "abd");
        run(&mut s, [Event::Move(Motion::DocumentStart), Event::DeleteBackward]);
        assert_eq!(s.current_text(), "abd");
        assert_eq!(s.history().undo_count(), 2);
    }

    #[test]
    fn delete_backward_removes_whole_grapheme() {
        let mut s = Session::load("ae\u{301}");
        run(&mut s, [Event::Move(Motion::LineEnd), Event::DeleteBackward]);
        assert_eq!(s.current_text(), "a");
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut s = Session::load("x");
        run(&mut s, [Event::InsertText("1\r\n2".into())]);
        assert_eq!(s.current_text(), "1\n2x");
        assert_eq!(s.cursor().position(), pos(1, 1));
    }

    #[test]
    fn copy_and_cut_hand_text_to_the_shell() {
        let mut s = Session::load("keep this");
        let model = run(&mut s, [Event::Select(Motion::WordRight), Event::Copy]);
        assert_eq!(model.clipboard.as_deref(), Some("keep"));
        assert_eq!(model.notice, Some(Notice::Copied));
        assert_eq!(s.current_text(), "keep this");

        let model = run(&mut s, [Event::SelectAll, Event::Cut]);
        assert_eq!(model.clipboard.as_deref(), Some("keep this"));
        assert_eq!(s.current_text(), "");
        run(&mut s, [Event::Undo]);
        assert_eq!(s.current_text(), "keep this");
    }

    // -- Markdown -----------------------------------------------------------

    #[test]
    fn bold_toggle_is_undoable() {
        let mut s = Session::load("make bold");
        run(&mut s, [Event::Move(Motion::WordRight), Event::Move(Motion::Right), Event::ToggleBold]);
        assert_eq!(s.current_text(), "make **bold**");
        assert_eq!(s.cursor().position(), pos(0, 13));
        run(&mut s, [Event::Move(Motion::Left), Event::Move(Motion::Left), Event::Move(Motion::Left)]);
        run(&mut s, [Event::ToggleBold]);
        assert_eq!(s.current_text(), "make bold");
        run(&mut s, [Event::Undo, Event::Undo]);
        assert_eq!(s.current_text(), "make bold");
        assert!(!s.history().can_undo());
    }

    #[test]
    fn footnote_and_frontmatter() {
        let mut s = Session::load("text");
        run(&mut s, [Event::Move(Motion::LineEnd), Event::InsertFootnote]);
        assert_eq!(s.current_text(), "text^[]");
        assert_eq!(s.cursor().position(), pos(0, 6));

        let config = EditorConfig {
            frontmatter_fields: vec!["title".into()],
            ..EditorConfig::default()
        };
        let mut s = Session::with_config("body", config);
        let model = run(&mut s, [Event::InsertFrontmatter]);
        assert_eq!(model.notice, Some(Notice::FrontmatterInserted));
        assert_eq!(s.current_text(), "---\ntitle: \n---\nbody");
        let model = run(&mut s, [Event::InsertFrontmatter]);
        assert_eq!(model.notice, Some(Notice::FrontmatterComplete));
        assert_eq!(s.history().undo_count(), 1);
    }

    #[test]
    fn stats_display_toggles() {
        let mut s = Session::load("one two\n\nthree");
        let model = run(&mut s, [Event::Refresh]);
        assert_eq!((model.status.display, model.status.count), (StatsDisplay::Paragraphs, 2));
        let model = run(&mut s, [Event::ToggleStatsDisplay]);
        assert_eq!((model.status.display, model.status.count), (StatsDisplay::Words, 3));
    }

    // -- Find/replace -------------------------------------------------------

    #[test]
    fn no_matches_leaves_cursor_alone() {
        let mut s = Session::load("alpha beta\ngamma");
        run(&mut s, [Event::Move(Motion::Right), Event::Move(Motion::Right)]);
        let before = s.cursor().position();
        let mut events = vec![Event::FindOpen];
        events.extend(typed("the"));
        events.push(Event::Newline);
        let model = run(&mut s, events);
        assert_eq!(model.mode, FindMode::AwaitingTerm);
        assert_eq!(model.notice, Some(Notice::NoMatches { term: "the".into() }));
        assert_eq!(s.cursor().position(), before);
        assert_eq!(s.current_text(), "alpha beta\ngamma");
    }

    #[test]
    fn empty_term_signals_nothing_to_search() {
        let mut s = Session::load("text");
        let model = run(&mut s, [Event::FindOpen, Event::FindCommit]);
        assert_eq!(model.notice, Some(Notice::EmptySearchTerm));
        assert_eq!(model.mode, FindMode::AwaitingTerm);
    }

    #[test]
    fn find_navigates_and_selects() {
        let mut s = Session::load("a cat\na cat");
        let mut events = vec![Event::FindOpen];
        events.extend(typed("cat"));
        events.push(Event::Newline);
        let model = run(&mut s, events);
        assert_eq!(model.mode, FindMode::Navigating);
        assert_eq!(model.notice, Some(Notice::Match { index: 1, total: 2 }));
        assert_eq!(model.cursor, None);
        assert_eq!(model.rows[0].selection, Some((2, 5)));

        let model = run(&mut s, [Event::FindNext]);
        assert_eq!(model.notice, Some(Notice::Match { index: 2, total: 2 }));
        assert_eq!(s.cursor().position(), pos(1, 2));
        let model = run(&mut s, [Event::FindNext]);
        assert_eq!(model.notice, Some(Notice::Match { index: 1, total: 2 }));
        let model = run(&mut s, [Event::FindPrevious]);
        assert_eq!(model.notice, Some(Notice::Match { index: 2, total: 2 }));
    }

    #[test]
    fn replace_all_is_one_undo_step() {
        let mut s = Session::load("the cat the hat the");
        let mut events = vec![Event::FindOpen];
        events.extend(typed("the"));
        events.extend([Event::Newline, Event::FindSwitchField, Event::Insert('a'), Event::ReplaceAll]);
        let model = run(&mut s, events);
        assert_eq!(s.current_text(), "a cat a hat a");
        assert_eq!(model.notice, Some(Notice::Replaced { count: 3 }));
        assert_eq!(model.mode, FindMode::AwaitingTerm);
        assert_eq!(s.history().undo_count(), 1);

        run(&mut s, [Event::Undo]);
        assert_eq!(s.current_text(), "the cat the hat the");
        assert!(!s.history().can_undo());
    }

    #[test]
    fn replace_one_from_the_replacement_field() {
        let mut s = Session::load("x x x");
        let mut events = vec![Event::FindOpen, Event::Insert('x'), Event::Newline, Event::FindSwitchField];
        events.extend(typed("yy"));
        events.push(Event::Newline);
        let model = run(&mut s, events);
        assert_eq!(s.current_text(), "yy x x");
        assert_eq!(model.mode, FindMode::ReplaceOne);
        assert_eq!(model.find.as_ref().map(|p| (p.current, p.total)), Some((Some(1), 2)));
        run(&mut s, [Event::ReplaceOne, Event::ReplaceOne]);
        assert_eq!(s.current_text(), "yy yy yy");
        assert_eq!(s.mode(), FindMode::AwaitingTerm);
        assert_eq!(s.history().undo_count(), 3);
    }

    #[test]
    fn reopening_prefills_last_term() {
        let mut s = Session::load("word word");
        let mut events = vec![Event::FindOpen];
        events.extend(typed("word"));
        events.extend([Event::Newline, Event::FindClose]);
        let model = run(&mut s, events);
        assert_eq!(model.mode, FindMode::Idle);
        assert_eq!(model.find, None);

        let model = run(&mut s, [Event::FindOpen]);
        assert_eq!(model.find.map(|p| p.term), Some("word".to_string()));
    }

    #[test]
    fn unfocused_panel_lets_typing_reach_the_document() {
        let mut s = Session::load("ab ab");
        let mut events = vec![Event::FindOpen];
        events.extend(typed("ab"));
        events.extend([Event::Newline, Event::FindOpen, Event::Move(Motion::DocumentEnd)]);
        events.extend(typed(" ab"));
        let model = run(&mut s, events);
        assert_eq!(s.current_text(), "ab ab ab");
        assert_eq!(model.find.map(|p| p.total), Some(3));
        assert!(model.cursor.is_some());

        run(&mut s, [Event::Undo]);
        assert_eq!(s.current_text(), "ab ab a");
        assert_eq!(s.find.as_ref().map(|f| f.matches().len()), Some(2));
    }
}
