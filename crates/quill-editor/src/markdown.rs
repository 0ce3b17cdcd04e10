//! Markdown helpers: the metadata block, emphasis toggles, footnotes,
//! frontmatter, and document statistics.
//!
//! The editing commands here are pure. Each one inspects the buffer and
//! returns a [`Rewrite`]: one range to replace, the replacement text, and
//! where the cursor goes afterwards. The session applies a rewrite as a
//! single history transaction.
//!
//! # Metadata block
//!
//! A document may open with a YAML frontmatter block:
//!
//! ```text
//! ---
//! title: Notes
//! author: A. Writer
//! ---
//! Body text starts here.
//! ```
//!
//! The block runs from a `---` first line to the next `---` line. It is not
//! parsed; it is only located so the cursor can start below it and so the
//! statistics can skip it.

use std::sync::LazyLock;

use regex::Regex;

use crate::buffer::Buffer;
use crate::history::end_after_insert;
use crate::position::{Position, Range};

/// Marker line that opens and closes the metadata block.
pub const METADATA_MARKER: &str = "---";

/// Fields offered by [`insert_frontmatter`] when none are configured.
pub const DEFAULT_FRONTMATTER_FIELDS: [&str; 6] =
    ["title", "author", "instructor", "date", "spacing", "style"];

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\n(?:.*?\n)?---(?:\n|\z)").expect("valid frontmatter regex")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

// ---------------------------------------------------------------------------
// Metadata block
// ---------------------------------------------------------------------------

/// Index of the line that closes the leading metadata block, if there is one.
#[must_use]
pub fn metadata_end(buf: &Buffer) -> Option<usize> {
    let is_marker = |line: usize| {
        buf.line(line)
            .is_some_and(|l| l.chars().eq(METADATA_MARKER.chars()))
    };
    if !is_marker(0) {
        return None;
    }
    (1..buf.line_count()).find(|&line| is_marker(line))
}

/// The first position after the metadata block, or the document start.
#[must_use]
pub fn body_start(buf: &Buffer) -> Position {
    match metadata_end(buf) {
        Some(end) if end + 1 < buf.line_count() => Position::new(end + 1, 0),
        Some(end) => Position::new(end, buf.line_len(end)),
        None => Position::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Word and paragraph counts of a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub words: usize,
    pub paragraphs: usize,
}

/// Count words (whitespace-separated) and paragraphs (runs of non-blank
/// lines) in `text`, skipping a leading metadata block. `text` uses `\n`
/// line endings.
#[must_use]
pub fn stats(text: &str) -> Stats {
    let body = FRONTMATTER.find(text).map_or(text, |m| &text[m.end()..]);
    Stats {
        words: body.split_whitespace().count(),
        paragraphs: PARAGRAPH_BREAK
            .split(body)
            .filter(|p| !p.trim().is_empty())
            .count(),
    }
}

// ---------------------------------------------------------------------------
// Rewrites
// ---------------------------------------------------------------------------

/// One replacement to apply as a single undo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub range: Range,
    pub text: String,
    /// Cursor position after the replacement.
    pub cursor: Position,
}

/// `**bold**` or `*italic*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
        }
    }
}

/// Word characters for emphasis: alphanumerics and apostrophes.
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\'' || ch == '\u{2019}'
}

/// Columns `[start, end)` of the word touching `col` on `line`. A cursor just
/// after a word counts as touching it.
fn word_at(line: &[char], col: usize) -> Option<(usize, usize)> {
    let at = line.get(col).copied().is_some_and(is_word_char);
    let before = col > 0 && line.get(col - 1).copied().is_some_and(is_word_char);
    if !at && !before {
        return None;
    }
    let mut start = col;
    while start > 0 && is_word_char(line[start - 1]) {
        start -= 1;
    }
    let mut end = col;
    if at {
        while end < line.len() && is_word_char(line[end]) {
            end += 1;
        }
    }
    (start < end).then_some((start, end))
}

/// Toggle emphasis around the selection, or around the word at the cursor.
///
/// - Selection: wrap it; cursor after the closing marker.
/// - Word already wrapped: unwrap; cursor where the opening marker was.
/// - Word: wrap; cursor after the closing marker.
/// - No word: insert an empty pair; cursor between the markers.
#[must_use]
pub fn toggle_emphasis(buf: &Buffer, cursor: Position, selection: Option<Range>, kind: Emphasis) -> Rewrite {
    let marker = kind.marker();
    let mlen = marker.len();

    if let Some(range) = selection {
        let text = format!("{marker}{}{marker}", buf.slice(range));
        let cursor = end_after_insert(range.start, &text);
        return Rewrite { range, text, cursor };
    }

    let cursor = buf.clamp_position(cursor);
    let line: Vec<char> = buf.line_string(cursor.line).chars().collect();
    let at = |col: usize| Position::new(cursor.line, col);

    let Some((ws, we)) = word_at(&line, cursor.col) else {
        return Rewrite {
            range: Range::point(cursor),
            text: marker.repeat(2),
            cursor: at(cursor.col + mlen),
        };
    };
    let word: String = line[ws..we].iter().collect();

    let is_star = |col: usize| line.get(col) == Some(&'*');
    let wrapped = match kind {
        Emphasis::Bold => ws >= 2 && is_star(ws - 2) && is_star(ws - 1) && is_star(we) && is_star(we + 1),
        Emphasis::Italic => {
            let before = ws >= 1 && is_star(ws - 1) && (ws < 2 || !is_star(ws - 2));
            let after = is_star(we) && !is_star(we + 1);
            before && after
        }
    };

    if wrapped {
        Rewrite {
            range: Range::ordered(at(ws - mlen), at(we + mlen)),
            text: word,
            cursor: at(ws - mlen),
        }
    } else {
        Rewrite {
            range: Range::ordered(at(ws), at(we)),
            text: format!("{marker}{word}{marker}"),
            cursor: at(we + 2 * mlen),
        }
    }
}

/// Insert an inline footnote `^[]` with the cursor inside the brackets.
#[must_use]
pub fn insert_footnote(cursor: Position) -> Rewrite {
    Rewrite {
        range: Range::point(cursor),
        text: "^[]".to_string(),
        cursor: Position::new(cursor.line, cursor.col + 2),
    }
}

/// Add frontmatter fields. With no metadata block, prepend one listing every
/// field; with one, append the fields it lacks. Returns `None` when nothing
/// is missing. The cursor goes to the document start.
#[must_use]
pub fn insert_frontmatter<S: AsRef<str>>(buf: &Buffer, fields: &[S]) -> Option<Rewrite> {
    let Some(end) = metadata_end(buf) else {
        let mut text = format!("{METADATA_MARKER}\n");
        for field in fields {
            text.push_str(field.as_ref());
            text.push_str(": \n");
        }
        text.push_str(METADATA_MARKER);
        text.push('\n');
        return Some(Rewrite {
            range: Range::point(Position::ZERO),
            text,
            cursor: Position::ZERO,
        });
    };

    let present: Vec<String> = (1..end)
        .filter_map(|line| {
            let text = buf.line_string(line);
            let idx = text.find(':')?;
            (idx > 0).then(|| text[..idx].trim().to_string())
        })
        .collect();
    let missing: String = fields
        .iter()
        .map(|field| field.as_ref())
        .filter(|field| !present.iter().any(|p| p == field))
        .map(|field| format!("{field}: \n"))
        .collect();
    if missing.is_empty() {
        return None;
    }
    Some(Rewrite {
        range: Range::point(Position::new(end, 0)),
        text: missing,
        cursor: Position::ZERO,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
