//! Word wrap: splitting a logical line into visual rows.
//!
//! [`wrap`] is a pure function from (line, width) to the char offsets where
//! each visual segment starts. The first offset is always 0; segments are
//! contiguous and together cover the whole line. An empty line has exactly
//! one (empty) segment.
//!
//! # Width model
//!
//! Widths are terminal columns from `unicode-width`: most chars are 1, CJK
//! and emoji are 2, combining marks are 0. A tab is a fixed `tab_width`
//! columns, wherever it sits in the row.
//!
//! # Break rules
//!
//! ```text
//! width 10:  "gamma delta epsilon zeta eta"
//!            |gamma     |delta     |epsilon   |zeta eta  |
//!             0          6          12         20
//! ```
//!
//! - A row breaks after the last whitespace that fits.
//! - Whitespace that would overflow hangs off the end of the row instead of
//!   starting the next one, so rows never begin with the separating space.
//! - A word wider than the whole row is hard-split at the last char that
//!   fits.
//!
//! [`WrapCache`] memoizes the result per logical line for the current width
//! and is spliced from the buffer's damage log, so an edit re-wraps only the
//! lines it touched.

use unicode_width::UnicodeWidthChar;

use crate::buffer::{Buffer, LineEdit};
use crate::error::{Result, check_viewport};

/// Visual width of a tab when no configuration says otherwise.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Width a fresh cache assumes until the first viewport arrives.
pub const DEFAULT_WIDTH: usize = 80;

// ---------------------------------------------------------------------------
// Widths
// ---------------------------------------------------------------------------

/// Terminal columns occupied by `ch`.
#[inline]
#[must_use]
pub fn char_width(ch: char, tab_width: usize) -> usize {
    if ch == '\t' {
        tab_width.max(1)
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Total terminal columns of a run of chars.
#[must_use]
pub fn display_width<I: IntoIterator<Item = char>>(chars: I, tab_width: usize) -> usize {
    chars.into_iter().map(|ch| char_width(ch, tab_width)).sum()
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// Segment start offsets of `line` at `width` columns, tabs at
/// [`DEFAULT_TAB_WIDTH`].
///
/// # Errors
///
/// [`InvalidViewport`](crate::EditorError::InvalidViewport) when `width < 2`.
pub fn wrap(line: &str, width: usize) -> Result<Vec<usize>> {
    wrap_with_tabs(line, width, DEFAULT_TAB_WIDTH)
}

/// Like [`wrap`], with an explicit tab width.
///
/// # Errors
///
/// [`InvalidViewport`](crate::EditorError::InvalidViewport) when `width < 2`.
pub fn wrap_with_tabs(line: &str, width: usize, tab_width: usize) -> Result<Vec<usize>> {
    check_viewport(width, 1)?;
    Ok(segment_starts(line.chars(), width, tab_width))
}

/// The wrap scan itself. `width` has already been validated.
fn segment_starts<I: Iterator<Item = char>>(chars: I, width: usize, tab_width: usize) -> Vec<usize> {
    let mut starts = vec![0];
    let mut seg_start = 0;
    let mut x = 0;
    // (char index just after a whitespace run, x at that point)
    let mut last_break: Option<(usize, usize)> = None;

    for (i, ch) in chars.enumerate() {
        let cw = char_width(ch, tab_width);
        let blank = ch.is_whitespace();

        if x + cw > width && i > seg_start {
            if blank {
                // Hang it off the end of this row.
                x += cw;
                last_break = Some((i + 1, x));
                continue;
            }
            match last_break.take() {
                Some((at, at_x)) if at > seg_start => {
                    starts.push(at);
                    seg_start = at;
                    x -= at_x;
                    if x + cw > width && i > seg_start {
                        starts.push(i);
                        seg_start = i;
                        x = 0;
                    }
                }
                _ => {
                    starts.push(i);
                    seg_start = i;
                    x = 0;
                }
            }
        }

        x += cw;
        if blank {
            last_break = Some((i + 1, x));
        }
    }

    starts
}

/// Index of the segment containing `col`. A column on a segment boundary
/// belongs to the later segment; the end-of-line column belongs to the last.
#[must_use]
pub fn segment_index(starts: &[usize], col: usize) -> usize {
    starts.partition_point(|&s| s <= col).saturating_sub(1)
}

/// Char range `[start, end)` of segment `idx` in a line of `line_len` chars.
#[must_use]
pub fn segment_bounds(starts: &[usize], idx: usize, line_len: usize) -> (usize, usize) {
    let start = starts.get(idx).copied().unwrap_or(line_len);
    let end = starts.get(idx + 1).copied().unwrap_or(line_len);
    (start, end)
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Per-line memo of [`wrap`] results for one width.
///
/// Entries are computed lazily. Changing the width or tab width drops every
/// entry; buffer edits drop only the entries for the lines they replaced.
#[derive(Debug, Clone)]
pub struct WrapCache {
    width: usize,
    tab_width: usize,
    lines: Vec<Option<Vec<usize>>>,
}

impl WrapCache {
    /// A cache for `width` columns.
    ///
    /// # Errors
    ///
    /// [`InvalidViewport`](crate::EditorError::InvalidViewport) when `width < 2`.
    pub fn new(width: usize, tab_width: usize) -> Result<Self> {
        check_viewport(width, 1)?;
        Ok(Self {
            width,
            tab_width: tab_width.max(1),
            lines: Vec::new(),
        })
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Switch to a new width, dropping every entry if it changed.
    ///
    /// # Errors
    ///
    /// [`InvalidViewport`](crate::EditorError::InvalidViewport) when `width < 2`;
    /// the cache is left untouched.
    pub fn set_width(&mut self, width: usize) -> Result<()> {
        check_viewport(width, 1)?;
        if width != self.width {
            self.width = width;
            self.lines.clear();
        }
        Ok(())
    }

    pub fn set_tab_width(&mut self, tab_width: usize) {
        let tab_width = tab_width.max(1);
        if tab_width != self.tab_width {
            self.tab_width = tab_width;
            self.lines.clear();
        }
    }

    /// Invalidate the lines touched by `edits`, in order.
    pub fn apply_edits(&mut self, edits: &[LineEdit]) {
        for edit in edits {
            if edit.line >= self.lines.len() {
                continue;
            }
            let end = (edit.line + edit.removed + 1).min(self.lines.len());
            self.lines
                .splice(edit.line..end, std::iter::repeat_n(None, edit.inserted + 1));
        }
    }

    /// Segment starts of `line`, computing them on first use.
    pub fn starts(&mut self, buf: &Buffer, line: usize) -> &[usize] {
        if self.lines.len() != buf.line_count() {
            self.lines.resize(buf.line_count(), None);
        }
        let (width, tab_width) = (self.width, self.tab_width);
        match self.lines.get_mut(line) {
            Some(slot) => slot
                .get_or_insert_with(|| {
                    buf.line(line).map_or_else(
                        || vec![0],
                        |text| segment_starts(text.chars(), width, tab_width),
                    )
                })
                .as_slice(),
            None => &[0],
        }
    }

    /// Number of visual rows `line` occupies.
    pub fn segment_count(&mut self, buf: &Buffer, line: usize) -> usize {
        self.starts(buf, line).len()
    }

    /// Visual row of `col` within `line`.
    pub fn segment_of(&mut self, buf: &Buffer, line: usize, col: usize) -> usize {
        segment_index(self.starts(buf, line), col)
    }

    /// Char bounds of segment `idx` of `line`.
    pub fn bounds(&mut self, buf: &Buffer, line: usize, idx: usize) -> (usize, usize) {
        let len = buf.line_len(line);
        segment_bounds(self.starts(buf, line), idx, len)
    }
}

impl Default for WrapCache {
    /// 80 columns with the default tab width.
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            tab_width: DEFAULT_TAB_WIDTH,
            lines: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
