// SPDX-License-Identifier: MIT
//
// quill: a distraction-free terminal Markdown editor.
//
// This binary is the shell around quill-editor. It owns everything the
// engine treats as an external collaborator: the terminal, the file on
// disk, the clipboard, and the log file. Each key press flows through:
//
//   crossterm → keys::map_key → Session::dispatch → RenderModel → draw
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← the engine's viewport
//   ├──────────────────────────────┤
//   │ key hints (Ctrl-G toggles)   │  ← 0 or 1 row
//   │ status line (reverse video)  │  ← 1 row
//   └──────────────────────────────┘

mod keys;
mod terminal;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use quill_editor::wrap::{char_width, display_width};
use quill_editor::{EditorConfig, Event, FindField, RenderModel, Session, StatsDisplay, Viewport};

use crate::keys::{Command, map_key};
use crate::terminal::Terminal;

// ─── Arguments ──────────────────────────────────────────────────────────────

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "A distraction-free terminal Markdown editor")]
struct Args {
    /// Markdown file to open. Created on first save if it does not exist.
    path: Option<PathBuf>,
    /// Settings file (TOML). Defaults to `quill.toml` when present.
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Log to `quill.log` in the working directory, filtered by `RUST_LOG`.
/// The terminal is in raw mode, so nothing may go to stdout or stderr.
fn configure_logging() -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(".", "quill.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

// ─── Editor shell ───────────────────────────────────────────────────────────

struct Editor {
    session: Session,
    path: Option<PathBuf>,
    /// Text from the last copy or cut.
    clipboard: String,
    /// One-shot status message; cleared by the next key.
    message: Option<String>,
    /// Set by the first Ctrl-Q on a modified document.
    quit_pending: bool,
    /// Key hint row shown above the status line.
    show_help: bool,
    model: Option<RenderModel>,
}

/// One-row key reference for the hint row.
const KEY_HINTS: &str = " ^B bold  ^I/M-i italic  ^N note  ^T frontmatter  ^F find  ^K/^J next/prev  \
M-r/M-a replace  ^Z/^Y undo/redo  ^W words/¶  ^S save  ^Q quit  ^G hide";

impl Editor {
    fn open(path: Option<PathBuf>, config: EditorConfig) -> Result<Self> {
        let text = match &path {
            Some(p) if p.exists() => {
                fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?
            }
            _ => String::new(),
        };
        info!(
            target: "runtime.startup",
            path = ?path,
            bytes = text.len(),
            "open"
        );
        Ok(Self {
            session: Session::with_config(&text, config),
            path,
            clipboard: String::new(),
            message: None,
            quit_pending: false,
            show_help: false,
            model: None,
        })
    }

    fn panel_focused(&self) -> bool {
        self.model
            .as_ref()
            .and_then(|m| m.find.as_ref())
            .is_some_and(|p| p.focused)
    }

    /// Run one engine event against the current terminal size.
    fn dispatch(&mut self, event: Event) -> Result<()> {
        let model = self.session.dispatch(event, self.viewport()?)?;
        if let Some(text) = &model.clipboard {
            self.clipboard.clone_from(text);
        }
        if let Some(notice) = &model.notice {
            self.message = Some(notice.to_string());
        }
        self.model = Some(model);
        Ok(())
    }

    fn save(&mut self) {
        let Some(path) = &self.path else {
            self.message = Some("No file name".to_string());
            return;
        };
        match fs::write(path, self.session.current_text()) {
            Ok(()) => {
                self.session.mark_saved();
                info!(target: "io", path = %path.display(), "saved");
                self.message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                error!(target: "io", path = %path.display(), %e, "save failed");
                self.message = Some(format!("Save failed: {e}"));
            }
        }
    }

    /// Handle one command. Returns `false` when the editor should exit.
    fn on_command(&mut self, command: Command) -> Result<bool> {
        self.message = None;
        if command != Command::Quit {
            self.quit_pending = false;
        }
        match command {
            Command::Edit(event) => self.dispatch(event)?,
            Command::Paste => {
                let text = self.clipboard.clone();
                self.dispatch(Event::InsertText(text))?;
            }
            Command::Save => {
                self.save();
                self.dispatch(Event::Refresh)?;
            }
            Command::Quit => {
                if !self.session.is_modified() || self.quit_pending {
                    return Ok(false);
                }
                self.quit_pending = true;
                self.message = Some("Unsaved changes. Press Ctrl-Q again to quit.".to_string());
            }
            Command::Help => {
                self.show_help = !self.show_help;
                self.dispatch(Event::Refresh)?;
            }
        }
        Ok(true)
    }

    /// Rows below the text area: the status line and maybe the hint row.
    fn reserved_rows(&self) -> u16 {
        1 + u16::from(self.show_help)
    }

    fn viewport(&self) -> Result<Viewport> {
        let (cols, rows) = Terminal::size()?;
        Ok(text_viewport(cols, rows, self.reserved_rows()))
    }

    fn run(&mut self, out: &mut impl Write) -> Result<()> {
        self.dispatch(Event::Refresh)?;
        loop {
            self.draw(out)?;
            match event::read()? {
                TermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(command) = map_key(key, self.panel_focused()) {
                        if !self.on_command(command)? {
                            return Ok(());
                        }
                    }
                }
                TermEvent::Paste(text) => self.dispatch(Event::InsertText(text))?,
                TermEvent::Resize(..) => self.dispatch(Event::Refresh)?,
                _ => {}
            }
        }
    }

    // ─── Drawing ────────────────────────────────────────────────────────────

    fn draw(&self, out: &mut impl Write) -> Result<()> {
        let Some(model) = &self.model else {
            return Ok(());
        };
        let (cols, rows) = Terminal::size()?;
        let width = usize::from(cols);
        let text_rows = rows.saturating_sub(self.reserved_rows());

        queue!(out, cursor::Hide)?;
        for y in 0..text_rows {
            queue!(out, cursor::MoveTo(0, y), Clear(ClearType::UntilNewLine))?;
            if let Some(row) = model.rows.get(usize::from(y)) {
                draw_row(out, &row.text, row.selection, width)?;
            }
        }

        let status_row = rows.saturating_sub(1);
        if self.show_help {
            queue!(out, cursor::MoveTo(0, text_rows), Print(pad(KEY_HINTS, width)))?;
        }
        let (status, panel_cursor) = self.status_text(model);
        queue!(
            out,
            cursor::MoveTo(0, status_row),
            SetAttribute(Attribute::Reverse),
            Print(pad(&status, width)),
            SetAttribute(Attribute::Reset)
        )?;

        let target = match (model.cursor, panel_cursor) {
            (Some(pos), _) => Some((pos.col, pos.row)),
            (None, Some(x)) => Some((x.min(width.saturating_sub(1)), usize::from(status_row))),
            (None, None) => None,
        };
        if let Some((x, y)) = target {
            queue!(out, cursor::MoveTo(to_u16(x), to_u16(y)), cursor::Show)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Status line text, and the column of the panel's input cursor when the
    /// find panel has focus.
    fn status_text(&self, model: &RenderModel) -> (String, Option<usize>) {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "[untitled]".into(), |n| n.to_string_lossy());
        status_line(&name, model, self.message.as_deref())
    }
}

/// Compose the status line: file, position and count first, then the find
/// panel, then the one-shot message. Also returns the display column of the
/// focused panel field's end.
fn status_line(name: &str, model: &RenderModel, message: Option<&str>) -> (String, Option<usize>) {
    let status = &model.status;
    let count = match status.display {
        StatsDisplay::Words => format!("{} words", status.count),
        StatsDisplay::Paragraphs => format!("{} ¶", status.count),
    };
    let modified = if status.modified { " [+]" } else { "" };
    let mut text = format!(" {name}{modified}  {}:{}  {count}", status.line, status.column);

    let mut cursor = None;
    if let Some(panel) = &model.find {
        text.push_str(&format!("  │ {}  Find: {}", model.mode.label(), panel.term));
        let term_end = display_width(text.chars(), 1);
        text.push_str(&format!("  Replace: {}", panel.replacement));
        let replacement_end = display_width(text.chars(), 1);
        if let Some(current) = panel.current {
            text.push_str(&format!("  [{current}/{}]", panel.total));
        }
        cursor = panel.focused.then_some(match panel.field {
            FindField::Term => term_end,
            FindField::Replacement => replacement_end,
        });
    }
    if let Some(message) = message {
        text.push_str("  │ ");
        text.push_str(message);
    }
    (text, cursor)
}

/// Print one row, reversing the selected span, cut off at `width` columns.
fn draw_row(out: &mut impl Write, text: &str, selection: Option<(usize, usize)>, width: usize) -> Result<()> {
    let text = clip(text, width);
    match selection {
        Some((from, to)) => {
            let (before, rest) = split_at_col(text, from);
            let (selected, after) = split_at_col(rest, to - from);
            queue!(
                out,
                Print(before),
                SetAttribute(Attribute::Reverse),
                Print(if selected.is_empty() { " " } else { selected }),
                SetAttribute(Attribute::Reset),
                Print(after)
            )?;
        }
        None => queue!(out, Print(text))?,
    }
    Ok(())
}

/// Split `text` at display column `col`.
fn split_at_col(text: &str, col: usize) -> (&str, &str) {
    let mut x = 0;
    for (i, ch) in text.char_indices() {
        if x >= col {
            return text.split_at(i);
        }
        x += char_width(ch, 1);
    }
    (text, "")
}

/// The prefix of `text` that fits in `width` columns.
fn clip(text: &str, width: usize) -> &str {
    let mut x = 0;
    for (i, ch) in text.char_indices() {
        x += char_width(ch, 1);
        if x > width {
            return &text[..i];
        }
    }
    text
}

fn pad(text: &str, width: usize) -> String {
    let text = clip(text, width);
    format!("{text}{}", " ".repeat(width.saturating_sub(display_width(text.chars(), 1))))
}

/// The engine's viewport: the whole terminal minus the reserved rows.
fn text_viewport(cols: u16, rows: u16, reserved: u16) -> Viewport {
    let height = usize::from(rows.saturating_sub(reserved)).max(1);
    Viewport::new(usize::from(cols).max(2), height)
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Settings file looked up in the working directory without `--config`.
const CONFIG_FILE: &str = "quill.toml";

/// Settings from `--config`, else from `quill.toml` when present, else the
/// defaults. A named file that cannot be read is an error.
fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let path = Path::new(CONFIG_FILE);
            if !path.is_file() {
                return Ok(EditorConfig::default());
            }
            path
        }
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    EditorConfig::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut editor = Editor::open(args.path, config)?;

    let mut term = Terminal::new();
    term.enter().context("failed to initialize terminal")?;
    let result = editor.run(&mut io::stdout());
    term.leave()?;
    result
}

fn main() {
    let args = Args::parse();
    let _log_guard = configure_logging();

    if let Err(e) = run(args) {
        error!(target: "runtime", error = %e, "exit");
        eprintln!("quill: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clip_stops_at_width() {
        assert_eq!(clip("hello world", 5), "hello");
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("日本語", 4), "日本");
    }

    #[test]
    fn split_by_display_column() {
        assert_eq!(split_at_col("abcdef", 2), ("ab", "cdef"));
        assert_eq!(split_at_col("abc", 9), ("abc", ""));
        assert_eq!(split_at_col("日本語", 2), ("日", "本語"));
    }

    #[test]
    fn pad_fills_the_row() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcd");
    }

    fn model_after(session: &mut Session, events: Vec<Event>) -> RenderModel {
        let view = Viewport::new(80, 10);
        let mut model = session.dispatch(Event::Refresh, view).unwrap();
        for event in events {
            model = session.dispatch(event, view).unwrap();
        }
        model
    }

    #[test]
    fn status_line_shows_position_and_count() {
        let mut session = Session::load("one two\n\nthree");
        let model = model_after(&mut session, vec![Event::Move(quill_editor::Motion::Right)]);
        let (text, cursor) = status_line("notes.md", &model, None);
        assert_eq!(text, " notes.md  1:2  2 ¶");
        assert_eq!(cursor, None);
    }

    #[test]
    fn find_panel_and_message_extend_the_status_line() {
        let mut session = Session::load("one two one");
        let mut events = vec![Event::FindOpen];
        events.extend("one".chars().map(Event::Insert));
        events.push(Event::Newline);
        let model = model_after(&mut session, events);
        let (text, cursor) = status_line("notes.md", &model, Some("Match 1 of 2"));
        assert!(text.starts_with(" notes.md  1:1  1 ¶  │ MATCH  Find: one  Replace: "));
        assert!(text.ends_with("[1/2]  │ Match 1 of 2"));
        let term_end = " notes.md  1:1  1 ¶  │ MATCH  Find: one".chars().count();
        assert_eq!(cursor, Some(term_end));
    }

    #[test]
    fn hint_row_takes_a_row_from_the_text_area() {
        assert_eq!(text_viewport(80, 24, 1), Viewport::new(80, 23));
        assert_eq!(text_viewport(80, 24, 2), Viewport::new(80, 22));
        assert_eq!(text_viewport(1, 1, 2), Viewport::new(2, 1));
    }

    #[test]
    fn config_defaults_without_a_file() {
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }

    #[test]
    fn missing_named_config_is_an_error() {
        let err = load_config(Some(Path::new("no/such/quill.toml"))).unwrap_err();
        assert!(err.to_string().starts_with("reading no/such/quill.toml"));
    }
}
