// SPDX-License-Identifier: MIT
//
// Key map: physical keys onto editor events and shell commands.
//
//   Ctrl-B  bold            Ctrl-F  find panel        Ctrl-Z  undo
//   Ctrl-I  italic **       Ctrl-K  next match        Ctrl-Y  redo
//   Alt-I   italic          Ctrl-J  previous match    Ctrl-W  words/¶
//   Ctrl-N  footnote        Alt-R   replace one       Ctrl-A  select all
//   Ctrl-T  frontmatter     Alt-A   replace all       Ctrl-S  save
//   Ctrl-C  copy            Tab     switch field *    Ctrl-Q  quit
//   Ctrl-X  cut             Esc     close panel       Ctrl-G  key help
//   Ctrl-V  paste
//
//   Arrows move, Shift+arrows select, Ctrl+Left/Right by word,
//   Ctrl+Up/Down to document start/end, Alt+Home to the body start.
//
//   *  while the find panel has focus; otherwise Tab inserts a tab.
//   ** only where the terminal disambiguates Ctrl-I from Tab.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use quill_editor::{Event, Motion};

/// What a key asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(Event),
    /// Insert the shell's clipboard.
    Paste,
    Save,
    Quit,
    /// Show or hide the key hint row.
    Help,
}

/// Translate one key press. `panel_focused` is whether the find panel
/// currently has focus. Releases and unbound keys give `None`.
pub fn map_key(key: KeyEvent, panel_focused: bool) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let edit = |event| Some(Command::Edit(event));
    let motion = |m: Motion| {
        if shift {
            edit(Event::Select(m))
        } else {
            edit(Event::Move(m))
        }
    };

    match key.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'b' => edit(Event::ToggleBold),
            'i' => edit(Event::ToggleItalic),
            'n' => edit(Event::InsertFootnote),
            't' => edit(Event::InsertFrontmatter),
            'f' => edit(Event::FindOpen),
            'k' => edit(Event::FindNext),
            'j' => edit(Event::FindPrevious),
            'z' if shift => edit(Event::Redo),
            'z' => edit(Event::Undo),
            'y' => edit(Event::Redo),
            'w' => edit(Event::ToggleStatsDisplay),
            'a' => edit(Event::SelectAll),
            'c' => edit(Event::Copy),
            'x' => edit(Event::Cut),
            'v' => Some(Command::Paste),
            's' => Some(Command::Save),
            'q' => Some(Command::Quit),
            'g' => Some(Command::Help),
            _ => None,
        },
        KeyCode::Char(c) if alt => match c.to_ascii_lowercase() {
            'i' => edit(Event::ToggleItalic),
            'r' => edit(Event::ReplaceOne),
            'a' => edit(Event::ReplaceAll),
            _ => None,
        },
        KeyCode::Char(c) => edit(Event::Insert(c)),
        KeyCode::Enter => edit(Event::Newline),
        KeyCode::Tab if panel_focused => edit(Event::FindSwitchField),
        KeyCode::Tab => edit(Event::Insert('\t')),
        KeyCode::Backspace => edit(Event::DeleteBackward),
        KeyCode::Delete => edit(Event::DeleteForward),
        KeyCode::Esc => edit(Event::FindClose),

        KeyCode::Left if ctrl => motion(Motion::WordLeft),
        KeyCode::Right if ctrl => motion(Motion::WordRight),
        KeyCode::Up if ctrl => motion(Motion::DocumentStart),
        KeyCode::Down if ctrl => motion(Motion::DocumentEnd),
        KeyCode::Left => motion(Motion::Left),
        KeyCode::Right => motion(Motion::Right),
        KeyCode::Up => motion(Motion::Up),
        KeyCode::Down => motion(Motion::Down),
        KeyCode::Home if alt => motion(Motion::BodyStart),
        KeyCode::Home if ctrl => motion(Motion::DocumentStart),
        KeyCode::End if ctrl => motion(Motion::DocumentEnd),
        KeyCode::Home => motion(Motion::LineStart),
        KeyCode::End => motion(Motion::LineEnd),
        KeyCode::PageUp => motion(Motion::PageUp),
        KeyCode::PageDown => motion(Motion::PageDown),
        _ => None,
    }
}
