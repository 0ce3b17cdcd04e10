// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and RAII cleanup.
//
// `Terminal::enter` switches the terminal into editing mode and `leave` (or
// drop) puts it back. A panic hook restores the terminal before the default
// hook prints its message, so a crash never leaves the shell in raw mode.
//
// Where the terminal supports the kitty keyboard protocol, escape codes are
// disambiguated so Ctrl-I arrives as itself rather than as Tab.

use std::io::{self, Write};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use tracing::debug;

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Set while keyboard enhancement flags are pushed, so the panic hook knows
/// to pop them.
static KEYBOARD_ENHANCED: AtomicBool = AtomicBool::new(false);

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            tracing::error!(target: "runtime.panic", %info, "panic");
            original(info);
        }));
    });
}

/// Best-effort restore; errors are ignored because there is nowhere left to
/// report them.
fn restore() {
    let mut out = io::stdout();
    if KEYBOARD_ENHANCED.swap(false, Ordering::SeqCst) {
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(out, DisableBracketedPaste, cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the terminal's raw state for the lifetime of the editor.
pub struct Terminal {
    active: bool,
}

impl Terminal {
    pub const fn new() -> Self {
        Self { active: false }
    }

    /// Raw mode, alternate screen, bracketed paste, and disambiguated keys
    /// when the terminal supports them.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, EnableBracketedPaste)?;
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
            KEYBOARD_ENHANCED.store(true, Ordering::SeqCst);
        }
        debug!(target: "runtime", keyboard_enhanced = enhanced, "terminal entered");
        out.flush()?;
        self.active = true;
        Ok(())
    }

    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        let mut out = io::stdout();
        if KEYBOARD_ENHANCED.swap(false, Ordering::SeqCst) {
            execute!(out, PopKeyboardEnhancementFlags)?;
        }
        execute!(out, DisableBracketedPaste, cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    /// Current size as `(cols, rows)`.
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}
