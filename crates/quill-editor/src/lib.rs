//! # quill-editor: editing engine for quill
//!
//! Everything between a key press and the rows on screen, minus the
//! terminal itself:
//!
//! - **[`position`]**: `Position` (line, col), `Range`, and `Selection`, 0-indexed
//! - **[`buffer`]**: `Buffer` wrapping a rope, with line-ending detection and a damage log
//! - **[`wrap`]**: word wrap of one logical line into visual rows, plus a per-line cache
//! - **[`cursor`]**: cursor motion over graphemes, words, and visual rows
//! - **[`history`]**: transactional undo/redo
//! - **[`scroll`]**: the persistent scroll anchor that moves one visual row at a time
//! - **[`find`]**: the find/replace state machine
//! - **[`markdown`]**: emphasis, footnotes, frontmatter, and document statistics
//! - **[`session`]**: one open document; `load`, `current_text`, `cursor_summary`, `dispatch`
//!
//! The shell talks to [`Session`] only. It feeds [`Event`]s in and draws the
//! [`RenderModel`]s that come back.

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod error;
pub mod event;
pub mod find;
pub mod history;
pub mod markdown;
pub mod position;
pub mod scroll;
pub mod session;
pub mod word;
pub mod wrap;

pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use event::{Event, Motion, Notice};
pub use find::{FindField, FindMode, FindPanel};
pub use position::{Position, Range, Selection};
pub use session::{CursorSummary, RenderModel, ScreenPos, Session, StatsDisplay, StatusLine, Viewport, VisualRow};
