//! Error kinds for the editing engine.
//!
//! Only two kinds ever reach the caller of [`Session::dispatch`] as an `Err`:
//! a bad viewport and (when loading settings) malformed configuration. The
//! find/replace kinds are non-fatal; the session turns them into a
//! [`Notice`] on the render model instead.
//!
//! Cursor and selection arithmetic never fails. Anything that would point
//! past the document is clamped to the nearest valid position.
//!
//! [`Session::dispatch`]: crate::session::Session::dispatch
//! [`Notice`]: crate::event::Notice

use thiserror::Error;

/// Everything that can go wrong in the editing engine.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The viewport is too small to lay text out in. Width must be at least
    /// 2 columns and height at least 1 row. This is a caller bug; retrying
    /// with the same geometry fails the same way.
    #[error("invalid viewport {width}x{height}: need width >= 2 and height >= 1")]
    InvalidViewport { width: usize, height: usize },

    /// Find/replace was committed with a blank search term.
    #[error("nothing to search for")]
    EmptySearchTerm,

    /// The committed search term does not occur in the document.
    #[error("no matches for {term:?}")]
    NoMatches { term: String },

    /// The configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Reject viewports the wrap engine and scroller cannot work with.
pub(crate) fn check_viewport(width: usize, height: usize) -> Result<()> {
    if width < 2 || height == 0 {
        return Err(EditorError::InvalidViewport { width, height });
    }
    Ok(())
}
