//! Editor settings, parsed from TOML.
//!
//! ```toml
//! tab_width = 4
//! scroll_past_end = false
//! show_word_count = true
//! frontmatter_fields = ["title", "author", "date"]
//! ```
//!
//! Every key is optional; missing keys take their defaults. Unknown keys are
//! ignored so older binaries tolerate newer files. Reading the file is the
//! shell's job; this module only parses text.

use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::markdown::DEFAULT_FRONTMATTER_FIELDS;
use crate::wrap::DEFAULT_TAB_WIDTH;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Columns a tab occupies. Values below 1 are treated as 1.
    pub tab_width: usize,
    /// Let the last line scroll up to the viewport top.
    pub scroll_past_end: bool,
    /// Status line starts on the word count instead of paragraphs.
    pub show_word_count: bool,
    /// Fields the frontmatter command fills in, in order.
    pub frontmatter_fields: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            scroll_past_end: false,
            show_word_count: false,
            frontmatter_fields: DEFAULT_FRONTMATTER_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl EditorConfig {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// [`Config`](crate::EditorError::Config) when the text is not valid TOML
    /// or a key has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        if config.tab_width == 0 {
            info!(target: "config", "tab_width 0 clamped to 1");
            config.tab_width = 1;
        }
        Ok(config)
    }
}
