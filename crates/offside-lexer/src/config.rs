//! Transducer configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tab expansion used when none is configured
pub const DEFAULT_TAB_WIDTH: u32 = 4;

/// Largest tab width [`IndentConfig::validate`] accepts
pub const MAX_TAB_WIDTH: u32 = 256;

/// Character a source unit indents with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    Spaces,
    Tabs,
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentStyle::Spaces => f.write_str("spaces"),
            IndentStyle::Tabs => f.write_str("tabs"),
        }
    }
}

/// What to do when one line indents with tabs and another with spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePolicy {
    /// The first indented line fixes the style for the whole unit
    #[default]
    Strict,
    /// Only the measured widths are compared
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tab width must be at least 1")]
    ZeroTabWidth,
    #[error("tab width {0} exceeds the maximum of {max}", max = MAX_TAB_WIDTH)]
    TabWidthTooLarge(u32),
}

/// Knobs of the INDENT/DEDENT transducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// Width a single tab adds to the indentation
    pub tab_width: u32,
    pub style_policy: StylePolicy,
    /// Forward one NEWLINE at the end of every logical line
    pub emit_newlines: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            style_policy: StylePolicy::Strict,
            emit_newlines: false,
        }
    }
}

impl IndentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_style_policy(mut self, policy: StylePolicy) -> Self {
        self.style_policy = policy;
        self
    }

    pub fn with_newlines(mut self, emit: bool) -> Self {
        self.emit_newlines = emit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::ZeroTabWidth);
        }
        if self.tab_width > MAX_TAB_WIDTH {
            return Err(ConfigError::TabWidthTooLarge(self.tab_width));
        }
        Ok(())
    }

    pub fn is_strict(&self) -> bool {
        self.style_policy == StylePolicy::Strict
    }
}
