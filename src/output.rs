//! # Terminal Output
//!
//! Colour handling for the CLI. Progress goes through the `log` facade;
//! this module only styles the short summaries commands print on stdout.
//!
//! Colour is decided once per run from the `--color` flag and the usual
//! environment conventions:
//! - `NO_COLOR` disables colour when set (per https://no-color.org/)
//! - `CLICOLOR=0` disables colour
//! - `CLICOLOR_FORCE=1` forces colour even when stdout is not a terminal
//! - `TERM=dumb` disables colour

use std::env;
use std::fmt::Display;

use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// `color_flag` is `always`, `never`, or `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green, for a finished command.
    pub fn success(&self, text: impl Display) -> String {
        self.paint(text, |s| s.green().bold())
    }

    /// Red, for failures in a summary.
    pub fn failure(&self, text: impl Display) -> String {
        self.paint(text, |s| s.red().bold())
    }

    /// Yellow, for repository names.
    pub fn repository(&self, text: impl Display) -> String {
        self.paint(text, |s| s.yellow())
    }

    /// Blue, for tags and refs.
    pub fn reference(&self, text: impl Display) -> String {
        self.paint(text, |s| s.blue())
    }

    fn paint<D: Display>(
        &self,
        text: D,
        styler: impl FnOnce(console::StyledObject<D>) -> console::StyledObject<D>,
    ) -> String {
        if self.use_color {
            styler(style(text)).force_styling(true).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
