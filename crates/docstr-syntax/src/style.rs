//! Docstring style selector.

use crate::error::SyntaxError;
use std::fmt;
use std::str::FromStr;

/// The documentation dialect a docstring is written in.
///
/// `Numpy` and `Google` are translated into `Rst` field lists before the
/// block model is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Style {
    #[default]
    Rst,
    Numpy,
    Google,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Rst => "rst",
            Style::Numpy => "numpy",
            Style::Google => "google",
        }
    }
}

impl FromStr for Style {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rst" | "rest" | "restructuredtext" => Ok(Style::Rst),
            "numpy" => Ok(Style::Numpy),
            "google" => Ok(Style::Google),
            _ => Err(SyntaxError::UnsupportedStyle(s.to_string())),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
