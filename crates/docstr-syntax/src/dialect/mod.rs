//! Mechanical translation of the prose dialects into reST field lists.
//!
//! Each dialect only recognizes its section headers. Everything else passes
//! through untouched so the reST block parser sees the original prose.

pub mod google;
pub mod numpy;
pub mod sections;

use crate::style::Style;

/// Translate prepared docstring lines of the given style into reST lines.
pub fn to_rst(style: Style, lines: &[String]) -> Vec<String> {
    match style {
        Style::Rst => lines.to_vec(),
        Style::Numpy => numpy::to_rst(lines),
        Style::Google => google::to_rst(lines),
    }
}
