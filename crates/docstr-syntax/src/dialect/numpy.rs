//! Numpy dialect: `Title` over an underline, entries as `name : type`.

use super::sections::{self, Entry, SectionKind};
use crate::prepare::indent_of;
use crate::scan;
use regex::Regex;
use std::sync::LazyLock;

static RE_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-=~^*+#]{3,}\s*$").unwrap());

fn is_header(lines: &[String], i: usize) -> bool {
    let Some(title) = lines.get(i) else {
        return false;
    };
    !title.trim().is_empty()
        && indent_of(title) == 0
        && lines.get(i + 1).is_some_and(|u| RE_UNDERLINE.is_match(u))
}

/// Translate numpy sections to reST; text outside sections is kept as is.
pub fn to_rst(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if !is_header(lines, i) {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }

        let title = lines[i].trim();
        let start = i + 2;
        let mut end = start;
        while end < lines.len() && !is_header(lines, end) {
            end += 1;
        }
        let body = &lines[start..end];

        if out.last().is_some_and(|l: &String| !l.is_empty()) {
            out.push(String::new());
        }
        let kind = SectionKind::of(title);
        let entries = sections::group_entries(body)
            .into_iter()
            .map(|(head, desc)| entry(kind, &head, desc))
            .collect::<Vec<_>>();
        out.extend(sections::render(kind, title, &entries, body));
        i = end;
    }
    out
}

fn entry(kind: SectionKind, head: &str, desc: Vec<String>) -> Entry {
    match scan::colon_position(head) {
        Some(pos) => Entry {
            name: head[..pos].trim().to_string(),
            ty: head[pos + 1..].trim().to_string(),
            desc,
        },
        // A bare return line is the type; elsewhere it is the name.
        None if matches!(kind, SectionKind::Returns | SectionKind::Yields) => Entry {
            name: String::new(),
            ty: head.to_string(),
            desc,
        },
        None => Entry {
            name: head.to_string(),
            ty: String::new(),
            desc,
        },
    }
}
