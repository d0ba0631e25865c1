//! Google dialect: a known `Title:` line with an indented body, entries as
//! `name (type): description`.

use super::sections::{self, Entry, SectionKind};
use crate::prepare::indent_of;
use crate::scan;
use regex::Regex;
use std::sync::LazyLock;

static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<title>[A-Za-z][A-Za-z ]*):\s*$").unwrap());

static RE_NAME_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>\*{0,2}[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<ty>.*)\)$").unwrap()
});

const TITLES: &[&str] = &[
    "args",
    "arguments",
    "parameters",
    "params",
    "other parameters",
    "other params",
    "keyword args",
    "keyword arguments",
    "kwargs",
    "attributes",
    "returns",
    "return",
    "yields",
    "yield",
    "raises",
    "raise",
    "note",
    "notes",
    "example",
    "examples",
    "warning",
    "warnings",
    "see also",
    "references",
    "todo",
    "methods",
];

fn header(line: &str) -> Option<&str> {
    if indent_of(line) != 0 {
        return None;
    }
    let title = RE_HEADER.captures(line)?.name("title")?.as_str();
    TITLES
        .contains(&title.trim().to_ascii_lowercase().as_str())
        .then_some(title)
}

/// Translate google sections to reST; text outside sections is kept as is.
pub fn to_rst(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let Some(title) = header(&lines[i]) else {
            out.push(lines[i].clone());
            i += 1;
            continue;
        };

        let start = i + 1;
        let mut end = start;
        while end < lines.len() && (lines[end].trim().is_empty() || indent_of(&lines[end]) > 0) {
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

fn entry(kind: SectionKind, head: &str, mut desc: Vec<String>) -> Entry {
    let returns_like = matches!(kind, SectionKind::Returns | SectionKind::Yields);
    let (lead, first) = match scan::colon_position(head) {
        Some(pos) => (head[..pos].trim(), head[pos + 1..].trim()),
        None if returns_like => ("", head),
        None => (head, ""),
    };
    if !first.is_empty() {
        desc.insert(0, first.to_string());
    }

    if returns_like {
        return Entry {
            name: String::new(),
            ty: lead.to_string(),
            desc,
        };
    }
    match RE_NAME_TYPE.captures(lead) {
        Some(caps) => Entry {
            name: caps["name"].to_string(),
            ty: caps["ty"].trim().to_string(),
            desc,
        },
        None => Entry {
            name: lead.to_string(),
            ty: String::new(),
            desc,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn translates_args_and_returns() {
        let doc = lines(
            "Summary.\n\nArgs:\n    foo (str): The foo.\n    bar (str = 'bar'): The bar.\n        Continued.\n\nReturns:\n    str: Joined.",
        );
        assert_eq!(
            to_rst(&doc),
            vec![
                "Summary.",
                "",
                ":param foo: The foo.",
                ":type foo: str",
                ":param bar: The bar.",
                "    Continued.",
                ":type bar: str = 'bar'",
                "",
                ":returns: Joined.",
                ":rtype: str",
                "",
            ]
        );
    }

    #[test]
    fn attributes_become_directives() {
        let doc = lines("Attributes:\n    a (int): The a.");
        let rst = to_rst(&doc);
        assert_eq!(&rst[..2], &[".. attribute:: a", "   :type: int"]);
    }

    #[test]
    fn unknown_titles_are_text() {
        let doc = lines("Usage:\n    call it");
        assert_eq!(to_rst(&doc), doc);
    }
}
