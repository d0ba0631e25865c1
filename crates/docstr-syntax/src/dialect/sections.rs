//! Section kinds shared by the numpy and google dialects, and their reST
//! rendition.

use crate::prepare::{dedent, indent_of};

/// How a titled section is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Params,
    Attributes,
    Returns,
    Yields,
    Raises,
    Other,
}

impl SectionKind {
    pub fn of(title: &str) -> SectionKind {
        match title.trim().to_ascii_lowercase().as_str() {
            "args" | "arguments" | "parameters" | "params" | "other parameters"
            | "other params" | "keyword args" | "keyword arguments" | "kwargs" => {
                SectionKind::Params
            }
            "attributes" => SectionKind::Attributes,
            "returns" | "return" => SectionKind::Returns,
            "yields" | "yield" => SectionKind::Yields,
            "raises" | "raise" => SectionKind::Raises,
            _ => SectionKind::Other,
        }
    }
}

/// One `name : type` entry with its description lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub ty: String,
    pub desc: Vec<String>,
}

/// Group a section body into entries: every line at the base indentation
/// starts a new entry, deeper lines belong to the entry above.
pub fn group_entries(body: &[String]) -> Vec<(String, Vec<String>)> {
    let base = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for line in body {
        if !line.trim().is_empty() && indent_of(line) == base {
            groups.push((line.trim().to_string(), Vec::new()));
        } else if let Some((_, rest)) = groups.last_mut() {
            rest.push(line.clone());
        }
    }
    for (_, rest) in &mut groups {
        *rest = dedent(rest);
        while rest.last().is_some_and(|l| l.is_empty()) {
            rest.pop();
        }
    }
    groups
}

fn push_field(out: &mut Vec<String>, name: &str, desc: &[String]) {
    match desc.split_first() {
        Some((first, rest)) if !first.is_empty() => {
            out.push(format!(":{name}: {first}"));
            out.extend(rest.iter().map(|l| indent(l, 4)));
        }
        _ => {
            out.push(format!(":{name}:"));
            out.extend(desc.iter().map(|l| indent(l, 4)));
        }
    }
}

fn indent(line: &str, width: usize) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{:width$}{line}", "")
    }
}

/// Render one section in reST, followed by a blank line.
pub fn render(kind: SectionKind, title: &str, entries: &[Entry], raw: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    match kind {
        SectionKind::Params => {
            for e in entries {
                push_field(&mut out, &format!("param {}", e.name), &e.desc);
                if !e.ty.is_empty() {
                    out.push(format!(":type {}: {}", e.name, e.ty));
                }
            }
        }
        SectionKind::Attributes => {
            for e in entries {
                out.push(format!(".. attribute:: {}", e.name));
                if !e.ty.is_empty() {
                    out.push(format!("   :type: {}", e.ty));
                }
                if !e.desc.is_empty() {
                    out.push(String::new());
                    out.extend(e.desc.iter().map(|l| indent(l, 3)));
                }
                out.push(String::new());
            }
        }
        SectionKind::Returns => match entries {
            [single] => {
                push_field(&mut out, "returns", &single.desc);
                if !single.ty.is_empty() {
                    out.push(format!(":rtype: {}", single.ty));
                }
            }
            _ => {
                let bullets: Vec<String> = entries.iter().map(bullet).collect();
                push_field(&mut out, "returns", &bullets);
            }
        },
        SectionKind::Yields => {
            let bullets: Vec<String> = entries.iter().map(bullet).collect();
            push_field(&mut out, "yields", &bullets);
        }
        SectionKind::Raises => {
            for e in entries {
                push_field(&mut out, &format!("raises {}", e.name), &e.desc);
            }
        }
        SectionKind::Other => {
            out.push(format!(".. rubric:: {}", title.trim()));
            out.push(String::new());
            out.extend(dedent(raw).iter().map(|l| indent(l, 3)));
        }
    }
    out.push(String::new());
    out
}

fn bullet(e: &Entry) -> String {
    let head = match (e.name.is_empty(), e.ty.is_empty()) {
        (false, false) => format!("{} ({})", e.name, e.ty),
        (false, true) => e.name.clone(),
        (true, _) => e.ty.clone(),
    };
    let desc = e.desc.join(" ");
    if desc.trim().is_empty() {
        format!("* {head}")
    } else {
        format!("* {head} -- {}", desc.trim())
    }
}
