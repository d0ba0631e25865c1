//! The canonical block model: reST paragraphs, field entries and
//! `.. attribute::` directives.

use crate::error::{Result, SyntaxError};
use crate::field::SEE;
use crate::prepare::{dedent, indent_of, join_trimmed};
use regex::Regex;
use std::sync::LazyLock;

static RE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:(?P<name>[^:\s][^:]*):(?:[ \t]+(?P<body>.*))?$").unwrap()
});

static RE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\.[ \t]+(?P<kind>[A-Za-z][\w-]*)::(?P<args>.*)$").unwrap()
});

const ATTRIBUTE: &str = "attribute";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Prose, one paragraph per block.
    Paragraph(String),
    /// `:name: body`
    Field { name: String, body: String },
    /// `.. attribute:: name` with its `:type:` body and description.
    Attribute {
        name: String,
        type_body: String,
        body: String,
    },
    /// `.. attribute:: see <target...>`
    SeeAttribute { target: Vec<String> },
    /// Any other directive, e.g. `.. rubric:: Notes`.
    Section {
        directive: String,
        title: String,
        body: String,
    },
}

impl Block {
    /// Field and attribute blocks; the things a token is built from.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            Block::Field { .. } | Block::Attribute { .. } | Block::SeeAttribute { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse prepared reST lines into blocks.
    pub fn parse(lines: &[String]) -> Result<Document> {
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            if line.trim().is_empty() {
                i += 1;
                continue;
            }

            if let Some(caps) = RE_FIELD.captures(line) {
                let end = indented_run(lines, i + 1);
                let mut body_lines = vec![caps
                    .name("body")
                    .map_or("", |m| m.as_str())
                    .trim()
                    .to_string()];
                body_lines.extend(dedent(&lines[i + 1..end]));
                blocks.push(Block::Field {
                    name: caps["name"].trim().to_string(),
                    body: join_trimmed(&body_lines),
                });
                i = end;
                continue;
            }

            if let Some(caps) = RE_DIRECTIVE.captures(line) {
                let end = indented_run(lines, i + 1);
                let content = dedent(&lines[i + 1..end]);
                blocks.push(directive(
                    i + 1,
                    line,
                    &caps["kind"],
                    caps["args"].trim(),
                    &content,
                )?);
                i = end;
                continue;
            }

            let start = i;
            while i < lines.len()
                && !lines[i].trim().is_empty()
                && !(i > start && is_marker(&lines[i]))
            {
                i += 1;
            }
            blocks.push(Block::Paragraph(lines[start..i].join("\n")));
        }

        Ok(Document { blocks })
    }

    /// The leading prose run, up to the first non-paragraph block.
    pub fn description(&self) -> Option<String> {
        let paragraphs: Vec<&str> = self
            .blocks
            .iter()
            .map_while(|b| match b {
                Block::Paragraph(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if paragraphs.is_empty() {
            None
        } else {
            Some(paragraphs.join("\n"))
        }
    }

    pub fn has_fields(&self) -> bool {
        self.blocks.iter().any(Block::is_structured)
    }
}

fn is_marker(line: &str) -> bool {
    RE_FIELD.is_match(line) || RE_DIRECTIVE.is_match(line)
}

/// End of the run of blank or indented lines starting at `from`.
fn indented_run(lines: &[String], from: usize) -> usize {
    let mut end = from;
    while end < lines.len() && (lines[end].trim().is_empty() || indent_of(&lines[end]) > 0) {
        end += 1;
    }
    end
}

fn directive(line_no: usize, line: &str, kind: &str, args: &str, content: &[String]) -> Result<Block> {
    if kind != ATTRIBUTE {
        return Ok(Block::Section {
            directive: kind.to_string(),
            title: args.to_string(),
            body: join_trimmed(content),
        });
    }

    let words: Vec<&str> = args.split_whitespace().collect();
    match words.as_slice() {
        [] => Err(SyntaxError::MalformedDirective {
            line: line_no,
            text: line.to_string(),
        }),
        [SEE] => Err(SyntaxError::MissingLinkTarget(args.to_string())),
        [SEE, target @ ..] => {
            if content.iter().any(|l| !l.trim().is_empty()) {
                return Err(SyntaxError::LinkWithBody(target.join(" ")));
            }
            Ok(Block::SeeAttribute {
                target: target.iter().map(|t| t.to_string()).collect(),
            })
        }
        [name] => attribute(name, content),
        _ => Err(SyntaxError::AmbiguousFieldName(args.to_string())),
    }
}

fn attribute(name: &str, content: &[String]) -> Result<Block> {
    let inner = Document::parse(content)?;
    let mut type_body = None;
    let mut body = Vec::new();
    for block in inner.blocks {
        match block {
            Block::Field { name: field, body: ty } if field == "type" && type_body.is_none() => {
                type_body = Some(ty);
            }
            Block::Paragraph(text) => body.push(text),
            _ => {}
        }
    }
    let type_body = type_body.ok_or_else(|| SyntaxError::MissingAttributeType(name.to_string()))?;
    Ok(Block::Attribute {
        name: name.to_string(),
        type_body,
        body: body.join("\n"),
    })
}
