//! Field grammar: classify field names and tokenize type field bodies.
//!
//! Field names follow the reST info-field convention:
//! `param <name>`, `type <name>`, `returns`, `rtype`. A `param see <target>`
//! field is a link-all marker rather than a parameter.

use crate::error::{Result, SyntaxError};
use crate::scan;
use regex::Regex;
use std::sync::LazyLock;

static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:param|parameter|arg|argument)(?:[ \t]+(?P<rest>.*))?$").unwrap()
});

static RE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^type(?:[ \t]+(?P<rest>.*))?$").unwrap());

/// The keyword that turns a type or param field into a doc link.
pub const SEE: &str = "see";

/// What a field's name says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `param <name>`
    Param(String),
    /// `param see <target>`: splice every argument of `target` here.
    LinkAll(String),
    /// `type <name>`
    Type(String),
    Returns,
    RType,
    /// Any other field, kept verbatim.
    Other(String),
}

/// Classify a field by its name text.
pub fn classify(name: &str) -> Result<FieldKind> {
    let name = name.trim();

    if let Some(caps) = RE_PARAM.captures(name) {
        let words: Vec<&str> = caps
            .name("rest")
            .map(|m| m.as_str().split_whitespace().collect())
            .unwrap_or_default();
        return match words.as_slice() {
            [] => Err(SyntaxError::MissingFieldName(name.to_string())),
            [SEE] => Err(SyntaxError::MissingLinkTarget(name.to_string())),
            [SEE, target] => Ok(FieldKind::LinkAll(target.to_string())),
            [single] => Ok(FieldKind::Param(single.to_string())),
            _ => Err(SyntaxError::AmbiguousFieldName(name.to_string())),
        };
    }

    if let Some(caps) = RE_TYPE.captures(name) {
        let words: Vec<&str> = caps
            .name("rest")
            .map(|m| m.as_str().split_whitespace().collect())
            .unwrap_or_default();
        return match words.as_slice() {
            [] => Err(SyntaxError::MissingFieldName(name.to_string())),
            [single] => Ok(FieldKind::Type(single.to_string())),
            _ => Err(SyntaxError::AmbiguousFieldName(name.to_string())),
        };
    }

    Ok(match name {
        "returns" | "return" => FieldKind::Returns,
        "rtype" => FieldKind::RType,
        other => FieldKind::Other(other.to_string()),
    })
}

// -- Type bodies --------------------------------------------------------------

/// One `|`-separated alternative of a type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeToken {
    pub ty: String,
    /// Only ever set on the last alternative.
    pub default: Option<String>,
}

/// A tokenized type field body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody {
    /// `int | float = 3`
    Alternatives(Vec<TypeToken>),
    /// `see <words...>`: the words after `see`.
    Link(Vec<String>),
}

impl TypeBody {
    /// The default token of the last alternative, if any.
    pub fn default(&self) -> Option<&str> {
        match self {
            TypeBody::Alternatives(alts) => alts.last().and_then(|t| t.default.as_deref()),
            TypeBody::Link(_) => None,
        }
    }
}

/// Tokenize a type body into ordered `(type, default)` alternatives, or a
/// link when the body starts with `see`.
pub fn tokenize_type(body: &str) -> Result<TypeBody> {
    let body = body.trim();
    let mut words = body.split_whitespace();
    if words.next() == Some(SEE) {
        let target: Vec<String> = words.map(str::to_string).collect();
        if target.is_empty() {
            return Err(SyntaxError::MissingLinkTarget(body.to_string()));
        }
        return Ok(TypeBody::Link(target));
    }

    let parts = scan::split_top_level(body, '|')
        .ok_or_else(|| SyntaxError::Unbalanced(body.to_string()))?;
    let last = parts.len() - 1;

    let mut alternatives = Vec::with_capacity(parts.len());
    for (i, part) in parts.into_iter().enumerate() {
        let (ty, default) = match scan::assignment_position(part) {
            Some(Some(pos)) => (&part[..pos], Some(part[pos + 1..].trim())),
            Some(None) => (part, None),
            None => return Err(SyntaxError::Unbalanced(body.to_string())),
        };
        let ty = ty.trim();
        if ty.is_empty() {
            return Err(SyntaxError::EmptyType(body.to_string()));
        }
        if default.is_some() && i != last {
            return Err(SyntaxError::MisplacedDefault(body.to_string()));
        }
        if default.is_some_and(str::is_empty) {
            return Err(SyntaxError::EmptyDefault(body.to_string()));
        }
        alternatives.push(TypeToken {
            ty: ty.to_string(),
            default: default.map(str::to_string),
        });
    }
    Ok(TypeBody::Alternatives(alternatives))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_param_and_type() {
        assert_eq!(classify("param foo").unwrap(), FieldKind::Param("foo".into()));
        assert_eq!(classify("type  foo ").unwrap(), FieldKind::Type("foo".into()));
        assert_eq!(classify("returns").unwrap(), FieldKind::Returns);
        assert_eq!(classify("rtype").unwrap(), FieldKind::RType);
    }

    #[test]
    fn classify_link_all_marker() {
        assert_eq!(
            classify("param see func_defaults").unwrap(),
            FieldKind::LinkAll("func_defaults".into())
        );
        assert!(matches!(
            classify("param see"),
            Err(SyntaxError::MissingLinkTarget(_))
        ));
    }

    #[test]
    fn classify_rejects_multiple_names() {
        assert!(matches!(
            classify("param str foo"),
            Err(SyntaxError::AmbiguousFieldName(_))
        ));
        assert!(matches!(
            classify("type a b"),
            Err(SyntaxError::AmbiguousFieldName(_))
        ));
    }

    #[test]
    fn classify_keeps_unknown_fields() {
        assert_eq!(classify("raises").unwrap(), FieldKind::Other("raises".into()));
        // a longer word that merely starts with `param`
        assert_eq!(
            classify("paramspec").unwrap(),
            FieldKind::Other("paramspec".into())
        );
    }

    #[test]
    fn tokenize_single_type_with_default() {
        let body = tokenize_type("str = 'foo'").unwrap();
        assert_eq!(
            body,
            TypeBody::Alternatives(vec![TypeToken {
                ty: "str".into(),
                default: Some("'foo'".into()),
            }])
        );
        assert_eq!(body.default(), Some("'foo'"));
    }

    #[test]
    fn tokenize_multi_type() {
        let body = tokenize_type("'foo' | 'bar' = 'foo'").unwrap();
        let TypeBody::Alternatives(alts) = body else {
            panic!("expected alternatives");
        };
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].ty, "'foo'");
        assert_eq!(alts[0].default, None);
        assert_eq!(alts[1].ty, "'bar'");
        assert_eq!(alts[1].default.as_deref(), Some("'foo'"));
    }

    #[test]
    fn tokenize_keeps_literal_containers_whole() {
        let TypeBody::Alternatives(alts) = tokenize_type("dict = {'a': 1, 'b': (2, 3)}").unwrap()
        else {
            panic!("expected alternatives");
        };
        assert_eq!(alts[0].default.as_deref(), Some("{'a': 1, 'b': (2, 3)}"));
    }

    #[test]
    fn tokenize_link() {
        assert_eq!(
            tokenize_type("see self").unwrap(),
            TypeBody::Link(vec!["self".into()])
        );
        assert_eq!(
            tokenize_type("see func_defaults.foo").unwrap(),
            TypeBody::Link(vec!["func_defaults.foo".into()])
        );
    }

    #[test]
    fn tokenize_errors() {
        assert!(matches!(tokenize_type(""), Err(SyntaxError::EmptyType(_))));
        assert!(matches!(tokenize_type("int |"), Err(SyntaxError::EmptyType(_))));
        assert!(matches!(
            tokenize_type("int = 1 | float"),
            Err(SyntaxError::MisplacedDefault(_))
        ));
        assert!(matches!(tokenize_type("int ="), Err(SyntaxError::EmptyDefault(_))));
        assert!(matches!(tokenize_type("list = [1"), Err(SyntaxError::Unbalanced(_))));
    }
}
