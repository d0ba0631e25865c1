//! Errors raised while normalizing a docstring or reading its field grammar.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unsupported docstring style `{0}`: expected rst, numpy or google")]
    UnsupportedStyle(String),

    #[error("attribute `{0}` has no `:type:` line")]
    MissingAttributeType(String),

    #[error("`see` link has no target: `{0}`")]
    MissingLinkTarget(String),

    #[error("`see` attribute linking `{0}` must not have a body")]
    LinkWithBody(String),

    #[error("ambiguous field name `{0}`: expected exactly one identifier")]
    AmbiguousFieldName(String),

    #[error("field `{0}` names no parameter")]
    MissingFieldName(String),

    #[error("malformed directive on line {line}: `{text}`")]
    MalformedDirective { line: usize, text: String },

    #[error("no type found in `{0}`")]
    EmptyType(String),

    #[error("empty default value in `{0}`")]
    EmptyDefault(String),

    #[error("default value on a non-final type alternative in `{0}`")]
    MisplacedDefault(String),

    #[error("unbalanced brackets or quotes in `{0}`")]
    Unbalanced(String),
}

pub type Result<T> = std::result::Result<T, SyntaxError>;
