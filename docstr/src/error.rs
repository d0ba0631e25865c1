//! Parser errors. Every failure aborts the whole parse.

use docstr_syntax::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // -- Malformed document and grammar --
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("`{0}` has no docstring")]
    MissingDocstring(String),

    #[error("the docstring of `{0}` includes no fields")]
    NoFields(String),

    #[error("duplicate parameter `{name}` in `{object}`")]
    DuplicateParam { object: String, name: String },

    #[error("duplicate parameter type `{name}` in `{object}`")]
    DuplicateType { object: String, name: String },

    #[error("multiple `{field}` fields in `{object}`")]
    DuplicateField { object: String, field: String },

    #[error("unmatched params and types in `{object}`: {}", .names.join(", "))]
    Unmatched { object: String, names: Vec<String> },

    #[error("malformed link `see {text}` in `{object}`")]
    MalformedLink { object: String, text: String },

    // -- Resolution --
    #[error("cannot resolve `{token}` in the context of `{context}`")]
    Unresolved { token: String, context: String },

    #[error("linking `{name}` to `{target}` in `{object}` is not implemented: only `self` links are supported")]
    UnsupportedLink {
        object: String,
        name: String,
        target: String,
    },

    #[error("`{target}` linked from `{object}` is not a documented function or class")]
    InvalidLinkTarget { object: String, target: String },

    #[error("`{object}` links `self` but has no enclosing class attributes")]
    NoParent { object: String },

    #[error("`{object}` links `self` for `{name}`, which is not an attribute")]
    MissingParentArg { object: String, name: String },

    // -- Graph --
    #[error("`{0}` is still being parsed: doc links form a cycle")]
    Cycle(String),

    #[error("over maximum depth of doc linking: {depth}/{limit}")]
    RecursionLimit { depth: usize, limit: usize },

    #[error("duplicate argument `{name}` introduced by a link in `{object}`")]
    DuplicateViaLink { object: String, name: String },

    // -- Contract --
    #[error("invalid argument name `{0}`: expected an identifier that is not a keyword")]
    InvalidIdentifier(String),

    #[error("constructor of `{object}` leaves arguments undocumented: {}", .names.join(", "))]
    MissingConstructorArgs { object: String, names: Vec<String> },

    #[error("`{class}` does not have method `{method}`")]
    MissingMethod { class: String, method: String },

    #[error("`{class}.{method}` is not callable")]
    NotCallable { class: String, method: String },

    #[error("`{0}` is a {1}, expected a class or a function")]
    NotParsable(String, &'static str),

    // -- Host and configuration --
    #[error("no object named `{0}`")]
    UnknownObject(String),

    #[error("invalid host manifest: {0}")]
    Manifest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
