//! Casting raw config/CLI strings with a resolved type.

use crate::entity::{Builtin, Entity, MultiType};
use crate::literal;
use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("expected `True` or `False`, got `{0}`")]
    Bool(String),

    #[error("cannot cast `{value}` to {ty}")]
    Invalid { value: String, ty: String },

    #[error("`{value}` matches none of {choices}")]
    NoMatch { value: String, choices: String },

    #[error("`{0}` has no string caster")]
    Uncastable(String),
}

/// Only the two canonical spellings are booleans. Anything else, including
/// `false` or `1`, is an error rather than a truthy string.
pub fn cast_bool(text: &str) -> Result<bool, CastError> {
    match text {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(CastError::Bool(other.to_string())),
    }
}

fn invalid(text: &str, ty: impl ToString) -> CastError {
    CastError::Invalid {
        value: text.to_string(),
        ty: ty.to_string(),
    }
}

impl Builtin {
    pub fn cast(self, text: &str) -> Result<Value, CastError> {
        match self {
            Builtin::Str | Builtin::Object => Ok(Value::Str(text.to_string())),
            Builtin::Bool => cast_bool(text).map(Value::Bool),
            Builtin::Int => text
                .trim()
                .replace('_', "")
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(text, self)),
            Builtin::Float => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid(text, self)),
            Builtin::Bytes => Ok(Value::Bytes(text.as_bytes().to_vec())),
            Builtin::Complex | Builtin::Type => Err(CastError::Uncastable(self.to_string())),
            Builtin::List | Builtin::Tuple | Builtin::Dict | Builtin::Set | Builtin::FrozenSet => {
                match literal::parse(text) {
                    Ok(value) if self.accepts(&value) => Ok(value),
                    // a list literal is accepted where a tuple or set is asked for
                    Ok(Value::List(items)) => match self {
                        Builtin::Tuple => Ok(Value::Tuple(items)),
                        Builtin::Set | Builtin::FrozenSet => Ok(Value::Set(items)),
                        _ => Err(invalid(text, self)),
                    },
                    _ => Err(invalid(text, self)),
                }
            }
        }
    }
}

impl MultiType {
    /// Cast with the first member that accepts `text`. Literal members are
    /// matched by exact spelling before any type member is tried.
    pub fn cast(&self, text: &str) -> Result<Value, CastError> {
        for member in self.members() {
            if let Entity::Value(v) = member {
                if literal_matches(v, text) {
                    return Ok(v.clone());
                }
            }
        }
        for member in self.members() {
            let attempt = match member {
                Entity::Value(_) => continue,
                other => cast(other, text),
            };
            if let Ok(value) = attempt {
                return Ok(value);
            }
        }
        Err(CastError::NoMatch {
            value: text.to_string(),
            choices: self.to_string(),
        })
    }

    /// The literal members, when every member is a literal.
    pub fn choices(&self) -> Option<Vec<&Value>> {
        self.members()
            .iter()
            .map(|m| match m {
                Entity::Value(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

fn literal_matches(value: &Value, text: &str) -> bool {
    match value {
        Value::Str(s) => s == text || value.to_string() == text,
        other => other.to_string() == text,
    }
}

/// Cast `text` with any resolved type.
pub fn cast(ty: &Entity, text: &str) -> Result<Value, CastError> {
    match ty {
        Entity::Builtin(b) => b.cast(text),
        Entity::Multi(multi) => multi.cast(text),
        Entity::Value(v) if literal_matches(v, text) => Ok(v.clone()),
        Entity::Value(v) => Err(CastError::NoMatch {
            value: text.to_string(),
            choices: v.to_string(),
        }),
        other => Err(CastError::Uncastable(other.to_string())),
    }
}
