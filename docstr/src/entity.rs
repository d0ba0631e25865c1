//! What a type or default token resolves to.

use crate::host::{Class, Function};
use crate::model::Token;
use crate::value::Value;
use serde::{Serialize, Serializer};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// The built-in types a token may name directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Int,
    Float,
    Str,
    Bool,
    Bytes,
    Complex,
    List,
    Tuple,
    Dict,
    Set,
    FrozenSet,
    Object,
    Type,
}

impl Builtin {
    pub const ALL: [Builtin; 13] = [
        Builtin::Int,
        Builtin::Float,
        Builtin::Str,
        Builtin::Bool,
        Builtin::Bytes,
        Builtin::Complex,
        Builtin::List,
        Builtin::Tuple,
        Builtin::Dict,
        Builtin::Set,
        Builtin::FrozenSet,
        Builtin::Object,
        Builtin::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Str => "str",
            Builtin::Bool => "bool",
            Builtin::Bytes => "bytes",
            Builtin::Complex => "complex",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Dict => "dict",
            Builtin::Set => "set",
            Builtin::FrozenSet => "frozenset",
            Builtin::Object => "object",
            Builtin::Type => "type",
        }
    }

    /// Whether `value` is an instance of this type. `bool` counts as `int`,
    /// and everything is an `object`.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Builtin::Object, _)
                | (Builtin::Int, Value::Int(_) | Value::Bool(_))
                | (Builtin::Float, Value::Float(_))
                | (Builtin::Str, Value::Str(_))
                | (Builtin::Bool, Value::Bool(_))
                | (Builtin::Bytes, Value::Bytes(_))
                | (Builtin::List, Value::List(_))
                | (Builtin::Tuple, Value::Tuple(_))
                | (Builtin::Dict, Value::Dict(_))
                | (Builtin::Set | Builtin::FrozenSet, Value::Set(_))
        )
    }
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Builtin::ALL.into_iter().find(|b| b.name() == s).ok_or(())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Builtin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A resolved token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Builtin(Builtin),
    Value(Value),
    Function(Rc<Function>),
    Class(Rc<Class>),
    /// A module, by dotted path.
    Module(String),
    Multi(MultiType),
    /// A whitelisted class or function, expanded into its own token.
    Parsed(Box<Token>),
}

impl Entity {
    /// Fully-qualified name of a class or function entity, expanded or not.
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Entity::Function(f) => Some(f.full_name()),
            Entity::Class(c) => Some(c.full_name()),
            Entity::Parsed(token) => Some(token.qualified_name()),
            _ => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Builtin(b) => write!(f, "{b}"),
            Entity::Value(v) => write!(f, "{v}"),
            Entity::Function(func) => f.write_str(&func.full_name()),
            Entity::Class(class) => f.write_str(&class.full_name()),
            Entity::Module(path) => f.write_str(path),
            Entity::Multi(multi) => write!(f, "{multi}"),
            Entity::Parsed(token) => f.write_str(&token.qualified_name()),
        }
    }
}

/// An ordered, de-duplicated union of types and literals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MultiType {
    members: Vec<Entity>,
}

impl MultiType {
    pub fn new(members: impl IntoIterator<Item = Entity>) -> Self {
        let mut out: Vec<Entity> = Vec::new();
        for member in members {
            if !out.contains(&member) {
                out.push(member);
            }
        }
        MultiType { members: out }
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for MultiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}
