//! Token tree produced by the parser.

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::host::{Class, Function};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Whether `name` is a bare identifier that is not a reserved word.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    };
    valid && !KEYWORDS.contains(&name)
}

/// A default value, or its absence.
///
/// `Required` is distinct from `Given(Entity::Value(Value::None))`: the
/// first means the argument has no default at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Required,
    Given(Entity),
}

impl DefaultValue {
    pub fn is_required(&self) -> bool {
        matches!(self, DefaultValue::Required)
    }

    pub fn given(&self) -> Option<&Entity> {
        match self {
            DefaultValue::Required => None,
            DefaultValue::Given(entity) => Some(entity),
        }
    }
}

impl Serialize for DefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DefaultValue::Required => serializer.serialize_none(),
            DefaultValue::Given(entity) => serializer.serialize_some(entity),
        }
    }
}

/// Name, type and description of a documented item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaseDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A documented argument or attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "DefaultValue::is_required")]
    pub default: DefaultValue,
}

impl ArgDoc {
    pub fn new(name: &str, ty: Entity) -> Result<ArgDoc> {
        if !is_identifier(name) {
            return Err(Error::InvalidIdentifier(name.to_string()));
        }
        Ok(ArgDoc {
            name: name.to_string(),
            ty,
            description: None,
            default: DefaultValue::Required,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_required()
    }
}

/// Arguments in document order, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgMap {
    args: Vec<ArgDoc>,
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ArgDoc> {
        self.args.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArgDoc> {
        self.args.iter_mut().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append `arg`; hands it back if the name is taken.
    pub fn insert(&mut self, arg: ArgDoc) -> std::result::Result<(), ArgDoc> {
        if self.contains(&arg.name) {
            return Err(arg);
        }
        self.args.push(arg);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgDoc> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<'a> IntoIterator for &'a ArgMap {
    type Item = &'a ArgDoc;
    type IntoIter = std::slice::Iter<'a, ArgDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl IntoIterator for ArgMap {
    type Item = ArgDoc;
    type IntoIter = std::vec::IntoIter<ArgDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

impl Serialize for ArgMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.args.len()))?;
        for arg in &self.args {
            map.serialize_entry(&arg.name, arg)?;
        }
        map.end()
    }
}

/// A field or titled section kept verbatim, e.g. `Raises` or `Notes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherSection {
    pub name: String,
    pub body: String,
}

fn first_line(description: &Option<String>) -> Option<&str> {
    description.as_deref().and_then(|d| d.lines().next())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDocstring {
    #[serde(rename = "type")]
    pub function: Rc<Function>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub args: ArgMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<BaseDoc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_sections: Vec<OtherSection>,
}

impl FuncDocstring {
    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn qualified_name(&self) -> String {
        self.function.full_name()
    }

    pub fn short_description(&self) -> Option<&str> {
        first_line(&self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDocstring {
    #[serde(rename = "type")]
    pub class: Rc<Class>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attributes: ArgMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<FuncDocstring>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<BTreeMap<String, FuncDocstring>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_sections: Vec<OtherSection>,
}

impl ClassDocstring {
    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn qualified_name(&self) -> String {
        self.class.full_name()
    }

    pub fn short_description(&self) -> Option<&str> {
        first_line(&self.description)
    }

    /// The arguments a generator should offer for building an instance:
    /// the constructor's, or the attributes when there is no parsed one.
    pub fn constructor_args(&self) -> &ArgMap {
        match &self.init {
            Some(init) => &init.args,
            None => &self.attributes,
        }
    }
}

/// A parsed docstring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Function(FuncDocstring),
    Class(ClassDocstring),
}

impl Token {
    pub fn name(&self) -> &str {
        match self {
            Token::Function(f) => f.name(),
            Token::Class(c) => c.name(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match self {
            Token::Function(f) => f.qualified_name(),
            Token::Class(c) => c.qualified_name(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Token::Function(f) => f.description.as_deref(),
            Token::Class(c) => c.description.as_deref(),
        }
    }

    pub fn as_function(&self) -> Option<&FuncDocstring> {
        match self {
            Token::Function(f) => Some(f),
            Token::Class(_) => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassDocstring> {
        match self {
            Token::Class(c) => Some(c),
            Token::Function(_) => None,
        }
    }
}
