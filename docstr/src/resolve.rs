//! Token resolution: free text to a concrete [`Entity`].
//!
//! Strategies run in a fixed order and the first that matches wins:
//! built-ins, the defining module, the fallback namespace, literals, then
//! dotted import paths. Each strategy either resolves or declines.

use crate::entity::{Builtin, Entity};
use crate::error::{Error, Result};
use crate::host::{Host, Object};
use crate::literal;
use crate::value::Value;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

static RE_DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

/// Names bound outside any module, consulted after the defining module.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    bindings: BTreeMap<String, Object>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, object: Object) {
        self.bindings.insert(name.into(), object);
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.bindings.get(name)
    }

    /// Bind every `alias -> dotted.path` pair by looking the path up in
    /// `host`, like `import dotted.path as alias`.
    pub fn from_imports(host: &Host, imports: &BTreeMap<String, String>) -> Result<Namespace> {
        let mut namespace = Namespace::new();
        for (alias, path) in imports {
            let object = host.lookup(path).ok_or_else(|| Error::Unresolved {
                token: path.clone(),
                context: format!("import of `{alias}`"),
            })?;
            namespace.insert(alias.clone(), object);
        }
        Ok(namespace)
    }
}

/// Where a token appears.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Dotted path of the defining module.
    pub module: &'a str,
    /// Fully-qualified name of the documented object, for errors.
    pub object: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Builtin,
    Module,
    Namespace,
    Literal,
    Import,
}

impl Strategy {
    const ORDER: [Strategy; 5] = [
        Strategy::Builtin,
        Strategy::Module,
        Strategy::Namespace,
        Strategy::Literal,
        Strategy::Import,
    ];

    fn name(self) -> &'static str {
        match self {
            Strategy::Builtin => "builtin",
            Strategy::Module => "module",
            Strategy::Namespace => "namespace",
            Strategy::Literal => "literal",
            Strategy::Import => "import",
        }
    }
}

pub struct Resolver<'h> {
    host: &'h Host,
    namespace: Namespace,
}

impl<'h> Resolver<'h> {
    pub fn new(host: &'h Host, namespace: Namespace) -> Self {
        Resolver { host, namespace }
    }

    pub fn host(&self) -> &'h Host {
        self.host
    }

    /// Resolve `token` or fail naming the token and its context.
    pub fn resolve(&self, ctx: Context<'_>, token: &str) -> Result<Entity> {
        let token = token.trim();
        for strategy in Strategy::ORDER {
            if let Some(entity) = self.apply(strategy, ctx, token) {
                trace!(token, strategy = strategy.name(), object = ctx.object, "resolved token");
                return Ok(entity);
            }
        }
        Err(Error::Unresolved {
            token: token.to_string(),
            context: ctx.object.to_string(),
        })
    }

    fn apply(&self, strategy: Strategy, ctx: Context<'_>, token: &str) -> Option<Entity> {
        let dotted = RE_DOTTED.is_match(token);
        match strategy {
            Strategy::Builtin => builtin(token),
            Strategy::Module if dotted => {
                let (first, rest) = split_first(token);
                let object = self.host.module(ctx.module)?.members.get(first)?.clone();
                self.host.getattr_path(object, rest).map(into_entity)
            }
            Strategy::Namespace if dotted => {
                let (first, rest) = split_first(token);
                let object = self.namespace.get(first)?.clone();
                self.host.getattr_path(object, rest).map(into_entity)
            }
            Strategy::Literal => literal::parse(token).ok().map(Entity::Value),
            Strategy::Import if dotted => self.host.lookup(token).map(into_entity),
            Strategy::Module | Strategy::Namespace | Strategy::Import => None,
        }
    }
}

fn builtin(token: &str) -> Option<Entity> {
    match token {
        "None" => Some(Entity::Value(Value::None)),
        "True" => Some(Entity::Value(Value::Bool(true))),
        "False" => Some(Entity::Value(Value::Bool(false))),
        "Ellipsis" => Some(Entity::Value(Value::Ellipsis)),
        _ => token.parse::<Builtin>().ok().map(Entity::Builtin),
    }
}

fn split_first(token: &str) -> (&str, std::str::Split<'_, char>) {
    let mut parts = token.split('.');
    let first = parts.next().unwrap_or(token);
    (first, parts)
}

pub(crate) fn into_entity(object: Object) -> Entity {
    match object {
        Object::Module(path) => Entity::Module(path),
        Object::Class(class) => Entity::Class(class),
        Object::Function(func) => Entity::Function(func),
        Object::Value(value) => Entity::Value(value),
    }
}
