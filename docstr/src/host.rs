//! The host object system: modules, classes and functions with their
//! docstrings.
//!
//! Hosts are plain data, built in code with [`HostBuilder`] or loaded from a
//! YAML/JSON manifest with [`Host::from_yaml_str`].

use crate::entity::Builtin;
use crate::error::{Error, Result};
use crate::literal;
use crate::value::Value;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::rc::Rc;

// -- Objects ------------------------------------------------------------------

/// A function or method.
#[derive(Debug, Clone)]
pub struct Function {
    /// Dotted path of the defining module.
    pub module: String,
    /// Name within the module, e.g. `Point.__init__`.
    pub qualname: String,
    pub doc: Option<String>,
    /// Signature parameter names without `self`, when known.
    pub params: Option<Vec<String>>,
}

impl Function {
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }
}

/// A base class entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Builtin(Builtin),
    /// Fully-qualified class name.
    Class(String),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub module: String,
    pub qualname: String,
    pub doc: Option<String>,
    /// The class's own constructor. `None` means a generated default.
    pub init: Option<Rc<Function>>,
    pub members: BTreeMap<String, Object>,
    pub bases: Vec<Base>,
    /// `_fields` of a record-like class.
    pub fields: Option<Vec<String>>,
}

impl Class {
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    /// Record-like: a single fixed-size sequence base plus a field list.
    pub fn is_record_like(&self) -> bool {
        self.fields.is_some() && self.bases == [Base::Builtin(Builtin::Tuple)]
    }

    /// A member by name; `__init__` is the constructor.
    pub fn member(&self, name: &str) -> Option<Object> {
        if name == "__init__" {
            return self.init.clone().map(Object::Function);
        }
        self.members.get(name).cloned()
    }
}

// Host objects compare and serialize by identity, i.e. their full name.

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module && self.qualname == other.qualname
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module && self.qualname == other.qualname
    }
}

impl Serialize for Function {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full_name())
    }
}

impl Serialize for Class {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.full_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// A module, by dotted path.
    Module(String),
    Class(Rc<Class>),
    Function(Rc<Function>),
    Value(Value),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Module(_) => "module",
            Object::Class(_) => "class",
            Object::Function(_) => "function",
            Object::Value(_) => "value",
        }
    }

    pub fn full_name(&self) -> Option<String> {
        match self {
            Object::Module(path) => Some(path.clone()),
            Object::Class(c) => Some(c.full_name()),
            Object::Function(f) => Some(f.full_name()),
            Object::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub doc: Option<String>,
    pub members: BTreeMap<String, Object>,
}

// -- Host ---------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Host {
    modules: BTreeMap<String, Rc<Module>>,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    pub fn module(&self, path: &str) -> Option<&Rc<Module>> {
        self.modules.get(path)
    }

    /// Import a module by its exact dotted path.
    pub fn import(&self, path: &str) -> Option<Object> {
        self.modules
            .contains_key(path)
            .then(|| Object::Module(path.to_string()))
    }

    /// Attribute access on an object.
    pub fn member(&self, obj: &Object, name: &str) -> Option<Object> {
        match obj {
            Object::Module(path) => {
                if let Some(found) = self.module(path)?.members.get(name) {
                    return Some(found.clone());
                }
                // A submodule is an attribute of its package.
                self.import(&format!("{path}.{name}"))
            }
            Object::Class(class) => class.member(name),
            Object::Function(_) | Object::Value(_) => None,
        }
    }

    /// Follow `path` attribute by attribute, starting at `obj`.
    pub fn getattr_path<'a>(
        &self,
        obj: Object,
        path: impl IntoIterator<Item = &'a str>,
    ) -> Option<Object> {
        path.into_iter()
            .try_fold(obj, |current, name| self.member(&current, name))
    }

    /// Resolve a dotted path: strip trailing segments until the prefix
    /// imports as a module, then attribute-access the remainder.
    pub fn lookup(&self, dotted: &str) -> Option<Object> {
        let parts: Vec<&str> = dotted.split('.').collect();
        (1..=parts.len()).rev().find_map(|split| {
            let module = self.import(&parts[..split].join("."))?;
            self.getattr_path(module, parts[split..].iter().copied())
        })
    }

    /// Load a host from a YAML (or JSON) manifest.
    pub fn from_yaml_str(text: &str) -> Result<Host> {
        let manifest: Manifest = serde_yaml::from_str(text)?;
        manifest.into_host()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

// -- Builder ------------------------------------------------------------------

/// Builds a [`Host`] in code.
///
/// ```
/// use docstr::host::{Host, Object};
///
/// let host = Host::builder()
///     .module("shapes", |m| {
///         m.function("area", ":param w: Width.\n:type w: float")
///             .class("Rect", |c| c.doc(".. attribute:: w\n   :type: float"))
///     })
///     .build();
/// assert!(matches!(host.lookup("shapes.Rect"), Some(Object::Class(_))));
/// ```
#[derive(Debug, Default)]
pub struct HostBuilder {
    modules: BTreeMap<String, Rc<Module>>,
}

impl HostBuilder {
    pub fn module(mut self, path: &str, build: impl FnOnce(ModuleBuilder) -> ModuleBuilder) -> Self {
        let built = build(ModuleBuilder::new(path));
        self.modules.insert(path.to_string(), Rc::new(built.module));
        self
    }

    pub fn build(self) -> Host {
        Host {
            modules: self.modules,
        }
    }
}

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    fn new(path: &str) -> Self {
        ModuleBuilder {
            module: Module {
                name: path.to_string(),
                ..Module::default()
            },
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.module.doc = Some(doc.to_string());
        self
    }

    /// A documented function with an unknown signature.
    pub fn function(self, name: &str, doc: &str) -> Self {
        self.function_with(name, Some(doc), None)
    }

    /// A function with optional doc and an optional known signature.
    pub fn function_with(mut self, name: &str, doc: Option<&str>, params: Option<&[&str]>) -> Self {
        let func = new_function(&self.module.name, name, doc, params);
        self.module
            .members
            .insert(name.to_string(), Object::Function(Rc::new(func)));
        self
    }

    pub fn class(mut self, name: &str, build: impl FnOnce(ClassBuilder) -> ClassBuilder) -> Self {
        let class = build(ClassBuilder::new(&self.module.name, name)).class;
        self.module
            .members
            .insert(name.to_string(), Object::Class(Rc::new(class)));
        self
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.module.members.insert(name.to_string(), Object::Value(value));
        self
    }

    /// Bind `name` to another module, like `import numpy as np`.
    pub fn module_alias(mut self, name: &str, path: &str) -> Self {
        self.module
            .members
            .insert(name.to_string(), Object::Module(path.to_string()));
        self
    }

    /// Bind `name` to an object defined elsewhere.
    pub fn object(mut self, name: &str, object: Object) -> Self {
        self.module.members.insert(name.to_string(), object);
        self
    }
}

pub struct ClassBuilder {
    class: Class,
}

impl ClassBuilder {
    fn new(module: &str, qualname: &str) -> Self {
        ClassBuilder {
            class: Class {
                module: module.to_string(),
                qualname: qualname.to_string(),
                doc: None,
                init: None,
                members: BTreeMap::new(),
                bases: Vec::new(),
                fields: None,
            },
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.class.doc = Some(doc.to_string());
        self
    }

    /// The class's own constructor. `doc` of `None` means undocumented.
    pub fn init(mut self, doc: Option<&str>, params: &[&str]) -> Self {
        let qualname = format!("{}.__init__", self.class.qualname);
        self.class.init = Some(Rc::new(new_function(
            &self.class.module,
            &qualname,
            doc,
            Some(params),
        )));
        self
    }

    pub fn method(self, name: &str, doc: &str) -> Self {
        self.method_with(name, Some(doc), None)
    }

    pub fn method_with(mut self, name: &str, doc: Option<&str>, params: Option<&[&str]>) -> Self {
        let qualname = format!("{}.{name}", self.class.qualname);
        let func = new_function(&self.class.module, &qualname, doc, params);
        self.class
            .members
            .insert(name.to_string(), Object::Function(Rc::new(func)));
        self
    }

    /// A nested class.
    pub fn class(mut self, name: &str, build: impl FnOnce(ClassBuilder) -> ClassBuilder) -> Self {
        let qualname = format!("{}.{name}", self.class.qualname);
        let class = build(ClassBuilder::new(&self.class.module, &qualname)).class;
        self.class
            .members
            .insert(name.to_string(), Object::Class(Rc::new(class)));
        self
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.class.members.insert(name.to_string(), Object::Value(value));
        self
    }

    pub fn base(mut self, base: Base) -> Self {
        self.class.bases.push(base);
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.class.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

fn new_function(module: &str, qualname: &str, doc: Option<&str>, params: Option<&[&str]>) -> Function {
    Function {
        module: module.to_string(),
        qualname: qualname.to_string(),
        doc: doc.map(str::to_string),
        params: params.map(|ps| ps.iter().map(|p| p.to_string()).collect()),
    }
}

// -- Manifest -----------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    modules: Vec<ModuleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleSpec {
    name: String,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    members: Vec<MemberSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MemberSpec {
    Function {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        #[serde(default)]
        params: Option<Vec<String>>,
    },
    Class(ClassSpec),
    /// Literal source text, e.g. `"3"` or `"'foo'"`.
    Value { name: String, value: String },
    Module { name: String, path: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassSpec {
    name: String,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    init: Option<InitSpec>,
    #[serde(default)]
    members: Vec<MemberSpec>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InitSpec {
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    params: Vec<String>,
}

impl Manifest {
    fn into_host(self) -> Result<Host> {
        let mut modules = BTreeMap::new();
        for spec in self.modules {
            let mut members = BTreeMap::new();
            for member in spec.members {
                let (name, object) = member.build(&spec.name, None)?;
                members.insert(name, object);
            }
            let module = Module {
                name: spec.name.clone(),
                doc: spec.doc,
                members,
            };
            if modules.insert(spec.name.clone(), Rc::new(module)).is_some() {
                return Err(Error::Manifest(format!("duplicate module `{}`", spec.name)));
            }
        }
        Ok(Host { modules })
    }
}

impl MemberSpec {
    /// Build the object, `owner` being the qualname of an enclosing class.
    fn build(self, module: &str, owner: Option<&str>) -> Result<(String, Object)> {
        let qualify = |name: &str| match owner {
            Some(owner) => format!("{owner}.{name}"),
            None => name.to_string(),
        };
        Ok(match self {
            MemberSpec::Function { name, doc, params } => {
                let func = Function {
                    module: module.to_string(),
                    qualname: qualify(&name),
                    doc,
                    params,
                };
                (name, Object::Function(Rc::new(func)))
            }
            MemberSpec::Class(spec) => {
                let qualname = qualify(&spec.name);
                let init = spec.init.map(|init| {
                    Rc::new(Function {
                        module: module.to_string(),
                        qualname: format!("{qualname}.__init__"),
                        doc: init.doc,
                        params: Some(init.params),
                    })
                });
                let mut members = BTreeMap::new();
                for member in spec.members {
                    let (name, object) = member.build(module, Some(&qualname))?;
                    members.insert(name, object);
                }
                let bases = spec
                    .bases
                    .iter()
                    .map(|b| match b.parse::<Builtin>() {
                        Ok(builtin) => Base::Builtin(builtin),
                        Err(()) => Base::Class(b.clone()),
                    })
                    .collect();
                let class = Class {
                    module: module.to_string(),
                    qualname,
                    doc: spec.doc,
                    init,
                    members,
                    bases,
                    fields: spec.fields,
                };
                (spec.name, Object::Class(Rc::new(class)))
            }
            MemberSpec::Value { name, value } => {
                let parsed = literal::parse(&value).map_err(|e| {
                    Error::Manifest(format!("value `{name}` in `{module}`: {e}"))
                })?;
                (name, Object::Value(parsed))
            }
            MemberSpec::Module { name, path } => (name, Object::Module(path)),
        })
    }
}
