//! Parser orchestrator: turns host objects into token trees.
//!
//! Parsing is depth-first. Every object entered through [`DocstringParser::parse_object`]
//! is tracked in a registry keyed by fully-qualified name: an entry still in
//! progress means a link cycle, a finished entry is reused.

mod fields;
mod link;

use crate::error::{Error, Result};
use crate::host::{Class, Function, Host, Object};
use crate::model::{ArgMap, ClassDocstring, FuncDocstring, Token};
use crate::resolve::{Context, Namespace, Resolver};
use docstr_syntax::Style;
use fields::Mode;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

/// Maximum link depth unless configured otherwise.
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

enum Entry {
    InProgress,
    Done(Token),
}

pub struct DocstringParser<'h> {
    host: &'h Host,
    resolver: Resolver<'h>,
    style: Style,
    whitelist: HashSet<String>,
    recursion_limit: usize,
    registry: HashMap<String, Entry>,
}

impl<'h> DocstringParser<'h> {
    pub fn new(host: &'h Host) -> Self {
        DocstringParser {
            host,
            resolver: Resolver::new(host, Namespace::new()),
            style: Style::default(),
            whitelist: HashSet::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            registry: HashMap::new(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Fully-qualified names of classes and functions whose docstrings are
    /// parsed when they appear as types.
    pub fn whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Fallback names, consulted after the defining module of each object.
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.resolver = Resolver::new(self.host, namespace);
        self
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.whitelist.contains(name)
    }

    /// Whether `name` has been fully parsed by this parser.
    pub fn is_parsed(&self, name: &str) -> bool {
        matches!(self.registry.get(name), Some(Entry::Done(_)))
    }

    pub fn parse(&mut self, obj: &Object) -> Result<Token> {
        self.parse_object(obj, &[], 0)
    }

    /// Parse a class along with the named methods.
    pub fn parse_with_methods(&mut self, obj: &Object, methods: &[String]) -> Result<Token> {
        self.parse_object(obj, methods, 0)
    }

    pub fn parse_object(&mut self, obj: &Object, methods: &[String], depth: usize) -> Result<Token> {
        self.check_depth(depth)?;
        match obj {
            Object::Class(class) => {
                let token = self.tracked(class.full_name(), |p| {
                    p.parse_class(class, methods, depth).map(Token::Class)
                })?;
                self.add_methods(class, token, methods, depth)
            }
            Object::Function(func) => self.tracked(func.full_name(), |p| {
                p.parse_func(func, None, depth).map(Token::Function)
            }),
            Object::Module(path) => Err(Error::NotParsable(path.clone(), obj.kind())),
            Object::Value(value) => Err(Error::NotParsable(value.to_string(), obj.kind())),
        }
    }

    fn tracked(
        &mut self,
        name: String,
        parse: impl FnOnce(&mut Self) -> Result<Token>,
    ) -> Result<Token> {
        match self.registry.get(&name) {
            Some(Entry::InProgress) => return Err(Error::Cycle(name)),
            Some(Entry::Done(token)) => {
                debug!(object = %name, "reusing parsed token");
                return Ok(token.clone());
            }
            None => {}
        }
        self.registry.insert(name.clone(), Entry::InProgress);
        let token = match parse(self) {
            Ok(token) => token,
            Err(err) => {
                self.registry.remove(&name);
                return Err(err);
            }
        };
        debug!(object = %name, "parsed");
        self.registry.insert(name, Entry::Done(token.clone()));
        Ok(token)
    }

    /// A reused class token may predate a request for more methods: parse
    /// the missing ones against its attributes and store the result.
    fn add_methods(
        &mut self,
        class: &Rc<Class>,
        token: Token,
        methods: &[String],
        depth: usize,
    ) -> Result<Token> {
        let mut parsed = match token {
            Token::Class(parsed) => parsed,
            token => return Ok(token),
        };
        let missing: Vec<String> = methods
            .iter()
            .filter(|m| !parsed.methods.as_ref().is_some_and(|have| have.contains_key(*m)))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(Token::Class(parsed));
        }
        let mut added = parsed.methods.take().unwrap_or_default();
        self.parse_methods(class, &missing, &parsed.attributes, depth, &mut added)?;
        parsed.methods = Some(added);
        let token = Token::Class(parsed);
        self.registry.insert(class.full_name(), Entry::Done(token.clone()));
        Ok(token)
    }

    fn parse_methods(
        &mut self,
        class: &Class,
        methods: &[String],
        attributes: &ArgMap,
        depth: usize,
        into: &mut BTreeMap<String, FuncDocstring>,
    ) -> Result<()> {
        for method in methods {
            let func = match class.member(method) {
                Some(Object::Function(func)) => func,
                Some(_) => {
                    return Err(Error::NotCallable {
                        class: class.full_name(),
                        method: method.clone(),
                    })
                }
                None => {
                    return Err(Error::MissingMethod {
                        class: class.full_name(),
                        method: method.clone(),
                    })
                }
            };
            let token = self.parse_func(&func, Some(attributes), depth)?;
            into.insert(method.clone(), token);
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.recursion_limit {
            return Err(Error::RecursionLimit {
                depth,
                limit: self.recursion_limit,
            });
        }
        Ok(())
    }

    /// Parse a function. `parent` holds the attributes of the enclosing
    /// class, the target of `see self` links.
    pub fn parse_func(
        &mut self,
        func: &Rc<Function>,
        parent: Option<&ArgMap>,
        depth: usize,
    ) -> Result<FuncDocstring> {
        self.check_depth(depth)?;
        let name = func.full_name();
        debug!(object = %name, depth, "parsing function");

        let raw = func
            .doc
            .as_deref()
            .ok_or_else(|| Error::MissingDocstring(name.clone()))?;
        let doc = docstr_syntax::normalize(raw, self.style)?;
        let takes_nothing = func.params.as_ref().is_some_and(Vec::is_empty);
        if !doc.has_fields() && !takes_nothing {
            return Err(Error::NoFields(name));
        }

        let ctx = Context {
            module: &func.module,
            object: &name,
        };
        let collected = self.collect(&doc, ctx, Mode::Function, parent, depth)?;

        Ok(FuncDocstring {
            function: Rc::clone(func),
            description: doc.description(),
            args: collected.args,
            returns: collected.returns,
            other_sections: collected.other_sections,
        })
    }

    /// Parse a class: its attributes, its constructor and the named methods.
    pub fn parse_class(
        &mut self,
        class: &Rc<Class>,
        methods: &[String],
        depth: usize,
    ) -> Result<ClassDocstring> {
        self.check_depth(depth)?;
        let name = class.full_name();
        debug!(object = %name, depth, "parsing class");

        let raw = class
            .doc
            .as_deref()
            .ok_or_else(|| Error::MissingDocstring(name.clone()))?;
        let doc = docstr_syntax::normalize(raw, self.style)?;
        let init_takes_nothing = class
            .init
            .as_ref()
            .map_or(true, |init| init.params.as_ref().is_some_and(Vec::is_empty));
        if !doc.has_fields() && !init_takes_nothing {
            return Err(Error::NoFields(name));
        }

        let ctx = Context {
            module: &class.module,
            object: &name,
        };
        let attributes = self.collect(&doc, ctx, Mode::Attributes, None, depth)?;
        let attributes_map = attributes.args;

        let init = if class.is_record_like() {
            // The generated constructor takes the fields, documented as attributes.
            let fields = class.fields.as_deref().unwrap_or_default();
            require_documented(&name, fields, &attributes_map)?;
            None
        } else {
            match &class.init {
                None => None,
                Some(init) => {
                    if init.doc.is_none() {
                        return Err(Error::MissingDocstring(init.full_name()));
                    }
                    let parsed = self.parse_func(init, Some(&attributes_map), depth)?;
                    if let Some(params) = &init.params {
                        require_documented(&name, params, &parsed.args)?;
                    }
                    Some(parsed)
                }
            }
        };

        let methods = if methods.is_empty() {
            None
        } else {
            let mut parsed = BTreeMap::new();
            self.parse_methods(class, methods, &attributes_map, depth, &mut parsed)?;
            Some(parsed)
        };

        Ok(ClassDocstring {
            class: Rc::clone(class),
            description: doc.description(),
            attributes: attributes_map,
            init,
            methods,
            other_sections: attributes.other_sections,
        })
    }
}

/// Every plain parameter must be documented; `*args` and `**kwargs` are
/// exempt.
fn require_documented(object: &str, params: &[String], args: &ArgMap) -> Result<()> {
    let names: Vec<String> = params
        .iter()
        .filter(|p| !p.starts_with('*') && !args.contains(p))
        .cloned()
        .collect();
    if names.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingConstructorArgs {
            object: object.to_string(),
            names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Builtin, Entity};

    const POINT_DOC: &str = "A point.

        .. attribute:: x
           :type: int

           Abscissa.

        .. attribute:: y
           :type: int = 0
        ";

    fn host(init_params: &[&str]) -> Host {
        Host::builder()
            .module("geo", |m| {
                m.class("Point", |c| {
                    c.doc(POINT_DOC)
                        .init(Some("Build.\n\n:param see self:"), init_params)
                        .method("norm", "Norm.\n\n:returns: Length.\n:rtype: float")
                        .value("ORIGIN", crate::value::Value::Int(0))
                })
            })
            .build()
    }

    fn point(host: &Host) -> Object {
        host.lookup("geo.Point").unwrap()
    }

    #[test]
    fn class_with_init_and_methods() {
        let host = host(&["x", "y"]);
        let mut parser = DocstringParser::new(&host);
        let token = parser
            .parse_with_methods(&point(&host), &["norm".to_string()])
            .unwrap();
        let class = token.as_class().unwrap();

        assert_eq!(class.short_description(), Some("A point."));
        assert_eq!(class.attributes.names().collect::<Vec<_>>(), vec!["x", "y"]);
        let init = class.init.as_ref().unwrap();
        assert_eq!(init.args, class.attributes);
        let norm = &class.methods.as_ref().unwrap()["norm"];
        assert_eq!(
            norm.returns.as_ref().and_then(|r| r.ty.clone()),
            Some(Entity::Builtin(Builtin::Float))
        );
        assert!(parser.is_parsed("geo.Point"));
    }

    #[test]
    fn reused_class_gains_requested_methods() {
        let host = host(&["x", "y"]);
        let mut parser = DocstringParser::new(&host);
        let first = parser.parse(&point(&host)).unwrap();
        assert!(first.as_class().unwrap().methods.is_none());

        let token = parser
            .parse_with_methods(&point(&host), &["norm".to_string()])
            .unwrap();
        let methods = token.as_class().unwrap().methods.as_ref().unwrap();
        assert!(methods.contains_key("norm"));

        // stored for the next caller
        let again = parser.parse(&point(&host)).unwrap();
        assert!(again.as_class().unwrap().methods.as_ref().unwrap().contains_key("norm"));
    }

    #[test]
    fn failed_parse_is_not_left_in_progress() {
        let host = Host::builder()
            .module("geo", |m| {
                m.function("bad", "Bad.\n\n:param a: A.\n:type a: Missing")
                    .function("uses_bad", "Uses.\n\n:param see bad:")
            })
            .build();
        let mut parser = DocstringParser::new(&host);
        let lookup = |path: &str| host.lookup(path).unwrap();

        assert!(matches!(parser.parse(&lookup("geo.bad")), Err(Error::Unresolved { .. })));
        let err = parser.parse(&lookup("geo.uses_bad")).unwrap_err();
        assert!(matches!(err, Error::Unresolved { ref context, .. } if context == "geo.bad"));
        assert!(!parser.is_parsed("geo.bad"));
    }

    #[test]
    fn missing_and_non_callable_methods() {
        let host = host(&["x", "y"]);
        let mut parser = DocstringParser::new(&host);
        assert!(matches!(
            parser.parse_with_methods(&point(&host), &["nope".to_string()]),
            Err(Error::MissingMethod { .. })
        ));
        let mut parser = DocstringParser::new(&host);
        assert!(matches!(
            parser.parse_with_methods(&point(&host), &["ORIGIN".to_string()]),
            Err(Error::NotCallable { .. })
        ));
    }

    #[test]
    fn undocumented_constructor_argument() {
        let host = host(&["x", "y", "z", "*rest"]);
        let err = DocstringParser::new(&host).parse(&point(&host)).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingConstructorArgs { ref names, .. } if names == &["z".to_string()]
        ));
    }

    #[test]
    fn recursion_limit_is_checked_first() {
        let host = host(&["x", "y"]);
        let mut parser = DocstringParser::new(&host).recursion_limit(2);
        assert!(matches!(
            parser.parse_object(&point(&host), &[], 3),
            Err(Error::RecursionLimit { depth: 3, limit: 2 })
        ));
        // nothing was registered
        assert!(!parser.is_parsed("geo.Point"));
        assert!(parser.parse_object(&point(&host), &[], 2).is_ok());
    }

    #[test]
    fn modules_and_values_are_not_parsable() {
        let host = host(&["x", "y"]);
        let mut parser = DocstringParser::new(&host);
        assert!(matches!(
            parser.parse(&Object::Module("geo".into())),
            Err(Error::NotParsable(_, "module"))
        ));
    }
}
