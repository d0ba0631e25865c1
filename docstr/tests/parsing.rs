use docstr::entity::{Builtin, Entity, MultiType};
use docstr::host::{Base, Host, Object};
use docstr::{ArgDoc, ArgMap, DocstringParser, Error, Style, Token, Value};

fn lookup(host: &Host, path: &str) -> Object {
    host.lookup(path)
        .unwrap_or_else(|| panic!("{path} is not in the host"))
}

fn parse(host: &Host, style: Style, path: &str) -> docstr::Result<Token> {
    DocstringParser::new(host).style(style).parse(&lookup(host, path))
}

fn str_value(s: &str) -> Entity {
    Entity::Value(Value::Str(s.to_string()))
}

fn names(args: &ArgMap) -> Vec<&str> {
    args.names().collect()
}

// -- Scenarios ----------------------------------------------------------------

const JOIN_PLAIN: &str = "Join two strings.

    Parameters
    ----------
    foo : str
        The first.
    bar : str
        The second.

    Returns
    -------
    str
        The joined string.
    ";

const JOIN_DEFAULTS: &str = "Join two strings.

    Parameters
    ----------
    foo : str = 'foo'
        The first.
    bar : str = 'bar'
        The second.
    ";

const JOIN_CHOICES: &str = "Join two strings.

    Parameters
    ----------
    foo : 'foo' | 'bar' = 'foo'
        The first.
    ";

fn join_host() -> Host {
    Host::builder()
        .module("join", |m| {
            m.function("plain", JOIN_PLAIN)
                .function("defaults", JOIN_DEFAULTS)
                .function("choices", JOIN_CHOICES)
        })
        .build()
}

#[test]
fn plain_types_are_required() {
    let host = join_host();
    let token = parse(&host, Style::Numpy, "join.plain").unwrap();
    let func = token.as_function().unwrap();

    let mut expected = ArgMap::new();
    for (name, desc) in [("foo", "The first."), ("bar", "The second.")] {
        let arg = ArgDoc::new(name, Entity::Builtin(Builtin::Str))
            .unwrap()
            .with_description(Some(desc.to_string()));
        expected.insert(arg).unwrap();
    }
    assert_eq!(func.args, expected);
    assert!(func.args.iter().all(ArgDoc::is_required));

    let returns = func.returns.as_ref().unwrap();
    assert_eq!(returns.ty, Some(Entity::Builtin(Builtin::Str)));
    assert_eq!(returns.description.as_deref(), Some("The joined string."));
    assert_eq!(func.short_description(), Some("Join two strings."));
}

#[test]
fn literal_defaults() {
    let host = join_host();
    let token = parse(&host, Style::Numpy, "join.defaults").unwrap();
    let args = &token.as_function().unwrap().args;
    assert_eq!(args.get("foo").unwrap().default.given(), Some(&str_value("foo")));
    assert_eq!(args.get("bar").unwrap().default.given(), Some(&str_value("bar")));
}

#[test]
fn literal_union_with_default() {
    let host = join_host();
    let token = parse(&host, Style::Numpy, "join.choices").unwrap();
    let foo = token.as_function().unwrap().args.get("foo").unwrap();
    assert_eq!(
        foo.ty,
        Entity::Multi(MultiType::new([str_value("foo"), str_value("bar")]))
    );
    assert_eq!(foo.default.given(), Some(&str_value("foo")));
}

const SETTINGS_DOC: &str = "Settings.

    Attributes
    ----------
    a : int
        First.
    b : str
        Second.
    ";

const SETTINGS_INIT: &str = "Build settings.

    Parameters
    ----------
    see self
    x : int = 8
        Extra.
    y : int = 11
        More.
    ";

fn settings_host() -> Host {
    Host::builder()
        .module("conf", |m| {
            m.class("Settings", |c| {
                c.doc(SETTINGS_DOC).init(Some(SETTINGS_INIT), &["a", "b", "x", "y"])
            })
        })
        .build()
}

#[test]
fn constructor_links_attributes_by_copy() {
    let host = settings_host();
    let token = parse(&host, Style::Numpy, "conf.Settings").unwrap();
    let class = token.as_class().unwrap();
    let init = class.init.as_ref().unwrap();

    assert_eq!(names(&init.args), vec!["a", "b", "x", "y"]);
    for name in ["a", "b"] {
        assert_eq!(init.args.get(name), class.attributes.get(name));
    }
    assert_eq!(
        init.args.get("y").unwrap().default.given(),
        Some(&Entity::Value(Value::Int(11)))
    );

}

#[test]
fn linked_constructor_arg_is_a_deep_copy() {
    let host = settings_host();
    let mut token = parse(&host, Style::Numpy, "conf.Settings").unwrap();
    let Token::Class(class) = &mut token else {
        panic!("expected a class token");
    };

    let linked = class.init.as_mut().unwrap().args.get_mut("a").unwrap();
    linked.description = Some("Changed.".into());
    linked.ty = Entity::Builtin(Builtin::Float);

    let attribute = class.attributes.get("a").unwrap();
    assert_eq!(attribute.description.as_deref(), Some("First."));
    assert_eq!(attribute.ty, Entity::Builtin(Builtin::Int));
}

#[test]
fn function_documented_entirely_by_link() {
    let host = Host::builder()
        .module("ops", |m| {
            m.function(
                "f",
                "F.\n\n:param n: Count.\n:type n: int = 1\n:param label: Name.\n:type label: str | None = None",
            )
            .function("g", "G.\n\n:param see f:")
        })
        .build();
    let mut parser = DocstringParser::new(&host);
    let g = parser.parse(&lookup(&host, "ops.g")).unwrap();
    let f = parser.parse(&lookup(&host, "ops.f")).unwrap();

    let (f, g) = (f.as_function().unwrap(), g.as_function().unwrap());
    assert_eq!(g.args, f.args);
    assert_eq!(names(&g.args), vec!["n", "label"]);
    assert_eq!(g.qualified_name(), "ops.g");
    assert_ne!(g.function, f.function);

    let label = g.args.get("label").unwrap();
    assert_eq!(label.default.given(), Some(&Entity::Value(Value::None)));
    assert!(!label.is_required());
}

// -- Field pairing and order --------------------------------------------------

#[test]
fn params_and_types_must_pair_up() {
    let host = Host::builder()
        .module("m", |m| {
            m.function("no_type", "X.\n\n:param a: A.\n:param b: B.\n:type b: int")
                .function("no_param", "X.\n\n:type a: int\n:param b: B.\n:type b: int")
                .function("paired", "X.\n\n:type a: int\n:param a: A.")
        })
        .build();
    for path in ["m.no_type", "m.no_param"] {
        let err = parse(&host, Style::Rst, path).unwrap_err();
        assert!(
            matches!(err, Error::Unmatched { ref names, .. } if names == &["a".to_string()]),
            "{path}: {err}"
        );
    }
    // either order merges
    let token = parse(&host, Style::Rst, "m.paired").unwrap();
    let a = token.as_function().unwrap().args.get("a").unwrap();
    assert_eq!(a.description.as_deref(), Some("A."));
}

#[test]
fn splice_keeps_document_order() {
    let host = Host::builder()
        .module("m", |m| {
            m.function("inner", "In.\n\n:param c: C.\n:type c: int\n:param d: D.\n:type d: int")
                .function(
                    "outer",
                    "Out.\n\n:param a: A.\n:type a: int\n:param see inner:\n:param e: E.\n:type e: int\n:type b: int\n:param b: B.",
                )
        })
        .build();
    let token = parse(&host, Style::Rst, "m.outer").unwrap();
    assert_eq!(
        names(&token.as_function().unwrap().args),
        vec!["a", "c", "d", "e", "b"]
    );
}

#[test]
fn grammar_errors() {
    let host = Host::builder()
        .module("m", |m| {
            m.function("dup_param", "X.\n\n:param a: A.\n:param a: Again.\n:type a: int")
                .function("dup_type", "X.\n\n:param a: A.\n:type a: int\n:type a: str")
                .function("ambiguous", "X.\n\n:param a b: A.\n:type a: int")
                .function("two_returns", "X.\n\n:returns: One.\n:returns: Two.")
                .function("keyword", "X.\n\n:param class: A.\n:type class: int")
                .function("unresolved", "X.\n\n:param a: A.\n:type a: Missing")
        })
        .build();
    let err = |path| parse(&host, Style::Rst, path).unwrap_err();

    assert!(matches!(err("m.dup_param"), Error::DuplicateParam { .. }));
    assert!(matches!(err("m.dup_type"), Error::DuplicateType { .. }));
    assert!(matches!(err("m.ambiguous"), Error::Syntax(_)));
    assert!(matches!(err("m.two_returns"), Error::DuplicateField { .. }));
    assert!(matches!(err("m.keyword"), Error::InvalidIdentifier(_)));
    assert_eq!(
        err("m.unresolved").to_string(),
        "cannot resolve `Missing` in the context of `m.unresolved`"
    );
}

#[test]
fn field_less_docstrings() {
    let host = Host::builder()
        .module("m", |m| {
            m.function_with("prose", Some("Only prose."), None)
                .function_with("nullary", Some("Only prose."), Some(&[]))
                .function_with("undocumented", None, Some(&[]))
                .class("Empty", |c| c.doc("Nothing to configure."))
                .class("Needy", |c| c.doc("Needs things.").init(Some("Make."), &["a"]))
        })
        .build();
    assert!(matches!(parse(&host, Style::Rst, "m.prose"), Err(Error::NoFields(_))));
    assert!(parse(&host, Style::Rst, "m.nullary").is_ok());
    assert!(matches!(
        parse(&host, Style::Rst, "m.undocumented"),
        Err(Error::MissingDocstring(_))
    ));
    let empty = parse(&host, Style::Rst, "m.Empty").unwrap();
    assert!(empty.as_class().unwrap().attributes.is_empty());
    assert!(matches!(parse(&host, Style::Rst, "m.Needy"), Err(Error::NoFields(_))));
}

// -- Graph --------------------------------------------------------------------

#[test]
fn link_cycles_are_detected() {
    let host = Host::builder()
        .module("m", |m| {
            m.function("a", "A.\n\n:param see b:")
                .function("b", "B.\n\n:param see a:")
                .class("Node", |c| {
                    c.doc("A node.\n\n.. attribute:: next\n   :type: Node | None = None\n")
                })
        })
        .build();
    let err = parse(&host, Style::Rst, "m.a").unwrap_err();
    assert!(matches!(err, Error::Cycle(ref name) if name == "m.a"), "{err}");

    let mut parser = DocstringParser::new(&host).whitelist(["m.Node"]);
    assert!(matches!(
        parser.parse(&lookup(&host, "m.Node")),
        Err(Error::Cycle(_))
    ));
}

#[test]
fn recursion_limit_bounds_link_depth() {
    let host = Host::builder()
        .module("m", |m| {
            m.function("f0", "F0.\n\n:param see f1:")
                .function("f1", "F1.\n\n:param see f2:")
                .function("f2", "F2.\n\n:param n: N.\n:type n: int")
        })
        .build();
    let f0 = lookup(&host, "m.f0");
    assert!(matches!(
        DocstringParser::new(&host).recursion_limit(1).parse(&f0),
        Err(Error::RecursionLimit { depth: 2, limit: 1 })
    ));
    let token = DocstringParser::new(&host).recursion_limit(2).parse(&f0).unwrap();
    assert_eq!(names(&token.as_function().unwrap().args), vec!["n"]);
}

#[test]
fn whitelist_controls_expansion() {
    let host = Host::builder()
        .module("app", |m| {
            m.class("Optimizer", |c| {
                c.doc("Optimizer.\n\n.. attribute:: lr\n   :type: float = 0.01\n\n   Learning rate.\n")
            })
            .function("train", "Train.\n\n:param opt: Optimizer.\n:type opt: Optimizer")
        })
        .build();
    let train = lookup(&host, "app.train");

    let plain = DocstringParser::new(&host).parse(&train).unwrap();
    let opt = plain.as_function().unwrap().args.get("opt").unwrap();
    assert!(matches!(&opt.ty, Entity::Class(c) if c.full_name() == "app.Optimizer"));

    let mut parser = DocstringParser::new(&host).whitelist(["app.Optimizer"]);
    let expanded = parser.parse(&train).unwrap();
    let opt = expanded.as_function().unwrap().args.get("opt").unwrap();
    let Entity::Parsed(token) = &opt.ty else {
        panic!("expected an expanded type, got {:?}", opt.ty);
    };
    let optimizer = token.as_class().unwrap();
    assert_eq!(names(&optimizer.attributes), vec!["lr"]);
    assert_eq!(opt.ty.qualified_name().as_deref(), Some("app.Optimizer"));
    assert!(parser.is_parsed("app.Optimizer"));
}

// -- Record-like classes ------------------------------------------------------

#[test]
fn record_like_classes_skip_the_constructor() {
    const PAIR: &str = "A pair.\n\n.. attribute:: left\n   :type: int\n\n.. attribute:: right\n   :type: int = 0\n";
    let host = Host::builder()
        .module("rec", |m| {
            m.class("Pair", |c| {
                c.doc(PAIR)
                    .base(Base::Builtin(Builtin::Tuple))
                    .fields(&["left", "right"])
                    .init(None, &["left", "right"])
            })
            // same shape without the tuple base: the constructor is parsed
            .class("LooksLikePair", |c| {
                c.doc(PAIR).fields(&["left", "right"]).init(None, &["left", "right"])
            })
            .class("Partial", |c| {
                c.doc("Half a pair.\n\n.. attribute:: left\n   :type: int\n")
                    .base(Base::Builtin(Builtin::Tuple))
                    .fields(&["left", "right"])
            })
        })
        .build();

    let pair = parse(&host, Style::Rst, "rec.Pair").unwrap();
    let pair = pair.as_class().unwrap();
    assert!(pair.init.is_none());
    assert_eq!(names(pair.constructor_args()), vec!["left", "right"]);

    assert!(matches!(
        parse(&host, Style::Rst, "rec.LooksLikePair"),
        Err(Error::MissingDocstring(ref name)) if name == "rec.LooksLikePair.__init__"
    ));
    assert!(matches!(
        parse(&host, Style::Rst, "rec.Partial"),
        Err(Error::MissingConstructorArgs { .. })
    ));
}

// -- Dialects -----------------------------------------------------------------

#[test]
fn google_and_numpy_parse_alike() {
    const GOOGLE: &str = "Join two strings.

        Args:
            foo (str): The first.
            bar (str): The second.

        Returns:
            str: The joined string.
        ";
    let host = Host::builder()
        .module("join", |m| {
            m.function("numpy", JOIN_PLAIN).function("google", GOOGLE)
        })
        .build();
    let numpy = parse(&host, Style::Numpy, "join.numpy").unwrap();
    let google = parse(&host, Style::Google, "join.google").unwrap();
    let (numpy, google) = (numpy.as_function().unwrap(), google.as_function().unwrap());
    assert_eq!(numpy.args, google.args);
    assert_eq!(numpy.returns, google.returns);
    assert_eq!(numpy.description, google.description);
}

#[test]
fn other_sections_are_kept_in_order() {
    const DOC: &str = "Run.

        Parameters
        ----------
        n : int
            Count.

        Raises
        ------
        ValueError
            When negative.

        Notes
        -----
        Runs twice.
        ";
    let host = Host::builder().module("m", |m| m.function("run", DOC)).build();
    let token = parse(&host, Style::Numpy, "m.run").unwrap();
    let sections: Vec<&str> = token
        .as_function()
        .unwrap()
        .other_sections
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(sections, vec!["raises ValueError", "Notes"]);
}

#[test]
fn token_tree_serializes_to_json() {
    let host = join_host();
    let token = parse(&host, Style::Numpy, "join.choices").unwrap();
    let json = serde_json::to_value(&token).unwrap();
    assert_eq!(json["kind"], "function");
    assert_eq!(json["type"], "join.choices");
    assert_eq!(
        json["args"]["foo"]["type"],
        serde_json::json!({ "multi": [{ "value": "foo" }, { "value": "bar" }] })
    );
}
