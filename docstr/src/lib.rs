//! docstr: parse docstrings into typed token trees.
//!
//! A [`DocstringParser`] walks classes and functions of a [`host::Host`],
//! reads their reST, numpy or google docstrings and produces a [`Token`]:
//! documented arguments with resolved types and defaults, ready for a
//! config or CLI generator to consume.
//!
//! ```
//! use docstr::{DocstringParser, host::Host};
//!
//! let host = Host::builder()
//!     .module("app", |m| {
//!         m.function("run", "Run it.\n\n:param jobs: Workers.\n:type jobs: int = 4")
//!     })
//!     .build();
//! let run = host.lookup("app.run").unwrap();
//! let token = DocstringParser::new(&host).parse(&run).unwrap();
//! assert_eq!(token.description(), Some("Run it."));
//! ```

pub mod cast;
pub mod config;
pub mod entity;
pub mod error;
pub mod host;
pub mod literal;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod value;

pub use config::{parse_config, ParserConfig};
pub use docstr_syntax::Style;
pub use entity::{Builtin, Entity, MultiType};
pub use error::{Error, Result};
pub use model::{ArgDoc, ArgMap, ClassDocstring, DefaultValue, FuncDocstring, Token};
pub use parser::{DocstringParser, DEFAULT_RECURSION_LIMIT};
pub use value::Value;
