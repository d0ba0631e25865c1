//! Parser configuration and the configured entry point.

use crate::error::{Error, Result};
use crate::host::Host;
use crate::model::Token;
use crate::parser::{DocstringParser, DEFAULT_RECURSION_LIMIT};
use crate::resolve::Namespace;
use docstr_syntax::Style;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Everything [`parse_config`] needs besides the host.
///
/// ```yaml
/// style: numpy
/// main: app.Trainer
/// whitelist: [app.Optimizer]
/// methods: [fit]
/// recursion_limit: 50
/// imports:
///   np: numeric.core
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    #[serde(deserialize_with = "deserialize_style")]
    pub style: Style,
    /// Fully-qualified name of the entry object.
    pub main: Option<String>,
    pub whitelist: Vec<String>,
    /// Methods of `main` to parse along with it.
    pub methods: Vec<String>,
    pub recursion_limit: usize,
    /// `alias -> dotted.path`, the fallback namespace for resolving names.
    pub imports: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            style: Style::default(),
            main: None,
            whitelist: Vec::new(),
            methods: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            imports: BTreeMap::new(),
        }
    }
}

fn deserialize_style<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Style, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

impl ParserConfig {
    /// Parse a YAML (or JSON) config document.
    pub fn from_yaml_str(text: &str) -> Result<ParserConfig> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<ParserConfig> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// A parser over `host` set up from this config.
    pub fn parser<'h>(&self, host: &'h Host) -> Result<DocstringParser<'h>> {
        let namespace = Namespace::from_imports(host, &self.imports)?;
        Ok(DocstringParser::new(host)
            .style(self.style)
            .whitelist(self.whitelist.iter().cloned())
            .recursion_limit(self.recursion_limit)
            .namespace(namespace))
    }
}

/// Parse the configured entry object of `host`.
pub fn parse_config(config: &ParserConfig, host: &Host) -> Result<Token> {
    let main = config
        .main
        .as_deref()
        .ok_or_else(|| Error::Config("no entry object: set `main`".to_string()))?;
    let object = host
        .lookup(main)
        .ok_or_else(|| Error::UnknownObject(main.to_string()))?;
    info!(main, style = %config.style, "parsing entry object");
    config.parser(host)?.parse_with_methods(&object, &config.methods)
}
