//! docstr: parse the docstrings of a described host into a JSON token tree.
//!
//! The host (modules, classes, functions and their docstrings) is read from
//! a YAML or JSON manifest:
//!
//! - `docstr --host app.yaml app.Trainer`
//! - `docstr --host app.yaml -c docstr.yaml -s numpy -o token.json`

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use docstr::host::Host;
use docstr::{parse_config, ParserConfig, Style};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docstr",
    version,
    about = "Parse docstrings into typed token trees"
)]
struct Cli {
    /// Fully-qualified name of the object to parse. Overrides `main` from
    /// the config file.
    object: Option<String>,

    /// Host manifest (YAML or JSON). Use `-` to read stdin.
    #[arg(long = "host", value_name = "MANIFEST")]
    host: PathBuf,

    /// Parser config file (YAML or JSON)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Docstring style: rst (default), numpy, google
    #[arg(short = 's', long)]
    style: Option<Style>,

    /// Class or function to expand when used as a type. Can be given
    /// multiple times.
    #[arg(short = 'w', long = "whitelist", value_name = "NAME")]
    whitelist: Vec<String>,

    /// Method of the entry class to parse. Can be given multiple times.
    #[arg(short = 'm', long = "method", value_name = "NAME")]
    methods: Vec<String>,

    /// Maximum depth of doc linking
    #[arg(long)]
    recursion_limit: Option<usize>,

    /// Write the token tree here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,

    /// More logging on stderr (-v debug, -vv trace). `RUST_LOG` wins.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let host = load_host(&cli)?;
    let config = merged_config(&cli)?;
    let token = parse_config(&config, &host)
        .with_context(|| format!("failed to parse {}", config.main.as_deref().unwrap_or("?")))?;

    let mut json = if cli.compact {
        serde_json::to_string(&token)
    } else {
        serde_json::to_string_pretty(&token)
    }
    .context("failed to serialize token tree")?;
    json.push('\n');

    match &cli.output {
        Some(path) => fs::write(path, &json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{json}"),
    }
    Ok(())
}

fn load_host(cli: &Cli) -> Result<Host> {
    let text = if cli.host.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        input
    } else {
        fs::read_to_string(&cli.host)
            .with_context(|| format!("failed to read {}", cli.host.display()))?
    };
    Host::from_yaml_str(&text)
        .with_context(|| format!("invalid host manifest {}", cli.host.display()))
}

/// The config file, if any, with command-line flags applied on top.
fn merged_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ParserConfig::default(),
    };
    if let Some(object) = &cli.object {
        config.main = Some(object.clone());
    }
    if let Some(style) = cli.style {
        config.style = style;
    }
    if let Some(limit) = cli.recursion_limit {
        config.recursion_limit = limit;
    }
    config.whitelist.extend(cli.whitelist.iter().cloned());
    if !cli.methods.is_empty() {
        config.methods = cli.methods.clone();
    }
    if config.main.is_none() {
        anyhow::bail!("no object to parse: pass OBJECT or set `main` in the config");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("docstr").chain(args.iter().copied()))
    }

    #[test]
    fn flags_without_config() {
        let config = merged_config(&cli(&[
            "--host", "h.yaml", "app.run", "-s", "numpy", "-w", "app.A", "-w", "app.B",
        ]))
        .unwrap();
        assert_eq!(config.main.as_deref(), Some("app.run"));
        assert_eq!(config.style, Style::Numpy);
        assert_eq!(config.whitelist, vec!["app.A", "app.B"]);
    }

    #[test]
    fn object_is_required_somewhere() {
        assert!(merged_config(&cli(&["--host", "h.yaml"])).is_err());
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(Cli::try_parse_from(["docstr", "--host", "h.yaml", "-s", "epytext"]).is_err());
    }
}
