use clap::{Parser, Subcommand};
use lux_core::{CompileOptions, Config, QueryError, Scope};
use lux_query::input::{parse_term_value, read_document};
use lux_query::Service;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "luxq", about = "Compile linked-art search terms into query trees")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/lux-query/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level to stderr (RUST_LOG overrides).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile one term against a value.
    Compile {
        scope: Scope,
        term: String,
        /// `@<json>` for a nested query, `id:<x>` to force an identifier.
        value: String,
        /// Levels to expand for a related-list term.
        #[arg(long)]
        levels: Option<u8>,
        /// Fail instead of clamping --levels to the term's bound.
        #[arg(long)]
        no_clamp: bool,
        /// Comparison for a numeric term, e.g. ">=".
        #[arg(long)]
        comp: Option<String>,
    },
    /// Compile a wire-form query document, inline or `@file`.
    Document { source: String },
    /// Build a named template for an identifier.
    Template { name: String, id: String },
    /// List template names.
    Templates,
    /// Resolve a relation key to its display label.
    Label { key: String },
    /// List the terms of a scope.
    Terms {
        scope: Scope,
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let service = Service::from_config(config)?;

    let output = run(&service, cli.command).map_err(|err| with_hint(&service, err))?;
    println!("{output}");
    Ok(())
}

/// Pretty JSON straight from `value`'s `Serialize`, so query trees keep
/// `_scope` ahead of their conditions.
fn pretty<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn run(service: &Service, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Compile {
            scope,
            term,
            value,
            levels,
            no_clamp,
            comp,
        } => {
            let compiler = service.compiler();
            let comparator = match comp.as_deref() {
                None => None,
                Some(raw) => Some(
                    lux_core::Comparator::parse(raw)
                        .ok_or_else(|| anyhow::anyhow!("unknown comparator {raw:?}"))?,
                ),
            };
            let defaults = compiler.default_options();
            let options = CompileOptions {
                related_levels: levels,
                clamp_related_levels: defaults.clamp_related_levels && !no_clamp,
                comparator,
            };
            let value = parse_term_value(&compiler, scope, &term, &value)?;
            pretty(&compiler.compile_with(scope, &term, value, &options)?)
        }
        Command::Document { source } => {
            let doc = read_document(&source)?;
            pretty(&service.compiler().compile_document(&doc)?)
        }
        Command::Template { name, id } => {
            let node = service
                .templates()
                .build(&name, &id)
                .ok_or_else(|| anyhow::anyhow!("no template named {name:?}"))?;
            pretty(&node)
        }
        Command::Templates => pretty(&service.templates().names()),
        Command::Label { key } => pretty(&serde_json::json!({
            "key": key,
            "label": service.resolver().resolve_label(&key),
        })),
        Command::Terms { scope, prefix } => {
            let schema = service.schema();
            let names = match prefix {
                Some(p) => schema.suggest(scope, &p),
                None => schema.terms(scope).map(|t| t.name.clone()).collect(),
            };
            let terms: Vec<_> = names
                .iter()
                .filter_map(|name| schema.lookup(scope, name).ok())
                .map(|def| {
                    serde_json::json!({
                        "name": def.name,
                        "pattern": def.pattern.name(),
                        "field": def.wire_field(),
                        "targetScope": def.target_scope().map(|s| s.as_str()),
                    })
                })
                .collect();
            pretty(&terms)
        }
    }
}

/// Attach close term names to an unknown-term error.
fn with_hint(service: &Service, err: anyhow::Error) -> anyhow::Error {
    let hint = match err.downcast_ref::<QueryError>() {
        Some(QueryError::UnknownTerm { scope, term }) => service.did_you_mean(*scope, term),
        _ => Vec::new(),
    };
    if hint.is_empty() {
        return err;
    }
    tracing::debug!(candidates = hint.len(), "cli: unknown term hint");
    err.context(format!("did you mean: {}?", hint.join(", ")))
}
