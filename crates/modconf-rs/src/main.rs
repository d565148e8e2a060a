//! Command-line front end for resolving module config from files.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use modconf_rs::config::{
    ConfigEngine, EngineOptions, FileSource, ValidationMode, ValidatorRegistry, read_json5,
};
use serde_json::Value;
use std::path::PathBuf;

/// Command-line options for the modconf tool.
#[derive(Parser)]
#[command(name = "modconf", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved config of one module
    Resolve {
        /// Module whose config is resolved
        module: String,
        #[command(flatten)]
        sources: SourceArgs,
        /// Fail on provided keys the schema does not declare
        #[arg(long)]
        strict: bool,
    },
    /// Print the defaulted config of every declared module, unvalidated
    Devtools {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

/// Schemas and config sources shared by every subcommand.
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Schema file for a module, as MODULE=PATH (repeatable)
    #[arg(long = "schema", value_name = "MODULE=PATH", value_parser = parse_schema_arg)]
    schemas: Vec<(String, PathBuf)>,
    /// Config source file; later files win (repeatable)
    #[arg(long = "config", value_name = "PATH")]
    configs: Vec<PathBuf>,
    /// External config file, loaded once with the lowest priority
    #[arg(long, value_name = "PATH")]
    external: Option<PathBuf>,
    /// Skip the external config file entirely
    #[arg(long, conflicts_with = "external")]
    no_external: bool,
}

/// Entry point for the modconf CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    modconf_rs::init_logging();

    let cli = Cli::parse();
    let rendered = match cli.command {
        Command::Resolve {
            module,
            sources,
            strict,
        } => {
            let mode = if strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            };
            let engine = build_engine(&sources, mode)?;
            if !engine.has_schema(&module) {
                bail!("no schema was given for module {module}");
            }
            let resolution = engine
                .resolve(&module)
                .await
                .with_context(|| format!("failed to resolve config for {module}"))?;
            info!(
                "resolved config (module={module}, diagnostics={})",
                resolution.diagnostics.len()
            );
            Value::Object(resolution.config)
        }
        Command::Devtools { sources } => {
            let engine = build_engine(&sources, ValidationMode::Lenient)?;
            let configs = engine
                .get_devtools_config()
                .await
                .context("failed to collect module configs")?;
            Value::Object(configs)
        }
    };
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

/// Declare every schema and provide every config file on a fresh engine.
fn build_engine(args: &SourceArgs, mode: ValidationMode) -> anyhow::Result<ConfigEngine> {
    let mut options = EngineOptions::new().with_validation_mode(mode);
    if !args.no_external {
        let source = match args.external.as_ref() {
            Some(path) => Some(FileSource::new(path)),
            None => FileSource::default_location(),
        };
        if let Some(source) = source {
            info!("using external config (path={})", source.path().display());
            options = options.with_external_source(source);
        }
    }
    let engine = ConfigEngine::with_options(options);

    let validators = ValidatorRegistry::builtin();
    for (module, path) in &args.schemas {
        info!(
            "loading schema (module={module}, path={})",
            path.display()
        );
        let value = read_json5(path)
            .with_context(|| format!("failed to load schema from {}", path.display()))?;
        let diagnostics = engine.define_schema_value(module.clone(), &value, &validators);
        if !diagnostics.is_empty() {
            warn!(
                "schema has malformed entries (module={module}, count={})",
                diagnostics.len()
            );
        }
    }
    for path in &args.configs {
        info!("providing config (path={})", path.display());
        engine
            .provide_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
    }
    Ok(engine)
}

fn parse_schema_arg(raw: &str) -> Result<(String, PathBuf), String> {
    let (module, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected MODULE=PATH, got '{raw}'"))?;
    let module = module.trim();
    if module.is_empty() || path.is_empty() {
        return Err(format!("expected MODULE=PATH, got '{raw}'"));
    }
    Ok((module.to_string(), PathBuf::from(path)))
}
