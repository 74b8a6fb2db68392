use crate::compiler::plan_model;
use crate::model::load_model;
use crate::openapi::{build_document, Info};
use crate::runtime_config::{RuntimeConfig, ENV_DOC_TITLE, ENV_DOC_VERSION};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Command-line interface for metaroute
#[derive(Debug, Parser)]
#[command(name = "metaroute-doc")]
#[command(about = "Route tables and OpenAPI documents from controller metadata", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the OpenAPI document of all controllers in a model
    Doc {
        /// Serialized metadata model (YAML or JSON)
        #[arg(short, long)]
        model: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Document title, "API" when unset
        #[arg(long, env = ENV_DOC_TITLE)]
        title: Option<String>,

        /// Document version, "1.0.0" when unset
        #[arg(long, env = ENV_DOC_VERSION)]
        version: Option<String>,
    },
    /// Print the compiled route table
    Routes {
        /// Serialized metadata model (YAML or JSON)
        #[arg(short, long)]
        model: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Execute a parsed command, writing its output to `out`.
pub fn run_cli(cli: &Cli, config: &RuntimeConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Doc {
            model,
            format,
            title,
            version,
        } => {
            let metadata = load_model(model)?;
            let info = Info::new(
                title.clone().unwrap_or_else(|| config.doc_title.clone()),
                version.clone().unwrap_or_else(|| config.doc_version.clone()),
            );
            let document = build_document(&metadata, info)
                .with_context(|| format!("failed to document {}", model.display()))?;
            let rendered = match format {
                OutputFormat::Yaml => document.to_yaml()?,
                OutputFormat::Json => document.to_json_pretty()? + "\n",
            };
            out.write_all(rendered.as_bytes())?;
            Ok(())
        }
        Commands::Routes { model } => {
            let metadata = load_model(model)?;
            let plans = plan_model(&metadata)
                .with_context(|| format!("failed to compile {}", model.display()))?;
            for plan in &plans {
                for route in &plan.routes {
                    writeln!(out, "{} {} -> {}", route.verb, route.path, route.method)?;
                }
            }
            Ok(())
        }
    }
}
