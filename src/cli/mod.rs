//! # CLI Module
//!
//! Operator tooling over a serialized metadata model, shipped as the
//! `metaroute-doc` binary.
//!
//! ## Commands
//!
//! ### `doc`
//!
//! Print the synthesized OpenAPI document:
//!
//! ```bash
//! metaroute-doc doc --model model.yaml --format json --title "SMS API"
//! ```
//!
//! Options:
//! - `--model <FILE>` - serialized metadata model, YAML or JSON (required)
//! - `--format <yaml|json>` - output format (default: yaml)
//! - `--title`, `--version` - override `METAROUTE_DOC_TITLE` / `METAROUTE_DOC_VERSION`
//!
//! ### `routes`
//!
//! Print the compiled route table, one `VERB /path -> method` per line:
//!
//! ```bash
//! metaroute-doc routes --model model.yaml
//! ```
//!
//! Both commands only plan routes; no method adapters are needed.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands, OutputFormat};
