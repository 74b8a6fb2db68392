use clap::Parser;
use metaroute::cli::{run_cli, Cli};
use metaroute::logging::init_logging;
use metaroute::runtime_config::RuntimeConfig;

fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::from_env();
    init_logging(&config)?;

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run_cli(&cli, &config, &mut stdout.lock())
}
