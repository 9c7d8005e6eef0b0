use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use lifeline_cli::{Simulator, logging, scenario};
use lifeline_core::OverlayConfigExt;
use lifeline_types::OverlayConfig;

#[derive(Parser)]
#[command(version, about = "Replay a scenario against the overlay core in virtual time")]
struct Cli {
    /// JSON-lines scenario file
    scenario: PathBuf,

    /// Overlay configuration (TOML); defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resource name reported by the simulated host
    #[arg(long)]
    resource: Option<String>,

    /// Keep running this long after the last step
    #[arg(long, default_value_t = 0)]
    settle_ms: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => OverlayConfig::load(path).map_err(|e| e.to_string())?,
        None => OverlayConfig::default(),
    };
    let steps = scenario::load(&cli.scenario).map_err(|e| e.to_string())?;
    tracing::info!(steps = steps.len(), scenario = %cli.scenario.display(), "replaying");

    let mut simulator = Simulator::new(config, cli.resource);
    let report = simulator.run(&steps, cli.settle_ms).await;

    let output = if cli.json {
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?
    } else {
        report.render()
    };
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", output.trim_end()).map_err(|e| e.to_string())?;
    stdout.flush().map_err(|e| e.to_string())?;
    Ok(())
}
