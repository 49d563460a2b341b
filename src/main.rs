use anyhow::Result;
use clap::Parser;
use ecoboids_lib::app::export::TelemetryRecorder;
use ecoboids_lib::app::App;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,

    /// Seed override; also makes the run deterministic
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write JSONL telemetry to this path
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Ticks between telemetry samples
    #[arg(long, default_value_t = 100)]
    sample_interval: u64,

    /// Also write every stance transition to behavior.jsonl
    #[arg(long)]
    behavior: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ecoboids_core::init_logging(&args.log_level);

    let mut config = App::load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
        config.world.deterministic = true;
    }

    let mut app = App::new(config)?;
    if args.export.is_some() {
        app = app.with_telemetry(TelemetryRecorder::new(args.sample_interval, args.behavior));
    }

    let summary = app.run(args.ticks)?;
    if let Some(path) = &args.export {
        app.save_telemetry(path)?;
    }

    println!(
        "Simulated {} ticks: {} transitions, {} births, {} deaths, {} agents remaining",
        summary.ticks,
        summary.transitions,
        summary.births,
        summary.deaths,
        summary.final_population
    );
    Ok(())
}
