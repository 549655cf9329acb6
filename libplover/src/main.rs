use anyhow::{Context, Result};
use clap::Parser;
use libplover::replay::{parse_script, run_script};
use libplover::{create_engine, PloverConfig, RecordingHost};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay a key event script through a steno engine and print every host call.
#[derive(Parser)]
#[command(name = "plover-replay", version)]
struct Cli {
    /// Script file; reads stdin when omitted
    script: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra JSON dictionary, lower priority than configured ones (repeatable)
    #[arg(short, long = "dictionary")]
    dictionaries: Vec<PathBuf>,

    /// Show the pending stroke in the preedit
    #[arg(long)]
    show_strokes: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PloverConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PloverConfig::default(),
    };
    config.dictionaries.extend(cli.dictionaries);
    if cli.show_strokes {
        config.base.show_strokes = true;
    }

    let text = match &cli.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading script from stdin")?;
            text
        }
    };
    let script = parse_script(&text)?;

    let mut engine = create_engine(&config, RecordingHost::new()).context("creating engine")?;
    let stdout = std::io::stdout();
    run_script(&mut engine, &script, &mut stdout.lock())?;
    Ok(())
}
