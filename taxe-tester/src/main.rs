mod loader;
mod reports;
mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use loader::FileLoader;
use simulation::{Simulation, SimulationSummary};
use taxe_game::GameEngine;

#[derive(Debug, Parser)]
#[command(name = "taxe-tester", version = "0.1.0")]
#[command(about = "Headless TaxE turn driver - simulates trains, blocking and goal scoring")]
struct Args {
    /// Map description (JSON); defaults to the bundled map
    #[arg(long)]
    map: Option<PathBuf>,

    /// Rules file (JSON); missing fields take their defaults
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Seed for connection blocking and goal issuance
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Number of turns to play
    #[arg(long, default_value_t = 40)]
    turns: u32,

    /// Number of players
    #[arg(long, default_value_t = 2)]
    #[arg(value_parser = clap::value_parser!(u8).range(1..))]
    players: u8,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let summary = run_simulation(&args)?;
    write_reports(&args, &summary, start_time)?;
    Ok(())
}

fn announce_banner() {
    println!("{}", "🚂 TaxE Turn Simulator".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn run_simulation(args: &Args) -> Result<SimulationSummary> {
    let engine = GameEngine::new(FileLoader::new(args.map.clone(), args.rules.clone()));
    let session = engine
        .create_session(args.seed, args.players)
        .context("failed to set up game session")?;
    log::debug!(
        "session ready: {} station(s), {} connection(s)",
        session.graph().stations().len(),
        session.graph().connections().len()
    );
    Ok(Simulation::new(session).run(args.turns))
}

fn write_reports(args: &Args, summary: &SimulationSummary, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, summary)?,
        _ => reports::generate_console_report(
            &mut output_target,
            summary,
            args.verbose,
            start_time.elapsed(),
        )?,
    }

    output_target.flush()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}
