//! Daylife - Entry Point
//!
//! Headless by default: runs a fixed number of simulated minutes and prints
//! the activity log. With `--realtime` the pacer drives the day at `--speed`
//! simulated minutes per second and stdin controls it.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use daylife::core::config::SimConfig;
use daylife::core::error::{Result, SimError};
use daylife::simulation::{Control, Pacer, Universe, MAX_SPEED, MIN_SPEED};

/// Minute-resolution simulation of a person's day
#[derive(Parser, Debug)]
#[command(name = "daylife")]
#[command(about = "Simulate one person's day minute by minute")]
struct Args {
    /// TOML configuration; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated minutes to run in headless mode
    #[arg(long, default_value_t = 1440)]
    minutes: u64,

    /// Simulated minutes per real second
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Run against the wall clock and read controls from stdin
    #[arg(long)]
    realtime: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("daylife=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut universe = Universe::new(config, Box::new(|line: &str| println!("{line}")))?;
    universe.set_speed(args.speed);

    let universe = if args.realtime {
        run_realtime(universe)?
    } else {
        universe.run_steps(args.minutes);
        universe
    };

    if args.json {
        println!("{}", universe.snapshot_json()?);
    } else {
        print_summary(&universe);
    }

    Ok(())
}

fn run_realtime(universe: Universe) -> Result<Universe> {
    let rt = Runtime::new()?;

    rt.block_on(async move {
        println!("Commands: p play | s pause | n step | + faster | - slower | r reinit | q quit");

        let mut speed = universe.speed();
        let (tx, rx) = mpsc::unbounded_channel();
        let pacer = tokio::spawn(Pacer::new(universe).run(rx));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let control = match line.trim() {
                "p" | "play" => Control::Play,
                "s" | "pause" => Control::Pause,
                "n" | "step" => Control::Step,
                "+" => {
                    speed = (speed * 2.0).min(MAX_SPEED);
                    Control::SetSpeed(speed)
                }
                "-" => {
                    speed = (speed / 2.0).max(MIN_SPEED);
                    Control::SetSpeed(speed)
                }
                "r" | "reinit" => Control::Reinit,
                "q" | "quit" => break,
                "" => continue,
                other => {
                    println!("unknown command: {other}");
                    continue;
                }
            };
            if tx.send(control).is_err() {
                break;
            }
        }

        // Pacer may already be gone if stdin closed first
        let _ = tx.send(Control::Shutdown);
        Ok::<_, SimError>(pacer.await?)
    })
}

fn print_summary(universe: &Universe) {
    let agent = universe.agent();
    println!();
    println!("=== {} at {} ===", agent.name(), universe.now().format("%a %Y-%m-%d %H:%M"));
    println!("Activity: {}", agent.state().activity.name);
    for (kind, value) in agent.needs().iter() {
        println!("  {:<10} {:>6.1}", kind.name(), value);
    }
    println!("Naps today: {}", universe.nap_count());
}
