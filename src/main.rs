use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use window_gopher::config::{
    DEFAULT_CYCLE_SECS, DEFAULT_DWELL_SECS, DEFAULT_TOGGLE_HOTKEY, SCAN_INTERVAL,
};
use window_gopher::console::{spawn_stdin_reader, Console};
use window_gopher::hotkey::spawn_toggle_listener;
use window_gopher::platform::NativeControl;
use window_gopher::{Oscillator, Phase, ProcessFinder, WindowControl, WindowRegistry};

#[derive(Parser)]
#[command(name = "gopher", version, about)]
struct Cli {
    /// Log focus changes and registry scans
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan once and print every window that can be selected
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start cycling between two windows right away
    Run {
        /// Window to return to (label, pid or unique part of the label)
        #[arg(long)]
        current: String,

        /// Window to pull to the front
        #[arg(long)]
        target: String,

        #[command(flatten)]
        cycle: CycleArgs,
    },
    /// Pick windows and start/stop interactively
    Console {
        #[command(flatten)]
        cycle: CycleArgs,
    },
}

#[derive(Args)]
struct CycleArgs {
    /// Seconds between activations of the target window
    #[arg(long, default_value_t = DEFAULT_CYCLE_SECS.to_string())]
    cycle: String,

    /// Seconds the target window stays in front
    #[arg(long, default_value_t = DEFAULT_DWELL_SECS.to_string())]
    dwell: String,

    /// Global hotkey that starts and stops the cycle
    #[arg(long, default_value = DEFAULT_TOGGLE_HOTKEY)]
    hotkey: String,

    /// Do not register a global hotkey
    #[arg(long)]
    no_hotkey: bool,
}

fn init_logging(verbose: bool) {
    let directive = if verbose {
        "window_gopher=debug"
    } else {
        "window_gopher=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn toggle_listener(args: &CycleArgs) -> Option<mpsc::UnboundedReceiver<()>> {
    if args.no_hotkey {
        return None;
    }
    match spawn_toggle_listener(&args.hotkey) {
        Ok(toggles) => {
            println!(
                "{} press {} to start/stop",
                "hotkey:".cyan(),
                args.hotkey.bold()
            );
            Some(toggles)
        }
        Err(e) => {
            warn!(event = "hotkey.unavailable", error = %e);
            println!("{} {}", "hotkey disabled:".yellow(), e);
            None
        }
    }
}

fn list(control: Arc<dyn WindowControl>, json: bool) -> Result<()> {
    let mut registry = WindowRegistry::new(ProcessFinder::new(control));
    let snapshot = registry.scan()?;

    if json {
        let entries: Vec<_> = snapshot.entries().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("{}", "no windows found".yellow());
        return Ok(());
    }
    for (i, entry) in snapshot.entries().enumerate() {
        println!("{:>3}. {}", i + 1, entry.label);
    }
    Ok(())
}

async fn run(
    control: Arc<dyn WindowControl>,
    current: &str,
    target: &str,
    args: CycleArgs,
) -> Result<()> {
    let registry = WindowRegistry::new(ProcessFinder::new(control.clone()));
    let (snapshots, _scanner) = registry.spawn(SCAN_INTERVAL);

    let snapshot = snapshots.borrow().clone();
    let current = snapshot
        .find(current)
        .ok_or_else(|| anyhow!("no single window matches '{current}'"))?;
    let target = snapshot
        .find(target)
        .ok_or_else(|| anyhow!("no single window matches '{target}'"))?;

    let mut console = Console::new(snapshots, Oscillator::new(control), io::stdout());
    console.set_intervals(args.cycle.as_str(), args.dwell.as_str());
    console.choose(&current.label, &target.label)?;
    console.start()?;
    if console.phase() != Phase::Running {
        bail!("focus cycle did not start");
    }

    let toggles = toggle_listener(&args);
    println!("{}", "press Ctrl-C to quit".dimmed());
    console.run(None, toggles).await?;
    Ok(())
}

async fn interactive(control: Arc<dyn WindowControl>, args: CycleArgs) -> Result<()> {
    let registry = WindowRegistry::new(ProcessFinder::new(control.clone()));
    let (snapshots, _scanner) = registry.spawn(SCAN_INTERVAL);

    let mut console = Console::new(snapshots, Oscillator::new(control), io::stdout());
    console.set_intervals(args.cycle.as_str(), args.dwell.as_str());

    let toggles = toggle_listener(&args);
    println!("{}", "type 'help' for commands".dimmed());
    let input = spawn_stdin_reader()?;
    console.run(Some(input), toggles).await?;
    Ok(())
}

// One thread drives every focus change: the Win32 focus calls are
// thread-affine.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let control: Arc<dyn WindowControl> = Arc::new(NativeControl::new());

    match cli.command {
        Commands::List { json } => list(control, json),
        Commands::Run {
            current,
            target,
            cycle,
        } => run(control, &current, &target, cycle).await,
        Commands::Console { cycle } => interactive(control, cycle).await,
    }
}
