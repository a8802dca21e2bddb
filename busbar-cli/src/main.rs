//! Busbar CLI - single-line diagram energization from the command line.

use busbar::{
    exchange, BusbarCore, DeviceKind, EngineOptions, EvaluationResult, MixedKindPolicy,
    SignalKind,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "busbar")]
#[command(about = "Single-line diagram energization and AC/DC signal checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Energize a single diagram file
    Check {
        /// Path to a diagram exchange document (.json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Classification of conductors reached by both AC and DC
        #[arg(long, value_enum, default_value = "prefer-dc")]
        mixed: MixedPolicy,

        /// Exit with error code if any conductor had to be skipped
        #[arg(long)]
        fail_on_skipped: bool,
    },

    /// Energize every diagram file in a directory
    Project {
        /// Path to project directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Classification of conductors reached by both AC and DC
        #[arg(long, value_enum, default_value = "prefer-dc")]
        mixed: MixedPolicy,

        /// Exit with error code if any conductor had to be skipped
        #[arg(long)]
        fail_on_skipped: bool,
    },

    /// Look up a single device or conductor
    Query {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Device id to look up
        #[arg(long, conflicts_with = "conductor", required_unless_present = "conductor")]
        device: Option<String>,

        /// Conductor id to look up
        #[arg(long)]
        conductor: Option<String>,

        /// Classification of conductors reached by both AC and DC
        #[arg(long, value_enum, default_value = "prefer-dc")]
        mixed: MixedPolicy,
    },

    /// List device types and how they conduct
    Types {
        /// Show terminal roles
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Clone, ValueEnum)]
enum MixedPolicy {
    PreferDc,
    PreferAc,
}

impl MixedPolicy {
    fn options(&self) -> EngineOptions {
        EngineOptions {
            mixed_kind: match self {
                MixedPolicy::PreferDc => MixedKindPolicy::PreferDc,
                MixedPolicy::PreferAc => MixedKindPolicy::PreferAc,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let exit_code = match cli.command {
        Commands::Check {
            file,
            format,
            mixed,
            fail_on_skipped,
        } => handle_check(&file, format, mixed, fail_on_skipped),
        Commands::Project {
            dir,
            format,
            mixed,
            fail_on_skipped,
        } => handle_project(&dir, format, mixed, fail_on_skipped),
        Commands::Query {
            file,
            device,
            conductor,
            mixed,
        } => handle_query(&file, device, conductor, mixed),
        Commands::Types { verbose } => {
            handle_types(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn handle_check(
    file: &PathBuf,
    format: OutputFormat,
    mixed: MixedPolicy,
    fail_on_skipped: bool,
) -> i32 {
    match BusbarCore::energize_file(file, &mixed.options()) {
        Ok(result) => {
            output_results(std::slice::from_ref(&result), &format);
            if fail_on_skipped && result.has_skipped() {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_project(
    dir: &PathBuf,
    format: OutputFormat,
    mixed: MixedPolicy,
    fail_on_skipped: bool,
) -> i32 {
    match BusbarCore::energize_project(dir, &mixed.options()) {
        Ok(results) => {
            output_results(&results, &format);
            if fail_on_skipped && results.iter().any(|r| r.has_skipped()) {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_query(
    file: &PathBuf,
    device: Option<String>,
    conductor: Option<String>,
    mixed: MixedPolicy,
) -> i32 {
    let diagram = match exchange::import_file(file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let state = BusbarCore::energize(&diagram, &mixed.options());

    if let Some(id) = device {
        if diagram.device(&id).is_none() {
            eprintln!("Error: unknown device {}", id);
            return 1;
        }
        let status = if state.is_device_energized(&id) {
            "energized"
        } else {
            "de-energized"
        };
        println!("{}: {}", id, status);
    } else if let Some(id) = conductor {
        if diagram.conductor(&id).is_none() {
            eprintln!("Error: unknown conductor {}", id);
            return 1;
        }
        match state.conductor_signal(&id) {
            Some(kind) => println!("{}: energized {}", id, kind),
            None => println!("{}: de-energized", id),
        }
    }
    0
}

fn output_results(results: &[EvaluationResult], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(results),
        OutputFormat::Json => output_json(results),
    }
}

fn output_human(results: &[EvaluationResult]) {
    for result in results {
        let state = &result.energization;
        println!("\nFile: {}", result.file.display());
        println!("{}", "─".repeat(60));

        if result.is_dead() {
            println!("  Nothing is energized");
        } else {
            println!("\n  ENERGIZED DEVICES:");
            for id in state.energized_devices() {
                println!("    + {}", id);
            }
            println!("\n  CONDUCTORS:");
            for (id, kind) in state.conductor_kinds() {
                let note = if state.mixed_conductors().contains(id) {
                    " (mixed)"
                } else {
                    ""
                };
                println!("    {}  {}{}", id, kind, note);
            }
        }

        if !state.skipped_conductors().is_empty() {
            println!("\n  SKIPPED:");
            for fault in state.skipped_conductors() {
                println!("    - {}", fault);
            }
        }

        println!("\n  Summary:");
        println!(
            "    Devices:    {}/{} energized",
            result.stats.energized_devices, result.stats.devices
        );
        println!(
            "    Conductors: {}/{} energized",
            result.stats.energized_conductors, result.stats.conductors
        );
        println!(
            "    AC: {}  DC: {}  Mixed: {}",
            result.stats.ac_conductors, result.stats.dc_conductors, result.stats.mixed_conductors
        );
        println!("    Skipped:    {}", result.stats.skipped_conductors);
    }
}

fn output_json(results: &[EvaluationResult]) {
    let output = serde_json::json!({
        "results": results.iter().map(|r| {
            serde_json::json!({
                "file": r.file.display().to_string(),
                "energization": r.energization,
                "stats": r.stats,
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": results.len(),
            "energized_devices": results.iter().map(|r| r.stats.energized_devices).sum::<usize>(),
            "skipped_conductors": results.iter().map(|r| r.stats.skipped_conductors).sum::<usize>(),
        }
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_types(verbose: bool) {
    println!("Device types:\n");

    let types = [
        (
            DeviceKind::Source { signal: SignalKind::Ac },
            "Emits its declared signal (AC or DC) on its only terminal",
        ),
        (
            DeviceKind::Breaker { closed: true },
            "Conducts both ways while closed, blocks when open",
        ),
        (DeviceKind::Bus, "Zero-impedance tie, conducts both ways"),
        (DeviceKind::Load, "Passes signal through so loads can be daisy-chained"),
        (DeviceKind::Rectifier, "AC in on terminal 0, DC out on terminal 1, one way"),
        (DeviceKind::Inverter, "DC in on terminal 0, AC out on terminal 1, one way"),
    ];

    for (kind, rule) in &types {
        println!("  {}", kind);
        println!("    {}", rule);
        if verbose {
            let roles: Vec<String> = (0..kind.terminal_count())
                .map(|t| match kind.terminal_role(t) {
                    Some(role) => format!("{}={}", t, role),
                    None => format!("{}=any", t),
                })
                .collect();
            println!("    terminals: {}", roles.join(", "));
        }
        println!();
    }
}
