//! u-colony CLI
//!
//! Load or generate a colony, dispatch it, and inspect or save the
//! resulting allocation.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use u_colony::command::{help, Command, Session};
use u_colony::dispatching::{DispatchConfig, DispatchStrategy, Dispatcher};
use u_colony::io::{read_colony, save_assignments};
use u_colony::kpi::EnvyKpi;
use u_colony::simulation::Simulation;

#[derive(Parser, Debug)]
#[command(name = "u-colony", version)]
#[command(about = "Allocate resources to settlers while limiting envy between adversaries", long_about = None)]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Load a colony file and dispatch it
    Run {
        /// Colony file
        file: PathBuf,

        #[command(flatten)]
        dispatch: DispatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a random colony and dispatch it
    Random {
        /// Number of settlers (and resources)
        #[arg(short = 'n', long, default_value = "10")]
        settlers: usize,

        /// Adversaries drawn per settler, at most
        #[arg(short = 'd', long, default_value = "3")]
        max_adversaries: usize,

        #[command(flatten)]
        dispatch: DispatchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Interactive command loop
    Shell {
        /// Colony file; a blank colony is created when omitted
        file: Option<PathBuf>,

        /// Settlers of a blank colony
        #[arg(short = 'n', long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=26))]
        settlers: u8,

        /// Fill the blank colony randomly, with at most this many adversaries per settler
        #[arg(long)]
        random: Option<usize>,

        /// RNG seed (OS entropy when omitted)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct DispatchArgs {
    /// Strategy: linear, max-lef or switch
    #[arg(short = 'S', long, default_value = "max-lef")]
    strategy: DispatchStrategy,

    /// MAX-LEF instances or switch trials (default: number of settlers)
    #[arg(short = 'k', long)]
    param: Option<usize>,

    /// RNG seed (OS entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

impl DispatchArgs {
    fn config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::new(self.strategy);
        if let Some(k) = self.param {
            config = config.with_param(k);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write `name:resource` lines to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON summary instead of the settler table
    #[arg(long)]
    json: bool,
}

fn rng_for(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn dispatch(
    sim: &mut Simulation,
    rng: SmallRng,
    config: &DispatchConfig,
    output: &OutputArgs,
) -> Result<(), Box<dyn Error>> {
    let report = Dispatcher::new(&mut *sim, rng).run(config)?;

    if output.json {
        let summary = serde_json::json!({
            "report": report,
            "assignments": sim.snapshot_assignments(),
            "kpi": EnvyKpi::calculate(sim),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{sim}");
        println!(
            "{}: {}/{} jealous (LEF rate {:.1}%)",
            report.strategy,
            report.jealous,
            report.settlers,
            report.lef_rate() * 100.0
        );
    }

    if let Some(path) = &output.output {
        save_assignments(sim, path)?;
    }
    Ok(())
}

fn shell(mut session: Session) -> Result<(), Box<dyn Error>> {
    println!("{}", session.simulation());
    println!("{}", help());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        let quit = command == Command::Quit;
        match session.execute(command) {
            Ok(out) => println!("{out}"),
            Err(e) => println!("{e}"),
        }
        if quit {
            break;
        }
    }
    Ok(())
}

fn execute(mode: Mode) -> Result<(), Box<dyn Error>> {
    match mode {
        Mode::Run {
            file,
            dispatch: args,
            output,
        } => {
            let mut sim = read_colony(&file)?;
            info!(file = %file.display(), "colony file read");
            dispatch(&mut sim, rng_for(args.seed), &args.config(), &output)
        }
        Mode::Random {
            settlers,
            max_adversaries,
            dispatch: args,
            output,
        } => {
            let mut rng = rng_for(args.seed);
            let mut sim = Simulation::random(settlers, max_adversaries, &mut rng);
            info!(settlers, max_adversaries, "random colony generated");
            dispatch(&mut sim, rng, &args.config(), &output)
        }
        Mode::Shell {
            file,
            settlers,
            random,
            seed,
        } => {
            let mut rng = rng_for(seed);
            let session = match (file, random) {
                (Some(path), _) => Session::new(read_colony(&path)?, rng).with_source(path),
                (None, Some(max_adversaries)) => {
                    let sim = Simulation::random(settlers.into(), max_adversaries, &mut rng);
                    Session::new(sim, rng)
                }
                (None, None) => Session::new(Simulation::new(settlers.into()), rng),
            };
            shell(session)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli.mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
