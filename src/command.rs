//! Line commands over a colony.
//!
//! A [`Command`] is parsed from one line of text; [`Session::execute`]
//! applies it to an owned [`Simulation`] and returns the text to print.
//! Arguments are whitespace-separated; a single-quoted argument may
//! contain spaces (`adversary 'Dark Vador' Tartatin`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::dispatching::{DispatchConfig, DispatchStrategy, Dispatcher, ParseStrategyError};
use crate::error::ColonyError;
use crate::io::save_assignments;
use crate::kpi::EnvyKpi;
use crate::simulation::Simulation;

/// Command-layer errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),

    #[error("'{command}' expects {expected} argument(s) ({given} given)")]
    Arity {
        command: &'static str,
        expected: &'static str,
        given: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Strategy(#[from] ParseStrategyError),

    #[error("refusing to overwrite the colony file {}", .0.display())]
    OverwriteSource(PathBuf),

    #[error(transparent)]
    Colony(#[from] ColonyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Declare two settlers adversaries.
    Adversary { a: String, b: String },
    /// Set the full ranking of a settler.
    Prefs {
        settler: String,
        preferences: Vec<String>,
    },
    /// Run a strategy; `param` is the MAX-LEF instance or switch count.
    Dispatch {
        strategy: DispatchStrategy,
        param: Option<usize>,
    },
    /// Exchange the resources of two settlers.
    Swap { a: String, b: String },
    /// Bind a resource to a settler by hand.
    Assign { settler: String, resource: String },
    /// Release every assignment.
    Clear,
    /// List settlers.
    Settlers,
    /// List jealous settlers.
    Jealous,
    /// Show envy metrics.
    Kpi,
    /// Write assignments to a file.
    Save { path: PathBuf },
    Help,
    Quit,
}

const COMMANDS: &str = "\
commands:
  adversary <a> <b>              make two settlers adversaries
  prefs <settler> <r1> ... <rn>  set a settler's full ranking
  dispatch [strategy] [k]        linear | max-lef [instances] | switch [trials]
  swap <a> <b>                   exchange two settlers' resources
  assign <settler> <resource>    bind a free resource by hand
  clear                          release every assignment
  settlers                       list settlers
  jealous                        list jealous settlers
  kpi                            envy metrics
  save <path>                    write name:resource lines
  help                           this text
  quit                           leave";

/// Command list followed by the dispatch strategies.
pub fn help() -> String {
    let mut out = format!("{COMMANDS}\nstrategies:");
    for strategy in DispatchStrategy::all() {
        let _ = write!(out, "\n  {:<31}{}", strategy.name(), strategy.description());
    }
    out
}

/// Splits a line into arguments.
///
/// `'...'` yields its content verbatim when the closing quote ends the
/// token; otherwise the quote is an ordinary character.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('\'') {
            if let Some(end) = quoted.find('\'') {
                let after = &quoted[end + 1..];
                if after.chars().next().map_or(true, char::is_whitespace) {
                    tokens.push(quoted[..end].to_string());
                    rest = after.trim_start();
                    continue;
                }
            }
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }

    tokens
}

fn arity(command: &'static str, expected: &'static str, given: usize) -> CommandError {
    CommandError::Arity {
        command,
        expected,
        given,
    }
}

impl Command {
    /// Parses one command line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens = tokenize(line);
        let Some((head, args)) = tokens.split_first() else {
            return Err(CommandError::Empty);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "adversary" | "detest" => match args {
                [a, b] => Self::Adversary {
                    a: a.clone(),
                    b: b.clone(),
                },
                _ => return Err(arity("adversary", "2", args.len())),
            },
            "prefs" | "preferences" => match args {
                [settler, preferences @ ..] if !preferences.is_empty() => Self::Prefs {
                    settler: settler.clone(),
                    preferences: preferences.to_vec(),
                },
                _ => return Err(arity("prefs", "at least 2", args.len())),
            },
            "dispatch" | "solve" => {
                if args.len() > 2 {
                    return Err(arity("dispatch", "0 to 2", args.len()));
                }
                let strategy = match args.first() {
                    Some(s) => s.parse::<DispatchStrategy>()?,
                    None => DispatchStrategy::default(),
                };
                if strategy == DispatchStrategy::Linear && args.len() > 1 {
                    return Err(arity("dispatch linear", "no", args.len() - 1));
                }
                let param = args
                    .get(1)
                    .map(|k| {
                        k.parse::<usize>().map_err(|_| {
                            CommandError::InvalidArgument(format!("'{k}' is not a trial count"))
                        })
                    })
                    .transpose()?;
                Self::Dispatch { strategy, param }
            }
            "swap" | "switch" => match args {
                [a, b] => Self::Swap {
                    a: a.clone(),
                    b: b.clone(),
                },
                _ => return Err(arity("swap", "2", args.len())),
            },
            "assign" => match args {
                [settler, resource] => Self::Assign {
                    settler: settler.clone(),
                    resource: resource.clone(),
                },
                _ => return Err(arity("assign", "2", args.len())),
            },
            "save" => match args {
                [path] => Self::Save {
                    path: PathBuf::from(path),
                },
                _ => return Err(arity("save", "1", args.len())),
            },
            "clear" => Self::Clear,
            "settlers" | "show" => Self::Settlers,
            "jealous" => Self::Jealous,
            "kpi" => Self::Kpi,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// An interactive session over one colony.
///
/// Owns the simulation and the random source used by every dispatch, so
/// a seeded session replays identically.
#[derive(Debug)]
pub struct Session<R = SmallRng> {
    simulation: Simulation,
    rng: R,
    source: Option<PathBuf>,
}

impl Session<SmallRng> {
    /// Session with a seeded [`SmallRng`], or OS entropy when `seed` is `None`.
    pub fn with_seed(simulation: Simulation, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::new(simulation, rng)
    }
}

impl<R: Rng> Session<R> {
    pub fn new(simulation: Simulation, rng: R) -> Self {
        Self {
            simulation,
            rng,
            source: None,
        }
    }

    /// Remembers the file the colony was loaded from; `save` refuses to
    /// overwrite it.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Applies `command` and returns the text to show.
    pub fn execute(&mut self, command: Command) -> Result<String, CommandError> {
        debug!(?command, "executing command");
        let sim = &mut self.simulation;

        let output = match command {
            Command::Adversary { a, b } => {
                sim.set_adversary(&a, &b)?;
                format!("{a} and {b} are now adversaries")
            }
            Command::Prefs {
                settler,
                preferences,
            } => {
                sim.set_preferences(&settler, preferences.as_slice())?;
                format!("preferences of {settler} set")
            }
            Command::Dispatch { strategy, param } => {
                let mut config = DispatchConfig::new(strategy);
                if let Some(k) = param {
                    config = config.with_param(k);
                }
                let report = Dispatcher::new(&mut *sim, &mut self.rng).run(&config)?;
                let mut out = format!(
                    "{}: {}/{} jealous (LEF rate {:.1}%)\n",
                    report.strategy,
                    report.jealous,
                    report.settlers,
                    report.lef_rate() * 100.0
                );
                if let Some(baseline) = report.baseline_jealous {
                    let _ = writeln!(
                        out,
                        "baseline {baseline}, {} of {} switches kept",
                        report.accepted_switches, report.trials
                    );
                }
                out.push_str(&sim.to_string());
                out
            }
            Command::Swap { a, b } => {
                sim.switch_assignments(&a, &b)?;
                sim.to_string()
            }
            Command::Assign { settler, resource } => {
                if sim.assign(&settler, &resource)? {
                    format!("{settler} now holds {resource}")
                } else {
                    format!("{resource} is already held")
                }
            }
            Command::Clear => {
                sim.clear();
                "assignments cleared".to_string()
            }
            Command::Settlers => sim.to_string(),
            Command::Jealous => {
                let jealous = sim.jealous_settlers();
                if jealous.is_empty() {
                    "no jealous settler".to_string()
                } else {
                    format!("{} jealous: {}", jealous.len(), jealous.join(", "))
                }
            }
            Command::Kpi => {
                let kpi = EnvyKpi::calculate(sim);
                format!(
                    "settlers {}, assigned {}, jealous {}\nLEF rate {:.1}%, first choice {:.1}%, mean rank {:.2}",
                    kpi.settlers,
                    kpi.assigned,
                    kpi.jealous,
                    kpi.lef_rate * 100.0,
                    kpi.first_choice_rate * 100.0,
                    kpi.mean_rank
                )
            }
            Command::Save { path } => {
                if self.source.as_deref().is_some_and(|src| same_file(src, &path)) {
                    return Err(CommandError::OverwriteSource(path));
                }
                save_assignments(sim, &path)?;
                format!("saved to {}", path.display())
            }
            Command::Help => help(),
            Command::Quit => "bye".to_string(),
        };
        Ok(output)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut sim = Simulation::new(3);
        for name in sim.settler_names() {
            sim.set_preferences(&name, &["R1", "R2", "R3"]).unwrap();
        }
        Session::with_seed(sim, Some(42))
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize("adversary 'Dark Vador'  Tartatin"),
            vec!["adversary", "Dark Vador", "Tartatin"]
        );
        assert_eq!(tokenize("  swap A1\tB1 "), vec!["swap", "A1", "B1"]);
        assert_eq!(tokenize("'a'b c"), vec!["'a'b", "c"]);
        assert_eq!(tokenize("'unclosed quote"), vec!["'unclosed", "quote"]);
        assert_eq!(tokenize("x ''"), vec!["x", ""]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("prefs A1 R2 R1").unwrap(),
            Command::Prefs {
                settler: "A1".into(),
                preferences: vec!["R2".into(), "R1".into()],
            }
        );
        assert_eq!(
            Command::parse("DISPATCH switch 25").unwrap(),
            Command::Dispatch {
                strategy: DispatchStrategy::Switch,
                param: Some(25),
            }
        );
        assert_eq!(
            Command::parse("dispatch").unwrap(),
            Command::Dispatch {
                strategy: DispatchStrategy::MaxLef,
                param: None,
            }
        );
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("save 'my file.txt'").unwrap(),
            Command::Save {
                path: PathBuf::from("my file.txt")
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse(""), Err(CommandError::Empty)));
        assert!(matches!(
            Command::parse("fly A1"),
            Err(CommandError::Unknown(name)) if name == "fly"
        ));
        assert!(matches!(
            Command::parse("swap A1"),
            Err(CommandError::Arity { given: 1, .. })
        ));
        assert!(matches!(
            Command::parse("dispatch annealing"),
            Err(CommandError::Strategy(_))
        ));
        assert!(matches!(
            Command::parse("dispatch max-lef many"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert_eq!(
            Command::parse("swap A1").unwrap_err().to_string(),
            "'swap' expects 2 argument(s) (1 given)"
        );
    }

    #[test]
    fn test_dispatch_linear_takes_no_count() {
        assert!(matches!(
            Command::parse("dispatch linear 5"),
            Err(CommandError::Arity { given: 1, .. })
        ));
        assert_eq!(
            Command::parse("dispatch linear 5").unwrap_err().to_string(),
            "'dispatch linear' expects no argument(s) (1 given)"
        );
        assert_eq!(
            Command::parse("dispatch linear").unwrap(),
            Command::Dispatch {
                strategy: DispatchStrategy::Linear,
                param: None
            }
        );
    }

    #[test]
    fn test_help_lists_strategies() {
        let text = session().execute(Command::Help).unwrap();
        assert!(text.starts_with("commands:"));
        for strategy in DispatchStrategy::all() {
            assert!(text.contains(strategy.description()));
        }
        assert!(text.contains("\n  max-lef                        MAX-LEF"));
    }

    #[test]
    fn test_execute_dispatch_and_jealous() {
        let mut session = session();
        session
            .execute(Command::parse("adversary A1 B1").unwrap())
            .unwrap();
        let out = session
            .execute(Command::parse("dispatch linear").unwrap())
            .unwrap();
        assert!(out.starts_with("linear: 1/3 jealous"));
        assert!(session.simulation().is_fully_assigned());

        let out = session.execute(Command::Jealous).unwrap();
        assert_eq!(out, "1 jealous: B1");
    }

    #[test]
    fn test_execute_swap_and_assign() {
        let mut session = session();
        assert_eq!(
            session.execute(Command::parse("assign A1 R1").unwrap()).unwrap(),
            "A1 now holds R1"
        );
        assert_eq!(
            session.execute(Command::parse("assign B1 R1").unwrap()).unwrap(),
            "R1 is already held"
        );
        assert!(matches!(
            session.execute(Command::parse("swap A1 B1").unwrap()),
            Err(CommandError::Colony(ColonyError::NotAssigned(name))) if name == "B1"
        ));
        session.execute(Command::parse("assign B1 R2").unwrap()).unwrap();
        session.execute(Command::parse("swap A1 B1").unwrap()).unwrap();
        assert_eq!(
            session.simulation().settler("A1").unwrap().assignment(),
            Some("R2")
        );

        session.execute(Command::Clear).unwrap();
        assert!(session.simulation().snapshot_assignments().is_empty());
    }

    #[test]
    fn test_dispatch_requires_stability() {
        let mut session = Session::with_seed(Simulation::new(2), Some(42));
        assert!(matches!(
            session.execute(Command::parse("dispatch").unwrap()),
            Err(CommandError::Colony(ColonyError::Unstable))
        ));
    }

    #[test]
    fn test_execute_kpi() {
        let mut session = session();
        session.execute(Command::parse("dispatch max-lef 5").unwrap()).unwrap();
        let out = session.execute(Command::Kpi).unwrap();
        assert!(out.starts_with("settlers 3, assigned 3, jealous 0"));
    }

    #[test]
    fn test_save_refuses_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("colony.txt");
        let target = dir.path().join("assignments.txt");
        std::fs::write(&source, "colon(A).").unwrap();

        let mut session = session().with_source(&source);
        session.execute(Command::parse("dispatch linear").unwrap()).unwrap();
        assert!(matches!(
            session.execute(Command::Save {
                path: source.clone()
            }),
            Err(CommandError::OverwriteSource(_))
        ));
        assert_eq!(std::fs::read_to_string(&source).unwrap(), "colon(A).");

        session
            .execute(Command::Save {
                path: target.clone(),
            })
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "A1:R1\nB1:R2\nC1:R3\n"
        );
    }
}
