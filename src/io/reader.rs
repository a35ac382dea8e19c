//! Colony file reader.
//!
//! A colony file is a sequence of `.`-terminated statements of the form
//! `keyword(arg, ...)`, grouped in ordered sections:
//!
//! ```text
//! colon(Dark Vador).                  settlers, at least one
//! ressource(Pomme).                   resources, as many as settlers
//! deteste(Dark Vador,Tartatin).       adversary pairs, optional
//! preferences(Dark Vador,Pomme,...).  one full ranking per settler
//! ```
//!
//! Whitespace between statements is ignored. Arguments are trimmed and
//! may contain letters, digits, `_` and spaces. Repeated names collapse.
//! Diagnostics carry the line where the offending statement starts.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::error::ColonyError;
use crate::models::{Resource, Settler};
use crate::simulation::Simulation;
use crate::validation::validate_colony;

/// Errors raised while loading a colony file.
#[derive(Debug, Error)]
pub enum ColonyFileError {
    #[error("failed to read colony file: {0}")]
    Io(#[from] std::io::Error),

    /// Not of the form `keyword(args)`, or an unknown keyword.
    #[error("At line {line} : Unknown method {statement}")]
    UnknownStatement { line: usize, statement: String },

    /// Known keyword with malformed arguments.
    #[error("At line {line} : Invalid argument '{statement}' is incorrect for {keyword}()")]
    InvalidArgument {
        line: usize,
        keyword: &'static str,
        statement: String,
    },

    /// A statement outside its section.
    #[error("At line {line} : {statement} : this method should not be there!")]
    Misplaced { line: usize, statement: String },

    #[error("Settlers should be defined first")]
    SettlersFirst,

    #[error(
        "Number of resources must equal number of settlers, but there are {settlers} distinct names for {resources} distinct resources"
    )]
    CountMismatch { settlers: usize, resources: usize },

    /// A `preferences` statement without exactly one resource per slot.
    #[error("At line {line} : {} for {statement}", argument_delta(.expected, .actual))]
    PreferenceCount {
        line: usize,
        expected: usize,
        actual: usize,
        statement: String,
    },

    /// A well-formed statement rejected by the colony (unknown name,
    /// self-adversary, ...).
    #[error("At line {line} : {source}")]
    Rejected { line: usize, source: ColonyError },

    #[error("Simulation is not stable: {}", .0.join("; "))]
    Unstable(Vec<String>),
}

fn argument_delta(expected: &usize, actual: &usize) -> String {
    if actual > expected {
        format!("Extra {} argument(s)", actual - expected)
    } else {
        format!("Missing {} argument(s)", expected - actual)
    }
}

/// Statement keywords, in section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Settlers,
    Resources,
    Adversaries,
    Preferences,
}

impl Section {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "colon" => Some(Self::Settlers),
            "ressource" => Some(Self::Resources),
            "deteste" => Some(Self::Adversaries),
            "preferences" => Some(Self::Preferences),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Settlers => "colon",
            Self::Resources => "ressource",
            Self::Adversaries => "deteste",
            Self::Preferences => "preferences",
        }
    }

    /// Whether `next` may open right after `self`.
    fn may_precede(self, next: Section) -> bool {
        matches!(
            (self, next),
            (Self::Settlers, Self::Resources)
                | (Self::Resources, Self::Adversaries)
                | (Self::Resources, Self::Preferences)
                | (Self::Adversaries, Self::Preferences)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Statement<'a> {
    line: usize,
    text: &'a str,
}

/// Splits `source` on `.` and locates each non-empty statement.
fn statements(source: &str) -> Vec<Statement<'_>> {
    let mut line = 1;
    let mut out = Vec::new();
    for chunk in source.split('.') {
        let body = chunk.trim_start();
        let leading = &chunk[..chunk.len() - body.len()];
        let text = body.trim_end();
        if !text.is_empty() {
            out.push(Statement {
                line: line + leading.matches('\n').count(),
                text,
            });
        }
        line += chunk.matches('\n').count();
    }
    out
}

/// Splits `keyword(inner)`. The inner text must fit on one line.
fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let keyword = &text[..open];
    if keyword.is_empty() || !keyword.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    let inner = text[open + 1..].strip_suffix(')')?;
    if inner.is_empty() || inner.contains(|c| c == '\n' || c == '\r') {
        return None;
    }
    Some((keyword, inner))
}

fn is_name(arg: &str) -> bool {
    !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
}

/// Trimmed comma-separated arguments; `None` if any is malformed.
fn arguments(inner: &str) -> Option<Vec<&str>> {
    inner
        .split(',')
        .map(str::trim)
        .map(|arg| is_name(arg).then_some(arg))
        .collect()
}

#[derive(Debug, Default)]
struct Loader {
    section: Option<Section>,
    settlers: BTreeSet<String>,
    resources: BTreeMap<String, Resource>,
    simulation: Option<Simulation>,
    adversary_pairs: usize,
}

impl Loader {
    fn feed(&mut self, statement: Statement<'_>) -> Result<(), ColonyFileError> {
        let unknown = || ColonyFileError::UnknownStatement {
            line: statement.line,
            statement: statement.text.to_string(),
        };
        let (keyword, inner) = split_call(statement.text).ok_or_else(unknown)?;
        let section = Section::from_keyword(keyword).ok_or_else(unknown)?;

        match self.section {
            None if section != Section::Settlers => return Err(ColonyFileError::SettlersFirst),
            None => self.section = Some(section),
            Some(current) if current == section => {}
            Some(current) if current.may_precede(section) => {
                if current == Section::Resources {
                    self.close_resources()?;
                }
                self.section = Some(section);
            }
            Some(_) => {
                return Err(ColonyFileError::Misplaced {
                    line: statement.line,
                    statement: statement.text.to_string(),
                })
            }
        }

        let invalid = || ColonyFileError::InvalidArgument {
            line: statement.line,
            keyword: section.keyword(),
            statement: statement.text.to_string(),
        };
        let args = arguments(inner).ok_or_else(invalid)?;
        let rejected = |source: ColonyError| ColonyFileError::Rejected {
            line: statement.line,
            source,
        };

        match section {
            Section::Settlers => match args.as_slice() {
                [name] => {
                    self.settlers.insert(name.to_string());
                }
                _ => return Err(invalid()),
            },
            Section::Resources => match args.as_slice() {
                [name] => {
                    let resource = Resource::new(*name).map_err(rejected)?;
                    self.resources.insert(name.to_string(), resource);
                }
                _ => return Err(invalid()),
            },
            Section::Adversaries => match args.as_slice() {
                [a, b] => {
                    self.colony()?.set_adversary(a, b).map_err(rejected)?;
                    self.adversary_pairs += 1;
                }
                _ => return Err(invalid()),
            },
            Section::Preferences => {
                if args.len() < 2 {
                    return Err(invalid());
                }
                let colony = self.colony()?;
                let expected = colony.resource_count() + 1;
                if args.len() != expected {
                    return Err(ColonyFileError::PreferenceCount {
                        line: statement.line,
                        expected,
                        actual: args.len(),
                        statement: statement.text.to_string(),
                    });
                }
                colony
                    .set_preferences(args[0], &args[1..])
                    .map_err(rejected)?;
            }
        }
        Ok(())
    }

    /// Builds the simulation once every resource has been declared.
    fn close_resources(&mut self) -> Result<(), ColonyFileError> {
        if self.settlers.len() != self.resources.len() {
            return Err(ColonyFileError::CountMismatch {
                settlers: self.settlers.len(),
                resources: self.resources.len(),
            });
        }
        let settlers = std::mem::take(&mut self.settlers);
        let resources = std::mem::take(&mut self.resources);
        self.simulation = Some(Simulation::from_entities(
            settlers.into_iter().map(Settler::new),
            resources.into_values(),
        ));
        Ok(())
    }

    fn colony(&mut self) -> Result<&mut Simulation, ColonyFileError> {
        self.simulation
            .as_mut()
            .ok_or(ColonyFileError::SettlersFirst)
    }

    fn finish(mut self) -> Result<Simulation, ColonyFileError> {
        match self.section {
            None => return Err(ColonyFileError::SettlersFirst),
            Some(Section::Settlers | Section::Resources) => self.close_resources()?,
            Some(_) => {}
        }
        let simulation = self.simulation.ok_or(ColonyFileError::SettlersFirst)?;

        validate_colony(&simulation).map_err(|errors| {
            ColonyFileError::Unstable(errors.into_iter().map(|e| e.message).collect())
        })?;
        info!(
            settlers = simulation.settler_count(),
            adversary_pairs = self.adversary_pairs,
            "colony loaded"
        );
        Ok(simulation)
    }
}

/// Parses a colony from its textual form.
///
/// # Errors
/// The first [`ColonyFileError`] met, in file order; a colony that parses
/// but is not stable yields [`ColonyFileError::Unstable`].
pub fn parse_colony(source: &str) -> Result<Simulation, ColonyFileError> {
    let mut loader = Loader::default();
    for statement in statements(source) {
        loader.feed(statement)?;
    }
    loader.finish()
}

/// Reads and parses the colony file at `path`.
pub fn read_colony(path: impl AsRef<Path>) -> Result<Simulation, ColonyFileError> {
    let source = fs::read_to_string(path)?;
    parse_colony(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRECT: &str = "\
colon(Dark Vador).
colon(Dartagnan).
colon(Zoooooo).
colon(Tartatin).
ressource(Pomme).
ressource(Big Mac).
ressource(Tarte au citron).
ressource(Orange).
deteste(Dark Vador,Dartagnan).
deteste(Dark Vador,Zoooooo).
deteste(Dark Vador,Tartatin).
preferences(Dark Vador,Big Mac,Tarte au citron,Orange,Pomme).
preferences(Dartagnan,Big Mac,Orange,Tarte au citron,Pomme).
preferences(Tartatin,Pomme,Tarte au citron,Big Mac,Orange).
preferences(Zoooooo,Pomme,Big Mac,Orange,Tarte au citron).
";

    #[test]
    fn test_parse_correct_colony() {
        let sim = parse_colony(CORRECT).unwrap();
        assert_eq!(sim.settler_count(), 4);
        assert_eq!(sim.resource_count(), 4);
        assert!(sim.check_stable());
        assert!(sim.settlers().all(|s| s.preferences().len() == 4));

        let vador = sim.settler("Dark Vador").unwrap();
        assert_eq!(vador.adversaries().len(), 3);
        assert_eq!(vador.preferences()[0], "Big Mac");
        assert!(sim.settler("Tartatin").unwrap().detests("Dark Vador"));
        assert!(sim.resource("Tarte au citron").is_some());
    }

    #[test]
    fn test_missing_terminator() {
        let source = CORRECT.replacen("colon(Tartatin).", "colon(Tartatin)", 1);
        let err = parse_colony(&source).unwrap_err();
        assert!(matches!(err, ColonyFileError::UnknownStatement { line: 4, .. }));
        assert_eq!(
            err.to_string(),
            "At line 4 : Unknown method colon(Tartatin)\nressource(Pomme)"
        );
    }

    #[test]
    fn test_unknown_keyword() {
        let source = CORRECT.replacen("deteste(Dark Vador,Zoooooo)", "hello(Dark Vador,Zoooooo)", 1);
        let err = parse_colony(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At line 10 : Unknown method hello(Dark Vador,Zoooooo)"
        );
    }

    #[test]
    fn test_invalid_argument() {
        let source = CORRECT.replacen("ressource(Pomme)", "ressource(Pomme, 1, 2, 4)", 1);
        let err = parse_colony(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At line 5 : Invalid argument 'ressource(Pomme, 1, 2, 4)' is incorrect for ressource()"
        );
    }

    #[test]
    fn test_names_are_ascii() {
        let err = parse_colony("colon(Zoë).").unwrap_err();
        assert!(matches!(
            err,
            ColonyFileError::InvalidArgument { line: 1, keyword: "colon", .. }
        ));
        assert!(parse_colony("colon(Big Mac_2). ressource(R1). preferences(Big Mac_2,R1).").is_ok());
    }

    #[test]
    fn test_settlers_first() {
        let source = "\
ressource(Pomme).
ressource(Orange).
colon(A).
colon(B).
";
        let err = parse_colony(source).unwrap_err();
        assert_eq!(err.to_string(), "Settlers should be defined first");
        assert!(matches!(parse_colony("  \n"), Err(ColonyFileError::SettlersFirst)));
    }

    #[test]
    fn test_misplaced_statement() {
        let source = CORRECT.replacen(
            "deteste(Dark Vador,Tartatin).",
            "deteste(Dark Vador,Tartatin).\ncolon(Intrus).",
            1,
        );
        let err = parse_colony(&source).unwrap_err();
        assert!(matches!(err, ColonyFileError::Misplaced { line: 12, .. }));
        assert!(err.to_string().ends_with(": this method should not be there!"));
    }

    #[test]
    fn test_extra_preference_argument() {
        let source = CORRECT.replacen(
            "preferences(Dark Vador,Big Mac,Tarte au citron,Orange,Pomme)",
            "preferences(Dark Vador,Big Mac,Tarte au citron,Orange,Pomme,More)",
            1,
        );
        let err = parse_colony(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At line 12 : Extra 1 argument(s) for preferences(Dark Vador,Big Mac,Tarte au citron,Orange,Pomme,More)"
        );
    }

    #[test]
    fn test_missing_preference_argument() {
        let source = CORRECT.replacen(
            "preferences(Dartagnan,Big Mac,Orange,Tarte au citron,Pomme)",
            "preferences(Dartagnan,Big Mac,Orange)",
            1,
        );
        let err = parse_colony(&source).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("At line 13 : Missing 2 argument(s) for"));
    }

    #[test]
    fn test_count_mismatch() {
        let source = CORRECT.replacen("ressource(Big Mac).\n", "", 1);
        let err = parse_colony(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number of resources must equal number of settlers, but there are 4 distinct names for 3 distinct resources"
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let source = "\
colon(A).
colon(A).
colon(B).
ressource(X).
ressource(Y).
ressource(Y).
preferences(A,X,Y).
preferences(B,Y,X).
";
        let sim = parse_colony(source).unwrap();
        assert_eq!(sim.settler_count(), 2);
        assert_eq!(sim.resource_count(), 2);
    }

    #[test]
    fn test_rejected_statement_reports_line() {
        let source = CORRECT.replacen("deteste(Dark Vador,Zoooooo)", "deteste(Dark Vador,Nobody)", 1);
        let err = parse_colony(&source).unwrap_err();
        match err {
            ColonyFileError::Rejected { line, source } => {
                assert_eq!(line, 10);
                assert_eq!(source, ColonyError::unknown_settler("Nobody"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unstable_without_preferences() {
        let source = "colon(A). colon(B). ressource(X). ressource(Y). preferences(A,X,Y).";
        let err = parse_colony(source).unwrap_err();
        match err {
            ColonyFileError::Unstable(problems) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("'B'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_statement_lines() {
        let found = statements("a(x).\n\n  b(y)\n.c(z)");
        let lines: Vec<(usize, &str)> = found.iter().map(|s| (s.line, s.text)).collect();
        assert_eq!(lines, vec![(1, "a(x)"), (3, "b(y)"), (4, "c(z)")]);
    }

    #[test]
    fn test_read_colony_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colony.txt");
        fs::write(&path, CORRECT).unwrap();
        let sim = read_colony(&path).unwrap();
        assert_eq!(sim.settler_count(), 4);

        assert!(matches!(
            read_colony(dir.path().join("missing.txt")),
            Err(ColonyFileError::Io(_))
        ));
    }
}
