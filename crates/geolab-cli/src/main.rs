//! `geolab` command-line front end
//!
//! Reads tests as JSON, prints reductions, series, alignments and checks, and
//! applies status transitions against an optional persisted transition log.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use geolab_core::{
    align, check, compute_readiness, Actor, ComparisonSelection, LabConfig, LogEntry, Role,
    Status, Test, TestId, TransitionLog, TransitionOutcome, UserId, Workflow,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let input_arg = || {
        Arg::new("input")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("JSON file holding an array of tests")
    };

    Command::new("geolab")
        .version(geolab_core::VERSION)
        .about("Soil laboratory test reduction, comparison and approval")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Laboratory configuration (TOML)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("reduce")
                .about("Recompute every derived field")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("series")
                .about("Print the chart series of each test")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("align")
                .about("Align tests of one type on a shared axis")
                .arg(input_arg())
                .arg(
                    Arg::new("ids")
                        .long("ids")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(i64))
                        .help("Tests to compare, in order (default: all)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run plausibility and readiness checks")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("advance")
                .about("Change the status of one test")
                .arg(input_arg())
                .arg(
                    Arg::new("test")
                        .long("test")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Test identifier"),
                )
                .arg(
                    Arg::new("user")
                        .long("user")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Acting user identifier"),
                )
                .arg(
                    Arg::new("role")
                        .long("role")
                        .required(true)
                        .value_parser(["admin", "lab-chief", "engineer", "technician"])
                        .help("Acting user role"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_parser(["draft", "in-progress", "completed", "validated"])
                        .help("Target status (default: next)"),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .value_parser(value_parser!(PathBuf))
                        .help("Transition log to extend (JSON, created if missing)"),
                ),
        )
        .subcommand(
            Command::new("verify-log")
                .about("Verify a persisted transition log")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file holding log entries"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<LabConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => LabConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(LabConfig::default()),
    }
}

fn read_tests(path: &Path) -> Result<Vec<Test>> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing tests in {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_log(path: &Path) -> Result<TransitionLog> {
    if !path.exists() {
        return Ok(TransitionLog::new());
    }
    let source =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<LogEntry> = serde_json::from_str(&source)
        .with_context(|| format!("parsing log entries in {}", path.display()))?;
    let log = TransitionLog::from_entries(entries);
    log.verify_integrity()
        .with_context(|| format!("verifying {}", path.display()))?;
    Ok(log)
}

fn write_log(path: &Path, log: &TransitionLog) -> Result<()> {
    let json = serde_json::to_string_pretty(&log.entries())?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn input(args: &ArgMatches) -> Result<Vec<Test>> {
    let path = args
        .get_one::<PathBuf>("input")
        .context("missing input file")?;
    read_tests(path)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckSummary {
    test: String,
    readiness: geolab_core::Readiness,
    plausibility: geolab_core::PlausibilityReport,
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("reduce", args)) => {
            let tests: Vec<Test> = input(args)?
                .into_iter()
                .map(|t| {
                    let points = t.reduced_points();
                    t.with_points(points)
                })
                .collect();
            print_json(&tests)?;
        }
        Some(("series", args)) => {
            let series: Vec<_> = input(args)?.iter().map(Test::series).collect();
            print_json(&series)?;
        }
        Some(("align", args)) => {
            let tests = input(args)?;
            let table = match args.get_many::<i64>("ids") {
                Some(ids) => {
                    let mut selection = ComparisonSelection::from_config(&config);
                    for id in ids {
                        selection.toggle(TestId(*id))?;
                    }
                    selection.align(&tests)?
                }
                None => align(&tests)?,
            };
            print_json(&table)?;
        }
        Some(("check", args)) => {
            let summaries: Vec<CheckSummary> = input(args)?
                .iter()
                .map(|t| CheckSummary {
                    test: t.label(),
                    readiness: compute_readiness(t, &config.bearing),
                    plausibility: check(t, &config.plausibility),
                })
                .collect();
            print_json(&summaries)?;
            return Ok(summaries.iter().all(|s| s.plausibility.is_valid()));
        }
        Some(("advance", args)) => {
            let mut tests = input(args)?;
            let id = TestId(*args.get_one::<i64>("test").context("missing --test")?);
            let user = UserId(*args.get_one::<i64>("user").context("missing --user")?);
            let role: Role = args
                .get_one::<String>("role")
                .context("missing --role")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let Some(test) = tests.iter_mut().find(|t| t.id == Some(id)) else {
                bail!("test {id} not found");
            };
            let target = match args.get_one::<String>("to") {
                Some(s) => s.parse::<Status>().map_err(anyhow::Error::msg)?,
                None => match test.status.next() {
                    Some(next) => next,
                    None => bail!("test {id} is already {}", test.status),
                },
            };

            let log_path = args.get_one::<PathBuf>("log");
            let log = match log_path {
                Some(path) => read_log(path)?,
                None => TransitionLog::new(),
            };
            let workflow = Workflow::new(&log);
            let outcome = workflow.transition(test, &Actor::new(user, role), target)?;
            match (outcome, log_path) {
                (TransitionOutcome::Unchanged, _) => {
                    tracing::info!(test = %id, status = %target, "nothing to do");
                }
                (TransitionOutcome::Applied(_), Some(path)) => write_log(path, &log)?,
                (TransitionOutcome::Applied(_), None) => {}
            }
            print_json(&serde_json::json!({
                "test": test,
                "log": log.entries(),
            }))?;
        }
        Some(("verify-log", args)) => {
            let path = args.get_one::<PathBuf>("path").context("missing log path")?;
            if !path.exists() {
                bail!("{} does not exist", path.display());
            }
            let log = read_log(path)?;
            println!(
                "log valid: {} events, head {}",
                log.len(),
                log.head().unwrap_or_else(|| "-".to_string())
            );
        }
        Some((name, _)) => bail!("unknown subcommand {name}"),
        None => bail!("no subcommand given"),
    }
    Ok(true)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    if !run(&matches)? {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolab_test_utils::{compaction_test, compaction_wet_test};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_tests(tests: &[Test]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(tests).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn reads_tests_from_file() {
        let file = write_tests(&[compaction_test(1, &[(10.0, 1.8)])]);
        let tests = read_tests(file.path()).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].id, Some(TestId(1)));
    }

    #[test]
    fn advance_and_check_run() {
        let file = write_tests(&[compaction_wet_test(4, &[(10.0, 2.2)])]);
        let path = file.path().to_str().unwrap();

        let matches = cli().get_matches_from([
            "geolab", "advance", path, "--test", "4", "--user", "100", "--role", "technician",
        ]);
        assert!(run(&matches).unwrap());

        let matches = cli().get_matches_from(["geolab", "check", path]);
        assert!(run(&matches).unwrap());
    }

    #[test]
    fn advance_extends_persisted_log() {
        let file = write_tests(&[
            compaction_wet_test(4, &[(10.0, 2.2)]),
            compaction_wet_test(5, &[(12.0, 2.24)]),
        ]);
        let path = file.path().to_str().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.json");
        let log_arg = log_path.to_str().unwrap();

        for id in ["4", "5"] {
            let matches = cli().get_matches_from([
                "geolab", "advance", path, "--test", id, "--user", "100", "--role",
                "technician", "--log", log_arg,
            ]);
            assert!(run(&matches).unwrap());
        }

        let log = read_log(&log_path).unwrap();
        assert_eq!(log.len(), 2);
        let entries = log.entries();
        assert_eq!(entries[1].prev_hash, entries[0].hash);

        let matches = cli().get_matches_from(["geolab", "verify-log", log_arg]);
        assert!(run(&matches).unwrap());
    }

    #[test]
    fn tampered_log_is_refused() {
        let file = write_tests(&[compaction_wet_test(4, &[(10.0, 2.2)])]);
        let path = file.path().to_str().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.json");
        let log_arg = log_path.to_str().unwrap();

        let matches = cli().get_matches_from([
            "geolab", "advance", path, "--test", "4", "--user", "100", "--role", "technician",
            "--log", log_arg,
        ]);
        assert!(run(&matches).unwrap());

        let mut entries: Vec<LogEntry> =
            serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
        entries[0].event.to = Status::Validated;
        std::fs::write(&log_path, serde_json::to_string(&entries).unwrap()).unwrap();

        assert!(read_log(&log_path).is_err());
    }

    #[test]
    fn align_refuses_overfull_selection() {
        let file = write_tests(&[compaction_test(1, &[(10.0, 1.8)])]);
        let path = file.path().to_str().unwrap();
        let matches = cli().get_matches_from(["geolab", "align", path, "--ids", "1,2,3,4"]);
        assert!(run(&matches).is_err());
    }
}
