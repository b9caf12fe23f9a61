use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use vote_kit::*;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::runner::config_reader::*;
use crate::runner::io_common::*;

pub mod config_reader;
pub mod io_common;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Error reading file {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Missing parent directory for {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("No ballot file: use --input or 'ballotsFile' in the configuration"))]
    MissingInput,
    #[snafu(display("Unknown voting method {name:?}"))]
    UnknownMethod { name: String },
    #[snafu(display("Unknown CSV preset {name:?}"))]
    UnknownPreset { name: String },
    #[snafu(display("Unknown validator {id:?}"))]
    UnknownValidator { id: String },
    #[snafu(display("Could not read the ballots in {path}: {source}"))]
    ReadingBallots { source: CsvError, path: String },
    #[snafu(display("Could not read the constituents in {path}: {source}"))]
    ReadingConstituents {
        source: DecodeConstituentError,
        path: String,
    },
    #[snafu(display("Could not write the constituents to {path}: {source}"))]
    WritingConstituents { source: CsvError, path: String },
    #[snafu(display("The ballots are for the options {found:?}, expected {expected:?}"))]
    OptionMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[snafu(display("Could not count the ballots: {source}"))]
    Counting { source: CountError },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch,
}

pub type CliResult<T> = Result<T, CliError>;

/// The parts of a run that depend on the voting method.
trait Tabulate: Ballot {
    fn method_validator(id: &str) -> Option<Self::MethodValidator>;

    fn results_js(vote: &Vote<Self>, force: bool) -> CliResult<JSValue>;
}

impl Tabulate for SimpleMajorityBallot {
    fn method_validator(id: &str) -> Option<SimpleMajorityValidator> {
        SimpleMajorityValidator::by_id(id)
    }

    fn results_js(vote: &SimpleMajority, force: bool) -> CliResult<JSValue> {
        let tally = vote.count(force).context(CountingSnafu)?;
        let winner = vote.find_winner(force).context(CountingSnafu)?;
        let tally_js: BTreeMap<&str, u64> =
            tally.iter().map(|(o, c)| (o.name.as_str(), *c)).collect();
        let winners: Vec<&str> = winner
            .winners()
            .into_iter()
            .map(|o| o.name.as_str())
            .collect();
        Ok(json!({
            "tally": tally_js,
            "winners": winners,
            "tie": winner.is_tie(),
        }))
    }
}

impl Tabulate for YesNoBallot {
    fn method_validator(id: &str) -> Option<YesNoValidator> {
        YesNoValidator::by_id(id)
    }

    fn results_js(vote: &YesNo, force: bool) -> CliResult<JSValue> {
        let tally = vote.count(force).context(CountingSnafu)?;
        let tally_js: BTreeMap<&str, &YesNoTally> =
            tally.iter().map(|(o, t)| (o.name.as_str(), t)).collect();
        Ok(json!({ "tally": tally_js }))
    }
}

/// The command line merged over the configuration file.
#[derive(Debug, Clone)]
struct Settings {
    name: Option<String>,
    method: MethodName,
    csv: CsvConfiguration,
    ballots_path: String,
    constituents_path: Option<String>,
    validators: Vec<String>,
    method_validators: Option<Vec<String>>,
    max_name_length: usize,
    options: Vec<String>,
    force: bool,
}

impl Settings {
    fn new(args: &Args, config_path: Option<&str>, config: ElectionConfig) -> CliResult<Settings> {
        let in_config_dir = |p: &str| match config_path {
            Some(cp) => relative_to(cp, p),
            None => Ok(p.to_string()),
        };

        let method = match args.method.as_deref() {
            Some(m) => MethodName::from_name(m)?,
            None => config.method.unwrap_or(MethodName::SimpleMajority),
        };

        let csv = match (args.csv_preset.as_deref(), config.csv_configuration) {
            (Some(name), _) => preset(name)?,
            (None, Some(c)) => c,
            (None, None) => match config.csv_preset.as_deref() {
                Some(name) => preset(name)?,
                None => CsvConfiguration::default_configuration(),
            },
        };

        let ballots_path = match (args.input.as_deref(), config.ballots_file.as_deref()) {
            (Some(p), _) => p.to_string(),
            (None, Some(p)) => in_config_dir(p)?,
            (None, None) => return MissingInputSnafu.fail(),
        };

        let constituents_path = match (args.constituents.as_deref(), config.constituents_file.as_deref()) {
            (Some(p), _) => Some(p.to_string()),
            (None, Some(p)) => Some(in_config_dir(p)?),
            (None, None) => None,
        };

        let validators = if args.validators.is_empty() {
            config.validators
        } else {
            args.validators.clone()
        };
        let method_validators = if args.method_validators.is_empty() {
            config.method_validators
        } else {
            Some(args.method_validators.clone())
        };

        Ok(Settings {
            name: config.name,
            method,
            csv,
            ballots_path,
            constituents_path,
            validators,
            method_validators,
            max_name_length: args
                .max_name_length
                .or(config.max_name_length)
                .unwrap_or(DEFAULT_MAX_NAME_LENGTH),
            options: config.options,
            force: args.force,
        })
    }
}

fn preset(name: &str) -> CliResult<CsvConfiguration> {
    CsvConfiguration::preset(name).context(UnknownPresetSnafu { name })
}

/// The option names of the ballot file must be the configured ones, if any.
fn check_options(expected: &[String], options: &[VoteOption]) -> CliResult<()> {
    if expected.is_empty() {
        return Ok(());
    }
    let expected: BTreeSet<&str> = expected.iter().map(|s| s.as_str()).collect();
    let found: BTreeSet<&str> = options.iter().map(|o| o.name.as_str()).collect();
    ensure!(
        expected == found && found.len() == options.len(),
        OptionMismatchSnafu {
            expected: expected.iter().map(|s| s.to_string()).collect::<Vec<String>>(),
            found: options.iter().map(|o| o.name.clone()).collect::<Vec<String>>(),
        }
    );
    Ok(())
}

fn run_vote<B: Tabulate>(settings: &Settings, args: &Args) -> CliResult<JSValue> {
    let contents = read_file(&settings.ballots_path)?;
    let vote: Vote<B> = Vote::from_csv(&settings.csv, &contents).context(ReadingBallotsSnafu {
        path: settings.ballots_path.as_str(),
    })?;
    if let Some(name) = settings.name.as_ref() {
        vote.set_name(name.clone());
    }
    check_options(&settings.options, &vote.options())?;

    if let Some(path) = settings.constituents_path.as_deref() {
        let roster = constituents_from_csv(
            &read_file(path)?,
            Some(&settings.csv),
            settings.max_name_length,
        )
        .context(ReadingConstituentsSnafu { path })?;
        info!("Read {} constituents from {:?}", roster.len(), path);
        vote.set_constituents(roster.into_iter().collect());
    }

    let generic = settings
        .validators
        .iter()
        .map(|id| GenericValidator::by_id(id).context(UnknownValidatorSnafu { id }))
        .collect::<CliResult<Vec<GenericValidator<B>>>>()?;
    vote.set_generic_validators(generic);
    if let Some(ids) = settings.method_validators.as_ref() {
        let method = ids
            .iter()
            .map(|id| B::method_validator(id).context(UnknownValidatorSnafu { id }))
            .collect::<CliResult<Vec<B::MethodValidator>>>()?;
        vote.set_method_validators(method);
    }

    let validation = vote.validate();
    for r in validation.iter().filter(|r| r.has_errors()) {
        for e in r.iter() {
            warn!("{}: {}", r.name, e);
        }
    }
    debug!("validation: {:?}", validation);

    let results = B::results_js(&vote, settings.force)?;
    info!("results: {}", results);

    if let Some(path) = args.export_constituents.as_deref() {
        let csv = constituents_to_csv(&vote.constituents(), &settings.csv)
            .context(WritingConstituentsSnafu { path })?;
        write_output(path, &csv)?;
    }

    Ok(json!({
        "config": {
            "name": vote.name(),
            "method": vote.type_name(),
            "csvConfiguration": settings.csv.name(),
            "ballots": vote.with_state(|s| s.ballots.len()),
            "constituents": vote.with_state(|s| s.constituents.len()),
        },
        "validation": validation,
        "results": results,
    }))
}

/// Runs an election from the command line arguments and returns its summary.
pub fn run_election(args: &Args) -> CliResult<JSValue> {
    let config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => ElectionConfig::default(),
    };
    let settings = Settings::new(args, args.config.as_deref(), config)?;
    info!("settings: {:?}", settings);

    let summary = match settings.method {
        MethodName::SimpleMajority => run_vote::<SimpleMajorityBallot>(&settings, args)?,
        MethodName::YesNo => run_vote::<YesNoBallot>(&settings, args)?,
    };

    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(SerializingJsonSnafu)?;
    if let Some(out) = args.out.as_deref() {
        write_output(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_deref() {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu)?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            return ReferenceMismatchSnafu.fail();
        }
    }

    Ok(summary)
}
