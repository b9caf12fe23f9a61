use clap::Parser;

/// Validates and tallies the ballots of a vote.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON description of the election. Command line options override its values.
    /// See the manual of the vote_kit library for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The ballots, as a CSV file. Overrides 'ballotsFile' in the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) The list of eligible constituents, as a CSV file. Overrides 'constituentsFile'.
    #[clap(long, value_parser)]
    pub constituents: Option<String>,

    /// (default simpleMajority) The voting method: simpleMajority or yesNo.
    #[clap(short, long, value_parser)]
    pub method: Option<String>,

    /// (default 'Default') The name of the CSV layout: 'Default', 'S/M-Kid', 'Default with tags' or 'Only ids'.
    #[clap(long, value_parser)]
    pub csv_preset: Option<String>,

    /// (repeatable) The id of a generic rule to apply: EveryoneVoted or NoBlanks.
    #[clap(long, value_parser)]
    pub validators: Vec<String>,

    /// (repeatable) The id of a rule of the voting method. Replaces the default rules of the method.
    #[clap(long, value_parser)]
    pub method_validators: Vec<String>,

    /// (default 100) The maximum length of the names, identifiers, tags and emails of the constituents.
    #[clap(long, value_parser)]
    pub max_name_length: Option<usize>,

    /// If passed as an argument, the ballots are counted even if they do not pass validation.
    #[clap(long, takes_value = false)]
    pub force: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of an election in JSON format. If provided, votekit will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, the constituents of the vote are written there as CSV.
    #[clap(long, value_parser)]
    pub export_constituents: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
