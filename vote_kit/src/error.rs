use snafu::Snafu;

use crate::validator::ValidationErrors;

/// Raised when a [`CsvConfiguration`](crate::CsvConfiguration) is built with
/// an illegal format description.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CsvConfigurationError {
    #[snafu(display("The pre headers are invalid"))]
    InvalidPreHeaders,
    #[snafu(display("The pre values are invalid"))]
    InvalidPreValues,
    #[snafu(display("The option header is invalid"))]
    InvalidOptionHeader,
    #[snafu(display("The number of pre headers and pre values must be the same"))]
    IncompatiblePreHeaderAndValues,
    #[snafu(display("A special key is invalid"))]
    InvalidSpecialKey,
    #[snafu(display("Incompatible special key combination"))]
    IncompatibleSpecialKeyCombination,
}

/// Errors while importing ballots.
///
/// The import is all-or-nothing: any of these aborts the whole file.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CsvError {
    #[snafu(display("The CSV input is empty"))]
    EmptyInput,
    #[snafu(display("Expected more than {expected} header columns, found {found}"))]
    HeaderTooShort { expected: usize, found: usize },
    #[snafu(display("Header column {index} should be {expected:?} but is {found:?}"))]
    PreHeaderMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("The option header template does not split into a prefix and a suffix"))]
    OptionHeaderTemplate,
    #[snafu(display("Could not find an option name in header column {header:?}"))]
    InvalidOptionColumn { header: String },
    #[snafu(display("Expected {expected} columns in a row, found {found}"))]
    ColumnCountMismatch { expected: usize, found: usize },
    #[snafu(display("A row has an empty constituent identifier"))]
    MissingIdentifier,
    #[snafu(display("Could not decode the ballot of {identifier}"))]
    InvalidBallot { identifier: String },
    #[snafu(display("Could not read the CSV input: {message}"))]
    Unreadable { message: String },
    #[snafu(display("Could not write the CSV output: {message}"))]
    Unwritable { message: String },
}

/// Errors while importing a list of constituents.
///
/// `lineno` is the 1-based line in the input, the header being line 1.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeConstituentError {
    #[snafu(display("The file contains forbidden delimiters (';' or tab)"))]
    ForbiddenDelimiter,
    #[snafu(display("The file is empty"))]
    MissingHeader,
    #[snafu(display("Could not read the file: {message}"))]
    UnreadableRoster { message: String },
    #[snafu(display("Unrecognized header {header:?}"))]
    UnknownHeader { header: String },
    #[snafu(display("Too many lines: {count} (maximum {max})"))]
    TooManyLines { count: usize, max: usize },
    #[snafu(display("Line {lineno}: expected {expected} columns, found {found}"))]
    WrongColumnCount {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Line {lineno}: invalid identifier"))]
    InvalidIdentifier { lineno: usize },
    #[snafu(display("Line {lineno}: identifier is too long"))]
    IdentifierTooLong { lineno: usize },
    #[snafu(display("Line {lineno}: name is too long"))]
    NameTooLong { lineno: usize },
    #[snafu(display("Line {lineno}: invalid tag"))]
    InvalidTag { lineno: usize },
    #[snafu(display("Line {lineno}: invalid email"))]
    InvalidEmail { lineno: usize },
}

impl DecodeConstituentError {
    /// The line the error was found on, if it concerns a single row.
    pub fn lineno(&self) -> Option<usize> {
        match self {
            DecodeConstituentError::WrongColumnCount { lineno, .. }
            | DecodeConstituentError::InvalidIdentifier { lineno }
            | DecodeConstituentError::IdentifierTooLong { lineno }
            | DecodeConstituentError::NameTooLong { lineno }
            | DecodeConstituentError::InvalidTag { lineno }
            | DecodeConstituentError::InvalidEmail { lineno } => Some(*lineno),
            DecodeConstituentError::UnknownHeader { .. } => Some(1),
            _ => None,
        }
    }
}

/// Errors that prevent counting from completing.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CountError {
    #[snafu(display("The vote did not pass validation: {source}"))]
    Invalid { source: ValidationErrors },
    #[snafu(display("The ballot of {identifier} refers to the unknown option {option:?}"))]
    UnknownOption { identifier: String, option: String },
    #[snafu(display("The vote has no options"))]
    NoOptions,
}

/// Rejected changes to the ballots of a vote.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BallotError {
    #[snafu(display("{identifier} has already voted"))]
    AlreadyVoted { identifier: String },
    #[snafu(display("Several ballots for the same constituents: {identifiers:?}"))]
    DuplicateBallots { identifiers: Vec<String> },
}
