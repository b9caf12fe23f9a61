use std::fmt::Debug;

use crate::constituent::Constituent;
use crate::csv::CsvConfiguration;
use crate::option::VoteOption;
use crate::validator::Validateable;

/// The response of one constituent for a given voting method.
///
/// Every voting method provides its own ballot shape. The generic
/// [`Vote`](crate::Vote) aggregate, the validators and the CSV codec only
/// interact with ballots through this trait.
pub trait Ballot: Clone + Debug + Send + Sync + Sized + 'static {
    /// The rules that only make sense for this voting method.
    type MethodValidator: Validateable<Self> + Clone + Debug + PartialEq + 'static;

    /// Human readable name of the voting method.
    const METHOD_NAME: &'static str;

    /// The constituent who cast this ballot.
    fn constituent(&self) -> &Constituent;

    /// A ballot for a constituent that has not voted yet.
    /// Mostly used by validators to report missing voters.
    fn placeholder(constituent: Constituent) -> Self;

    fn is_blank(&self) -> bool;

    /// Decodes the option cells of a single CSV row.
    ///
    /// `values` holds one trimmed cell per entry of `options`, in the same order.
    /// Returns `None` when the row cannot be understood.
    fn from_csv_line(
        config: &CsvConfiguration,
        values: &[&str],
        options: &[VoteOption],
        constituent: Constituent,
    ) -> Option<Self>;

    /// Encodes the choice made for `option` as a single CSV cell.
    /// The result must not contain a comma.
    fn csv_value_for(&self, config: &CsvConfiguration, option: &VoteOption) -> String;

    /// Method rules applied when none are configured explicitly.
    fn default_method_validators() -> Vec<Self::MethodValidator> {
        Vec::new()
    }
}
