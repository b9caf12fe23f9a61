// Rules that decide whether a collection of ballots may be counted.

mod generic;
mod result;
mod structural;

use std::collections::{HashMap, HashSet};

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::option::VoteOption;

pub use generic::{GenericValidator, MessageFn, OffendersFn};
pub use result::{ValidationErrors, ValidationResult, ValidationResults};
pub use structural::{AtLeastOneVote, OneVotePerConstituent};

/// A single validation rule for ballots of type `B`.
///
/// Two rules are the same rule when they share the same `id`. The behaviour
/// they wrap is never compared.
pub trait Validateable<B: Ballot>: Send + Sync {
    /// Stable key of the rule.
    fn id(&self) -> &str;

    /// A name for use in user interfaces.
    fn name(&self) -> &str;

    fn validate(
        &self,
        ballots: &[B],
        constituents: &HashSet<Constituent>,
        options: &[VoteOption],
    ) -> ValidationResult;

    fn make_result(&self, errors: Vec<String>) -> ValidationResult {
        ValidationResult::new(self.name(), errors)
    }
}

/// Removes the rules whose id was already seen, keeping the first occurrence.
pub fn dedup_by_id<B: Ballot, V: Validateable<B>>(validators: Vec<V>) -> Vec<V> {
    let mut seen: HashSet<String> = HashSet::new();
    validators
        .into_iter()
        .filter(|v| seen.insert(v.id().to_string()))
        .collect()
}

/// The elements that occur more than once.
pub(crate) fn non_uniques<'a, I>(items: I) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter_map(|(item, count)| if count > 1 { Some(item) } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_uniques_finds_repeated_items() {
        let res = non_uniques(vec!["a", "b", "a", "c", "c", "c"]);
        let expected: HashSet<&str> = ["a", "c"].into_iter().collect();
        assert_eq!(res, expected);
        assert!(non_uniques(Vec::<&str>::new()).is_empty());
    }
}
