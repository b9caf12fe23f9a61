use std::collections::HashSet;

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::option::VoteOption;
use crate::validator::{non_uniques, Validateable, ValidationResult};

/// Fails if no ballot has been cast.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct AtLeastOneVote;

impl<B: Ballot> Validateable<B> for AtLeastOneVote {
    fn id(&self) -> &str {
        "AtLeastOneVote"
    }

    fn name(&self) -> &str {
        "At least one vote"
    }

    fn validate(
        &self,
        ballots: &[B],
        _constituents: &HashSet<Constituent>,
        _options: &[VoteOption],
    ) -> ValidationResult {
        let errors = if ballots.is_empty() {
            vec!["No votes cast".to_string()]
        } else {
            vec![]
        };
        Validateable::<B>::make_result(self, errors)
    }
}

/// Fails for every ballot whose owner cast more than one ballot.
///
/// All the occurrences are reported, including the first one.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct OneVotePerConstituent;

impl<B: Ballot> Validateable<B> for OneVotePerConstituent {
    fn id(&self) -> &str {
        "OneVotePerUser"
    }

    fn name(&self) -> &str {
        "One vote per user"
    }

    fn validate(
        &self,
        ballots: &[B],
        _constituents: &HashSet<Constituent>,
        _options: &[VoteOption],
    ) -> ValidationResult {
        let duplicated = non_uniques(ballots.iter().map(|b| b.constituent().identifier.as_str()));
        let errors = ballots
            .iter()
            .map(|b| b.constituent().identifier.as_str())
            .filter(|id| duplicated.contains(id))
            .map(|id| format!("{} voted multiple times", id))
            .collect();
        Validateable::<B>::make_result(self, errors)
    }
}
