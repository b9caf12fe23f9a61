use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::option::VoteOption;
use crate::validator::{Validateable, ValidationResult};

/// Returns every ballot in violation of a rule.
pub type OffendersFn<B> =
    dyn Fn(&[B], &HashSet<Constituent>, &[VoteOption]) -> Vec<B> + Send + Sync;

/// Describes why a single offending ballot broke a rule.
pub type MessageFn<B> = dyn Fn(&B, &[VoteOption]) -> String + Send + Sync;

/// A rule built out of two closures: one finding the offending ballots, one
/// describing each offence.
///
/// Equality only looks at the `id`.
pub struct GenericValidator<B: Ballot> {
    id: String,
    name: String,
    offenders: Arc<OffendersFn<B>>,
    message: Arc<MessageFn<B>>,
}

impl<B: Ballot> GenericValidator<B> {
    pub fn new<O, M>(id: impl Into<String>, name: impl Into<String>, offenders: O, message: M) -> Self
    where
        O: Fn(&[B], &HashSet<Constituent>, &[VoteOption]) -> Vec<B> + Send + Sync + 'static,
        M: Fn(&B, &[VoteOption]) -> String + Send + Sync + 'static,
    {
        GenericValidator {
            id: id.into(),
            name: name.into(),
            offenders: Arc::new(offenders),
            message: Arc::new(message),
        }
    }

    /// All the constituents that have not cast a ballot, as placeholder ballots.
    pub fn everyone_has_voted() -> Self {
        GenericValidator::new(
            "EveryoneVoted",
            "All verified users are required to vote",
            |ballots: &[B], constituents: &HashSet<Constituent>, _: &[VoteOption]| {
                let voters: HashSet<&str> = ballots
                    .iter()
                    .map(|b| b.constituent().identifier.as_str())
                    .collect();
                let mut missing: Vec<&Constituent> = constituents
                    .iter()
                    .filter(|c| !voters.contains(c.identifier.as_str()))
                    .collect();
                missing.sort_by(|a, b| a.identifier.cmp(&b.identifier));
                missing
                    .into_iter()
                    .map(|c| B::placeholder(c.clone()))
                    .collect()
            },
            |ballot: &B, _: &[VoteOption]| format!("{} hasn't voted", ballot.constituent().identifier),
        )
    }

    /// All the ballots should be for at least one of the options.
    pub fn no_blank_votes() -> Self {
        GenericValidator::new(
            "NoBlanks",
            "No blank votes",
            |ballots: &[B], _: &HashSet<Constituent>, _: &[VoteOption]| {
                ballots.iter().filter(|b| b.is_blank()).cloned().collect()
            },
            |ballot: &B, _: &[VoteOption]| format!("{} voted blank", ballot.constituent().identifier),
        )
    }

    pub fn all_validators() -> Vec<Self> {
        vec![Self::everyone_has_voted(), Self::no_blank_votes()]
    }

    /// Looks up one of the standard rules by id.
    pub fn by_id(id: &str) -> Option<Self> {
        Self::all_validators().into_iter().find(|v| v.id == id)
    }
}

impl<B: Ballot> Validateable<B> for GenericValidator<B> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(
        &self,
        ballots: &[B],
        constituents: &HashSet<Constituent>,
        options: &[VoteOption],
    ) -> ValidationResult {
        let offenders = (self.offenders)(ballots, constituents, options);
        let errors = offenders
            .iter()
            .map(|b| (self.message)(b, options))
            .collect();
        self.make_result(errors)
    }
}

impl<B: Ballot> Clone for GenericValidator<B> {
    fn clone(&self) -> Self {
        GenericValidator {
            id: self.id.clone(),
            name: self.name.clone(),
            offenders: Arc::clone(&self.offenders),
            message: Arc::clone(&self.message),
        }
    }
}

impl<B: Ballot> PartialEq for GenericValidator<B> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<B: Ballot> Eq for GenericValidator<B> {}

impl<B: Ballot> Debug for GenericValidator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericValidator")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
