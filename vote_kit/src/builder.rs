use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::error::*;
use crate::option::VoteOption;
use crate::validator::{dedup_by_id, non_uniques, GenericValidator};
use crate::vote::{Vote, VoteState};

/// A builder for setting up a vote.
///
/// ```
/// use vote_kit::{Constituent, GenericValidator, SimpleMajority, SimpleMajorityBallot, Vote, VoteOption};
/// # use vote_kit::BallotError;
///
/// let yes = VoteOption::new("Yes");
/// let vote: SimpleMajority = Vote::builder("Budget 2024")
///     .options(vec![yes.clone(), VoteOption::new("No")])
///     .constituents(vec![Constituent::new("alice"), Constituent::new("bob")])
///     .generic_validators(vec![GenericValidator::everyone_has_voted()])
///     .build()?;
///
/// vote.add_ballot(SimpleMajorityBallot::new("alice".into(), Some(yes)))?;
///
/// # Ok::<(), BallotError>(())
/// ```
pub struct VoteBuilder<B: Ballot> {
    pub(crate) _id: Option<Uuid>,
    pub(crate) _name: String,
    pub(crate) _options: Vec<VoteOption>,
    pub(crate) _constituents: HashSet<Constituent>,
    pub(crate) _ballots: Vec<B>,
    pub(crate) _custom_data: BTreeMap<String, String>,
    pub(crate) _generic_validators: Vec<GenericValidator<B>>,
    pub(crate) _method_validators: Option<Vec<B::MethodValidator>>,
}

impl<B: Ballot> VoteBuilder<B> {
    pub fn new(name: impl Into<String>) -> VoteBuilder<B> {
        VoteBuilder {
            _id: None,
            _name: name.into(),
            _options: Vec::new(),
            _constituents: HashSet::new(),
            _ballots: Vec::new(),
            _custom_data: BTreeMap::new(),
            _generic_validators: Vec::new(),
            _method_validators: None,
        }
    }

    /// Reuses a known id instead of a fresh one.
    pub fn id(self, id: Uuid) -> VoteBuilder<B> {
        VoteBuilder {
            _id: Some(id),
            ..self
        }
    }

    pub fn options(self, options: Vec<VoteOption>) -> VoteBuilder<B> {
        VoteBuilder {
            _options: options,
            ..self
        }
    }

    /// Options with only a name.
    pub fn option_names(self, names: &[&str]) -> VoteBuilder<B> {
        self.options(names.iter().map(|n| VoteOption::new(*n)).collect())
    }

    /// The eligible voters. A later constituent replaces a former one with the
    /// same identifier.
    pub fn constituents(mut self, constituents: Vec<Constituent>) -> VoteBuilder<B> {
        for c in constituents {
            self._constituents.retain(|x| !x.same_identifier(&c));
            self._constituents.insert(c);
        }
        self
    }

    pub fn ballots(self, ballots: Vec<B>) -> VoteBuilder<B> {
        VoteBuilder {
            _ballots: ballots,
            ..self
        }
    }

    pub fn custom_data(mut self, key: impl Into<String>, value: impl Into<String>) -> VoteBuilder<B> {
        self._custom_data.insert(key.into(), value.into());
        self
    }

    pub fn generic_validators(self, validators: Vec<GenericValidator<B>>) -> VoteBuilder<B> {
        VoteBuilder {
            _generic_validators: dedup_by_id::<B, _>(validators),
            ..self
        }
    }

    /// Overrides the default rules of the voting method.
    pub fn method_validators(self, validators: Vec<B::MethodValidator>) -> VoteBuilder<B> {
        VoteBuilder {
            _method_validators: Some(dedup_by_id::<B, _>(validators)),
            ..self
        }
    }

    /// Fails if several ballots were given for the same constituent.
    pub fn build(self) -> Result<Vote<B>, BallotError> {
        let mut identifiers: Vec<String> =
            non_uniques(self._ballots.iter().map(|b| b.constituent().identifier.as_str()))
                .into_iter()
                .map(|s| s.to_string())
                .collect();
        identifiers.sort();
        if !identifiers.is_empty() {
            return DuplicateBallotsSnafu { identifiers }.fail();
        }
        Ok(Vote::new(VoteState {
            id: self._id.unwrap_or_else(Uuid::new_v4),
            name: self._name,
            options: self._options,
            constituents: self._constituents,
            ballots: self._ballots,
            custom_data: self._custom_data,
            generic_validators: self._generic_validators,
            method_validators: self
                ._method_validators
                .unwrap_or_else(B::default_method_validators),
        }))
    }
}
