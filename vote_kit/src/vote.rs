use log::debug;
use snafu::ensure;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::ballot::Ballot;
use crate::builder::VoteBuilder;
use crate::constituent::{Constituent, ConstituentIdentifier};
use crate::error::*;
use crate::option::VoteOption;
use crate::validator::*;

/// The data of a vote: its options, the eligible constituents, the cast
/// ballots and the rules that decide whether the ballots can be counted.
///
/// This is a plain value. [`Vote`] wraps it to serialize access.
#[derive(Debug, Clone)]
pub struct VoteState<B: Ballot> {
    pub id: Uuid,
    pub name: String,
    pub options: Vec<VoteOption>,
    pub constituents: HashSet<Constituent>,
    pub ballots: Vec<B>,
    /// Extra data used by clients.
    pub custom_data: BTreeMap<String, String>,
    pub generic_validators: Vec<GenericValidator<B>>,
    pub method_validators: Vec<B::MethodValidator>,
}

impl<B: Ballot> VoteState<B> {
    /// The state of a vote read from a file: named "Imported vote", with no
    /// generic rules and the default rules of the voting method.
    pub fn imported(
        options: Vec<VoteOption>,
        constituents: HashSet<Constituent>,
        ballots: Vec<B>,
    ) -> VoteState<B> {
        VoteState {
            id: Uuid::new_v4(),
            name: "Imported vote".to_string(),
            options,
            constituents,
            ballots,
            custom_data: BTreeMap::new(),
            generic_validators: Vec::new(),
            method_validators: B::default_method_validators(),
        }
    }

    /// Runs every rule and returns one result per rule, in order: the generic
    /// rules, the method rules, then the structural rules. Nothing is skipped
    /// when an earlier rule fails.
    pub fn validate(&self) -> Vec<ValidationResult> {
        let mut configured: Vec<&dyn Validateable<B>> = Vec::new();
        for v in self.generic_validators.iter() {
            configured.push(v);
        }
        for v in self.method_validators.iter() {
            configured.push(v);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut results: Vec<ValidationResult> = Vec::new();
        for v in configured {
            if seen.insert(v.id()) {
                results.push(v.validate(&self.ballots, &self.constituents, &self.options));
            }
        }
        // Always run, whatever ids the configured rules use.
        let structural: [&dyn Validateable<B>; 2] = [&AtLeastOneVote, &OneVotePerConstituent];
        for v in structural {
            results.push(v.validate(&self.ballots, &self.constituents, &self.options));
        }
        debug!(
            "validate: vote {:?}: {} rules, {} errors",
            self.name,
            results.len(),
            results.count_errors()
        );
        results
    }

    /// Fails with all the results if any rule reported an error.
    pub fn validate_throwing(&self) -> Result<(), ValidationErrors> {
        let results = self.validate();
        if results.has_errors() {
            return Err(ValidationErrors { results });
        }
        Ok(())
    }

    pub fn has_constituent_voted(&self, identifier: &str) -> bool {
        self.ballots
            .iter()
            .any(|b| b.constituent().identifier == identifier)
    }
}

/// A vote, safe to share between threads.
///
/// Every operation takes the lock of this instance for its whole duration, so
/// at most one operation runs against a given vote at a time. Different votes
/// share nothing.
#[derive(Debug)]
pub struct Vote<B: Ballot> {
    state: Mutex<VoteState<B>>,
}

impl<B: Ballot> Vote<B> {
    pub fn new(state: VoteState<B>) -> Vote<B> {
        Vote {
            state: Mutex::new(state),
        }
    }

    pub fn builder(name: impl Into<String>) -> VoteBuilder<B> {
        VoteBuilder::new(name)
    }

    pub fn imported(
        options: Vec<VoteOption>,
        constituents: HashSet<Constituent>,
        ballots: Vec<B>,
    ) -> Vote<B> {
        Vote::new(VoteState::imported(options, constituents, ballots))
    }

    fn lock(&self) -> MutexGuard<'_, VoteState<B>> {
        // The state is only replaced wholesale, a panic cannot leave it half updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` while holding the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&VoteState<B>) -> R) -> R {
        f(&self.lock())
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> VoteState<B> {
        self.lock().clone()
    }

    pub fn into_state(self) -> VoteState<B> {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn type_name(&self) -> &'static str {
        B::METHOD_NAME
    }

    pub fn id(&self) -> Uuid {
        self.lock().id
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().name = name.into();
    }

    pub fn options(&self) -> Vec<VoteOption> {
        self.lock().options.clone()
    }

    pub fn constituents(&self) -> HashSet<Constituent> {
        self.lock().constituents.clone()
    }

    pub fn ballots(&self) -> Vec<B> {
        self.lock().ballots.clone()
    }

    pub fn custom_data(&self) -> BTreeMap<String, String> {
        self.lock().custom_data.clone()
    }

    pub fn set_custom_data(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().custom_data.insert(key.into(), value.into());
    }

    // ********* Validation **********

    pub fn validate(&self) -> Vec<ValidationResult> {
        self.lock().validate()
    }

    pub fn validate_throwing(&self) -> Result<(), ValidationErrors> {
        self.lock().validate_throwing()
    }

    /// Replaces the generic rules. Rules sharing an id are only kept once.
    pub fn set_generic_validators(&self, validators: Vec<GenericValidator<B>>) {
        self.lock().generic_validators = dedup_by_id::<B, _>(validators);
    }

    pub fn set_method_validators(&self, validators: Vec<B::MethodValidator>) {
        self.lock().method_validators = dedup_by_id::<B, _>(validators);
    }

    // ********* Constituents **********

    pub fn has_constituent_voted(&self, identifier: &str) -> bool {
        self.lock().has_constituent_voted(identifier)
    }

    /// Replaces all the constituents.
    pub fn set_constituents(&self, constituents: HashSet<Constituent>) {
        self.lock().constituents = constituents;
    }

    /// Adds a constituent, replacing any former one with the same identifier.
    pub fn add_constituent(&self, constituent: Constituent) {
        let mut state = self.lock();
        replace_constituent(&mut state.constituents, constituent);
    }

    /// Adds several constituents, replacing the former ones with the same identifiers.
    pub fn add_constituents(&self, constituents: impl IntoIterator<Item = Constituent>) {
        let mut state = self.lock();
        for c in constituents {
            replace_constituent(&mut state.constituents, c);
        }
    }

    /// Removes a constituent from the eligible voters, unless a ballot was
    /// already cast under the same identifier.
    ///
    /// Returns whether the constituent was removed.
    pub fn remove_constituent(&self, identifier: &str) -> bool {
        let mut state = self.lock();
        if state.has_constituent_voted(identifier) {
            debug!("remove_constituent: {} has voted, keeping it", identifier);
            return false;
        }
        let before = state.constituents.len();
        state.constituents.retain(|c| c.identifier != identifier);
        state.constituents.len() < before
    }

    // ********* Ballots **********

    /// Replaces all the ballots. Refused if several ballots share an owner.
    pub fn set_ballots(&self, ballots: Vec<B>) -> Result<(), BallotError> {
        let duplicated = non_uniques(ballots.iter().map(|b| b.constituent().identifier.as_str()));
        let mut identifiers: Vec<ConstituentIdentifier> =
            duplicated.into_iter().map(|s| s.to_string()).collect();
        identifiers.sort();
        ensure!(identifiers.is_empty(), DuplicateBallotsSnafu { identifiers });
        self.lock().ballots = ballots;
        Ok(())
    }

    /// Adds a ballot. Refused if its owner already voted.
    pub fn add_ballot(&self, ballot: B) -> Result<(), BallotError> {
        let mut state = self.lock();
        let identifier = &ballot.constituent().identifier;
        ensure!(
            !state.has_constituent_voted(identifier),
            AlreadyVotedSnafu {
                identifier: identifier.clone()
            }
        );
        state.ballots.push(ballot);
        Ok(())
    }

    /// Removes every ballot cast under `identifier`.
    pub fn reset_ballot_for(&self, identifier: &str) {
        self.lock()
            .ballots
            .retain(|b| b.constituent().identifier != identifier);
    }
}

impl<B: Ballot> Clone for Vote<B> {
    /// An independent vote with a copy of the current state.
    fn clone(&self) -> Self {
        Vote::new(self.snapshot())
    }
}

impl<B: Ballot> From<VoteState<B>> for Vote<B> {
    fn from(state: VoteState<B>) -> Self {
        Vote::new(state)
    }
}

fn replace_constituent(constituents: &mut HashSet<Constituent>, constituent: Constituent) {
    constituents.retain(|c| !c.same_identifier(&constituent));
    constituents.insert(constituent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::CsvConfiguration;
    use crate::methods::simple_majority::{SimpleMajority, SimpleMajorityBallot};
    use std::sync::Arc;
    use std::thread;

    fn ballot(id: &str, option: Option<&VoteOption>) -> SimpleMajorityBallot {
        SimpleMajorityBallot::new(id.into(), option.cloned())
    }

    #[test]
    fn validation_collects_every_rule() {
        let x = VoteOption::new("X");
        let vote: SimpleMajority = Vote::builder("board")
            .options(vec![x.clone()])
            .constituents(vec!["alice".into(), "bob".into()])
            .generic_validators(GenericValidator::all_validators())
            .build()
            .unwrap();
        let results = vote.validate();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "All verified users are required to vote",
                "No blank votes",
                "No invalid options",
                "At least one vote",
                "One vote per user",
            ]
        );
        assert_eq!(results[0].errors.len(), 2);
        assert_eq!(results[3].errors, vec!["No votes cast"]);
        assert_eq!(results.count_errors(), 3);

        let err = vote.validate_throwing().unwrap_err();
        assert_eq!(err.results, results);
    }

    #[test]
    fn structural_rules_run_despite_a_custom_rule_with_their_id() {
        let vote: SimpleMajority = Vote::from_csv(
            &CsvConfiguration::default_configuration(),
            "Identifier,X\ndan,1\ndan,0",
        )
        .unwrap();
        vote.set_generic_validators(vec![GenericValidator::new(
            "OneVotePerUser",
            "Custom rule",
            |_: &[SimpleMajorityBallot], _: &HashSet<Constituent>, _: &[VoteOption]| Vec::new(),
            |_: &SimpleMajorityBallot, _: &[VoteOption]| String::new(),
        )]);
        let results = vote.validate();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Custom rule",
                "No invalid options",
                "At least one vote",
                "One vote per user",
            ]
        );
        assert_eq!(
            results[3].errors,
            vec!["dan voted multiple times", "dan voted multiple times"]
        );
        assert!(vote.validate_throwing().is_err());
    }

    #[test]
    fn builder_settings_and_custom_data() {
        let id = Uuid::new_v4();
        let vote: SimpleMajority = Vote::builder("board")
            .id(id)
            .option_names(&["Yes", "No"])
            .custom_data("room", "A101")
            .build()
            .unwrap();
        vote.set_custom_data("chair", "alice");
        vote.set_name("Board 2024");
        assert_eq!(vote.id(), id);
        assert_eq!(vote.type_name(), "Simple majority");
        let names: Vec<String> = vote.options().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Yes", "No"]);
        let data = vote.custom_data();
        assert_eq!(data.get("room").map(String::as_str), Some("A101"));
        assert_eq!(data.len(), 2);

        let state = vote.into_state();
        assert_eq!(state.name, "Board 2024");
        assert_eq!(state.custom_data["chair"], "alice");
    }

    #[test]
    fn validate_throwing_is_silent_when_clean() {
        let x = VoteOption::new("X");
        let vote: SimpleMajority = Vote::builder("board")
            .options(vec![x.clone()])
            .ballots(vec![ballot("alice", Some(&x))])
            .build()
            .unwrap();
        assert!(vote.validate_throwing().is_ok());
    }

    #[test]
    fn constituents_are_replaced_by_identifier() {
        let vote: SimpleMajority = Vote::builder("board").build().unwrap();
        vote.add_constituent(Constituent::new("alice").with_name("Alice"));
        vote.add_constituent(Constituent::new("alice").with_name("Alice L."));
        vote.add_constituents(vec![
            Constituent::new("bob"),
            Constituent::new("alice").with_tag("board"),
        ]);
        let constituents = vote.constituents();
        assert_eq!(constituents.len(), 2);
        assert!(constituents.contains(&Constituent::new("alice").with_tag("board")));
    }

    #[test]
    fn cannot_remove_a_constituent_that_voted() {
        let vote: SimpleMajority = Vote::builder("board")
            .constituents(vec!["alice".into(), "bob".into()])
            .ballots(vec![ballot("alice", None)])
            .build()
            .unwrap();
        assert!(!vote.remove_constituent("alice"));
        assert!(vote.remove_constituent("bob"));
        assert!(!vote.remove_constituent("bob"));
        assert_eq!(vote.constituents().len(), 1);
    }

    #[test]
    fn ballot_management() {
        let x = VoteOption::new("X");
        let vote: SimpleMajority = Vote::builder("board").options(vec![x.clone()]).build().unwrap();
        vote.add_ballot(ballot("alice", Some(&x))).unwrap();
        assert_eq!(
            vote.add_ballot(ballot("alice", None)),
            Err(BallotError::AlreadyVoted {
                identifier: "alice".to_string()
            })
        );
        assert!(vote.has_constituent_voted("alice"));

        let res = vote.set_ballots(vec![ballot("bob", None), ballot("carl", None), ballot("bob", None)]);
        assert_eq!(
            res,
            Err(BallotError::DuplicateBallots {
                identifiers: vec!["bob".to_string()]
            })
        );
        // Unchanged after a refusal.
        assert_eq!(vote.ballots().len(), 1);

        vote.set_ballots(vec![ballot("bob", None), ballot("carl", None)]).unwrap();
        assert!(!vote.has_constituent_voted("alice"));
        vote.reset_ballot_for("bob");
        assert_eq!(vote.ballots().len(), 1);
    }

    #[test]
    fn duplicate_generic_rules_run_once() {
        let vote: SimpleMajority = Vote::builder("board").build().unwrap();
        vote.set_generic_validators(vec![
            GenericValidator::no_blank_votes(),
            GenericValidator::no_blank_votes(),
        ]);
        let results = vote.validate();
        assert_eq!(results.iter().filter(|r| r.name == "No blank votes").count(), 1);
    }

    #[test]
    fn concurrent_ballots_are_serialized() {
        let vote: Arc<SimpleMajority> = Arc::new(Vote::builder("board").build().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let vote = Arc::clone(&vote);
                thread::spawn(move || {
                    for i in 0..50 {
                        let id = format!("voter-{}-{}", t, i);
                        vote.add_ballot(SimpleMajorityBallot::new(id.as_str().into(), None))
                            .unwrap();
                        vote.validate();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(vote.ballots().len(), 400);
        assert!(!vote.validate().iter().any(|r| r.name == "One vote per user" && r.has_errors()));
    }

    #[test]
    fn clones_are_independent() {
        let vote: SimpleMajority = Vote::builder("board").build().unwrap();
        let copy = vote.clone();
        copy.add_constituent("alice".into());
        assert!(vote.constituents().is_empty());
        assert_eq!(copy.constituents().len(), 1);
        assert_eq!(copy.id(), vote.id());
    }
}
