use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::csv::CsvConfiguration;
use crate::error::*;
use crate::methods::{check_known_option, prepare_count, Winner};
use crate::option::VoteOption;
use crate::validator::{Validateable, ValidationResult};
use crate::vote::Vote;

/// A vote where every constituent picks at most one option, and the option
/// with the most ballots wins.
pub type SimpleMajority = Vote<SimpleMajorityBallot>;

/// A single choice, or a blank ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SimpleMajorityBallot {
    pub constituent: Constituent,
    pub preferred_option: Option<VoteOption>,
}

impl SimpleMajorityBallot {
    pub fn new(constituent: Constituent, preferred_option: Option<VoteOption>) -> Self {
        SimpleMajorityBallot {
            constituent,
            preferred_option,
        }
    }
}

impl Ballot for SimpleMajorityBallot {
    type MethodValidator = SimpleMajorityValidator;

    const METHOD_NAME: &'static str = "Simple majority";

    fn constituent(&self) -> &Constituent {
        &self.constituent
    }

    fn placeholder(constituent: Constituent) -> Self {
        SimpleMajorityBallot::new(constituent, None)
    }

    fn is_blank(&self) -> bool {
        self.preferred_option.is_none()
    }

    /// One `1` in the column of the chosen option, `0` everywhere else.
    /// A row without any `1` is a blank ballot.
    fn from_csv_line(
        _config: &CsvConfiguration,
        values: &[&str],
        options: &[VoteOption],
        constituent: Constituent,
    ) -> Option<Self> {
        if values.len() != options.len() {
            return None;
        }
        let mut preferred: Option<&VoteOption> = None;
        for (value, option) in values.iter().zip(options.iter()) {
            match *value {
                "0" => {}
                "1" if preferred.is_none() => preferred = Some(option),
                _ => return None,
            }
        }
        Some(SimpleMajorityBallot::new(constituent, preferred.cloned()))
    }

    fn csv_value_for(&self, _config: &CsvConfiguration, option: &VoteOption) -> String {
        if self.preferred_option.as_ref() == Some(option) {
            "1".to_string()
        } else {
            "0".to_string()
        }
    }

    fn default_method_validators() -> Vec<SimpleMajorityValidator> {
        vec![SimpleMajorityValidator::NoInvalidOptions]
    }
}

/// Rules specific to simple majority votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleMajorityValidator {
    /// Every chosen option is one of the options of the vote.
    NoInvalidOptions,
}

impl SimpleMajorityValidator {
    pub fn all() -> Vec<SimpleMajorityValidator> {
        vec![SimpleMajorityValidator::NoInvalidOptions]
    }

    pub fn by_id(id: &str) -> Option<SimpleMajorityValidator> {
        Self::all()
            .into_iter()
            .find(|v| Validateable::<SimpleMajorityBallot>::id(v) == id)
    }
}

impl Validateable<SimpleMajorityBallot> for SimpleMajorityValidator {
    fn id(&self) -> &str {
        match self {
            SimpleMajorityValidator::NoInvalidOptions => "noInvalidOptions",
        }
    }

    fn name(&self) -> &str {
        match self {
            SimpleMajorityValidator::NoInvalidOptions => "No invalid options",
        }
    }

    fn validate(
        &self,
        ballots: &[SimpleMajorityBallot],
        _constituents: &HashSet<Constituent>,
        options: &[VoteOption],
    ) -> ValidationResult {
        match self {
            SimpleMajorityValidator::NoInvalidOptions => {
                let errors = ballots
                    .iter()
                    .filter(|b| {
                        b.preferred_option
                            .as_ref()
                            .map_or(false, |o| !options.contains(o))
                    })
                    .map(|b| format!("{} voted for an unknown option", b.constituent.identifier))
                    .collect();
                self.make_result(errors)
            }
        }
    }
}

impl SimpleMajority {
    /// The number of ballots for each option. Blank ballots are not counted.
    ///
    /// Unless `force` is set, the vote must pass validation first. Even when
    /// forced, a ballot for an option outside the vote fails the count.
    pub fn count(&self, force: bool) -> Result<HashMap<VoteOption, u64>, CountError> {
        self.with_state(|state| {
            info!("count: {:?} with {} ballots", state.name, state.ballots.len());
            prepare_count(state, force)?;
            let mut tally: HashMap<VoteOption, u64> =
                state.options.iter().map(|o| (o.clone(), 0)).collect();
            for ballot in state.ballots.iter() {
                if let Some(option) = ballot.preferred_option.as_ref() {
                    check_known_option(state, ballot, option)?;
                    *tally.entry(option.clone()).or_insert(0) += 1;
                }
            }
            debug!("count: {:?}", tally);
            Ok(tally)
        })
    }

    /// The options with the most ballots. Several options sharing the highest
    /// count are reported as a tie.
    pub fn find_winner(&self, force: bool) -> Result<Winner, CountError> {
        let tally = self.count(force)?;
        let winner = Winner::from_tally(tally.iter().map(|(o, c)| (o, *c)));
        info!("find_winner: {:?}", winner);
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::GenericValidator;

    fn decode(values: &[&str], options: &[VoteOption]) -> Option<SimpleMajorityBallot> {
        SimpleMajorityBallot::from_csv_line(
            &CsvConfiguration::default_configuration(),
            values,
            options,
            "alice".into(),
        )
    }

    #[test]
    fn decodes_rows() {
        let options = vec![VoteOption::new("X"), VoteOption::new("Y")];
        assert_eq!(
            decode(&["0", "1"], &options).unwrap().preferred_option,
            Some(options[1].clone())
        );
        assert!(decode(&["0", "0"], &options).unwrap().is_blank());
        assert!(decode(&["1", "1"], &options).is_none());
        assert!(decode(&["1", "x"], &options).is_none());
        assert!(decode(&["", "1"], &options).is_none());
        assert!(decode(&["1"], &options).is_none());
    }

    #[test]
    fn unknown_options_are_invalid() {
        let x = VoteOption::new("X");
        let z = VoteOption::new("Z");
        let vote: SimpleMajority = Vote::builder("v")
            .options(vec![x.clone()])
            .ballots(vec![
                SimpleMajorityBallot::new("alice".into(), Some(x)),
                SimpleMajorityBallot::new("bob".into(), Some(z.clone())),
            ])
            .build()
            .unwrap();

        let err = vote.validate_throwing().unwrap_err();
        let failed: Vec<&ValidationResult> = err.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "No invalid options");
        assert_eq!(failed[0].errors, vec!["bob voted for an unknown option"]);

        assert!(matches!(vote.count(false), Err(CountError::Invalid { .. })));
        match vote.count(true) {
            Err(CountError::UnknownOption { identifier, option }) => {
                assert_eq!(identifier, "bob");
                assert_eq!(option, "Z");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn count_and_winner() {
        let x = VoteOption::new("X");
        let y = VoteOption::new("Y");
        let vote: SimpleMajority = Vote::builder("v")
            .options(vec![x.clone(), y.clone()])
            .ballots(vec![
                SimpleMajorityBallot::new("a".into(), Some(x.clone())),
                SimpleMajorityBallot::new("b".into(), Some(x.clone())),
                SimpleMajorityBallot::new("c".into(), Some(y.clone())),
                SimpleMajorityBallot::new("d".into(), None),
            ])
            .build()
            .unwrap();
        let tally = vote.count(false).unwrap();
        assert_eq!(tally[&x], 2);
        assert_eq!(tally[&y], 1);
        assert_eq!(vote.find_winner(false).unwrap(), Winner::Single(x));
    }

    #[test]
    fn forced_count_skips_validation() {
        let x = VoteOption::new("X");
        let vote: SimpleMajority = Vote::builder("v")
            .options(vec![x.clone()])
            .constituents(vec!["a".into(), "b".into()])
            .generic_validators(vec![GenericValidator::everyone_has_voted()])
            .ballots(vec![SimpleMajorityBallot::new("a".into(), Some(x.clone()))])
            .build()
            .unwrap();
        assert!(vote.count(false).is_err());
        assert_eq!(vote.count(true).unwrap()[&x], 1);
    }

    #[test]
    fn no_options_cannot_be_counted() {
        let vote: SimpleMajority = Vote::builder("v")
            .ballots(vec![SimpleMajorityBallot::new("a".into(), None)])
            .build()
            .unwrap();
        assert!(matches!(vote.count(false), Err(CountError::NoOptions)));
    }

    #[test]
    fn validator_lookup() {
        assert_eq!(
            SimpleMajorityValidator::by_id("noInvalidOptions"),
            Some(SimpleMajorityValidator::NoInvalidOptions)
        );
        assert_eq!(SimpleMajorityValidator::by_id("other"), None);
        assert_eq!(
            serde_json::to_string(&SimpleMajorityValidator::NoInvalidOptions).unwrap(),
            "\"noInvalidOptions\""
        );
    }
}
