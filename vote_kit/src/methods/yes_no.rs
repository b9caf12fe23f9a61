use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::csv::CsvConfiguration;
use crate::error::*;
use crate::methods::{check_known_option, prepare_count};
use crate::option::VoteOption;
use crate::validator::{Validateable, ValidationResult};
use crate::vote::Vote;

/// A vote where every constituent may answer yes or no to each option.
pub type YesNo = Vote<YesNoBallot>;

/// The answers of a constituent. An option without an answer is absent from `values`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct YesNoBallot {
    pub constituent: Constituent,
    pub values: HashMap<VoteOption, bool>,
}

impl YesNoBallot {
    pub fn new(constituent: Constituent, values: HashMap<VoteOption, bool>) -> Self {
        YesNoBallot {
            constituent,
            values,
        }
    }
}

impl Ballot for YesNoBallot {
    type MethodValidator = YesNoValidator;

    const METHOD_NAME: &'static str = "Yes-no";

    fn constituent(&self) -> &Constituent {
        &self.constituent
    }

    fn placeholder(constituent: Constituent) -> Self {
        YesNoBallot::new(constituent, HashMap::new())
    }

    fn is_blank(&self) -> bool {
        self.values.is_empty()
    }

    /// `1` for yes, `0` for no, an empty cell for no answer.
    fn from_csv_line(
        _config: &CsvConfiguration,
        values: &[&str],
        options: &[VoteOption],
        constituent: Constituent,
    ) -> Option<Self> {
        if values.len() != options.len() {
            return None;
        }
        let mut answers = HashMap::new();
        for (value, option) in values.iter().zip(options.iter()) {
            match *value {
                "1" => {
                    answers.insert(option.clone(), true);
                }
                "0" => {
                    answers.insert(option.clone(), false);
                }
                "" => {}
                _ => return None,
            }
        }
        Some(YesNoBallot::new(constituent, answers))
    }

    fn csv_value_for(&self, _config: &CsvConfiguration, option: &VoteOption) -> String {
        match self.values.get(option) {
            Some(true) => "1".to_string(),
            Some(false) => "0".to_string(),
            None => String::new(),
        }
    }
}

/// Rules specific to yes/no votes. None of them apply unless configured.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YesNoValidator {
    /// A constituent that answered for some options must answer for all of them.
    /// Blank ballots are left to the generic blank rule.
    PreferenceForAllRequired,
}

impl YesNoValidator {
    pub fn all() -> Vec<YesNoValidator> {
        vec![YesNoValidator::PreferenceForAllRequired]
    }

    pub fn by_id(id: &str) -> Option<YesNoValidator> {
        Self::all()
            .into_iter()
            .find(|v| Validateable::<YesNoBallot>::id(v) == id)
    }
}

impl Validateable<YesNoBallot> for YesNoValidator {
    fn id(&self) -> &str {
        match self {
            YesNoValidator::PreferenceForAllRequired => "preferenceForAllRequired",
        }
    }

    fn name(&self) -> &str {
        match self {
            YesNoValidator::PreferenceForAllRequired => "Preference for all options",
        }
    }

    fn validate(
        &self,
        ballots: &[YesNoBallot],
        _constituents: &HashSet<Constituent>,
        options: &[VoteOption],
    ) -> ValidationResult {
        match self {
            YesNoValidator::PreferenceForAllRequired => {
                let errors = ballots
                    .iter()
                    .filter(|b| {
                        let answered = options.iter().filter(|o| b.values.contains_key(*o)).count();
                        answered > 0 && answered < options.len()
                    })
                    .map(|b| format!("{} hasn't voted for all candidates", b.constituent.identifier))
                    .collect();
                self.make_result(errors)
            }
        }
    }
}

/// The answers given for one option.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct YesNoTally {
    pub yes: u64,
    pub no: u64,
    /// Ballots without an answer for this option.
    pub blank: u64,
}

impl YesNo {
    /// The answers for each option.
    ///
    /// Unless `force` is set, the vote must pass validation first. An answer
    /// for an option outside the vote fails the count.
    pub fn count(&self, force: bool) -> Result<HashMap<VoteOption, YesNoTally>, CountError> {
        self.with_state(|state| {
            info!("count: {:?} with {} ballots", state.name, state.ballots.len());
            prepare_count(state, force)?;
            for ballot in state.ballots.iter() {
                for option in ballot.values.keys() {
                    check_known_option(state, ballot, option)?;
                }
            }
            let res = state
                .options
                .iter()
                .map(|option| {
                    let mut tally = YesNoTally::default();
                    for ballot in state.ballots.iter() {
                        match ballot.values.get(option) {
                            Some(true) => tally.yes += 1,
                            Some(false) => tally.no += 1,
                            None => tally.blank += 1,
                        }
                    }
                    (option.clone(), tally)
                })
                .collect();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&VoteOption, bool)]) -> HashMap<VoteOption, bool> {
        pairs.iter().map(|(o, v)| ((*o).clone(), *v)).collect()
    }

    #[test]
    fn csv_cells() {
        let options = vec![VoteOption::new("A"), VoteOption::new("B"), VoteOption::new("C")];
        let config = CsvConfiguration::default_configuration();
        let b = YesNoBallot::from_csv_line(&config, &["1", "0", ""], &options, "alice".into())
            .unwrap();
        assert_eq!(b.values, answers(&[(&options[0], true), (&options[1], false)]));
        let cells: Vec<String> = options.iter().map(|o| b.csv_value_for(&config, o)).collect();
        assert_eq!(cells, vec!["1", "0", ""]);

        let blank = YesNoBallot::from_csv_line(&config, &["", "", ""], &options, "bob".into())
            .unwrap();
        assert!(blank.is_blank());
        assert!(YesNoBallot::from_csv_line(&config, &["yes", "", ""], &options, "c".into()).is_none());
    }

    #[test]
    fn preference_for_all() {
        let a = VoteOption::new("A");
        let b = VoteOption::new("B");
        let ballots = vec![
            YesNoBallot::new("full".into(), answers(&[(&a, true), (&b, false)])),
            YesNoBallot::new("partial".into(), answers(&[(&a, true)])),
            YesNoBallot::new("blank".into(), HashMap::new()),
        ];
        let res = YesNoValidator::PreferenceForAllRequired.validate(
            &ballots,
            &HashSet::new(),
            &[a, b],
        );
        assert_eq!(res.name, "Preference for all options");
        assert_eq!(res.errors, vec!["partial hasn't voted for all candidates"]);
    }

    #[test]
    fn opt_in_rule() {
        let a = VoteOption::new("A");
        let b = VoteOption::new("B");
        let vote: YesNo = Vote::builder("v")
            .options(vec![a.clone(), b.clone()])
            .ballots(vec![YesNoBallot::new("x".into(), answers(&[(&a, true)]))])
            .build()
            .unwrap();
        assert!(vote.validate_throwing().is_ok());
        vote.set_method_validators(vec![YesNoValidator::PreferenceForAllRequired]);
        assert!(vote.validate_throwing().is_err());
        assert_eq!(YesNoValidator::by_id("preferenceForAllRequired"), Some(YesNoValidator::PreferenceForAllRequired));
    }

    #[test]
    fn counts_yes_no_and_blank() {
        let a = VoteOption::new("A");
        let b = VoteOption::new("B");
        let vote: YesNo = Vote::builder("v")
            .options(vec![a.clone(), b.clone()])
            .ballots(vec![
                YesNoBallot::new("1".into(), answers(&[(&a, true), (&b, false)])),
                YesNoBallot::new("2".into(), answers(&[(&a, true)])),
                YesNoBallot::new("3".into(), answers(&[(&a, false), (&b, false)])),
            ])
            .build()
            .unwrap();
        let tally = vote.count(false).unwrap();
        assert_eq!(tally[&a], YesNoTally { yes: 2, no: 1, blank: 0 });
        assert_eq!(tally[&b], YesNoTally { yes: 0, no: 2, blank: 1 });
    }

    #[test]
    fn unknown_answer_fails_the_count() {
        let a = VoteOption::new("A");
        let stray = VoteOption::new("Stray");
        let vote: YesNo = Vote::builder("v")
            .options(vec![a.clone()])
            .ballots(vec![YesNoBallot::new("x".into(), answers(&[(&stray, true)]))])
            .build()
            .unwrap();
        assert!(matches!(vote.count(true), Err(CountError::UnknownOption { .. })));
    }

    #[test]
    fn round_trip() {
        let a = VoteOption::new("A");
        let b = VoteOption::new("B");
        let vote: YesNo = Vote::builder("v")
            .options(vec![a.clone(), b.clone()])
            .ballots(vec![
                YesNoBallot::new("x".into(), answers(&[(&a, true)])),
                YesNoBallot::new("y".into(), answers(&[(&a, false), (&b, true)])),
            ])
            .build()
            .unwrap();
        let config = CsvConfiguration::default_configuration();
        let csv = vote.to_csv(&config).unwrap();
        assert_eq!(csv, "Identifier,A,B\nx,1,\ny,0,1");
        let back: YesNo = Vote::from_csv(&config, &csv).unwrap();
        let tally = back.count(false).unwrap();
        let by_name: HashMap<String, YesNoTally> =
            tally.into_iter().map(|(o, t)| (o.name, t)).collect();
        assert_eq!(by_name["A"], YesNoTally { yes: 1, no: 1, blank: 0 });
        assert_eq!(by_name["B"], YesNoTally { yes: 1, no: 0, blank: 1 });
    }
}
