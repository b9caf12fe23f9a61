// The concrete voting methods.

pub mod simple_majority;
pub mod yes_no;

use log::warn;
use snafu::ensure;

use crate::ballot::Ballot;
use crate::error::*;
use crate::option::VoteOption;
use crate::vote::VoteState;

/// Checks run before any count: validation (unless forced) and the presence
/// of options.
fn prepare_count<B: Ballot>(state: &VoteState<B>, force: bool) -> Result<(), CountError> {
    if force {
        if let Err(e) = state.validate_throwing() {
            warn!("Counting {:?} despite failed validation: {}", state.name, e);
        }
    } else {
        state.validate_throwing().map_err(|source| CountError::Invalid { source })?;
    }
    ensure!(!state.options.is_empty(), NoOptionsSnafu);
    Ok(())
}

/// Fails if `option` is not one of the options of the vote.
fn check_known_option<B: Ballot>(
    state: &VoteState<B>,
    ballot: &B,
    option: &VoteOption,
) -> Result<(), CountError> {
    ensure!(
        state.options.contains(option),
        UnknownOptionSnafu {
            identifier: ballot.constituent().identifier.clone(),
            option: option.name.clone(),
        }
    );
    Ok(())
}

/// The outcome of a single winner count. Ties are never broken.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Winner {
    Single(VoteOption),
    /// All the options sharing the highest tally, sorted by name.
    Tie(Vec<VoteOption>),
}

impl Winner {
    /// Every option with the highest tally. `tally` must not be empty.
    fn from_tally<'a, I>(tally: I) -> Winner
    where
        I: IntoIterator<Item = (&'a VoteOption, u64)>,
    {
        let tally: Vec<(&VoteOption, u64)> = tally.into_iter().collect();
        let max = tally.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let mut best: Vec<VoteOption> = tally
            .into_iter()
            .filter(|(_, c)| *c == max)
            .map(|(o, _)| o.clone())
            .collect();
        best.sort_by(|a, b| a.name.cmp(&b.name));
        if best.len() == 1 {
            if let Some(w) = best.pop() {
                return Winner::Single(w);
            }
        }
        Winner::Tie(best)
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Winner::Tie(_))
    }

    pub fn winners(&self) -> Vec<&VoteOption> {
        match self {
            Winner::Single(o) => vec![o],
            Winner::Tie(l) => l.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_tally_wins() {
        let x = VoteOption::new("X");
        let y = VoteOption::new("Y");
        let w = Winner::from_tally(vec![(&x, 3), (&y, 1)]);
        assert_eq!(w, Winner::Single(x.clone()));
        assert!(!w.is_tie());
        assert_eq!(w.winners(), vec![&x]);
    }

    #[test]
    fn shared_maximum_is_a_tie() {
        let x = VoteOption::new("X");
        let y = VoteOption::new("Y");
        let z = VoteOption::new("Z");
        let w = Winner::from_tally(vec![(&z, 2), (&y, 0), (&x, 2)]);
        assert_eq!(w, Winner::Tie(vec![x.clone(), z.clone()]));
        // Nobody voted: every option ties.
        let w = Winner::from_tally(vec![(&x, 0), (&y, 0)]);
        assert_eq!(w.winners().len(), 2);
    }
}
