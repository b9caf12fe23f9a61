//! Ballot validation and CSV import/export for small institutional votes.
//!
//! A [`Vote`] holds the options, the eligible constituents and the ballots of
//! an election, together with the rules that decide whether the ballots may
//! be counted. The ballot shape depends on the voting method:
//! [`SimpleMajority`] and [`YesNo`] are provided.
//!
//! See the [manual] for the text formats.

mod ballot;
mod builder;
mod constituent;
pub mod csv;
mod error;
pub mod manual;
pub mod methods;
mod option;
pub mod validator;
mod vote;

pub use crate::ballot::Ballot;
pub use crate::builder::VoteBuilder;
pub use crate::constituent::{Constituent, ConstituentIdentifier};
pub use crate::csv::{
    constituents_from_csv, constituents_to_csv, CsvConfiguration, SpecialKeys,
    MAX_CONSTITUENT_LINES,
};
pub use crate::error::*;
pub use crate::methods::simple_majority::{
    SimpleMajority, SimpleMajorityBallot, SimpleMajorityValidator,
};
pub use crate::methods::yes_no::{YesNo, YesNoBallot, YesNoTally, YesNoValidator};
pub use crate::methods::Winner;
pub use crate::option::VoteOption;
pub use crate::validator::{
    GenericValidator, Validateable, ValidationErrors, ValidationResult, ValidationResults,
};
pub use crate::vote::{Vote, VoteState};
