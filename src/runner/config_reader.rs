use crate::runner::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// Used when neither the command line nor the configuration give a bound.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 100;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MethodName {
    #[serde(rename = "simpleMajority")]
    SimpleMajority,
    #[serde(rename = "yesNo")]
    YesNo,
}

impl MethodName {
    pub fn from_name(name: &str) -> CliResult<MethodName> {
        match name {
            "simpleMajority" | "simple_majority" => Ok(MethodName::SimpleMajority),
            "yesNo" | "yes_no" => Ok(MethodName::YesNo),
            _ => UnknownMethodSnafu { name }.fail(),
        }
    }
}

/// The description of an election, as read from a JSON file.
///
/// File paths are relative to the directory of the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub name: Option<String>,
    pub method: Option<MethodName>,
    #[serde(rename = "csvPreset")]
    pub csv_preset: Option<String>,
    #[serde(rename = "csvConfiguration")]
    pub csv_configuration: Option<CsvConfiguration>,
    #[serde(rename = "ballotsFile")]
    pub ballots_file: Option<String>,
    #[serde(rename = "constituentsFile")]
    pub constituents_file: Option<String>,
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(rename = "methodValidators")]
    pub method_validators: Option<Vec<String>>,
    #[serde(rename = "maxNameLength")]
    pub max_name_length: Option<usize>,
    /// The option names the ballot file must contain, if given.
    #[serde(default)]
    pub options: Vec<String>,
}

pub fn read_config(path: &str) -> CliResult<ElectionConfig> {
    let contents = read_file(path)?;
    let config: ElectionConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads a reference summary, to compare with the one produced by a run.
pub fn read_summary(path: &str) -> CliResult<JSValue> {
    let contents = read_file(path)?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
