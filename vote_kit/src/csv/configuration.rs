use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::constituent::Constituent;
use crate::csv::{CONSTITUENT_ID, CONSTITUENT_TAG, OPTION_NAME};
use crate::error::*;

/// Settings that only concern some of the formats.
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialKeys {
    /// Literal header used when exporting constituents, replacing the generated one.
    pub constituents_export_header: Option<String>,
    pub constituents_export_hide_names: bool,
    pub constituents_export_hide_emails: bool,
    pub constituents_export_show_tags: bool,
    pub extra_bools: BTreeMap<String, bool>,
    pub extra_strings: BTreeMap<String, String>,
}

impl SpecialKeys {
    /// The number of constituent columns besides the identifier that an
    /// export shows with these flags.
    pub fn visible_extra_columns(&self) -> usize {
        let mut count = 0;
        if !self.constituents_export_hide_names {
            count += 1;
        }
        if !self.constituents_export_hide_emails {
            count += 1;
        }
        if self.constituents_export_show_tags {
            count += 1;
        }
        count
    }
}

/// A description of a comma separated layout for ballots.
///
/// A data row starts with the `pre_values` (one per entry of `pre_headers`),
/// followed by one column per option. The header starts with the
/// `pre_headers`, followed by `option_header` expanded once per option.
///
/// The placeholders are:
/// - `{constituentID}` in `pre_values`: the identifier of the constituent (required)
/// - `{constituentTag}` in `pre_values`: the tag of the constituent, possibly empty
/// - `{option name}` in `option_header`: the name of the option (exactly once)
///
/// All the checks happen when the configuration is created. A configuration
/// that exists is always usable for both export and import.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCsvConfiguration", into = "RawCsvConfiguration")]
pub struct CsvConfiguration {
    name: String,
    pre_headers: Vec<String>,
    pre_values: Vec<String>,
    option_header: String,
    special_keys: SpecialKeys,
}

// The serialized form. Deserializing always goes through the checks.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCsvConfiguration {
    name: String,
    pre_headers: Vec<String>,
    pre_values: Vec<String>,
    option_header: String,
    #[serde(default)]
    special_keys: SpecialKeys,
}

impl TryFrom<RawCsvConfiguration> for CsvConfiguration {
    type Error = CsvConfigurationError;

    fn try_from(raw: RawCsvConfiguration) -> Result<Self, Self::Error> {
        CsvConfiguration::new(
            raw.name,
            raw.pre_headers,
            raw.pre_values,
            raw.option_header,
            raw.special_keys,
        )
    }
}

impl From<CsvConfiguration> for RawCsvConfiguration {
    fn from(c: CsvConfiguration) -> Self {
        RawCsvConfiguration {
            name: c.name,
            pre_headers: c.pre_headers,
            pre_values: c.pre_values,
            option_header: c.option_header,
            special_keys: c.special_keys,
        }
    }
}

impl CsvConfiguration {
    pub fn new(
        name: impl Into<String>,
        pre_headers: Vec<String>,
        pre_values: Vec<String>,
        option_header: impl Into<String>,
        special_keys: SpecialKeys,
    ) -> Result<CsvConfiguration, CsvConfigurationError> {
        let res = CsvConfiguration {
            name: name.into(),
            pre_headers,
            pre_values,
            option_header: option_header.into(),
            special_keys,
        };
        res.check()?;
        Ok(res)
    }

    fn check(&self) -> Result<(), CsvConfigurationError> {
        ensure!(
            self.pre_headers.len() == self.pre_values.len(),
            IncompatiblePreHeaderAndValuesSnafu
        );

        ensure!(
            self.pre_values.iter().all(|v| is_valid_template(v, false, 0, None))
                && self.pre_values.iter().any(|v| v == CONSTITUENT_ID),
            InvalidPreValuesSnafu
        );

        ensure!(
            self.pre_headers.iter().all(|v| is_valid_template(v, false, 0, None)),
            InvalidPreHeadersSnafu
        );

        ensure!(
            is_valid_template(&self.option_header, false, 1, Some(1))
                && self.option_header.contains(OPTION_NAME),
            InvalidOptionHeaderSnafu
        );

        let keys = &self.special_keys;
        if let Some(header) = keys.constituents_export_header.as_deref() {
            ensure!(
                is_valid_template(header, true, 0, Some(0)),
                InvalidSpecialKeySnafu
            );
            // Either no comma at all, or exactly one per visible column with
            // text on both sides.
            let expected_commas = keys.visible_extra_columns();
            let commas = header.matches(',').count();
            if expected_commas == 0 {
                ensure!(commas == 0, InvalidSpecialKeySnafu);
            } else {
                ensure!(
                    commas == expected_commas && !header.starts_with(',') && !header.ends_with(','),
                    InvalidSpecialKeySnafu
                );
            }
        }

        // The column layout of the roster is ambiguous with both.
        ensure!(
            !(keys.constituents_export_show_tags && keys.constituents_export_header.is_some()),
            IncompatibleSpecialKeyCombinationSnafu
        );

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pre_headers(&self) -> &[String] {
        &self.pre_headers
    }

    pub fn pre_values(&self) -> &[String] {
        &self.pre_values
    }

    pub fn option_header(&self) -> &str {
        &self.option_header
    }

    pub fn special_keys(&self) -> &SpecialKeys {
        &self.special_keys
    }

    /// The literal prefix of the data row of `constituent`.
    pub fn pre_values_for(&self, constituent: &Constituent) -> String {
        self.pre_value_cells(constituent).join(",")
    }

    /// The leading cells of the row of `constituent`, one per pre value.
    pub fn pre_value_cells(&self, constituent: &Constituent) -> Vec<String> {
        self.pre_values
            .iter()
            .map(|v| match v.as_str() {
                CONSTITUENT_ID => constituent.identifier.clone(),
                CONSTITUENT_TAG => constituent.tag.clone().unwrap_or_default(),
                _ => v.clone(),
            })
            .collect()
    }

    /// The header columns of the options, one per name, in the given order.
    pub fn option_headers(&self, option_names: &[&str]) -> Vec<String> {
        option_names
            .iter()
            .map(|name| self.option_header.replace(OPTION_NAME, name))
            .collect()
    }

    /// The literal text before and after the `{option name}` placeholder.
    pub fn option_header_split(&self) -> Option<(&str, &str)> {
        self.option_header.split_once(OPTION_NAME)
    }

    /// The column holding the identifier of the constituent.
    pub fn constituent_id_index(&self) -> Option<usize> {
        self.pre_values.iter().position(|v| v == CONSTITUENT_ID)
    }

    /// The column holding the tag of the constituent, if any.
    pub fn constituent_tag_index(&self) -> Option<usize> {
        self.pre_values.iter().position(|v| v == CONSTITUENT_TAG)
    }
}

/// Checks a literal part of a configuration.
///
/// Delimiters are refused (the comma only if `allows_comma` is false), braces
/// must be balanced and never closed before being opened, and the number of
/// brace pairs must be within `[min_brackets, max_brackets]`.
fn is_valid_template(
    value: &str,
    allows_comma: bool,
    min_brackets: usize,
    max_brackets: Option<usize>,
) -> bool {
    if value.is_empty() {
        return false;
    }
    let mut open: usize = 0;
    let mut pairs: usize = 0;
    for c in value.chars() {
        match c {
            ';' | '\t' | '\r' | '\n' => return false,
            ',' if !allows_comma => return false,
            '{' => {
                open += 1;
                pairs += 1;
            }
            '}' => {
                if open == 0 {
                    return false;
                }
                open -= 1;
            }
            _ => {}
        }
    }
    open == 0 && pairs >= min_brackets && max_brackets.map_or(true, |max| pairs <= max)
}

// ********* Presets **********

impl CsvConfiguration {
    /// One identifier column followed by one column per option, named after the option.
    pub fn default_configuration() -> CsvConfiguration {
        CsvConfiguration {
            name: "Default".to_string(),
            pre_headers: vec!["Identifier".to_string()],
            pre_values: vec![CONSTITUENT_ID.to_string()],
            option_header: OPTION_NAME.to_string(),
            special_keys: SpecialKeys::default(),
        }
    }

    /// The format of the S/M-Kid ballot spreadsheets.
    /// See https://github.com/vstenby/AlternativeVote/blob/main/KABSDemo.csv
    pub fn smkid() -> CsvConfiguration {
        CsvConfiguration {
            name: "S/M-Kid".to_string(),
            pre_headers: vec!["Tidsstempel".to_string(), "Studienummer".to_string()],
            pre_values: vec!["01/01/2001 00.00.01".to_string(), CONSTITUENT_ID.to_string()],
            option_header: format!("Stemmeseddel [{}]", OPTION_NAME),
            special_keys: SpecialKeys {
                constituents_export_header: Some("Studienummer".to_string()),
                constituents_export_hide_names: true,
                constituents_export_hide_emails: true,
                extra_strings: [(
                    "Alternative vote priority suffix".to_string(),
                    ".0".to_string(),
                )]
                .into_iter()
                .collect(),
                ..SpecialKeys::default()
            },
        }
    }

    /// Like the default, with the tag of the constituent after the identifier.
    pub fn default_with_tags() -> CsvConfiguration {
        let default = CsvConfiguration::default_configuration();
        CsvConfiguration {
            name: "Default with tags".to_string(),
            pre_headers: [default.pre_headers, vec!["Tag".to_string()]].concat(),
            pre_values: [default.pre_values, vec![CONSTITUENT_TAG.to_string()]].concat(),
            option_header: default.option_header,
            special_keys: SpecialKeys {
                constituents_export_show_tags: true,
                ..SpecialKeys::default()
            },
        }
    }

    /// Like the default, without names in the constituent exports.
    pub fn only_ids() -> CsvConfiguration {
        let default = CsvConfiguration::default_configuration();
        CsvConfiguration {
            name: "Only ids".to_string(),
            special_keys: SpecialKeys {
                constituents_export_hide_names: true,
                ..SpecialKeys::default()
            },
            ..default
        }
    }

    pub fn all_presets() -> Vec<CsvConfiguration> {
        vec![
            CsvConfiguration::default_configuration(),
            CsvConfiguration::smkid(),
            CsvConfiguration::default_with_tags(),
            CsvConfiguration::only_ids(),
        ]
    }

    /// Finds a preset by its name.
    pub fn preset(name: &str) -> Option<CsvConfiguration> {
        CsvConfiguration::all_presets()
            .into_iter()
            .find(|c| c.name == name)
    }
}

impl Default for CsvConfiguration {
    fn default() -> Self {
        CsvConfiguration::default_configuration()
    }
}
