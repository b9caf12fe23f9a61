use log::{debug, info};
use snafu::{ensure, OptionExt};
use std::collections::HashSet;

use crate::ballot::Ballot;
use crate::constituent::Constituent;
use crate::csv::{read_records, write_records, CsvConfiguration};
use crate::error::*;
use crate::option::{sorted_by_name, VoteOption};
use crate::vote::{Vote, VoteState};

impl<B: Ballot> VoteState<B> {
    /// Writes the ballots in the layout of `config`.
    ///
    /// The option columns are sorted by option name. There is no trailing newline.
    pub fn to_csv(&self, config: &CsvConfiguration) -> Result<String, CsvError> {
        let options = sorted_by_name(&self.options);
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();

        let mut header: Vec<String> = config.pre_headers().to_vec();
        header.extend(config.option_headers(&names));
        let mut records = vec![header];

        for ballot in self.ballots.iter() {
            let mut record = config.pre_value_cells(ballot.constituent());
            for option in options.iter() {
                let cell = ballot.csv_value_for(config, option);
                debug_assert!(!cell.contains(','), "cell {:?} contains a comma", cell);
                record.push(cell);
            }
            records.push(record);
        }
        write_records(&records)
    }
}

impl<B: Ballot> Vote<B> {
    pub fn to_csv(&self, config: &CsvConfiguration) -> Result<String, CsvError> {
        self.with_state(|s| s.to_csv(config))
    }

    /// Reads a vote from ballots in the layout of `config`.
    ///
    /// Any malformed part fails the whole import. The constituents of the vote
    /// are the owners of the ballots.
    pub fn from_csv(config: &CsvConfiguration, csv: &str) -> Result<Vote<B>, CsvError> {
        let (options, ballots) = ballots_from_csv::<B>(config, csv)?;
        let constituents: HashSet<Constituent> =
            ballots.iter().map(|b| b.constituent().clone()).collect();
        info!(
            "from_csv: read {} ballots over {} options",
            ballots.len(),
            options.len()
        );
        Ok(Vote::imported(options, constituents, ballots))
    }
}

/// Reads the options and the ballots of a file. New option ids are minted.
pub fn ballots_from_csv<B: Ballot>(
    config: &CsvConfiguration,
    csv: &str,
) -> Result<(Vec<VoteOption>, Vec<B>), CsvError> {
    let records = read_records(csv).map_err(|e| CsvError::Unreadable {
        message: e.to_string(),
    })?;
    let ((_, header_record), rows) = records.split_first().context(EmptyInputSnafu)?;

    let header: Vec<&str> = header_record.iter().collect();
    let num_pre = config.pre_headers().len();
    ensure!(
        header.len() > num_pre,
        HeaderTooShortSnafu {
            expected: num_pre,
            found: header.len()
        }
    );
    for (index, (expected, found)) in config.pre_headers().iter().zip(header.iter()).enumerate() {
        ensure!(
            expected.as_str() == *found,
            PreHeaderMismatchSnafu {
                index,
                expected: expected.clone(),
                found: found.to_string()
            }
        );
    }

    let (prefix, suffix) = config.option_header_split().context(OptionHeaderTemplateSnafu)?;
    let options: Vec<VoteOption> = header[num_pre..]
        .iter()
        .map(|h| {
            h.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .filter(|name| !name.is_empty())
                .map(VoteOption::new)
                .context(InvalidOptionColumnSnafu { header: h.to_string() })
        })
        .collect::<Result<_, _>>()?;
    debug!("ballots_from_csv: options {:?}", options);

    let id_index = config.constituent_id_index().context(MissingIdentifierSnafu)?;
    let tag_index = config.constituent_tag_index();
    let expected = num_pre + options.len();

    let mut ballots: Vec<B> = Vec::with_capacity(rows.len());
    for (lineno, record) in rows.iter() {
        let cells: Vec<&str> = record.iter().collect();
        ensure!(
            cells.len() == expected,
            ColumnCountMismatchSnafu {
                expected,
                found: cells.len()
            }
        );
        let identifier = cells[id_index];
        ensure!(!identifier.is_empty(), MissingIdentifierSnafu);
        let mut constituent = Constituent::new(identifier);
        constituent.tag = tag_index
            .map(|i| cells[i])
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string());

        let ballot = B::from_csv_line(config, &cells[num_pre..], &options, constituent);
        match ballot {
            Some(b) => ballots.push(b),
            None => {
                debug!("ballots_from_csv: line {} could not be decoded: {:?}", lineno, record);
                return InvalidBallotSnafu { identifier }.fail();
            }
        }
    }
    Ok((options, ballots))
}
