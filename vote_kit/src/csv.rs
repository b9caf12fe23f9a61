// Line oriented text formats for ballots and constituent lists.
// The format is comma separated with no quoting: the configuration makes sure
// that none of the literal parts can contain a delimiter.

use ::csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};

use crate::error::CsvError;

mod configuration;
mod io_ballots;
mod io_constituents;

pub use configuration::{CsvConfiguration, SpecialKeys};
pub use io_ballots::ballots_from_csv;
pub use io_constituents::{constituents_from_csv, constituents_to_csv, MAX_CONSTITUENT_LINES};

/// Placeholder replaced by the identifier of the constituent of a row.
pub const CONSTITUENT_ID: &str = "{constituentID}";
/// Placeholder replaced by the tag of the constituent of a row, or nothing.
pub const CONSTITUENT_TAG: &str = "{constituentTag}";
/// Placeholder replaced by the name of an option in the option header.
pub const OPTION_NAME: &str = "{option name}";

/// Reads every non-empty line as a record of trimmed cells, with the 1-based
/// line it starts on. There is no quoting and records may have any length,
/// callers check the number of columns.
pub(crate) fn read_records(text: &str) -> Result<Vec<(usize, StringRecord)>, ::csv::Error> {
    let rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut res = Vec::new();
    for (idx, record) in rdr.into_records().enumerate() {
        let record = record?;
        let lineno = record.position().map_or(idx + 1, |p| p.line() as usize);
        res.push((lineno, record));
    }
    Ok(res)
}

/// Writes one line per record, without quoting and without a trailing newline.
pub(crate) fn write_records(records: &[Vec<String>]) -> Result<String, CsvError> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        wtr.write_record(record).map_err(|e| CsvError::Unwritable {
            message: e.to_string(),
        })?;
    }
    let bytes = wtr.into_inner().map_err(|e| CsvError::Unwritable {
        message: e.to_string(),
    })?;
    let mut text = String::from_utf8(bytes).map_err(|e| CsvError::Unwritable {
        message: e.to_string(),
    })?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
