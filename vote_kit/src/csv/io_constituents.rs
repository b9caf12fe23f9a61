use log::{debug, info};
use snafu::{ensure, OptionExt};

use crate::constituent::Constituent;
use crate::csv::{read_records, write_records, CsvConfiguration};
use crate::error::*;

/// The maximum number of constituents in a single import.
pub const MAX_CONSTITUENT_LINES: usize = 10_000;

const NAME: &str = "Name";
const IDENTIFIER: &str = "Identifier";
const TAG: &str = "Tag";
const EMAIL: &str = "Email";

/// Which columns a roster file holds, after the name and the identifier.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct RosterLayout {
    has_tags: bool,
    has_emails: bool,
}

impl RosterLayout {
    fn from_header(
        header: &str,
        config: Option<&CsvConfiguration>,
    ) -> Result<RosterLayout, DecodeConstituentError> {
        let (has_tags, has_emails) = match header {
            "Name,Identifier" => (false, false),
            "Name,Identifier,Tag" => (true, false),
            "Name,Identifier,Email" => (false, true),
            "Name,Identifier,Tag,Email" => (true, true),
            _ => {
                let matches_override = config
                    .and_then(|c| c.special_keys().constituents_export_header.as_deref())
                    .map_or(false, |h| h == header);
                ensure!(
                    matches_override,
                    UnknownHeaderSnafu {
                        header: header.to_string()
                    }
                );
                (false, false)
            }
        };
        Ok(RosterLayout {
            has_tags,
            has_emails,
        })
    }

    fn columns(&self) -> usize {
        2 + usize::from(self.has_tags) + usize::from(self.has_emails)
    }
}

/// Writes a list of constituents, sorted by identifier.
///
/// The columns follow the export flags of the configuration. A literal export
/// header replaces the generated header line, the rows are unaffected.
pub fn constituents_to_csv<'a, I>(
    constituents: I,
    config: &CsvConfiguration,
) -> Result<String, CsvError>
where
    I: IntoIterator<Item = &'a Constituent>,
{
    let keys = config.special_keys();
    let header: Vec<String> = match keys.constituents_export_header.as_ref() {
        Some(h) => h.split(',').map(|s| s.to_string()).collect(),
        None => {
            let mut columns = Vec::new();
            if !keys.constituents_export_hide_names {
                columns.push(NAME.to_string());
            }
            columns.push(IDENTIFIER.to_string());
            if keys.constituents_export_show_tags {
                columns.push(TAG.to_string());
            }
            if !keys.constituents_export_hide_emails {
                columns.push(EMAIL.to_string());
            }
            columns
        }
    };

    let mut sorted: Vec<&Constituent> = constituents.into_iter().collect();
    sorted.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let mut records = vec![header];
    for c in sorted {
        let mut cells: Vec<String> = Vec::new();
        if !keys.constituents_export_hide_names {
            cells.push(c.name_or_identifier().to_string());
        }
        cells.push(c.identifier.clone());
        if keys.constituents_export_show_tags {
            cells.push(c.tag.clone().unwrap_or_default());
        }
        if !keys.constituents_export_hide_emails {
            cells.push(c.email.clone().unwrap_or_default());
        }
        records.push(cells);
    }
    write_records(&records)
}

/// Reads a list of constituents.
///
/// The header must be one of `Name,Identifier`, `Name,Identifier,Tag`,
/// `Name,Identifier,Email`, `Name,Identifier,Tag,Email`, or the literal export
/// header of `config`. The latter is read as `Name,Identifier`.
///
/// Identifiers are trimmed and lower-cased. A name equal to the identifier is
/// dropped. `max_name_length` bounds every field.
pub fn constituents_from_csv(
    file: &str,
    config: Option<&CsvConfiguration>,
    max_name_length: usize,
) -> Result<Vec<Constituent>, DecodeConstituentError> {
    ensure!(
        !file.contains(';') && !file.contains('\t'),
        ForbiddenDelimiterSnafu
    );
    let records = read_records(file).map_err(|e| DecodeConstituentError::UnreadableRoster {
        message: e.to_string(),
    })?;
    let ((_, header_record), rows) = records.split_first().context(MissingHeaderSnafu)?;
    ensure!(
        rows.len() <= MAX_CONSTITUENT_LINES,
        TooManyLinesSnafu {
            count: rows.len(),
            max: MAX_CONSTITUENT_LINES
        }
    );
    let header = header_record.iter().collect::<Vec<&str>>().join(",");
    let layout = RosterLayout::from_header(&header, config)?;
    debug!("constituents_from_csv: layout {:?}", layout);

    let res = rows
        .iter()
        .map(|(lineno, record)| {
            let cells: Vec<&str> = record.iter().collect();
            decode_row(*lineno, &cells, layout, max_name_length)
        })
        .collect::<Result<Vec<Constituent>, DecodeConstituentError>>()?;
    info!("constituents_from_csv: read {} constituents", res.len());
    Ok(res)
}

fn decode_row(
    lineno: usize,
    cells: &[&str],
    layout: RosterLayout,
    max_name_length: usize,
) -> Result<Constituent, DecodeConstituentError> {
    ensure!(
        cells.len() == layout.columns(),
        WrongColumnCountSnafu {
            lineno,
            expected: layout.columns(),
            found: cells.len()
        }
    );
    let too_long = |s: &str| s.chars().count() > max_name_length;

    let raw_name = cells[0];
    let identifier = cells[1].to_lowercase();

    let mut tag = None;
    if layout.has_tags {
        let raw_tag = cells[2];
        ensure!(
            !raw_tag.starts_with('-') && !too_long(raw_tag),
            InvalidTagSnafu { lineno }
        );
        if !raw_tag.is_empty() {
            tag = Some(raw_tag.to_string());
        }
    }

    let mut email = None;
    if layout.has_emails {
        let raw_email = cells[2 + usize::from(layout.has_tags)];
        ensure!(
            (raw_email.is_empty() || raw_email.chars().count() >= 5) && !too_long(raw_email),
            InvalidEmailSnafu { lineno }
        );
        if !raw_email.is_empty() {
            email = Some(raw_email.to_string());
        }
    }

    ensure!(!identifier.is_empty(), InvalidIdentifierSnafu { lineno });
    ensure!(!too_long(identifier.as_str()), IdentifierTooLongSnafu { lineno });
    ensure!(!too_long(raw_name), NameTooLongSnafu { lineno });

    let name = if raw_name.is_empty() || raw_name == identifier {
        None
    } else {
        Some(raw_name.to_string())
    };
    Ok(Constituent {
        name,
        identifier,
        tag,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::SpecialKeys;

    fn read(file: &str) -> Result<Vec<Constituent>, DecodeConstituentError> {
        constituents_from_csv(file, None, 100)
    }

    #[test]
    fn reads_every_header_variant() {
        let res = read("Name,Identifier\nAlice,alice\n,bob").unwrap();
        assert_eq!(
            res,
            vec![Constituent::new("alice").with_name("Alice"), Constituent::new("bob")]
        );

        let res = read("Name,Identifier,Tag\r\nAlice,alice,board\r\nBob,bob,").unwrap();
        assert_eq!(res[0].tag.as_deref(), Some("board"));
        assert_eq!(res[1].tag, None);

        let res = read("Name,Identifier,Email\nAlice,alice,a@b.dk").unwrap();
        assert_eq!(res[0].email.as_deref(), Some("a@b.dk"));

        let res = read("Name,Identifier,Tag,Email\nAlice,alice,board,a@b.dk\n").unwrap();
        assert_eq!(
            res,
            vec![Constituent::new("alice")
                .with_name("Alice")
                .with_tag("board")
                .with_email("a@b.dk")]
        );
    }

    #[test]
    fn identifiers_are_normalized() {
        let res = read("Name,Identifier\n  Alice , ALICE \nbob,BOB").unwrap();
        assert_eq!(res[0].identifier, "alice");
        assert_eq!(res[0].name.as_deref(), Some("Alice"));
        // The name is compared with the normalized identifier.
        assert_eq!(res[1].name, None);
    }

    #[test]
    fn bad_tag_is_reported_on_its_line() {
        let err = read("Name,Identifier,Tag\n, dup1,-bad").unwrap_err();
        assert_eq!(err, DecodeConstituentError::InvalidTag { lineno: 2 });
        assert_eq!(err.lineno(), Some(2));

        // Blank lines still count.
        let err = read("Name,Identifier,Tag\nA,a,x\n\nB,b,-y").unwrap_err();
        assert_eq!(err, DecodeConstituentError::InvalidTag { lineno: 4 });
    }

    #[test]
    fn row_errors() {
        assert_eq!(
            read("Name,Identifier\nAlice,alice,extra").unwrap_err(),
            DecodeConstituentError::WrongColumnCount {
                lineno: 2,
                expected: 2,
                found: 3
            }
        );
        assert_eq!(
            read("Name,Identifier\nAlice,  ").unwrap_err(),
            DecodeConstituentError::InvalidIdentifier { lineno: 2 }
        );
        assert_eq!(
            read("Name,Identifier,Email\nAlice,alice,a@b").unwrap_err(),
            DecodeConstituentError::InvalidEmail { lineno: 2 }
        );
        assert_eq!(
            constituents_from_csv("Name,Identifier\nAlice,alice\nBobbybobbybob,bob", None, 10)
                .unwrap_err(),
            DecodeConstituentError::NameTooLong { lineno: 3 }
        );
        assert_eq!(
            constituents_from_csv("Name,Identifier\nA,abcdefghijkl", None, 10).unwrap_err(),
            DecodeConstituentError::IdentifierTooLong { lineno: 2 }
        );
    }

    #[test]
    fn file_errors() {
        assert_eq!(
            read("Name;Identifier\na;b").unwrap_err(),
            DecodeConstituentError::ForbiddenDelimiter
        );
        assert_eq!(
            read("Name,Identifier\na\tb,c").unwrap_err(),
            DecodeConstituentError::ForbiddenDelimiter
        );
        assert_eq!(read("\n\n").unwrap_err(), DecodeConstituentError::MissingHeader);
        assert_eq!(
            read("Identifier,Name\nalice,Alice").unwrap_err(),
            DecodeConstituentError::UnknownHeader {
                header: "Identifier,Name".to_string()
            }
        );

        let mut big = "Name,Identifier".to_string();
        for i in 0..=MAX_CONSTITUENT_LINES {
            big.push_str(&format!("\n,id{}", i));
        }
        assert_eq!(
            read(&big).unwrap_err(),
            DecodeConstituentError::TooManyLines {
                count: MAX_CONSTITUENT_LINES + 1,
                max: MAX_CONSTITUENT_LINES
            }
        );
    }

    #[test]
    fn header_override_reads_names_and_identifiers() {
        let config = CsvConfiguration::new(
            "custom",
            vec!["Identifier".to_string()],
            vec!["{constituentID}".to_string()],
            "{option name}",
            SpecialKeys {
                constituents_export_header: Some("Navn,Studienummer,Mail".to_string()),
                ..SpecialKeys::default()
            },
        )
        .unwrap();
        let file = "Navn,Studienummer,Mail\nAlice,s1";
        let res = constituents_from_csv(file, Some(&config), 100).unwrap();
        assert_eq!(res, vec![Constituent::new("s1").with_name("Alice")]);
        // Without the configuration the header is unknown.
        assert!(constituents_from_csv(file, None, 100).is_err());
    }

    #[test]
    fn export_follows_the_flags() {
        let roster = vec![
            Constituent::new("bob").with_tag("staff"),
            Constituent::new("alice").with_name("Alice").with_email("alice@x.dk"),
        ];

        let csv = constituents_to_csv(&roster, &CsvConfiguration::default_configuration()).unwrap();
        assert_eq!(csv, "Name,Identifier,Email\nAlice,alice,alice@x.dk\nbob,bob,");

        let csv = constituents_to_csv(&roster, &CsvConfiguration::default_with_tags()).unwrap();
        assert_eq!(
            csv,
            "Name,Identifier,Tag,Email\nAlice,alice,,alice@x.dk\nbob,bob,staff,"
        );

        let csv = constituents_to_csv(&roster, &CsvConfiguration::smkid()).unwrap();
        assert_eq!(csv, "Studienummer\nalice\nbob");
    }

    #[test]
    fn hidden_names_do_not_import_back() {
        let roster = vec![Constituent::new("alice").with_name("Alice")];
        let config = CsvConfiguration::only_ids();
        let csv = constituents_to_csv(&roster, &config).unwrap();
        assert_eq!(csv, "Identifier,Email\nalice,");
        assert_eq!(
            constituents_from_csv(&csv, Some(&config), 100).unwrap_err(),
            DecodeConstituentError::UnknownHeader {
                header: "Identifier,Email".to_string()
            }
        );
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let file = "Name,Identifier,Tag\r\nAlice,alice,board\r\n\r\nBob,bob,-staff";
        assert_eq!(
            read(file).unwrap_err(),
            DecodeConstituentError::InvalidTag { lineno: 4 }
        );
    }

    #[test]
    fn export_then_import() {
        let roster = vec![
            Constituent::new("carol").with_name("Carol").with_tag("board"),
            Constituent::new("dan").with_email("dan@x.dk"),
        ];
        let config = CsvConfiguration::default_with_tags();
        let csv = constituents_to_csv(&roster, &config).unwrap();
        let back = constituents_from_csv(&csv, Some(&config), 100).unwrap();
        assert_eq!(back, roster);
    }
}
