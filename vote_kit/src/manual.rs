/*!

This is the long-form manual for `vote_kit` and `votekit`.

## Ballot files

Ballots are read and written as comma separated text. There is no quoting or
escaping: a [`CsvConfiguration`](crate::CsvConfiguration) refuses any literal
that could contain a delimiter, so a configuration that exists can always be
written and read back. Any newline convention is accepted on input, and empty
lines are skipped.

A file has a header line, then one line per ballot:
* the header starts with the `pre headers` of the configuration, followed by one
  column per option, named by expanding the `option header` template. Options are
  sorted by name.
* a ballot line starts with the `pre values` of the configuration, where
  `{constituentID}` is replaced by the identifier of the voter and
  `{constituentTag}` by their tag (or nothing). One cell per option follows.

With the `Default` configuration and two options `X` and `Y`:

```text
Identifier,X,Y
alice,1,0
bob,0,1
```

Reading a file is all-or-nothing: a header that does not match the
configuration, a line with the wrong number of columns, an empty identifier or
a cell that the voting method does not understand fails the whole import.

### Cells of the voting methods

* Simple majority: `1` for the chosen option, `0` for the others. A line without
  any `1` is a blank ballot. More than one `1` is an error.
* Yes/No: `1` for yes, `0` for no, an empty cell when the voter gave no answer.

### Presets

| Name                | Pre headers                        | Pre values                                    | Option header                   |
|---------------------|------------------------------------|-----------------------------------------------|---------------------------------|
| `Default`           | `Identifier`                       | `{constituentID}`                             | `{option name}`                 |
| `S/M-Kid`           | `Tidsstempel`, `Studienummer`      | `01/01/2001 00.00.01`, `{constituentID}`      | `Stemmeseddel [{option name}]`  |
| `Default with tags` | `Identifier`, `Tag`                | `{constituentID}`, `{constituentTag}`         | `{option name}`                 |
| `Only ids`          | `Identifier`                       | `{constituentID}`                             | `{option name}`                 |

## Constituent files

A list of constituents starts with one of these headers:

```text
Name,Identifier
Name,Identifier,Tag
Name,Identifier,Email
Name,Identifier,Tag,Email
```

The header decides which columns the following lines hold. Identifiers are
trimmed and lower-cased, a name equal to the identifier is dropped. A tag may
not start with `-`, and an email is either empty or at least 5 characters long.
Files containing `;` or a tab are refused, as are files with more than 10,000
constituents. Errors carry the line number, the header being line 1 and
empty lines included.

When exporting, the columns follow the `specialKeys` of the configuration:
`Name` unless `constituentsExportHideNames`, `Identifier`, `Tag` if
`constituentsExportShowTags`, `Email` unless `constituentsExportHideEmails`.
`constituentsExportHeader` replaces the header line.

When importing, a file whose header is exactly `constituentsExportHeader` is read
as `Name,Identifier`, whatever the other flags say.

Exports that hide the names do not import back: `Only ids` writes
`Identifier,Email` and `S/M-Kid` writes `Studienummer` alone, one identifier
per line. Neither header is accepted by the import of the same preset.

## Validation

Every vote runs, in order:
* its generic rules (`EveryoneVoted`, `NoBlanks`, or custom ones),
* the rules of its voting method (`noInvalidOptions` for simple majority,
  `preferenceForAllRequired` for yes/no when enabled),
* `AtLeastOneVote` and `OneVotePerUser`.

All the rules run, and all their errors are reported together. A generic or
method rule is kept once per id. The last two rules always run, even when a
custom rule uses the same id.

## Configuration

`votekit` accepts a JSON description of the election:

```json
{
  "name": "Board election",
  "method": "simpleMajority",
  "csvPreset": "Default",
  "validators": ["EveryoneVoted", "NoBlanks"],
  "methodValidators": ["noInvalidOptions"],
  "maxNameLength": 100
}
```

A full configuration may be given under `csvConfiguration` instead of
`csvPreset`:

```json
{
  "name": "Custom",
  "preHeaders": ["Identifier"],
  "preValues": ["{constituentID}"],
  "optionHeader": "Option {option name}",
  "specialKeys": { "constituentsExportShowTags": true }
}
```

It is checked exactly like a configuration built in code.

 */
