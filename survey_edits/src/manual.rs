/*!

This is the long-form manual for `survey_edits` and `qsfedit`.

## The survey document

The input is the JSON export of a survey (a `.qsf` file). Only a few parts of it
are read or modified; everything else is copied as is, in the same order.

```json
{
  "SurveyElements": [
    {"Element": "BL", "PrimaryAttribute": "Survey Blocks", "Payload": {
      "Description": "Screener",
      "BlockElements": [{"Type": "Question", "QuestionID": "Q1"}]
    }},
    {"Element": "SQ", "PrimaryAttribute": "Q1", "Payload": {
      "QuestionText": "Which region?",
      "Choices": {"1": {"Display": "North"}, "2": {"Display": "South"}},
      "DisplayLogic": {}
    }}
  ]
}
```

- `SQ` elements are questions, identified by their `PrimaryAttribute`.
- `BL` elements are blocks. The `Description` is the title of the block and
  `BlockElements` lists the questions it contains.

## The edit table

The edits are read from an Excel workbook (the `Survey_Edits` worksheet by default)
or from a CSV file. The first row contains the names of the columns:

| QuestionID | ElementType      | EditedText         | OriginalText  | Display Question (Yes/No) | Display Logic (Yes/No) | Label  |
|------------|------------------|--------------------|---------------|---------------------------|------------------------|--------|
| Q1         | QuestionText     | Region: Where?     | Which region? | Yes                       | No                     |        |
| Q1         | ChoiceText - 1   | Northern states    | North         | Yes                       |                        | Region |
| Q1         | ChoiceText - 2   |                    | South         | No                        |                        |        |
| Q7         | QuestionText     |                    |               | No                        |                        |        |

`QuestionID` and `ElementType` are mandatory. The other columns may be absent, in
which case they are treated as empty.

### Question rows

`ElementType` is `QuestionText`.

- `Display Question (Yes/No)` set to `No` deletes the question. It is also removed
  from all the blocks that list it.
- otherwise, if `EditedText` is filled and differs from `OriginalText`, it replaces the
  question text. A text with a colon gets its first part in bold: `Region: Where?`
  becomes `<p><strong>Region:</strong> Where?</p>`.

### Choice rows

`ElementType` is `ChoiceText - <choice id>`.

- `Display Question (Yes/No)` set to `No` removes the choice.
- otherwise the display of the choice becomes `EditedText`, or `OriginalText` if there is
  no edited text, or `Don't know` if both are empty. For the choices `1`, `2` and `3`,
  a `Label` is prepended in bold: `<strong>Region</strong><br>Northern states`.

Rows that point to a choice that does not exist are ignored.

### Display logic

If any row of a question has `Display Logic (Yes/No)` set to `No`, the display logic
of the question is removed.

All the flags are case-insensitive and surrounding spaces are ignored.

## Read-only questions

Some questions are never modified, whatever the edit table says. The default list
is [`DEFAULT_READ_ONLY_QUESTIONS`](crate::DEFAULT_READ_ONLY_QUESTIONS). It can be
replaced with the `readOnlyQuestionIds` option of the configuration file.

## Block titles

After the edits, the title of every block is recomputed from the blocks its
remaining questions belonged to in the original document. The names are sorted,
deduplicated and joined with ` / `. A block that has no remaining question keeps its
title.

## Configuration

`qsfedit` accepts an optional configuration file in JSON:

```json
{
  "qsfPath": "base.qsf",
  "editsPath": "edits.xlsx",
  "editsType": "xlsx",
  "excelWorksheetName": "Survey_Edits",
  "outputPath": "updated.qsf",
  "readOnlyQuestionIds": ["Q100", "Q101"],
  "labelledChoiceIds": ["1", "2", "3"]
}
```

All the fields are optional. Relative paths are resolved against the directory of the
configuration file. The command line flags take precedence.

 */
