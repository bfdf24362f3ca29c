// Primitives shared by the readers of edit tables.

use std::collections::HashMap;

use log::debug;
use snafu::prelude::*;

use crate::qsf::*;

pub const COL_QUESTION_ID: &str = "QuestionID";
pub const COL_ELEMENT_TYPE: &str = "ElementType";
pub const COL_EDITED_TEXT: &str = "EditedText";
pub const COL_ORIGINAL_TEXT: &str = "OriginalText";
pub const COL_DISPLAY: &str = "Display Question (Yes/No)";
pub const COL_DISPLAY_LOGIC: &str = "Display Logic (Yes/No)";
pub const COL_LABEL: &str = "Label";

/// The position of each column of the edit table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndexes {
    question_id: usize,
    element_type: usize,
    edited_text: Option<usize>,
    original_text: Option<usize>,
    display: Option<usize>,
    display_logic: Option<usize>,
    label: Option<usize>,
}

impl ColumnIndexes {
    /// Finds the columns from the header of a file (the names of each of the columns).
    ///
    /// Only the question id and the element type are required.
    pub fn from_header(header: &[Option<String>], path: &str) -> QsfResult<ColumnIndexes> {
        let col_names: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, x)| {
                x.as_ref()
                    .map(|s| (s.trim_start_matches('\u{feff}').trim().to_string(), idx))
            })
            .collect();
        debug!("from_header: col_names: {:?}", col_names);

        let required = |column: &str| -> QsfResult<usize> {
            col_names
                .get(column)
                .cloned()
                .context(MissingColumnSnafu { column, path })
        };
        let optional = |column: &str| col_names.get(column).cloned();

        Ok(ColumnIndexes {
            question_id: required(COL_QUESTION_ID)?,
            element_type: required(COL_ELEMENT_TYPE)?,
            edited_text: optional(COL_EDITED_TEXT),
            original_text: optional(COL_ORIGINAL_TEXT),
            display: optional(COL_DISPLAY),
            display_logic: optional(COL_DISPLAY_LOGIC),
            label: optional(COL_LABEL),
        })
    }

    /// Builds an edit row from the rendered cells of a line.
    ///
    /// Lines without a question id are not part of any question and are dropped.
    pub fn make_row(&self, cells: &[String]) -> Option<EditRow> {
        let cell = |idx: usize| cells.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();
        let question_id = cell(self.question_id);
        if question_id.is_empty() {
            return None;
        }
        Some(EditRow {
            question_id,
            element_type: cell(self.element_type),
            edited_text: self.edited_text.map(cell).unwrap_or_default(),
            original_text: self.original_text.map(cell).unwrap_or_default(),
            display: self.display.map(cell),
            display_logic: self.display_logic.map(cell),
            label: self.label.map(cell),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<Option<String>> {
        names
            .iter()
            .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
            .collect()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_header() {
        let cols = ColumnIndexes::from_header(
            &header(&[
                "\u{feff}QuestionID",
                "ElementType",
                "",
                "OriginalText",
                "EditedText",
                "Display Question (Yes/No)",
                "Display Logic (Yes/No)",
                "Label",
            ]),
            "edits.csv",
        )
        .unwrap();
        let row = cols
            .make_row(&cells(&[
                " Q1 ",
                "ChoiceText - 2",
                "ignored",
                "Old",
                "New ",
                "No",
                "",
                "Region",
            ]))
            .unwrap();
        assert_eq!(
            row,
            EditRow {
                question_id: "Q1".to_string(),
                element_type: "ChoiceText - 2".to_string(),
                edited_text: "New".to_string(),
                original_text: "Old".to_string(),
                display: Some("No".to_string()),
                display_logic: Some("".to_string()),
                label: Some("Region".to_string()),
            }
        );
        assert!(row.is_hidden());
        assert!(!row.drops_display_logic());
    }

    #[test]
    fn optional_columns_and_short_lines() {
        let cols =
            ColumnIndexes::from_header(&header(&["ElementType", "QuestionID"]), "edits.csv")
                .unwrap();
        let row = cols.make_row(&cells(&["QuestionText", "Q7"])).unwrap();
        assert_eq!(row.question_id, "Q7");
        assert_eq!(row.display, None);
        assert_eq!(row.label, None);
        assert_eq!(row.edited_text, "");
        // No question id: not a row.
        assert_eq!(cols.make_row(&cells(&["QuestionText", "  "])), None);
        assert_eq!(cols.make_row(&cells(&["QuestionText"])), None);
    }

    #[test]
    fn missing_required_column() {
        let res = ColumnIndexes::from_header(&header(&["QuestionID", "Label"]), "edits.csv");
        match res {
            Err(QsfError::MissingColumn { column, .. }) => assert_eq!(column, COL_ELEMENT_TYPE),
            x => panic!("unexpected result {:?}", x),
        }
    }
}
