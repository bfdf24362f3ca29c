use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::qsf::{io_common::ColumnIndexes, *};

/// Reads the edit rows from a worksheet of an Excel workbook.
pub fn read_excel_edits(path: &str, worksheet: &str) -> QsfResult<Vec<EditRow>> {
    debug!(
        "read_excel_edits: path: {:?} worksheet: {:?}",
        path, worksheet
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range(worksheet)
        .context(MissingWorksheetSnafu { worksheet, path })?
        .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header: Vec<Option<String>> = iter
        .next()
        .context(EmptyTableSnafu { path })?
        .iter()
        .map(|cell| match cell_to_string(cell) {
            s if s.is_empty() => None,
            s => Some(s),
        })
        .collect();
    debug!("read_excel_edits: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<EditRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        match cols.make_row(&cells) {
            Some(edit_row) => res.push(edit_row),
            None => {
                // The header is line 1.
                debug!("read_excel_edits: line {}: no question id, skipping", idx + 2);
            }
        }
    }
    Ok(res)
}

/// Renders a cell as text.
///
/// Whole numbers are stored as floats by Excel and are written without the
/// decimal part. Errors and empty cells are empty.
pub fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => f.to_string(),
        DataType::Error(_) | DataType::Empty => String::new(),
        #[allow(unreachable_patterns)]
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/basic_edits/basic_edits_edits.xlsx").to_string()
    }

    #[test]
    fn cells_as_text() {
        assert_eq!(cell_to_string(&DataType::String(" Yes ".to_string())), "Yes");
        assert_eq!(cell_to_string(&DataType::Float(3.0)), "3");
        assert_eq!(cell_to_string(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&DataType::Int(12)), "12");
        assert_eq!(cell_to_string(&DataType::Bool(true)), "true");
        assert_eq!(cell_to_string(&DataType::Empty), "");
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_edits("does/not/exist.xlsx", DEFAULT_WORKSHEET);
        assert!(matches!(res, Err(QsfError::OpeningExcel { .. })));
    }

    #[test]
    fn reads_the_named_worksheet() {
        let rows = read_excel_edits(&workbook(), DEFAULT_WORKSHEET).unwrap();
        let csv_path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/basic_edits/basic_edits_edits.csv");
        let from_csv = crate::qsf::io_csv::read_csv_edits(csv_path).unwrap();
        assert_eq!(rows.len(), 14);
        assert_eq!(rows, from_csv);
        assert_eq!(rows[1].edited_text, "Region: Where do you live?");
        assert!(rows[1].drops_display_logic());
        // " no " in the sheet.
        assert!(rows[11].is_hidden());
    }

    #[test]
    fn numbers_and_spaces_in_cells() {
        let rows = read_excel_edits(&workbook(), "Cells").unwrap();
        assert_eq!(
            rows,
            vec![
                EditRow {
                    question_id: "Q7".to_string(),
                    element_type: "QuestionText".to_string(),
                    edited_text: "5".to_string(),
                    original_text: "2.5".to_string(),
                    display: Some("No".to_string()),
                    display_logic: Some("no".to_string()),
                    label: Some("".to_string()),
                },
                EditRow {
                    question_id: "12".to_string(),
                    element_type: "ChoiceText - 3".to_string(),
                    edited_text: "Spaced".to_string(),
                    original_text: "".to_string(),
                    display: Some("Yes".to_string()),
                    display_logic: Some("".to_string()),
                    label: Some("Tag".to_string()),
                },
            ]
        );
        assert!(rows[0].is_hidden());
        assert_eq!(rows[1].choice_id(), Some("3"));
    }

    #[test]
    fn unknown_worksheet() {
        match read_excel_edits(&workbook(), "Nope") {
            Err(QsfError::MissingWorksheet { worksheet, .. }) => assert_eq!(worksheet, "Nope"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn worksheet_without_required_columns() {
        let res = read_excel_edits(&workbook(), "Notes");
        assert!(matches!(res, Err(QsfError::MissingColumn { .. })));
    }
}
