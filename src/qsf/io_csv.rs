// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::qsf::{io_common::ColumnIndexes, *};

/// Reads the edit rows from a CSV file. The first line is the header.
pub fn read_csv_edits(path: &str) -> QsfResult<Vec<EditRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_record = records
        .next()
        .context(EmptyTableSnafu { path })?
        .context(CsvLineParseSnafu { lineno: 1usize, path })?;
    let header: Vec<Option<String>> = header_record
        .iter()
        .map(|s| if s.trim().is_empty() { None } else { Some(s.to_string()) })
        .collect();
    debug!("read_csv_edits: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<EditRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno, path })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        match cols.make_row(&cells) {
            Some(edit_row) => res.push(edit_row),
            None => debug!("read_csv_edits: line {}: no question id, skipping", lineno),
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tmp(name: &str, contents: &str) -> String {
        let p = std::env::temp_dir().join(format!("qsfedit-{}-{}.csv", name, std::process::id()));
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn reads_rows() {
        let path = write_tmp(
            "reads_rows",
            "QuestionID,ElementType,EditedText,OriginalText,Display Question (Yes/No),Display Logic (Yes/No),Label\n\
             Q1,QuestionText,\"Age: How old, exactly?\",Age,Yes,No,\n\
             ,QuestionText,orphan,,,,\n\
             Q1,ChoiceText - 1,Ünder 18,,Yes,,Young\n",
        );
        let rows = read_csv_edits(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].edited_text, "Age: How old, exactly?");
        assert!(rows[0].drops_display_logic());
        assert_eq!(rows[1].choice_id(), Some("1"));
        assert_eq!(rows[1].edited_text, "Ünder 18");
        assert_eq!(rows[1].label(), Some("Young"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_file() {
        let path = write_tmp("empty_file", "");
        assert!(matches!(
            read_csv_edits(&path),
            Err(QsfError::EmptyTable { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_edits("does/not/exist.csv"),
            Err(QsfError::CsvOpen { .. })
        ));
    }
}
