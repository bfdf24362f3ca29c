use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde_json::Value as JSValue;
use survey_edits::*;
use text_diff::print_diff;

use crate::args::Args;
use crate::qsf::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum QsfError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the updated document"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet:?} not found in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("The edit table in {path} is empty"))]
    EmptyTable { path: String },
    #[snafu(display("Column {column:?} not found in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        lineno: usize,
        path: String,
    },
    #[snafu(display("Cannot apply the edits"))]
    ApplyingEdits { source: EditError },
    #[snafu(display("Error writing the updated document to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The updated document differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type QsfResult<T> = Result<T, QsfError>;

/// Reads a survey document.
pub fn read_document(path: &str) -> QsfResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!(
        "read_document: {}: {} survey elements",
        path,
        js["SurveyElements"].as_array().map(|a| a.len()).unwrap_or(0)
    );
    Ok(js)
}

fn read_edit_rows(settings: &RunSettings) -> QsfResult<Vec<EditRow>> {
    let path = settings.edits_path.as_str();
    info!("Attempting to read edit table {:?}", path);
    match settings.edits_type {
        EditsType::Xlsx => io_xlsx::read_excel_edits(path, &settings.worksheet),
        EditsType::Csv => io_csv::read_csv_edits(path),
    }
}

/// Serializes the document the way the survey tool expects it: indented, with the
/// non-ASCII characters kept as they are.
pub fn document_to_string(document: &JSValue) -> QsfResult<String> {
    serde_json::to_string_pretty(document).context(SerializingJsonSnafu {})
}

fn check_reference(reference_path: &str, produced: &str) -> QsfResult<()> {
    let reference = read_document(reference_path)?;
    let pretty_reference = document_to_string(&reference)?;
    if pretty_reference != produced {
        warn!("Found differences with the reference document");
        print_diff(pretty_reference.as_str(), produced, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The updated document matches the reference {}", reference_path);
    Ok(())
}

fn write_output(out: &OutputTarget, contents: &str) -> QsfResult<()> {
    match out {
        OutputTarget::Stdout => {
            println!("{}", contents);
            Ok(())
        }
        OutputTarget::File(path) => {
            let display = path.display().to_string();
            // Written next to the target first, so that a failure never leaves a
            // truncated document behind.
            let tmp: PathBuf = path.with_extension("qsf.partial");
            fs::write(&tmp, contents.as_bytes()).context(WritingOutputSnafu {
                path: tmp.display().to_string(),
            })?;
            fs::rename(&tmp, path).context(WritingOutputSnafu { path: display.clone() })?;
            info!("Updated document written to {}", display);
            Ok(())
        }
    }
}

/// Applies the edits described by the settings and writes the updated document.
///
/// Returns the ids of the deleted questions. Nothing is written if any step fails.
pub fn run_edits(settings: &RunSettings) -> QsfResult<BTreeSet<String>> {
    let document = read_document(&settings.qsf_path)?;
    let rows = read_edit_rows(settings)?;
    info!("Read {} edit rows", rows.len());
    let table = EditTable::from_rows(rows);

    let outcome = apply_edits(&table, &document, &settings.rules).context(ApplyingEditsSnafu {})?;
    let pretty = document_to_string(&outcome.document)?;

    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, &pretty)?;
    }

    write_output(&settings.out, &pretty)?;
    Ok(outcome.deleted)
}

pub fn deleted_summary(deleted: &BTreeSet<String>) -> Option<String> {
    if deleted.is_empty() {
        None
    } else {
        let ids: Vec<&str> = deleted.iter().map(|s| s.as_str()).collect();
        Some(format!("Questions deleted: {}", ids.join(", ")))
    }
}

pub fn run(args: &Args) -> QsfResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let deleted = run_edits(&settings)?;

    if let Some(summary) = deleted_summary(&deleted) {
        info!("{}", summary);
        // Keep the standard output clean when the document goes there.
        match settings.out {
            OutputTarget::Stdout => eprintln!("{}", summary),
            OutputTarget::File(_) => println!("{}", summary),
        }
    }
    Ok(())
}
