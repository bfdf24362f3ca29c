use crate::qsf::*;
use log::debug;
use snafu::prelude::*;

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// The worksheet that holds the edits, unless told otherwise.
pub const DEFAULT_WORKSHEET: &str = "Survey_Edits";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct QsfEditConfig {
    #[serde(rename = "qsfPath")]
    pub qsf_path: Option<String>,
    #[serde(rename = "editsPath")]
    pub edits_path: Option<String>,
    #[serde(rename = "editsType")]
    pub edits_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "readOnlyQuestionIds")]
    pub read_only_question_ids: Option<Vec<String>>,
    #[serde(rename = "labelledChoiceIds")]
    pub labelled_choice_ids: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EditsType {
    Xlsx,
    Csv,
}

impl EditsType {
    pub fn parse(s: &str) -> QsfResult<EditsType> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(EditsType::Xlsx),
            "csv" => Ok(EditsType::Csv),
            x => whatever!("Unknown type of edit table: {:?}", x),
        }
    }

    /// Guesses the type of the edit table from the extension of the file.
    pub fn infer(path: &str) -> QsfResult<EditsType> {
        match Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
        {
            Some(e) if e == "xlsx" || e == "xlsm" => Ok(EditsType::Xlsx),
            Some(e) if e == "csv" => Ok(EditsType::Csv),
            _ => whatever!(
                "Cannot guess the type of the edit table {:?}, use --edits-type",
                path
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Everything needed for one run, once the command line and the configuration
/// file have been merged.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub qsf_path: String,
    pub edits_path: String,
    pub edits_type: EditsType,
    pub worksheet: String,
    pub out: OutputTarget,
    pub reference: Option<String>,
    pub rules: EditRules,
}

pub fn read_config(path: &str) -> QsfResult<QsfEditConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: QsfEditConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// The name of the output file when none is given: Updated_Survey_20240131_093000.qsf
pub fn default_output_name(now: &DateTime<Local>) -> String {
    format!("Updated_Survey_{}.qsf", now.format("%Y%m%d_%H%M%S"))
}

// Paths in the configuration file are relative to the configuration file.
fn resolve_path(root: &Path, p: &str) -> String {
    root.join(p).display().to_string()
}

fn build_rules(config: &QsfEditConfig) -> EditRules {
    let mut rules = EditRules::default();
    if let Some(ids) = &config.read_only_question_ids {
        rules.read_only_questions = ids.iter().map(|s| s.trim().to_string()).collect();
    }
    if let Some(ids) = &config.labelled_choice_ids {
        let labelled: HashSet<String> = ids.iter().map(|s| s.trim().to_string()).collect();
        rules.labelled_choices = labelled;
    }
    rules
}

pub fn resolve_settings(args: &Args) -> QsfResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (QsfEditConfig::default(), PathBuf::new()),
    };

    let qsf_path = match (&args.qsf, &config.qsf_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(&root, p),
        (None, None) => whatever!("No survey document given, use --qsf"),
    };
    let edits_path = match (&args.edits, &config.edits_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(&root, p),
        (None, None) => whatever!("No edit table given, use --edits"),
    };
    let edits_type = match args.edits_type.as_ref().or(config.edits_type.as_ref()) {
        Some(t) => EditsType::parse(t)?,
        None => EditsType::infer(&edits_path)?,
    };
    let worksheet = args
        .excel_worksheet_name
        .clone()
        .or_else(|| config.excel_worksheet_name.clone())
        .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());

    let out = match (&args.out, &config.output_path) {
        (Some(p), _) if p == "stdout" => OutputTarget::Stdout,
        (Some(p), _) => OutputTarget::File(PathBuf::from(p)),
        (None, Some(p)) if p == "stdout" => OutputTarget::Stdout,
        (None, Some(p)) => OutputTarget::File(root.join(p)),
        (None, None) => {
            let dir = Path::new(&qsf_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            OutputTarget::File(dir.join(default_output_name(&Local::now())))
        }
    };

    Ok(RunSettings {
        qsf_path,
        edits_path,
        edits_type,
        worksheet,
        out,
        reference: args.reference.clone(),
        rules: build_rules(&config),
    })
}
