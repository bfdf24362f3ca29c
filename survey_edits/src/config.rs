// ********* Input data structures ***********

use std::collections::{BTreeSet, HashMap, HashSet};
use std::error::Error;
use std::fmt::Display;

use serde_json::Value as JSValue;

/// The value of the sub-element type for the row that targets the question text itself.
pub const QUESTION_TEXT: &str = "QuestionText";

/// Prefix of the sub-element type for rows that target a choice. The full form is
/// `ChoiceText - <choice id>`.
pub const CHOICE_TEXT: &str = "ChoiceText";

/// One line of the edit table.
///
/// All the text fields are kept as they were read, except that the readers trim
/// the surrounding whitespace. The flags are optional because the corresponding
/// columns are optional in the spreadsheet.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EditRow {
    pub question_id: String,
    pub element_type: String,
    pub edited_text: String,
    pub original_text: String,
    /// "Display Question (Yes/No)"
    pub display: Option<String>,
    /// "Display Logic (Yes/No)"
    pub display_logic: Option<String>,
    pub label: Option<String>,
}

fn is_no(flag: &Option<String>) -> bool {
    flag.as_deref()
        .map(|s| s.trim().eq_ignore_ascii_case("no"))
        .unwrap_or(false)
}

impl EditRow {
    pub fn is_question_text(&self) -> bool {
        self.element_type == QUESTION_TEXT
    }

    pub fn is_choice_text(&self) -> bool {
        self.element_type.starts_with(CHOICE_TEXT)
    }

    /// The choice id targeted by a `ChoiceText - <id>` row.
    ///
    /// Only the token between the first and the second separator is used.
    pub fn choice_id(&self) -> Option<&str> {
        self.element_type.split(" - ").nth(1).map(|s| s.trim())
    }

    /// True when the display flag says "no".
    pub fn is_hidden(&self) -> bool {
        is_no(&self.display)
    }

    /// True when the display logic flag says "no".
    pub fn drops_display_logic(&self) -> bool {
        is_no(&self.display_logic)
    }

    pub fn edited(&self) -> &str {
        self.edited_text.trim()
    }

    pub fn original(&self) -> &str {
        self.original_text.trim()
    }

    /// The label, if it carries anything. Spreadsheet exports sometimes write
    /// missing values as `nan`, which counts as no label.
    pub fn label(&self) -> Option<&str> {
        match self.label.as_deref().map(|s| s.trim()) {
            Some(l) if !l.is_empty() && !l.eq_ignore_ascii_case("nan") => Some(l),
            _ => None,
        }
    }
}

/// The edit rows, grouped by question id.
///
/// The order of the rows inside a group is the order in which they were added.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EditTable {
    groups: HashMap<String, Vec<EditRow>>,
}

impl EditTable {
    pub fn new() -> EditTable {
        EditTable::default()
    }

    pub fn from_rows(rows: Vec<EditRow>) -> EditTable {
        let mut table = EditTable::new();
        for row in rows {
            table.push(row);
        }
        table
    }

    pub fn push(&mut self, row: EditRow) {
        self.groups
            .entry(row.question_id.clone())
            .or_insert_with(Vec::new)
            .push(row);
    }

    pub fn group(&self, question_id: &str) -> Option<&[EditRow]> {
        self.groups.get(question_id).map(|v| v.as_slice())
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_rows(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct EditOutcome {
    /// The updated survey document.
    pub document: JSValue,
    /// The questions removed from the document, in sorted order.
    pub deleted: BTreeSet<String>,
}

/// Errors that prevent the edits from being applied.
///
/// Anything that is not covered here is tolerated: the corresponding edit is
/// skipped and the element is kept as it is.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum EditError {
    /// The document has no `SurveyElements` entry.
    MissingSurveyElements,
    /// `SurveyElements` is present but it is not a list.
    SurveyElementsNotList,
    /// A question element without a string `PrimaryAttribute`.
    MissingQuestionId { position: usize },
}

impl Error for EditError {}

impl Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::MissingSurveyElements => {
                write!(f, "the survey document has no SurveyElements")
            }
            EditError::SurveyElementsNotList => {
                write!(f, "SurveyElements in the survey document is not a list")
            }
            EditError::MissingQuestionId { position } => write!(
                f,
                "survey element #{} is a question without a PrimaryAttribute",
                position
            ),
        }
    }
}

// ********* Configuration **********

/// The questions that are never touched by an edit table.
pub const DEFAULT_READ_ONLY_QUESTIONS: [&str; 49] = [
    "Q462", "Q463", "Q464", "Q465", "Q466", "Q467", "Q468", "Q469", "Q470", "Q471", "Q472",
    "Q473", "Q474", "Q475", "Q476", "Q477", "Q478", "Q479", "Q480", "Q481", "Q482", "Q483",
    "Q484", "Q485", "Q487", "Q488", "Q489", "Q492", "Q493", "Q494", "Q495", "Q496", "Q497",
    "Q498", "Q499", "Q500", "Q501", "Q502", "Q503", "Q504", "Q505", "Q506", "Q507", "Q508",
    "Q509", "Q510", "Q511", "Q512", "Q518",
];

/// The choices whose display gets prefixed by the label of the row.
pub const DEFAULT_LABELLED_CHOICES: [&str; 3] = ["1", "2", "3"];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EditRules {
    /// Questions that are passed through unchanged, whatever the edit table says.
    pub read_only_questions: HashSet<String>,
    /// Choice ids that accept a label.
    pub labelled_choices: HashSet<String>,
}

impl Default for EditRules {
    fn default() -> Self {
        EditRules {
            read_only_questions: DEFAULT_READ_ONLY_QUESTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            labelled_choices: DEFAULT_LABELLED_CHOICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EditRules {
    pub fn is_read_only(&self, question_id: &str) -> bool {
        self.read_only_questions.contains(question_id)
    }

    pub fn accepts_label(&self, choice_id: &str) -> bool {
        self.labelled_choices.contains(choice_id)
    }
}
