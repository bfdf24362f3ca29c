mod config;
mod format;
mod index;
pub mod manual;

use log::{debug, info};

use std::collections::BTreeSet;

use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

pub use crate::config::*;
pub use crate::format::{choice_content, format_choice_display, format_question_text};
pub use crate::index::{relabel_blocks, BlockIndex};

use crate::index::{block_payload_mut, element_kind, QUESTION_ELEMENT, SURVEY_ELEMENTS};

/// Applies the edit table to a survey document.
///
/// The input document is left untouched: the edits are applied to a copy, which is
/// returned along with the questions that were deleted.
///
/// Arguments:
/// * `table` the edit rows, grouped by question
/// * `document` the survey document, as exported by the survey tool
/// * `rules` the questions and choices that get a special treatment
pub fn apply_edits(
    table: &EditTable,
    document: &JSValue,
    rules: &EditRules,
) -> Result<EditOutcome, EditError> {
    info!(
        "Applying {} edit rows for {} questions",
        table.num_rows(),
        table.num_groups()
    );

    // The block names come from the document before any question gets removed.
    let index = BlockIndex::build(document);

    let mut updated = document.clone();
    let elements: Vec<JSValue> = match updated.get_mut(SURVEY_ELEMENTS) {
        Some(JSValue::Array(elements)) => std::mem::take(elements),
        Some(_) => return Err(EditError::SurveyElementsNotList),
        None => return Err(EditError::MissingSurveyElements),
    };

    let mut deleted: BTreeSet<String> = BTreeSet::new();
    let mut kept: Vec<JSValue> = Vec::with_capacity(elements.len());
    for (position, mut element) in elements.into_iter().enumerate() {
        if element_kind(&element) != Some(QUESTION_ELEMENT) {
            kept.push(element);
            continue;
        }

        let qid: String = element
            .get("PrimaryAttribute")
            .and_then(|q| q.as_str())
            .map(|s| s.to_string())
            .ok_or(EditError::MissingQuestionId { position })?;

        if rules.is_read_only(&qid) {
            debug!("apply_edits: {}: read-only, skipping", qid);
            kept.push(element);
            continue;
        }

        let group = match table.group(&qid) {
            Some(group) => group,
            None => {
                kept.push(element);
                continue;
            }
        };

        let hidden = group
            .iter()
            .find(|row| row.is_question_text())
            .map(|row| row.is_hidden())
            .unwrap_or(false);
        if hidden {
            info!("apply_edits: {}: deleting question", qid);
            deleted.insert(qid);
            continue;
        }

        edit_question(&qid, &mut element, group, rules);
        kept.push(element);
    }

    if !deleted.is_empty() {
        for element in kept.iter_mut() {
            prune_block(element, &deleted);
        }
    }

    updated[SURVEY_ELEMENTS] = JSValue::Array(kept);
    index.relabel(&mut updated);

    info!("apply_edits: {} questions deleted", deleted.len());
    Ok(EditOutcome {
        document: updated,
        deleted,
    })
}

fn edit_question(qid: &str, element: &mut JSValue, group: &[EditRow], rules: &EditRules) {
    let payload = match element.get_mut("Payload").and_then(|p| p.as_object_mut()) {
        Some(payload) => payload,
        None => {
            debug!("edit_question: {}: no payload, skipping", qid);
            return;
        }
    };

    if group.iter().any(|row| row.drops_display_logic())
        && payload.shift_remove("DisplayLogic").is_some()
    {
        debug!("edit_question: {}: removed display logic", qid);
    }

    for row in group {
        if row.is_question_text() {
            let edited = row.edited();
            if !edited.is_empty() && edited != row.original() {
                debug!("edit_question: {}: new question text {:?}", qid, edited);
                payload.insert(
                    "QuestionText".to_string(),
                    JSValue::String(format_question_text(edited)),
                );
            }
        } else if row.is_choice_text() {
            if let Err(reason) = edit_choice(payload, row, rules) {
                debug!(
                    "edit_question: {}: skipping row {:?}: {}",
                    qid, row.element_type, reason
                );
            }
        }
    }
}

fn edit_choice(
    payload: &mut JSMap<String, JSValue>,
    row: &EditRow,
    rules: &EditRules,
) -> Result<(), &'static str> {
    let choices = match payload.get_mut("Choices") {
        Some(choices) => choices.as_object_mut().ok_or("Choices is not an object")?,
        // Nothing to edit.
        None => return Ok(()),
    };
    let choice_id = row.choice_id().ok_or("no choice id in the element type")?;

    if row.is_hidden() {
        choices.shift_remove(choice_id);
        return Ok(());
    }

    let choice = match choices.get_mut(choice_id) {
        Some(choice) => choice.as_object_mut().ok_or("the choice is not an object")?,
        None => return Ok(()),
    };
    let content = choice_content(row.edited(), row.original());
    let label = row.label().filter(|_| rules.accepts_label(choice_id));
    choice.insert(
        "Display".to_string(),
        JSValue::String(format_choice_display(label, content)),
    );
    Ok(())
}

/// Removes the deleted questions from the members of a block.
fn prune_block(element: &mut JSValue, deleted: &BTreeSet<String>) {
    let members = match block_payload_mut(element)
        .and_then(|p| p.get_mut("BlockElements"))
        .and_then(|m| m.as_array_mut())
    {
        Some(members) => members,
        None => return,
    };
    members.retain(|m| {
        let is_question = m.get("Type").and_then(|t| t.as_str()) == Some("Question");
        let qid = m.get("QuestionID").and_then(|q| q.as_str());
        !(is_question && qid.map(|q| deleted.contains(q)).unwrap_or(false))
    });
}
