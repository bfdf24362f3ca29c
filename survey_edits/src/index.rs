use log::debug;

use std::collections::{BTreeSet, HashMap};

use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

pub(crate) const SURVEY_ELEMENTS: &str = "SurveyElements";
pub(crate) const QUESTION_ELEMENT: &str = "SQ";
pub(crate) const BLOCK_ELEMENT: &str = "BL";

pub(crate) fn element_kind(element: &JSValue) -> Option<&str> {
    element.get("Element").and_then(|e| e.as_str())
}

/// The payload of a block element, if it has the expected shape.
pub(crate) fn block_payload_mut(element: &mut JSValue) -> Option<&mut JSMap<String, JSValue>> {
    if element_kind(element) != Some(BLOCK_ELEMENT) {
        return None;
    }
    element.get_mut("Payload").and_then(|p| p.as_object_mut())
}

fn block_payload(element: &JSValue) -> Option<&JSMap<String, JSValue>> {
    if element_kind(element) != Some(BLOCK_ELEMENT) {
        return None;
    }
    element.get("Payload").and_then(|p| p.as_object())
}

/// The question ids referenced by the members of a block, in order.
fn question_members(payload: &JSMap<String, JSValue>) -> Vec<&str> {
    match payload.get("BlockElements").and_then(|m| m.as_array()) {
        Some(members) => members
            .iter()
            .filter(|m| m.get("Type").and_then(|t| t.as_str()) == Some("Question"))
            .filter_map(|m| m.get("QuestionID").and_then(|q| q.as_str()))
            .collect(),
        None => Vec::new(),
    }
}

/// Maps each question to the name of the block that contains it.
///
/// When a question is listed in several blocks, the last block in document
/// order wins.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BlockIndex {
    block_by_question: HashMap<String, String>,
}

impl BlockIndex {
    pub fn build(document: &JSValue) -> BlockIndex {
        let mut block_by_question: HashMap<String, String> = HashMap::new();
        let elements = document
            .get(SURVEY_ELEMENTS)
            .and_then(|e| e.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        for payload in elements.iter().filter_map(block_payload) {
            let block_name = payload
                .get("Description")
                .and_then(|d| d.as_str())
                .unwrap_or("");
            for qid in question_members(payload) {
                block_by_question.insert(qid.to_string(), block_name.to_string());
            }
        }
        debug!(
            "BlockIndex::build: {} questions indexed",
            block_by_question.len()
        );
        BlockIndex { block_by_question }
    }

    pub fn block_name(&self, question_id: &str) -> Option<&str> {
        self.block_by_question.get(question_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.block_by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_by_question.is_empty()
    }

    /// Recomputes the description of every block from the names this index
    /// associates to its current questions.
    ///
    /// A block whose questions have no known name keeps its description.
    pub fn relabel(&self, document: &mut JSValue) {
        let elements = match document
            .get_mut(SURVEY_ELEMENTS)
            .and_then(|e| e.as_array_mut())
        {
            Some(elements) => elements,
            None => return,
        };
        for payload in elements.iter_mut().filter_map(block_payload_mut) {
            let names: BTreeSet<&str> = question_members(payload)
                .into_iter()
                .filter_map(|qid| self.block_name(qid))
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                continue;
            }
            let description = names.into_iter().collect::<Vec<&str>>().join(" / ");
            debug!("relabel: block description: {:?}", description);
            payload.insert("Description".to_string(), JSValue::String(description));
        }
    }
}

/// Relabels the blocks using the block names currently found in the document.
pub fn relabel_blocks(document: &mut JSValue) {
    let index = BlockIndex::build(document);
    index.relabel(document);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(name: &str, qids: &[&str]) -> JSValue {
        let members: Vec<JSValue> = qids
            .iter()
            .map(|q| json!({"Type": "Question", "QuestionID": q}))
            .collect();
        json!({"Element": "BL", "PrimaryAttribute": "Survey Blocks",
               "Payload": {"Description": name, "BlockElements": members}})
    }

    fn descriptions(document: &JSValue) -> Vec<String> {
        document["SurveyElements"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["Payload"]["Description"].as_str())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn build_maps_questions_to_block_names() {
        let doc = json!({"SurveyElements": [
            block("Screener", &["Q1", "Q2"]),
            {"Element": "SQ", "PrimaryAttribute": "Q1", "Payload": {}},
            block("Profile", &["Q3"]),
        ]});
        let index = BlockIndex::build(&doc);
        assert_eq!(index.len(), 3);
        assert_eq!(index.block_name("Q1"), Some("Screener"));
        assert_eq!(index.block_name("Q3"), Some("Profile"));
        assert_eq!(index.block_name("Q4"), None);
    }

    #[test]
    fn build_last_block_wins() {
        let doc = json!({"SurveyElements": [
            block("First", &["Q1"]),
            block("Second", &["Q1"]),
        ]});
        assert_eq!(BlockIndex::build(&doc).block_name("Q1"), Some("Second"));
    }

    #[test]
    fn build_ignores_malformed_blocks() {
        let doc = json!({"SurveyElements": [
            {"Element": "BL", "Payload": "not an object"},
            {"Element": "BL", "Payload": {"Description": "No members"}},
            {"Element": "BL", "Payload": {"BlockElements": [
                {"Type": "Question", "QuestionID": "Q9"},
                {"Type": "Page Break"},
                {"Type": "Question"},
                "junk"
            ]}},
        ]});
        let index = BlockIndex::build(&doc);
        assert_eq!(index.len(), 1);
        assert_eq!(index.block_name("Q9"), Some(""));
        assert!(BlockIndex::build(&json!({})).is_empty());
    }

    #[test]
    fn relabel_uses_original_owners() {
        let original = json!({"SurveyElements": [
            block("Screener", &["Q1", "Q2"]),
            block("Profile", &["Q3"]),
        ]});
        let index = BlockIndex::build(&original);
        // Q1 moved to the second block, Q2 deleted.
        let mut edited = json!({"SurveyElements": [
            block("Screener", &[]),
            block("Profile", &["Q3", "Q1"]),
        ]});
        index.relabel(&mut edited);
        assert_eq!(descriptions(&edited), vec!["Screener", "Profile / Screener"]);
    }

    #[test]
    fn relabel_twice_is_stable() {
        let original = json!({"SurveyElements": [
            block("Screener", &["Q1", "Q2"]),
            block("Profile", &["Q3"]),
        ]});
        let index = BlockIndex::build(&original);
        let mut doc = json!({"SurveyElements": [
            block("Screener", &["Q2", "Q3"]),
            block("Profile", &["Q1"]),
        ]});
        index.relabel(&mut doc);
        let once = doc.clone();
        index.relabel(&mut doc);
        assert_eq!(doc, once);
        assert_eq!(descriptions(&doc), vec!["Profile / Screener", "Screener"]);
    }

    #[test]
    fn relabel_blocks_without_changes_is_a_no_op() {
        let mut doc = json!({"SurveyElements": [
            block("Screener", &["Q1", "Q2"]),
            {"Element": "SQ", "PrimaryAttribute": "Q1", "Payload": {"QuestionText": "Hi"}},
            block("", &["Q3"]),
        ]});
        let before = doc.clone();
        relabel_blocks(&mut doc);
        assert_eq!(doc, before);
        relabel_blocks(&mut doc);
        assert_eq!(doc, before);
    }
}
