// Rendering of the texts that end up in the survey document.

/// Formats an edited question text.
///
/// A text with a colon gets its leading part in bold:
/// `Age: How old are you?` becomes `<p><strong>Age:</strong> How old are you?</p>`.
pub fn format_question_text(text: &str) -> String {
    match text.split_once(':') {
        Some((lead, rest)) => format!(
            "<p><strong>{}:</strong> {}</p>",
            lead.trim(),
            rest.trim()
        ),
        None => format!("<p>{}</p>", text.trim()),
    }
}

/// The content of a choice: the edited text, then the original text, then a
/// placeholder when both are empty.
pub fn choice_content<'a>(edited: &'a str, original: &'a str) -> &'a str {
    match (edited, original) {
        ("", "") => "Don't know",
        ("", o) => o,
        (e, _) => e,
    }
}

pub fn format_choice_display(label: Option<&str>, content: &str) -> String {
    match label {
        Some(l) => format!("<strong>{}</strong><br>{}", l, content),
        None => content.to_string(),
    }
}
