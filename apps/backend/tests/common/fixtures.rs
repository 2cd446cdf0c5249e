//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

/// Two quiz-worthy sentences; each yields exactly one question.
pub const CELL_NOTE: &str = "The mitochondria is the powerhouse of the cell. \
    Photosynthesis converts sunlight into chemical energy.";

/// Text with no sentence long enough to quiz on.
pub const SPARSE_NOTE: &str = "Cats nap. Dogs run. It is hot!";

/// Generate note content with a specified number of quiz-worthy sentences.
pub fn long_note(sentences: usize) -> String {
    (0..sentences)
        .map(|i| {
            format!(
                "Sentence number {} describes cellular respiration inside mitochondria.",
                i + 1
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body for note create/update requests.
pub fn note_request(title: &str, content: &str) -> Value {
    json!({
        "title": title,
        "content": content,
        "subject": "Biology",
    })
}

/// Body for quiz generation requests.
pub fn generate_request(num_questions: Option<usize>) -> Value {
    match num_questions {
        Some(n) => json!({ "num_questions": n }),
        None => json!({}),
    }
}

/// Body for answer selection requests.
pub fn answer_request(option: usize) -> Value {
    json!({ "option": option })
}
