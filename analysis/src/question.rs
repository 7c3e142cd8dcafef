/// Lower-cased prefixes that mark a text as a question.
pub const INTERROGATIVE_PREFIXES: [&str; 3] = ["what", "how", "why"];

pub fn has_question_mark(text: &str) -> bool {
    text.contains('?')
}

/// Plain prefix check: "whatever" and "however" count too.
pub fn starts_with_interrogative(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INTERROGATIVE_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

pub fn is_question(text: &str) -> bool {
    has_question_mark(text) || starts_with_interrogative(text)
}
