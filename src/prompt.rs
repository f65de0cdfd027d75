// src/prompt.rs
// =============================================================================
// Wraps a snapshot into the text an assistant model receives.
//
// Two shapes:
// - system_instruction: the snapshot baked into the model's standing orders
// - user_turn: a question with the snapshot attached underneath
//
// Talking to the model is somebody else's job; we only produce strings.
// =============================================================================

const ANALYST_PREAMBLE: &str = "You are a coding expert who analyses GitHub repositories. \
Keep replies succinct and polite. Do not use markdown title headers. \
Wrap file names and identifiers in backticks.";

pub fn system_instruction(snapshot: &str) -> String {
    format!(
        "{}\nBase your answers on this repository:\n{}",
        ANALYST_PREAMBLE, snapshot
    )
}

pub fn user_turn(question: &str, snapshot: &str) -> String {
    format!(
        "{}\n\n[Repository context follows]\n{}",
        question.trim(),
        snapshot
    )
}
