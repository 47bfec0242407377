//! Keyword checks for the interactive session.

const FRACTAL_KEYWORDS: &[&str] = &["generate", "fractal", "create", "make"];

/// Whether the user's text suggests rendering something.
pub fn wants_fractal(text: &str) -> bool {
    let lower = text.to_lowercase();
    FRACTAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Whether the line ends the session.
pub fn is_quit(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("quit")
}

/// Whether the line answers yes.
pub fn is_affirmative(text: &str) -> bool {
    let answer = text.trim().to_lowercase();
    answer == "yes" || answer == "y"
}
