//! Prompt templates sent to the completion service.

/// Stand-in for the language slot when detection came up empty.
pub const UNRESOLVED_LANGUAGE_LABEL: &str = "source";

pub const OPTIMIZE_TEMPLATE: &str = "You are a helpful code formatter and explainer. \
Given the following messy or unordered {language} code, return a clean, well-formatted, \
and readable version with helpful comments explaining the code. \
Do not add explanations outside the code, just return the cleaned and commented code.\n\n\
Messy code:\n{code}\n\nCleaned and commented code:";

pub const EXPLAIN_TEMPLATE: &str = "You are a helpful programming assistant. \
Explain what the following {language} code does, step by step, in a visually structured way. \
For each important code line or block, start with a callout (\u{27A4}) and show the code \
using inline code formatting (single backticks). \
Then, use bullet points to explain what that line or block does. \
Highlight important terms or concepts in bold. \
Use clear, readable markdown, and make the explanation easy to scan, \
like a professional code review or tutorial.\n\n\
Code:\n{code}\n\nExplanation:";

pub fn build_optimize_prompt(code: &str, language: Option<&str>) -> String {
    fill(OPTIMIZE_TEMPLATE, code, language)
}

pub fn build_explain_prompt(code: &str, language: Option<&str>) -> String {
    fill(EXPLAIN_TEMPLATE, code, language)
}

// Language goes in first so a literal "{code}" inside the user's code is
// never treated as a placeholder.
fn fill(template: &str, code: &str, language: Option<&str>) -> String {
    let language = language.unwrap_or(UNRESOLVED_LANGUAGE_LABEL);
    let (head, tail) = template
        .split_once("{code}")
        .unwrap_or((template, ""));
    format!(
        "{}{}{}",
        head.replace("{language}", language),
        code,
        tail.replace("{language}", language)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_prompt_embeds_language_and_code() {
        let prompt = build_optimize_prompt("x=1", Some("python"));
        assert!(prompt.contains("messy or unordered python code"));
        assert!(prompt.ends_with("Messy code:\nx=1\n\nCleaned and commented code:"));
    }

    #[test]
    fn explain_prompt_asks_for_callouts() {
        let prompt = build_explain_prompt("x=1", Some("python"));
        assert!(prompt.contains("following python code does, step by step"));
        assert!(prompt.contains('\u{27A4}'));
        assert!(prompt.ends_with("Code:\nx=1\n\nExplanation:"));
    }

    #[test]
    fn unresolved_language_uses_generic_label() {
        let prompt = build_optimize_prompt("x", None);
        assert!(prompt.contains("messy or unordered source code"));
    }

    #[test]
    fn placeholders_inside_code_are_left_alone() {
        let code = "fmt = \"{language} {code}\"";
        let prompt = build_optimize_prompt(code, Some("python"));
        assert!(prompt.contains(code));
    }
}
