//! Prompt construction. Pure string building, no state.

use plume_core::correction::CorrectionItem;

/// Escape the user's text before quoting it inside a prompt, so embedded
/// quotes cannot close the quoted block early.
fn escape_for_prompt(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Prompt for one correction run. Deterministic in `text`; the caller
/// guarantees the text is non-empty after trimming.
pub fn correction_prompt(text: &str) -> String {
    format!(
        r#"You are a professional French language tutor. Your task is to correct the following French text.
Provide the corrected text and a detailed list of all corrections made.

Text to correct: "{text}"

Respond in this exact JSON format:
{{
  "correctedText": "The fully corrected text goes here",
  "explanation": "A brief summary of the main changes",
  "corrections": [
    {{
      "original": "original text that was changed",
      "corrected": "corrected version of the text",
      "shortExplanation": "one-line reason for the change",
      "explanation": "detailed explanation of why this correction was made",
      "type": "Punctuation | Conjugation | Spelling | Comprehension | Grammar | Other"
    }}
  ]
}}

Important:
- List EVERY correction made, no matter how small
- Include spelling, grammar, conjugation and punctuation corrections
- "type" must be exactly one of: Punctuation, Conjugation, Spelling, Comprehension, Grammar, Other
- Be specific in your explanations
- Only respond with the JSON object, nothing else"#,
        text = escape_for_prompt(text)
    )
}

/// Serialize one past correction into a short natural-language block for
/// the aggregation prompt.
fn correction_block(item: &CorrectionItem) -> String {
    format!(
        "- Original: \"{}\"\n  Corrected: \"{}\"\n  Explanation: {}",
        escape_for_prompt(&item.original),
        escape_for_prompt(&item.corrected),
        if item.explanation.is_empty() {
            item.short_explanation.as_str()
        } else {
            item.explanation.as_str()
        }
    )
}

/// Prompt asking the model to fold a correction history into study
/// advice: one entry per recurring error pattern, not per correction.
pub fn advice_prompt(items: &[CorrectionItem]) -> String {
    let blocks: Vec<String> = items.iter().map(correction_block).collect();
    format!(
        r#"You are a French language tutor. Below are corrections previously made to a student's writing.
Identify the recurring error patterns and give the student targeted study advice, in French.

Past corrections:
{blocks}

Respond in this exact JSON format:
{{
  "summary": "Short overall analysis of the student's recurring difficulties",
  "corrections": [
    {{
      "category": "Name of the error pattern",
      "title": "Short advice headline",
      "content": "Concrete guidance for this pattern",
      "examples": [
        {{"original": "original text", "corrected": "corrected text", "explanation": "why"}}
      ]
    }}
  ]
}}

Important:
- One entry per error PATTERN, grouping similar corrections together
- Write summary, titles and content in French
- Only respond with the JSON object, nothing else"#,
        blocks = blocks.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_core::correction::CorrectionType;

    fn item(original: &str, corrected: &str) -> CorrectionItem {
        CorrectionItem {
            original: original.to_string(),
            corrected: corrected.to_string(),
            short_explanation: "short".to_string(),
            explanation: "long".to_string(),
            kind: CorrectionType::Grammar,
        }
    }

    #[test]
    fn test_correction_prompt_embeds_text() {
        let prompt = correction_prompt("je veut un café");
        assert!(prompt.contains("\"je veut un café\""));
        assert!(prompt.contains("correctedText"));
        assert!(prompt.contains("Punctuation, Conjugation, Spelling, Comprehension, Grammar, Other"));
    }

    #[test]
    fn test_correction_prompt_escapes_quotes() {
        let prompt = correction_prompt(r#"il a dit "bonjour""#);
        assert!(prompt.contains(r#"il a dit \"bonjour\""#));
    }

    #[test]
    fn test_correction_prompt_is_deterministic() {
        assert_eq!(correction_prompt("abc"), correction_prompt("abc"));
    }

    #[test]
    fn test_advice_prompt_contains_each_item() {
        let items = vec![item("je veut", "je veux"), item("sa va", "ça va")];
        let prompt = advice_prompt(&items);
        assert!(prompt.contains("je veut"));
        assert!(prompt.contains("ça va"));
        assert!(prompt.contains("\"summary\""));
    }

    #[test]
    fn test_advice_block_prefers_long_explanation() {
        let mut it = item("a", "b");
        let prompt = advice_prompt(std::slice::from_ref(&it));
        assert!(prompt.contains("Explanation: long"));

        it.explanation = String::new();
        let prompt = advice_prompt(std::slice::from_ref(&it));
        assert!(prompt.contains("Explanation: short"));
    }
}
