//! Instruction and context text for the generation call.
//!
//! Everything here is a pure function of the variant, today's date and the
//! history tail.

use chrono::NaiveDate;

use crate::history::HistoryRecord;
use crate::{LANGUAGES, Variant};

const CONTENT_RULES: &str = "\
Content constraints:
- Themes: self-actualization, philosophy, disciplined execution, long-term goals.
- Must be intellectually serious and specific.
- Avoid therapy clichés and motivational fluff.
- Avoid repeating prior structure or wording.
- Maintain long-term conceptual progression across days.
";

const SINGLE_FORMAT: &str = "\
You generate ONE daily journaling question in English.

Formatting rules:
- Output only the question, on a single line, nothing else.
- No bullet points, no numbering, no labels.
- The question must be a single sentence ending with '?'.

";

const NO_HISTORY: &str = "(no prior questions yet)";

/// The two text blocks sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Style and format constraints.
    pub instructions: String,
    /// Date, prior questions, and the closing directive.
    pub input: String,
}

/// Assemble the full prompt for `today`.
pub fn compose(variant: Variant, today: NaiveDate, history_tail: &[HistoryRecord]) -> Prompt {
    Prompt {
        instructions: instructions(variant),
        input: user_input(today, &context(history_tail)),
    }
}

/// Fixed instructions for the given variant.
pub fn instructions(variant: Variant) -> String {
    let format_rules = match variant {
        Variant::Single => SINGLE_FORMAT.to_string(),
        Variant::Multilingual => {
            let order: Vec<String> = LANGUAGES
                .iter()
                .enumerate()
                .map(|(i, lang)| format!("{}. {lang}", i + 1))
                .collect();
            format!(
                "You generate ONE daily journaling question.\n\n\
                 The question must be written in FIVE languages in the following order:\n\
                 {}\n\n\
                 Formatting rules:\n\
                 - Each language must appear on its own line.\n\
                 - No bullet points, no numbering, no labels.\n\
                 - Output only the five questions, nothing else.\n\
                 - Each line must be a single sentence ending with '?'.\n\
                 - The content across languages must be semantically equivalent.\n\n",
                order.join("\n")
            )
        }
    };
    format!("{format_rules}{CONTENT_RULES}")
}

/// List prior questions, most recent last, with a do-not-repeat directive.
pub fn context(history_tail: &[HistoryRecord]) -> String {
    let lines: Vec<String> = history_tail
        .iter()
        .filter_map(|record| {
            let shown = short_form(&record.question)?;
            Some(format!("- [{}] {shown}", record.date_utc.trim()))
        })
        .collect();

    let joined = if lines.is_empty() {
        NO_HISTORY.to_string()
    } else {
        lines.join("\n")
    };

    format!(
        "Here are previous journal questions (most recent last). \
         Do NOT repeat them; continue the sequence.\n{joined}\n"
    )
}

/// One-line view of a stored question block.
///
/// Multilingual blocks show their English (fifth) line; anything else is
/// whitespace-collapsed. `None` for an empty question.
fn short_form(question: &str) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    let lines: Vec<&str> = question
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    match lines.get(LANGUAGES.len() - 1) {
        Some(english) => Some((*english).to_string()),
        None => Some(question.split_whitespace().collect::<Vec<_>>().join(" ")),
    }
}

/// The `input` text: today's date, the context block, and the directive.
pub fn user_input(today: NaiveDate, context: &str) -> String {
    format!(
        "UTC date today: {}\n\n{context}\nNow generate the next question in the sequence.",
        today.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 13).unwrap()
    }

    #[test]
    fn multilingual_instructions_list_languages_in_order() {
        let text = instructions(Variant::Multilingual);
        let positions: Vec<usize> = LANGUAGES
            .iter()
            .enumerate()
            .map(|(i, lang)| text.find(&format!("{}. {lang}", i + 1)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("Output only the five questions"));
        assert!(text.contains("Themes: self-actualization"));
    }

    #[test]
    fn single_instructions_ask_for_one_line() {
        let text = instructions(Variant::Single);
        assert!(text.contains("single line"));
        assert!(!text.contains("Turkish"));
        assert!(text.contains("Avoid therapy clichés"));
    }

    #[test]
    fn empty_history_context() {
        let ctx = context(&[]);
        assert!(ctx.starts_with("Here are previous journal questions (most recent last)."));
        assert!(ctx.contains("Do NOT repeat them"));
        assert!(ctx.ends_with("(no prior questions yet)\n"));
    }

    #[test]
    fn context_shows_english_line_of_multilingual_blocks() {
        let tail = vec![
            HistoryRecord::new("2026-02-11T06:00:00Z", "Šta?\nNe?\nQuoi?\nЧто?\nWhat drives you?"),
            HistoryRecord::new("2026-02-12T06:00:00Z", "  Why   do you\twait?  "),
        ];
        let ctx = context(&tail);
        let lines: Vec<&str> = ctx.lines().collect();
        assert_eq!(lines[1], "- [2026-02-11T06:00:00Z] What drives you?");
        assert_eq!(lines[2], "- [2026-02-12T06:00:00Z] Why do you wait?");
    }

    #[test]
    fn context_skips_empty_questions() {
        let tail = vec![
            HistoryRecord::new("2026-02-11T06:00:00Z", "   "),
            HistoryRecord::new("", "Only one?"),
        ];
        let ctx = context(&tail);
        assert!(!ctx.contains("2026-02-11"));
        assert!(ctx.contains("- [] Only one?"));
        assert!(!ctx.contains(NO_HISTORY));
    }

    #[test]
    fn user_input_layout() {
        let input = user_input(date(), "CTX\n");
        assert_eq!(
            input,
            "UTC date today: 2026-02-13\n\nCTX\n\nNow generate the next question in the sequence."
        );
    }

    #[test]
    fn compose_is_deterministic() {
        let tail = vec![HistoryRecord::new("d", "Q?")];
        assert_eq!(
            compose(Variant::Single, date(), &tail),
            compose(Variant::Single, date(), &tail)
        );
        let prompt = compose(Variant::Multilingual, date(), &tail);
        assert!(prompt.input.contains("- [d] Q?"));
        assert!(prompt.input.starts_with("UTC date today: 2026-02-13"));
    }
}
