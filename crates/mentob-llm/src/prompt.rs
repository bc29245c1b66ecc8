//! Prompt builders for readings, follow-ups and suggestions.

use std::fmt::Write as _;

use mentob_core::{DEFAULT_FOLLOWUP_TEMPERATURE, DrawnCard, Spread};

use crate::types::{ChatMessage, ChatRequest};

/// Interpretation text included in follow-up prompts, in characters.
const FOLLOWUP_CONTEXT_CHARS: usize = 500;

/// System prompt for the suggestion endpoint.
pub const SUGGESTION_SYSTEM_PROMPT: &str = "You are a professional tarot reader and life mentor. \
Your task:
1. From the user's original question and the reading, work out which related questions they may care about.
2. Offer 3-4 related directions or questions to explore.
3. Briefly explain why each direction deserves attention.
4. Be warm and encouraging while keeping a mystical, professional tone.

Format:
- A short recap of the user's question and main concern
- 3-4 directions, each with a title, why it matters, and how it ties to the current question
- A few words of encouragement";

/// Reply-language instruction appended to user prompts.
///
/// Unknown or absent codes add nothing and the model answers in the
/// language of the question.
pub fn language_instruction(lang: Option<&str>) -> Option<&'static str> {
    match lang? {
        "en" => Some("Please reply in English."),
        "zh" | "zh-CN" | "zh-TW" => Some("Please reply in Chinese."),
        "ja" => Some("Please reply in Japanese."),
        _ => None,
    }
}

fn push_language(prompt: &mut String, lang: Option<&str>) {
    if let Some(instruction) = language_instruction(lang) {
        prompt.push_str("\n\n");
        prompt.push_str(instruction);
    }
}

/// One line per card: position, card, orientation and the matching meaning.
pub fn card_lines(spread: &Spread, cards: &[DrawnCard]) -> String {
    let mut out = String::new();
    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}. ", i + 1);
        if let Some(position) = spread.positions.get(i) {
            if position.description.is_empty() {
                let _ = write!(out, "{}: ", position.name);
            } else {
                let _ = write!(out, "{} ({}): ", position.name, position.description);
            }
        }
        out.push_str(&card.name);
        if card.is_reversed {
            out.push_str(" (reversed)");
        }
        let meaning = card.orientation_meaning();
        if !meaning.is_empty() {
            let _ = write!(out, " - {meaning}");
        }
    }
    out
}

/// The streamed interpretation request.
pub fn interpretation_request(
    system_prompt: &str,
    question: &str,
    spread: &Spread,
    cards: &[DrawnCard],
    lang: Option<&str>,
) -> ChatRequest {
    let mut prompt = format!(
        "The user's question: {question}\n\nSpread: {}\n{}\n\n\
         Please give the user a professional tarot reading based on the above.",
        spread.name,
        card_lines(spread, cards),
    );
    push_language(&mut prompt, lang);

    ChatRequest::new(vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(prompt),
    ])
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... (truncated)", &text[..cut]),
        None => text.to_string(),
    }
}

/// Request for two follow-up questions.
pub fn followup_request(
    system_prompt: &str,
    question: &str,
    interpretation: &str,
    spread_name: Option<&str>,
    card_names: &[&str],
    lang: Option<&str>,
) -> ChatRequest {
    let mut prompt = format!(
        "The user's question: {question}\nSpread: {}\nCards drawn: {}\nPrevious reading: {}\n\n\
         Suggest 2 follow-up questions that help the user explore the deeper causes of their \
         concern or the direction to act in next. Reply with only the two questions, one per \
         line, with no preamble and no numbering.",
        spread_name.unwrap_or_default(),
        card_names.join(", "),
        excerpt(interpretation, FOLLOWUP_CONTEXT_CHARS),
    );
    push_language(&mut prompt, lang);

    ChatRequest::new(vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(prompt),
    ])
    .temperature(DEFAULT_FOLLOWUP_TEMPERATURE)
}

/// Request for related directions to explore.
pub fn suggestion_request(question: &str, cards: &[DrawnCard], interpretation: &str) -> ChatRequest {
    let mut drawn = String::new();
    for (i, card) in cards.iter().enumerate() {
        let _ = writeln!(
            drawn,
            "{}. {}{}",
            i + 1,
            card.name,
            if card.is_reversed { " (reversed)" } else { "" }
        );
    }

    let prompt = format!(
        "The user's original question: {question}\n\nCards drawn:\n{drawn}\n\
         Reading:\n{interpretation}\n\n\
         Based on the above, suggest other related directions worth exploring."
    );

    ChatRequest::new(vec![
        ChatMessage::system(SUGGESTION_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ])
}

/// Strip a leading `12.` style ordinal and the whitespace after it.
fn strip_ordinal(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0
        && let Some(rest) = line[digits..].strip_prefix('.')
    {
        return rest.trim_start();
    }
    line
}

/// Split a follow-up completion into questions, one per line.
///
/// Numbering is stripped; blank lines and markdown emphasis or bullet lines
/// are dropped.
pub fn parse_followup_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_ordinal(line.trim()).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('*'))
        .map(str::to_string)
        .collect()
}

/// Generic follow-ups returned when generation fails.
pub fn fallback_followups(lang: Option<&str>) -> Vec<String> {
    let questions: [&str; 2] = match lang {
        Some("zh" | "zh-CN" | "zh-TW") => [
            "这张牌对我目前的情况有什么具体的指引？",
            "我应该如何在日常生活中运用这个建议？",
        ],
        _ => [
            "What detailed guidance does this card offer?",
            "How can I apply this advice in daily life?",
        ],
    };
    questions.iter().map(|q| (*q).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use mentob_core::tarot::{MAJOR_ARCANA, find_spread};

    use super::*;
    use crate::types::Role;

    fn three_card() -> (Spread, Vec<DrawnCard>) {
        let spread = find_spread("three").unwrap();
        let cards = vec![
            DrawnCard::from_card(&MAJOR_ARCANA[1], false),
            DrawnCard::from_card(&MAJOR_ARCANA[16], true),
            DrawnCard::from_card(&MAJOR_ARCANA[17], false),
        ];
        (spread, cards)
    }

    #[test]
    fn card_lines_pair_positions_and_orientation() {
        let (spread, cards) = three_card();
        let lines = card_lines(&spread, &cards);
        let lines: Vec<&str> = lines.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. Past (What shaped the situation): The Magician - "));
        assert!(lines[1].contains("The Tower (reversed) - "));
        assert!(lines[1].ends_with(MAJOR_ARCANA[16].reversed_meaning));
        assert!(lines[2].starts_with("3. Future"));
    }

    #[test]
    fn card_lines_fill_missing_meaning_from_deck() {
        let (spread, mut cards) = three_card();
        cards[0].meaning.clear();
        let lines = card_lines(&spread, &cards);
        assert!(lines.contains(MAJOR_ARCANA[1].meaning));
    }

    #[test]
    fn interpretation_request_has_system_and_user() {
        let (spread, cards) = three_card();
        let req = interpretation_request("SYS", "Will I move?", &spread, &cards, Some("en"));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[0].content, "SYS");
        let user = &req.messages[1].content;
        assert!(user.contains("Will I move?"));
        assert!(user.contains("Spread: Three Card Spread"));
        assert!(user.ends_with("Please reply in English."));
        assert_eq!(req.temperature, None);
    }

    #[test]
    fn unknown_language_adds_nothing() {
        assert_eq!(language_instruction(Some("xx")), None);
        assert_eq!(language_instruction(None), None);
    }

    #[test]
    fn followup_request_truncates_context() {
        let long = "x".repeat(800);
        let req = followup_request("SYS", "q", &long, Some("Single Card"), &["The Fool"], None);
        let user = &req.messages[1].content;
        assert!(user.contains(&format!("{}... (truncated)", "x".repeat(500))));
        assert!(!user.contains(&"x".repeat(501)));
        assert_eq!(req.temperature, Some(0.7));
    }

    #[test]
    fn suggestion_request_lists_cards() {
        let (_, cards) = three_card();
        let req = suggestion_request("q", &cards, "reading");
        assert_eq!(req.messages[0].content, SUGGESTION_SYSTEM_PROMPT);
        assert!(req.messages[1].content.contains("2. The Tower (reversed)"));
    }

    #[test]
    fn parses_numbered_questions() {
        let text = "1. What is blocking me?\n\n2.   Where should I focus next?\n**Related**\n";
        assert_eq!(
            parse_followup_questions(text),
            ["What is blocking me?", "Where should I focus next?"]
        );
    }

    #[test]
    fn keeps_lines_that_merely_start_with_digits() {
        assert_eq!(parse_followup_questions("3 paths ahead?"), ["3 paths ahead?"]);
    }

    #[test]
    fn fallback_defaults_to_english() {
        let q = fallback_followups(None);
        assert_eq!(q[0], "What detailed guidance does this card offer?");
        assert_eq!(fallback_followups(Some("zh")).len(), 2);
    }
}
