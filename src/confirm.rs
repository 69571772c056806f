//! Confirmation state machine for AI-proposed commands.
//!
//! An assistant reply that contains exactly one fenced code block becomes a
//! [`PendingSuggestion`]; while one exists, the next input line is consumed
//! exclusively as a yes/no answer. Modeling the pending suggestion as a
//! two-state value (rather than an optional field poked from many branches)
//! makes that invariant structural.

/// An assistant-proposed command awaiting a single yes/no confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    /// Reply text outside the code block; may be empty.
    pub explanation: String,
    /// The single extracted command, trimmed.
    pub command: String,
    /// The raw assistant reply the suggestion was parsed from.
    pub raw: String,
}

/// Confirmation machine state held by the session.
#[derive(Debug, Default)]
pub enum AiState {
    /// No suggestion pending; lines flow through normal dispatch.
    #[default]
    Idle,
    /// A suggestion is pending; the next line is a yes/no answer.
    AwaitingConfirmation(PendingSuggestion),
}

impl AiState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingConfirmation(_))
    }

    /// Install a pending suggestion, entering `AwaitingConfirmation`.
    pub fn propose(&mut self, suggestion: PendingSuggestion) {
        *self = Self::AwaitingConfirmation(suggestion);
    }

    /// Consume the pending suggestion, returning to `Idle`.
    ///
    /// The suggestion is consumed on the next line regardless of whether it
    /// is confirmed, declined, or its execution fails.
    pub fn take(&mut self) -> Option<PendingSuggestion> {
        match std::mem::take(self) {
            Self::AwaitingConfirmation(s) => Some(s),
            Self::Idle => None,
        }
    }
}

/// A confirmation answer is `y`/`yes`, case-insensitive; anything else
/// declines. The declining line is never reinterpreted as a command.
pub fn is_affirmative(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}

/// Outcome of parsing one assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// No single executable block; the text is shown as information.
    Info(String),
    /// Exactly one fenced block proposing a command.
    Suggestion(PendingSuggestion),
}

/// Parse an assistant reply into an executable suggestion or plain info.
///
/// A suggestion is produced if and only if the reply contains exactly one
/// fenced code block (```` ``` ````, optional language tag). Zero blocks, or
/// more than one, mean there is no single unambiguous command to confirm.
pub fn parse_reply(reply: &str) -> ParsedReply {
    let text = reply.replace("\r\n", "\n");
    let blocks = fenced_blocks(&text);
    if blocks.len() != 1 {
        return ParsedReply::Info(text.trim().to_string());
    }

    let (start, end, body) = blocks[0];
    let mut explanation = String::new();
    explanation.push_str(&text[..start]);
    explanation.push_str(&text[end..]);

    ParsedReply::Suggestion(PendingSuggestion {
        explanation: explanation.trim().to_string(),
        command: body.trim().to_string(),
        raw: reply.to_string(),
    })
}

/// Locate fenced code blocks as `(start, end, body)` byte spans.
fn fenced_blocks(text: &str) -> Vec<(usize, usize, &str)> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find("```") {
        let open = cursor + found;
        let tag_start = open + 3;
        // Optional language tag runs to the end of the fence line.
        let Some(nl) = text[tag_start..].find('\n') else {
            break;
        };
        let tag = &text[tag_start..tag_start + nl];
        if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            cursor = tag_start;
            continue;
        }
        let body_start = tag_start + nl + 1;
        let Some(close) = text[body_start..].find("```") else {
            break;
        };
        let close = body_start + close;
        blocks.push((open, close + 3, &text[body_start..close]));
        cursor = close + 3;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_without_code_block_is_info() {
        let parsed = parse_reply("Just use ls to list files.");
        assert_eq!(
            parsed,
            ParsedReply::Info("Just use ls to list files.".into())
        );
    }

    #[test]
    fn single_block_becomes_suggestion() {
        let parsed = parse_reply("Do this:\n```sh\nls -la\n```");
        let ParsedReply::Suggestion(s) = parsed else {
            panic!("expected suggestion");
        };
        assert_eq!(s.explanation, "Do this:");
        assert_eq!(s.command, "ls -la");
        assert!(s.raw.contains("```sh"));
    }

    #[test]
    fn block_without_language_tag_is_accepted() {
        let parsed = parse_reply("```\ndu -sh .\n```");
        let ParsedReply::Suggestion(s) = parsed else {
            panic!("expected suggestion");
        };
        assert_eq!(s.command, "du -sh .");
        assert_eq!(s.explanation, "");
    }

    #[test]
    fn crlf_replies_are_normalized() {
        let parsed = parse_reply("Run:\r\n```sh\r\npwd\r\n```\r\n");
        let ParsedReply::Suggestion(s) = parsed else {
            panic!("expected suggestion");
        };
        assert_eq!(s.command, "pwd");
        assert_eq!(s.explanation, "Run:");
    }

    #[test]
    fn multiple_blocks_fall_back_to_info() {
        // Two candidate commands means no single unambiguous suggestion.
        let reply = "Either:\n```sh\nls\n```\nor:\n```sh\nfind .\n```";
        assert!(matches!(parse_reply(reply), ParsedReply::Info(_)));
    }

    #[test]
    fn unterminated_fence_is_info() {
        assert!(matches!(
            parse_reply("```sh\nls -la"),
            ParsedReply::Info(_)
        ));
    }

    #[test]
    fn explanation_keeps_text_on_both_sides_of_the_block() {
        let parsed = parse_reply("Before.\n```sh\nls\n```\nAfter.");
        let ParsedReply::Suggestion(s) = parsed else {
            panic!("expected suggestion");
        };
        assert!(s.explanation.contains("Before."));
        assert!(s.explanation.contains("After."));
    }

    #[test]
    fn state_machine_takes_suggestion_exactly_once() {
        let mut state = AiState::default();
        assert!(!state.is_awaiting());
        assert!(state.take().is_none());

        state.propose(PendingSuggestion {
            explanation: String::new(),
            command: "ls".into(),
            raw: String::new(),
        });
        assert!(state.is_awaiting());

        let taken = state.take().unwrap();
        assert_eq!(taken.command, "ls");
        assert!(!state.is_awaiting());
        assert!(state.take().is_none());
    }

    #[test]
    fn affirmative_answers_are_case_insensitive() {
        for yes in ["y", "Y", "yes", "YES", " Yes "] {
            assert!(is_affirmative(yes), "{yes:?} should confirm");
        }
        for no in ["n", "no", "", "sure", "yess", "run it"] {
            assert!(!is_affirmative(no), "{no:?} should decline");
        }
    }
}
