use std::fmt;

/// Commands in the order their prefixes are tried. The first match wins.
///
/// Matching is a plain `starts_with`, so `/tea` is a translate command with
/// the argument `ea`.
const CLASSIFICATION_ORDER: [Command; 4] = [
    Command::Translate,
    Command::LearnWord,
    Command::RandomSentence,
    Command::StoreSentence,
];

/// What an inbound message asks the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Translate the argument, or the bot's previous reply in this chat.
    Translate,
    /// Add a single word to the sender's vocabulary.
    LearnWord,
    /// Reply with a sentence containing the argument or a learned word.
    RandomSentence,
    /// Add a sentence to the corpus.
    StoreSentence,
    /// No recognized prefix. Handled exactly like [`Command::RandomSentence`].
    RandomSentenceWithKeyword,
}

impl Command {
    /// The prefix removed from the message text before handling.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Translate => "/t",
            Self::LearnWord => "/lerne",
            Self::RandomSentence | Self::RandomSentenceWithKeyword => "/satz",
            Self::StoreSentence => "/as",
        }
    }

    /// The message text with the first occurrence of the prefix removed, trimmed.
    pub fn argument(self, text: &str) -> String {
        text.replacen(self.prefix(), "", 1).trim().to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Translate => "translate",
            Self::LearnWord => "learn_word",
            Self::RandomSentence => "random_sentence",
            Self::StoreSentence => "store_sentence",
            Self::RandomSentenceWithKeyword => "random_sentence_with_keyword",
        };
        f.write_str(name)
    }
}

/// Maps raw message text to a command. Total: every input has a command.
pub fn classify(text: &str) -> Command {
    CLASSIFICATION_ORDER
        .into_iter()
        .find(|command| text.starts_with(command.prefix()))
        .unwrap_or(Command::RandomSentenceWithKeyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_prefixes() {
        assert_eq!(classify("/t Guten Morgen"), Command::Translate);
        assert_eq!(classify("/lerne Haus"), Command::LearnWord);
        assert_eq!(classify("/satz Haus"), Command::RandomSentence);
        assert_eq!(classify("/as Ich bin müde."), Command::StoreSentence);
    }

    #[test]
    fn test_classify_bare_commands() {
        assert_eq!(classify("/t"), Command::Translate);
        assert_eq!(classify("/lerne"), Command::LearnWord);
        assert_eq!(classify("/satz"), Command::RandomSentence);
        assert_eq!(classify("/as"), Command::StoreSentence);
    }

    #[test]
    fn test_classify_is_prefix_not_word_match() {
        assert_eq!(classify("/tea"), Command::Translate);
        assert_eq!(classify("/translate"), Command::Translate);
        assert_eq!(classify("/lernen"), Command::LearnWord);
        assert_eq!(classify("/ask"), Command::StoreSentence);
    }

    #[test]
    fn test_classify_default() {
        assert_eq!(classify("Haus"), Command::RandomSentenceWithKeyword);
        assert_eq!(classify(""), Command::RandomSentenceWithKeyword);
        assert_eq!(classify("/help"), Command::RandomSentenceWithKeyword);
        assert_eq!(classify("/"), Command::RandomSentenceWithKeyword);
    }

    #[test]
    fn test_classify_requires_prefix_at_start() {
        assert_eq!(classify(" /t Haus"), Command::RandomSentenceWithKeyword);
        assert_eq!(classify("Haus /t"), Command::RandomSentenceWithKeyword);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify("/T Haus"), Command::RandomSentenceWithKeyword);
        assert_eq!(classify("/Lerne Haus"), Command::RandomSentenceWithKeyword);
    }

    #[test]
    fn test_argument_strips_prefix_and_trims() {
        assert_eq!(Command::LearnWord.argument("/lerne  Haus  "), "Haus");
        assert_eq!(Command::Translate.argument("/t"), "");
        assert_eq!(Command::Translate.argument("/tea"), "ea");
        assert_eq!(Command::StoreSentence.argument("/as Ich bin da."), "Ich bin da.");
    }

    #[test]
    fn test_argument_removes_only_first_occurrence() {
        assert_eq!(Command::Translate.argument("/t /t zweimal"), "/t zweimal");
    }

    #[test]
    fn test_default_command_strips_sentence_prefix() {
        let command = Command::RandomSentenceWithKeyword;
        assert_eq!(command.argument("Haus"), "Haus");
        assert_eq!(command.argument("Haus /satz"), "Haus");
    }
}
