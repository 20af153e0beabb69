//! One handler per command. Each turns an inbound message into reply text.
//!
//! Rejected input is answered with a normal reply. Only store and
//! translator failures surface as errors.

use tracing::debug;

use super::command::Command;
use super::update::InboundMessage;
use crate::error::Result;
use crate::store::{BlockingStore, Store};
use crate::translation::{LanguagePair, Translator};

/// Reply when no sentence contains the requested word.
pub const SENTENCE_NOT_FOUND: &str = "sentence not found :(";

/// Runs the handler for `command` and returns the reply text.
pub async fn handle<S, T>(
    command: Command,
    message: &InboundMessage,
    store: &BlockingStore<S>,
    translator: &T,
    languages: &LanguagePair,
) -> Result<String>
where
    S: Store + Send + Sync + 'static,
    T: Translator,
{
    let argument = command.argument(&message.text);

    match command {
        Command::RandomSentence | Command::RandomSentenceWithKeyword => {
            random_sentence(store, message.user_id, argument).await
        }
        Command::Translate => {
            translate(store, translator, languages, message.chat_id, &argument).await
        }
        Command::LearnWord => learn_word(store, message.user_id, argument).await,
        Command::StoreSentence => store_sentence(store, message.user_id, argument).await,
    }
}

async fn random_sentence<S>(
    store: &BlockingStore<S>,
    user_id: i64,
    argument: String,
) -> Result<String>
where
    S: Store + Send + Sync + 'static,
{
    let keyword = if argument.is_empty() {
        store
            .run(move |s| s.random_vocabulary_word(user_id))
            .await?
            .unwrap_or_default()
    } else {
        argument
    };

    let sentence = if keyword.is_empty() {
        store.run(|s| s.random_sentence()).await?
    } else {
        debug!(keyword = %keyword, "Looking up sentence");
        store.run(move |s| s.sentence_containing(&keyword)).await?
    };

    Ok(sentence.map_or_else(|| SENTENCE_NOT_FOUND.to_string(), |s| s.source_text))
}

async fn translate<S, T>(
    store: &BlockingStore<S>,
    translator: &T,
    languages: &LanguagePair,
    chat_id: i64,
    argument: &str,
) -> Result<String>
where
    S: Store + Send + Sync + 'static,
    T: Translator,
{
    // Without explicit text, translate what the bot said last in this chat.
    let text = if argument.is_empty() {
        store
            .run(move |s| s.latest_chat_message(chat_id))
            .await?
            .reply_text
    } else {
        argument.to_string()
    };

    translator
        .translate(&text, &languages.source, &languages.target)
        .await
}

async fn learn_word<S>(store: &BlockingStore<S>, user_id: i64, argument: String) -> Result<String>
where
    S: Store + Send + Sync + 'static,
{
    if argument.is_empty() || argument.contains(char::is_whitespace) {
        return Ok(format!(
            "I don't think it is a good idea to learn \"{argument}\""
        ));
    }

    let reply = format!("Stored: \"{argument}\"");
    store
        .run(move |s| s.insert_vocabulary_word(user_id, &argument))
        .await?;
    Ok(reply)
}

async fn store_sentence<S>(
    store: &BlockingStore<S>,
    user_id: i64,
    argument: String,
) -> Result<String>
where
    S: Store + Send + Sync + 'static,
{
    if argument.is_empty() {
        return Ok(format!(
            "I don't think it is a good idea to add sentence \"{argument}\""
        ));
    }

    let reply = format!("Stored: \"{argument}\"");
    store
        .run(move |s| s.insert_user_sentence(user_id, &argument))
        .await?;
    Ok(reply)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::CorpusEntry;
    use crate::store::SqliteStore;

    type TestStore = BlockingStore<SqliteStore>;

    fn empty_store() -> TestStore {
        BlockingStore::new(SqliteStore::open_in_memory().unwrap())
    }

    /// Echoes its input, tagged with the language pair.
    struct EchoTranslator;

    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
            Ok(format!("[{source}->{target}] {text}"))
        }
    }

    struct FailingTranslator;

    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
            Err(Error::Translation("service unavailable".to_string()))
        }
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            message_id: 1,
            chat_id: 42,
            user_id: 7,
            text: text.to_string(),
        }
    }

    async fn run(store: &TestStore, text: &str) -> Result<String> {
        let command = crate::bot::command::classify(text);
        handle(
            command,
            &message(text),
            store,
            &EchoTranslator,
            &LanguagePair::default(),
        )
        .await
    }

    fn store_with_corpus(sentences: &[&str]) -> TestStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .import_sentences(
                "tatoeba",
                sentences.iter().map(|s| CorpusEntry {
                    source_text: (*s).to_string(),
                    target_id: None,
                    target_text: None,
                }),
            )
            .unwrap();
        BlockingStore::new(store)
    }

    #[tokio::test]
    async fn test_sentence_for_explicit_keyword() {
        let store = store_with_corpus(&["Der Hund bellt.", "Die Katze schläft."]);

        let reply = run(&store, "/satz katze").await.unwrap();
        assert_eq!(reply, "Die Katze schläft.");
    }

    #[tokio::test]
    async fn test_sentence_for_unknown_keyword_is_sentinel() {
        let store = store_with_corpus(&["Der Hund bellt."]);

        let reply = run(&store, "Elefant").await.unwrap();
        assert_eq!(reply, SENTENCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sentence_uses_learned_word_without_keyword() {
        let store = store_with_corpus(&["Der Hund bellt.", "Die Katze schläft."]);
        store.get_ref().insert_vocabulary_word(7, "Hund").unwrap();

        let reply = run(&store, "/satz").await.unwrap();
        assert_eq!(reply, "Der Hund bellt.");
    }

    #[tokio::test]
    async fn test_sentence_without_vocabulary_falls_back_to_random() {
        let store = store_with_corpus(&["Es regnet."]);

        let reply = run(&store, "/satz").await.unwrap();
        assert_eq!(reply, "Es regnet.");
    }

    #[tokio::test]
    async fn test_sentence_on_empty_corpus_is_sentinel() {
        let store = empty_store();

        assert_eq!(run(&store, "/satz").await.unwrap(), SENTENCE_NOT_FOUND);
        assert_eq!(run(&store, "Haus").await.unwrap(), SENTENCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_translate_explicit_text() {
        let store = empty_store();

        let reply = run(&store, "/t Guten Morgen").await.unwrap();
        assert_eq!(reply, "[de->en] Guten Morgen");
    }

    #[tokio::test]
    async fn test_translate_previous_reply() {
        let store = empty_store();
        store
            .get_ref()
            .insert_chat_message(&crate::models::ChatMessage::new(
                1,
                42,
                7,
                "/satz",
                "Der Hund bellt.",
            ))
            .unwrap();

        let reply = run(&store, "/t").await.unwrap();
        assert_eq!(reply, "[de->en] Der Hund bellt.");
    }

    #[tokio::test]
    async fn test_translate_without_history_translates_empty_text() {
        let store = empty_store();

        let reply = run(&store, "/t").await.unwrap();
        assert_eq!(reply, "[de->en] ");
    }

    #[tokio::test]
    async fn test_translate_failure_propagates() {
        let store = empty_store();

        let result = handle(
            Command::Translate,
            &message("/t Hallo"),
            &store,
            &FailingTranslator,
            &LanguagePair::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::Translation(_))));
    }

    #[tokio::test]
    async fn test_learn_word_stores_single_token() {
        let store = empty_store();

        let reply = run(&store, "/lerne Schmetterling").await.unwrap();
        assert_eq!(reply, "Stored: \"Schmetterling\"");
        assert_eq!(store.get_ref().vocabulary(7).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_learn_word_rejects_phrases_and_empty_input() {
        let store = empty_store();

        let reply = run(&store, "/lerne zwei Wörter").await.unwrap();
        assert_eq!(
            reply,
            "I don't think it is a good idea to learn \"zwei Wörter\""
        );

        let reply = run(&store, "/lerne   ").await.unwrap();
        assert_eq!(reply, "I don't think it is a good idea to learn \"\"");

        assert!(store.get_ref().vocabulary(7).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_sentence_rejects_empty_input() {
        let store = empty_store();

        let reply = run(&store, "/as").await.unwrap();
        assert_eq!(
            reply,
            "I don't think it is a good idea to add sentence \"\""
        );
        assert!(store.get_ref().random_sentence().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_sentence_then_find_it() {
        let store = empty_store();

        let reply = run(&store, "/as Der Zauberlehrling kehrt.").await.unwrap();
        assert_eq!(reply, "Stored: \"Der Zauberlehrling kehrt.\"");

        let found = run(&store, "/satz zauberlehrling").await.unwrap();
        assert_eq!(found, "Der Zauberlehrling kehrt.");
    }
}
