use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

use crate::models::CorpusEntry;
use crate::store::{Store, SqliteStore};

/// Loads a tab-separated parallel corpus into the sentence table.
///
/// Columns are `source_id`, `source_text`, `target_id`, `target_text`; the
/// last two may be absent. Nothing is stored if any line is malformed.
pub fn run_import(database: &Path, file: &Path, label: &str) -> Result<()> {
    let entries = read_corpus(file)?;

    let store = SqliteStore::create(database)?;
    let count = store.import_sentences(label, entries)?;
    store.close()?;

    info!(count, label, path = %file.display(), "Corpus imported");
    println!("Imported {count} sentences");
    Ok(())
}

fn read_corpus(file: &Path) -> Result<Vec<CorpusEntry>> {
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open corpus: {}", file.display()))?,
    );

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read corpus: {}", file.display()))?;
        if let Some(entry) = parse_line(&line)
            .with_context(|| format!("{}:{}", file.display(), index + 1))?
        {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Parses one corpus line. Blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<CorpusEntry>> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut columns = line.split('\t');
    let _source_id = columns.next();
    let source_text = match columns.next().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => bail!("Missing source text"),
    };

    let target_id = match columns.next().map(str::trim) {
        Some(id) if !id.is_empty() => Some(
            id.parse::<i64>()
                .with_context(|| format!("Invalid target id '{id}'"))?,
        ),
        _ => None,
    };
    let target_text = columns
        .next()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(Some(CorpusEntry {
        source_text,
        target_id,
        target_text,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_line() {
        let entry = parse_line("77\tIch lerne Deutsch.\t1276\tI am learning German.")
            .unwrap()
            .unwrap();
        assert_eq!(entry.source_text, "Ich lerne Deutsch.");
        assert_eq!(entry.target_id, Some(1276));
        assert_eq!(entry.target_text.as_deref(), Some("I am learning German."));
    }

    #[test]
    fn test_parse_line_without_translation() {
        let entry = parse_line("77\tGuten Morgen!\r").unwrap().unwrap();
        assert_eq!(entry.source_text, "Guten Morgen!");
        assert_eq!(entry.target_id, None);
        assert_eq!(entry.target_text, None);
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_bad_target_id() {
        let err = parse_line("1\tHallo\tabc\tHello").unwrap_err();
        assert!(err.to_string().contains("Invalid target id"));
    }

    #[test]
    fn test_parse_rejects_missing_source_text() {
        assert!(parse_line("1").is_err());
    }

    #[test]
    fn test_import_stores_every_entry() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = temp_dir.path().join("corpus.tsv");
        let database = temp_dir.path().join("lerner.db");
        fs::write(
            &corpus,
            "1\tDer Hund schläft.\t2\tThe dog sleeps.\n\n3\tDie Katze spielt.\n",
        )
        .unwrap();

        run_import(&database, &corpus, "tatoeba").unwrap();

        let store = SqliteStore::open(&database).unwrap();
        let found = store.sentence_containing("katze").unwrap().unwrap();
        assert_eq!(found.source_text, "Die Katze spielt.");
        assert_eq!(found.source_label, "tatoeba");
    }

    #[test]
    fn test_import_malformed_file_stores_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = temp_dir.path().join("corpus.tsv");
        let database = temp_dir.path().join("lerner.db");
        fs::write(&corpus, "1\tHallo\t2\tHello\n3\tTschüss\tx\tBye\n").unwrap();

        let err = run_import(&database, &corpus, "tatoeba").unwrap_err();
        assert!(format!("{err:#}").contains("corpus.tsv:2"));

        let store = SqliteStore::create(&database).unwrap();
        assert!(store.random_sentence().unwrap().is_none());
    }
}
