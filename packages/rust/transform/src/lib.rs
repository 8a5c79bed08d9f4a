//! Normalization of raw Wikipedia summaries into [`PageRecord`]s.
//!
//! This crate is pure: no I/O, no hidden state, and [`normalize`] cannot
//! fail. The same input always yields the same output.

use tracing::debug;

use wikigraph_shared::{PageRecord, RawPage};

/// Normalize an extracted [`RawPage`] into a [`PageRecord`] ready for
/// storage.
///
/// - `page_id` is coerced to a string (empty when the API returned none)
/// - `title` and `summary` are trimmed of leading/trailing whitespace
/// - `word_count` is the number of whitespace-delimited tokens in the
///   *untrimmed* extract text
/// - all other fields pass through unchanged
///
/// Applying `normalize` to a record built from its own output yields the
/// same record again: trimming and token counting are stable once applied.
pub fn normalize(raw: &RawPage) -> PageRecord {
    let record = PageRecord {
        page_id: raw.page_id.map(|id| id.to_string()).unwrap_or_default(),
        title: raw.title.trim().to_string(),
        summary: raw.extract.trim().to_string(),
        url: raw.url.clone(),
        topic: raw.topic.clone(),
        extracted_at: raw.extracted_at,
        word_count: word_count(&raw.extract),
    };

    debug!(page_id = %record.page_id, title = %record.title, "normalized page");
    record
}

/// Count whitespace-delimited tokens in a summary text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn raw(title: &str, extract: &str, page_id: Option<u64>) -> RawPage {
        RawPage {
            title: title.into(),
            extract: extract.into(),
            page_id,
            url: "http://x/AI".into(),
            extracted_at: Utc::now(),
            topic: "artificial_intelligence".into(),
        }
    }

    #[test]
    fn normalizes_the_reference_scenario() {
        let input = raw("AI", "A field of study.", Some(123));
        let record = normalize(&input);

        assert_eq!(record.page_id, "123");
        assert_eq!(record.title, "AI");
        assert_eq!(record.summary, "A field of study.");
        assert_eq!(record.url, "http://x/AI");
        assert_eq!(record.topic, "artificial_intelligence");
        assert_eq!(record.word_count, 4);
    }

    #[test]
    fn trims_title_and_summary() {
        let record = normalize(&raw("  Machine learning \n", "\t spaced out text  ", Some(1)));
        assert_eq!(record.title, "Machine learning");
        assert_eq!(record.summary, "spaced out text");
    }

    #[test]
    fn word_count_uses_untrimmed_extract() {
        assert_eq!(word_count("A brief summary."), 3);
        assert_eq!(word_count("  leading and trailing  "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
    }

    #[test]
    fn missing_page_id_becomes_empty_string() {
        let record = normalize(&raw("Untitled", "", None));
        assert_eq!(record.page_id, "");
        assert_eq!(record.word_count, 0);
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let first = normalize(&raw(" AI ", "  A field of study. ", Some(123)));

        // Feed the normalized fields back through as if they were a fresh
        // extraction. Trim and token count must be stable.
        let again = normalize(&RawPage {
            title: first.title.clone(),
            extract: first.summary.clone(),
            page_id: Some(123),
            url: first.url.clone(),
            extracted_at: first.extracted_at,
            topic: first.topic.clone(),
        });

        assert_eq!(again, first);
    }
}
