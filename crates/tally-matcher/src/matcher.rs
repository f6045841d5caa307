use regex::bytes::{Regex, RegexBuilder};
use tally_types::{Corpus, Document, MatchCount};
use tracing::debug;

use crate::error::{PatternError, PatternResult};

/// A compiled, case-insensitive line pattern.
///
/// Build one per query and reuse it for every line; compiling per line is
/// what this type exists to avoid.
#[derive(Clone, Debug)]
pub struct LineMatcher {
    pattern: String,
    regex: Regex,
}

impl LineMatcher {
    pub fn new(pattern: &str) -> PatternResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| match e {
                regex::Error::CompiledTooBig(_) => PatternError::TooLarge {
                    pattern: pattern.to_owned(),
                },
                other => PatternError::Invalid {
                    pattern: pattern.to_owned(),
                    reason: other.to_string(),
                },
            })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern occurs anywhere in `line`.
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }

    pub fn count_document(&self, document: &Document) -> MatchCount {
        let matched = document.lines().filter(|line| self.is_match(line)).count();
        MatchCount::new(matched as u64)
    }

    pub fn count(&self, corpus: &Corpus) -> MatchCount {
        corpus.documents().map(|d| self.count_document(d)).sum()
    }
}

/// Count the lines of `corpus` matching `pattern`.
///
/// The pattern is validated before any line is read.
pub fn count(pattern: &str, corpus: &Corpus) -> PatternResult<MatchCount> {
    let matcher = LineMatcher::new(pattern)?;
    let total = matcher.count(corpus);
    debug!(pattern, documents = corpus.len(), matched = total.get(), "counted matches");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tally_types::ObjectKey;

    fn doc(key: &str, content: &str) -> Document {
        Document::new(ObjectKey::from(key), content.to_owned())
    }

    fn three_plays() -> Corpus {
        vec![
            doc("romeo.txt", "My love is deep\nthe more I give to thee\nLove goes toward love\n"),
            doc("sonnets.txt", "Shall I compare thee\nthy eternal summer\nso long lives this, and LOVE gives life"),
            doc("tempest.txt", "what's past is prologue\nour revels now are ended\n"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn love_across_three_documents() {
        assert_eq!(count("love", &three_plays()).unwrap(), MatchCount::new(3));
    }

    #[test]
    fn per_document_counts() {
        let matcher = LineMatcher::new("love").unwrap();
        let corpus = three_plays();
        let per_doc: Vec<u64> = ["romeo.txt", "sonnets.txt", "tempest.txt"]
            .iter()
            .map(|k| matcher.count_document(corpus.get(&ObjectKey::from(*k)).unwrap()).get())
            .collect();
        assert_eq!(per_doc, vec![2, 1, 0]);
    }

    #[test]
    fn hamlet_phrase_matches_once() {
        let corpus: Corpus = vec![
            doc("hamlet.txt", "HAMLET\nTo be, or not to be: that is the question:\nWhether 'tis nobler in the mind\n"),
            doc("lear.txt", "Nothing will come of nothing\n"),
        ]
        .into_iter()
        .collect();
        assert_eq!(count("to be, or not to be", &corpus).unwrap(), MatchCount::new(1));
    }

    #[test]
    fn pattern_case_is_ignored() {
        let corpus: Corpus = vec![doc("a", "Sweet\nsWEET\nsour")].into_iter().collect();
        assert_eq!(count("SWEET", &corpus).unwrap(), MatchCount::new(2));
    }

    #[test]
    fn regex_syntax_is_honoured() {
        let corpus: Corpus = vec![doc("a", "love me\nI love\nlovely")].into_iter().collect();
        assert_eq!(count("^love", &corpus).unwrap(), MatchCount::new(2));
        assert_eq!(count(r"\blove\b", &corpus).unwrap(), MatchCount::new(2));
    }

    #[test]
    fn line_counted_once_for_many_hits() {
        let corpus: Corpus = vec![doc("a", "love love love")].into_iter().collect();
        assert_eq!(count("love", &corpus).unwrap(), MatchCount::new(1));
    }

    #[test]
    fn empty_pattern_matches_every_line() {
        let corpus: Corpus = vec![doc("a", "one\ntwo\n")].into_iter().collect();
        // "one", "two" and the empty line after the final newline.
        assert_eq!(count("", &corpus).unwrap(), MatchCount::new(3));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = count("(unclosed", &three_plays()).unwrap_err();
        assert!(matches!(err, PatternError::Invalid { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn empty_corpus_counts_zero() {
        assert_eq!(count("love", &Corpus::new()).unwrap(), MatchCount::ZERO);
    }

    #[test]
    fn non_utf8_content_still_counted() {
        let corpus: Corpus = vec![Document::new(ObjectKey::from("bin"), vec![0xff, b'l', b'o', b'v', b'e', b'\n', 0xfe])]
            .into_iter()
            .collect();
        assert_eq!(count("love", &corpus).unwrap(), MatchCount::new(1));
    }

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("love".to_string()),
            Just("LOVE and war".to_string()),
            Just("friend".to_string()),
            "[a-z ]{0,12}",
        ]
    }

    proptest! {
        #[test]
        fn count_ignores_document_order(
            docs in prop::collection::vec(prop::collection::vec(line(), 0..8), 0..8)
                .prop_flat_map(|docs| {
                    let n = docs.len();
                    (Just(docs), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
                })
        ) {
            let (docs, order) = docs;
            let documents: Vec<Document> = docs
                .iter()
                .enumerate()
                .map(|(i, lines)| doc(&format!("doc-{i}"), &lines.join("\n")))
                .collect();

            let forward: Corpus = documents.iter().cloned().collect();
            let shuffled: Corpus = order.iter().map(|&i| documents[i].clone()).collect();

            let matcher = LineMatcher::new("love").unwrap();
            let by_corpus = matcher.count(&forward);
            prop_assert_eq!(by_corpus, matcher.count(&shuffled));

            let by_permuted_sum: MatchCount = order
                .iter()
                .map(|&i| matcher.count_document(&documents[i]))
                .sum();
            prop_assert_eq!(by_corpus, by_permuted_sum);
        }
    }
}
