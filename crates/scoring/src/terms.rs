//! Query term extraction.
//!
//! Splits a query into lower-cased word tokens, drops stopwords, and tags
//! the remaining non-vague terms as entities. Also derives the operations the
//! query implies (date filtering, aggregation, grouping) from whole words.

use serde::Serialize;
use tablescout_core::TermConfig;

/// Words that never carry table-selection signal.
pub const STOPWORDS: &[&str] = &[
    // action verbs
    "show", "get", "find", "list", "display", "give", "tell", "fetch",
    // articles
    "the", "a", "an",
    // conjunctions
    "and", "or", "but",
    // prepositions
    "of", "for", "in", "on", "at", "to", "from", "with", "by", "about",
    // auxiliary verbs
    "is", "are", "was", "were", "am", "be", "been", "being",
    "has", "have", "had", "having",
    "do", "does", "did", "doing",
    // modal verbs
    "can", "could", "will", "would", "shall", "should", "may", "might", "must",
    // pronouns
    "i", "me", "my", "you", "your", "it", "its", "we", "our",
    // demonstratives
    "this", "that", "these", "those",
    // quantifiers
    "all", "some", "any", "each", "every",
    // question words
    "what", "who", "which", "how",
];

/// Terms that survive stopword removal but name no entity.
pub const VAGUE_TERMS: &[&str] = &[
    "data", "information", "details", "records", "info", "things",
    "stuff", "items", "entries", "values", "results", "output",
];

const TEMPORAL_WORDS: &[&str] = &[
    "date", "when", "time", "year", "month", "day", "week", "daily", "weekly", "monthly", "yearly",
];
const AGGREGATION_WORDS: &[&str] = &["average", "total", "sum", "count", "max", "min", "mean"];
const CATEGORICAL_WORDS: &[&str] = &["group", "category", "type", "status", "classify"];
const FILTER_WORDS: &[&str] = &["where", "filter", "only", "with"];
const GROUPING_HINT_WORDS: &[&str] = &["group", "by", "each", "per"];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_vague(word: &str) -> bool {
    VAGUE_TERMS.contains(&word)
}

/// Operations the query asks for, detected from its words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    /// Mentions dates or time periods.
    pub temporal: bool,
    /// Asks for an aggregate (sum, average, count...).
    pub aggregation: bool,
    /// Asks to categorize or group by a category.
    pub categorical: bool,
    /// Restricts rows ("where", "only"...).
    pub filtering: bool,
    /// Groups rows ("by", "per"...).
    pub grouping: bool,
}

impl QueryIntent {
    fn from_words(words: &[String]) -> Self {
        let any = |vocab: &[&str]| words.iter().any(|w| matches_vocab(w, vocab));
        Self {
            temporal: any(TEMPORAL_WORDS),
            aggregation: any(AGGREGATION_WORDS),
            categorical: any(CATEGORICAL_WORDS),
            filtering: any(FILTER_WORDS),
            grouping: any(GROUPING_HINT_WORDS),
        }
    }
}

// Whole word, or the word with a trailing plural "s".
fn matches_vocab(word: &str, vocab: &[&str]) -> bool {
    vocab.iter().any(|v| {
        word == *v || (word.len() == v.len() + 1 && word.starts_with(v) && word.ends_with('s'))
    })
}

/// Result of running the extractor over one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryTerms {
    /// Meaningful terms in query order, de-duplicated.
    pub terms: Vec<String>,
    /// The subset of `terms` that names something specific.
    pub entities: Vec<String>,
    pub intent: QueryIntent,
}

impl QueryTerms {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn has_entities(&self) -> bool {
        !self.entities.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TermExtractor {
    config: TermConfig,
}

impl TermExtractor {
    pub fn new(config: TermConfig) -> Self {
        Self { config }
    }

    /// Split, lower-case, drop stopwords/numbers/short terms, and classify.
    pub fn extract(&self, query: &str) -> QueryTerms {
        let words = split_words(query);
        let intent = QueryIntent::from_words(&words);

        let mut terms: Vec<String> = Vec::new();
        for word in &words {
            if is_stopword(word)
                || word.chars().all(|c| c.is_ascii_digit())
                || word.chars().count() < self.config.min_term_length
            {
                continue;
            }
            if !terms.contains(word) {
                terms.push(word.clone());
            }
        }

        let entities = terms.iter().filter(|t| !is_vague(t)).cloned().collect();

        QueryTerms {
            terms,
            entities,
            intent,
        }
    }
}

/// Lower-cased word tokens; anything other than letters, digits and `_` separates.
pub fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
