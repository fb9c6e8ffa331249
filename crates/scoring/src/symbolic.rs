//! Lexical and structural signals, evaluated for every table.

use tablescout_core::{ColumnMetadata, ScoringConfig, TableMetadata};
use tablescout_graph::SchemaKnowledgeBase;

use crate::signal::{HintOperation, SemanticTag, SignalKind};
use crate::table_score::{sort_scores, TableScore};
use crate::terms::{QueryIntent, QueryTerms};
use crate::tokens::{match_synonym, token_match_tokens, tokenize_identifier, value_contains};

pub struct SymbolicScorer<'a> {
    kb: &'a SchemaKnowledgeBase,
    config: &'a ScoringConfig,
}

impl<'a> SymbolicScorer<'a> {
    pub fn new(kb: &'a SchemaKnowledgeBase, config: &'a ScoringConfig) -> Self {
        Self { kb, config }
    }

    /// Score every table and return them in ranking order.
    pub fn score_all(&self, terms: &QueryTerms) -> Vec<TableScore> {
        let mut scores: Vec<TableScore> = self
            .kb
            .tables()
            .iter()
            .map(|table| self.score_table(table, terms))
            .collect();
        sort_scores(&mut scores);
        scores
    }

    pub fn score_table(&self, table: &TableMetadata, terms: &QueryTerms) -> TableScore {
        let mut score = TableScore::new(&table.name, self.config.caps);
        let prefix = self.config.terms.min_prefix_length;
        let weights = &self.config.weights;

        let table_tokens = tokenize_identifier(&table.name);
        for term in &terms.terms {
            if token_match_tokens(term, &table_tokens, prefix)
                && score.add_score(
                    SignalKind::TableName,
                    weights.table_name,
                    format!("table name matches '{}'", term),
                    None,
                )
            {
                record(&mut score, terms, term);
            }
        }

        for name in table.columns.keys() {
            let tokens = tokenize_identifier(name);
            for term in &terms.terms {
                if token_match_tokens(term, &tokens, prefix)
                    && score.add_score(
                        SignalKind::ColumnName,
                        weights.column_name,
                        format!("column '{}' matches '{}'", name, term),
                        Some(name),
                    )
                {
                    record(&mut score, terms, term);
                }
            }
        }

        for (name, column) in &table.columns {
            if column.synonyms.is_empty() {
                continue;
            }
            for term in &terms.terms {
                if let Some(synonym) = match_synonym(term, &column.synonyms) {
                    let reason = format!("column '{}' synonym '{}' matches '{}'", name, synonym, term);
                    if score.add_score(SignalKind::Synonym, weights.synonym, reason, Some(name)) {
                        record(&mut score, terms, term);
                    }
                }
            }
        }

        self.score_semantic_types(&mut score, table, &terms.intent);
        self.score_values(&mut score, table, terms);
        self.score_hints(&mut score, table, &terms.intent);

        score
    }

    fn score_semantic_types(&self, score: &mut TableScore, table: &TableMetadata, intent: &QueryIntent) {
        let wanted: Vec<(SemanticTag, &str)> = [
            (intent.temporal, SemanticTag::Temporal, "query mentions dates"),
            (intent.aggregation, SemanticTag::Numerical, "query needs aggregation"),
            (intent.categorical, SemanticTag::Categorical, "query needs grouping"),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, tag, why)| (tag, why))
        .collect();
        if wanted.is_empty() {
            return;
        }

        for (name, column) in &table.columns {
            for (tag, why) in &wanted {
                if column.semantic_type == tag.semantic_type() {
                    score.add_score(
                        SignalKind::SemanticType(*tag),
                        self.config.weights.semantic_type,
                        format!("has {} column '{}' ({})", tag.as_str(), name, why),
                        Some(name),
                    );
                }
            }
        }
    }

    fn score_values(&self, score: &mut TableScore, table: &TableMetadata, terms: &QueryTerms) {
        let weights = &self.config.weights;
        for (name, column) in &table.columns {
            for term in &terms.terms {
                if column.sample_values.iter().any(|v| value_contains(v, term)) {
                    score.add_score(
                        SignalKind::SampleValue,
                        weights.sample_value,
                        format!("column '{}' has sample value containing '{}'", name, term),
                        Some(name),
                    );
                    record(score, terms, term);
                }
                if column.top_values.iter().any(|v| value_contains(v, term)) {
                    score.add_score(
                        SignalKind::TopValue,
                        weights.top_value,
                        format!("'{}' appears in top values of '{}'", term, name),
                        Some(name),
                    );
                    record(score, terms, term);
                }
            }
        }
    }

    fn score_hints(&self, score: &mut TableScore, table: &TableMetadata, intent: &QueryIntent) {
        let wanted: Vec<HintOperation> = [
            (intent.filtering, HintOperation::Filtering),
            (intent.grouping, HintOperation::Grouping),
            (intent.aggregation, HintOperation::Aggregation),
        ]
        .into_iter()
        .filter_map(|(on, op)| on.then_some(op))
        .collect();
        if wanted.is_empty() {
            return;
        }

        for (name, column) in &table.columns {
            for op in &wanted {
                if supports(column, *op) {
                    score.add_score(
                        SignalKind::Hint(*op),
                        self.config.weights.hint,
                        format!("column '{}' is good for {}", name, op.as_str()),
                        Some(name),
                    );
                }
            }
        }
    }
}

fn supports(column: &ColumnMetadata, op: HintOperation) -> bool {
    match op {
        HintOperation::Filtering => column.hints.good_for_filtering,
        HintOperation::Grouping => column.hints.good_for_grouping,
        HintOperation::Aggregation => column.hints.good_for_aggregation,
    }
}

// Only entity terms count towards matched entities.
fn record(score: &mut TableScore, terms: &QueryTerms, term: &str) {
    if terms.entities.iter().any(|e| e == term) {
        score.record_entity(term);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::SemanticType;

    use crate::terms::TermExtractor;

    fn kb() -> SchemaKnowledgeBase {
        let students = TableMetadata::new("students_info")
            .with_column(
                "Student ID",
                ColumnMetadata::new("INTEGER", SemanticType::Identifier)
                    .primary_key()
                    .with_synonyms(["learner", "pupil"]),
            )
            .with_column(
                "Status",
                ColumnMetadata::new("TEXT", SemanticType::Categorical)
                    .with_top_values(["Active", "Graduated"])
                    .with_hints(true, true, false),
            )
            .with_column(
                "Enrollment Date",
                ColumnMetadata::new("DATE", SemanticType::Temporal).with_hints(true, false, false),
            );
        let wide = (0..8).fold(TableMetadata::new("survey"), |t, i| {
            t.with_column(
                &format!("student_answer_{}", i),
                ColumnMetadata::new("TEXT", SemanticType::Text)
                    .with_synonyms(["learner"])
                    .with_samples(["Computer Science"]),
            )
        });
        SchemaKnowledgeBase::builder()
            .tables([students, wide])
            .build()
            .unwrap()
    }

    fn score(query: &str) -> Vec<TableScore> {
        let kb = kb();
        let config = ScoringConfig::default();
        let terms = TermExtractor::new(config.terms).extract(query);
        SymbolicScorer::new(&kb, &config).score_all(&terms)
    }

    fn find<'a>(scores: &'a [TableScore], name: &str) -> &'a TableScore {
        scores.iter().find(|s| s.table_name() == name).unwrap()
    }

    #[test]
    fn table_name_token_match() {
        let scores = score("Show me all students");
        let s = find(&scores, "students_info");
        assert_eq!(s.signal(SignalKind::TableName), 10.0);
        assert!(s.matched_entities().contains("students"));
        assert_eq!(scores[0].table_name(), "students_info");
    }

    #[test]
    fn short_terms_do_not_hit_mid_word() {
        // "at" is a stopword; "us" survives and must not match "Status"
        let scores = score("us");
        assert!(scores.iter().all(|s| s.score() == 0.0));
    }

    #[test]
    fn wide_table_is_capped() {
        let scores = score("student learner");
        let wide = find(&scores, "survey");
        assert_eq!(wide.occurrences(SignalKind::ColumnName), 3);
        assert_eq!(wide.signal(SignalKind::ColumnName), 15.0);
        assert_eq!(wide.occurrences(SignalKind::Synonym), 2);
        assert_eq!(wide.signal(SignalKind::Synonym), 14.0);
    }

    #[test]
    fn synonym_matches_plural_term() {
        let scores = score("Show me learners");
        let s = find(&scores, "students_info");
        assert_eq!(s.signal(SignalKind::Synonym), 7.0);
        assert!(s.matched_columns().contains("Student ID"));
        assert!(s.matched_entities().contains("learners"));
    }

    #[test]
    fn intent_drives_type_and_hint_signals() {
        let scores = score("students by status with enrollment date");
        let s = find(&scores, "students_info");
        assert_eq!(s.occurrences(SignalKind::SemanticType(SemanticTag::Temporal)), 1);
        assert_eq!(s.occurrences(SignalKind::SemanticType(SemanticTag::Categorical)), 1);
        // two filterable columns, one accepted
        assert_eq!(s.occurrences(SignalKind::Hint(HintOperation::Filtering)), 1);
        assert_eq!(s.occurrences(SignalKind::Hint(HintOperation::Grouping)), 1);
        assert_eq!(s.occurrences(SignalKind::Hint(HintOperation::Aggregation)), 0);
    }

    #[test]
    fn values_match_by_substring() {
        let scores = score("graduated computer");
        let s = find(&scores, "students_info");
        assert_eq!(s.signal(SignalKind::TopValue), 2.0);
        let wide = find(&scores, "survey");
        // sample values are uncapped: one per column
        assert_eq!(wide.signal(SignalKind::SampleValue), 16.0);
    }

    #[test]
    fn empty_query_scores_zero() {
        let scores = score("");
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.score() == 0.0));
        // ties fall back to name order
        assert_eq!(scores[0].table_name(), "students_info");
    }
}
