//! Generic-query and domain-mismatch detection.

use std::fmt;

use serde::Serialize;
use tablescout_core::ScoringConfig;

use crate::table_score::TableScore;
use crate::terms::QueryTerms;

/// How the pipeline treats a query after symbolic and semantic scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    /// Names entities or has a strong match; centrality is capped.
    Specific,
    /// About the domain but too vague to pin down; full centrality boost.
    Generic,
    /// Not about this schema; no centrality at all.
    DomainMismatch,
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryClass::Specific => write!(f, "specific"),
            QueryClass::Generic => write!(f, "generic"),
            QueryClass::DomainMismatch => write!(f, "domain_mismatch"),
        }
    }
}

pub struct QueryClassifier<'a> {
    config: &'a ScoringConfig,
}

impl<'a> QueryClassifier<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Mismatch wins over generic.
    ///
    /// `max_similarity` is the best query/table similarity over the leading
    /// tables, or `None` when no similarity could be computed.
    pub fn classify(
        &self,
        scores: &[TableScore],
        terms: &QueryTerms,
        max_similarity: Option<f64>,
    ) -> QueryClass {
        if self.is_domain_mismatch(scores, terms, max_similarity) {
            QueryClass::DomainMismatch
        } else if self.is_generic(scores, terms) {
            QueryClass::Generic
        } else {
            QueryClass::Specific
        }
    }

    /// Low similarity to every leading table, or entities that matched
    /// nowhere. Embedding similarity alone never counts as an entity match.
    pub fn is_domain_mismatch(
        &self,
        scores: &[TableScore],
        terms: &QueryTerms,
        max_similarity: Option<f64>,
    ) -> bool {
        if let Some(sim) = max_similarity {
            if sim < self.config.semantic.mismatch_similarity_threshold {
                return true;
            }
        }

        terms.has_entities()
            && !scores
                .iter()
                .any(|s| s.base_score() > 0.0 && !s.matched_entities().is_empty())
    }

    /// No strong match anywhere and no entity terms.
    pub fn is_generic(&self, scores: &[TableScore], terms: &QueryTerms) -> bool {
        let max_base = scores.iter().map(TableScore::base_score).fold(0.0, f64::max);
        max_base < self.config.centrality.generic_query_threshold && !terms.has_entities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::SignalCaps;

    use crate::signal::SignalKind;
    use crate::terms::TermExtractor;

    fn terms(q: &str) -> QueryTerms {
        TermExtractor::default().extract(q)
    }

    fn scored(name: &str, points: f64, entity: Option<&str>) -> TableScore {
        let mut s = TableScore::new(name, SignalCaps::default());
        if points > 0.0 {
            s.add_score(SignalKind::TableName, points, "match", None);
        }
        if let Some(e) = entity {
            s.record_entity(e);
        }
        s
    }

    #[test]
    fn vague_query_without_matches_is_generic() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        let scores = vec![scored("a", 0.0, None), scored("b", 0.0, None)];
        assert_eq!(c.classify(&scores, &terms("show me data"), None), QueryClass::Generic);
        assert_eq!(c.classify(&scores, &terms(""), None), QueryClass::Generic);
    }

    #[test]
    fn strong_match_is_not_generic() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        // "data" matched a table named data_sources
        let scores = vec![scored("data_sources", 10.0, None)];
        assert_eq!(c.classify(&scores, &terms("show me data"), None), QueryClass::Specific);
    }

    #[test]
    fn unmatched_entities_are_mismatch() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        let scores = vec![scored("students_info", 0.0, None)];
        assert_eq!(
            c.classify(&scores, &terms("show me weather data"), None),
            QueryClass::DomainMismatch
        );
    }

    #[test]
    fn matched_entity_is_specific() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        let scores = vec![scored("students_info", 10.0, Some("students"))];
        assert_eq!(c.classify(&scores, &terms("all students"), Some(0.9)), QueryClass::Specific);
    }

    #[test]
    fn low_similarity_is_mismatch_even_with_matches() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        let scores = vec![scored("students_info", 10.0, Some("students"))];
        assert_eq!(
            c.classify(&scores, &terms("all students"), Some(0.1)),
            QueryClass::DomainMismatch
        );
        // unknown similarity falls back to the entity check
        assert_eq!(c.classify(&scores, &terms("all students"), None), QueryClass::Specific);
    }

    #[test]
    fn similarity_signal_alone_is_not_an_entity_match() {
        let config = ScoringConfig::default();
        let c = QueryClassifier::new(&config);
        let mut s = TableScore::new("grades", SignalCaps::default());
        s.add_score(SignalKind::SemanticSimilarity, 8.0, "similar", None);
        assert_eq!(
            c.classify(&[s.clone()], &terms("exam scores"), Some(0.95)),
            QueryClass::DomainMismatch
        );

        // an entity recorded with a positive base score keeps it in domain
        s.record_entity("exam");
        assert_eq!(
            c.classify(&[s], &terms("exam scores"), Some(0.95)),
            QueryClass::Specific
        );
    }
}
