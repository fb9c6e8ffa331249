use std::fmt;

use serde::Serialize;
use tablescout_core::ConfidenceConfig;

use crate::table_score::TableScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

/// How much a downstream generator can trust the final candidate list.
///
/// Computed from base scores only, so FK boosts and rescued junction tables
/// never raise confidence on their own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceResult {
    pub top_score: f64,
    pub total_score: f64,
    /// Fraction of query entities matched by at least one candidate.
    pub entity_coverage: f64,
    /// Candidates whose base score reaches the core-table threshold.
    pub num_core_tables: usize,
    /// In [0, 1].
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub is_domain_mismatch: bool,
    pub recommendation: String,
}

impl ConfidenceResult {
    pub fn from_candidates(
        candidates: &[TableScore],
        entities: &[String],
        is_domain_mismatch: bool,
        config: &ConfidenceConfig,
    ) -> Self {
        let top_score = candidates.iter().map(TableScore::score).fold(0.0, f64::max);
        let total_score = candidates.iter().map(TableScore::score).sum();
        let top_base = candidates.iter().map(TableScore::base_score).fold(0.0, f64::max);
        let num_core_tables = candidates
            .iter()
            .filter(|c| c.base_score() >= config.core_table_threshold)
            .count();

        let entity_coverage = if entities.is_empty() {
            0.0
        } else {
            let covered = entities
                .iter()
                .filter(|e| candidates.iter().any(|c| c.matched_entities().contains(e.as_str())))
                .count();
            covered as f64 / entities.len() as f64
        };

        if is_domain_mismatch {
            return Self {
                top_score,
                total_score,
                entity_coverage,
                num_core_tables,
                confidence_score: 0.0,
                confidence_level: ConfidenceLevel::Low,
                is_domain_mismatch,
                recommendation: "Domain mismatch: the query does not appear to be about this \
                                 database. Ask the user to rephrase or confirm the data source."
                    .to_string(),
            };
        }

        let core_part = (num_core_tables.min(2) as f64) / 2.0;
        let strength = (top_base / (2.0 * config.core_table_threshold)).min(1.0);
        let confidence_score = (0.5 * entity_coverage + 0.3 * core_part + 0.2 * strength).clamp(0.0, 1.0);

        let confidence_level = if num_core_tables >= 1 && entity_coverage >= config.high_coverage {
            ConfidenceLevel::High
        } else if num_core_tables >= 1 || entity_coverage >= config.medium_coverage {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };

        let recommendation = match confidence_level {
            ConfidenceLevel::High => {
                "High confidence: candidates cover the query entities; safe to generate SQL.".to_string()
            }
            ConfidenceLevel::Medium => format!(
                "Medium confidence: {} core table(s), {:.0}% entity coverage; confirm the tables \
                 with the user before generating SQL.",
                num_core_tables,
                entity_coverage * 100.0
            ),
            ConfidenceLevel::Low if entities.is_empty() => {
                "Low confidence: the query is too generic; ask the user which entities they are \
                 interested in."
                    .to_string()
            }
            ConfidenceLevel::Low => {
                "Low confidence: weak matches only; ask the user to clarify the query.".to_string()
            }
        };

        Self {
            top_score,
            total_score,
            entity_coverage,
            num_core_tables,
            confidence_score,
            confidence_level,
            is_domain_mismatch,
            recommendation,
        }
    }

    pub fn should_auto_generate(&self) -> bool {
        self.confidence_level == ConfidenceLevel::High && !self.is_domain_mismatch
    }

    /// Worth asking the user a follow-up rather than generating or giving up.
    pub fn needs_clarification(&self) -> bool {
        !self.should_auto_generate() && !self.is_domain_mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::SignalCaps;

    use crate::signal::SignalKind;

    fn candidate(name: &str, base: f64, fk: f64, entities: &[&str]) -> TableScore {
        let mut s = TableScore::new(name, SignalCaps::default());
        s.add_score(SignalKind::TableName, base, "base", None);
        if fk > 0.0 {
            s.add_score(SignalKind::FkRelationship, fk, "fk", None);
        }
        for e in entities {
            s.record_entity(e);
        }
        s
    }

    fn entities(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_coverage_with_core_table_is_high() {
        let c = vec![
            candidate("students_info", 15.0, 0.0, &["students"]),
            candidate("courses", 10.0, 0.0, &["courses"]),
        ];
        let r = ConfidenceResult::from_candidates(
            &c,
            &entities(&["students", "courses"]),
            false,
            &ConfidenceConfig::default(),
        );
        assert_eq!(r.confidence_level, ConfidenceLevel::High);
        assert_eq!(r.num_core_tables, 2);
        assert_eq!(r.entity_coverage, 1.0);
        assert_eq!(r.top_score, 15.0);
        assert_eq!(r.total_score, 25.0);
        assert!(r.should_auto_generate());
        assert!(!r.needs_clarification());
    }

    #[test]
    fn fk_boost_does_not_make_core_tables() {
        let c = vec![candidate("registration", 2.0, 8.0, &[])];
        let r = ConfidenceResult::from_candidates(&c, &entities(&["enrolled"]), false, &ConfidenceConfig::default());
        assert_eq!(r.num_core_tables, 0);
        assert_eq!(r.confidence_level, ConfidenceLevel::Low);
        assert!(r.needs_clarification());
    }

    #[test]
    fn partial_coverage_is_medium() {
        let c = vec![candidate("students_info", 12.0, 0.0, &["students"])];
        let r = ConfidenceResult::from_candidates(
            &c,
            &entities(&["students", "hostel", "fees"]),
            false,
            &ConfidenceConfig::default(),
        );
        assert_eq!(r.confidence_level, ConfidenceLevel::Medium);
        assert!(r.confidence_score > 0.0 && r.confidence_score < 1.0);
        assert!(r.recommendation.contains("33%"));
    }

    #[test]
    fn mismatch_forces_low() {
        let c = vec![candidate("students_info", 12.0, 0.0, &["students"])];
        let r = ConfidenceResult::from_candidates(&c, &entities(&["students"]), true, &ConfidenceConfig::default());
        assert_eq!(r.confidence_level, ConfidenceLevel::Low);
        assert_eq!(r.confidence_score, 0.0);
        assert!(r.is_domain_mismatch);
        assert!(r.recommendation.starts_with("Domain mismatch"));
        assert!(!r.should_auto_generate());
        assert!(!r.needs_clarification());
    }

    #[test]
    fn generic_query_recommendation() {
        let c = vec![candidate("students_info", 3.0, 0.0, &[])];
        let r = ConfidenceResult::from_candidates(&c, &[], false, &ConfidenceConfig::default());
        assert_eq!(r.confidence_level, ConfidenceLevel::Low);
        assert!(r.recommendation.contains("too generic"));
    }

    #[test]
    fn serializes_level_lowercase() {
        let r = ConfidenceResult::from_candidates(&[], &[], false, &ConfidenceConfig::default());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["confidence_level"], "low");
        assert_eq!(json["top_score"], 0.0);
    }
}
