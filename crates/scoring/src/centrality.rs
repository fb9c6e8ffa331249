use tablescout_core::CentralityConfig;
use tablescout_graph::SchemaKnowledgeBase;
use tracing::debug;

use crate::signal::SignalKind;
use crate::table_score::TableScore;

/// Which ceiling the centrality boost uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostMode {
    /// Structural importance is the only relevance signal available.
    Generic,
    /// Boost is capped so it cannot outweigh an explicit match.
    Mixed,
}

impl BoostMode {
    pub fn max_points(&self, config: &CentralityConfig) -> f64 {
        match self {
            BoostMode::Generic => config.generic_boost_max,
            BoostMode::Mixed => config.mixed_boost_cap,
        }
    }
}

/// Add `normalized_centrality × ceiling` to every table with non-zero
/// centrality. Returns how many tables were boosted; the caller re-sorts.
pub fn apply_centrality_boost(
    kb: &SchemaKnowledgeBase,
    scores: &mut [TableScore],
    mode: BoostMode,
    config: &CentralityConfig,
) -> usize {
    let max_points = mode.max_points(config);
    let mut boosted = 0;

    for score in scores.iter_mut() {
        let Some(table) = kb.table_by_name(score.table_name()) else {
            continue;
        };
        let c = &table.centrality;
        if c.normalized_centrality <= 0.0 {
            continue;
        }
        let label = if c.is_hub { "hub table" } else { "central table" };
        let reason = format!(
            "{} (centrality: {:.2}, {} incoming FKs)",
            label, c.normalized_centrality, c.incoming_edges
        );
        if score.add_score(
            SignalKind::Centrality,
            c.normalized_centrality * max_points,
            reason,
            None,
        ) {
            boosted += 1;
        }
    }

    debug!("Centrality boost ({:?}, max {} pts) applied to {} tables", mode, max_points, boosted);
    boosted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::{SignalCaps, TableMetadata};

    fn kb() -> SchemaKnowledgeBase {
        SchemaKnowledgeBase::builder()
            .tables([
                TableMetadata::new("students_info"),
                TableMetadata::new("courses"),
                TableMetadata::new("grades").with_foreign_key("Student ID", "students_info", "Student ID"),
                TableMetadata::new("hostel").with_foreign_key("Student ID", "students_info", "Student ID"),
                TableMetadata::new("notes"),
            ])
            .build()
            .unwrap()
    }

    fn scores(kb: &SchemaKnowledgeBase) -> Vec<TableScore> {
        kb.tables()
            .iter()
            .map(|t| TableScore::new(&t.name, SignalCaps::default()))
            .collect()
    }

    #[test]
    fn generic_boost_scales_to_ten() {
        let kb = kb();
        let mut s = scores(&kb);
        let n = apply_centrality_boost(&kb, &mut s, BoostMode::Generic, &CentralityConfig::default());

        // students_info: 2 incoming = 2.0; grades/hostel: 1 outgoing = 0.5
        assert_eq!(n, 3);
        assert_eq!(s[0].signal(SignalKind::Centrality), 10.0);
        assert_eq!(s[2].signal(SignalKind::Centrality), 2.5);
        assert!(!s[1].has_signal(SignalKind::Centrality));
        assert!(s[0].reasons()[0].starts_with("hub table"));
    }

    #[test]
    fn mixed_boost_is_capped() {
        let kb = kb();
        let mut s = scores(&kb);
        apply_centrality_boost(&kb, &mut s, BoostMode::Mixed, &CentralityConfig::default());
        assert_eq!(s[0].signal(SignalKind::Centrality), 5.0);
        assert_eq!(s[0].score(), s[0].base_score());
    }
}
