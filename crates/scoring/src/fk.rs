//! Join-path completion around the leading candidates.

use tablescout_core::{FkConfig, SignalWeights, TableId};
use tablescout_graph::SchemaKnowledgeBase;
use tracing::debug;

use crate::signal::SignalKind;
use crate::table_score::{sort_scores, TableScore};

/// Prefix of the reasons attached to rescued junction tables.
pub const RESCUED_TAG: &str = "[rescued]";

/// True when FK expansion pulled `score` into the candidate list.
pub fn is_rescued(score: &TableScore) -> bool {
    score.reasons().iter().any(|r| r.starts_with(RESCUED_TAG))
}

pub struct FkExpander<'a> {
    kb: &'a SchemaKnowledgeBase,
    config: &'a FkConfig,
    weights: &'a SignalWeights,
}

impl<'a> FkExpander<'a> {
    pub fn new(kb: &'a SchemaKnowledgeBase, config: &'a FkConfig, weights: &'a SignalWeights) -> Self {
        Self { kb, config, weights }
    }

    /// Boost candidates that share an FK edge with an anchor (the first
    /// `anchor_count` candidates), once per connected anchor, and pull in
    /// non-candidates connected to at least `rescue_min_anchors` anchors.
    ///
    /// A rescued table keeps its earlier signals from `all_scores` when it
    /// appears there. The result is re-sorted.
    pub fn expand(&self, mut candidates: Vec<TableScore>, all_scores: &[TableScore]) -> Vec<TableScore> {
        if candidates.len() < 2 {
            return candidates;
        }

        let anchors: Vec<(TableId, String)> = candidates
            .iter()
            .take(self.config.anchor_count)
            .filter_map(|c| self.kb.id_of(c.table_name()).map(|id| (id, c.table_name().to_string())))
            .collect();

        let graph = self.kb.graph();
        let weight = self.weights.fk_relationship;
        let mut boosted = 0usize;
        let mut rescued: Vec<TableScore> = Vec::new();

        for (id, table) in self.kb.tables().iter().enumerate() {
            if anchors.iter().any(|(a, _)| *a == id) {
                continue;
            }
            let connected: Vec<&str> = anchors
                .iter()
                .filter(|(a, _)| graph.are_connected(*a, id))
                .map(|(_, name)| name.as_str())
                .collect();
            if connected.is_empty() {
                continue;
            }

            if let Some(candidate) = candidates.iter_mut().find(|c| c.table_name() == table.name) {
                for anchor in &connected {
                    candidate.add_score(
                        SignalKind::FkRelationship,
                        weight,
                        format!("has FK relationship with '{}'", anchor),
                        None,
                    );
                }
                boosted += 1;
            } else if connected.len() >= self.config.rescue_min_anchors {
                let mut score = all_scores
                    .iter()
                    .find(|s| s.table_name() == table.name)
                    .cloned()
                    .unwrap_or_else(|| TableScore::new(&table.name, candidates[0].caps()));
                for anchor in &connected {
                    score.add_score(
                        SignalKind::FkRelationship,
                        weight,
                        format!(
                            "{} connects {} top candidates, including '{}'",
                            RESCUED_TAG,
                            connected.len(),
                            anchor
                        ),
                        None,
                    );
                }
                rescued.push(score);
            }
        }

        debug!(
            "FK expansion: {} anchors, {} candidates boosted, {} tables rescued",
            anchors.len(),
            boosted,
            rescued.len()
        );

        candidates.extend(rescued);
        sort_scores(&mut candidates);
        candidates
    }
}
