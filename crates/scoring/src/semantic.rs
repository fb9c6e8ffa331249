//! Vector-similarity refinement of the symbolic leaders.

use tablescout_core::{SemanticConfig, SignalWeights};
use tablescout_graph::SchemaKnowledgeBase;
use tracing::debug;

use crate::embedding::EmbeddingService;
use crate::signal::SignalKind;
use crate::table_score::TableScore;

pub struct SemanticRefiner<'a> {
    kb: &'a SchemaKnowledgeBase,
    embedder: &'a dyn EmbeddingService,
    config: &'a SemanticConfig,
    weights: &'a SignalWeights,
}

impl<'a> SemanticRefiner<'a> {
    pub fn new(
        kb: &'a SchemaKnowledgeBase,
        embedder: &'a dyn EmbeddingService,
        config: &'a SemanticConfig,
        weights: &'a SignalWeights,
    ) -> Self {
        Self {
            kb,
            embedder,
            config,
            weights,
        }
    }

    /// Add similarity signals to the first `top_n` entries of `scores`.
    ///
    /// The caller re-sorts afterwards.
    pub fn refine(&self, scores: &mut [TableScore], query_embedding: &[f32]) {
        let n = self.config.top_n.min(scores.len());
        let mut refined = 0usize;
        for score in scores[..n].iter_mut() {
            if self.refine_one(score, query_embedding) {
                refined += 1;
            }
        }
        debug!("Semantic refinement: {} of {} leaders gained similarity signals", refined, n);
    }

    /// Returns whether any similarity signal was accepted.
    fn refine_one(&self, score: &mut TableScore, query_embedding: &[f32]) -> bool {
        let Some(table) = self.kb.table_by_name(score.table_name()) else {
            return false;
        };
        let weight = self.weights.semantic_similarity;
        let mut accepted = false;

        if let Some(embedding) = &table.embedding {
            let sim = self.embedder.similarity(query_embedding, embedding);
            if sim > self.config.table_similarity_threshold {
                accepted |= score.add_score(
                    SignalKind::SemanticSimilarity,
                    weight * sim,
                    format!("semantically similar to query (similarity: {:.2})", sim),
                    None,
                );
            }
        }

        let mut columns: Vec<(&str, f64)> = table
            .columns
            .iter()
            .filter_map(|(name, column)| {
                let embedding = column.embedding.as_ref()?;
                let sim = self.embedder.similarity(query_embedding, embedding);
                (sim > self.config.column_similarity_threshold).then_some((name.as_str(), sim))
            })
            .collect();
        // stable: equal similarities keep column order
        columns.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (name, sim) in columns {
            let added = score.add_score(
                SignalKind::SemanticSimilarity,
                weight * sim * self.config.column_weight_factor,
                format!("column '{}' semantically matches (similarity: {:.2})", name, sim),
                Some(name),
            );
            if !added {
                break;
            }
            accepted = true;
        }
        accepted
    }

    /// Best table-level similarity among the first `mismatch_top_k` entries.
    ///
    /// `None` when none of them carries a table embedding.
    pub fn max_table_similarity(&self, scores: &[TableScore], query_embedding: &[f32]) -> Option<f64> {
        scores
            .iter()
            .take(self.config.mismatch_top_k)
            .filter_map(|s| self.kb.table_by_name(s.table_name()))
            .filter_map(|t| t.embedding.as_ref())
            .map(|e| self.embedder.similarity(query_embedding, e))
            .reduce(f64::max)
    }
}
