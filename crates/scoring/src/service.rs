use std::sync::Arc;

use tablescout_core::{Result, ScoringConfig, TableScoutError};
use tablescout_graph::SchemaKnowledgeBase;
use tracing::{debug, info, warn};

use crate::centrality::{apply_centrality_boost, BoostMode};
use crate::classify::{QueryClass, QueryClassifier};
use crate::confidence::ConfidenceResult;
use crate::embedding::{CacheStats, EmbeddingService, QueryEmbeddingCache};
use crate::filter;
use crate::fk::FkExpander;
use crate::selection::{join_structure, TableSelection};
use crate::semantic::SemanticRefiner;
use crate::symbolic::SymbolicScorer;
use crate::table_score::{sort_scores, TableScore};
use crate::terms::{QueryTerms, TermExtractor};

/// Scores and ranks after the classification stage.
#[derive(Debug, Clone)]
pub struct ScoredQuery {
    pub terms: QueryTerms,
    pub scores: Vec<TableScore>,
    pub query_class: QueryClass,
    /// Best table similarity over the leaders, when embeddings were used.
    pub max_similarity: Option<f64>,
}

/// Entry point of the table-selection funnel.
///
/// Holds the shared knowledge base and an immutable configuration; every
/// call works on its own `TableScore`s, so one instance can serve concurrent
/// queries. The query-embedding cache is the only interior state.
pub struct ScoringService {
    kb: Arc<SchemaKnowledgeBase>,
    config: ScoringConfig,
    extractor: TermExtractor,
    embedder: Option<Arc<dyn EmbeddingService>>,
    cache: QueryEmbeddingCache,
}

impl ScoringService {
    pub fn new(
        kb: Arc<SchemaKnowledgeBase>,
        config: ScoringConfig,
        embedder: Option<Arc<dyn EmbeddingService>>,
    ) -> Result<Self> {
        if kb.is_empty() {
            return Err(TableScoutError::EmptyKnowledgeBase);
        }
        config.validate()?;

        if embedder.is_some() && !kb.has_embeddings() {
            warn!("Embedding service configured but knowledge base has no embeddings; scoring is symbolic only");
        }
        info!(
            "Scoring service ready: {} tables, semantic refinement {}",
            kb.len(),
            if embedder.is_some() && kb.has_embeddings() { "on" } else { "off" }
        );

        Ok(Self {
            extractor: TermExtractor::new(config.terms),
            cache: QueryEmbeddingCache::new(config.semantic.query_cache_capacity),
            kb,
            config,
            embedder,
        })
    }

    pub fn knowledge_base(&self) -> &SchemaKnowledgeBase {
        &self.kb
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn extract_query_terms(&self, query: &str) -> QueryTerms {
        self.extractor.extract(query)
    }

    /// Full scoring pipeline: symbolic, semantic, classification, centrality.
    /// Never fails; returns one score per table in ranking order.
    pub fn score_all_tables(&self, query: &str) -> Vec<TableScore> {
        self.score_query(query).scores
    }

    pub fn score_query(&self, query: &str) -> ScoredQuery {
        let terms = self.extract_query_terms(query);
        let mut scores = SymbolicScorer::new(&self.kb, &self.config).score_all(&terms);
        debug!(
            "Symbolic pass: {} terms, {} entities, top {:?}",
            terms.terms.len(),
            terms.entities.len(),
            scores.first().map(|s| (s.table_name(), s.score()))
        );

        let mut max_similarity = None;
        if let (Some(embedder), Some(query_embedding)) = (self.embedder.as_deref(), self.query_embedding(query)) {
            let refiner = SemanticRefiner::new(
                &self.kb,
                embedder,
                &self.config.semantic,
                &self.config.weights,
            );
            refiner.refine(&mut scores, &query_embedding);
            sort_scores(&mut scores);
            max_similarity = refiner.max_table_similarity(&scores, &query_embedding);
        }

        let query_class = QueryClassifier::new(&self.config).classify(&scores, &terms, max_similarity);
        let mode = match query_class {
            QueryClass::DomainMismatch => None,
            QueryClass::Generic => Some(BoostMode::Generic),
            QueryClass::Specific if scores.iter().any(|s| s.base_score() > 0.0) => Some(BoostMode::Mixed),
            QueryClass::Specific => None,
        };
        if let Some(mode) = mode {
            apply_centrality_boost(&self.kb, &mut scores, mode, &self.config.centrality);
            sort_scores(&mut scores);
        }

        info!(
            "Scored query {:?}: class={}, top={:?}",
            query,
            query_class,
            scores.first().map(|s| s.table_name())
        );

        ScoredQuery {
            terms,
            scores,
            query_class,
            max_similarity,
        }
    }

    pub fn filter_by_threshold(&self, scores: &[TableScore]) -> Vec<TableScore> {
        filter::filter_by_threshold(scores, &self.config.filter)
    }

    /// FK boost and junction rescue around the leading candidates.
    /// `all_scores` supplies the earlier signals of rescued tables.
    pub fn enhance_with_fk_relationships(
        &self,
        candidates: Vec<TableScore>,
        all_scores: &[TableScore],
    ) -> Vec<TableScore> {
        FkExpander::new(&self.kb, &self.config.fk, &self.config.weights).expand(candidates, all_scores)
    }

    pub fn calculate_confidence(
        &self,
        candidates: &[TableScore],
        terms: &QueryTerms,
        is_domain_mismatch: bool,
    ) -> ConfidenceResult {
        ConfidenceResult::from_candidates(
            candidates,
            &terms.entities,
            is_domain_mismatch,
            &self.config.confidence,
        )
    }

    /// Run the whole funnel and package the result.
    pub fn select_tables(&self, query: &str) -> TableSelection {
        let ScoredQuery {
            terms,
            scores,
            query_class,
            ..
        } = self.score_query(query);

        let filtered = self.filter_by_threshold(&scores);
        let candidates = self.enhance_with_fk_relationships(filtered, &scores);
        let (relationships, disconnected_tables) = join_structure(&self.kb, &candidates);
        let confidence = self.calculate_confidence(
            &candidates,
            &terms,
            query_class == QueryClass::DomainMismatch,
        );

        info!(
            "Selected {} tables for {:?} (confidence: {})",
            candidates.len(),
            query,
            confidence.confidence_level
        );

        TableSelection {
            query: query.to_string(),
            terms,
            query_class,
            all_scores: scores,
            candidates,
            relationships,
            disconnected_tables,
            confidence,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Memoized query embedding, or `None` when semantic scoring is off or
    /// the embedding call failed.
    fn query_embedding(&self, query: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        if !self.kb.has_embeddings() {
            return None;
        }
        if let Some(cached) = self.cache.get(query) {
            return Some(cached);
        }
        match embedder.embed(query) {
            Ok(embedding) => {
                self.cache.put(query, embedding.clone());
                Some(embedding)
            }
            Err(e) => {
                warn!("Query embedding failed, falling back to symbolic scoring: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for ScoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringService")
            .field("tables", &self.kb.len())
            .field("semantic", &self.embedder.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablescout_core::TableMetadata;

    #[test]
    fn rejects_empty_knowledge_base() {
        let kb = SchemaKnowledgeBase::builder().build().unwrap();
        let err = ScoringService::new(Arc::new(kb), ScoringConfig::default(), None).unwrap_err();
        assert!(matches!(err, TableScoutError::EmptyKnowledgeBase));
    }

    #[test]
    fn rejects_invalid_config() {
        let kb = SchemaKnowledgeBase::builder()
            .table(TableMetadata::new("courses"))
            .build()
            .unwrap();
        let mut config = ScoringConfig::default();
        config.filter.max_candidates = 0;
        assert!(ScoringService::new(Arc::new(kb), config, None).is_err());
    }

    #[test]
    fn empty_query_never_fails() {
        let kb = SchemaKnowledgeBase::builder()
            .tables([TableMetadata::new("courses"), TableMetadata::new("grades")])
            .build()
            .unwrap();
        let svc = ScoringService::new(Arc::new(kb), ScoringConfig::default(), None).unwrap();
        let selection = svc.select_tables("");
        assert_eq!(selection.query_class, QueryClass::Generic);
        assert_eq!(selection.all_scores.len(), 2);
        assert_eq!(selection.candidate_names(), vec!["courses"]);
    }
}
