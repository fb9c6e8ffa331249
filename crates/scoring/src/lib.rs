//! Multi-signal table relevance scoring.
//!
//! The funnel runs term extraction, symbolic scoring over every table,
//! semantic refinement of the leaders, query classification, a conditional
//! centrality boost, the adaptive threshold filter and FK expansion.
//! [`ScoringService`] drives it end to end.

pub mod centrality;
pub mod classify;
pub mod confidence;
pub mod embedding;
pub mod filter;
pub mod fk;
pub mod selection;
pub mod semantic;
pub mod service;
pub mod signal;
pub mod symbolic;
pub mod table_score;
pub mod terms;
pub mod tokens;

pub use centrality::{apply_centrality_boost, BoostMode};
pub use classify::{QueryClass, QueryClassifier};
pub use confidence::{ConfidenceLevel, ConfidenceResult};
pub use embedding::{cosine_similarity, CacheStats, EmbeddingError, EmbeddingService, QueryEmbeddingCache};
pub use filter::filter_by_threshold;
pub use fk::{is_rescued, FkExpander, RESCUED_TAG};
pub use selection::TableSelection;
pub use semantic::SemanticRefiner;
pub use service::{ScoredQuery, ScoringService};
pub use signal::{HintOperation, SemanticTag, SignalKind};
pub use symbolic::SymbolicScorer;
pub use table_score::{rank_order, sort_scores, TableScore};
pub use terms::{QueryIntent, QueryTerms, TermExtractor};
pub use tokens::{token_match, tokenize_identifier};
