pub mod centrality;
pub mod knowledge;
pub mod store;

pub use centrality::{compute_centrality, weighted_degree};
pub use knowledge::{KnowledgeBaseBuilder, Relationship, SchemaKnowledgeBase};
pub use store::{FkEdge, GraphStats, SchemaGraph};
