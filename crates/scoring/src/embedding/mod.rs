pub mod cache;
pub mod traits;

pub use cache::{CacheStats, QueryEmbeddingCache};
pub use traits::{cosine_similarity, EmbeddingError, EmbeddingService};
