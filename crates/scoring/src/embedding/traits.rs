use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding backend error: {0}")]
    Backend(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No embedding service configured")]
    NotConfigured,
}

/// Seam to the embedding collaborator (hosted model, local ONNX, test double).
///
/// Calls are blocking; the pipeline makes at most one `embed` call per
/// distinct query string per cache lifetime.
pub trait EmbeddingService: Send + Sync {
    /// Embed one piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Similarity in [0, 1]. Defaults to clamped cosine similarity.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }
}

/// Cosine similarity clamped to [0, 1].
///
/// Vectors of different length, empty vectors and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}
