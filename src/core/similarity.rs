/// Cosine similarity between two embedding vectors
///
/// Returns 0.0 when either vector has zero norm or the lengths differ,
/// rather than producing NaN.
#[inline]
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

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Similarity of one query vector against every row of a matrix, in row order
pub fn cosine_similarities(query: &[f32], rows: &[Vec<f32>]) -> Vec<f64> {
    rows.iter().map(|row| cosine_similarity(query, row)).collect()
}
