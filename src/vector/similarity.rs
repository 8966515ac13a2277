//! Vector Similarity Functions
//!
//! Dot product, magnitude and cosine similarity over `f64` components.

use crate::error::SimilarityError;

/// Basic vector operations
pub trait VectorOps {
    fn dot(&self, other: &Self) -> f64;
    fn magnitude(&self) -> f64;
    fn max_abs(&self) -> f64;
}

impl VectorOps for [f64] {
    #[inline]
    fn dot(&self, other: &Self) -> f64 {
        dot_product(self, other)
    }

    /// Euclidean norm, scaled by the largest component so the sum of
    /// squares neither overflows nor underflows.
    #[inline]
    fn magnitude(&self) -> f64 {
        let scale = self.max_abs();
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }
        let sum: f64 = self.iter().map(|x| (x / scale) * (x / scale)).sum();
        scale * sum.sqrt()
    }

    /// Largest absolute component, 0 for an empty or all-zero vector
    #[inline]
    fn max_abs(&self) -> f64 {
        self.iter().fold(0.0f64, |m, x| m.max(x.abs()))
    }
}

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance. Callers must pass
/// equal-length slices; [`cosine_similarity`] checks this first.
#[inline]
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len().min(b.len());
    let mut sum = 0.0f64;

    // Process 4 elements at a time (manual unrolling)
    let chunks = len / 4;
    let remainder = len % 4;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    for i in (len - remainder)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// Compute cosine similarity between two vectors
///
/// Returns a value in `[-1, 1]` where 1 means identical direction.
/// Vectors of different length are rejected rather than truncated, and a
/// zero-magnitude side or a non-finite result is reported instead of
/// yielding `NaN`.
///
/// Each side is divided by its largest absolute component first. Cosine
/// similarity is scale-invariant, and the scaled components lie in
/// `[-1, 1]`, so no intermediate sum overflows or underflows to zero.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (scale_a, scale_b) = (a.max_abs(), b.max_abs());
    if scale_a == 0.0 || scale_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Err(SimilarityError::NonFinite);
    }

    Ok(similarity.clamp(-1.0, 1.0))
}
