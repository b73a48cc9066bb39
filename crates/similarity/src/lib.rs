//! Vector similarity for embedding comparison.
//!
//! Everything here is pure: no I/O, no allocation on the hot path, and the
//! same inputs always give the same answer. Embeddings arrive as `f32`
//! (that's what every provider hands back) but the arithmetic runs in `f64`
//! so self-similarity lands on 1.0 well inside a 1e-9 tolerance.
//!
//! ```
//! use similarity::cosine_similarity;
//!
//! let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
//! assert_eq!(sim, -1.0);
//! ```
//!
//! Zero-magnitude vectors are not an error. Their similarity to anything is
//! defined as 0 so downstream normalization never sees a NaN.

use thiserror::Error;

/// Chunk size for the accumulation loops. Keeps the three running sums in
/// registers and gives the compiler something it can vectorize.
const CHUNK_SIZE: usize = 32;

/// Errors produced by the similarity helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// The two vectors have different dimensionality. This is a caller bug
    /// (mixed embedding models, truncated response), never a runtime condition.
    #[error("invalid input: vector dimensions differ ({left} vs {right})")]
    InvalidInput { left: usize, right: usize },
}

/// Cosine similarity between two equal-length vectors.
///
/// Returns a value in `[-1, 1]`. When either vector has zero magnitude the
/// result is `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    check_dims(a, b)?;

    let (dot, norm_a_sq, norm_b_sq) = accumulate(a, b);
    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // Rounding can push |sim| a hair past 1 for (anti)parallel inputs.
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    check_dims(a, b)?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum())
}

/// Euclidean (L2) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[inline]
fn check_dims(a: &[f32], b: &[f32]) -> Result<(), SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::InvalidInput {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Returns `(a·b, ‖a‖², ‖b‖²)`, processed in fixed-size chunks.
#[inline]
fn accumulate(a: &[f32], b: &[f32]) -> (f64, f64, f64) {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (chunk_a, chunk_b) in a.chunks(CHUNK_SIZE).zip(b.chunks(CHUNK_SIZE)) {
        let (d, na, nb) = accumulate_chunk(chunk_a, chunk_b);
        dot += d;
        norm_a += na;
        norm_b += nb;
    }

    (dot, norm_a, norm_b)
}

#[inline(always)]
fn accumulate_chunk(a: &[f32], b: &[f32]) -> (f64, f64, f64) {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    (dot, norm_a, norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn identical_vectors_score_one() {
        let a = [0.3f32, -1.2, 4.5, 0.0, 2.2];
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < EPS, "got {sim}");
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert_eq!(sim, -1.0);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = [0.0f32; 4];
        let other = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &other).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&other, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn empty_vectors_are_degenerate_not_errors() {
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_invalid_input() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, SimilarityError::InvalidInput { left: 2, right: 3 });
        assert!(err.to_string().contains("invalid input"));
    }

    #[test]
    fn magnitude_does_not_matter() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [10.0f32, 20.0, 30.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < EPS);
    }

    #[test]
    fn chunked_matches_scalar_reference() {
        // Longer than one chunk with a ragged tail.
        let a: Vec<f32> = (0..100).map(|i| ((i * 7) % 13) as f32 - 6.0).collect();
        let b: Vec<f32> = (0..100).map(|i| ((i * 5) % 11) as f32 - 5.0).collect();

        let expected = {
            let d: f64 = a
                .iter()
                .zip(&b)
                .map(|(&x, &y)| f64::from(x) * f64::from(y))
                .sum();
            d / (l2_norm(&a) * l2_norm(&b))
        };

        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - expected).abs() < EPS);
    }

    #[test]
    fn known_value() {
        // [1,2,3]·[4,5,6] = 32, |a| = sqrt(14), |b| = sqrt(77)
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        let expected = 32.0 / (14.0f64.sqrt() * 77.0f64.sqrt());
        assert!((sim - expected).abs() < EPS);
    }

    #[test]
    fn dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), 11.0);
        assert!(dot(&[1.0], &[1.0, 2.0]).is_err());
        assert_eq!(l2_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.5]), Some(0.5));
        assert_eq!(mean(&[1.0, 0.0, -1.0, 2.0]), Some(0.5));
    }
}
