//! Cosine similarity and its percentage rescale.

use super::RankError;

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}

/// Check that an embedding can take part in a cosine computation and return
/// its norm.
///
/// `index` is the candidate position, `None` for the query.
pub(crate) fn checked_norm(v: &[f32], index: Option<usize>) -> Result<f64, RankError> {
    if v.is_empty() {
        return Err(RankError::invalid_embedding(index, "embedding is empty"));
    }

    if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
        return Err(RankError::invalid_embedding(
            index,
            format!("non-finite value at position {pos}"),
        ));
    }

    // finite f32 values never underflow to zero once squared in f64, so
    // only the all-zero vector lands here
    let norm = l2_norm(v);
    if norm == 0.0 {
        return Err(RankError::invalid_embedding(index, "zero-norm vector"));
    }

    Ok(norm)
}

/// Cosine similarity with both norms precomputed.
///
/// Clamped to [-1, 1] so float overshoot never leaves the rescale range.
pub(crate) fn cosine_with_norms(a: &[f32], b: &[f32], a_norm: f64, b_norm: f64) -> f64 {
    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();

    (dot_product / (a_norm * b_norm)).clamp(-1.0, 1.0)
}

/// Compute cosine similarity between two embeddings.
///
/// Both vectors must be non-empty, finite, non-zero and of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, RankError> {
    let a_norm = checked_norm(a, None)?;
    if b.len() != a.len() {
        return Err(RankError::invalid_embedding(
            Some(0),
            format!("dimension mismatch: expected {}, got {}", a.len(), b.len()),
        ));
    }
    let b_norm = checked_norm(b, Some(0))?;

    Ok(cosine_with_norms(a, b, a_norm, b_norm))
}

/// Rescale a cosine similarity in [-1, 1] to a percentage in [0, 100].
///
/// -1 maps to 0, 0 to 50 and 1 to 100.
pub fn cosine_to_percent(cosine: f64) -> f64 {
    (cosine + 1.0) / 2.0 * 100.0
}

/// Round a percentage to two decimal places.
pub fn round_percent(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let v = vec![0.3, -1.2, 4.0];
        let cos = cosine_similarity(&v, &v).unwrap();
        assert!((cos - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        let cos = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(cos.abs() < 1e-9);

        let cos = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((cos + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_magnitude_independent() {
        let a = cosine_similarity(&[1.0, 2.0], &[2.0, 1.0]).unwrap();
        let b = cosine_similarity(&[10.0, 20.0], &[0.2, 0.1]).unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_percent_rescale() {
        assert_eq!(cosine_to_percent(-1.0), 0.0);
        assert_eq!(cosine_to_percent(0.0), 50.0);
        assert_eq!(cosine_to_percent(1.0), 100.0);
        assert_eq!(cosine_to_percent(0.5), 75.0);
    }

    #[test]
    fn test_round_percent() {
        assert_eq!(round_percent(83.456_78), 83.46);
        assert_eq!(round_percent(50.0), 50.0);
        assert_eq!(round_percent(12.344), 12.34);
    }

    #[test]
    fn test_zero_norm_rejected() {
        let result = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert!(matches!(
            result,
            Err(RankError::InvalidEmbedding { index: None, .. })
        ));

        let result = cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]);
        assert!(matches!(
            result,
            Err(RankError::InvalidEmbedding { index: Some(0), .. })
        ));
    }

    #[test]
    fn test_tiny_norm_accepted() {
        let cos = cosine_similarity(&[1e-8, 0.0], &[1.0, 0.0]).unwrap();
        assert!((cos - 1.0).abs() < 1e-12);

        let cos = cosine_similarity(&[1.0, 0.0], &[0.0, f32::MIN_POSITIVE]).unwrap();
        assert!(cos.abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = cosine_similarity(&[1.0, f32::NAN], &[1.0, 0.0]);
        assert!(matches!(result, Err(RankError::InvalidEmbedding { .. })));

        let result = cosine_similarity(&[1.0, 0.0], &[f32::INFINITY, 0.0]);
        assert!(matches!(result, Err(RankError::InvalidEmbedding { .. })));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(result, Err(RankError::InvalidEmbedding { .. })));
    }

    #[test]
    fn test_empty_rejected() {
        let result = cosine_similarity(&[], &[]);
        assert!(matches!(result, Err(RankError::InvalidEmbedding { .. })));
    }
}
