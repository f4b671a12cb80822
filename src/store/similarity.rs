use std::cmp::Ordering;

use ndarray::ArrayView1;

use crate::core::errors::RagError;

pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, RagError> {
    if query.is_empty() || candidate.is_empty() {
        return Err(RagError::Store("vectors must not be empty".to_string()));
    }
    if query.len() != candidate.len() {
        return Err(RagError::Store(format!(
            "vector length mismatch: {} != {}",
            query.len(),
            candidate.len()
        )));
    }

    let query = ArrayView1::from(query);
    let candidate = ArrayView1::from(candidate);
    let denom = query.dot(&query).sqrt() * candidate.dot(&candidate).sqrt();
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }
    Ok(query.dot(&candidate) / denom)
}

/// `(index, score)` pairs, best first.
pub fn rank_descending_by_cosine(
    query: &[f32],
    candidates: &[Vec<f32>],
) -> Result<Vec<(usize, f32)>, RagError> {
    let mut scores = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        scores.push((idx, cosine_similarity(query, candidate)?));
    }
    scores.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(cosine_similarity(&vec, &vec).unwrap(), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_or_zero_vectors() {
        assert!(approx_eq(
            cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(),
            0.0
        ));
        assert!(approx_eq(
            cosine_similarity(&[0.0, 0.0], &[0.0, 1.0]).unwrap(),
            0.0
        ));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
        assert!(cosine_similarity(&[], &[]).is_err());
    }

    #[test]
    fn ranking_is_descending() {
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let ranked = rank_descending_by_cosine(&[1.0, 0.0], &candidates).unwrap();
        let order: Vec<usize> = ranked.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
