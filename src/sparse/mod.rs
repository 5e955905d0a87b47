//! Sparse vector math — pure, stateless, no I/O.
//!
//! A [`SparseVector`] maps non-negative integer dimension indices to non-zero
//! real values. Keys that would map to zero are never stored (I2); ordering
//! of keys is not semantically meaningful. The empty vector is valid and has
//! norm zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reinforcement-feedback ranking weight (§4.3.2). Bounds the score boost to
/// ±`FEEDBACK_WEIGHT` regardless of how large the accumulated score grows.
pub const FEEDBACK_WEIGHT: f64 = 0.10;

/// Default sparsification threshold for [`dense_to_sparse`].
pub const DEFAULT_SPARSE_THRESHOLD: f64 = 0.01;

/// Index → value mapping with no zero-valued entries.
///
/// Serializes as a JSON object with decimal-string keys (`{"10": 0.5}`), the
/// unavoidable consequence of JSON object keys being strings. Deserialisation
/// parses each key back into a `u32`; a non-numeric key is a hard parse error
/// rather than a silently dropped entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector(HashMap<u32, f64>);

impl SparseVector {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn from_map(map: HashMap<u32, f64>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: u32) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Insert a value, dropping the entry instead if it rounds to zero — I2
    /// is enforced at the single choke point every producer passes through.
    pub fn insert(&mut self, key: u32, value: f64) {
        if value == 0.0 {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn into_inner(self) -> HashMap<u32, f64> {
        self.0
    }
}

impl FromIterator<(u32, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        let mut v = SparseVector::new();
        for (k, val) in iter {
            v.insert(k, val);
        }
        v
    }
}

impl Serialize for SparseVector {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(&k.to_string(), v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SparseVector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: HashMap<String, f64> = HashMap::deserialize(deserializer)?;
        let mut out = HashMap::with_capacity(raw.len());
        for (k, v) in raw {
            let idx: u32 = k.parse().map_err(|_| {
                serde::de::Error::custom(format!("sparse vector key '{k}' is not an integer"))
            })?;
            if v != 0.0 {
                out.insert(idx, v);
            }
        }
        Ok(SparseVector(out))
    }
}

/// Sum of `a[k] * b[k]` over keys present in both operands.
///
/// Iterates the smaller-cardinality side so the cost scales with
/// `min(|a|, |b|)`. Traversal order does not affect the mathematical result
/// beyond ordinary floating-point summation-order jitter.
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(k, v)| large.get(k).map(|bv| v * bv))
        .sum()
}

/// Euclidean norm. Exactly 0.0 for the empty vector.
pub fn norm(v: &SparseVector) -> f64 {
    v.iter().map(|(_, val)| val * val).sum::<f64>().sqrt()
}

/// Cosine similarity. Returns 0.0 if either operand has zero norm.
///
/// `a_norm`, when supplied, is used instead of recomputing `norm(a)` — the
/// caller is expected to compute the query's norm once and reuse it across
/// every candidate during a ranked search.
pub fn cosine(a: &SparseVector, b: &SparseVector, a_norm: Option<f64>) -> f64 {
    let an = a_norm.unwrap_or_else(|| norm(a));
    if an == 0.0 {
        return 0.0;
    }
    let bn = norm(b);
    if bn == 0.0 {
        return 0.0;
    }
    dot(a, b) / (an * bn)
}

/// Convert a dense embedding into a [`SparseVector`], optionally L2-normalising
/// first, then dropping every component whose absolute value does not exceed
/// `threshold`. Never emits a zero-valued entry (I2).
///
/// If `normalise` is true and the dense vector's norm is zero, returns the
/// empty vector rather than dividing by zero.
pub fn dense_to_sparse(dense: &[f64], threshold: f64, normalise: bool) -> SparseVector {
    let scale = if normalise {
        let n = dense.iter().map(|x| x * x).sum::<f64>().sqrt();
        if n == 0.0 {
            return SparseVector::new();
        }
        1.0 / n
    } else {
        1.0
    };

    dense
        .iter()
        .enumerate()
        .filter_map(|(i, &x)| {
            let scaled = x * scale;
            if scaled.abs() > threshold {
                Some((i as u32, scaled))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(pairs: &[(u32, f64)]) -> SparseVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn dot_sums_shared_keys_only() {
        let a = sv(&[(1, 2.0), (2, 3.0)]);
        let b = sv(&[(2, 4.0), (3, 5.0)]);
        assert_eq!(dot(&a, &b), 12.0); // only dim 2 overlaps: 3.0*4.0
    }

    #[test]
    fn dot_is_symmetric_regardless_of_which_side_is_smaller() {
        let a = sv(&[(1, 2.0)]);
        let b = sv(&[(1, 3.0), (2, 5.0), (3, 7.0)]);
        assert_eq!(dot(&a, &b), dot(&b, &a));
    }

    #[test]
    fn norm_of_empty_is_zero() {
        assert_eq!(norm(&SparseVector::new()), 0.0);
    }

    #[test]
    fn norm_matches_euclidean_definition() {
        let v = sv(&[(0, 3.0), (1, 4.0)]);
        assert_eq!(norm(&v), 5.0);
    }

    #[test]
    fn cosine_identical_vectors_is_one() {
        let v = sv(&[(1, 1.0), (2, 2.0)]);
        assert!((cosine(&v, &v, None) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_orthogonal_vectors_is_zero() {
        let a = sv(&[(1, 1.0)]);
        let b = sv(&[(2, 1.0)]);
        assert_eq!(cosine(&a, &b, None), 0.0);
    }

    #[test]
    fn cosine_zero_norm_query_is_zero() {
        let empty = SparseVector::new();
        let b = sv(&[(1, 1.0)]);
        assert_eq!(cosine(&empty, &b, None), 0.0);
    }

    #[test]
    fn cosine_zero_norm_candidate_is_zero() {
        let a = sv(&[(1, 1.0)]);
        let empty = SparseVector::new();
        assert_eq!(cosine(&a, &empty, None), 0.0);
    }

    #[test]
    fn cosine_accepts_precomputed_a_norm() {
        let a = sv(&[(1, 3.0), (2, 4.0)]);
        let b = sv(&[(1, 3.0), (2, 4.0)]);
        let precomputed = norm(&a);
        assert!((cosine(&a, &b, Some(precomputed)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dense_to_sparse_drops_values_at_or_below_threshold() {
        let dense = vec![0.02, 0.005, -0.3];
        let sparse = dense_to_sparse(&dense, 0.01, false);
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse.get(0), Some(0.02));
        assert_eq!(sparse.get(1), None);
        assert_eq!(sparse.get(2), Some(-0.3));
    }

    #[test]
    fn dense_to_sparse_normalises_before_thresholding() {
        let dense = vec![3.0, 4.0]; // norm = 5
        let sparse = dense_to_sparse(&dense, 0.01, true);
        assert!((sparse.get(0).unwrap() - 0.6).abs() < 1e-9);
        assert!((sparse.get(1).unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn dense_to_sparse_zero_vector_normalised_is_empty() {
        let dense = vec![0.0, 0.0, 0.0];
        let sparse = dense_to_sparse(&dense, 0.01, true);
        assert!(sparse.is_empty());
    }

    #[test]
    fn dense_to_sparse_never_emits_zero_values() {
        let dense = vec![0.0, 1.0, 0.0, -1.0];
        let sparse = dense_to_sparse(&dense, 0.0, false);
        for (_, v) in sparse.iter() {
            assert_ne!(v, 0.0);
        }
    }

    #[test]
    fn insert_of_zero_removes_the_key() {
        let mut v = sv(&[(1, 1.0)]);
        v.insert(1, 0.0);
        assert!(v.is_empty());
    }

    #[test]
    fn serde_round_trip_preserves_integer_keys() {
        let v = sv(&[(10, 1.0), (11, 0.5)]);
        let json = serde_json::to_string(&v).unwrap();
        let back: SparseVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(10), Some(1.0));
        assert_eq!(back.get(11), Some(0.5));
    }

    #[test]
    fn deserialize_rejects_non_numeric_keys() {
        let json = r#"{"not-a-number": 1.0}"#;
        let result: std::result::Result<SparseVector, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_drops_zero_valued_entries() {
        let json = r#"{"1": 0.0, "2": 5.0}"#;
        let v: SparseVector = serde_json::from_str(json).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(2), Some(5.0));
    }
}
