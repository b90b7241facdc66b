use crate::{Error, Result, Vector};
use rayon::prelude::*;

/// Below this size scoring stays on the calling thread
const PARALLEL_THRESHOLD: usize = 4096;

/// Exact inner-product index.
///
/// Holds one vector per document, in corpus order. Built once; there is no
/// insert or delete. With unit-length vectors the score is the cosine
/// similarity.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vector>,
}

impl FlatIndex {
    pub fn build(dim: usize, vectors: Vec<Vector>) -> Result<Self> {
        if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }
        Ok(Self { dim, vectors })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top `k` positions by inner product with `query`.
    ///
    /// Returns `min(k, len)` pairs sorted by non-increasing score; equal
    /// scores keep ascending position order.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<(usize, f32)>> {
        if query.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim(),
            });
        }
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = if self.vectors.len() >= PARALLEL_THRESHOLD {
            self.vectors
                .par_iter()
                .enumerate()
                .map(|(i, v)| (i, v.dot(query)))
                .collect()
        } else {
            self.vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (i, v.dot(query)))
                .collect()
        };

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
