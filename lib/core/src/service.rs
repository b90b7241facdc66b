//! Query service
//!
//! Owns the corpus, the encoder and the index. Everything is built in
//! [`QueryService::new`] and never mutated afterwards, so one instance can
//! be shared behind an `Arc` by all request handlers without locking.

use crate::{Corpus, Error, FlatIndex, Result, TextEncoder};
use std::time::Instant;
use tracing::{debug, info};

/// Number of results when the caller does not ask for a specific count
pub const DEFAULT_K: usize = 3;

/// One ranked document
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Position of the document in the corpus
    pub position: usize,
    pub document: String,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// Ranked documents for a query, best first
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

pub struct QueryService {
    corpus: Corpus,
    encoder: Box<dyn TextEncoder>,
    index: FlatIndex,
}

impl QueryService {
    /// Encode the whole corpus and build the index
    pub fn new(corpus: Corpus, encoder: Box<dyn TextEncoder>) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus("no documents to index".to_string()));
        }

        let started = Instant::now();
        let texts: Vec<&str> = corpus.documents().iter().map(String::as_str).collect();
        let vectors = encoder.encode_normalized(&texts)?;
        if vectors.len() != corpus.len() {
            return Err(Error::Encoder(format!(
                "encoder returned {} vectors for {} documents",
                vectors.len(),
                corpus.len()
            )));
        }

        let index = FlatIndex::build(encoder.dim(), vectors)?;
        info!(
            "Indexed {} documents (dim {}) in {:?}",
            index.len(),
            index.dim(),
            started.elapsed()
        );

        Ok(Self {
            corpus,
            encoder,
            index,
        })
    }

    #[inline]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check a caller-supplied result count against `[1, corpus size]`
    pub fn validate_k(&self, k: i64) -> Result<usize> {
        let max = self.len();
        match usize::try_from(k) {
            Ok(n) if (1..=max).contains(&n) => Ok(n),
            _ => Err(Error::InvalidK { k, max }),
        }
    }

    /// Return the `k` documents most similar to `query`
    pub fn search(&self, query: &str, k: usize) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        if k == 0 || k > self.len() {
            return Err(Error::InvalidK {
                k: i64::try_from(k).unwrap_or(i64::MAX),
                max: self.len(),
            });
        }

        let mut encoded = self.encoder.encode_normalized(&[query])?;
        let query_vector = encoded
            .pop()
            .ok_or_else(|| Error::Encoder("encoder returned no vector for query".to_string()))?;

        let hits = self
            .index
            .search(&query_vector, k)?
            .into_iter()
            .filter_map(|(position, score)| {
                self.corpus.get(position).map(|document| SearchHit {
                    position,
                    document: document.to_string(),
                    score,
                })
            })
            .collect::<Vec<_>>();

        debug!("query {:?} -> {} hits", query, hits.len());
        Ok(SearchResponse {
            query: query.to_string(),
            hits,
        })
    }
}
