//! Corpus loading
//!
//! A corpus is a plain UTF-8 text file holding one document per line.
//! Documents are identified only by their position in the file.

use crate::{Error, Result};
use std::path::Path;

/// Ordered, immutable list of documents
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<String>,
}

impl Corpus {
    /// Read a corpus file. Lines are trimmed and blank lines skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let corpus = Self::from_documents(raw.lines());

        if corpus.is_empty() {
            return Err(Error::EmptyCorpus(path.display().to_string()));
        }

        tracing::debug!("Loaded {} documents from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    /// Build a corpus in memory with the same trimming rules as [`Corpus::load`]
    pub fn from_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = documents
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        Self { documents }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.documents.get(position).map(String::as_str)
    }

    #[inline]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }
}
