//! Text encoders
//!
//! Converts text into fixed-dimension dense vectors. The query service only
//! relies on the [`TextEncoder`] trait. The server runs [`FastEmbedEncoder`]
//! (a local sentence-embedding model); [`HashingEncoder`] needs no model
//! files and is used for offline runs and tests.

use crate::{Error, Result, Vector};
use rayon::prelude::*;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Output dimension of all-MiniLM-L6-v2
pub const DEFAULT_DIM: usize = 384;

/// Word features weigh more than character trigrams
const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

/// Maps text to fixed-length vectors. Must be deterministic.
pub trait TextEncoder: Send + Sync {
    /// Output dimension
    fn dim(&self) -> usize;

    /// Encode a batch of texts, one vector per input, same order
    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>>;

    /// Encode and scale every vector to unit length, so that inner
    /// product equals cosine similarity
    fn encode_normalized(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut vectors = self.encode(texts)?;
        for v in &mut vectors {
            v.normalize();
        }
        Ok(vectors)
    }
}

/// Feature-hashing encoder over lowercase character trigrams and words.
///
/// Texts that share words and character sequences end up with a high
/// cosine similarity. The hasher uses fixed keys so vectors are identical
/// across processes.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "encoder dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    /// Encode one text (not normalized)
    pub fn embed(&self, text: &str) -> Vector {
        let mut vector = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();

        for trigram in trigrams(&lowered) {
            vector[self.bucket(&trigram)] += TRIGRAM_WEIGHT;
        }
        for word in lowered.split_whitespace() {
            vector[self.bucket(word)] += WORD_WEIGHT;
        }

        Vector::new(vector)
    }

    #[inline]
    fn bucket(&self, feature: &str) -> usize {
        // DefaultHasher::new() is keyed with zeros, so this is stable
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() % self.dim as u64) as usize
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl TextEncoder for HashingEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        Ok(texts.par_iter().map(|t| self.embed(t)).collect())
    }
}

/// Sentence-embedding encoder backed by a local ONNX model
/// (all-MiniLM-L6-v2, 384 dimensions).
///
/// The model files are downloaded into the cache directory on first use.
#[cfg(feature = "fastembed")]
pub struct FastEmbedEncoder {
    model: parking_lot::Mutex<fastembed::TextEmbedding>,
    dim: usize,
}

#[cfg(feature = "fastembed")]
impl FastEmbedEncoder {
    /// Texts per inference batch
    const BATCH_SIZE: usize = 64;

    /// Load the model, using `cache_dir` for model files when given
    pub fn new(cache_dir: Option<std::path::PathBuf>) -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Encoder(format!("failed to load embedding model: {}", e)))?;
        tracing::info!("Loaded embedding model all-MiniLM-L6-v2 ({}d)", DEFAULT_DIM);

        Ok(Self {
            model: parking_lot::Mutex::new(model),
            dim: DEFAULT_DIM,
        })
    }
}

#[cfg(feature = "fastembed")]
impl std::fmt::Debug for FastEmbedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedEncoder")
            .field("model", &"all-MiniLM-L6-v2")
            .field("dim", &self.dim)
            .finish()
    }
}

#[cfg(feature = "fastembed")]
impl TextEncoder for FastEmbedEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), Some(Self::BATCH_SIZE))
            .map_err(|e| Error::Encoder(e.to_string()))?;

        embeddings
            .into_iter()
            .map(|e| {
                if e.len() != self.dim {
                    return Err(Error::InvalidDimension {
                        expected: self.dim,
                        actual: e.len(),
                    });
                }
                Ok(Vector::new(e))
            })
            .collect()
    }
}

/// Distinct character trigrams of the text padded with two spaces per side
fn trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}
