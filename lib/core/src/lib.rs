//! # docseek Core
//!
//! Core library for the docseek semantic search service.
//!
//! - [`Corpus`] - Ordered documents loaded from a line-per-document file
//! - [`TextEncoder`] - Text to dense vector encoding: `FastEmbedEncoder`
//!   (sentence embeddings, `fastembed` feature) or [`HashingEncoder`] (offline)
//! - [`FlatIndex`] - Exact inner-product (cosine) nearest neighbour index
//! - [`QueryService`] - Encodes queries and ranks corpus documents
//!
//! ## Example
//!
//! ```rust
//! use docseek_core::{Corpus, HashingEncoder, QueryService};
//!
//! let corpus = Corpus::from_documents(["Firewall perimeter config", "VPN gateway setup"]);
//! let service = QueryService::new(corpus, Box::new(HashingEncoder::default())).unwrap();
//!
//! let response = service.search("Firewall", 1).unwrap();
//! assert_eq!(response.hits[0].document, "Firewall perimeter config");
//! ```

pub mod corpus;
pub mod encoder;
pub mod error;
pub mod index;
pub mod service;
pub mod vector;

/// Inner-product kernels
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - scalar fallback elsewhere
pub mod simd;

pub use corpus::Corpus;
pub use encoder::{HashingEncoder, TextEncoder, DEFAULT_DIM};
#[cfg(feature = "fastembed")]
pub use encoder::FastEmbedEncoder;
pub use error::{Error, Result};
pub use index::FlatIndex;
pub use service::{QueryService, SearchHit, SearchResponse, DEFAULT_K};
pub use vector::Vector;
