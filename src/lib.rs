//! # docseek
//!
//! Semantic search over a fixed internal document corpus, plus a fuzzy
//! browser for the resources of one cloud resource group.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! docseek --corpus data/documentos.txt --http-port 8000
//! curl 'http://localhost:8000/buscar/?query=firewall&k=3&categoria=Reclamos'
//!
//! # no model download, feature-hashing encoder
//! docseek --encoder hashing
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use docseek::prelude::*;
//!
//! let corpus = Corpus::from_documents(["Firewall perimeter config", "VPN gateway setup"]);
//! let service = QueryService::new(corpus, Box::new(HashingEncoder::default())).unwrap();
//! let response = service.search("vpn", 1).unwrap();
//! assert_eq!(response.hits[0].document, "VPN gateway setup");
//! ```
//!
//! ## Crate Structure
//!
//! - `docseek-core` - Corpus loading, text encoding, exact cosine index, query service
//!
//! ## Features
//!
//! - `fastembed` (default) - sentence-embedding encoder (all-MiniLM-L6-v2)
//! - `docseek-resources` - Resource inventory, heuristic matcher, browser state machine
//! - `docseek-api` - REST API

// Re-export core types
pub use docseek_core::{
    Corpus, Error, FlatIndex, HashingEncoder, QueryService, Result, SearchHit, SearchResponse,
    TextEncoder, Vector,
};
#[cfg(feature = "fastembed")]
pub use docseek_core::FastEmbedEncoder;

// Re-export resource matching
pub use docseek_resources::{
    AzCliProvider, BrowserState, Ranking, ResourceBrowser, ResourceError, ResourceProvider,
    ResourceRecord, StaticProvider,
};

// Re-export API
pub use docseek_api::{AppState, RestApi, SessionStore};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppState, AzCliProvider, BrowserState, Corpus, FlatIndex, HashingEncoder, QueryService,
        ResourceBrowser, ResourceProvider, ResourceRecord, RestApi, StaticProvider, TextEncoder,
        Vector,
    };
}
