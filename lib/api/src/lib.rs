//! # docseek API
//!
//! HTTP surface of docseek, built on actix-web:
//!
//! - `GET /buscar/?query=&k=&categoria=` - semantic document search
//! - `GET /azure-resources/?search=` - resource inventory listing
//! - `/sessions/...` - stateful resource browser per user, dropped when idle
//! - `GET /health`

pub mod rest;
pub mod sessions;

pub use rest::{AppState, RestApi};
pub use sessions::{BrowserView, ResourceView, SessionStore, DEFAULT_IDLE_TIMEOUT};
