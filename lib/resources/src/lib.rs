//! # docseek Resources
//!
//! Cloud resource inventory and heuristic matching.
//!
//! - [`ResourceProvider`] - lists the resources of a resource group
//!   ([`AzCliProvider`] shells out to the Azure CLI, [`StaticProvider`] is in-memory)
//! - [`matcher`] - rule-based name/type/location scoring and threshold ranking
//! - [`ResourceBrowser`] - per-user search state, including disambiguation of
//!   resources that share a name across different types
//!
//! ## Example
//!
//! ```rust
//! use docseek_resources::{ResourceBrowser, ResourceRecord, BrowserState};
//!
//! let records = vec![
//!     ResourceRecord::new("vm1", "VM", "East US"),
//!     ResourceRecord::new("vm1", "Disk", "East US"),
//! ];
//!
//! let mut browser = ResourceBrowser::default();
//! assert!(matches!(browser.search("vm1", records), BrowserState::AwaitingType { .. }));
//!
//! let state = browser.select_type("VM").unwrap();
//! assert_eq!(state.ranking().unwrap().best().unwrap().score, 1.0);
//! ```

pub mod browser;
pub mod error;
pub mod matcher;
pub mod provider;
pub mod record;

pub use browser::{BrowserState, ResourceBrowser};
pub use error::{ResourceError, Result};
pub use matcher::{rank, score, Matcher, Ranking, ScoredResource, DEFAULT_THRESHOLD};
pub use provider::{filter_by_name, AzCliProvider, ResourceProvider, StaticProvider};
pub use record::{parse_resource_list, ResourceRecord};
