//! Resource browser state machine
//!
//! ```text
//!            search("")                       search(term)
//!   ┌──────┐ <──────────── any state ────────────> ┌────────┐
//!   │ Idle │                                       │ Ranked │
//!   └──────┘         search(ambiguous term)        └────────┘
//!                 ──────────> ┌──────────────┐          ^
//!                             │ AwaitingType │ ─────────┘
//!                             └──────────────┘  select_type(t)
//! ```
//!
//! `set_threshold` re-ranks in place and never changes the state kind.

use crate::matcher::{ambiguous_names, clamp_threshold, distinct_types, rank, Ranking, DEFAULT_THRESHOLD};
use crate::{ResourceError, ResourceRecord, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserState {
    /// No search performed
    Idle,
    /// Results shown; names are unique or a type has been chosen
    Ranked { ranking: Ranking },
    /// The term names several resources of different types
    AwaitingType {
        ranking: Ranking,
        candidates: Vec<ResourceRecord>,
    },
}

impl BrowserState {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserState::Idle => "idle",
            BrowserState::Ranked { .. } => "ranked",
            BrowserState::AwaitingType { .. } => "awaiting_type",
        }
    }

    pub fn ranking(&self) -> Option<&Ranking> {
        match self {
            BrowserState::Idle => None,
            BrowserState::Ranked { ranking } | BrowserState::AwaitingType { ranking, .. } => {
                Some(ranking)
            }
        }
    }

    /// Types the user can pick from while awaiting a selection
    pub fn type_options(&self) -> Vec<String> {
        match self {
            BrowserState::AwaitingType { candidates, .. } => distinct_types(candidates),
            _ => Vec::new(),
        }
    }
}

/// One user's view of the resource inventory
#[derive(Debug, Clone)]
pub struct ResourceBrowser {
    state: BrowserState,
    records: Vec<ResourceRecord>,
    threshold: f32,
}

impl Default for ResourceBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ResourceBrowser {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: BrowserState::Idle,
            records: Vec::new(),
            threshold: clamp_threshold(threshold),
        }
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Submit a new search over a freshly fetched inventory
    pub fn search(&mut self, term: &str, records: Vec<ResourceRecord>) -> &BrowserState {
        let term = term.trim();
        self.records = records;

        self.state = if term.is_empty() {
            BrowserState::Idle
        } else {
            let ranking = rank(&self.records, term, None, self.threshold);
            let candidates = ambiguous_names(&self.records, term);
            if candidates.is_empty() {
                BrowserState::Ranked { ranking }
            } else {
                BrowserState::AwaitingType {
                    ranking,
                    candidates,
                }
            }
        };
        &self.state
    }

    /// Resolve an ambiguous search by choosing one of the offered types
    pub fn select_type(&mut self, resource_type: &str) -> Result<&BrowserState> {
        let (term, chosen) = match &self.state {
            BrowserState::AwaitingType {
                ranking,
                candidates,
            } => {
                let wanted = resource_type.to_lowercase();
                let chosen = candidates
                    .iter()
                    .find(|c| c.resource_type.to_lowercase() == wanted)
                    .map(|c| c.resource_type.clone())
                    .ok_or_else(|| ResourceError::UnknownType(resource_type.to_string()))?;
                (ranking.term().to_string(), chosen)
            }
            _ => {
                return Err(ResourceError::InvalidTransition(
                    "a type can only be selected after an ambiguous search",
                ))
            }
        };

        let ranking = rank(&self.records, &term, Some(&chosen), self.threshold);
        self.state = BrowserState::Ranked { ranking };
        Ok(&self.state)
    }

    /// Change the similarity threshold and re-rank the current results
    pub fn set_threshold(&mut self, threshold: f32) -> &BrowserState {
        self.threshold = clamp_threshold(threshold);
        let threshold = self.threshold;
        let records = &self.records;

        let rerank = |ranking: &Ranking| {
            rank(records, ranking.term(), ranking.type_filter(), threshold)
        };

        self.state = match &self.state {
            BrowserState::Idle => BrowserState::Idle,
            BrowserState::Ranked { ranking } => BrowserState::Ranked {
                ranking: rerank(ranking),
            },
            BrowserState::AwaitingType {
                ranking,
                candidates,
            } => BrowserState::AwaitingType {
                ranking: rerank(ranking),
                candidates: candidates.clone(),
            },
        };
        &self.state
    }
}
