//! Per-user resource browser sessions

use docseek_resources::{BrowserState, ResourceBrowser, ScoredResource};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Sessions unused for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on live sessions; the least recently used one goes first
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Idle sweeps run at most this often
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Session {
    browser: ResourceBrowser,
    last_used: Instant,
}

/// Browsers keyed by session id. Sessions never share state.
///
/// A session expires once it has not been touched for the idle timeout.
/// Expired sessions are invisible right away and removed by a sweep that
/// runs when sessions are created.
pub struct SessionStore {
    browsers: RwLock<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
    max_sessions: usize,
    last_sweep: Mutex<Instant>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self::with_limits(idle_timeout, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            browsers: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn create(&self) -> Uuid {
        self.maybe_sweep();

        let id = Uuid::new_v4();
        let mut browsers = self.browsers.write();
        while browsers.len() >= self.max_sessions {
            let oldest = browsers
                .iter()
                .min_by_key(|(_, session)| session.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    debug!("Session limit reached, dropping least recently used {}", oldest);
                    browsers.remove(&oldest);
                }
                None => break,
            }
        }
        browsers.insert(
            id,
            Session {
                browser: ResourceBrowser::default(),
                last_used: Instant::now(),
            },
        );
        id
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.browsers
            .read()
            .get(id)
            .is_some_and(|session| !self.is_expired(session))
    }

    /// Run `f` against one session and mark it used; `None` if the session
    /// does not exist or has expired
    pub fn with<R>(&self, id: &Uuid, f: impl FnOnce(&mut ResourceBrowser) -> R) -> Option<R> {
        let mut browsers = self.browsers.write();
        if browsers.get(id).is_some_and(|session| self.is_expired(session)) {
            browsers.remove(id);
            return None;
        }
        browsers.get_mut(id).map(|session| {
            session.last_used = Instant::now();
            f(&mut session.browser)
        })
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.browsers.write().remove(id).is_some()
    }

    /// Drop every expired session, returning how many were dropped
    pub fn evict_idle(&self) -> usize {
        let mut browsers = self.browsers.write();
        let before = browsers.len();
        browsers.retain(|_, session| session.last_used.elapsed() < self.idle_timeout);
        let evicted = before - browsers.len();
        *self.last_sweep.lock() = Instant::now();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Live sessions, including expired ones not swept yet
    pub fn len(&self) -> usize {
        self.browsers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.browsers.read().is_empty()
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.last_used.elapsed() >= self.idle_timeout
    }

    fn maybe_sweep(&self) {
        let interval = self.idle_timeout.min(MAX_SWEEP_INTERVAL);
        if self.last_sweep.lock().elapsed() >= interval {
            self.evict_idle();
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceView {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
    pub similarity: f32,
    pub matches: bool,
}

impl ResourceView {
    fn new(scored: &ScoredResource, matches: bool) -> Self {
        Self {
            name: scored.record.name.clone(),
            resource_type: scored.record.resource_type.clone(),
            location: scored.record.location.clone(),
            similarity: scored.score,
            matches,
        }
    }
}

/// JSON rendering of a browser
#[derive(Debug, Clone, Serialize)]
pub struct BrowserView {
    pub state: &'static str,
    pub search: Option<String>,
    pub type_filter: Option<String>,
    pub threshold: f32,
    pub total: usize,
    pub matched: usize,
    pub resources: Vec<ResourceView>,
    pub best_match: Option<ResourceView>,
    pub type_options: Vec<String>,
}

impl From<&ResourceBrowser> for BrowserView {
    fn from(browser: &ResourceBrowser) -> Self {
        let state: &BrowserState = browser.state();
        let mut view = BrowserView {
            state: state.name(),
            search: None,
            type_filter: None,
            threshold: browser.threshold(),
            total: 0,
            matched: 0,
            resources: Vec::new(),
            best_match: None,
            type_options: state.type_options(),
        };

        if let Some(ranking) = state.ranking() {
            view.search = Some(ranking.term().to_string());
            view.threshold = ranking.threshold();
            view.type_filter = ranking.type_filter().map(str::to_string);
            view.total = ranking.total();
            view.matched = ranking.match_count();
            view.resources = ranking
                .ranked()
                .iter()
                .map(|r| ResourceView::new(r, ranking.is_match(r)))
                .collect();
            view.best_match = ranking.best().map(|r| ResourceView::new(r, true));
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseek_resources::ResourceRecord;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_eq!(store.len(), 2);

        store.with(&a, |browser| {
            browser.search("vm1", vec![ResourceRecord::new("vm1", "VM", "East US")]);
        });

        let view_a = store.with(&a, |browser| BrowserView::from(&*browser)).unwrap();
        let view_b = store.with(&b, |browser| BrowserView::from(&*browser)).unwrap();
        assert_eq!(view_a.state, "ranked");
        assert_eq!(view_a.best_match.unwrap().name, "vm1");
        assert_eq!(view_b.state, "idle");

        assert!(store.remove(&a));
        assert!(!store.contains(&a));
        assert!(store.with(&a, |_| ()).is_none());
    }

    #[test]
    fn test_idle_session_is_evicted() {
        let store = SessionStore::with_idle_timeout(Duration::from_millis(20));
        let idle = store.create();
        assert!(store.contains(&idle));

        std::thread::sleep(Duration::from_millis(40));
        assert!(!store.contains(&idle));
        assert!(store.with(&idle, |_| ()).is_none());

        // Creating a session sweeps whatever expired in the meantime
        let stale = store.create();
        std::thread::sleep(Duration::from_millis(40));
        let fresh = store.create();
        assert_eq!(store.len(), 1);
        assert!(!store.contains(&stale));
        assert!(store.contains(&fresh));
    }

    #[test]
    fn test_use_keeps_session_alive() {
        let store = SessionStore::with_idle_timeout(Duration::from_millis(200));
        let id = store.create();
        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(80));
            assert!(store.with(&id, |browser| browser.threshold()).is_some());
        }
        assert_eq!(store.evict_idle(), 0);
        assert!(store.contains(&id));
    }

    #[test]
    fn test_session_count_is_capped() {
        let store = SessionStore::with_limits(DEFAULT_IDLE_TIMEOUT, 100);
        let first = store.create();
        for _ in 0..1_000 {
            store.create();
        }
        assert_eq!(store.len(), 100);
        assert!(!store.contains(&first));
    }

    #[test]
    fn test_evict_idle_counts_dropped_sessions() {
        let store = SessionStore::with_idle_timeout(Duration::from_millis(10));
        store.create();
        store.create();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(store.evict_idle(), 2);
        assert!(store.is_empty());
    }
}
