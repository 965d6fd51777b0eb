//! Per-browser session state: the last generated report.
//!
//! Lifecycle of a session's report:
//! `Empty` on creation → `Ready` after every completed generation →
//! `Stale` when a later generation fails → dropped on reset, after a day
//! idle, or when the store is full and it is the least recently used.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use dashmap::DashMap;
use scholar_core::Report;

pub const COOKIE_NAME: &str = "scholar_session";

#[derive(Debug, Clone, Default)]
pub enum SessionReport {
    #[default]
    Empty,
    Ready(Arc<Report>),
    /// The last generation failed; this is the report from before it.
    Stale(Arc<Report>),
}

impl SessionReport {
    pub fn report(&self) -> Option<&Arc<Report>> {
        match self {
            SessionReport::Empty => None,
            SessionReport::Ready(r) | SessionReport::Stale(r) => Some(r),
        }
    }

    pub fn state_str(&self) -> &'static str {
        match self {
            SessionReport::Empty => "empty",
            SessionReport::Ready(_) => "ready",
            SessionReport::Stale(_) => "stale",
        }
    }
}

/// Sessions kept at most; the least recently used is evicted beyond this.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;
/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct SessionEntry {
    report: SessionReport,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            report: SessionReport::Empty,
            last_seen: Instant::now(),
        }
    }
}

/// All live sessions, keyed by cookie value.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    /// Start a new empty session and return its id.
    ///
    /// Expired sessions are swept first, then the least recently used ones
    /// are evicted until there is room.
    pub fn create(&self) -> String {
        self.sweep_expired();
        while self.sessions.len() >= self.max_sessions {
            if !self.evict_oldest() {
                break;
            }
        }

        let id = format!("{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..));
        self.sessions.insert(id.clone(), SessionEntry::new());
        tracing::debug!(session = %id, live = self.sessions.len(), "session created");
        id
    }

    /// Mark the session as used. Returns false when it does not exist.
    pub fn touch(&self, id: &str) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<SessionReport> {
        self.sessions.get(id).map(|entry| entry.report.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Overwrite the session's report with a freshly generated one.
    ///
    /// Sessions reset or evicted while the report was generating stay gone.
    pub fn store_report(&self, id: &str, report: Arc<Report>) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                entry.report = SessionReport::Ready(report);
                entry.last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Record a failed generation. An existing report is kept but marked stale.
    pub fn mark_failed(&self, id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            let previous = std::mem::take(&mut entry.report);
            entry.report = match previous {
                SessionReport::Ready(r) | SessionReport::Stale(r) => SessionReport::Stale(r),
                SessionReport::Empty => SessionReport::Empty,
            };
        }
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    fn sweep_expired(&self) {
        let ttl = self.idle_ttl;
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < ttl);
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.last_seen)
            .map(|entry| entry.key().clone());
        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                tracing::debug!(session = %id, "evicted least recently used session");
                true
            }
            None => false,
        }
    }
}

/// Read the session id from the request's cookies.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}

pub fn cookie_header(id: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

/// Resolve the caller's session, creating one when absent or unknown.
///
/// Returns the `Set-Cookie` value to attach when a new session was created.
pub fn resolve(store: &SessionStore, headers: &HeaderMap) -> (String, Option<HeaderValue>) {
    if let Some(id) = session_from_headers(headers)
        && store.touch(&id)
    {
        return (id, None);
    }
    let id = store.create();
    let cookie = cookie_header(&id);
    (id, cookie)
}

pub fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
