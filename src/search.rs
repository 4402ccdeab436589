//! Debounced teacher search with stale-response discard.
//!
//! Each keystroke takes a ticket from a [`RequestSequencer`]. A search only
//! dispatches if its ticket is still the newest after the debounce window,
//! and its result is only shown if no newer search was issued meanwhile.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use aumryx_shared::Identity;
use aumryx_shared::protocol::TeacherFilter;
use tracing::debug;

use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic ticket source; issuing a ticket supersedes every earlier one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Cell<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest.get()
    }
}

/// Keeps the result of the newest ticket only.
#[derive(Debug)]
pub struct LatestResults<T> {
    sequencer: RequestSequencer,
    current: RefCell<Option<T>>,
}

impl<T> Default for LatestResults<T> {
    fn default() -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            current: RefCell::new(None),
        }
    }
}

impl<T> LatestResults<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        self.sequencer.issue()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.sequencer.is_current(ticket)
    }

    /// Store `value` if `ticket` is still the newest. Returns whether it was kept.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        if !self.sequencer.is_current(ticket) {
            return false;
        }
        *self.current.borrow_mut() = Some(value);
        true
    }

    pub fn with_current<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.current.borrow().as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Result is now on screen.
    Applied,
    /// A newer term arrived during the debounce window; nothing was sent.
    Superseded,
    /// Sent, but a newer search was issued before the response arrived.
    Stale,
}

pub struct TeacherSearch<'a, C: HttpClient> {
    services: &'a Services<C>,
    debounce: Duration,
    base: TeacherFilter,
    results: LatestResults<ApiResult<Vec<Identity>>>,
}

impl<'a, C: HttpClient> TeacherSearch<'a, C> {
    pub fn new(services: &'a Services<C>, debounce: Duration) -> Self {
        Self::with_filter(services, debounce, TeacherFilter::default())
    }

    /// Searches combine the term with `base` (subject, verified_only).
    pub fn with_filter(services: &'a Services<C>, debounce: Duration, base: TeacherFilter) -> Self {
        Self {
            services,
            debounce,
            base,
            results: LatestResults::new(),
        }
    }

    /// Takes `&self` so overlapping searches can be in flight at once.
    pub async fn search(&self, term: &str) -> SearchOutcome {
        let ticket = self.results.issue();
        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.results.is_current(ticket) {
            debug!(term, "search superseded before dispatch");
            return SearchOutcome::Superseded;
        }

        let term = term.trim();
        let filter = TeacherFilter {
            search: (!term.is_empty()).then(|| term.to_string()),
            ..self.base.clone()
        };
        let result = self.services.teachers().list(&filter).await;

        if self.results.apply(ticket, result) {
            SearchOutcome::Applied
        } else {
            debug!(term, "discarding stale search response");
            SearchOutcome::Stale
        }
    }

    /// Teachers from the newest applied search; empty before the first one
    /// or after a failed one.
    pub fn teachers(&self) -> Vec<Identity> {
        self.results
            .with_current(|r| r.and_then(|r| r.as_ref().ok()).cloned().unwrap_or_default())
    }

    pub fn error_message(&self) -> Option<String> {
        self.results
            .with_current(|r| r.and_then(|r| r.as_ref().err()).map(|e| e.user_message()))
    }

    /// Whether the newest search failed in a way a retry may fix.
    pub fn can_retry(&self) -> bool {
        self.results
            .with_current(|r| r.and_then(|r| r.as_ref().err()).is_some_and(|e| e.kind().is_retryable()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ApiGateway;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use reqwest::Url;
    use serde_json::json;
    use std::rc::Rc;

    const API: &str = "http://api.test/api";

    fn services() -> Services<MockHttpClient> {
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        Services::new(ApiGateway::new(MockHttpClient::new(), Url::parse(API).unwrap(), session))
    }

    fn teacher(id: &str, subject: &str) -> serde_json::Value {
        json!({"id": id, "role": "teacher", "verified": true, "subjects": [subject]})
    }

    #[test]
    fn latest_results_rejects_old_tickets() {
        let results = LatestResults::new();
        let first = results.issue();
        let second = results.issue();

        assert!(results.apply(second, "physics"));
        assert!(!results.apply(first, "math"));
        assert_eq!(results.with_current(|v| v.copied()), Some("physics"));
    }

    #[tokio::test(start_paused = true)]
    async fn late_math_response_never_overwrites_physics() {
        let services = services();
        let mock = services.gateway().client();
        let math = format!("{API}/teachers?search=Math");
        let physics = format!("{API}/teachers?search=Physics");
        mock.mock_response(HttpMethod::Get, &math, 200, json!([teacher("t1", "Mathematics")]));
        mock.mock_response(HttpMethod::Get, &physics, 200, json!([teacher("t2", "Physics")]));
        mock.mock_delay(&math, Duration::from_millis(1000));
        mock.mock_delay(&physics, Duration::from_millis(100));

        let search = TeacherSearch::new(&services, Duration::ZERO);
        let later_physics = async {
            tokio::time::sleep(Duration::from_millis(600)).await;
            search.search("Physics").await
        };
        let (math_outcome, physics_outcome) = tokio::join!(search.search("Math"), later_physics);

        assert_eq!(math_outcome, SearchOutcome::Stale);
        assert_eq!(physics_outcome, SearchOutcome::Applied);
        assert_eq!(mock.request_count(), 2);
        let shown = search.teachers();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "t2");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_dispatches_once() {
        let services = services();
        let mock = services.gateway().client();
        let url = format!("{API}/teachers?search=Phys");
        mock.mock_response(HttpMethod::Get, &url, 200, json!([teacher("t2", "Physics")]));

        let search = TeacherSearch::new(&services, Duration::from_millis(500));
        // One keystroke every 100ms, all inside the 500ms window.
        let keystrokes = ["P", "Ph", "Phy", "Phys"].into_iter().enumerate().map(|(i, term)| {
            let search = &search;
            async move {
                tokio::time::sleep(Duration::from_millis(100 * i as u64)).await;
                search.search(term).await
            }
        });
        let outcomes = futures::future::join_all(keystrokes).await;

        assert_eq!(
            outcomes,
            vec![
                SearchOutcome::Superseded,
                SearchOutcome::Superseded,
                SearchOutcome::Superseded,
                SearchOutcome::Applied
            ]
        );
        assert_eq!(mock.urls(), vec![url]);
    }

    #[tokio::test]
    async fn failure_is_shown_as_message() {
        let services = services();
        services
            .gateway()
            .client()
            .mock_unreachable(&format!("{API}/teachers?verified_only=true&search=Math"));

        let filter = TeacherFilter {
            verified_only: Some(true),
            ..TeacherFilter::default()
        };
        let search = TeacherSearch::with_filter(&services, Duration::ZERO, filter);
        assert_eq!(search.search(" Math ").await, SearchOutcome::Applied);
        assert!(search.teachers().is_empty());
        assert_eq!(
            search.error_message().as_deref(),
            Some("Could not reach the server. Check your connection and try again.")
        );
    }

    #[tokio::test]
    async fn only_transport_and_server_failures_offer_retry() {
        let services = services();
        let mock = services.gateway().client();
        mock.mock_response(HttpMethod::Get, &format!("{API}/teachers?search=Math"), 503, json!({"detail": "down"}));
        mock.mock_response(HttpMethod::Get, &format!("{API}/teachers?search=Art"), 400, json!({"detail": "bad"}));
        mock.mock_response(HttpMethod::Get, &format!("{API}/teachers?search=Bio"), 200, json!([]));

        let search = TeacherSearch::new(&services, Duration::ZERO);
        search.search("Math").await;
        assert!(search.can_retry());
        search.search("Art").await;
        assert!(!search.can_retry());
        search.search("Bio").await;
        assert!(!search.can_retry());
        assert!(search.error_message().is_none());
    }

    #[test]
    fn default_results_are_empty() {
        let results: LatestResults<u32> = LatestResults::default();
        assert_eq!(results.with_current(|v| v.copied()), None);
        let ticket = results.issue();
        assert!(results.apply(ticket, 7));
    }
}
