//! Admin Gate and admin console.
//!
//! Privilege is an exact email match against a configured allow-list, kept
//! separate from the role-based Route Guard. The backend enforces the same
//! list; a 403 from it overrides a local "permitted".

use aumryx_shared::Identity;
use tracing::{debug, warn};

use crate::auth::AuthState;
use crate::error::ApiError;
use crate::feedback::Notices;
use crate::request::HttpClient;
use crate::route::LoginNotice;
use crate::services::Services;

// =========================================================
// Gate
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: Vec<String>,
}

impl AdminAllowList {
    /// Entries are trimmed and blanks dropped.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e == email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminDecision {
    Loading,
    RedirectToLogin(LoginNotice),
    /// Persistent view state, shown with the signed-in email.
    AccessDenied { email: String },
    Permitted,
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    allow_list: AdminAllowList,
}

impl AdminGate {
    pub fn new(allow_list: AdminAllowList) -> Self {
        Self { allow_list }
    }

    pub fn evaluate(&self, state: &AuthState) -> AdminDecision {
        match state {
            AuthState::Initializing => AdminDecision::Loading,
            AuthState::Unauthenticated => AdminDecision::RedirectToLogin(LoginNotice::AdminRequired),
            AuthState::Authenticated(identity) if self.allow_list.contains(&identity.email) => {
                AdminDecision::Permitted
            }
            AuthState::Authenticated(identity) => {
                warn!(email = %identity.email, "admin view denied");
                AdminDecision::AccessDenied {
                    email: identity.email.clone(),
                }
            }
        }
    }
}

// =========================================================
// Console
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Pending,
    All,
}

const LOAD_FAILED: &str = "Failed to load teachers. Please try again.";

/// Teacher verification workflow behind the Admin Gate.
///
/// Every operation evaluates the gate first and makes no request unless it
/// says `Permitted`. Lists are re-fetched after each mutation.
pub struct AdminConsole<'a, C: HttpClient> {
    services: &'a Services<C>,
    gate: &'a AdminGate,
    tab: AdminTab,
    pending: Vec<Identity>,
    all: Vec<Identity>,
    /// Email the backend refused with a 403.
    denied_for: Option<String>,
    notices: Notices,
}

impl<'a, C: HttpClient> AdminConsole<'a, C> {
    pub fn new(services: &'a Services<C>, gate: &'a AdminGate) -> Self {
        Self {
            services,
            gate,
            tab: AdminTab::default(),
            pending: Vec::new(),
            all: Vec::new(),
            denied_for: None,
            notices: Notices::default(),
        }
    }

    pub fn tab(&self) -> AdminTab {
        self.tab
    }

    /// Teachers shown on the active tab.
    pub fn teachers(&self) -> &[Identity] {
        match self.tab {
            AdminTab::Pending => &self.pending,
            AdminTab::All => &self.all,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn total_count(&self) -> usize {
        self.all.len()
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Gate decision combined with any 403 latched for this identity.
    pub fn decision(&mut self, state: &AuthState) -> AdminDecision {
        let email = state.identity().map(|i| i.email.as_str());
        if self.denied_for.is_some() && self.denied_for.as_deref() != email {
            self.denied_for = None;
        }

        let decision = self.gate.evaluate(state);
        if let (AdminDecision::Permitted, Some(denied)) = (&decision, &self.denied_for) {
            return AdminDecision::AccessDenied {
                email: denied.clone(),
            };
        }
        decision
    }

    /// Initial load: both lists, so the tab counts are filled in.
    pub async fn open(&mut self, state: &AuthState) -> AdminDecision {
        let decision = self.decision(state);
        if decision != AdminDecision::Permitted {
            return decision;
        }
        let admin = self.services.admin();
        match futures::try_join!(admin.list_pending(), admin.list_all()) {
            Ok((pending, all)) => {
                self.pending = pending;
                self.all = all;
            }
            Err(err) => self.fail(state, err, LOAD_FAILED),
        }
        self.decision(state)
    }

    /// Switch tabs and re-fetch that tab's list.
    pub async fn select_tab(&mut self, state: &AuthState, tab: AdminTab) -> AdminDecision {
        self.tab = tab;
        self.reload(state).await
    }

    pub async fn reload(&mut self, state: &AuthState) -> AdminDecision {
        let decision = self.decision(state);
        if decision != AdminDecision::Permitted {
            return decision;
        }
        let admin = self.services.admin();
        let result = match self.tab {
            AdminTab::Pending => admin.list_pending().await,
            AdminTab::All => admin.list_all().await,
        };
        match result {
            Ok(teachers) => match self.tab {
                AdminTab::Pending => self.pending = teachers,
                AdminTab::All => self.all = teachers,
            },
            Err(err) => self.fail(state, err, LOAD_FAILED),
        }
        self.decision(state)
    }

    pub async fn verify(&mut self, state: &AuthState, teacher_id: &str) -> AdminDecision {
        let decision = self.decision(state);
        if decision != AdminDecision::Permitted {
            return decision;
        }
        match self.services.admin().verify(teacher_id).await {
            Ok(_) => {
                self.notices.push_success("Teacher verified successfully!");
                self.reload(state).await
            }
            Err(err) => {
                self.fail(state, err, "Failed to verify teacher.");
                self.decision(state)
            }
        }
    }

    pub async fn unverify(&mut self, state: &AuthState, teacher_id: &str) -> AdminDecision {
        let decision = self.decision(state);
        if decision != AdminDecision::Permitted {
            return decision;
        }
        match self.services.admin().unverify(teacher_id).await {
            Ok(_) => {
                self.notices.push_success("Teacher unverified successfully!");
                self.reload(state).await
            }
            Err(err) => {
                self.fail(state, err, "Failed to unverify teacher.");
                self.decision(state)
            }
        }
    }

    fn fail(&mut self, state: &AuthState, err: ApiError, text: &str) {
        if err.is_forbidden() {
            let email = state.identity().map(|i| i.email.clone()).unwrap_or_default();
            warn!(%email, error = %err, "backend refused admin access");
            self.denied_for = Some(email);
        } else {
            debug!(error = %err, "admin call failed");
            self.notices.push_error(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ApiGateway;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::session::SessionStore;
    use crate::storage::MemoryStorage;
    use aumryx_shared::Role;
    use reqwest::Url;
    use serde_json::json;
    use std::rc::Rc;

    const API: &str = "http://api.test/api";
    const FOUNDER: &str = "founder@aumryxteach.com";

    fn services() -> Services<MockHttpClient> {
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        Services::new(ApiGateway::new(MockHttpClient::new(), Url::parse(API).unwrap(), session))
    }

    fn gate() -> AdminGate {
        AdminGate::new(AdminAllowList::new([format!(" {FOUNDER} ")]))
    }

    fn signed_in(email: &str, role: Role) -> AuthState {
        AuthState::Authenticated(Identity::new("u1", email, role))
    }

    fn teacher(id: &str, verified: bool) -> serde_json::Value {
        json!({"id": id, "role": "teacher", "verified": verified, "email": format!("{id}@example.com")})
    }

    #[test]
    fn gate_decisions() {
        let gate = gate();
        assert_eq!(gate.evaluate(&AuthState::Initializing), AdminDecision::Loading);
        assert_eq!(
            gate.evaluate(&AuthState::Unauthenticated),
            AdminDecision::RedirectToLogin(LoginNotice::AdminRequired)
        );
        assert_eq!(gate.evaluate(&signed_in(FOUNDER, Role::Teacher)), AdminDecision::Permitted);
        assert_eq!(
            gate.evaluate(&signed_in("student@example.com", Role::Student)),
            AdminDecision::AccessDenied {
                email: "student@example.com".into()
            }
        );
    }

    #[test]
    fn match_is_exact() {
        let gate = gate();
        for near_miss in ["Founder@aumryxteach.com", "founder@aumryxteach.com ", "founder@aumryxteach.co"] {
            assert!(matches!(
                gate.evaluate(&signed_in(near_miss, Role::Teacher)),
                AdminDecision::AccessDenied { .. }
            ));
        }
    }

    #[tokio::test]
    async fn denied_identity_never_reaches_admin_endpoints() {
        let services = services();
        let gate = gate();
        let mut console = AdminConsole::new(&services, &gate);
        let state = signed_in("student@example.com", Role::Student);

        assert!(matches!(console.open(&state).await, AdminDecision::AccessDenied { .. }));
        assert!(matches!(console.verify(&state, "t1").await, AdminDecision::AccessDenied { .. }));
        assert_eq!(services.gateway().client().request_count(), 0);
    }

    #[tokio::test]
    async fn open_loads_both_lists() {
        let services = services();
        let mock = services.gateway().client();
        mock.mock_response(HttpMethod::Get, &format!("{API}/admin/teachers/pending"), 200, json!([teacher("t1", false)]));
        mock.mock_response(
            HttpMethod::Get,
            &format!("{API}/admin/teachers/all"),
            200,
            json!([teacher("t1", false), teacher("t2", true)]),
        );
        let gate = gate();
        let mut console = AdminConsole::new(&services, &gate);
        let state = signed_in(FOUNDER, Role::Teacher);

        assert_eq!(console.open(&state).await, AdminDecision::Permitted);
        assert_eq!(console.pending_count(), 1);
        assert_eq!(console.total_count(), 2);
        assert_eq!(console.teachers()[0].id, "t1");

        console.select_tab(&state, AdminTab::All).await;
        assert_eq!(console.teachers().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn verify_refetches_and_confirms() {
        let services = services();
        let mock = services.gateway().client();
        mock.mock_response(
            HttpMethod::Patch,
            &format!("{API}/admin/teachers/t1/verify"),
            200,
            json!({"message": "Teacher verified successfully", "teacher_id": "t1"}),
        );
        mock.mock_response(HttpMethod::Get, &format!("{API}/admin/teachers/pending"), 200, json!([]));
        let gate = gate();
        let mut console = AdminConsole::new(&services, &gate);
        let state = signed_in(FOUNDER, Role::Teacher);

        assert_eq!(console.verify(&state, "t1").await, AdminDecision::Permitted);
        assert_eq!(
            mock.urls(),
            vec![
                format!("{API}/admin/teachers/t1/verify"),
                format!("{API}/admin/teachers/pending"),
            ]
        );
        let notices = console.notices().active();
        assert_eq!(notices[0].text, "Teacher verified successfully!");
    }

    #[tokio::test]
    async fn backend_403_latches_access_denied_until_identity_changes() {
        let services = services();
        let mock = services.gateway().client();
        mock.mock_response(
            HttpMethod::Patch,
            &format!("{API}/admin/teachers/t1/verify"),
            403,
            json!({"detail": "Admin access required"}),
        );
        let gate = gate();
        let mut console = AdminConsole::new(&services, &gate);
        let founder = signed_in(FOUNDER, Role::Teacher);

        assert_eq!(
            console.verify(&founder, "t1").await,
            AdminDecision::AccessDenied { email: FOUNDER.into() }
        );
        // Latched: no further admin calls for this identity.
        let sent = mock.request_count();
        assert!(matches!(console.reload(&founder).await, AdminDecision::AccessDenied { .. }));
        assert_eq!(mock.request_count(), sent);
        assert!(console.notices().active().is_empty());

        assert_eq!(
            console.decision(&AuthState::Unauthenticated),
            AdminDecision::RedirectToLogin(LoginNotice::AdminRequired)
        );
        assert_eq!(console.decision(&founder), AdminDecision::Permitted);
    }

    #[tokio::test]
    async fn other_failures_become_notices() {
        let services = services();
        services
            .gateway()
            .client()
            .mock_unreachable(&format!("{API}/admin/teachers/pending"));
        let gate = gate();
        let mut console = AdminConsole::new(&services, &gate);
        let state = signed_in(FOUNDER, Role::Teacher);

        assert_eq!(console.reload(&state).await, AdminDecision::Permitted);
        assert_eq!(console.notices().active()[0].text, LOAD_FAILED);
    }
}
