//! Auth/Session Controller
//!
//! Bridges the Session Store and the views. Views and guards read the
//! current [`AuthState`] or subscribe to changes; only this controller and the
//! `auth` call group ever write the session.

use aumryx_shared::protocol::{LoginRequest, SignupRequest};
use aumryx_shared::{Identity, Role};
use tokio::sync::watch;
use tracing::info;

use crate::error::{ApiError, ApiErrorKind, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::services::Services;
use crate::session::{Credential, Session, SessionStore};

/// `Initializing` until the stored session has been read once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Initializing,
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Initializing)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|i| i.role)
    }

    pub fn is_teacher(&self) -> bool {
        self.role() == Some(Role::Teacher)
    }

    pub fn is_student(&self) -> bool {
        self.role() == Some(Role::Student)
    }

    fn label(&self) -> &'static str {
        match self {
            AuthState::Initializing => "initializing",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}

pub struct AuthController {
    session: SessionStore,
    state: watch::Sender<AuthState>,
}

impl AuthController {
    pub fn new(session: SessionStore) -> Self {
        let (state, _) = watch::channel(AuthState::Initializing);
        Self { session, state }
    }

    /// Restore the stored session. Corrupt state has already been repaired
    /// by the store and simply reads as logged out.
    pub fn init(&self) {
        let next = match self.session.load() {
            Session::Active { identity, .. } => AuthState::Authenticated(identity),
            Session::Empty => AuthState::Unauthenticated,
        };
        self.transition(next);
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_teacher(&self) -> bool {
        self.state.borrow().is_teacher()
    }

    pub fn is_student(&self) -> bool {
        self.state.borrow().is_student()
    }

    fn transition(&self, next: AuthState) {
        let prev = self.state.send_replace(next);
        let current = self.state.borrow();
        info!(from = prev.label(), to = current.label(), role = ?current.role(), "auth state changed");
    }

    /// Adopt an identity and credential obtained elsewhere.
    pub fn login(&self, mut identity: Identity, credential: Credential) -> ApiResult<()> {
        identity.normalize();
        self.session.save(&identity, &credential)?;
        self.transition(AuthState::Authenticated(identity));
        Ok(())
    }

    /// Log in through the façade. The façade performs the single session
    /// write; on failure the state is left untouched.
    pub async fn sign_in<C: HttpClient>(
        &self,
        services: &Services<C>,
        credentials: &LoginRequest,
    ) -> ApiResult<Identity> {
        let resp = services.auth().login(credentials).await?;
        self.transition(AuthState::Authenticated(resp.user.clone()));
        Ok(resp.user)
    }

    pub async fn sign_up<C: HttpClient>(
        &self,
        services: &Services<C>,
        profile: &SignupRequest,
    ) -> ApiResult<Identity> {
        let resp = services.auth().signup(profile).await?;
        self.transition(AuthState::Authenticated(resp.user.clone()));
        Ok(resp.user)
    }

    /// Always ends `Unauthenticated`, even if clearing storage failed.
    pub fn logout<C: HttpClient>(&self, services: &Services<C>) -> ApiResult<()> {
        let cleared = services.auth().logout();
        if !matches!(*self.state.borrow(), AuthState::Unauthenticated) {
            self.transition(AuthState::Unauthenticated);
        }
        cleared
    }

    /// Re-read the identity from the backend and store it with the same
    /// credential. The backend must return the same user id.
    pub async fn refresh<C: HttpClient>(&self, services: &Services<C>) -> ApiResult<Identity> {
        let Session::Active {
            identity: stored,
            credential,
        } = self.session.load()
        else {
            return Err(ApiError::new(ApiErrorKind::Unauthorized, "no active session").in_op("auth.refresh"));
        };

        let fresh = services.auth().me().await.in_op("auth.refresh")?;
        if fresh.id != stored.id {
            return Err(ApiError::decode(format!(
                "backend returned identity {} for session of {}",
                fresh.id, stored.id
            ))
            .in_op("auth.refresh"));
        }

        if fresh != stored {
            self.session.save(&fresh, &credential)?;
        }
        self.transition(AuthState::Authenticated(fresh.clone()));
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ApiGateway;
    use crate::request::{HttpMethod, MockHttpClient};
    use crate::storage::{CountingStorage, KeyValueStorage};
    use reqwest::Url;
    use serde_json::json;
    use std::rc::Rc;

    const API: &str = "http://api.test/api";

    struct Fixture {
        storage: Rc<CountingStorage>,
        services: Services<MockHttpClient>,
        auth: AuthController,
    }

    fn fixture() -> Fixture {
        let storage = Rc::new(CountingStorage::default());
        let session = SessionStore::new(storage.clone());
        let gateway = ApiGateway::new(MockHttpClient::new(), Url::parse(API).unwrap(), session.clone());
        Fixture {
            storage,
            services: Services::new(gateway),
            auth: AuthController::new(session),
        }
    }

    fn mock_login(f: &Fixture, status: u16, body: serde_json::Value) {
        f.services
            .gateway()
            .client()
            .mock_response(HttpMethod::Post, &format!("{API}/auth/login"), status, body);
    }

    fn teacher_login() -> LoginRequest {
        LoginRequest {
            email: "t@example.com".into(),
            password: "x".into(),
            user_type: Role::Teacher,
        }
    }

    #[test]
    fn starts_initializing_until_init() {
        let f = fixture();
        assert!(f.auth.is_loading());
        assert!(!f.auth.is_authenticated());

        f.auth.init();
        assert_eq!(f.auth.state(), AuthState::Unauthenticated);
        assert!(!f.auth.is_loading());
    }

    #[test]
    fn init_restores_stored_identity() {
        let f = fixture();
        f.services
            .session()
            .save(&Identity::new("s1", "s@example.com", Role::Student), &Credential::new("tok"))
            .unwrap();

        f.auth.init();
        assert!(f.auth.is_authenticated());
        assert!(f.auth.is_student());
        assert!(!f.auth.is_teacher());
    }

    #[tokio::test]
    async fn sign_in_writes_once_and_sets_role_flags() {
        let f = fixture();
        f.auth.init();
        mock_login(
            &f,
            200,
            json!({"access_token": "tok1", "user": {"id": "t1", "role": "teacher", "verified": false}}),
        );

        let identity = f.auth.sign_in(&f.services, &teacher_login()).await.unwrap();
        assert_eq!(identity.id, "t1");
        assert_eq!(f.storage.writes.get(), 1);
        assert!(f.auth.is_authenticated());
        assert!(f.auth.is_teacher());
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_state_alone() {
        let f = fixture();
        f.auth.init();
        mock_login(&f, 401, json!({"detail": "Incorrect email or password"}));

        let err = f.auth.sign_in(&f.services, &teacher_login()).await.unwrap_err();
        assert_eq!(err.user_message(), "You are not authorized to perform this action (HTTP 401).");
        assert_eq!(f.auth.state(), AuthState::Unauthenticated);
        assert_eq!(f.storage.writes.get(), 0);
    }

    #[test]
    fn logout_twice_is_harmless() {
        let f = fixture();
        f.auth
            .login(Identity::new("t1", "t@example.com", Role::Teacher), Credential::new("tok"))
            .unwrap();
        let mut rx = f.auth.subscribe();

        f.auth.logout(&f.services).unwrap();
        f.auth.logout(&f.services).unwrap();

        assert_eq!(f.auth.state(), AuthState::Unauthenticated);
        assert!(f.storage.inner.is_empty());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn refresh_rewrites_identity_with_same_credential() {
        let f = fixture();
        f.auth
            .login(Identity::new("t1", "t@example.com", Role::Teacher), Credential::new("tok1"))
            .unwrap();
        f.services.gateway().client().mock_response(
            HttpMethod::Get,
            &format!("{API}/auth/me"),
            200,
            json!({"id": "t1", "email": "t@example.com", "role": "teacher", "verified": true}),
        );

        let fresh = f.auth.refresh(&f.services).await.unwrap();
        assert!(fresh.is_verified_teacher());
        assert_eq!(f.storage.get(crate::session::STORAGE_TOKEN_KEY).as_deref(), Some("tok1"));
        assert_eq!(f.auth.state().identity().map(|i| i.verified), Some(true));
    }

    #[tokio::test]
    async fn refresh_rejects_a_different_user() {
        let f = fixture();
        f.auth
            .login(Identity::new("t1", "t@example.com", Role::Teacher), Credential::new("tok1"))
            .unwrap();
        f.services.gateway().client().mock_response(
            HttpMethod::Get,
            &format!("{API}/auth/me"),
            200,
            json!({"id": "t2", "role": "teacher"}),
        );

        let err = f.auth.refresh(&f.services).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
        assert_eq!(f.auth.state().identity().map(|i| i.id.as_str()), Some("t1"));
    }
}
