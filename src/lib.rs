//! Client core for the Aumryx Teach tutoring marketplace.
//!
//! Owns everything between the views and the REST backend: the persisted
//! session, the HTTP gateway and its per-resource call groups, the auth state
//! machine, and the route/admin guards. Views are external and only consume
//! these contracts.
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod gateway;
pub mod guard;
pub mod request;
pub mod route;
pub mod search;
pub mod services;
pub mod session;
pub mod storage;
pub mod validation;

pub use aumryx_shared as shared;

pub use admin::{AdminAllowList, AdminConsole, AdminDecision, AdminGate, AdminTab};
pub use auth::{AuthController, AuthState};
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult, ConfigError, StorageError, ValidationError};
pub use guard::{Navigator, RouteDecision, RouteGuard};
pub use request::{HttpClient, ReqwestHttpClient};
pub use route::{AppRoute, LoginNotice};
pub use search::{SearchOutcome, TeacherSearch};
pub use services::Services;
pub use session::{Credential, Session, SessionStore};

use std::rc::Rc;

use aumryx_shared::Identity;
use aumryx_shared::protocol::{LoginRequest, SignupRequest};
use tracing::info;

use gateway::ApiGateway;
use storage::{FileStorage, KeyValueStorage};

/// Wires the components together around one session and one transport.
///
/// Construction leaves auth in `Initializing`; call [`ClientCore::init`] once
/// the shell is mounted.
pub struct ClientCore<C: HttpClient> {
    config: ClientConfig,
    services: Services<C>,
    auth: AuthController,
    guard: RouteGuard,
}

impl ClientCore<ReqwestHttpClient> {
    /// Production wiring: reqwest transport, session in `config.session_file`.
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let client = ReqwestHttpClient::new(config.request_timeout)?;
        let storage = Rc::new(FileStorage::new(config.session_file.clone()));
        info!(
            backend = %config.backend_url(),
            session_file = %storage.path().display(),
            "client core configured"
        );
        Ok(Self::with_transport(config, client, storage))
    }
}

impl<C: HttpClient> ClientCore<C> {
    pub fn with_transport(config: ClientConfig, client: C, storage: Rc<dyn KeyValueStorage>) -> Self {
        let session = SessionStore::new(storage);
        let gateway = ApiGateway::new(client, config.api_root(), session.clone());
        let admin = AdminGate::new(AdminAllowList::new(&config.admin_emails));
        Self {
            services: Services::new(gateway),
            auth: AuthController::new(session),
            guard: RouteGuard::new(admin),
            config,
        }
    }

    pub fn init(&self) {
        self.auth.init();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn services(&self) -> &Services<C> {
        &self.services
    }

    pub fn auth(&self) -> &AuthController {
        &self.auth
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.guard.clone())
    }

    pub fn admin_console(&self) -> AdminConsole<'_, C> {
        AdminConsole::new(&self.services, self.guard.admin_gate())
    }

    pub fn teacher_search(&self) -> TeacherSearch<'_, C> {
        TeacherSearch::new(&self.services, self.config.search_debounce)
    }

    pub async fn sign_in(&self, credentials: &LoginRequest) -> ApiResult<Identity> {
        self.auth.sign_in(&self.services, credentials).await
    }

    pub async fn sign_up(&self, profile: &SignupRequest) -> ApiResult<Identity> {
        self.auth.sign_up(&self.services, profile).await
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.auth.logout(&self.services)
    }
}
