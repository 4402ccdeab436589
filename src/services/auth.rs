use aumryx_shared::Identity;
use aumryx_shared::protocol::{AuthResponse, LoginRequest, SignupRequest};
use tracing::info;

use crate::error::{ApiError, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::session::Credential;
use crate::validation::Validate;

call_group!(
    /// `/auth`: the only group with Session Store side effects.
    AuthService
);

impl<C: HttpClient> AuthService<'_, C> {
    /// Register, then persist the returned session before returning it.
    pub async fn signup(&self, profile: &SignupRequest) -> ApiResult<AuthResponse> {
        profile.validate().map_err(ApiError::from).in_op("auth.signup")?;
        let resp: AuthResponse = self
            .gateway
            .post(&["auth", "signup"], profile)
            .await
            .in_op("auth.signup")?;
        self.persist(resp).in_op("auth.signup")
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<AuthResponse> {
        credentials.validate().map_err(ApiError::from).in_op("auth.login")?;
        let resp: AuthResponse = self
            .gateway
            .post(&["auth", "login"], credentials)
            .await
            .in_op("auth.login")?;
        self.persist(resp).in_op("auth.login")
    }

    fn persist(&self, resp: AuthResponse) -> ApiResult<AuthResponse> {
        let credential = Credential::from(resp.access_token.as_str());
        if credential.is_empty() {
            return Err(ApiError::decode("auth response carried an empty access token"));
        }
        if resp.user.id.is_empty() {
            return Err(ApiError::decode("auth response carried a user without an id"));
        }
        self.gateway.session().save(&resp.user, &credential)?;
        info!(user_id = %resp.user.id, role = %resp.user.role, "session saved");
        Ok(resp)
    }

    /// Local only. Clearing an already-empty session is not an error.
    pub fn logout(&self) -> ApiResult<()> {
        self.gateway.session().clear()?;
        Ok(())
    }

    /// The identity the backend associates with the current credential.
    pub async fn me(&self) -> ApiResult<Identity> {
        self.gateway.get(&["auth", "me"], &()).await.in_op("auth.me")
    }
}
