use aumryx_shared::Identity;
use aumryx_shared::protocol::{AdminLoginRequest, AdminToken, VerificationResult};

use crate::error::{ApiError, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::validation::Validate;

call_group!(
    /// `/admin`. Callers are expected to consult the Admin Gate first.
    AdminService
);

impl<C: HttpClient> AdminService<'_, C> {
    pub async fn list_pending(&self) -> ApiResult<Vec<Identity>> {
        self.gateway
            .get(&["admin", "teachers", "pending"], &())
            .await
            .in_op("admin.list_pending")
    }

    pub async fn list_all(&self) -> ApiResult<Vec<Identity>> {
        self.gateway
            .get(&["admin", "teachers", "all"], &())
            .await
            .in_op("admin.list_all")
    }

    pub async fn verify(&self, teacher_id: &str) -> ApiResult<VerificationResult> {
        self.gateway
            .patch(&["admin", "teachers", teacher_id, "verify"])
            .await
            .in_op_with("admin.verify", teacher_id)
    }

    pub async fn unverify(&self, teacher_id: &str) -> ApiResult<VerificationResult> {
        self.gateway
            .patch(&["admin", "teachers", teacher_id, "unverify"])
            .await
            .in_op_with("admin.unverify", teacher_id)
    }

    /// Exchange founder credentials for a privileged token.
    ///
    /// The token goes back to the caller and is never written to the session.
    pub async fn login(&self, credentials: &AdminLoginRequest) -> ApiResult<AdminToken> {
        credentials
            .validate()
            .map_err(ApiError::from)
            .in_op("admin.login")?;
        self.gateway
            .post(&["admin", "auth", "login"], credentials)
            .await
            .in_op("admin.login")
    }
}
