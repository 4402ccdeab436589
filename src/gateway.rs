//! API Gateway Client
//!
//! Single point of HTTP egress. Every request is built against `<base>/api`,
//! decorated with the current bearer credential when a session exists, and
//! turned into an [`ApiError`] when the call fails for any reason.

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use aumryx_shared::protocol::QueryParams;

use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpMethod, HttpRequest};
use crate::session::SessionStore;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub struct ApiGateway<C: HttpClient> {
    client: C,
    api_root: Url,
    session: SessionStore,
}

impl<C: HttpClient> ApiGateway<C> {
    pub fn new(client: C, api_root: Url, session: SessionStore) -> Self {
        Self {
            client,
            api_root,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve path segments (and optional query) against the API root.
    ///
    /// Segments are percent-encoded individually, so ids never leak into the
    /// path structure.
    pub fn url(&self, segments: &[&str], query: &dyn QueryParams) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        let pairs = query.to_query();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    // --- Verb helpers ---

    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &dyn QueryParams,
    ) -> ApiResult<T> {
        self.dispatch(HttpMethod::Get, self.url(segments, query), None)
            .await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        let body = encode(body)?;
        self.dispatch(HttpMethod::Post, self.url(segments, &()), Some(body))
            .await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        let body = encode(body)?;
        self.dispatch(HttpMethod::Put, self.url(segments, &()), Some(body))
            .await
    }

    /// PUT whose parameters travel in the query string, without a body.
    pub async fn put_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &dyn QueryParams,
    ) -> ApiResult<T> {
        self.dispatch(HttpMethod::Put, self.url(segments, query), None)
            .await
    }

    pub async fn patch<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.dispatch(HttpMethod::Patch, self.url(segments, &()), None)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        self.dispatch(HttpMethod::Delete, self.url(segments, &()), None)
            .await
    }

    /// Send one request and decode the 2xx body.
    ///
    /// No retries, and no session side effects on 401/403.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();
        let mut req = HttpRequest::new(url.as_str(), method)
            .with_header("Accept", "application/json")
            .with_header(REQUEST_ID_HEADER, &request_id);

        if let Some(credential) = self.session.credential() {
            req = req.with_header(
                "Authorization",
                &format!("Bearer {}", credential.expose()),
            );
        }
        if let Some(body) = body {
            req = req.with_body(body);
        }

        debug!(%method, path = url.path(), %request_id, "dispatching request");

        let resp = self.client.send(req).await?;
        if !resp.is_success() {
            warn!(%method, path = url.path(), %request_id, status = resp.status, "request rejected");
            return Err(ApiError::from_response(resp.status, &resp.body));
        }
        resp.json()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::decode(format!("failed to encode request body: {}", e)).with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::request::MockHttpClient;
    use crate::session::Credential;
    use crate::storage::MemoryStorage;
    use aumryx_shared::protocol::TeacherFilter;
    use aumryx_shared::{Identity, Role};
    use std::rc::Rc;

    const ROOT: &str = "http://api.test/api";

    fn gateway() -> ApiGateway<MockHttpClient> {
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        ApiGateway::new(MockHttpClient::new(), Url::parse(ROOT).unwrap(), session)
    }

    #[test]
    fn url_encodes_segments_and_query() {
        let gw = gateway();
        let url = gw.url(&["teachers", "a/b c"], &TeacherFilter::search("Math & Physics"));
        assert_eq!(
            url.as_str(),
            "http://api.test/api/teachers/a%2Fb%20c?search=Math+%26+Physics"
        );
        assert_eq!(gw.url(&["classes"], &()).as_str(), "http://api.test/api/classes");
    }

    #[tokio::test]
    async fn anonymous_request_has_no_authorization_header() {
        let gw = gateway();
        gw.client()
            .mock_response(HttpMethod::Get, "http://api.test/api/teachers", 200, serde_json::json!([]));

        let teachers: Vec<Identity> = gw.get(&["teachers"], &()).await.unwrap();
        assert!(teachers.is_empty());

        let req = gw.client().last_request();
        assert!(req.headers.get("Authorization").is_none());
        assert!(req.headers.contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn bearer_credential_is_attached_when_session_exists() {
        let gw = gateway();
        gw.session()
            .save(&Identity::new("s1", "s@example.com", Role::Student), &Credential::new("tok9"))
            .unwrap();
        gw.client()
            .mock_response(HttpMethod::Get, "http://api.test/api/auth/me", 200, serde_json::json!({"id":"s1","role":"student"}));

        let me: Identity = gw.get(&["auth", "me"], &()).await.unwrap();
        assert_eq!(me.id, "s1");
        assert_eq!(
            gw.client().last_request().headers.get("Authorization").map(String::as_str),
            Some("Bearer tok9")
        );
    }

    #[tokio::test]
    async fn non_success_status_carries_server_message() {
        let gw = gateway();
        gw.client().mock_response(
            HttpMethod::Post,
            "http://api.test/api/enrollments",
            400,
            serde_json::json!({"detail": "Already enrolled in this class"}),
        );

        let err = gw
            .post::<_, serde_json::Value>(&["enrollments"], &serde_json::json!({"class_id": "c1"}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "Already enrolled in this class");
        // One attempt only.
        assert_eq!(gw.client().request_count(), 1);
    }

    #[tokio::test]
    async fn unauthorized_does_not_clear_the_session() {
        let gw = gateway();
        gw.session()
            .save(&Identity::new("t1", "t@example.com", Role::Teacher), &Credential::new("stale"))
            .unwrap();
        gw.client().mock_response(
            HttpMethod::Get,
            "http://api.test/api/auth/me",
            401,
            serde_json::json!({"detail": "Could not validate credentials"}),
        );

        let err = gw.get::<Identity>(&["auth", "me"], &()).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(gw.session().load().is_active());
    }

    #[tokio::test]
    async fn transport_failure_and_empty_body() {
        let gw = gateway();
        gw.client().mock_unreachable("http://api.test/api/classes");
        let err = gw.get::<serde_json::Value>(&["classes"], &()).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Transport);
        assert!(err.status().is_none());

        gw.client().mock_empty(HttpMethod::Delete, "http://api.test/api/notes/n1", 204);
        let () = gw.delete(&["notes", "n1"]).await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_body_is_a_decode_error() {
        let gw = gateway();
        gw.client().mock_response(
            HttpMethod::Get,
            "http://api.test/api/teachers",
            200,
            serde_json::json!({"unexpected": true}),
        );

        let err = gw.get::<Vec<Identity>>(&["teachers"], &()).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Decode);
    }
}
