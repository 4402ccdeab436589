use aumryx_shared::Identity;
use aumryx_shared::protocol::{HourlyRateQuery, ProfilePictureUpdate, ProfileUpdate, TeacherFilter};

use crate::error::{ApiError, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::validation::Validate;

call_group!(TeacherService);

impl<C: HttpClient> TeacherService<'_, C> {
    /// Browse teachers. The backend only lists verified ones unless
    /// `verified_only` is explicitly `false`.
    pub async fn list(&self, filter: &TeacherFilter) -> ApiResult<Vec<Identity>> {
        self.gateway
            .get(&["teachers"], filter)
            .await
            .in_op("teachers.list")
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Identity> {
        self.gateway
            .get(&["teachers", id], &())
            .await
            .in_op_with("teachers.get", id)
    }

    pub async fn update(&self, id: &str, patch: &ProfileUpdate) -> ApiResult<Identity> {
        if let Some(rate) = patch.hourly_rate {
            HourlyRateQuery { hourly_rate: rate }
                .validate()
                .map_err(ApiError::from)
                .in_op_with("teachers.update", id)?;
        }
        self.gateway
            .put(&["teachers", id], patch)
            .await
            .in_op_with("teachers.update", id)
    }
}

call_group!(
    /// `/profile`: changes to the caller's own record.
    ProfileService
);

impl<C: HttpClient> ProfileService<'_, C> {
    pub async fn update_picture(&self, image_url: &str) -> ApiResult<Identity> {
        let body = ProfilePictureUpdate {
            image_url: image_url.to_string(),
        };
        self.gateway
            .put(&["profile", "picture"], &body)
            .await
            .in_op("profile.update_picture")
    }

    pub async fn update_hourly_rate(&self, hourly_rate: f64) -> ApiResult<Identity> {
        let query = HourlyRateQuery { hourly_rate };
        query
            .validate()
            .map_err(ApiError::from)
            .in_op("profile.update_hourly_rate")?;
        self.gateway
            .put_query(&["profile", "teacher", "rate"], &query)
            .await
            .in_op("profile.update_hourly_rate")
    }
}
