use aumryx_shared::protocol::RatingCreate;
use aumryx_shared::{EarningsBreakdown, Rating, StudentAnalytics, TeacherAnalytics};

use crate::error::{ApiError, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::validation::Validate;

call_group!(RatingService);

impl<C: HttpClient> RatingService<'_, C> {
    pub async fn create(&self, rating: &RatingCreate) -> ApiResult<Rating> {
        rating.validate().map_err(ApiError::from).in_op("ratings.create")?;
        self.gateway
            .post(&["ratings"], rating)
            .await
            .in_op_with("ratings.create", &rating.teacher_id)
    }

    pub async fn list_by_teacher(&self, teacher_id: &str) -> ApiResult<Vec<Rating>> {
        self.gateway
            .get(&["ratings", "teacher", teacher_id], &())
            .await
            .in_op_with("ratings.list_by_teacher", teacher_id)
    }
}

call_group!(
    /// Read-only dashboard aggregates computed server-side.
    AnalyticsService
);

impl<C: HttpClient> AnalyticsService<'_, C> {
    pub async fn teacher(&self, teacher_id: &str) -> ApiResult<TeacherAnalytics> {
        self.gateway
            .get(&["analytics", "teacher", teacher_id], &())
            .await
            .in_op_with("analytics.teacher", teacher_id)
    }

    pub async fn student(&self, student_id: &str) -> ApiResult<StudentAnalytics> {
        self.gateway
            .get(&["analytics", "student", student_id], &())
            .await
            .in_op_with("analytics.student", student_id)
    }

    pub async fn earnings(&self, teacher_id: &str) -> ApiResult<EarningsBreakdown> {
        self.gateway
            .get(&["analytics", "earnings", teacher_id], &())
            .await
            .in_op_with("analytics.earnings", teacher_id)
    }
}
