use aumryx_shared::protocol::{ClassCreate, ClassFilter, ClassUpdate, EnrollmentCreate};
use aumryx_shared::{Class, Enrollment};

use crate::error::{ApiError, ApiResult, ResultExt, ValidationError};
use crate::request::HttpClient;
use crate::validation::Validate;

call_group!(ClassService);

impl<C: HttpClient> ClassService<'_, C> {
    pub async fn list(&self, filter: &ClassFilter) -> ApiResult<Vec<Class>> {
        self.gateway
            .get(&["classes"], filter)
            .await
            .in_op("classes.list")
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Class> {
        self.gateway
            .get(&["classes", id], &())
            .await
            .in_op_with("classes.get", id)
    }

    pub async fn create(&self, data: &ClassCreate) -> ApiResult<Class> {
        data.validate().map_err(ApiError::from).in_op("classes.create")?;
        self.gateway
            .post(&["classes"], data)
            .await
            .in_op("classes.create")
    }

    pub async fn update(&self, id: &str, data: &ClassUpdate) -> ApiResult<Class> {
        if data.max_students == Some(0) {
            let err = ValidationError::invalid("max_students", "must be at least 1");
            return Err(ApiError::from(err).in_op_with("classes.update", id));
        }
        self.gateway
            .put(&["classes", id], data)
            .await
            .in_op_with("classes.update", id)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.gateway
            .delete(&["classes", id])
            .await
            .in_op_with("classes.delete", id)
    }
}

call_group!(EnrollmentService);

impl<C: HttpClient> EnrollmentService<'_, C> {
    /// Rejections such as a full class or a duplicate enrollment come back
    /// as `BadRequest` with the backend's message.
    pub async fn create(&self, class_id: &str) -> ApiResult<Enrollment> {
        let body = EnrollmentCreate {
            class_id: class_id.to_string(),
        };
        self.gateway
            .post(&["enrollments"], &body)
            .await
            .in_op_with("enrollments.create", class_id)
    }

    pub async fn list_by_student(&self, student_id: &str) -> ApiResult<Vec<Enrollment>> {
        self.gateway
            .get(&["enrollments", "student", student_id], &())
            .await
            .in_op_with("enrollments.list_by_student", student_id)
    }

    pub async fn list_by_teacher(&self, teacher_id: &str) -> ApiResult<Vec<Enrollment>> {
        self.gateway
            .get(&["enrollments", "teacher", teacher_id], &())
            .await
            .in_op_with("enrollments.list_by_teacher", teacher_id)
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Enrollment> {
        self.gateway
            .get(&["enrollments", id], &())
            .await
            .in_op_with("enrollments.get", id)
    }
}
