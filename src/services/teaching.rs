//! Teacher tools: attendance, notes, assignments and the community feed.

use aumryx_shared::protocol::{
    AssignmentCreate, AssignmentUpdate, AttendanceCreate, FeedQuery, NoteCreate, NoteUpdate,
    PostCreate, PostUpdate,
};
use aumryx_shared::{Assignment, AttendanceRecord, CommunityPost, Note};

use crate::error::{ApiError, ApiResult, ResultExt};
use crate::request::HttpClient;
use crate::validation::Validate;

// =========================================================
// Attendance
// =========================================================

call_group!(
    /// Attendance records are append-only on the backend.
    AttendanceService
);

impl<C: HttpClient> AttendanceService<'_, C> {
    pub async fn create(&self, record: &AttendanceCreate) -> ApiResult<AttendanceRecord> {
        self.gateway
            .post(&["attendance"], record)
            .await
            .in_op_with("attendance.create", &record.class_id)
    }

    pub async fn list_by_class(&self, class_id: &str) -> ApiResult<Vec<AttendanceRecord>> {
        self.gateway
            .get(&["attendance", "class", class_id], &())
            .await
            .in_op_with("attendance.list_by_class", class_id)
    }

    pub async fn list_by_student(&self, student_id: &str) -> ApiResult<Vec<AttendanceRecord>> {
        self.gateway
            .get(&["attendance", "student", student_id], &())
            .await
            .in_op_with("attendance.list_by_student", student_id)
    }
}

// =========================================================
// Notes
// =========================================================

call_group!(NoteService);

impl<C: HttpClient> NoteService<'_, C> {
    pub async fn create(&self, note: &NoteCreate) -> ApiResult<Note> {
        note.validate().map_err(ApiError::from).in_op("notes.create")?;
        self.gateway.post(&["notes"], note).await.in_op("notes.create")
    }

    pub async fn list_by_teacher(&self, teacher_id: &str) -> ApiResult<Vec<Note>> {
        self.gateway
            .get(&["notes", "teacher", teacher_id], &())
            .await
            .in_op_with("notes.list_by_teacher", teacher_id)
    }

    pub async fn list_by_class(&self, class_id: &str) -> ApiResult<Vec<Note>> {
        self.gateway
            .get(&["notes", "class", class_id], &())
            .await
            .in_op_with("notes.list_by_class", class_id)
    }

    pub async fn update(&self, id: &str, patch: &NoteUpdate) -> ApiResult<Note> {
        self.gateway
            .put(&["notes", id], patch)
            .await
            .in_op_with("notes.update", id)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.gateway
            .delete(&["notes", id])
            .await
            .in_op_with("notes.delete", id)
    }
}

// =========================================================
// Assignments
// =========================================================

call_group!(AssignmentService);

impl<C: HttpClient> AssignmentService<'_, C> {
    pub async fn create(&self, assignment: &AssignmentCreate) -> ApiResult<Assignment> {
        assignment
            .validate()
            .map_err(ApiError::from)
            .in_op("assignments.create")?;
        self.gateway
            .post(&["assignments"], assignment)
            .await
            .in_op("assignments.create")
    }

    pub async fn list_by_class(&self, class_id: &str) -> ApiResult<Vec<Assignment>> {
        self.gateway
            .get(&["assignments", "class", class_id], &())
            .await
            .in_op_with("assignments.list_by_class", class_id)
    }

    pub async fn list_by_teacher(&self, teacher_id: &str) -> ApiResult<Vec<Assignment>> {
        self.gateway
            .get(&["assignments", "teacher", teacher_id], &())
            .await
            .in_op_with("assignments.list_by_teacher", teacher_id)
    }

    pub async fn update(&self, id: &str, patch: &AssignmentUpdate) -> ApiResult<Assignment> {
        self.gateway
            .put(&["assignments", id], patch)
            .await
            .in_op_with("assignments.update", id)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.gateway
            .delete(&["assignments", id])
            .await
            .in_op_with("assignments.delete", id)
    }
}

// =========================================================
// Community
// =========================================================

call_group!(CommunityService);

impl<C: HttpClient> CommunityService<'_, C> {
    pub async fn create(&self, post: &PostCreate) -> ApiResult<CommunityPost> {
        post.validate().map_err(ApiError::from).in_op("community.create")?;
        self.gateway
            .post(&["community", "posts"], post)
            .await
            .in_op("community.create")
    }

    pub async fn list_by_teacher(&self, teacher_id: &str) -> ApiResult<Vec<CommunityPost>> {
        self.gateway
            .get(&["community", "posts", "teacher", teacher_id], &())
            .await
            .in_op_with("community.list_by_teacher", teacher_id)
    }

    pub async fn list_by_class(&self, class_id: &str) -> ApiResult<Vec<CommunityPost>> {
        self.gateway
            .get(&["community", "posts", "class", class_id], &())
            .await
            .in_op_with("community.list_by_class", class_id)
    }

    /// Newest posts across the platform.
    pub async fn feed(&self, query: FeedQuery) -> ApiResult<Vec<CommunityPost>> {
        self.gateway
            .get(&["community", "posts"], &query)
            .await
            .in_op("community.feed")
    }

    pub async fn update(&self, id: &str, patch: &PostUpdate) -> ApiResult<CommunityPost> {
        self.gateway
            .put(&["community", "posts", id], patch)
            .await
            .in_op_with("community.update", id)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.gateway
            .delete(&["community", "posts", id])
            .await
            .in_op_with("community.delete", id)
    }
}
