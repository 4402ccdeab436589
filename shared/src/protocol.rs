use crate::{AssignmentStatus, AttendanceStatus, ClassStatus, Identity, PostType, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Types that contribute URL query parameters to a list request.
///
/// Only set filters are emitted; an all-`None` filter yields no query string.
pub trait QueryParams {
    fn to_query(&self) -> Vec<(&'static str, String)>;
}

impl QueryParams for () {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

impl SignupRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        user_type: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            user_type,
            subjects: None,
            experience: None,
            qualification: None,
            bio: None,
            hourly_rate: None,
            availability: None,
            phone: None,
            grade: None,
            interests: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub user_type: Role,
}

/// Body returned by `/auth/signup` and `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: Identity,
}

fn bearer() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub is_admin: bool,
}

// =========================================================
// Teachers & profile
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherFilter {
    /// The backend treats an absent value as `true`.
    pub verified_only: Option<bool>,
    pub subject: Option<String>,
    pub search: Option<String>,
}

impl TeacherFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for TeacherFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(v) = self.verified_only {
            q.push(("verified_only", v.to_string()));
        }
        if let Some(s) = self.subject.as_ref().filter(|s| !s.is_empty()) {
            q.push(("subject", s.clone()));
        }
        if let Some(s) = self.search.as_ref().filter(|s| !s.is_empty()) {
            q.push(("search", s.clone()));
        }
        q
    }
}

/// Partial profile update; unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePictureUpdate {
    pub image_url: String,
}

/// Body of the admin verify/unverify acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationResult {
    pub message: String,
    pub teacher_id: String,
}

// =========================================================
// Classes & enrollments
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassFilter {
    pub teacher_id: Option<String>,
    pub subject: Option<String>,
    pub status: Option<ClassStatus>,
}

impl ClassFilter {
    pub fn by_teacher(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: Some(teacher_id.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for ClassFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(id) = &self.teacher_id {
            q.push(("teacher_id", id.clone()));
        }
        if let Some(s) = self.subject.as_ref().filter(|s| !s.is_empty()) {
            q.push(("subject", s.clone()));
        }
        if let Some(status) = self.status {
            q.push(("status", status.as_str().to_string()));
        }
        q
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCreate {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub price: f64,
    pub duration: String,
    pub max_students: u32,
    pub schedule: String,
    pub meeting_link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_students: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentCreate {
    pub class_id: String,
}

// =========================================================
// Teaching tools
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceCreate {
    pub class_id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCreate {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub is_public: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentCreate {
    pub title: String,
    pub description: String,
    pub class_id: String,
    pub due_date: DateTime<Utc>,
    pub total_marks: u32,
    pub status: AssignmentStatus,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Feed size the backend uses when no limit is given.
pub const DEFAULT_FEED_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
        }
    }
}

impl QueryParams for FeedQuery {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![("limit", self.limit.to_string())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingCreate {
    pub teacher_id: String,
    pub student_id: String,
    pub class_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyRateQuery {
    pub hourly_rate: f64,
}

impl QueryParams for HourlyRateQuery {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![("hourly_rate", self.hourly_rate.to_string())]
    }
}
