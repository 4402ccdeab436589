//! Wire-level records shared between the Aumryx Teach client core and its
//! consumers.
//!
//! Every record is fully defaulted: optional collections deserialize to empty,
//! counters to zero and timestamps to `None`, so views never need defensive
//! access on partially-populated responses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod protocol;
pub mod serde_helper;

pub use chrono;

use serde_helper::{date, null_default, timestamp};

// =========================================================
// Constants
// =========================================================

/// Placeholder avatar the backend assigns to new teacher profiles.
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop";

fn default_image_url() -> String {
    DEFAULT_IMAGE_URL.to_string()
}

// =========================================================
// Identity
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role-tagged user profile returned by `/auth/*` and `/teachers/*`.
///
/// `id` and `role` are server-assigned and never change. `verified` only means
/// something for teachers (an admin approved the profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(rename = "user_type", alias = "role")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_default")]
    pub verified: bool,

    // Teacher profile
    #[serde(default, deserialize_with = "null_default")]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub students_count: u32,
    #[serde(default = "default_image_url", deserialize_with = "image_url")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub availability: Vec<String>,

    // Student profile
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub interests: Vec<String>,

    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn image_url<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_image_url))
}

impl Identity {
    /// Minimal identity with every optional field at its fallback value.
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: email.into(),
            role,
            verified: false,
            subjects: Vec::new(),
            experience: None,
            qualification: None,
            bio: None,
            hourly_rate: None,
            rating: 0.0,
            students_count: 0,
            image_url: default_image_url(),
            availability: Vec::new(),
            phone: None,
            grade: None,
            interests: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Restore the fallbacks a decoded record would carry. Decoding the
    /// serialized form of a normalized identity yields the same identity.
    pub fn normalize(&mut self) {
        if self.image_url.is_empty() {
            self.image_url = default_image_url();
        }
    }

    /// Whether an admin approved this teacher. Always false for students.
    pub fn is_verified_teacher(&self) -> bool {
        self.is_teacher() && self.verified
    }
}

// =========================================================
// Classes & Enrollments
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Active,
    Inactive,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Active => "active",
            ClassStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_default")]
    pub max_students: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub schedule: String,
    #[serde(default, deserialize_with = "null_default")]
    pub meeting_link: String,
    #[serde(default, deserialize_with = "null_default")]
    pub enrolled_students: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub status: ClassStatus,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Class {
    pub fn seats_left(&self) -> u32 {
        self.max_students.saturating_sub(self.enrolled_students)
    }

    pub fn is_full(&self) -> bool {
        self.seats_left() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub student_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub class_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "timestamp")]
    pub enrolled_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: EnrollmentStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

// =========================================================
// Teaching tools: attendance, notes, assignments, community
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub class_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub student_id: String,
    #[serde(default, deserialize_with = "date")]
    pub date: Option<NaiveDate>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
    /// Teacher who marked the record.
    #[serde(default, deserialize_with = "null_default")]
    pub created_by: String,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    #[serde(default = "yes", deserialize_with = "null_true")]
    pub is_public: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn yes() -> bool {
    true
}

fn null_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Draft,
    #[default]
    Published,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub class_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    #[serde(default, deserialize_with = "timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_default")]
    pub total_marks: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub status: AssignmentStatus,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Announcement,
    #[default]
    Discussion,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_default")]
    pub post_type: PostType,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    /// `None` means the post is visible to every student.
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub likes_count: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub comments_count: u32,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =========================================================
// Ratings & analytics
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub teacher_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub student_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub class_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherAnalytics {
    pub teacher_id: String,
    pub total_students: u32,
    pub total_classes: u32,
    pub total_revenue: f64,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub classes_completed: u32,
    pub active_enrollments: u32,
    pub course_views: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentAnalytics {
    pub student_id: String,
    pub total_courses_enrolled: u32,
    pub courses_completed: u32,
    pub total_assignments_submitted: u32,
    pub average_score: f64,
    pub total_hours_learned: f64,
    pub certificates_earned: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsEntry {
    pub enrollment_id: String,
    pub class_title: String,
    pub amount: f64,
    #[serde(deserialize_with = "timestamp")]
    pub date: Option<DateTime<Utc>>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsBreakdown {
    pub total_earnings: f64,
    pub platform_fee: f64,
    pub net_earnings: f64,
    #[serde(deserialize_with = "null_default")]
    pub enrollments: Vec<EarningsEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_accepts_minimal_payload_with_role_alias() {
        let user: Identity =
            serde_json::from_str(r#"{"id":"t1","role":"teacher","verified":false}"#).unwrap();
        assert_eq!(user.id, "t1");
        assert_eq!(user.role, Role::Teacher);
        assert!(user.email.is_empty());
        assert!(user.subjects.is_empty());
        assert_eq!(user.image_url, DEFAULT_IMAGE_URL);
    }

    #[test]
    fn identity_folds_nulls_into_defaults() {
        let user: Identity = serde_json::from_str(
            r#"{"_id":"s1","email":"s@example.com","user_type":"student",
                "subjects":null,"interests":null,"rating":null,"image_url":null,
                "created_at":"2025-01-02T03:04:05.000000"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "s1");
        assert!(user.is_student());
        assert!(user.subjects.is_empty());
        assert_eq!(user.rating, 0.0);
        assert_eq!(user.image_url, DEFAULT_IMAGE_URL);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn identity_survives_its_own_serialization() {
        let mut user = Identity::new("t9", "t9@example.com", Role::Teacher);
        user.subjects = vec!["Physics".into()];
        user.created_at = serde_helper::parse_timestamp("2025-01-02T03:04:05Z");

        let json = serde_json::to_string(&user).unwrap();
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let res = serde_json::from_str::<Identity>(r#"{"id":"x","user_type":"admin"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn class_seat_accounting() {
        let class: Class = serde_json::from_str(
            r#"{"_id":"c1","teacher_id":"t1","title":"Algebra","max_students":3,"enrolled_students":3}"#,
        )
        .unwrap();
        assert_eq!(class.status, ClassStatus::Active);
        assert!(class.is_full());
        assert_eq!(class.seats_left(), 0);
    }

    #[test]
    fn note_visibility_defaults_to_public() {
        let note: Note =
            serde_json::from_str(r#"{"_id":"n1","title":"t","content":"c","is_public":null}"#)
                .unwrap();
        assert!(note.is_public);
        assert!(note.tags.is_empty());
    }

    #[test]
    fn attendance_date_tolerates_time_suffix() {
        let rec: AttendanceRecord = serde_json::from_str(
            r#"{"_id":"a1","class_id":"c1","student_id":"s1","date":"2025-02-10T00:00:00","status":"late","created_by":"t1"}"#,
        )
        .unwrap();
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2025, 2, 10));
        assert_eq!(rec.status, AttendanceStatus::Late);
    }
}
