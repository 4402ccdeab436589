//! Route definitions.
//!
//! Pure domain model: every view the shell can show and the access
//! properties each one declares. No rendering or history handling here.

use std::fmt::{self, Display};

use aumryx_shared::Role;

/// Why the login view was shown instead of the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNotice {
    /// Came from the admin view without being signed in.
    AdminRequired,
}

impl LoginNotice {
    fn query_value(&self) -> &'static str {
        match self {
            LoginNotice::AdminRequired => "admin",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginNotice::AdminRequired => "Please sign in with the founder account to access the admin panel.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    #[default]
    Landing,
    Login(Option<LoginNotice>),
    Signup,
    TeacherBrowse,
    TeacherProfile(String),
    TeacherDashboard,
    StudentDashboard,
    Admin,
    NotFound,
}

impl AppRoute {
    /// Parse a location into a route. Query strings are ignored except for
    /// the login notice marker.
    pub fn from_path(location: &str) -> Self {
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let path = path.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(path);

        match path {
            "/" | "" => Self::Landing,
            "/login" => {
                let notice = query
                    .split('&')
                    .any(|pair| pair == "reason=admin")
                    .then_some(LoginNotice::AdminRequired);
                Self::Login(notice)
            }
            "/signup" => Self::Signup,
            "/teachers" => Self::TeacherBrowse,
            "/teacher/dashboard" => Self::TeacherDashboard,
            "/student/dashboard" => Self::StudentDashboard,
            "/admin" => Self::Admin,
            _ => match path.strip_prefix("/teacher/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::TeacherProfile(id.to_string()),
                _ => Self::NotFound,
            },
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login(None) => "/login".to_string(),
            Self::Login(Some(notice)) => format!("/login?reason={}", notice.query_value()),
            Self::Signup => "/signup".to_string(),
            Self::TeacherBrowse => "/teachers".to_string(),
            Self::TeacherProfile(id) => format!("/teacher/{}", id),
            Self::TeacherDashboard => "/teacher/dashboard".to_string(),
            Self::StudentDashboard => "/student/dashboard".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Role a protected view requires. `None` for public views and for the
    /// admin view, which is gated by identity instead.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::TeacherDashboard => Some(Role::Teacher),
            Self::StudentDashboard => Some(Role::Student),
            _ => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.required_role().is_some() || self.is_admin()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Signed-in users are sent on from these.
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login(_) | Self::Signup)
    }

    pub fn auth_failure_redirect() -> Self {
        Self::Login(None)
    }

    /// Default view for a role.
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Teacher => Self::TeacherDashboard,
            Role::Student => Self::StudentDashboard,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
