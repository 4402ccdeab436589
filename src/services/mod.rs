//! Domain Service Façade
//!
//! One narrow async method per backend operation, grouped by resource. Each
//! method performs exactly one HTTP call and returns the decoded record or the
//! gateway's error unchanged, apart from an operation breadcrumb.
//!
//! Only `auth.signup`, `auth.login` and `auth.logout` touch the Session Store.

/// Declares a borrowed call-group struct over the gateway.
macro_rules! call_group {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'a, C: $crate::request::HttpClient> {
            gateway: &'a $crate::gateway::ApiGateway<C>,
        }

        impl<'a, C: $crate::request::HttpClient> $name<'a, C> {
            pub(crate) fn new(gateway: &'a $crate::gateway::ApiGateway<C>) -> Self {
                Self { gateway }
            }
        }
    };
}

mod admin;
mod auth;
mod classes;
mod insights;
mod teachers;
mod teaching;


pub use admin::AdminService;
pub use auth::AuthService;
pub use classes::{ClassService, EnrollmentService};
pub use insights::{AnalyticsService, RatingService};
pub use teachers::{ProfileService, TeacherService};
pub use teaching::{AssignmentService, AttendanceService, CommunityService, NoteService};

use crate::gateway::ApiGateway;
use crate::request::HttpClient;
use crate::session::SessionStore;

pub struct Services<C: HttpClient> {
    gateway: ApiGateway<C>,
}

impl<C: HttpClient> Services<C> {
    pub fn new(gateway: ApiGateway<C>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ApiGateway<C> {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    pub fn auth(&self) -> AuthService<'_, C> {
        AuthService::new(&self.gateway)
    }

    pub fn teachers(&self) -> TeacherService<'_, C> {
        TeacherService::new(&self.gateway)
    }

    pub fn profile(&self) -> ProfileService<'_, C> {
        ProfileService::new(&self.gateway)
    }

    pub fn classes(&self) -> ClassService<'_, C> {
        ClassService::new(&self.gateway)
    }

    pub fn enrollments(&self) -> EnrollmentService<'_, C> {
        EnrollmentService::new(&self.gateway)
    }

    pub fn admin(&self) -> AdminService<'_, C> {
        AdminService::new(&self.gateway)
    }

    pub fn attendance(&self) -> AttendanceService<'_, C> {
        AttendanceService::new(&self.gateway)
    }

    pub fn notes(&self) -> NoteService<'_, C> {
        NoteService::new(&self.gateway)
    }

    pub fn assignments(&self) -> AssignmentService<'_, C> {
        AssignmentService::new(&self.gateway)
    }

    pub fn community(&self) -> CommunityService<'_, C> {
        CommunityService::new(&self.gateway)
    }

    pub fn ratings(&self) -> RatingService<'_, C> {
        RatingService::new(&self.gateway)
    }

    pub fn analytics(&self) -> AnalyticsService<'_, C> {
        AnalyticsService::new(&self.gateway)
    }
}
