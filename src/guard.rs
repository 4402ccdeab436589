//! Route Guard and navigator.
//!
//! The guard is a pure decision over `(AuthState, AppRoute)`. The navigator
//! applies it on every navigation, back step, and auth change, following
//! redirects until a view can be shown.

use tracing::{debug, warn};

use crate::admin::{AdminDecision, AdminGate};
use crate::auth::AuthState;
use crate::route::AppRoute;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Auth state not known yet; show a neutral placeholder.
    Loading,
    Redirect(AppRoute),
    Render(AppRoute),
    /// Admin view refused for this signed-in email.
    AccessDenied { email: String },
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    admin: AdminGate,
}

impl RouteGuard {
    pub fn new(admin: AdminGate) -> Self {
        Self { admin }
    }

    pub fn admin_gate(&self) -> &AdminGate {
        &self.admin
    }

    pub fn evaluate(&self, state: &AuthState, route: &AppRoute) -> RouteDecision {
        if route.is_admin() {
            return match self.admin.evaluate(state) {
                AdminDecision::Loading => RouteDecision::Loading,
                AdminDecision::RedirectToLogin(notice) => RouteDecision::Redirect(AppRoute::Login(Some(notice))),
                AdminDecision::AccessDenied { email } => RouteDecision::AccessDenied { email },
                AdminDecision::Permitted => RouteDecision::Render(AppRoute::Admin),
            };
        }
        if *route == AppRoute::NotFound {
            return RouteDecision::Redirect(AppRoute::Landing);
        }

        let auth_sensitive = route.requires_auth() || route.should_redirect_when_authenticated();
        match state {
            AuthState::Initializing if auth_sensitive => RouteDecision::Loading,
            AuthState::Unauthenticated if route.requires_auth() => {
                RouteDecision::Redirect(AppRoute::auth_failure_redirect())
            }
            AuthState::Authenticated(identity) => {
                let home = AppRoute::dashboard_for(identity.role);
                let role_mismatch = route.required_role().is_some_and(|role| role != identity.role);
                if role_mismatch || route.should_redirect_when_authenticated() {
                    RouteDecision::Redirect(home)
                } else {
                    RouteDecision::Render(route.clone())
                }
            }
            _ => RouteDecision::Render(route.clone()),
        }
    }
}

/// Redirect chains are at most two hops (admin to login to dashboard).
const MAX_REDIRECTS: usize = 4;

pub struct Navigator {
    guard: RouteGuard,
    /// Route the user asked for, replaced by the redirect target once a
    /// redirect settles.
    requested: AppRoute,
    decision: RouteDecision,
    history: Vec<AppRoute>,
}

impl Navigator {
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard,
            requested: AppRoute::Landing,
            decision: RouteDecision::Loading,
            history: Vec::new(),
        }
    }

    pub fn decision(&self) -> &RouteDecision {
        &self.decision
    }

    /// Route currently shown, if anything beyond a placeholder is.
    pub fn current(&self) -> Option<&AppRoute> {
        match self.decision {
            RouteDecision::Loading => None,
            _ => self.history.last(),
        }
    }

    pub fn history(&self) -> &[AppRoute] {
        &self.history
    }

    pub fn navigate(&mut self, state: &AuthState, path: &str) -> &RouteDecision {
        self.requested = AppRoute::from_path(path);
        self.resolve(state, true)
    }

    /// Re-run the guard for the current route.
    pub fn on_auth_changed(&mut self, state: &AuthState) -> &RouteDecision {
        self.resolve(state, false)
    }

    /// Step back one entry; the guard runs again on the entry revealed.
    pub fn back(&mut self, state: &AuthState) -> &RouteDecision {
        if self.history.len() > 1 {
            self.history.pop();
        }
        if let Some(previous) = self.history.last() {
            self.requested = previous.clone();
        }
        self.resolve(state, false)
    }

    fn resolve(&mut self, state: &AuthState, push: bool) -> &RouteDecision {
        let mut route = self.requested.clone();
        let mut decision = self.guard.evaluate(state, &route);
        let mut hops = 0;
        while let RouteDecision::Redirect(next) = decision {
            hops += 1;
            if hops > MAX_REDIRECTS {
                warn!(from = %self.requested, "redirect limit reached, falling back to landing");
                route = AppRoute::Landing;
                decision = RouteDecision::Render(AppRoute::Landing);
                break;
            }
            debug!(from = %route, to = %next, "redirecting");
            route = next;
            decision = self.guard.evaluate(state, &route);
        }

        let shown = match &decision {
            RouteDecision::Render(r) => Some(r.clone()),
            RouteDecision::AccessDenied { .. } => Some(route.clone()),
            RouteDecision::Loading | RouteDecision::Redirect(_) => None,
        };
        if let Some(shown) = shown {
            self.requested = shown.clone();
            if push && self.history.last() != Some(&shown) {
                self.history.push(shown);
            } else if let Some(last) = self.history.last_mut() {
                *last = shown;
            } else {
                self.history.push(shown);
            }
        }
        self.decision = decision;
        &self.decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminAllowList;
    use crate::route::LoginNotice;
    use aumryx_shared::{Identity, Role};

    fn guard() -> RouteGuard {
        RouteGuard::new(AdminGate::new(AdminAllowList::new(["founder@aumryxteach.com"])))
    }

    fn teacher() -> AuthState {
        AuthState::Authenticated(Identity::new("t1", "t@example.com", Role::Teacher))
    }

    fn student() -> AuthState {
        AuthState::Authenticated(Identity::new("s1", "s@example.com", Role::Student))
    }

    #[test]
    fn initializing_never_redirects_protected_views() {
        let guard = guard();
        for route in [AppRoute::TeacherDashboard, AppRoute::StudentDashboard, AppRoute::Admin, AppRoute::Login(None)] {
            assert_eq!(guard.evaluate(&AuthState::Initializing, &route), RouteDecision::Loading);
        }
        assert_eq!(
            guard.evaluate(&AuthState::Initializing, &AppRoute::TeacherBrowse),
            RouteDecision::Render(AppRoute::TeacherBrowse)
        );
    }

    #[test]
    fn unauthenticated_goes_to_login() {
        let guard = guard();
        assert_eq!(
            guard.evaluate(&AuthState::Unauthenticated, &AppRoute::StudentDashboard),
            RouteDecision::Redirect(AppRoute::Login(None))
        );
        assert_eq!(
            guard.evaluate(&AuthState::Unauthenticated, &AppRoute::Admin),
            RouteDecision::Redirect(AppRoute::Login(Some(LoginNotice::AdminRequired)))
        );
    }

    #[test]
    fn role_mismatch_sends_user_to_own_dashboard() {
        let guard = guard();
        assert_eq!(
            guard.evaluate(&student(), &AppRoute::TeacherDashboard),
            RouteDecision::Redirect(AppRoute::StudentDashboard)
        );
        assert_eq!(
            guard.evaluate(&teacher(), &AppRoute::StudentDashboard),
            RouteDecision::Redirect(AppRoute::TeacherDashboard)
        );
        assert_eq!(
            guard.evaluate(&teacher(), &AppRoute::TeacherDashboard),
            RouteDecision::Render(AppRoute::TeacherDashboard)
        );
    }

    #[test]
    fn navigator_follows_redirects_and_records_history() {
        let mut nav = Navigator::new(guard());
        assert_eq!(
            nav.navigate(&AuthState::Unauthenticated, "/nowhere"),
            &RouteDecision::Render(AppRoute::Landing)
        );
        nav.navigate(&AuthState::Unauthenticated, "/teachers");
        nav.navigate(&AuthState::Unauthenticated, "/student/dashboard");
        assert_eq!(nav.current(), Some(&AppRoute::Login(None)));
        assert_eq!(
            nav.history(),
            &[AppRoute::Landing, AppRoute::TeacherBrowse, AppRoute::Login(None)]
        );
    }

    #[test]
    fn pending_view_settles_once_auth_is_known() {
        let mut nav = Navigator::new(guard());
        assert_eq!(nav.navigate(&AuthState::Initializing, "/teacher/dashboard"), &RouteDecision::Loading);
        assert!(nav.history().is_empty());
        assert!(nav.current().is_none());

        assert_eq!(
            nav.on_auth_changed(&teacher()),
            &RouteDecision::Render(AppRoute::TeacherDashboard)
        );
        assert_eq!(nav.history(), &[AppRoute::TeacherDashboard]);
    }

    #[test]
    fn login_and_logout_move_the_current_view() {
        let mut nav = Navigator::new(guard());
        nav.navigate(&AuthState::Unauthenticated, "/login");

        assert_eq!(
            nav.on_auth_changed(&student()),
            &RouteDecision::Render(AppRoute::StudentDashboard)
        );
        assert_eq!(
            nav.on_auth_changed(&AuthState::Unauthenticated),
            &RouteDecision::Render(AppRoute::Login(None))
        );
    }

    #[test]
    fn back_reapplies_the_guard() {
        let mut nav = Navigator::new(guard());
        nav.navigate(&teacher(), "/teacher/dashboard");
        nav.navigate(&teacher(), "/teachers");

        assert_eq!(
            nav.back(&AuthState::Unauthenticated),
            &RouteDecision::Render(AppRoute::Login(None))
        );
    }

    #[test]
    fn admin_denial_is_a_view_not_a_redirect() {
        let mut nav = Navigator::new(guard());
        assert_eq!(
            nav.navigate(&student(), "/admin"),
            &RouteDecision::AccessDenied {
                email: "s@example.com".into()
            }
        );
        assert_eq!(nav.current(), Some(&AppRoute::Admin));
    }
}
