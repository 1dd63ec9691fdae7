//! Request routing policy for the public site, the admin dashboard and the
//! mutating API. Pure: the caller resolves the session and passes the method
//! and path explicitly.

use crate::domain::session::SessionUser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    Member(SessionUser),
    Admin(SessionUser),
}

impl AccessState {
    pub fn from_membership(user: Option<SessionUser>, team_ids: &[String], admin_team: &str) -> Self {
        match user {
            None => AccessState::Unauthenticated,
            Some(user) if !admin_team.is_empty() && team_ids.iter().any(|t| t == admin_team) => {
                AccessState::Admin(user)
            }
            Some(user) => AccessState::Member(user),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AccessState::Admin(_))
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AccessState::Unauthenticated)
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            AccessState::Unauthenticated => None,
            AccessState::Member(user) | AccessState::Admin(user) => Some(user),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub path: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(String),
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub dashboard_prefix: String,
    pub sign_in_path: String,
    pub sign_up_path: String,
    pub home_path: String,
    pub protected_api_prefixes: Vec<String>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            dashboard_prefix: "/dashboard".into(),
            sign_in_path: "/sign-in".into(),
            sign_up_path: "/sign-up".into(),
            home_path: "/".into(),
            protected_api_prefixes: vec![
                "/api/posts".into(),
                "/api/category".into(),
                "/api/upload".into(),
                "/api/ai".into(),
            ],
        }
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_mutating(method: &str) -> bool {
    ["POST", "PUT", "DELETE"]
        .iter()
        .any(|m| m.eq_ignore_ascii_case(method))
}

impl AccessPolicy {
    fn is_protected_call(&self, request: RequestContext<'_>) -> bool {
        is_mutating(request.method)
            && self
                .protected_api_prefixes
                .iter()
                .any(|prefix| is_under(request.path, prefix))
    }

    pub fn evaluate(&self, request: RequestContext<'_>, state: &AccessState) -> Decision {
        if is_under(request.path, &self.dashboard_prefix) {
            return match state {
                AccessState::Unauthenticated => Decision::Redirect(self.sign_in_path.clone()),
                AccessState::Member(_) => Decision::Redirect(self.home_path.clone()),
                AccessState::Admin(_) => Decision::Proceed,
            };
        }

        if self.is_protected_call(request) {
            return if state.is_admin() {
                Decision::Proceed
            } else {
                Decision::Forbidden
            };
        }

        if state.is_authenticated()
            && (is_under(request.path, &self.sign_in_path)
                || is_under(request.path, &self.sign_up_path))
        {
            return Decision::Redirect(self.dashboard_prefix.clone());
        }

        Decision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: "u1".into(),
            email: "writer@example.com".into(),
            email_verified: true,
        }
    }

    fn req<'a>(method: &'a str, path: &'a str) -> RequestContext<'a> {
        RequestContext { method, path }
    }

    #[test]
    fn membership_decides_role() {
        let teams = vec!["editors".to_string(), "admins".to_string()];
        assert!(AccessState::from_membership(Some(user()), &teams, "admins").is_admin());
        assert_eq!(
            AccessState::from_membership(Some(user()), &teams, "owners"),
            AccessState::Member(user())
        );
        assert_eq!(
            AccessState::from_membership(None, &teams, "admins"),
            AccessState::Unauthenticated
        );
        assert!(!AccessState::from_membership(Some(user()), &teams, "").is_admin());
    }

    #[test]
    fn dashboard_redirects_by_role() {
        let policy = AccessPolicy::default();
        let path = req("GET", "/dashboard/posts/new");
        assert_eq!(
            policy.evaluate(path, &AccessState::Unauthenticated),
            Decision::Redirect("/sign-in".into())
        );
        assert_eq!(
            policy.evaluate(path, &AccessState::Member(user())),
            Decision::Redirect("/".into())
        );
        assert_eq!(policy.evaluate(path, &AccessState::Admin(user())), Decision::Proceed);
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let policy = AccessPolicy::default();
        assert_eq!(
            policy.evaluate(req("GET", "/dashboardish"), &AccessState::Unauthenticated),
            Decision::Proceed
        );
        assert_eq!(
            policy.evaluate(req("POST", "/api/postscript"), &AccessState::Unauthenticated),
            Decision::Proceed
        );
    }

    #[test]
    fn mutating_api_calls_need_admin() {
        let policy = AccessPolicy::default();
        for method in ["POST", "PUT", "DELETE", "delete"] {
            for path in ["/api/posts", "/api/category", "/api/upload", "/api/ai/title"] {
                assert_eq!(
                    policy.evaluate(req(method, path), &AccessState::Member(user())),
                    Decision::Forbidden
                );
                assert_eq!(
                    policy.evaluate(req(method, path), &AccessState::Unauthenticated),
                    Decision::Forbidden
                );
                assert_eq!(
                    policy.evaluate(req(method, path), &AccessState::Admin(user())),
                    Decision::Proceed
                );
            }
        }
    }

    #[test]
    fn reads_are_public() {
        let policy = AccessPolicy::default();
        assert_eq!(
            policy.evaluate(req("GET", "/api/posts"), &AccessState::Unauthenticated),
            Decision::Proceed
        );
        assert_eq!(
            policy.evaluate(req("GET", "/api/upload"), &AccessState::Member(user())),
            Decision::Proceed
        );
    }

    #[test]
    fn signed_in_users_skip_auth_pages() {
        let policy = AccessPolicy::default();
        for state in [AccessState::Member(user()), AccessState::Admin(user())] {
            assert_eq!(
                policy.evaluate(req("GET", "/sign-in"), &state),
                Decision::Redirect("/dashboard".into())
            );
            assert_eq!(
                policy.evaluate(req("GET", "/sign-up"), &state),
                Decision::Redirect("/dashboard".into())
            );
        }
        assert_eq!(
            policy.evaluate(req("GET", "/sign-in"), &AccessState::Unauthenticated),
            Decision::Proceed
        );
    }
}
