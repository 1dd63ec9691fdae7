use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::store::SessionProvider;
use crate::domain::access::{AccessPolicy, AccessState};
use crate::domain::session::Credentials;

/// Resolves who is calling. Never fails: every lookup error narrows the
/// caller's rights instead.
#[derive(Clone)]
pub struct AccessService {
    sessions: Arc<dyn SessionProvider>,
    admin_team: String,
    policy: AccessPolicy,
}

impl AccessService {
    pub fn new(sessions: Arc<dyn SessionProvider>, admin_team: String, policy: AccessPolicy) -> Self {
        Self {
            sessions,
            admin_team,
            policy,
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub async fn resolve(&self, credentials: Option<&Credentials>) -> AccessState {
        let Some(credentials) = credentials else {
            return AccessState::Unauthenticated;
        };

        let user = match self.sessions.current_user(credentials).await {
            Ok(Some(user)) => user,
            Ok(None) => return AccessState::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "session lookup failed");
                return AccessState::Unauthenticated;
            }
        };

        let teams = match self.sessions.team_ids(credentials).await {
            Ok(teams) => teams,
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "team lookup failed");
                Vec::new()
            }
        };

        let state = AccessState::from_membership(Some(user), &teams, &self.admin_team);
        debug!(admin = state.is_admin(), "session resolved");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::session::SessionUser;
    use async_trait::async_trait;

    struct Flaky {
        user_fails: bool,
    }

    #[async_trait]
    impl SessionProvider for Flaky {
        async fn current_user(
            &self,
            _: &Credentials,
        ) -> Result<Option<SessionUser>, DomainError> {
            if self.user_fails {
                return Err(DomainError::Upstream("auth service down".into()));
            }
            Ok(Some(SessionUser {
                id: "u1".into(),
                email: "a@example.com".into(),
                email_verified: true,
            }))
        }

        async fn team_ids(&self, _: &Credentials) -> Result<Vec<String>, DomainError> {
            Err(DomainError::Upstream("teams unavailable".into()))
        }
    }

    fn service(user_fails: bool) -> AccessService {
        AccessService::new(
            Arc::new(Flaky { user_fails }),
            "admins".into(),
            AccessPolicy::default(),
        )
    }

    #[tokio::test]
    async fn no_credentials_is_unauthenticated() {
        assert_eq!(service(false).resolve(None).await, AccessState::Unauthenticated);
    }

    #[tokio::test]
    async fn failures_fail_closed() {
        let creds = Credentials::SessionSecret("s".into());
        assert_eq!(
            service(true).resolve(Some(&creds)).await,
            AccessState::Unauthenticated
        );
        let state = service(false).resolve(Some(&creds)).await;
        assert!(state.is_authenticated());
        assert!(!state.is_admin());
    }
}
