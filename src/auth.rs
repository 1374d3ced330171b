use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::login::LoginMethod;

/// Identity returned by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub display_name: String,
}

impl AccountProfile {
    pub fn offline(name: &str) -> Self {
        Self {
            id: offline_account_id(name),
            display_name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub login_method: LoginMethod,
    pub identifier: String,
    pub remember_credentials: bool,
    pub profile: Option<AccountProfile>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(login_method: LoginMethod, identifier: String, remember_credentials: bool) -> Self {
        Self {
            login_method,
            identifier,
            remember_credentials,
            profile: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_profile(mut self, profile: AccountProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.display_name.as_str())
            .unwrap_or(&self.identifier)
    }

    pub fn account_id(&self) -> Option<Uuid> {
        self.profile.as_ref().map(|p| p.id)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn authenticate(
        &self,
        method: LoginMethod,
        identifier: &str,
        secret: &str,
    ) -> Result<AccountProfile, AuthError>;
}

/// Stand-in for a real account backend: waits, then accepts anything.
#[derive(Debug, Clone)]
pub struct SimulatedAuthService {
    delay: Duration,
}

impl SimulatedAuthService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAuthService {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl AuthService for SimulatedAuthService {
    async fn authenticate(
        &self,
        method: LoginMethod,
        identifier: &str,
        _secret: &str,
    ) -> Result<AccountProfile, AuthError> {
        tokio::time::sleep(self.delay).await;

        let profile = match method {
            LoginMethod::Offline => AccountProfile::offline(identifier),
            LoginMethod::Official | LoginMethod::ThirdParty => AccountProfile {
                id: Uuid::new_v4(),
                display_name: identifier.to_string(),
            },
        };

        log::info!("Simulated {} login for {}", method.label(), identifier);
        Ok(profile)
    }
}

fn offline_account_id(username: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_OID,
        format!("OfflinePlayer:{}", username).as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_id_is_stable() {
        assert_eq!(
            AccountProfile::offline("Steve").id,
            AccountProfile::offline("Steve").id
        );
        assert_ne!(
            AccountProfile::offline("Steve").id,
            AccountProfile::offline("Alex").id
        );
    }

    #[test]
    fn display_name_falls_back_to_identifier() {
        let session = Session::new(LoginMethod::Official, "alex@example.com".to_string(), false);
        assert_eq!(session.display_name(), "alex@example.com");
        assert_eq!(session.account_id(), None);

        let session = session.with_profile(AccountProfile {
            id: Uuid::nil(),
            display_name: "Alex".to_string(),
        });
        assert_eq!(session.display_name(), "Alex");
        assert_eq!(session.account_id(), Some(Uuid::nil()));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_auth_always_succeeds() {
        let service = SimulatedAuthService::default();
        let profile = service
            .authenticate(LoginMethod::Offline, "Alex", "")
            .await
            .unwrap();
        assert_eq!(profile, AccountProfile::offline("Alex"));

        let profile = service
            .authenticate(LoginMethod::ThirdParty, "alex@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(profile.display_name, "alex@example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_auth_waits_for_delay() {
        let service = SimulatedAuthService::new(Duration::from_millis(1500));
        let mut login = tokio_test::task::spawn(service.authenticate(LoginMethod::Offline, "Alex", ""));

        tokio_test::assert_pending!(login.poll());
        tokio::time::advance(Duration::from_millis(1499)).await;
        tokio_test::assert_pending!(login.poll());
        tokio::time::advance(Duration::from_millis(1)).await;
        tokio_test::assert_ready!(login.poll()).unwrap();
    }
}
