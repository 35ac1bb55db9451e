//! Identity provider contract and an in-memory implementation.

use crate::{AuthError, AuthSession, PasswordHasher, Role, User};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Session change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
}

/// Email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate and open a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Register a user and open a session.
    async fn sign_up(&self, email: &str, password: &str, name: Option<&str>)
        -> Result<AuthSession, AuthError>;

    /// Close the current session. Signing out twice is not an error.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The current live session, if any.
    async fn current_session(&self) -> Option<AuthSession>;

    /// Subscribe to session changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

struct Account {
    user: User,
    password_hash: String,
}

/// In-process [`IdentityProvider`].
///
/// The first account registered becomes [`Role::Admin`]; later ones are staff.
pub struct MemoryIdentityProvider {
    hasher: PasswordHasher,
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            hasher: PasswordHasher::default(),
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
        }
    }

    async fn open_session(&self, user: User) -> AuthSession {
        let session = AuthSession::new(user);
        *self.current.write().await = Some(session.clone());
        // No receivers is fine.
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        session
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = {
            let accounts = self.accounts.read().await;
            let account = accounts.get(&email).ok_or(AuthError::InvalidCredentials)?;
            if !self.hasher.verify(password, &account.password_hash)? {
                tracing::warn!(email = %email, "sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
            account.user.clone()
        };

        tracing::info!(user_id = %user.id, "signed in");
        Ok(self.open_session(user).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email)?;
        PasswordHasher::validate_password(password)?;
        let password_hash = self.hasher.hash(password)?;

        let user = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&email) {
                return Err(AuthError::UserAlreadyExists(email));
            }
            let role = if accounts.is_empty() { Role::Admin } else { Role::Staff };
            let user = User::new(email.clone(), name.map(str::to_string), role);
            accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    password_hash,
                },
            );
            user
        };

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "signed up");
        Ok(self.open_session(user).await)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.current.write().await.take().is_some() {
            let _ = self.events.send(AuthEvent::SignedOut);
            tracing::info!("signed out");
        }
        Ok(())
    }

    async fn current_session(&self) -> Option<AuthSession> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_expired())
            .cloned()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = MemoryIdentityProvider::new();
        let first = provider
            .sign_up("Dono@Pizzaria.test", "segredo123", Some("Dono"))
            .await
            .unwrap();
        assert_eq!(first.user.role, Role::Admin);
        assert_eq!(first.user.email, "dono@pizzaria.test");

        provider.sign_out().await.unwrap();
        assert!(provider.current_session().await.is_none());

        let session = provider
            .sign_in("dono@pizzaria.test", "segredo123")
            .await
            .unwrap();
        assert_eq!(session.user.id, first.user.id);
        assert_eq!(provider.current_session().await, Some(session));
    }

    #[tokio::test]
    async fn test_second_account_is_staff() {
        let provider = MemoryIdentityProvider::new();
        provider.sign_up("a@x.test", "123456", None).await.unwrap();
        let second = provider.sign_up("b@x.test", "123456", None).await.unwrap();
        assert_eq!(second.user.role, Role::Staff);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let provider = MemoryIdentityProvider::new();
        provider.sign_up("a@x.test", "123456", None).await.unwrap();

        let wrong = provider.sign_in("a@x.test", "654321").await.unwrap_err();
        assert!(wrong.is_auth_failure());
        let unknown = provider.sign_in("z@x.test", "123456").await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_sign_up() {
        let provider = MemoryIdentityProvider::new();
        provider.sign_up("a@x.test", "123456", None).await.unwrap();
        assert!(matches!(
            provider.sign_up("A@x.test", "123456", None).await,
            Err(AuthError::UserAlreadyExists(_))
        ));
        assert!(matches!(
            provider.sign_up("c@x.test", "123", None).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            provider.sign_up("not-an-email", "123456", None).await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_sees_session_changes() {
        let provider = MemoryIdentityProvider::new();
        let mut events = provider.subscribe();

        let session = provider.sign_up("a@x.test", "123456", None).await.unwrap();
        provider.sign_out().await.unwrap();
        provider.sign_out().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedIn(session));
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
        assert!(events.try_recv().is_err());
    }
}
