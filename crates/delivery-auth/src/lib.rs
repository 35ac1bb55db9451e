//! Authentication for the delivery back office.
//!
//! Provides the identity provider boundary, sessions, password hashing and
//! the guard that gates administrative operations.

mod error;
mod password;
mod provider;
mod session;
mod user;

pub use error::AuthError;
pub use password::{PasswordHasher, MIN_PASSWORD_LENGTH};
pub use provider::{AuthEvent, IdentityProvider, MemoryIdentityProvider};
pub use session::{require_role, require_session, AuthSession, SessionId};
pub use user::{Role, User, UserId};
