//! Login and user management.

use ssms_core::validation::{validate_email, validate_password, validate_username};
use ssms_core::{params, NewUser, SecurityPolicy, User};
use tracing::{debug, info, warn};

use crate::connector::{Connector, SqlxConnector};
use crate::error::{DbError, DbResult};
use crate::password::{hash_password, verify_password};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct UserRepository<C: Connector + Clone = SqlxConnector> {
    store: Store<C>,
}

impl<C: Connector + Clone> UserRepository<C> {
    pub fn new(store: Store<C>) -> Self {
        UserRepository { store }
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.store
            .query("SELECT * FROM users WHERE username = ?", params![username])
            .await
            .into_first()
    }

    /// The active user matching these credentials, if any.
    ///
    /// Unknown users, inactive users and wrong passwords all give `Ok(None)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let user = self
            .store
            .query(
                "SELECT * FROM users WHERE username = ? AND is_active = 1",
                params![username.trim()],
            )
            .await
            .into_first::<User>()?;

        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash).await?,
            None => false,
        };
        match user {
            Some(user) if verified => {
                info!(user_id = user.id, role = %user.role, "User authenticated");
                Ok(Some(user))
            }
            _ => {
                warn!(username = %username, "Authentication failed");
                Ok(None)
            }
        }
    }

    /// Validates, hashes the password, inserts, and returns the stored user.
    pub async fn create(&self, user: &NewUser, policy: &SecurityPolicy) -> DbResult<User> {
        validate_username(&user.username)?;
        validate_password(&user.password, policy)?;
        validate_email(Some(&user.email))?;

        let hash = hash_password(&user.password).await?;
        debug!(username = %user.username, role = %user.role, "Creating user");

        self.store
            .query(
                "INSERT INTO users (username, password_hash, email, role, first_name, last_name) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    user.username.as_str(),
                    hash,
                    user.email.as_str(),
                    user.role,
                    user.first_name.as_deref(),
                    user.last_name.as_deref()
                ],
            )
            .await
            .into_affected()?;

        self.get_by_username(&user.username)
            .await?
            .ok_or_else(|| DbError::not_found("User", &user.username))
    }
}
