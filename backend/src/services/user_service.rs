//! User business logic service.
//!
//! Handles registration with its uniqueness checks, and credential
//! verification against the stored bcrypt hash.

use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use bcrypt::{hash, verify};
use sqlx::SqlitePool;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    /// bcrypt work factor used for new hashes
    hash_cost: u32,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `hash_cost` - bcrypt cost applied when hashing new passwords
    pub fn new(pool: &'a SqlitePool, hash_cost: u32) -> Self {
        Self { pool, hash_cost }
    }

    /// Registers a new user after checking username and email uniqueness.
    ///
    /// # Returns
    /// The newly created, active User
    ///
    /// # Errors
    /// Returns `ServiceError::AlreadyExists` when the username or the email
    /// is already taken
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        if repo.username_exists(username).await? {
            return Err(ServiceError::already_exists("Username", username));
        }

        if let Some(email) = email {
            if repo.email_exists(email).await? {
                return Err(ServiceError::already_exists("Email", email));
            }
        }

        let password_hash = self.hash_password(password)?;

        let data = CreateUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash,
        };

        // The lookups above can race with a concurrent registration; the
        // UNIQUE constraints still catch it.
        repo.create_user(data).await.map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::already_exists("User", username)
            } else {
                ServiceError::from(e)
            }
        })
    }

    /// Checks a username/password pair.
    ///
    /// Unknown usernames and wrong passwords are reported identically.
    /// The active flag is not checked here.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_username(username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Retrieves a user by username, if present.
    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let repo = UserRepository::new(self.pool);
        Ok(repo.get_user_by_username(username).await?)
    }

    /// Function to hash a password before storing in database
    fn hash_password(&self, password: &str) -> ServiceResult<String> {
        hash(password, self.hash_cost)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    /// Function to verify a password against the stored hash
    ///
    /// # Returns
    /// `true` if password matches hash, `false` otherwise
    ///
    /// # Errors
    /// Returns `ServiceError` if the stored hash is malformed
    fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        verify(password, hash)
            .map_err(|e| ServiceError::internal_error(format!("Password verification failed: {}", e)))
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_error)) => db_error.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BCRYPT_COST as COST;
    use crate::database::test_pool;

    #[tokio::test]
    async fn test_register_hashes_password_and_activates() {
        let pool = test_pool().await;
        let service = UserService::new(&pool, COST);

        let user = service
            .create_user("alice", "secret1", Some("alice@example.com"))
            .await
            .unwrap();

        assert!(user.is_active);
        assert_ne!(user.password_hash, "secret1");
        assert!(verify("secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = test_pool().await;
        let service = UserService::new(&pool, COST);

        service.create_user("alice", "secret1", None).await.unwrap();
        let second = service.create_user("alice", "other-pass", None).await;

        match second {
            Err(ServiceError::AlreadyExists { entity, .. }) => assert_eq!(entity, "Username"),
            other => panic!("expected duplicate username, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        let service = UserService::new(&pool, COST);

        service
            .create_user("alice", "secret1", Some("shared@example.com"))
            .await
            .unwrap();
        let second = service
            .create_user("bob", "secret2", Some("shared@example.com"))
            .await;

        match second {
            Err(ServiceError::AlreadyExists { entity, .. }) => assert_eq!(entity, "Email"),
            other => panic!("expected duplicate email, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let pool = test_pool().await;
        let service = UserService::new(&pool, COST);

        service.create_user("alice", "secret1", None).await.unwrap();
        assert!(service.create_user("Alice", "secret1", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_user() {
        let pool = test_pool().await;
        let service = UserService::new(&pool, COST);
        service.create_user("alice", "secret1", None).await.unwrap();

        let user = service.authenticate_user("alice", "secret1").await.unwrap();
        assert_eq!(user.username, "alice");

        assert!(matches!(
            service.authenticate_user("alice", "wrong").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate_user("nobody", "secret1").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
