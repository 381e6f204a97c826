use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::models::User;
use crate::{Database, StoreError};

impl Database {
    // -- Credential store --

    /// Register a new user. The password is hashed with Argon2id before it
    /// touches the database.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::InvalidUsername);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| StoreError::Hash(e.to_string()))?
            .to_string();

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        self.with_conn(|conn| {
            if query_user_by_username(conn, username)?.is_some() {
                return Err(StoreError::DuplicateUser);
            }

            conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user.id, user.username, user.password_hash, user.created_at],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => StoreError::DuplicateUser,
                _ => StoreError::Sqlite(e),
            })?;
            Ok(())
        })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.with_conn(|conn| query_user_by_username(conn, username))?
            .ok_or(StoreError::NotFound)
    }

    /// Look up `username` and check `password` against its stored hash.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let user = self.get_user_by_username(username)?;

        let parsed_hash =
            PasswordHash::new(&user.password_hash).map_err(|e| StoreError::Hash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| StoreError::InvalidCredentials)?;

        Ok(user)
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_scenario() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_user("testuser", "password123").unwrap();

        let user = db.authenticate("testuser", "password123").unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.username, "testuser");

        assert!(matches!(
            db.authenticate("testuser", "wrongpassword"),
            Err(StoreError::InvalidCredentials)
        ));
        assert!(matches!(
            db.authenticate("nonexistent", "password123"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn password_is_stored_hashed() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("alice", "hunter22").unwrap();

        let user = db.get_user_by_username("alice").unwrap();
        assert_ne!(user.password_hash, "hunter22");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn rejects_duplicate_and_empty_usernames() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("alice", "pw").unwrap();

        assert!(matches!(db.create_user("alice", "other"), Err(StoreError::DuplicateUser)));
        assert!(matches!(db.create_user("", "pw"), Err(StoreError::InvalidUsername)));
        assert!(matches!(db.create_user("   ", "pw"), Err(StoreError::InvalidUsername)));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_user_by_username("ghost"), Err(StoreError::NotFound)));
    }
}
