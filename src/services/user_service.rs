//! Account handling.
//!
//! There is no user-facing HTTP surface for accounts; users are created by
//! operational tooling and test fixtures. The service still owns the one
//! rule that matters: passwords are argon2-hashed before they reach the
//! repository.

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::UserRepository;
use crate::utils::hash_password;

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Creates a user, hashing the supplied plain-text password first.
    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let user = NewUser {
            password: hash_password(&user.password)?,
            ..user
        };
        self.repo.create(user).await
    }

    /// Looks up a user by id, failing with `NotFound` when absent.
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound {
            entity: "user".to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        })
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.repo.find_by_username(username).await
    }
}
