//! Business rules live here, between the HTTP layer and the
//! repositories. Handlers never touch a repository directly.

mod auth_service;
mod project_service;
mod user_service;

pub use auth_service::{AuthService, AuthUser};
pub use project_service::ProjectService;
pub use user_service::UserService;

use crate::config::AuthConfig;
use crate::repositories::Repositories;

/// All services bundled for `AppState`.
///
/// Each service holds Arc-backed repositories, so clones share state.
#[derive(Clone)]
pub struct Services {
    pub projects: ProjectService,
    pub auth: AuthService,
    pub users: UserService,
}

impl Services {
    /// Wires each service to the repositories it needs.
    pub fn new(repos: Repositories, auth_config: AuthConfig) -> Self {
        Self {
            projects: ProjectService::new(repos.projects, repos.organizations),
            auth: AuthService::new(repos.access_tokens, repos.applications, auth_config),
            users: UserService::new(repos.users),
        }
    }
}
