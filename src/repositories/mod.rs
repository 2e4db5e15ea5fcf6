//! Data access, one repository per aggregate. All SQL lives below this
//! line; services above it speak in models and errors.

mod access_token_repo;
mod application_repo;
mod organization_repo;
mod project_repo;
mod user_repo;

pub use access_token_repo::AccessTokenRepository;
pub use application_repo::ApplicationRepository;
pub use organization_repo::OrganizationRepository;
pub use project_repo::ProjectRepository;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// All repositories over one shared pool.
///
/// `AsyncDbPool` clones hand out the same pool, so this derives `Clone`.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub organizations: OrganizationRepository,
    pub projects: ProjectRepository,
    pub applications: ApplicationRepository,
    pub access_tokens: AccessTokenRepository,
}

impl Repositories {
    /// Hands each repository its own handle to `pool`.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            organizations: OrganizationRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            applications: ApplicationRepository::new(pool.clone()),
            access_tokens: AccessTokenRepository::new(pool),
        }
    }
}
