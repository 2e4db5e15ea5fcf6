mod oauth;
mod organization;
mod project;
mod user;

pub use oauth::{
    AccessToken, Application, ClientType, GrantType, NewAccessToken, NewApplication,
};
pub use organization::{NewOrganization, Organization, OrganizationUser};
pub use project::{NewProject, Project, ProjectMember, UpdateProject};
pub use user::{NewUser, User};
