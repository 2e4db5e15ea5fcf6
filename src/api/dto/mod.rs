//! Wire types for request and response bodies. Everything the API
//! serializes lives here rather than on the database models.

mod error;
mod project;

pub use error::ErrorResponse;
pub use project::{
    CreateProjectRequest, PatchProjectRequest, ProjectResponse, UpdateProjectRequest,
};
