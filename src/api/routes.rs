//! Route registration and the middleware stack.
//!
//! Everything under `/api` sits behind bearer authentication; the health
//! probes and the Swagger UI stay open.

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Assembles the application router.
///
/// `.layer` wraps the stack from the inside out, so the calls below read
/// bottom-up on the request path: CORS answers preflight before anything
/// else, then compression, then the request ID is assigned so the logging
/// span can pick it up, and the error handler runs closest to the handlers
/// where it rewrites plain-text rejections as JSON.
///
/// Routes:
/// - `/api/projects` - project CRUD, bearer token required
/// - `/health`, `/health/ready`, `/health/live` - probes
/// - `/swagger-ui`, `/api-docs/openapi.json` - interactive documentation
pub fn create_router(state: AppState) -> Router {
    let protected = OpenApiRouter::new()
        .nest("/api/projects", handlers::projects::project_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(protected)
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        // Later layers sit further out, so request_id wraps logging and
        // the span sees the ID it assigned
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    //! End-to-end tests driving the full router over a real database.
    //!
    //! Set `TEST_DATABASE_URL` to a PostgreSQL instance to run these; each
    //! test skips when it is unset. Every test creates its own users and
    //! organizations, so the tests neither interfere with each other nor
    //! depend on existing rows.

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tokio::sync::OnceCell;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::create_router;
    use crate::config::settings::{AuthConfig, DatabaseConfig};
    use crate::db::establish_async_connection_pool;
    use crate::models::{
        ClientType, GrantType, NewAccessToken, NewOrganization, NewProject, NewUser, Organization,
        Project, User,
    };
    use crate::repositories::Repositories;
    use crate::state::AppState;
    use crate::utils::generate_token;

    static MIGRATED: OnceCell<()> = OnceCell::const_new();

    struct TestApp {
        state: AppState,
        router: axum::Router,
        repos: Repositories,
    }

    /// Builds a router over the test database, or `None` when
    /// `TEST_DATABASE_URL` is not set.
    async fn spawn_app() -> Option<TestApp> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        MIGRATED
            .get_or_init(|| {
                let url = url.clone();
                async move {
                    crate::db::run_pending_migrations(&url)
                        .await
                        .expect("test database migrations should apply");
                }
            })
            .await;

        let db_config = DatabaseConfig {
            url,
            max_connections: 5,
            min_connections: 1,
            connection_timeout: 5,
            auto_migrate: false,
        };
        let pool = establish_async_connection_pool(&db_config)
            .await
            .expect("test database pool");

        let repos = Repositories::new(pool.clone());
        let state = AppState::new(pool, AuthConfig::default());
        let router = create_router(state.clone());

        Some(TestApp {
            state,
            router,
            repos,
        })
    }

    fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, generate_token(12))
    }

    impl TestApp {
        async fn user(&self) -> User {
            let username = unique("user");
            self.state
                .services
                .users
                .create_user(NewUser {
                    email: format!("{username}@example.com"),
                    username,
                    password: "correct horse battery staple".to_string(),
                })
                .await
                .expect("user fixture")
        }

        async fn org(&self) -> Organization {
            self.repos
                .organizations
                .create(NewOrganization {
                    name: unique("org"),
                })
                .await
                .expect("organization fixture")
        }

        async fn org_with_member(&self, user_id: i32) -> Organization {
            let org = self.org().await;
            self.repos
                .organizations
                .add_member(org.organization_id, user_id)
                .await
                .expect("membership fixture");
            org
        }

        /// A fresh user, an organization they belong to, and a valid token.
        async fn member_of_new_org(&self) -> (User, Organization, String) {
            let user = self.user().await;
            let org = self.org_with_member(user.id).await;
            let token = self.token_for(user.id).await;
            (user, org, token)
        }

        async fn token_for(&self, user_id: i32) -> String {
            self.state
                .services
                .auth
                .issue_token(user_id, None, None)
                .await
                .expect("token fixture")
                .token
        }

        async fn project_in(&self, org_id: Uuid) -> Project {
            self.repos
                .projects
                .create(NewProject {
                    name: unique("project"),
                    script: None,
                    organization_id: org_id,
                })
                .await
                .expect("project fixture")
        }

        async fn request(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .expect("request"),
                None => builder.body(Body::empty()).expect("request"),
            };

            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router response");

            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("response body");
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            (status, value)
        }
    }

    fn body_keys(value: &Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .expect("object body")
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    macro_rules! require_test_db {
        () => {
            match spawn_app().await {
                Some(app) => app,
                None => {
                    eprintln!("TEST_DATABASE_URL not set, skipping");
                    return;
                }
            }
        };
    }

    #[tokio::test]
    async fn test_requests_without_valid_token_are_rejected() {
        let app = require_test_db!();

        let (status, body) = app.request(Method::GET, "/api/projects", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = app
            .request(
                Method::GET,
                "/api/projects",
                Some("definitely-not-a-token"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let app = require_test_db!();

        let user = app.user().await;
        let expired = NewAccessToken {
            token: generate_token(30),
            user_id: user.id,
            application_id: None,
            expires: Utc::now().naive_utc() - Duration::hours(1),
            scope: "read write".to_string(),
        };
        let token = app
            .repos
            .access_tokens
            .create(expired)
            .await
            .expect("expired token fixture");

        let (status, body) = app
            .request(Method::GET, "/api/projects", Some(&token.token), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access token has expired");
    }

    #[tokio::test]
    async fn test_created_users_store_hashed_passwords() {
        let app = require_test_db!();

        let user = app.user().await;

        let fetched = app
            .state
            .services
            .users
            .get_user(user.id)
            .await
            .expect("user lookup by id");
        assert_ne!(fetched.password, "correct horse battery staple");
        assert!(
            crate::utils::verify_password("correct horse battery staple", &fetched.password)
                .expect("stored hash parses")
        );

        let by_username = app
            .state
            .services
            .users
            .get_user_by_username(&user.username)
            .await
            .expect("user lookup by username");
        assert_eq!(by_username.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_list_returns_only_projects_in_callers_organizations() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;
        let mine = app.project_in(org.organization_id).await;

        let other_org = app.org().await;
        let _foreign = app.project_in(other_org.organization_id).await;

        let (status, body) = app
            .request(Method::GET, "/api/projects", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().expect("array body");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["project_id"], mine.project_id.to_string());

        // The trailing-slash form routes to the same listing
        let (status, with_slash) = app
            .request(Method::GET, "/api/projects/", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(with_slash, body);
    }

    #[tokio::test]
    async fn test_list_is_empty_for_user_without_organizations() {
        let app = require_test_db!();

        let user = app.user().await;
        let token = app.token_for(user.id).await;

        let (status, body) = app
            .request(Method::GET, "/api/projects", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_project_in_own_organization() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;

        let (status, body) = app
            .request(
                Method::POST,
                "/api/projects",
                Some(&token),
                Some(json!({
                    "name": "deploy pipeline",
                    "organization_id": org.organization_id,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body_keys(&body),
            ["name", "organization_id", "project_id", "script"]
        );
        assert_eq!(body["name"], "deploy pipeline");
        assert_eq!(body["organization_id"], org.organization_id.to_string());
        assert!(body["script"].is_null());

        let id = body["project_id"].as_str().expect("project id");
        let (status, fetched) = app
            .request(
                Method::GET,
                &format!("/api/projects/{id}"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "deploy pipeline");
    }

    #[tokio::test]
    async fn test_create_in_foreign_organization_is_forbidden() {
        let app = require_test_db!();

        let user = app.user().await;
        let token = app.token_for(user.id).await;
        let foreign_org = app.org().await;

        let (status, body) = app
            .request(
                Method::POST,
                "/api/projects",
                Some(&token),
                Some(json!({
                    "name": "intruder",
                    "organization_id": foreign_org.organization_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_create_in_unknown_organization_is_rejected() {
        let app = require_test_db!();

        let user = app.user().await;
        let token = app.token_for(user.id).await;

        let (status, body) = app
            .request(
                Method::POST,
                "/api/projects",
                Some(&token),
                Some(json!({
                    "name": "orphan",
                    "organization_id": Uuid::new_v4(),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_with_blank_name_is_rejected() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;

        let (status, body) = app
            .request(
                Method::POST,
                "/api/projects",
                Some(&token),
                Some(json!({
                    "name": "",
                    "organization_id": org.organization_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_detail_is_not_found_for_non_members() {
        let app = require_test_db!();

        let (_owner, org, _owner_token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;

        let outsider = app.user().await;
        let outsider_token = app.token_for(outsider.id).await;

        let uri = format!("/api/projects/{}", project.project_id);
        let (status, body) = app
            .request(Method::GET, &uri, Some(&outsider_token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_project_membership_alone_does_not_grant_access() {
        let app = require_test_db!();

        let (_owner, org, _owner_token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;

        // On the project's member list, but not in its organization
        let outsider = app.user().await;
        app.repos
            .projects
            .add_member(project.project_id, outsider.id)
            .await
            .expect("project membership fixture");
        let outsider_token = app.token_for(outsider.id).await;

        let uri = format!("/api/projects/{}", project.project_id);
        let (status, _) = app
            .request(Method::GET, &uri, Some(&outsider_token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .request(Method::GET, "/api/projects", Some(&outsider_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_put_replaces_fields_and_keeps_omitted_script() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;
        let project = app
            .repos
            .projects
            .create(NewProject {
                name: unique("project"),
                script: Some("echo hello".to_string()),
                organization_id: org.organization_id,
            })
            .await
            .expect("project fixture");

        let uri = format!("/api/projects/{}", project.project_id);

        // Script omitted from the body keeps the stored value
        let (status, body) = app
            .request(
                Method::PUT,
                &uri,
                Some(&token),
                Some(json!({
                    "name": "renamed",
                    "organization_id": org.organization_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "renamed");
        assert_eq!(body["script"], "echo hello");

        // An explicit empty string clears it
        let (status, body) = app
            .request(
                Method::PUT,
                &uri,
                Some(&token),
                Some(json!({
                    "name": "renamed",
                    "organization_id": org.organization_id,
                    "script": "",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script"], "");
    }

    #[tokio::test]
    async fn test_put_is_not_found_for_non_members() {
        let app = require_test_db!();

        let (_owner, org, _owner_token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;

        let outsider = app.user().await;
        let outsider_token = app.token_for(outsider.id).await;

        let uri = format!("/api/projects/{}", project.project_id);
        let (status, _) = app
            .request(
                Method::PUT,
                &uri,
                Some(&outsider_token),
                Some(json!({
                    "name": "hijack",
                    "organization_id": org.organization_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_moving_project_requires_membership_in_target_organization() {
        let app = require_test_db!();

        let (user, org, token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;
        let uri = format!("/api/projects/{}", project.project_id);

        // Target organization the caller does not belong to
        let foreign = app.org().await;
        let (status, _) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({ "organization_id": foreign.organization_id })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Unknown target organization
        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({ "organization_id": Uuid::new_v4() })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        // Moving into a second organization the caller also belongs to works
        let second = app.org_with_member(user.id).await;
        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({ "organization_id": second.organization_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["organization_id"], second.organization_id.to_string());
    }

    #[tokio::test]
    async fn test_patch_updates_only_supplied_fields() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;
        let uri = format!("/api/projects/{}", project.project_id);

        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({ "script": "make test" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script"], "make test");
        assert_eq!(body["name"], project.name);

        // An empty body is a no-op that still returns the project
        let (status, body) = app
            .request(Method::PATCH, &uri, Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script"], "make test");
    }

    #[tokio::test]
    async fn test_delete_removes_project_for_members_only() {
        let app = require_test_db!();

        let (_user, org, token) = app.member_of_new_org().await;
        let project = app.project_in(org.organization_id).await;
        let uri = format!("/api/projects/{}", project.project_id);

        // Outsiders get 404 and the row stays
        let outsider = app.user().await;
        let outsider_token = app.token_for(outsider.id).await;
        let (status, _) = app
            .request(Method::DELETE, &uri, Some(&outsider_token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.request(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        // Members delete with an empty 204
        let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, _) = app.request(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_application_issued_tokens_authenticate() {
        let app = require_test_db!();

        let user = app.user().await;
        let (application, secret) = app
            .state
            .services
            .auth
            .register_application(
                &unique("ci-runner"),
                Some(user.id),
                ClientType::Confidential,
                GrantType::ClientCredentials,
            )
            .await
            .expect("application fixture");

        // Only the plain secret returned at registration validates
        app.state
            .services
            .auth
            .authenticate_client(&application.client_id, &secret)
            .await
            .expect("client credentials should validate");
        let rejected = app
            .state
            .services
            .auth
            .authenticate_client(&application.client_id, "wrong-secret")
            .await;
        assert!(rejected.is_err());

        // Tokens issued through the application work like user tokens
        let token = app
            .state
            .services
            .auth
            .issue_token(user.id, Some(application.id), Some("read"))
            .await
            .expect("application token fixture")
            .token;

        let auth_user = app
            .state
            .services
            .auth
            .authenticate_token(&token)
            .await
            .expect("application token should authenticate");
        assert_eq!(auth_user.scopes, vec!["read"]);

        let (status, body) = app
            .request(Method::GET, "/api/projects", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_project_id_is_a_bad_request() {
        let app = require_test_db!();

        let (_user, _org, token) = app.member_of_new_org().await;

        let (status, body) = app
            .request(Method::GET, "/api/projects/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}
