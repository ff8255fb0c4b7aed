pub mod cache;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod grading;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use axum::{Json, routing::get};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crucible Coding Judge API",
        version = "1.0.0",
        description = "API for the Crucible coding-judge platform"
    ),
    paths(
        handlers::question::create_question,
        handlers::question::list_questions,
        handlers::question::get_question,
        handlers::question::update_question,
        handlers::question::delete_question,
        handlers::question::create_test_cases,
        handlers::question::list_test_cases,
        handlers::question::delete_test_case,
        handlers::submission::create_submission,
        handlers::submission::list_my_submissions,
        handlers::submission::get_submission,
        handlers::submission::list_question_submissions,
    ),
    tags(
        (name = "Questions", description = "Question catalog CRUD"),
        (name = "Test Cases", description = "Test case management for questions"),
        (name = "Submissions", description = "Code submission and grading"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();

    axum::Router::new()
        .route("/health", get(health))
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
