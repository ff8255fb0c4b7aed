use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/questions", question_routes())
        .nest("/submissions", submission_routes())
        .nest("/tags", tag_routes())
        .nest("/companies", company_routes())
        .nest("/users", user_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn question_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::question::list_questions).post(handlers::question::create_question),
        )
        .route(
            "/{id}",
            get(handlers::question::get_question)
                .patch(handlers::question::update_question)
                .delete(handlers::question::delete_question),
        )
        .nest("/{id}/test-cases", test_case_routes())
        .route(
            "/{id}/editorial",
            get(handlers::question::get_editorial).put(handlers::question::put_editorial),
        )
        .route(
            "/{id}/tags/{tag_id}",
            post(handlers::question::assign_tag).delete(handlers::question::unassign_tag),
        )
        .route(
            "/{id}/companies/{company_id}",
            post(handlers::question::assign_company)
                .delete(handlers::question::unassign_company),
        )
        .route(
            "/{id}/submissions",
            get(handlers::submission::list_question_submissions)
                .post(handlers::submission::create_submission),
        )
}

fn test_case_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::question::list_test_cases).post(handlers::question::create_test_cases),
        )
        .route("/{tc_id}", delete(handlers::question::delete_test_case))
}

fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::submission::list_my_submissions))
        .route("/{id}", get(handlers::submission::get_submission))
}

fn tag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::tag::list_tags).post(handlers::tag::create_tag),
        )
        .route(
            "/{id}",
            get(handlers::tag::get_tag)
                .patch(handlers::tag::update_tag)
                .delete(handlers::tag::delete_tag),
        )
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::company::list_companies).post(handlers::company::create_company),
        )
        .route("/slug/{slug}", get(handlers::company::get_company_by_slug))
        .route(
            "/{id}",
            get(handlers::company::get_company)
                .patch(handlers::company::update_company)
                .delete(handlers::company::delete_company),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/{id}/dashboard", get(handlers::user::get_dashboard))
        .route("/{id}/activity", get(handlers::user::get_activity))
}
