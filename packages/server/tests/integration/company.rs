use crate::common::{TestApp, routes};
use serde_json::json;

async fn create_company(app: &TestApp, token: &str, name: &str, slug: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::COMPANIES,
            &json!({"name": name, "slug": slug, "website": "https://example.com"}),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "create_company failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn list_is_paginated_and_alphabetical() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;

    create_company(&app, &token, "Zeta", "zeta").await;
    create_company(&app, &token, "Acme", "acme").await;
    create_company(&app, &token, "Mango", "mango").await;

    let res = app
        .get_with_token(&format!("{}?page=1&per_page=2", routes::COMPANIES), &token)
        .await;

    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Acme");
    assert_eq!(data[1]["name"], "Mango");
    assert_eq!(res.body["pagination"]["total"], 3);
    assert_eq!(res.body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn fetch_by_slug_includes_questions() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let company_id = create_company(&app, &token, "Acme", "acme").await;
    let q = app.create_question(&token, "Two Sum", "two-sum").await;

    let res = app
        .post_with_token(&routes::question_company(q, company_id), &json!({}), &token)
        .await;
    assert_eq!(res.status, 204);

    let res = app
        .get_with_token(&routes::company_by_slug("acme"), &token)
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "Acme");
    let questions = res.body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["title"], "Two Sum");
}

#[tokio::test]
async fn invalid_website_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;

    let res = app
        .post_with_token(
            routes::COMPANIES,
            &json!({"name": "Acme", "slug": "acme", "website": "acme dot com"}),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_and_delete() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let id = create_company(&app, &token, "Acme", "acme").await;

    let res = app
        .patch_with_token(&routes::company(id), &json!({"website": null}), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["website"], serde_json::Value::Null);

    let res = app.delete_with_token(&routes::company(id), &token).await;
    assert_eq!(res.status, 204);

    let res = app.get_with_token(&routes::company(id), &token).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    create_company(&app, &token, "Acme", "acme").await;

    let res = app
        .post_with_token(
            routes::COMPANIES,
            &json!({"name": "Acme Two", "slug": "acme"}),
            &token,
        )
        .await;

    assert_eq!(res.status, 409);
}
