use crate::common::{TestApp, routes};
use serde_json::json;

async fn create_tag(app: &TestApp, token: &str, name: &str, slug: &str) -> i32 {
    let res = app
        .post_with_token(routes::TAGS, &json!({"name": name, "slug": slug}), token)
        .await;
    assert_eq!(res.status, 201, "create_tag failed: {}", res.text);
    res.id()
}

#[tokio::test]
async fn create_list_and_count_questions() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;

    let arrays = create_tag(&app, &token, "Arrays", "arrays").await;
    create_tag(&app, &token, "Graphs", "graphs").await;

    let q1 = app.create_question(&token, "Two Sum", "two-sum").await;
    let q2 = app.create_question(&token, "Three Sum", "three-sum").await;
    for q in [q1, q2] {
        let res = app
            .post_with_token(&routes::question_tag(q, arrays), &json!({}), &token)
            .await;
        assert_eq!(res.status, 204, "assign failed: {}", res.text);
    }

    let res = app.get_with_token(routes::TAGS, &token).await;
    assert_eq!(res.status, 200);
    let tags = res.body.as_array().unwrap();
    assert_eq!(tags.len(), 2);
    // Alphabetical: Arrays first.
    assert_eq!(tags[0]["name"], "Arrays");
    assert_eq!(tags[0]["question_count"], 2);
    assert_eq!(tags[1]["question_count"], 0);
}

#[tokio::test]
async fn tag_detail_lists_its_questions() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let tag_id = create_tag(&app, &token, "Arrays", "arrays").await;
    let q = app.create_question(&token, "Two Sum", "two-sum").await;
    app.post_with_token(&routes::question_tag(q, tag_id), &json!({}), &token)
        .await;

    let res = app.get_with_token(&routes::tag(tag_id), &token).await;

    assert_eq!(res.status, 200);
    let questions = res.body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["title"], "Two Sum");
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    create_tag(&app, &token, "Arrays", "arrays").await;

    let res = app
        .post_with_token(routes::TAGS, &json!({"name": "Other", "slug": "arrays"}), &token)
        .await;

    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn assignment_is_idempotent() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let tag_id = create_tag(&app, &token, "Arrays", "arrays").await;
    let q = app.create_question(&token, "Two Sum", "two-sum").await;

    for _ in 0..2 {
        let res = app
            .post_with_token(&routes::question_tag(q, tag_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 204);
    }

    let res = app.get_with_token(routes::TAGS, &token).await;
    assert_eq!(res.body.as_array().unwrap()[0]["question_count"], 1);
}

#[tokio::test]
async fn update_and_delete() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let tag_id = create_tag(&app, &token, "Arrays", "arrays").await;
    let q = app.create_question(&token, "Two Sum", "two-sum").await;
    app.post_with_token(&routes::question_tag(q, tag_id), &json!({}), &token)
        .await;

    let res = app
        .patch_with_token(&routes::tag(tag_id), &json!({"name": "Array Tricks"}), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["name"], "Array Tricks");

    let res = app.delete_with_token(&routes::tag(tag_id), &token).await;
    assert_eq!(res.status, 204);

    let res = app.get_with_token(&routes::tag(tag_id), &token).await;
    assert_eq!(res.status, 404);

    // The question survives; only the assignment is gone.
    let res = app.get_with_token(&routes::question(q), &token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["tags"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn assigning_unknown_tag_is_404() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("setter", "pass1234").await;
    let q = app.create_question(&token, "Two Sum", "two-sum").await;

    let res = app
        .post_with_token(&routes::question_tag(q, 999), &json!({}), &token)
        .await;

    assert_eq!(res.status, 404);
}
