use crate::common::{TestApp, routes};
use serde_json::json;

mod profile {
    use super::*;

    #[tokio::test]
    async fn get_update_own_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;

        let res = app.get_with_token(&routes::user(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "alice");

        let res = app
            .patch_with_token(&routes::user(id), &json!({"email": "new@example.com"}), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["email"], "new@example.com");
    }

    #[tokio::test]
    async fn cannot_update_someone_else() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "pass1234").await;
        let alice_id = app.user_id(&alice).await;
        let bob = app.create_authenticated_user("bob", "pass1234").await;

        let res = app
            .patch_with_token(&routes::user(alice_id), &json!({"username": "hacked"}), &bob)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn delete_removes_submissions_and_progress() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;
        let q = app.create_question(&token, "Sum", "sum").await;
        app.add_test_cases(q, &token, &[("1 2", "3")]).await;
        let res = app.submit(q, &token, "#!sum").await;
        assert_eq!(res.status, 201);

        let res = app.delete_with_token(&routes::user(id), &token).await;
        assert_eq!(res.status, 204);

        assert!(app.progress_row(id, q).await.is_none());
        let res = app.get_with_token(&routes::user(id), &token).await;
        assert_eq!(res.status, 404);
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn empty_dashboard_for_fresh_user() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;

        let res = app.get_with_token(&routes::user_dashboard(id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["solved"], 0);
        assert_eq!(res.body["attempted"], 0);
        assert_eq!(res.body["tags"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn counts_statuses_difficulties_tags_and_companies() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;

        // Two questions: an easy one that gets solved, a hard one only attempted.
        let easy = app.create_question(&token, "Sum", "sum").await;
        app.add_test_cases(easy, &token, &[("1 2", "3")]).await;
        let hard = app
            .post_with_token(
                routes::QUESTIONS,
                &json!({
                    "slug": "n-queens",
                    "title": "N Queens",
                    "difficulty": "hard",
                    "description_md": "Place queens.",
                }),
                &token,
            )
            .await
            .id();
        app.add_test_cases(hard, &token, &[("8", "92")]).await;

        // Tag and company attached to the solved question.
        let tag = app
            .post_with_token(routes::TAGS, &json!({"name": "Math", "slug": "math"}), &token)
            .await
            .id();
        app.post_with_token(&routes::question_tag(easy, tag), &json!({}), &token)
            .await;
        let company = app
            .post_with_token(
                routes::COMPANIES,
                &json!({"name": "Acme", "slug": "acme"}),
                &token,
            )
            .await
            .id();
        app.post_with_token(&routes::question_company(easy, company), &json!({}), &token)
            .await;

        let res = app.submit(easy, &token, "#!sum").await;
        assert_eq!(res.status, 201);
        let res = app.submit(hard, &token, "#!echo wrong").await;
        assert_eq!(res.status, 200);

        let res = app.get_with_token(&routes::user_dashboard(id), &token).await;

        assert_eq!(res.status, 200, "dashboard failed: {}", res.text);
        assert_eq!(res.body["solved"], 1);
        assert_eq!(res.body["attempted"], 1);
        assert_eq!(res.body["not_attempted"], 0);
        assert_eq!(res.body["difficulty"]["easy"], 1);
        assert_eq!(res.body["difficulty"]["hard"], 0);

        let tags = res.body["tags"].as_array().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0]["name"], "Math");
        assert_eq!(tags[0]["solved"], 1);

        let companies = res.body["companies"].as_array().unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0]["solved"], 1);
    }
}

mod activity {
    use super::*;

    #[tokio::test]
    async fn groups_submissions_by_day() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;
        let q = app.create_question(&token, "Sum", "sum").await;
        app.add_test_cases(q, &token, &[("1 2", "3")]).await;

        app.submit(q, &token, "#!sum").await;
        app.submit(q, &token, "#!echo nope").await;
        app.submit(q, &token, "#!sum").await;

        let res = app.get_with_token(&routes::user_activity(id), &token).await;

        assert_eq!(res.status, 200, "activity failed: {}", res.text);
        let days = res.body["submissions"].as_array().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0]["count"], 3);
    }

    #[tokio::test]
    async fn empty_for_user_without_submissions() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "pass1234").await;
        let id = app.user_id(&token).await;

        let res = app.get_with_token(&routes::user_activity(id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["submissions"].as_array().unwrap().len(), 0);
    }
}
