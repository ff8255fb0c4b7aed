use crate::common::{TestApp, routes};
use serde_json::json;

fn question_body(slug: &str, title: &str, difficulty: &str) -> serde_json::Value {
    json!({
        "slug": slug,
        "title": title,
        "difficulty": difficulty,
        "description_md": "## Statement\nDo the thing.",
        "constraints_md": "1 <= n <= 10^5",
    })
}

mod question_crud {
    use super::*;

    #[tokio::test]
    async fn create_and_fetch_question_with_statement() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;

        let res = app
            .post_with_token(
                routes::QUESTIONS,
                &question_body("two-sum", "Two Sum", "easy"),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "create failed: {}", res.text);
        let id = res.id();

        let res = app.get_with_token(&routes::question(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["slug"], "two-sum");
        assert_eq!(res.body["difficulty"], "easy");
        assert_eq!(res.body["body"]["description_md"], "## Statement\nDo the thing.");
        assert_eq!(res.body["body"]["constraints_md"], "1 <= n <= 10^5");
        assert_eq!(res.body["editorial"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;

        app.create_question(&token, "Two Sum", "two-sum").await;
        let res = app
            .post_with_token(
                routes::QUESTIONS,
                &question_body("two-sum", "Other", "hard"),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn invalid_slug_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;

        let res = app
            .post_with_token(
                routes::QUESTIONS,
                &question_body("Two Sum!", "Two Sum", "easy"),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn patch_updates_only_provided_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        let res = app
            .patch_with_token(
                &routes::question(id),
                &json!({"difficulty": "hard", "acceptance_rate": 12.5}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "patch failed: {}", res.text);
        assert_eq!(res.body["difficulty"], "hard");
        assert_eq!(res.body["acceptance_rate"], 12.5);
        assert_eq!(res.body["title"], "Two Sum");
    }

    #[tokio::test]
    async fn patch_can_null_out_a_nullable_field() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        app.patch_with_token(&routes::question(id), &json!({"acceptance_rate": 44.0}), &token)
            .await;
        let res = app
            .patch_with_token(&routes::question(id), &json!({"acceptance_rate": null}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["acceptance_rate"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn delete_cascades_to_test_cases_and_submissions() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;
        app.add_test_cases(id, &token, &[("1 2", "3")]).await;
        let res = app.submit(id, &token, "#!sum").await;
        assert_eq!(res.status, 201);

        let res = app.delete_with_token(&routes::question(id), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::question(id), &token).await;
        assert_eq!(res.status, 404);

        let res = app.get_with_token(routes::SUBMISSIONS, &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::QUESTIONS, &question_body("two-sum", "Two Sum", "easy"))
            .await;

        assert_eq!(res.status, 401);
    }
}

mod question_listing {
    use super::*;

    async fn seed_catalog(app: &TestApp, token: &str) {
        for (slug, title, difficulty) in [
            ("two-sum", "Two Sum", "easy"),
            ("three-sum", "Three Sum", "medium"),
            ("n-queens", "N Queens", "hard"),
        ] {
            let res = app
                .post_with_token(routes::QUESTIONS, &question_body(slug, title, difficulty), token)
                .await;
            assert_eq!(res.status, 201);
        }
    }

    #[tokio::test]
    async fn filters_by_difficulty() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        seed_catalog(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?difficulty=medium", routes::QUESTIONS), &token)
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["slug"], "three-sum");
    }

    #[tokio::test]
    async fn searches_title_case_insensitively() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        seed_catalog(&app, &token).await;

        let res = app
            .get_with_token(&format!("{}?search=SUM", routes::QUESTIONS), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn paginates_with_metadata() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        seed_catalog(&app, &token).await;

        let res = app
            .get_with_token(
                &format!("{}?page=2&per_page=2&sort_by=title&sort_order=asc", routes::QUESTIONS),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_sort_field() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;

        let res = app
            .get_with_token(&format!("{}?sort_by=id", routes::QUESTIONS), &token)
            .await;

        assert_eq!(res.status, 400);
    }
}

mod test_cases {
    use super::*;

    #[tokio::test]
    async fn bulk_create_and_list() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        let res = app
            .post_with_token(
                &routes::test_cases(id),
                &json!({"test_cases": [
                    {"input": "1 2", "expected_output": "3", "is_public": true},
                    {"input": "5 5", "expected_output": "10"},
                ]}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "bulk create failed: {}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = app.get_with_token(&routes::test_cases(id), &token).await;
        assert_eq!(res.status, 200);
        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["input"], "1 2");
        assert_eq!(listed[0]["is_public"], true);
        assert_eq!(listed[1]["is_public"], false);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        let res = app
            .post_with_token(&routes::test_cases(id), &json!({"test_cases": []}), &token)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn only_public_cases_appear_as_samples() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        app.post_with_token(
            &routes::test_cases(id),
            &json!({"test_cases": [
                {"input": "1 2", "expected_output": "3", "is_public": true},
                {"input": "5 5", "expected_output": "10", "is_public": false},
            ]}),
            &token,
        )
        .await;

        let res = app.get_with_token(&routes::question(id), &token).await;
        let samples = res.body["sample_test_cases"].as_array().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0]["input"], "1 2");
        assert_eq!(samples[0]["output"], "3");
    }

    #[tokio::test]
    async fn delete_checks_question_ownership() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let q1 = app.create_question(&token, "Two Sum", "two-sum").await;
        let q2 = app.create_question(&token, "Three Sum", "three-sum").await;
        app.add_test_cases(q1, &token, &[("1 2", "3")]).await;

        let cases = app.get_with_token(&routes::test_cases(q1), &token).await;
        let tc_id = cases.body[0]["id"].as_i64().unwrap() as i32;

        // Deleting through the wrong question 404s.
        let res = app
            .delete_with_token(&routes::test_case(q2, tc_id), &token)
            .await;
        assert_eq!(res.status, 404);

        let res = app
            .delete_with_token(&routes::test_case(q1, tc_id), &token)
            .await;
        assert_eq!(res.status, 204);
    }
}

mod editorial {
    use super::*;

    #[tokio::test]
    async fn put_creates_then_replaces() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        let res = app
            .put_with_token(
                &routes::editorial(id),
                &json!({"content_md": "Use a hash map.", "video_url": "https://videos.example.com/1"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "editorial create failed: {}", res.text);

        let res = app
            .put_with_token(&routes::editorial(id), &json!({"content_md": "Sort first."}), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["content_md"], "Sort first.");
        assert_eq!(res.body["video_url"], serde_json::Value::Null);

        let res = app.get_with_token(&routes::editorial(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["content_md"], "Sort first.");
    }

    #[tokio::test]
    async fn missing_editorial_is_404() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("setter", "pass1234").await;
        let id = app.create_question(&token, "Two Sum", "two-sum").await;

        let res = app.get_with_token(&routes::editorial(id), &token).await;

        assert_eq!(res.status, 404);
    }
}
