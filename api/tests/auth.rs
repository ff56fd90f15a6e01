use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::common::{run_app_test, PASSWORD};

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    run_app_test(|app| async move {
        let response = app.client.get("projects").send().await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bad_token = app
            .client
            .clone_with_token("not-a-session".to_string())
            .get("auth/me")
            .send()
            .await?;
        assert_eq!(bad_token.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn sign_up_validation_names_the_field() {
    run_app_test(|app| async move {
        let response = app
            .client
            .post("auth/sign_up")
            .json(&json!({ "email": "weak@example.com", "password": "short", "role": "client" }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await?;
        assert_eq!(body["error"]["kind"], "validation");
        assert_eq!(body["error"]["field"], "password");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn session_lifecycle() {
    run_app_test(|app| async move {
        let user = app.add_user("owner@example.com", "client").await?;

        let me: Value = user.client.get("auth/me").send().await?.json().await?;
        assert_eq!(me["email"], "owner@example.com");
        assert_eq!(me["role"], "client");
        assert_eq!(me["id"], user.user_id.as_str());

        let duplicate = app
            .client
            .post("auth/sign_up")
            .json(&json!({ "email": "OWNER@example.com", "password": PASSWORD, "role": "client" }))
            .send()
            .await?;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let wrong = app
            .client
            .post("auth/sign_in")
            .json(&json!({ "email": "owner@example.com", "password": "Wrong2024x" }))
            .send()
            .await?;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let signed_out = user.client.post("auth/sign_out").send().await?;
        assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);

        let after = user.client.get("auth/me").send().await?;
        assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    })
    .await
}
