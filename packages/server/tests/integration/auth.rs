use serde_json::json;

use crate::common::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, TestResponse, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn configured_account_can_login_and_receives_token() {
        let app = TestApp::spawn().await;

        let res = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].is_string());
        assert!(res.body["user_id"].is_number());
        assert_eq!(res.body["username"], "admin");
        assert_eq!(res.body["role"], "admin");
    }

    #[tokio::test]
    async fn non_admin_account_receives_user_role() {
        let app = TestApp::spawn().await;

        let res = app.login("meera", "family@123").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["role"], "user");
    }

    #[tokio::test]
    async fn repeated_logins_reuse_the_same_user_record() {
        let app = TestApp::spawn().await;

        let first = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        let second = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        assert_eq!(first.body["user_id"], second.body["user_id"]);
    }

    #[tokio::test]
    async fn cannot_login_with_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app.login(ADMIN_USERNAME, "wrongpass").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn cannot_login_with_unknown_username() {
        let app = TestApp::spawn().await;

        let res = app.login("nobody", "whatever").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn cannot_login_with_empty_username() {
        let app = TestApp::spawn().await;

        let res = app.login("   ", "whatever").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn cannot_login_with_empty_password() {
        let app = TestApp::spawn().await;

        let res = app.login(ADMIN_USERNAME, "").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION");
    }
}

mod request_validation {
    use super::*;

    #[tokio::test]
    async fn malformed_json_body_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::LOGIN))
            .header("Content-Type", "application/json")
            .body("not valid json")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn missing_required_fields_returns_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"username": "admin"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION");
    }
}

mod authenticated_access {
    use super::*;

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::DOCUMENTS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn request_with_malformed_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::DOCUMENTS, "not-a-valid-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn request_with_non_bearer_auth_scheme_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::DOCUMENTS))
            .header("Authorization", "Basic abc123")
            .send()
            .await
            .expect("Failed to send request");

        let res = TestResponse::from_response(res).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_signed_with_wrong_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let forged =
            server::utils::jwt::sign(1, "admin", "admin", "some-other-secret", 24).unwrap();

        let res = app.get_with_token(routes::DOCUMENTS, &forged).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
