//! Integration tests for the admin dashboard endpoints.

mod common;

use axum::http::StatusCode;
use beehive_api::auth::password::hash_secret;
use beehive_core::roles::{ROLE_ADMIN, ROLE_USER};
use beehive_db::models::account::CreateAccount;
use beehive_db::repositories::AccountRepo;
use common::{body_json, get_auth, post_json, post_json_auth, put_json_auth};
use sqlx::PgPool;

const PASSWORD: &str = "test_password_123!";

async fn account_with_token(pool: &PgPool, username: &str, role: &str) -> (i64, String) {
    let input = CreateAccount {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: Some(hash_secret(PASSWORD).expect("hashing should succeed")),
        external_id: None,
        role: role.to_string(),
        first_name: None,
        last_name: None,
        security_question: None,
        security_answer_hash: None,
    };
    let account = AccountRepo::create(pool, &input)
        .await
        .expect("account creation should succeed");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "username": username, "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    (account.id, token)
}

/// Listing users returns the safe representation, never credential hashes.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users(pool: PgPool) {
    let (_admin_id, admin_token) = account_with_token(&pool, "overseer", ROLE_ADMIN).await;
    let (_user_id, _) = account_with_token(&pool, "somebody", ROLE_USER).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &admin_token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user.get("security_answer_hash").is_none());
    }
}

/// Role updates validate the role name and 404 on unknown accounts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_role(pool: PgPool) {
    let (_admin_id, admin_token) = account_with_token(&pool, "overseer", ROLE_ADMIN).await;
    let (user_id, _) = account_with_token(&pool, "promotee", ROLE_USER).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "role": "admin" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{user_id}/role"),
        body,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["role"], "admin");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "role": "superuser" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{user_id}/role"),
        body,
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "role": "user" });
    let response =
        put_json_auth(app, "/api/v1/admin/users/999999/role", body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// An admin can inspect any user's uploads.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_media(pool: PgPool) {
    let (_admin_id, admin_token) = account_with_token(&pool, "overseer", ROLE_ADMIN).await;
    let (user_id, user_token) = account_with_token(&pool, "uploader", ROLE_USER).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "filename": "clip.mp4",
        "title": "a clip",
        "description": "a description"
    });
    let response = post_json_auth(app, "/api/v1/media", body, &user_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/admin/users/{user_id}/media"),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["title"], "a clip");
}

/// Uploads raise notifications; `?mark_seen=true` consumes the batch in one
/// atomic statement, so the next poll sees nothing.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_notifications_mark_seen(pool: PgPool) {
    let (_admin_id, admin_token) = account_with_token(&pool, "overseer", ROLE_ADMIN).await;
    let (_user_id, user_token) = account_with_token(&pool, "uploader", ROLE_USER).await;

    for title in ["one", "two"] {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({
            "filename": format!("{title}.mp4"),
            "title": title,
            "description": "a description"
        });
        let response = post_json_auth(app, "/api/v1/media", body, &user_token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Peek without consuming.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/notifications", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let peeked = body_json(response).await;
    assert_eq!(peeked.as_array().unwrap().len(), 2);

    // Consume.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        "/api/v1/admin/notifications?mark_seen=true",
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let consumed = body_json(response).await;
    let consumed = consumed.as_array().unwrap();
    assert_eq!(consumed.len(), 2);
    assert_eq!(consumed[0]["username"], "uploader");

    // The batch is gone.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/notifications", &admin_token).await;
    let after = body_json(response).await;
    assert!(after.as_array().unwrap().is_empty());
}

/// Admin endpoints are closed to plain users.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_routes_forbidden_for_users(pool: PgPool) {
    let (user_id, user_token) = account_with_token(&pool, "plainbee", ROLE_USER).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/admin/notifications", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "role": "admin" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{user_id}/role"),
        body,
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
