//! Integration tests for upload metadata CRUD and the chat thread.

mod common;

use axum::http::StatusCode;
use beehive_api::auth::password::hash_secret;
use beehive_core::roles::{ROLE_ADMIN, ROLE_USER};
use beehive_db::models::account::CreateAccount;
use beehive_db::repositories::AccountRepo;
use common::{body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth};
use sqlx::PgPool;

const PASSWORD: &str = "test_password_123!";

/// Create an account and return its id plus a logged-in access token.
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

/// Record an upload and return its id.
async fn create_item(pool: &PgPool, token: &str, title: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "filename": format!("{title}.mp4"),
        "title": title,
        "description": "a description",
        "sentiment": "joyful"
    });
    let response = post_json_auth(app, "/api/v1/media", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create, list, edit, delete -- the full owner path.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_media_crud(pool: PgPool) {
    let (_id, token) = account_with_token(&pool, "uploader", ROLE_USER).await;

    let item_id = create_item(&pool, &token, "first-clip").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/media", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["title"], "first-clip");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "title": "renamed-clip" });
    let response = put_json_auth(app, &format!("/api/v1/media/{item_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "renamed-clip");
    assert_eq!(updated["description"], "a description");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/media/{item_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/media", &token).await;
    let items = body_json(response).await;
    assert!(items.as_array().unwrap().is_empty());
}

/// Empty title or description is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_media_create_validation(pool: PgPool) {
    let (_id, token) = account_with_token(&pool, "validator", ROLE_USER).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "filename": "clip.mp4",
        "title": "   ",
        "description": "a description"
    });
    let response = post_json_auth(app, "/api/v1/media", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// One user cannot touch another's items, and the response never reveals
/// that the item exists.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_media_is_owner_scoped(pool: PgPool) {
    let (_owner_id, owner_token) = account_with_token(&pool, "owner", ROLE_USER).await;
    let (_other_id, other_token) = account_with_token(&pool, "intruder", ROLE_USER).await;

    let item_id = create_item(&pool, &owner_token, "private-clip").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "title": "stolen" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/media/{item_id}"),
        body,
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/media/{item_id}"), &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/media", &owner_token).await;
    let items = body_json(response).await;
    assert_eq!(items[0]["title"], "private-clip");
}

/// Sending and reading the user<->admin thread.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_chat_thread(pool: PgPool) {
    let (user_id, user_token) = account_with_token(&pool, "chatter", ROLE_USER).await;
    let (admin_id, admin_token) = account_with_token(&pool, "helpdesk", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "to_account_id": admin_id, "content": "hello?" });
    let response = post_json_auth(app, "/api/v1/chat/messages", body, &user_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "to_account_id": user_id, "content": "hi there" });
    let response = post_json_auth(app, "/api/v1/chat/messages", body, &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/chat/messages", &user_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let thread = body_json(response).await;
    let thread = thread.as_array().unwrap();
    assert_eq!(thread.len(), 2);
    // Oldest first.
    assert_eq!(thread[0]["content"], "hello?");
    assert_eq!(thread[1]["content"], "hi there");

    // The admin sees the same thread.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/chat/messages", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let thread = body_json(response).await;
    let thread = thread.as_array().unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0]["content"], "hello?");
    assert_eq!(thread[1]["content"], "hi there");

    // Empty content is rejected.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "to_account_id": admin_id, "content": "  " });
    let response = post_json_auth(app, "/api/v1/chat/messages", body, &user_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// An admin who has not replied yet still sees incoming user messages.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_sees_incoming_messages(pool: PgPool) {
    let (_user_id, user_token) = account_with_token(&pool, "chatter", ROLE_USER).await;
    let (admin_id, admin_token) = account_with_token(&pool, "helpdesk", ROLE_ADMIN).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "to_account_id": admin_id, "content": "anyone there?" });
    let response = post_json_auth(app, "/api/v1/chat/messages", body, &user_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/chat/messages", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let thread = body_json(response).await;
    let thread = thread.as_array().unwrap();
    assert_eq!(thread.len(), 1, "the admin must see the incoming message");
    assert_eq!(thread[0]["content"], "anyone there?");
}
