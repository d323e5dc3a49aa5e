//! HTTP-level integration tests for the comments API.
//!
//! Tests cover listing, posting, editing, deleting, rating, mention lookup,
//! session info and draft preview, driven through the full router.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{
    body_bytes, body_json, delete_auth, doc, get, get_auth, patch_json_auth, post_json,
    post_json_auth, token_for, user,
};
use marginalia_core::content::RichContent;
use marginalia_core::roles::Role;
use marginalia_core::schemas::ValidatedPost;
use marginalia_core::types::{AuthInfo, UserProfile};
use marginalia_storage::{
    CommentQuery, CommentRef, MemoryStorage, SerializedComment, StorageAdapter, StorageResult,
};
use serde_json::json;
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Post a comment as `author` and return its id.
async fn post_as(app: axum::Router, page: &str, author: &AuthInfo, text: &str) -> String {
    let response = post_json_auth(
        app,
        &format!("/api/comments/{page}"),
        &token_for(author),
        json!({ "content": doc(text) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Listing and posting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_then_list_returns_comment_with_author() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = post_json_auth(
        app.clone(),
        "/api/comments/blog-1",
        &token_for(&ann),
        json!({ "content": doc("Hello world") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["page"], "blog-1");
    assert_eq!(created["author"]["name"], "Ann");
    assert_eq!(created["likes"], 0);
    assert_eq!(created["edited"], false);

    let response = get(app, "/api/comments/blog-1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], created["id"]);
    assert!(list[0].get("liked").is_none(), "anonymous viewers have no rate");
}

#[tokio::test]
async fn post_without_token_returns_401() {
    let (app, storage) = common::build_test_app();

    let response = post_json(app, "/api/comments/p", json!({ "content": doc("hi") })).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn list_with_invalid_token_returns_401() {
    let (app, _storage) = common::build_test_app();

    let response = get_auth(app, "/api/comments/p", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_content_is_rejected_with_issue() {
    let (app, storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = post_json_auth(
        app,
        "/api/comments/p",
        &token_for(&ann),
        json!({ "content": doc("   ") }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Content can't be empty");
    assert_eq!(json["issues"][0]["code"], "EMPTY");
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn too_many_images_is_rejected() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let image = json!({
        "type": "image",
        "attrs": { "src": "https://cdn.example.com/a.png", "width": 10, "height": 10 }
    });
    let content = json!({
        "type": "doc",
        "content": [
            { "type": "paragraph", "content": [{ "type": "text", "text": "pics" }] },
            image, image, image
        ]
    });

    let response = post_json_auth(
        app,
        "/api/comments/p",
        &token_for(&ann),
        json!({ "content": content }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You cannot add more than 2 images");
}

#[tokio::test]
async fn unknown_body_field_is_rejected() {
    let (app, storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = post_json_auth(
        app,
        "/api/comments/p",
        &token_for(&ann),
        json!({ "content": doc("hi"), "pinned": true }),
    )
    .await;

    assert!(response.status().is_client_error());
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn reply_to_missing_thread_returns_404() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = post_json_auth(
        app,
        "/api/comments/p",
        &token_for(&ann),
        json!({ "content": doc("reply"), "thread": "nope" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reply_to_reply_is_rejected() {
    let (app, storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let token = token_for(&ann);
    let parent = post_as(app.clone(), "p", &ann, "parent").await;

    let response = post_json_auth(
        app.clone(),
        "/api/comments/p",
        &token,
        json!({ "content": doc("reply"), "thread": parent }),
    )
    .await;
    let reply = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app.clone(),
        "/api/comments/p",
        &token,
        json!({ "content": doc("nested"), "thread": reply }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Replies can only be posted to top-level comments");
    assert_eq!(storage.comment_count().await, 2);

    // Deleting the thread leaves nothing behind.
    let response = delete_auth(app, &format!("/api/comments/p/{parent}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn thread_listing_returns_replies_only() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let token = token_for(&ann);
    let parent = post_as(app.clone(), "p", &ann, "parent").await;

    let response = post_json_auth(
        app.clone(),
        "/api/comments/p",
        &token,
        json!({ "content": doc("child"), "thread": parent }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let top = body_json(get(app.clone(), "/api/comments/p").await).await;
    assert_eq!(top.as_array().unwrap().len(), 1);
    assert_eq!(top[0]["replies"], 1);

    let replies = body_json(get(app, &format!("/api/comments/p?thread={parent}")).await).await;
    let replies = replies.as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["thread"], parent.as_str());
}

#[tokio::test]
async fn listing_honors_sort_and_limit() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let first = post_as(app.clone(), "p", &ann, "one").await;
    post_as(app.clone(), "p", &ann, "two").await;
    let last = post_as(app.clone(), "p", &ann, "three").await;

    let newest = body_json(get(app.clone(), "/api/comments/p?limit=1").await).await;
    assert_eq!(newest.as_array().unwrap().len(), 1);
    assert_eq!(newest[0]["id"], last.as_str());

    let oldest = body_json(get(app, "/api/comments/p?sort=oldest&limit=1").await).await;
    assert_eq!(oldest[0]["id"], first.as_str());
}

#[tokio::test]
async fn invalid_sort_is_rejected() {
    let (app, _storage) = common::build_test_app();

    let response = get(app, "/api/comments/p?sort=sideways").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Editing and deleting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn author_can_edit_comment() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let id = post_as(app.clone(), "p", &ann, "draft").await;

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/comments/p/{id}"),
        &token_for(&ann),
        json!({ "content": doc("final") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = body_json(get(app, "/api/comments/p").await).await;
    assert_eq!(list[0]["edited"], true);
    assert_eq!(list[0]["content"]["content"][0]["content"][0]["text"], "final");
}

#[tokio::test]
async fn other_user_cannot_edit_comment() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let bob = user("u2", "Bob");
    let id = post_as(app.clone(), "p", &ann, "mine").await;

    let response = patch_json_auth(
        app,
        &format!("/api/comments/p/{id}"),
        &token_for(&bob),
        json!({ "content": doc("yours now") }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn edit_missing_comment_returns_404() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = patch_json_auth(
        app,
        "/api/comments/p/missing",
        &token_for(&ann),
        json!({ "content": doc("x") }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn author_can_delete_and_others_cannot() {
    let (app, storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let bob = user("u2", "Bob");
    let id = post_as(app.clone(), "p", &ann, "bye").await;
    let uri = format!("/api/comments/p/{id}");

    let response = delete_auth(app.clone(), &uri, &token_for(&bob)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(storage.comment_count().await, 1);

    let response = delete_auth(app, &uri, &token_for(&ann)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn moderator_can_delete_any_comment() {
    let (app, storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let moderator = user("mod", "Mo");
    let id = post_as(app.clone(), "p", &ann, "spam").await;

    let response = delete_auth(app, &format!("/api/comments/p/{id}"), &token_for(&moderator)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(storage.comment_count().await, 0);
}

#[tokio::test]
async fn comment_is_not_reachable_from_another_page() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let id = post_as(app.clone(), "p", &ann, "here").await;

    let response = delete_auth(app, &format!("/api/comments/other/{id}"), &token_for(&ann)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_set_replace_and_remove() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");
    let bob = user("u2", "Bob");
    let bob_token = token_for(&bob);
    let id = post_as(app.clone(), "p", &ann, "rate me").await;
    let rate_uri = format!("/api/comments/p/{id}/rate");

    let response = post_json_auth(app.clone(), &rate_uri, &bob_token, json!({ "like": true })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = body_json(get_auth(app.clone(), "/api/comments/p", &bob_token).await).await;
    assert_eq!(list[0]["likes"], 1);
    assert_eq!(list[0]["liked"], true);

    post_json_auth(app.clone(), &rate_uri, &bob_token, json!({ "like": false })).await;
    let list = body_json(get_auth(app.clone(), "/api/comments/p", &bob_token).await).await;
    assert_eq!(list[0]["likes"], 0);
    assert_eq!(list[0]["dislikes"], 1);
    assert_eq!(list[0]["liked"], false);

    let response = delete_auth(app.clone(), &rate_uri, &bob_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let list = body_json(get_auth(app, "/api/comments/p", &bob_token).await).await;
    assert_eq!(list[0]["dislikes"], 0);
    assert!(list[0].get("liked").is_none());
}

#[tokio::test]
async fn rate_on_missing_comment_returns_404() {
    let (app, _storage) = common::build_test_app();
    let ann = user("u1", "Ann");

    let response = post_json_auth(
        app,
        "/api/comments/p/missing/rate",
        &token_for(&ann),
        json!({ "like": true }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users, session and preview
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_users_matches_by_name() {
    let (app, storage) = common::build_test_app();
    storage
        .register_user(UserProfile {
            id: "u9".into(),
            name: "Annabel".into(),
            image: None,
        })
        .await;
    storage
        .register_user(UserProfile {
            id: "u8".into(),
            name: "Zed".into(),
            image: None,
        })
        .await;
    let token = token_for(&user("u1", "Ann"));

    let response = get_auth(app.clone(), "/api/comments/p/users?name=anna", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users, json!([{ "id": "u9", "name": "Annabel" }]));

    let response = get_auth(app, "/api/comments/p/users?name=%20", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_users_without_directory_returns_empty_list() {
    let storage = Arc::new(MemoryStorage::new());
    let app = common::build_app_with(storage, None);
    let token = token_for(&user("u1", "Ann"));

    let response = get_auth(app, "/api/comments/p/users?name=ann", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn session_includes_role() {
    let (app, _storage) = common::build_test_app();

    let response = get_auth(app.clone(), "/api/comments/p/auth", &token_for(&user("u1", "Ann"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], "u1");
    assert_eq!(json["name"], "Ann");
    assert!(json["role"].is_null());

    let response = get_auth(app.clone(), "/api/comments/p/auth", &token_for(&user("mod", "Mo"))).await;
    let json = body_json(response).await;
    assert_eq!(json["role"]["canDelete"], true);

    let response = get(app, "/api/comments/p/auth").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn preview_renders_escaped_html() {
    let (app, storage) = common::build_test_app();

    let response = post_json(
        app,
        "/api/comments/p/preview",
        json!({ "content": doc("<b>hi</b>") }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(html, "<p>&lt;b&gt;hi&lt;/b&gt;</p>");
    assert_eq!(storage.comment_count().await, 0);
}

// ---------------------------------------------------------------------------
// Adapter call accounting
// ---------------------------------------------------------------------------

/// Delegates to [`MemoryStorage`] and records every delete it receives.
#[derive(Default)]
struct RecordingStorage {
    inner: MemoryStorage,
    deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl StorageAdapter for RecordingStorage {
    async fn get_comments(
        &self,
        page: &str,
        query: &CommentQuery,
        viewer: Option<&AuthInfo>,
    ) -> StorageResult<Vec<SerializedComment>> {
        self.inner.get_comments(page, query, viewer).await
    }

    async fn post_comment(
        &self,
        page: &str,
        post: ValidatedPost,
        author: &AuthInfo,
    ) -> StorageResult<SerializedComment> {
        self.inner.post_comment(page, post, author).await
    }

    async fn update_comment(
        &self,
        page: &str,
        id: &str,
        content: RichContent,
        auth: &AuthInfo,
    ) -> StorageResult<()> {
        self.inner.update_comment(page, id, content, auth).await
    }

    async fn delete_comment(&self, page: &str, id: &str, auth: &AuthInfo) -> StorageResult<()> {
        self.deletes.lock().await.push(id.to_string());
        self.inner.delete_comment(page, id, auth).await
    }

    async fn set_rate(
        &self,
        page: &str,
        id: &str,
        like: bool,
        auth: &AuthInfo,
    ) -> StorageResult<()> {
        self.inner.set_rate(page, id, like, auth).await
    }

    async fn delete_rate(&self, page: &str, id: &str, auth: &AuthInfo) -> StorageResult<()> {
        self.inner.delete_rate(page, id, auth).await
    }

    async fn get_role(&self, auth: &AuthInfo) -> StorageResult<Option<Role>> {
        self.inner.get_role(auth).await
    }

    async fn get_comment_ref(&self, page: &str, id: &str) -> StorageResult<Option<CommentRef>> {
        self.inner.get_comment_ref(page, id).await
    }
}

#[tokio::test]
async fn post_then_delete_calls_adapter_delete_exactly_once() {
    let storage = Arc::new(RecordingStorage::default());
    let app = common::build_app_with(storage.clone(), None);
    let ann = user("u1", "Ann");

    let id = post_as(app.clone(), "p", &ann, "short-lived").await;
    let response = delete_auth(app, &format!("/api/comments/p/{id}"), &token_for(&ann)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(*storage.deletes.lock().await, vec![id]);
}
