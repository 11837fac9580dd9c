//! End-to-end API tests
//!
//! Drive the full router over an in-memory database and object store,
//! with a scripted LLM client behind the generation endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{build_router, AppState};
use crate::config::LlmConfig;
use crate::db::repositories::{
    SqlxBlogRepository, SqlxGenerationRepository, SqlxTokenRepository, TokenRepository,
};
use crate::db::{create_test_pool, migrations};
use crate::llm::testing::ScriptedChatClient;
use crate::llm::{Completion, LlmError};
use crate::models::{Blog, UserBlogIndex};
use crate::services::{BlogService, GenerationService};
use crate::store::MemoryObjectStore;

const VALID_CONTENT: &str = "## Heading\n\nA body long enough to pass the minimum content \
    length check, with several sentences of plausible generated prose about the topic at hand.";

/// Build a test server with two seeded tokens and a scripted LLM
async fn setup_server(llm_responses: Vec<Result<Completion, LlmError>>) -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let tokens: Arc<dyn TokenRepository> = SqlxTokenRepository::boxed(pool.clone());
    tokens.insert("tok-1", "user-1").await.unwrap();
    tokens.insert("tok-2", "user-2").await.unwrap();

    let blog_repo = SqlxBlogRepository::boxed(pool.clone());
    let store = Arc::new(MemoryObjectStore::new());
    let blog_service = Arc::new(BlogService::new(blog_repo.clone(), store));

    let generation_service = Arc::new(GenerationService::new(
        Arc::new(ScriptedChatClient::new(llm_responses)),
        SqlxGenerationRepository::boxed(pool),
        blog_repo,
        &LlmConfig::default(),
    ));

    let state = AppState {
        blog_service,
        generation_service,
        tokens,
    };

    let router = build_router(state, "*").expect("Failed to build router");
    TestServer::new(router).expect("Failed to start test server")
}

fn create_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "raw": format!("# {}\n\nSome body text.", title),
        "tags": ["notes"],
    })
}

#[tokio::test]
async fn test_blog_lifecycle() {
    let server = setup_server(vec![]).await;

    // Create as user-1
    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&create_payload("Lifecycle"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let blog: Blog = response.json();
    assert_eq!(blog.title, "Lifecycle");
    assert_eq!(blog.owner, "user-1");

    // Public read round-trips
    let response = server.get(&format!("/blogs/{}", blog.id)).await;
    response.assert_status_ok();
    let fetched: Blog = response.json();
    assert_eq!(fetched.title, "Lifecycle");
    assert_eq!(fetched.tags, vec!["notes"]);

    // Update the title as the owner
    let response = server
        .post(&format!("/blogs/{}", blog.id))
        .authorization_bearer("tok-1")
        .json(&json!({
            "title": "Lifecycle v2",
            "raw": "# Lifecycle v2",
            "tags": ["notes", "v2"],
            "content": [{"type": "heading", "text": "Lifecycle v2"}],
        }))
        .await;
    response.assert_status_ok();
    let updated: Blog = response.json();
    assert_eq!(updated.title, "Lifecycle v2");

    // Update as another user fails with 403 and changes nothing
    let response = server
        .post(&format!("/blogs/{}", blog.id))
        .authorization_bearer("tok-2")
        .json(&json!({
            "title": "Hijacked",
            "raw": "# Hijacked",
            "tags": [],
            "content": "x",
        }))
        .await;
    response.assert_status_forbidden();

    let response = server.get(&format!("/blogs/{}", blog.id)).await;
    let fetched: Blog = response.json();
    assert_eq!(fetched.title, "Lifecycle v2");

    // Delete as the owner
    let response = server
        .post(&format!("/blogs/{}/delete", blog.id))
        .authorization_bearer("tok-1")
        .await;
    response.assert_status_ok();

    server
        .get(&format!("/blogs/{}", blog.id))
        .await
        .assert_status_not_found();

    // Index pruned
    let response = server.get("/users/user-1/index").await;
    response.assert_status_ok();
    let index: UserBlogIndex = response.json();
    assert!(index.blogs.is_empty());
}

#[tokio::test]
async fn test_list_blogs_is_public() {
    let server = setup_server(vec![]).await;

    server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&create_payload("Visible"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/blogs").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["blogs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let server = setup_server(vec![]).await;

    server
        .post("/blogs")
        .json(&create_payload("Anon"))
        .await
        .assert_status_unauthorized();

    server
        .post("/blogs")
        .authorization_bearer("bogus")
        .json(&create_payload("Anon"))
        .await
        .assert_status_unauthorized();

    server
        .post(&format!("/blogs/{}/delete", Uuid::new_v4()))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let server = setup_server(vec![]).await;

    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&json!({"title": " ", "raw": "# Hi", "tags": []}))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_incomplete_body_uses_error_envelope() {
    let server = setup_server(vec![]).await;

    // Missing the required tags field entirely
    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&json!({"title": "No Tags", "raw": "# Hi"}))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Same envelope for a body that is not JSON at all
    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .text("not json")
        .content_type("application/json")
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_rejects_empty_tag_list() {
    let server = setup_server(vec![]).await;

    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&json!({"title": "No Tags", "raw": "# Hi", "tags": []}))
        .await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_missing_blog_is_404() {
    let server = setup_server(vec![]).await;

    server
        .post(&format!("/blogs/{}/delete", Uuid::new_v4()))
        .authorization_bearer("tok-1")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_document_endpoint() {
    let server = setup_server(vec![]).await;

    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&create_payload("Doc"))
        .await;
    let blog: Blog = response.json();

    let response = server.get(&format!("/blogs/{}/document", blog.id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Doc");
    assert_eq!(body["tags"][0], "notes");
}

#[tokio::test]
async fn test_generate_draft_end_to_end() {
    let server = setup_server(vec![
        ScriptedChatClient::ok("\"Shipping It\"", 50, 10),
        ScriptedChatClient::ok(VALID_CONTENT, 80, 400),
        ScriptedChatClient::ok("release, process, teams", 30, 15),
    ])
    .await;

    let response = server
        .post("/generate")
        .authorization_bearer("tok-1")
        .json(&json!({"summary": "how we ship software", "mood": "Confident"}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Shipping It");
    assert_eq!(body["tags"].as_array().unwrap().len(), 3);
    let generation_id = body["generation_id"].as_i64().unwrap();

    // Save a blog, then attach the record to it
    let response = server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&create_payload("Shipping It"))
        .await;
    let blog: Blog = response.json();

    server
        .post(&format!("/generation/{}/attach-blog", generation_id))
        .authorization_bearer("tok-1")
        .json(&json!({"blog_id": blog.id}))
        .await
        .assert_status_ok();

    // Spend now shows up in the cost summary and on the blog row
    let response = server
        .get("/generation/cost")
        .authorization_bearer("tok-1")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_input_tokens"], 160);
    assert_eq!(body["total_output_tokens"], 425);

    let response = server.get(&format!("/blogs/{}", blog.id)).await;
    let fetched: Blog = response.json();
    assert!(fetched.cost > 0.0);
}

#[tokio::test]
async fn test_generate_draft_missing_fields_is_400() {
    let server = setup_server(vec![]).await;

    let response = server
        .post("/generate")
        .authorization_bearer("tok-1")
        .json(&json!({"summary": "", "mood": "Calm"}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_generate_draft_invalid_output_is_500() {
    let server = setup_server(vec![ScriptedChatClient::ok("Hm", 10, 1)]).await;

    let response = server
        .post("/generate")
        .authorization_bearer("tok-1")
        .json(&json!({"summary": "an idea", "mood": "Calm"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "GENERATED_OUTPUT_INVALID");
}

#[tokio::test]
async fn test_extract_tags_degrades_silently() {
    let server = setup_server(vec![ScriptedChatClient::ok("not json at all", 100, 10)]).await;

    let response = server
        .post("/tags")
        .authorization_bearer("tok-1")
        .json(&json!({"markdown": "# A Post"}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tags"].as_array().unwrap().len(), 0);
    assert_eq!(body["usage"]["input_tokens"], 100);
}

#[tokio::test]
async fn test_attach_blog_wrong_user_is_403() {
    let server = setup_server(vec![
        ScriptedChatClient::ok("A Fine Title", 50, 10),
        ScriptedChatClient::ok(VALID_CONTENT, 80, 400),
        ScriptedChatClient::ok("one, two", 30, 15),
    ])
    .await;

    let response = server
        .post("/generate")
        .authorization_bearer("tok-1")
        .json(&json!({"summary": "an idea", "mood": "Calm"}))
        .await;
    let generation_id = response.json::<serde_json::Value>()["generation_id"]
        .as_i64()
        .unwrap();

    server
        .post(&format!("/generation/{}/attach-blog", generation_id))
        .authorization_bearer("tok-2")
        .json(&json!({"blog_id": Uuid::new_v4()}))
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn test_index_title_and_rebuild() {
    let server = setup_server(vec![]).await;

    server
        .post("/blogs")
        .authorization_bearer("tok-1")
        .json(&create_payload("Indexed"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/users/index/title")
        .authorization_bearer("tok-1")
        .json(&json!({"title": "Ship Log"}))
        .await;
    response.assert_status_ok();

    let response = server.get("/users/user-1/index").await;
    let index: UserBlogIndex = response.json();
    assert_eq!(index.title, "Ship Log");
    assert_eq!(index.blogs.len(), 1);

    // Rebuild is idempotent
    let response = server
        .post("/blogs/rebuild-index")
        .authorization_bearer("tok-1")
        .await;
    response.assert_status_ok();
    let index: UserBlogIndex = response.json();
    assert_eq!(index.title, "Ship Log");
    assert_eq!(index.blogs.len(), 1);
}

#[tokio::test]
async fn test_unknown_owner_index_is_empty_default() {
    let server = setup_server(vec![]).await;

    let response = server.get("/users/stranger/index").await;
    response.assert_status_ok();
    let index: UserBlogIndex = response.json();
    assert_eq!(index.title, "My Blog");
    assert!(index.blogs.is_empty());
}
