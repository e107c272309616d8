//! End-to-end tests for content management and attachments.
//!
//! These tests require a running site backed by a migrated database.
//! Run with: cargo test -p portfolio-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use portfolio_integration_tests::TestContext;

async fn upload(ctx: &TestContext, content_type: &str, body: &'static [u8]) -> String {
    let issued: Value = ctx
        .as_admin(ctx.client.post(ctx.url("/api/uploads")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let upload_url = issued["uploadUrl"].as_str().unwrap();

    let stored: Value = ctx
        .client
        .post(upload_url)
        .header("content-type", content_type)
        .body(body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    stored["storageId"].as_str().unwrap().to_owned()
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_mutations_require_admin() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;
    let draft = json!({ "title": "Should not exist", "date": "2024-01" });

    let resp = ctx
        .client
        .post(ctx.url("/api/achievements"))
        .json(&draft)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = ctx
        .as_user(
            ctx.client.post(ctx.url("/api/achievements")),
            &TestContext::stranger_email(),
        )
        .json(&draft)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let listed: Vec<Value> = ctx
        .client
        .get(ctx.url("/api/achievements"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().all(|item| item["title"] != "Should not exist"));
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_achievement_lifecycle() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;
    let title = format!("Award {}", uuid::Uuid::new_v4());

    let resp = ctx
        .as_admin(ctx.client.post(ctx.url("/api/achievements")))
        .json(&json!({ "title": title, "date": "2999-12", "description": "Far future" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let listed: Vec<Value> = ctx
        .client
        .get(ctx.url("/api/achievements"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed[0]["title"], title, "latest date lists first");

    let resp = ctx
        .as_admin(ctx.client.delete(ctx.url(&format!("/api/achievements/{id}"))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .as_admin(ctx.client.delete(ctx.url(&format!("/api/achievements/{id}"))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_certificate_attachment_released_on_delete() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;

    let storage_id = upload(&ctx, "application/pdf", b"%PDF-1.4 test").await;
    let file_url = ctx.url(&format!("/files/{storage_id}"));

    let resp = ctx.client.get(&file_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/pdf");

    let resp = ctx
        .as_admin(ctx.client.post(ctx.url("/api/certificates")))
        .json(&json!({
            "name": "Test Certificate",
            "issuer": "Test Issuer",
            "date": "2024-05",
            "attachmentId": storage_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let listed: Vec<Value> = ctx
        .client
        .get(ctx.url("/api/certificates"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = listed.iter().find(|c| c["id"] == id).unwrap();
    assert!(entry["attachmentUrl"].as_str().unwrap().ends_with(&storage_id));

    let resp = ctx
        .as_admin(ctx.client.delete(ctx.url(&format!("/api/certificates/{id}"))))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx.client.get(&file_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_unknown_attachment_is_rejected() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;

    let resp = ctx
        .as_admin(ctx.client.post(ctx.url("/api/achievements")))
        .json(&json!({
            "title": "Dangling",
            "date": "2024-01",
            "attachmentId": uuid::Uuid::new_v4(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_profile_round_trip() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;

    let image = upload(&ctx, "image/png", b"\x89PNG fake").await;

    let resp = ctx
        .as_admin(ctx.client.put(ctx.url("/api/profile")))
        .json(&json!({
            "name": "Ada Lovelace",
            "title": "Analyst",
            "email": "ada@example.com",
            "profileImage": image,
            "links": [{ "platform": "GitHub", "url": "https://github.com/ada" }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let profile: Value = ctx
        .client
        .get(ctx.url("/api/profile"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["name"], "Ada Lovelace");
    assert!(profile["profileImageUrl"].as_str().unwrap().ends_with(&image));
    assert_eq!(profile["bannerImageUrl"], Value::Null);

    let page = ctx.client.get(ctx.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(page.contains("Ada Lovelace"));
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_profile_edit_without_images_keeps_them() {
    let ctx = TestContext::from_env();
    ctx.ensure_admin().await;

    let image = upload(&ctx, "image/png", b"\x89PNG portrait").await;
    let profile = json!({
        "name": "Ada Lovelace",
        "title": "Analyst",
        "email": "ada@example.com",
    });

    let mut with_image = profile.clone();
    with_image["profileImage"] = json!(image);
    let resp = ctx
        .as_admin(ctx.client.put(ctx.url("/api/profile")))
        .json(&with_image)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut bio_only = profile;
    bio_only["bio"] = json!("Writes the first programs.");
    let saved: Value = ctx
        .as_admin(ctx.client.put(ctx.url("/api/profile")))
        .json(&bio_only)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["bio"], "Writes the first programs.");
    assert_eq!(saved["profileImage"], json!(image));

    let file = ctx
        .client
        .get(ctx.url(&format!("/files/{image}")))
        .send()
        .await
        .unwrap();
    assert_eq!(file.status(), StatusCode::OK);
}
