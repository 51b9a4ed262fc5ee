// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Router-level tests with a fake AI service

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt;

use neonfolio::config::AppConfig;
use neonfolio::generator::{DescriptionGenerator, DescriptionService, InlineImage};
use neonfolio::seed::Seed;
use neonfolio::session::GenerationState;
use neonfolio::web::{create_router, AppState};

const BOUNDARY: &str = "neonfolio-test-boundary";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

/// Replies with `reply`, or fails when it is `None`. With a gate, the first
/// call waits until the gate is opened.
struct FakeService {
    calls: AtomicUsize,
    reply: Option<&'static str>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl DescriptionService for FakeService {
    async fn describe(&self, _prompt: &str, _image: InlineImage<'_>) -> anyhow::Result<Option<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let (0, Some(gate)) = (call, &self.gate) {
            gate.notified().await;
        }
        match self.reply {
            Some(text) => Ok(Some(text.to_string())),
            None => Err(anyhow::anyhow!("upstream exploded")),
        }
    }
}

struct Harness {
    app: Router,
    state: Arc<AppState>,
    service: Arc<FakeService>,
}

fn harness(reply: Option<&'static str>) -> Harness {
    gated_harness(reply, None)
}

fn gated_harness(reply: Option<&'static str>, gate: Option<Arc<Notify>>) -> Harness {
    let config = AppConfig::default();
    let service = Arc::new(FakeService {
        calls: AtomicUsize::new(0),
        reply,
        gate,
    });
    let generator = DescriptionGenerator::new(service.clone(), &config.prompts);
    let state = Arc::new(AppState::new(config, Seed::default(), generator).unwrap());

    Harness {
        app: create_router(state.clone()),
        state,
        service,
    }
}

fn form_request(uri: &str, form: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, location, String::from_utf8_lossy(&body).into_owned())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, form: &str) -> (StatusCode, Option<String>, String) {
        self.send(form_request(uri, form)).await
    }

    async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Option<String>, String) {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(request).await
    }

    async fn upload_draft_png(&self) {
        let (status, location, _) = self
            .post_multipart("/projects/draft/image", &[], Some(("shot.png", PNG)))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/projects/new"));
    }

    fn calls(&self) -> usize {
        self.service.calls.load(Ordering::SeqCst)
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn generation(&self) -> GenerationState {
        self.state.session.lock().await.draft().generation
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n\
                 Content-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[tokio::test]
async fn index_renders_seed_portfolio() {
    let h = harness(Some("unused"));
    let (status, _, body) = h.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Alex Designer"));
    assert!(body.contains("Task Master App"));
    assert!(body.contains("AI Image Analyzer"));
}

#[tokio::test]
async fn print_view_renders() {
    let h = harness(Some("unused"));
    let (status, _, body) = h.get("/print").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Exported"));
    assert!(!body.contains("addEventListener"));

    let (_, _, body) = h.get("/print?autoprint=true").await;
    assert!(body.contains("addEventListener"));
}

#[tokio::test]
async fn delete_waits_for_confirmation() {
    let h = harness(Some("unused"));

    let (status, _, body) = h.get("/projects/2/delete").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Are you sure you want to remove this project?"));
    assert_eq!(h.state.session.lock().await.projects().len(), 2);

    let (status, location, _) = h.post_form("/projects/2/delete", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));

    let session = h.state.session.lock().await;
    let ids: Vec<_> = session.projects().iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec!["3"]);
}

#[tokio::test]
async fn confirming_unknown_project_redirects_home() {
    let h = harness(Some("unused"));
    let (status, location, _) = h.get("/projects/missing/delete").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
}

#[tokio::test]
async fn api_delete_requires_confirm_flag() {
    let h = harness(Some("unused"));
    let delete = |uri: &str| Request::builder().method(Method::DELETE).uri(uri).body(Body::empty()).unwrap();

    let (status, _, _) = h.send(delete("/api/projects/2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.state.session.lock().await.projects().len(), 2);

    let (status, _, body) = h.send(delete("/api/projects/2?confirm=true")).await;
    assert_eq!(status, StatusCode::OK);
    let removed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(removed["id"], "2");

    let (status, _, _) = h.send(delete("/api/projects/2?confirm=true")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = h.get("/api/portfolio").await;
    let portfolio: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(portfolio["projects"].as_array().unwrap().len(), 1);
    assert_eq!(portfolio["profile"]["name"], "Alex Designer");
}

#[tokio::test]
async fn add_project_with_generated_description() {
    let h = harness(Some("  A bold dashboard.  "));
    h.upload_draft_png().await;

    let (status, location, _) = h
        .post_form("/projects/draft/generate", "title=Neon+Dashboard&description=")
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/projects/new"));
    assert_eq!(h.calls(), 1);
    assert_eq!(h.state.session.lock().await.draft().description, "A bold dashboard.");

    let (_, _, page) = h.get("/projects/new").await;
    assert!(page.contains("A bold dashboard."));

    let (status, location, _) = h
        .post_form("/projects", "title=Neon+Dashboard&description=A+bold+dashboard.")
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));

    let session = h.state.session.lock().await;
    let first = session.projects().iter().next().unwrap();
    assert_eq!(first.title, "Neon Dashboard");
    assert_eq!(first.description, "A bold dashboard.");
    assert!(first.image.to_string().starts_with("data:image/png;base64,"));
    assert_eq!(session.projects().len(), 3);
    assert!(session.draft().image.is_none());
}

#[tokio::test]
async fn generate_without_image_skips_service() {
    let h = harness(Some("unused"));
    h.post_form("/projects/draft/generate", "title=Neon&description=").await;

    assert_eq!(h.calls(), 0);
    let session = h.state.session.lock().await;
    assert_eq!(
        session.draft().error.as_deref(),
        Some("Please upload an image first to use AI generation.")
    );
}

#[tokio::test]
async fn generate_without_title_skips_service() {
    let h = harness(Some("unused"));
    h.upload_draft_png().await;
    h.post_form("/projects/draft/generate", "title=&description=").await;

    assert_eq!(h.calls(), 0);
    let session = h.state.session.lock().await;
    assert_eq!(session.draft().error.as_deref(), Some("Please add a title to help the AI."));
}

#[tokio::test]
async fn failed_generation_keeps_typed_description() {
    let h = harness(None);
    h.upload_draft_png().await;
    h.post_form("/projects/draft/generate", "title=Neon&description=my+own+words").await;

    assert_eq!(h.calls(), 1);
    let session = h.state.session.lock().await;
    assert_eq!(session.draft().description, "my own words");
    let error = session.draft().error.clone().unwrap();
    assert!(error.starts_with("Failed to generate description."));
    assert!(!error.contains("exploded"));
    assert_eq!(session.projects().len(), 2);
}

#[tokio::test]
async fn incomplete_project_is_rejected() {
    let h = harness(Some("unused"));
    let (status, location, _) = h.post_form("/projects", "title=Only+a+title&description=").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/projects/new"));

    let (_, _, page) = h.get("/projects/new").await;
    assert!(page.contains("Please fill in all fields."));
    assert_eq!(h.state.session.lock().await.projects().len(), 2);
}

#[tokio::test]
async fn profile_cancel_keeps_committed_profile() {
    let h = harness(Some("unused"));
    let (status, _, page) = h.get("/profile/edit").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Alex Designer"));

    h.post_multipart("/profile/avatar", &[], Some(("me.png", PNG))).await;
    {
        let session = h.state.session.lock().await;
        assert!(session.profile().scratch().unwrap().avatar.is_embedded());
        assert!(!session.profile().profile().avatar.is_embedded());
    }

    h.post_form("/profile/cancel", "name=Someone+Else&bio=x").await;
    let session = h.state.session.lock().await;
    assert_eq!(session.profile().profile().name, "Alex Designer");
    assert!(!session.profile().profile().avatar.is_embedded());
    assert!(!session.profile().is_editing());
}

#[tokio::test]
async fn profile_save_commits_scratch() {
    let h = harness(Some("unused"));
    h.get("/profile/edit").await;
    h.post_multipart("/profile/avatar", &[], Some(("me.png", PNG))).await;

    let (status, location, _) = h.post_form("/profile/save", "name=Sam+Rivera&bio=").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));

    let session = h.state.session.lock().await;
    let profile = session.profile().profile();
    assert_eq!(profile.name, "Sam Rivera");
    assert_eq!(profile.bio, "");
    assert!(profile.avatar.is_embedded());
}

#[tokio::test]
async fn api_describe_returns_description() {
    let h = harness(Some("A bold dashboard."));
    let (status, _, body) = h
        .post_multipart("/api/describe", &[("title", "Dash")], Some(("shot.png", PNG)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["description"], "A bold dashboard.");
}

#[tokio::test]
async fn api_describe_validates_before_calling() {
    let h = harness(Some("unused"));
    let (status, _, body) = h.post_multipart("/api/describe", &[("title", "Dash")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Please upload an image first to use AI generation.");
    assert_eq!(h.calls(), 0);
}

#[tokio::test]
async fn api_describe_hides_failure_cause() {
    let h = harness(None);
    let (status, _, body) = h
        .post_multipart("/api/describe", &[("title", "Dash")], Some(("shot.png", PNG)))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("exploded"));
}

#[tokio::test]
async fn dropped_generate_request_releases_the_draft() {
    // The gate never opens, so the first call hangs until its request is dropped
    let h = gated_harness(Some("A bold dashboard."), Some(Arc::new(Notify::new())));
    h.upload_draft_png().await;

    let request = form_request("/projects/draft/generate", "title=Neon&description=");
    let outcome = tokio::time::timeout(Duration::from_millis(200), h.app.clone().oneshot(request)).await;
    assert!(outcome.is_err());
    assert_eq!(h.calls(), 1);

    // Let the release task run
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.generation().await, GenerationState::Failed);

    h.post_form("/projects/draft/generate", "title=Neon&description=").await;
    assert_eq!(h.calls(), 2);
    let session = h.state.session.lock().await;
    assert_eq!(session.draft().generation, GenerationState::Succeeded);
    assert_eq!(session.draft().description, "A bold dashboard.");
    assert!(session.draft().error.is_none());
}

#[tokio::test]
async fn reset_while_generating_keeps_generate_disabled_until_done() {
    let gate = Arc::new(Notify::new());
    let h = gated_harness(Some("A bold dashboard."), Some(gate.clone()));
    h.upload_draft_png().await;

    let first = tokio::spawn(
        h.app
            .clone()
            .oneshot(form_request("/projects/draft/generate", "title=Neon&description=")),
    );
    h.wait_for_calls(1).await;

    h.post_form("/projects/draft/reset", "").await;
    let (_, _, page) = h.get("/projects/new").await;
    assert!(page.contains("Generating..."));
    assert_eq!(h.generation().await, GenerationState::Generating);

    h.upload_draft_png().await;
    h.post_form("/projects/draft/generate", "title=Neon&description=").await;
    assert_eq!(h.calls(), 1);
    assert_eq!(
        h.state.session.lock().await.draft().error.as_deref(),
        Some("A description is already being generated.")
    );

    gate.notify_one();
    let response = first.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.generation().await, GenerationState::Succeeded);

    h.post_form("/projects/draft/generate", "title=Neon&description=").await;
    assert_eq!(h.calls(), 2);
    assert_eq!(h.generation().await, GenerationState::Succeeded);
}

#[tokio::test]
async fn submit_while_generating_then_generate_again() {
    let gate = Arc::new(Notify::new());
    let h = gated_harness(Some("A bold dashboard."), Some(gate.clone()));
    h.upload_draft_png().await;

    let first = tokio::spawn(
        h.app
            .clone()
            .oneshot(form_request("/projects/draft/generate", "title=Neon&description=")),
    );
    h.wait_for_calls(1).await;

    let (_, location, _) = h.post_form("/projects", "title=Neon&description=Typed+by+hand").await;
    assert_eq!(location.as_deref(), Some("/"));
    assert_eq!(h.state.session.lock().await.projects().len(), 3);
    assert_eq!(h.generation().await, GenerationState::Generating);

    gate.notify_one();
    first.await.unwrap().unwrap();
    {
        let session = h.state.session.lock().await;
        assert_eq!(session.draft().generation, GenerationState::Succeeded);
        // The added project keeps what was submitted
        assert_eq!(session.projects().iter().next().unwrap().description, "Typed by hand");
    }

    h.upload_draft_png().await;
    h.post_form("/projects/draft/generate", "title=Glow&description=").await;
    assert_eq!(h.calls(), 2);
    assert_eq!(h.generation().await, GenerationState::Succeeded);
}
