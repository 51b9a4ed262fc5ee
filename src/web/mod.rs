// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for the portfolio builder

mod render;

pub use render::Pages;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{delete, get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::ReadError;
use crate::generator::DescriptionGenerator;
use crate::ingest::ingest_bytes;
use crate::model::{ImageRef, Project};
use crate::seed::Seed;
use crate::session::{Portfolio, Session};
use crate::{NeonfolioError, Result};

/// Shown inline when an upload cannot be read
pub const READ_ERROR_MESSAGE: &str = "Could not read the selected image. Please choose another file.";

/// Shared application state
pub struct AppState {
    pub session: Mutex<Session>,
    pub generator: DescriptionGenerator,
    pub pages: Pages,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, seed: Seed, generator: DescriptionGenerator) -> Result<Self> {
        Ok(Self {
            session: Mutex::new(Session::new(seed)),
            generator,
            pages: Pages::new(&config.web.image_fallback_url)?,
            config,
        })
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.web.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/print", get(print_page))
        .route("/profile/edit", get(profile_edit_page))
        .route("/profile/avatar", post(upload_avatar))
        .route("/profile/save", post(save_profile))
        .route("/profile/cancel", post(cancel_profile))
        .route("/projects", post(submit_project))
        .route("/projects/new", get(new_project_page))
        .route("/projects/draft/image", post(upload_draft_image))
        .route("/projects/draft/generate", post(generate_description))
        .route("/projects/draft/reset", post(reset_draft))
        .route("/projects/:id/delete", get(confirm_delete_page).post(delete_project))
        // API endpoints
        .route("/api/portfolio", get(api_get_portfolio))
        .route("/api/projects/:id", delete(api_delete_project))
        .route("/api/describe", post(api_describe))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Errors ===

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for NeonfolioError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            NeonfolioError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            NeonfolioError::Read(e) => {
                warn!("{}", e);
                (StatusCode::BAD_REQUEST, READ_ERROR_MESSAGE.to_string())
            }
            NeonfolioError::Generation(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// === Uploads ===

/// Text fields plus the first non-empty file of a multipart form
#[derive(Default)]
struct Upload {
    image: Option<ImageRef>,
    fields: HashMap<String, String>,
}

async fn read_upload(mut multipart: Multipart) -> std::result::Result<Upload, ReadError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReadError::Upload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| ReadError::Upload(e.to_string()))?;
                // A file input submitted with nothing selected
                if bytes.is_empty() && file_name.is_empty() {
                    continue;
                }
                if upload.image.is_none() {
                    upload.image = Some(ingest_bytes(&bytes, content_type.as_deref(), Some(&file_name)));
                }
            }
            None => {
                let text = field.text().await.map_err(|e| ReadError::Upload(e.to_string()))?;
                upload.fields.insert(name, text);
            }
        }
    }

    Ok(upload)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let portfolio = state.session.lock().await.portfolio();
    Ok(Html(state.pages.index(&portfolio)?))
}

#[derive(Deserialize)]
struct PrintQuery {
    #[serde(default)]
    autoprint: bool,
}

async fn print_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PrintQuery>,
) -> Result<Html<String>> {
    let portfolio = state.session.lock().await.portfolio();
    Ok(Html(state.pages.print(&portfolio, query.autoprint)?))
}

async fn profile_edit_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let mut session = state.session.lock().await;
    let scratch = session.profile_mut().stage_edit().clone();
    Ok(Html(state.pages.profile_edit(&scratch, session.profile_error())?))
}

async fn upload_avatar(State(state): State<Arc<AppState>>, multipart: Multipart) -> Redirect {
    let upload = read_upload(multipart).await;

    let mut session = state.session.lock().await;
    match upload {
        Ok(Upload { image: Some(image), .. }) => session.set_avatar(image),
        Ok(_) => {}
        Err(e) => {
            warn!("{}", e);
            session.set_profile_error(READ_ERROR_MESSAGE);
        }
    }
    Redirect::to("/profile/edit")
}

#[derive(Deserialize)]
struct ProfileForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    bio: String,
}

async fn save_profile(State(state): State<Arc<AppState>>, Form(form): Form<ProfileForm>) -> Redirect {
    state.session.lock().await.save_profile(form.name, form.bio);
    Redirect::to("/")
}

async fn cancel_profile(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.lock().await.cancel_profile_edit();
    Redirect::to("/")
}

async fn new_project_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let draft = state.session.lock().await.draft().clone();
    Ok(Html(state.pages.project_new(&draft)?))
}

async fn upload_draft_image(State(state): State<Arc<AppState>>, multipart: Multipart) -> Redirect {
    let upload = read_upload(multipart).await;

    let mut session = state.session.lock().await;
    match upload {
        Ok(Upload { image: Some(image), .. }) => session.set_draft_image(image),
        Ok(_) => {}
        Err(e) => {
            warn!("{}", e);
            session.set_draft_error(READ_ERROR_MESSAGE);
        }
    }
    Redirect::to("/projects/new")
}

#[derive(Deserialize)]
struct DraftForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

async fn generate_description(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DraftForm>,
) -> Redirect {
    let pending = {
        let mut session = state.session.lock().await;
        session.set_draft_text(form.title.clone(), Some(form.description));
        match session.begin_generation(form.title) {
            Ok(pending) => pending,
            Err(busy) => {
                session.set_draft_error(busy.to_string());
                return Redirect::to("/projects/new");
            }
        }
    };

    // The session stays unlocked while the service works
    let mut guard = GenerationGuard::new(state.clone());
    let result = state.generator.generate(&pending.title, pending.image.as_ref()).await;
    state.session.lock().await.finish_generation(result);
    guard.disarm();

    Redirect::to("/projects/new")
}

/// Fails the draft's generation if the request future is dropped before the
/// outcome is applied, e.g. when the client disconnects mid-call.
struct GenerationGuard {
    state: Option<Arc<AppState>>,
}

impl GenerationGuard {
    fn new(state: Arc<AppState>) -> Self {
        Self { state: Some(state) }
    }

    fn disarm(&mut self) {
        self.state = None;
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.session.lock().await.abandon_generation();
                });
            }
            Err(_) => match state.session.try_lock() {
                Ok(mut session) => session.abandon_generation(),
                Err(_) => error!("Could not release the draft after a dropped generation"),
            },
        }
    }
}

async fn submit_project(State(state): State<Arc<AppState>>, Form(form): Form<DraftForm>) -> Redirect {
    match state.session.lock().await.submit_draft(form.title, form.description) {
        Ok(_) => Redirect::to("/"),
        Err(_) => Redirect::to("/projects/new"),
    }
}

async fn reset_draft(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.lock().await.reset_draft();
    Redirect::to("/projects/new")
}

async fn confirm_delete_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let project = state.session.lock().await.projects().get(&id).cloned();
    match project {
        Some(project) => Ok(Html(state.pages.confirm_delete(&project)?).into_response()),
        None => Ok(Redirect::to("/").into_response()),
    }
}

async fn delete_project(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Redirect {
    state.session.lock().await.delete_project(&id);
    Redirect::to("/")
}

// === API Handlers ===

async fn api_get_portfolio(State(state): State<Arc<AppState>>) -> Json<Portfolio> {
    Json(state.session.lock().await.portfolio())
}

#[derive(Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

async fn api_delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    if !query.confirm {
        let body = ErrorBody {
            error: "Deletion must be confirmed with confirm=true".to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let removed: Option<Project> = state.session.lock().await.delete_project(&id);
    match removed {
        Some(project) => Json(project).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Serialize)]
struct DescribeResponse {
    description: String,
}

async fn api_describe(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<DescribeResponse>> {
    let upload = read_upload(multipart).await?;
    let title = upload.fields.get("title").map(String::as_str).unwrap_or_default();

    let description = state.generator.generate(title, upload.image.as_ref()).await?;
    Ok(Json(DescribeResponse { description }))
}

/// Start the web server
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let addr = format!("{}:{}", state.config.web.host, state.config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Portfolio builder available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| NeonfolioError::Server(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
