//! Wiki routes
//!
//! Four endpoints over shared state: the home listing, page view, page
//! edit, and page save. Handlers are stateless across requests; every
//! failure is terminal for its own request only.

use axum::{
    extract::rejection::FormRejection,
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::store::{Page, PageStore};
use crate::templates::{Context, TemplateSet};
use crate::title::TitleValidator;

/// Application state shared across handlers
///
/// Built once at startup and immutable afterwards; handlers receive it
/// through the router rather than through globals.
pub struct AppState {
    pub store: PageStore,
    pub templates: TemplateSet,
    pub titles: TitleValidator,
}

impl AppState {
    pub fn new(store: PageStore, templates: TemplateSet) -> Self {
        Self {
            store,
            templates,
            titles: TitleValidator::new(),
        }
    }
}

/// Build the wiki router
pub fn wiki_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/view/{title}", get(view_page))
        .route("/edit/{title}", get(edit_page))
        .route("/save/{title}", post(save_page))
}

/// Form payload for the save endpoint
#[derive(Debug, Deserialize)]
struct SaveForm {
    #[serde(default)]
    body: String,
}

/// List all page titles
async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let titles = state.store.list().map_err(AppError::internal)?;
    let ctx = Context::new().with_list("pages", titles);
    let html = state
        .templates
        .render("home", &ctx)
        .map_err(AppError::internal)?;
    Ok(Html(html))
}

/// Render a page, or redirect to its edit form if it does not exist yet
async fn view_page(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Result<Response, AppError> {
    require_valid_title(&state, &title)?;

    match state.store.load(&title) {
        Ok(page) => Ok(render_page(&state, "view", &page)?.into_response()),
        Err(_) => Ok(found(&format!("/edit/{title}"))),
    }
}

/// Render the edit form, blank when the page does not exist yet
async fn edit_page(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Result<Html<String>, AppError> {
    require_valid_title(&state, &title)?;

    let page = state
        .store
        .load(&title)
        .unwrap_or_else(|_| Page::blank(&title));
    render_page(&state, "edit", &page)
}

/// Persist the submitted body, then redirect to the page view
///
/// A missing or unparseable form is treated as an empty body, matching
/// form-value semantics elsewhere.
async fn save_page(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
    form: Result<Form<SaveForm>, FormRejection>,
) -> Result<Response, AppError> {
    require_valid_title(&state, &title)?;

    let body = form.map(|Form(f)| f.body).unwrap_or_default();
    let page = Page::new(&title, body.into_bytes());
    state.store.save(&page).map_err(AppError::internal)?;

    Ok(found(&format!("/view/{title}")))
}

/// 404 unless the title passes validation; runs before any handler logic
fn require_valid_title(state: &AppState, title: &str) -> Result<(), AppError> {
    if state.titles.is_valid(title) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

fn render_page(state: &AppState, template: &str, page: &Page) -> Result<Html<String>, AppError> {
    let ctx = Context::new()
        .with_text("title", &page.title)
        .with_text("body", page.body_str());
    state
        .templates
        .render(template, &ctx)
        .map(Html)
        .map_err(AppError::internal)
}

/// 302 redirect to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Route error type
#[derive(Debug)]
pub enum AppError {
    NotFound,
    Internal(String),
}

impl AppError {
    fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "404 page not found").into_response(),
            AppError::Internal(message) => {
                tracing::error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = tempdir().unwrap();
        let views = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("views");
        let templates = TemplateSet::load(&views).unwrap();
        let state = Arc::new(AppState::new(PageStore::new(dir.path()), templates));
        (dir, wiki_routes().with_state(state))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, form: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_view_existing_page() {
        let (dir, app) = test_app();
        PageStore::new(dir.path())
            .save(&Page::new("Test", b"hello".to_vec()))
            .unwrap();

        let response = app.oneshot(get("/view/Test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("hello"));
        assert!(body.contains("Test"));
    }

    #[tokio::test]
    async fn test_view_missing_redirects_to_edit() {
        let (_dir, app) = test_app();

        let response = app.oneshot(get("/view/Missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/edit/Missing"
        );
    }

    #[tokio::test]
    async fn test_view_invalid_title_is_404() {
        let (_dir, app) = test_app();

        let response = app.oneshot(get("/view/bad%20title!")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_missing_renders_blank_form() {
        let (_dir, app) = test_app();

        let response = app.oneshot(get("/edit/NewPage")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("NewPage"));
        assert!(body.contains("<textarea"));
    }

    #[tokio::test]
    async fn test_edit_existing_prefills_body() {
        let (dir, app) = test_app();
        PageStore::new(dir.path())
            .save(&Page::new("Draft", b"work in progress".to_vec()))
            .unwrap();

        let response = app.oneshot(get("/edit/Draft")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("work in progress"));
    }

    #[tokio::test]
    async fn test_edit_invalid_title_is_404() {
        let (_dir, app) = test_app();

        let response = app.oneshot(get("/edit/..%2Fetc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_persists_and_redirects() {
        let (dir, app) = test_app();

        let response = app
            .oneshot(post_form("/save/Test", "body=hello+wiki"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/view/Test"
        );

        let saved = PageStore::new(dir.path()).load("Test").unwrap();
        assert_eq!(saved.body, b"hello wiki");
    }

    #[tokio::test]
    async fn test_save_invalid_title_is_404() {
        let (dir, app) = test_app();

        let response = app
            .oneshot(post_form("/save/bad%2Ftitle", "body=x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(PageStore::new(dir.path()).list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_without_body_field_saves_empty_page() {
        let (dir, app) = test_app();

        let response = app.oneshot(post_form("/save/Blank", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);

        let saved = PageStore::new(dir.path()).load("Blank").unwrap();
        assert!(saved.body.is_empty());
    }

    #[tokio::test]
    async fn test_home_lists_stored_titles() {
        let (dir, app) = test_app();
        let store = PageStore::new(dir.path());
        store.save(&Page::new("Beta", b"b".to_vec())).unwrap();
        store.save(&Page::new("Alpha", b"a".to_vec())).unwrap();

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("/view/Alpha"));
        assert!(body.contains("/view/Beta"));
    }

    #[tokio::test]
    async fn test_home_unreadable_dir_is_500() {
        let views = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("views");
        let templates = TemplateSet::load(&views).unwrap();
        let state = Arc::new(AppState::new(
            PageStore::new("/nonexistent/wiki-data"),
            templates,
        ));
        let app = wiki_routes().with_state(state);

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_page_body_is_escaped_in_view() {
        let (dir, app) = test_app();
        PageStore::new(dir.path())
            .save(&Page::new("Xss", b"<script>alert(1)</script>".to_vec()))
            .unwrap();

        let response = app.oneshot(get("/view/Xss")).await.unwrap();
        let body = body_text(response).await;
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}
