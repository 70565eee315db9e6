use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
    Json, Router,
};
use chrono::Utc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::error;

use crate::content_loader;
use crate::error::{Error, Result};
use crate::feed;
use crate::hot_reload::ws_handler;
use crate::manifest::WebManifest;
use crate::markdown::{render_document, render_markdown_to_html};
use crate::og_image;
use crate::pages;
use crate::robots::render_robots;
use crate::sitemap;
use crate::state::{AppState, RouterState};

const XML: &str = "application/xml";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub fn router(router_state: RouterState) -> Router {
    let static_dir = router_state.app_state.config.static_dir();
    let static_files = get_service(ServeDir::new(&static_dir));
    let favicon_ico = get_service(ServeFile::new(static_dir.join("favicon.ico")));

    Router::new()
        .route("/", get(homepage))
        .route("/about", get(about))
        .route("/blog", get(blog_index))
        .route("/blog/{slug}", get(render_post))
        .route("/blog/{slug}/opengraph-image", get(post_og_image))
        .route("/projects", get(projects_index))
        .route("/projects/{slug}", get(render_project))
        .route("/projects/{slug}/opengraph-image", get(project_og_image))
        .route("/opengraph-image", get(site_og_image))
        .route("/feed.xml", get(rss_feed))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/robots.txt", get(robots_txt))
        .route("/manifest.json", get(manifest_json))
        .nest_service("/static", static_files)
        .route_service("/favicon.ico", favicon_ico)
        .route("/ws", get(ws_handler))
        .fallback(fallback)
        .with_state(router_state)
}

async fn not_found(state: &AppState, path: &str) -> Response {
    let page = pages::not_found(&state.config, path);
    (StatusCode::NOT_FOUND, Html(state.render(&page).await)).into_response()
}

async fn fallback(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    not_found(&state, uri.path()).await
}

async fn homepage(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let config = &state.config;
    let posts = content_loader::all_posts(&config.blog_dir()).await?;
    let featured = content_loader::featured_projects(&config.projects_dir()).await?;
    let page = pages::home(config, &featured, &posts);
    Ok(Html(state.render(&page).await))
}

async fn about(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let about_md = content_loader::find_page(&state.config.content_dir, "about").await?;
    let about_html = about_md.map(|md| render_markdown_to_html(&md));
    let page = pages::about(&state.config, about_html.as_deref());
    Ok(Html(state.render(&page).await))
}

async fn blog_index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let posts = content_loader::all_posts(&state.config.blog_dir()).await?;
    let page = pages::blog_index(&state.config, &posts);
    Ok(Html(state.render(&page).await))
}

async fn render_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let dir = state.config.blog_dir();
    let Some(post) = content_loader::find_post(&dir, &slug).await? else {
        return Ok(not_found(&state, &format!("/blog/{slug}")).await);
    };
    let posts = content_loader::all_posts(&dir).await?;
    let (older, newer) = content_loader::neighbours(&posts, &slug);
    let rendered = render_document(&post.content);
    let page = pages::post(&state.config, &post, &rendered, older, newer);
    Ok(Html(state.render(&page).await).into_response())
}

async fn projects_index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let projects = content_loader::all_projects(&state.config.projects_dir()).await?;
    let page = pages::projects_index(&state.config, &projects);
    Ok(Html(state.render(&page).await))
}

async fn render_project(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let Some(project) = content_loader::find_project(&state.config.projects_dir(), &slug).await? else {
        return Ok(not_found(&state, &format!("/projects/{slug}")).await);
    };
    let rendered = render_document(&project.content);
    let page = pages::project(&state.config, &project, &rendered);
    Ok(Html(state.render(&page).await).into_response())
}

fn og_card(title: &str, byline: &str) -> Result<Response> {
    let png = og_image::render_png(title, byline)?;
    Ok(([(header::CONTENT_TYPE, og_image::CONTENT_TYPE)], png).into_response())
}

async fn site_og_image(State(state): State<Arc<AppState>>) -> Result<Response> {
    let config = &state.config;
    og_card(
        &format!("{} - {}", config.author, config.job_title),
        &config.site_name,
    )
}

async fn post_og_image(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let post = content_loader::find_post(&state.config.blog_dir(), &slug).await?;
    let title = post.map_or_else(|| "Blog Post".to_string(), |p| p.meta.title);
    og_card(&title, &format!("by {}", state.config.author))
}

async fn project_og_image(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let project = content_loader::find_project(&state.config.projects_dir(), &slug).await?;
    let title = project.map_or_else(|| "Project".to_string(), |p| p.title);
    og_card(&title, &format!("by {}", state.config.author))
}

async fn rss_feed(State(state): State<Arc<AppState>>) -> Result<Response> {
    let posts = content_loader::all_posts(&state.config.blog_dir()).await?;
    let xml = feed::render_rss(&state.config, &posts, Utc::now());
    Ok((
        [
            (header::CONTENT_TYPE, feed::CONTENT_TYPE),
            (header::CACHE_CONTROL, feed::CACHE_CONTROL),
        ],
        xml,
    )
        .into_response())
}

async fn sitemap_xml(State(state): State<Arc<AppState>>) -> Result<Response> {
    let config = &state.config;
    let posts = content_loader::all_posts(&config.blog_dir()).await?;
    let projects = content_loader::all_projects(&config.projects_dir()).await?;
    let urls = sitemap::entries(config, &posts, &projects, Utc::now());
    Ok(([(header::CONTENT_TYPE, XML)], sitemap::render_xml(&urls)).into_response())
}

async fn robots_txt(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.config),
    )
        .into_response()
}

async fn manifest_json(State(state): State<Arc<AppState>>) -> Json<WebManifest> {
    Json(WebManifest::for_site(&state.config))
}
