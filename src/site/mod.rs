//! HTTP surface of the site: page rendering, static assets and the
//! development CMS proxy.

pub mod components;
pub mod layout;
pub mod pages;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::agenda::AgendaService;
use crate::cms::CmsClient;
use crate::cms::menu;
use crate::config::SiteConfig;
use crate::routes::Route;
use crate::ui::store::{HeaderMode, scoped_header_mode};
use layout::Chrome;
use pages::PageOutcome;

pub const PROXY_PREFIX: &str = "/strapi-api";

/// Forwards browser CMS calls to the real API and attaches the token server-side.
#[derive(Debug, Clone)]
pub struct DevProxy {
    http: reqwest::Client,
    target: String,
    token: Option<String>,
}

impl DevProxy {
    pub fn new(target: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            target: target.trim().trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Option<Self> {
        let target = config.api_url.as_deref()?;
        Some(Self::new(target, config.api_token.clone()))
    }

    async fn forward(&self, rest: &str, query: Option<&str>) -> Result<Response, reqwest::Error> {
        let mut url = format!("{}/{}", self.target, rest.trim_start_matches('/'));
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        tracing::debug!(url = %url, "proxying cms request");

        let mut request = self.http.get(&url).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let upstream = request.send().await?;
        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| HeaderValue::from_str(v).ok());
        let body = upstream.bytes().await?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        if let Some(content_type) = content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        Ok(response)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cms: CmsClient,
    pub agenda: Arc<AgendaService>,
    pub proxy: Option<Arc<DevProxy>>,
}

impl AppState {
    pub fn new(cms: CmsClient, agenda: AgendaService) -> Self {
        Self {
            cms,
            agenda: Arc::new(agenda),
            proxy: None,
        }
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: DevProxy) -> Self {
        self.proxy = Some(Arc::new(proxy));
        self
    }
}

pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route(&format!("{PROXY_PREFIX}/*rest"), get(proxy_handler));
    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }
    app.fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn proxy_handler(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    uri: Uri,
) -> Response {
    let Some(proxy) = state.proxy.as_deref() else {
        return (StatusCode::NOT_FOUND, "cms proxy is only available in dev mode\n").into_response();
    };
    match proxy.forward(&rest, uri.query()).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "cms proxy request failed");
            (StatusCode::BAD_GATEWAY, format!("cms proxy failed: {err}\n")).into_response()
        }
    }
}

async fn page_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path();
    let route = Route::parse(path);
    tracing::debug!(path, ?route, "render page");

    let (outcome, menu) = tokio::join!(
        pages::render(&state, &route, path, &query),
        menu::fetch_menu(&state.cms)
    );
    let menu = menu.unwrap_or_else(|err| {
        tracing::error!(error = %err, "error loading menu");
        Vec::new()
    });

    match outcome {
        PageOutcome::Redirect(target) => Redirect::temporary(&target).into_response(),
        PageOutcome::Html { status, title, main } => {
            let mut chrome = Chrome::new(path, menu);
            chrome.apply_query(&query);
            let _mode = scoped_header_mode(&chrome.header_mode, HeaderMode::for_route(&route));
            (status, Html(layout::document(&chrome, &title, &main))).into_response()
        }
    }
}
