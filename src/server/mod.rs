//! HTTP server rendering the listing in a browser.

mod page;

use std::sync::Arc;

use axum::{Json, Router};
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::{AppConfig, FileRecord, NoProgress, NodeView, Session};

/// Progress of the background listing load.
#[derive(Debug)]
pub enum LoadState {
    /// The listing is still being fetched.
    Loading,
    /// The listing is available.
    Ready(Session),
    /// The fetch failed; the message is shown to the user.
    Failed(String),
}

/// The loaded session is shared by every client and never mutated; each page
/// expands and collapses directories in its own copy of the tree.
#[derive(Clone)]
struct AppState {
    load: Arc<RwLock<LoadState>>,
    title: Arc<str>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum TreeResponse {
    Loading,
    Error {
        message: String,
    },
    Ready {
        title: String,
        file_count: usize,
        tree: NodeView,
    },
}

impl From<&LoadState> for TreeResponse {
    fn from(state: &LoadState) -> Self {
        match state {
            LoadState::Loading => Self::Loading,
            LoadState::Failed(message) => Self::Error {
                message: message.clone(),
            },
            LoadState::Ready(session) => Self::Ready {
                title: session.title().to_string(),
                file_count: session.files().len(),
                tree: session.tree().to_view(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Html(page::index_html(&state.title))
}

async fn api_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn api_tree(State(state): State<AppState>) -> Json<TreeResponse> {
    let load = state.load.read().await;
    Json(TreeResponse::from(&*load))
}

fn ready_files(load: &LoadState, view: impl FnOnce(&Session) -> Vec<&FileRecord>) -> Vec<FileRecord> {
    match load {
        LoadState::Ready(session) => view(session).into_iter().cloned().collect(),
        LoadState::Loading | LoadState::Failed(_) => Vec::new(),
    }
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let load = state.load.read().await;
    Json(ready_files(&load, |s| s.search(&params.q)))
}

async fn api_recent(State(state): State<AppState>) -> impl IntoResponse {
    let load = state.load.read().await;
    Json(ready_files(&load, Session::recent))
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(api_health))
        .route("/api/tree", get(api_tree))
        .route("/api/search", get(api_search))
        .route("/api/recent", get(api_recent))
        .layer(cors)
        .with_state(state)
}

/// Serves the listing, loading it in the background.
///
/// The page is available immediately and shows a loading placeholder until
/// the fetch completes, or the error if it fails.
///
/// # Errors
///
/// Returns an error if the configuration names no bucket or the server
/// cannot bind to the configured address.
pub async fn run(config: AppConfig) -> crate::Result<()> {
    config.validate()?;

    let state = AppState {
        load: Arc::new(RwLock::new(LoadState::Loading)),
        title: Arc::from(config.listing.title()),
    };

    let load = Arc::clone(&state.load);
    let listing = config.listing.clone();
    tokio::spawn(async move {
        let result = Session::fetch(&listing, &NoProgress).await;
        let next = match result {
            Ok(session) => {
                log::info!("Listing ready: {} files", session.files().len());
                LoadState::Ready(session)
            }
            Err(e) => {
                log::error!("Failed to load listing for {}: {e}", listing.bucket);
                LoadState::Failed(e.to_string())
            }
        };
        *load.write().await = next;
    });

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    log::info!("Serving listing on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListingConfig;
    use crate::tree::tests::file;
    use chrono::Utc;

    fn ready_state() -> AppState {
        let files = vec![file("opx/1.0/a.bin"), file("opx/2.0/a.bin")];
        let session = Session::from_files(&ListingConfig::new("bucket"), files, Utc::now());
        AppState {
            load: Arc::new(RwLock::new(LoadState::Ready(session))),
            title: Arc::from("bucket Listing"),
        }
    }

    fn loading_state() -> AppState {
        AppState {
            load: Arc::new(RwLock::new(LoadState::Loading)),
            title: Arc::from("bucket Listing"),
        }
    }

    #[test]
    fn tree_response_reports_load_status() {
        let loading = serde_json::to_value(TreeResponse::from(&LoadState::Loading)).unwrap();
        assert_eq!(loading["status"], "loading");

        let failed =
            serde_json::to_value(TreeResponse::from(&LoadState::Failed("boom".to_string())))
                .unwrap();
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["message"], "boom");
    }

    #[tokio::test]
    async fn tree_response_includes_nested_tree() {
        let state = ready_state();
        let load = state.load.read().await;
        let json = serde_json::to_value(TreeResponse::from(&*load)).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["title"], "bucket Listing");
        assert_eq!(json["file_count"], 2);
        assert_eq!(json["tree"]["children"][0]["name"], "opx");
    }

    #[tokio::test]
    async fn every_client_gets_the_default_tree() {
        let state = ready_state();

        let mut first = api_tree(State(state.clone())).await.0;
        if let TreeResponse::Ready { tree, .. } = &mut first {
            // a page collapsing "opx" only changes its own copy
            tree.children[0].show = false;
        }

        let second = serde_json::to_value(api_tree(State(state)).await.0).unwrap();
        assert_eq!(second["tree"]["children"][0]["name"], "opx");
        assert_eq!(second["tree"]["children"][0]["show"], true);
        assert_eq!(second["tree"]["children"][0]["children"][0]["show"], true);
        assert_eq!(second["tree"]["children"][0]["children"][1]["show"], false);
    }

    #[tokio::test]
    async fn views_are_empty_until_loaded() {
        let state = loading_state();
        let load = state.load.read().await;
        assert!(ready_files(&load, Session::recent).is_empty());
    }

    #[tokio::test]
    async fn search_uses_session() {
        let state = ready_state();
        let load = state.load.read().await;
        let hits = ready_files(&load, |s| s.search("2.0"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "opx/2.0/a.bin");
        assert!(ready_files(&load, |s| s.search("")).is_empty());
    }

    #[test]
    fn router_builds() {
        let _ = router(loading_state());
    }
}
