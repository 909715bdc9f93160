use crate::search::{SearchIndex, SearchResponse};
use crate::store::{
    build_table_of_contents, Pagination, SectionRecord, SectionRepository, TocPart,
};
use crate::types::Part;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 500;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
/// Deepest hit a search page may reach; the cluster's default result window.
pub const MAX_RESULT_WINDOW: usize = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SectionRepository>,
    pub search: Option<Arc<SearchIndex>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(context: &str, err: String) -> Self {
        tracing::error!("[Api] {}: {}", context, err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("{context}: {err}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/sections", get(list_sections))
        .route("/api/sections/number/{number}", get(section_by_number))
        .route("/api/sections/{section_id}", get(section_by_id))
        .route("/api/parts", get(list_parts))
        .route("/api/parts/{part_id}", get(part_by_id))
        .route("/api/table-of-contents", get(table_of_contents))
        .route("/api/search", get(search))
        .with_state(state)
}

async fn handle_root() -> Json<Value> {
    Json(json!({
        "message": "Criminal Code API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SectionList {
    pub sections: Vec<SectionRecord>,
    pub pagination: Pagination,
}

async fn list_sections(
    State(state): State<AppState>,
    Query(params): Query<SectionsQuery>,
) -> Result<Json<SectionList>, ApiError> {
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let sections = state
        .repository
        .list_sections(skip, limit)
        .await
        .map_err(|e| ApiError::internal("Error listing sections", e))?;
    let total_items = state
        .repository
        .count_sections()
        .await
        .map_err(|e| ApiError::internal("Error counting sections", e))?;

    Ok(Json(SectionList {
        sections,
        pagination: Pagination::new(skip / limit + 1, limit, total_items),
    }))
}

async fn section_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<SectionRecord>, ApiError> {
    state
        .repository
        .section_by_number(&number)
        .await
        .map_err(|e| ApiError::internal("Error loading section", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Section with number {number} not found")))
}

async fn section_by_id(
    State(state): State<AppState>,
    Path(section_id): Path<String>,
) -> Result<Json<SectionRecord>, ApiError> {
    state
        .repository
        .section_by_id(&section_id)
        .await
        .map_err(|e| ApiError::internal("Error loading section", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Section with ID {section_id} not found")))
}

async fn list_parts(State(state): State<AppState>) -> Result<Json<Vec<Part>>, ApiError> {
    state
        .repository
        .list_parts()
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Error listing parts", e))
}

async fn part_by_id(
    State(state): State<AppState>,
    Path(part_id): Path<String>,
) -> Result<Json<Part>, ApiError> {
    state
        .repository
        .part_by_id(&part_id)
        .await
        .map_err(|e| ApiError::internal("Error loading part", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Part with ID {part_id} not found")))
}

async fn table_of_contents(State(state): State<AppState>) -> Result<Json<Vec<TocPart>>, ApiError> {
    build_table_of_contents(state.repository.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Error building table of contents", e))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(index) = state.search.as_ref() else {
        return Err(ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: "Search is not configured".to_string(),
        });
    };

    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::bad_request("q is required"));
    }
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::bad_request("page must be at least 1"));
    }
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::bad_request(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let within_window = page
        .checked_mul(page_size)
        .is_some_and(|end| end <= MAX_RESULT_WINDOW);
    if !within_window {
        return Err(ApiError::bad_request(format!(
            "page * page_size must not exceed {MAX_RESULT_WINDOW}"
        )));
    }

    index
        .search(query.trim(), page, page_size)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Error performing search", e))
}
