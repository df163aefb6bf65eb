use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{BulkOperation, BulkRequest, BulkResponse, CreateTodo, TodoListResponse, UpdateTodo};
use super::query::{ListParams, TodoQuery};
use crate::error::{AppError, AppJson, AppQuery, MessageResponse};
use crate::routes::middleware_auth::AuthUser;
use crate::state::AppState;

const NOT_FOUND: &str = "Todo not found";

// a non-UUID id can never name an owned todo
fn todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(NOT_FOUND))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<CreateTodo>,
) -> Result<impl IntoResponse, AppError> {
    let new = body.validate()?;
    let todo = state.store.create_todo(user_id, new).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = TodoQuery::try_from(params)?;
    let (todos, total) = state.store.list_todos(user_id, &query).await?;

    Ok(Json(TodoListResponse {
        todos,
        total_pages: query.total_pages(total),
        current_page: query.page,
        total_todos: total,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = todo_id(&id)?;
    match state.store.get_todo(user_id, id).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(AppError::NotFound(NOT_FOUND)),
    }
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateTodo>,
) -> Result<impl IntoResponse, AppError> {
    let id = todo_id(&id)?;
    let patch = body.validate()?;
    match state.store.update_todo(user_id, id, patch).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(AppError::NotFound(NOT_FOUND)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = todo_id(&id)?;
    if !state.store.delete_todo(user_id, id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    Ok(Json(MessageResponse::new("Todo deleted")))
}

pub async fn bulk(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<BulkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let operation = body.operation()?;
    let ids = body.todo_ids()?;
    let affected = match operation {
        BulkOperation::Complete => state.store.complete_many(user_id, &ids).await?,
        BulkOperation::Delete => state.store.delete_many(user_id, &ids).await?,
    };

    tracing::debug!(%user_id, operation = %body.operation, affected, "bulk operation");

    Ok(Json(BulkResponse {
        message: "Bulk operation successful",
        affected,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.store.stats(user_id, Utc::now()).await?;
    Ok(Json(stats))
}
