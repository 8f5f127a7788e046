use axum::Json;
use axum::extract::{Path, Query};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use axum_extra::extract::WithRejection;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/todos/{id}/", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/agenda", get(agenda))
        .route("/agenda/", get(agenda))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_todos(
    State(state): State<AppState>,
    WithRejection(Query(pairs), _): WithRejection<Query<Vec<(String, String)>>, AppError>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let filter = TodoQueryParams::from(QueryFields::from_pairs(pairs)).into_filter()?;
    let todos = repository::fetch_todos(&state.db, &filter).await?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Todo>, AppError> {
    let todo = repository::find_todo_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Todo {} not found", id)))?;
    Ok(Json(todo))
}

async fn agenda(
    State(state): State<AppState>,
    WithRejection(Query(pairs), _): WithRejection<Query<Vec<(String, String)>>, AppError>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let date = AgendaQueryParams::from(QueryFields::from_pairs(pairs)).into_date()?;
    let todos = repository::fetch_agenda(&state.db, date).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<NewTodoRequest>, AppError>,
) -> Result<&'static str, AppError> {
    let new_todo = req.validate()?;
    repository::insert_todo(&state.db, &new_todo)
        .await
        .map_err(|err| AppError::from_insert(err, new_todo.id))?;
    debug!(
        "created todo {} ({}, {}, {}, due {})",
        new_todo.id, new_todo.category, new_todo.priority, new_todo.status, new_todo.due_date
    );
    Ok("Todo Successfully Added")
}

async fn update_todo(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateTodoRequest>, AppError>,
) -> Result<String, AppError> {
    let changes = req.validate()?;
    let field = changes
        .updated_field()
        .ok_or_else(|| AppError::BadRequest("No Todo Field Supplied".to_string()))?;

    if !repository::update_todo(&state.db, id, &changes).await? {
        return Err(AppError::NotFound(format!("Todo {} not found", id)));
    }
    Ok(format!("{} Updated", field))
}

async fn delete_todo(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<&'static str, AppError> {
    let removed = repository::delete_todo(&state.db, id).await?;
    if removed == 0 {
        debug!("delete of missing todo {}", id);
    }
    Ok("Todo Deleted")
}
