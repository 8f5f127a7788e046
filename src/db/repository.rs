use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::warn;

use crate::models::{DueDate, NewTodo, Todo, TodoChanges, TodoFilter};

const SELECT_TODO: &str = "SELECT id, todo, category, priority, status, due_date FROM todo";

pub async fn fetch_todos(db: &SqlitePool, filter: &TodoFilter) -> Result<Vec<Todo>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_TODO);
    query.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ").push_bind(priority);
    }
    if let Some(category) = filter.category {
        query.push(" AND category = ").push_bind(category);
    }
    if let Some(due_date) = filter.due_date {
        query.push(" AND due_date = ").push_bind(due_date.canonical());
    }
    if let Some(search) = &filter.search {
        query
            .push(" AND todo LIKE ")
            .push_bind(format!("%{}%", escape_like(search)))
            .push(" ESCAPE '\\'");
    }
    query.push(" ORDER BY id");

    let rows = query.build().fetch_all(db).await?;
    Ok(rows.iter().filter_map(decode_todo).collect())
}

pub async fn fetch_agenda(db: &SqlitePool, date: Option<DueDate>) -> Result<Vec<Todo>, sqlx::Error> {
    let filter = TodoFilter {
        due_date: date,
        ..Default::default()
    };
    fetch_todos(db, &filter).await
}

pub async fn find_todo_by_id(db: &SqlitePool, id: i64) -> Result<Option<Todo>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, todo, category, priority, status, due_date FROM todo WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.as_ref().and_then(decode_todo))
}

/// Rows written outside this service may hold values outside the enumerations;
/// those are logged and skipped rather than failing the whole read.
fn decode_todo(row: &SqliteRow) -> Option<Todo> {
    match Todo::from_row(row) {
        Ok(todo) => Some(todo),
        Err(e) => {
            let id: Option<i64> = row.try_get("id").ok();
            warn!("skipping undecodable todo row {:?}: {}", id, e);
            None
        }
    }
}

pub async fn insert_todo(db: &SqlitePool, new_todo: &NewTodo) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO todo
            (id, todo, category, priority, status, due_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(new_todo.id)
    .bind(&new_todo.todo)
    .bind(new_todo.category)
    .bind(new_todo.priority)
    .bind(new_todo.status)
    .bind(new_todo.due_date.canonical())
    .execute(db)
    .await?;

    Ok(())
}

/// Writes the supplied fields over the stored row in a single statement.
///
/// Returns `false` when no row has the given id.
pub async fn update_todo(db: &SqlitePool, id: i64, changes: &TodoChanges) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE todo
        SET todo = COALESCE(?1, todo),
            priority = COALESCE(?2, priority),
            status = COALESCE(?3, status),
            category = COALESCE(?4, category),
            due_date = COALESCE(?5, due_date)
        WHERE id = ?6
        "#,
    )
    .bind(changes.todo.as_deref())
    .bind(changes.priority)
    .bind(changes.status)
    .bind(changes.category)
    .bind(changes.due_date.map(|d| d.canonical()))
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_todo(db: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todo WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
