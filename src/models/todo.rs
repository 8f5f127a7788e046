use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::{AppError, ValidationError};
use crate::models::fields::{Category, DueDate, Priority, Status, parse_field};

/// A stored todo row, serialized in the external `dueDate` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub todo: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    #[serde(rename = "dueDate")]
    pub due_date: String,
}

/// Raw query string values keyed by name.
///
/// A key given once holds a string; a key repeated holds an array, which
/// the field checks reject like any other non-member value.
#[derive(Debug, Clone, Default)]
pub struct QueryFields(HashMap<String, Vec<String>>);

impl QueryFields {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            fields.entry(key).or_default().push(value);
        }
        Self(fields)
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        let mut values = self.0.remove(name)?;
        if values.len() == 1 {
            values.pop().map(Value::String)
        } else {
            Some(Value::Array(values.into_iter().map(Value::String).collect()))
        }
    }

    fn take_last(&mut self, name: &str) -> Option<String> {
        self.0.remove(name).and_then(|mut values| values.pop())
    }
}

/// Query string accepted by `GET /todos/`.
#[derive(Debug, Clone, Default)]
pub struct TodoQueryParams {
    pub status: Option<Value>,
    pub priority: Option<Value>,
    pub category: Option<Value>,
    pub date: Option<Value>,
    pub search_q: Option<String>,
}

/// Query string accepted by `GET /agenda/`.
#[derive(Debug, Clone, Default)]
pub struct AgendaQueryParams {
    pub status: Option<Value>,
    pub priority: Option<Value>,
    pub category: Option<Value>,
    pub date: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<DueDate>,
    pub search: Option<String>,
}

impl From<QueryFields> for TodoQueryParams {
    fn from(mut fields: QueryFields) -> Self {
        Self {
            status: fields.take("status"),
            priority: fields.take("priority"),
            category: fields.take("category"),
            date: fields.take("date"),
            search_q: fields.take_last("search_q"),
        }
    }
}

impl From<QueryFields> for AgendaQueryParams {
    fn from(mut fields: QueryFields) -> Self {
        Self {
            status: fields.take("status"),
            priority: fields.take("priority"),
            category: fields.take("category"),
            date: fields.take("date"),
        }
    }
}

impl TodoQueryParams {
    pub fn into_filter(self) -> Result<TodoFilter, ValidationError> {
        Ok(TodoFilter {
            status: parse_field(self.status.as_ref())?,
            priority: parse_field(self.priority.as_ref())?,
            category: parse_field(self.category.as_ref())?,
            due_date: parse_field(self.date.as_ref())?,
            search: self.search_q.filter(|q| !q.is_empty()),
        })
    }
}

impl AgendaQueryParams {
    /// Checks every field and returns the requested day.
    ///
    /// Status, priority and category are validated but do not narrow the agenda.
    pub fn into_date(self) -> Result<Option<DueDate>, ValidationError> {
        parse_field::<Status>(self.status.as_ref())?;
        parse_field::<Priority>(self.priority.as_ref())?;
        parse_field::<Category>(self.category.as_ref())?;
        parse_field(self.date.as_ref())
    }
}

/// Body of `POST /todos/`. Fields stay raw JSON until checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodoRequest {
    pub id: Option<Value>,
    pub todo: Option<Value>,
    pub category: Option<Value>,
    pub priority: Option<Value>,
    pub status: Option<Value>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub id: i64,
    pub todo: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: DueDate,
}

impl NewTodoRequest {
    /// Member checks run first, in status, priority, category, due date
    /// order; missing or ill-typed fields are reported after them.
    pub fn validate(self) -> Result<NewTodo, AppError> {
        let status = parse_field::<Status>(self.status.as_ref())?;
        let priority = parse_field::<Priority>(self.priority.as_ref())?;
        let category = parse_field::<Category>(self.category.as_ref())?;
        let due_date = parse_field::<DueDate>(self.due_date.as_ref())?;

        Ok(NewTodo {
            id: parse_id(self.id)?,
            todo: text_field(self.todo)?.ok_or_else(|| missing("todo"))?,
            category: category.ok_or_else(|| missing("category"))?,
            priority: priority.ok_or_else(|| missing("priority"))?,
            status: status.ok_or_else(|| missing("status"))?,
            due_date: due_date.ok_or_else(|| missing("dueDate"))?,
        })
    }
}

/// Body of `PUT /todos/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub todo: Option<Value>,
    pub priority: Option<Value>,
    pub status: Option<Value>,
    pub category: Option<Value>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub todo: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub due_date: Option<DueDate>,
}

impl UpdateTodoRequest {
    pub fn validate(self) -> Result<TodoChanges, AppError> {
        let status = parse_field(self.status.as_ref())?;
        let priority = parse_field(self.priority.as_ref())?;
        let category = parse_field(self.category.as_ref())?;
        let due_date = parse_field(self.due_date.as_ref())?;

        Ok(TodoChanges {
            todo: text_field(self.todo)?,
            priority,
            status,
            category,
            due_date,
        })
    }
}

fn missing(name: &str) -> AppError {
    AppError::BadRequest(format!("missing field `{}`", name))
}

fn parse_id(value: Option<Value>) -> Result<i64, AppError> {
    let invalid = || AppError::BadRequest("field `id` must be an integer".to_string());
    match value {
        None | Some(Value::Null) => Err(missing("id")),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

fn text_field(value: Option<Value>) -> Result<Option<String>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(AppError::BadRequest("field `todo` must be a string".to_string())),
    }
}

impl TodoChanges {
    /// Label of the field reported back to the caller.
    ///
    /// Only the first supplied field in the order todo, priority, status,
    /// category, due date is named, even when several are written.
    pub fn updated_field(&self) -> Option<&'static str> {
        if self.todo.is_some() {
            Some("Todo")
        } else if self.priority.is_some() {
            Some("Priority")
        } else if self.status.is_some() {
            Some("Status")
        } else if self.category.is_some() {
            Some("Category")
        } else if self.due_date.is_some() {
            Some("Due Date")
        } else {
            None
        }
    }
}
