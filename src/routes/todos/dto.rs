use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::model::{NewTodo, Priority, Todo, TodoPatch};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl CreateTodo {
    pub fn validate(self) -> Result<NewTodo, AppError> {
        let title = required_title(self.title)?;
        Ok(NewTodo {
            title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority.unwrap_or_default(),
            tags: self.tags,
            category: self.category,
            completed: self.completed,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn validate(self) -> Result<TodoPatch, AppError> {
        let title = self.title.map(required_title).transpose()?;
        Ok(TodoPatch {
            title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            tags: self.tags,
            category: self.category,
            completed: self.completed,
        })
    }
}

// present-but-null must stay distinguishable from absent
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required_title(title: String) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Complete,
    Delete,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    #[serde(default)]
    pub operation: String,
    // kept as strings so the operation is judged before the ids
    #[serde(default)]
    pub todo_ids: Vec<String>,
}

impl BulkRequest {
    pub fn operation(&self) -> Result<BulkOperation, AppError> {
        match self.operation.as_str() {
            "complete" => Ok(BulkOperation::Complete),
            "delete" => Ok(BulkOperation::Delete),
            _ => Err(AppError::BadRequest("Invalid operation".to_string())),
        }
    }

    pub fn todo_ids(&self) -> Result<Vec<Uuid>, AppError> {
        self.todo_ids
            .iter()
            .map(|id| {
                Uuid::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid todo id {id:?}")))
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub message: &'static str,
    pub affected: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_todos: i64,
}
