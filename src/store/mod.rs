//! Persistence boundary.
//!
//! Handlers only talk to [`Store`]. Every todo operation takes the caller's
//! user id and must scope reads and writes to it; a todo owned by someone
//! else behaves exactly like a missing one.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::routes::todos::{NewTodo, Todo, TodoPatch, TodoQuery, TodoStats};
use crate::routes::users::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field already holds this value.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_todo(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError>;

    /// One page of matching todos plus the total match count.
    async fn list_todos(
        &self,
        user_id: Uuid,
        query: &TodoQuery,
    ) -> Result<(Vec<Todo>, i64), StoreError>;

    async fn get_todo(&self, user_id: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError>;

    async fn update_todo(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError>;

    /// `false` when nothing owned by `user_id` had that id.
    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    async fn complete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn delete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TodoStats, StoreError>;
}
