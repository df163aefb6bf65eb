use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::routes::todos::query::search_terms;
use crate::routes::todos::{
    NewTodo, SortField, SortOrder, Todo, TodoFilter, TodoPatch, TodoQuery, TodoStats,
};
use crate::routes::users::{NewUser, User};

/// In-process store. Todos are kept in insertion order, which is the
/// natural order ties fall back to.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn selects(todo: &Todo, user_id: Uuid, filter: &TodoFilter) -> bool {
    if todo.user_id != user_id {
        return false;
    }
    if filter.priority.is_some_and(|p| p != todo.priority) {
        return false;
    }
    if filter
        .category
        .as_ref()
        .is_some_and(|c| todo.category.as_ref() != Some(c))
    {
        return false;
    }
    if filter.completed.is_some_and(|c| c != todo.completed) {
        return false;
    }
    if !filter.search_terms.is_empty() {
        let mut words: HashSet<String> = HashSet::new();
        words.extend(search_terms(&todo.title));
        words.extend(todo.description.as_deref().map(search_terms).unwrap_or_default());
        for tag in &todo.tags {
            words.extend(search_terms(tag));
        }
        words.extend(todo.category.as_deref().map(search_terms).unwrap_or_default());

        if !filter.search_terms.iter().any(|t| words.contains(t)) {
            return false;
        }
    }
    true
}

// None sorts before Some, like a missing field
fn compare(a: &Todo, b: &Todo, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::DueDate => a.due_date.cmp(&b.due_date),
        SortField::Priority => a.priority.as_str().cmp(b.priority.as_str()),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Category => a.category.cmp(&b.category),
        SortField::Completed => a.completed.cmp(&b.completed),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("Email"));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_todo(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError> {
        let created = Todo {
            id: Uuid::new_v4(),
            user_id,
            title: todo.title,
            description: todo.description,
            due_date: todo.due_date,
            priority: todo.priority,
            tags: todo.tags,
            category: todo.category,
            completed: todo.completed,
            created_at: Utc::now(),
        };
        self.todos.write().await.push(created.clone());
        Ok(created)
    }

    async fn list_todos(
        &self,
        user_id: Uuid,
        query: &TodoQuery,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        let todos = self.todos.read().await;
        let mut matching: Vec<&Todo> = todos
            .iter()
            .filter(|t| selects(t, user_id, &query.filter))
            .collect();

        // stable, so ties keep insertion order
        matching.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(0))
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_todo(&self, user_id: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn update_todo(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
        else {
            return Ok(None);
        };
        patch.apply(todo);
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(todos.len() < before)
    }

    async fn complete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        let mut affected = 0;
        for todo in todos
            .iter_mut()
            .filter(|t| t.user_id == user_id && ids.contains(&t.id))
        {
            todo.completed = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| !(t.user_id == user_id && ids.contains(&t.id)));
        Ok((before - todos.len()) as u64)
    }

    async fn stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TodoStats, StoreError> {
        let todos = self.todos.read().await;
        let mut stats = TodoStats::default();
        for todo in todos.iter().filter(|t| t.user_id == user_id) {
            stats.total += 1;
            if todo.completed {
                stats.completed += 1;
            }
            if todo.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        Ok(stats)
    }
}
