use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::routes::todos::{NewTodo, SortOrder, Todo, TodoFilter, TodoPatch, TodoQuery, TodoStats};
use crate::routes::users::{NewUser, User};

const TODO_COLUMNS: &str =
    "id, user_id, title, description, due_date, priority, tags, category, completed, created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filter: &TodoFilter) {
    qb.push(" WHERE user_id = ").push_bind(user_id);

    if !filter.search_terms.is_empty() {
        // terms are plain alphanumeric words, safe as to_tsquery operands;
        // search_document is built with the same word rule
        qb.push(" AND search_document @@ to_tsquery('simple', ")
            .push_bind(filter.search_terms.join(" | "))
            .push(")");
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority.as_str());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(completed) = filter.completed {
        qb.push(" AND completed = ").push_bind(completed);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Duplicate("Email"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_todo(&self, user_id: Uuid, todo: NewTodo) -> Result<Todo, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO todos (id, user_id, title, description, due_date, priority, tags, category, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TODO_COLUMNS}
            "#
        );

        let rec = sqlx::query_as::<_, Todo>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.due_date)
            .bind(todo.priority.as_str())
            .bind(todo.tags)
            .bind(todo.category)
            .bind(todo.completed)
            .fetch_one(&self.pool)
            .await?;

        Ok(rec)
    }

    async fn list_todos(
        &self,
        user_id: Uuid,
        query: &TodoQuery,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos");
        push_filter(&mut count, user_id, &query.filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // missing values sort lowest in both directions
        let nulls = match query.sort_order {
            SortOrder::Asc => "NULLS FIRST",
            SortOrder::Desc => "NULLS LAST",
        };

        let mut page = QueryBuilder::<Postgres>::new(format!("SELECT {TODO_COLUMNS} FROM todos"));
        push_filter(&mut page, user_id, &query.filter);
        page.push(format!(
            " ORDER BY {} {} {}",
            query.sort_by.column(),
            query.sort_order.keyword(),
            nulls
        ));
        page.push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let todos = page
            .build_query_as::<Todo>()
            .fetch_all(&self.pool)
            .await?;

        Ok((todos, total))
    }

    async fn get_todo(&self, user_id: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2");
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    async fn update_todo(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        if patch.is_empty() {
            return self.get_todo(user_id, id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE todos SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(title) = patch.title {
                set.push("title = ").push_bind_unseparated(title);
            }
            if let Some(description) = patch.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(due_date) = patch.due_date {
                set.push("due_date = ").push_bind_unseparated(due_date);
            }
            if let Some(priority) = patch.priority {
                set.push("priority = ").push_bind_unseparated(priority.as_str());
            }
            if let Some(tags) = patch.tags {
                set.push("tags = ").push_bind_unseparated(tags);
            }
            if let Some(category) = patch.category {
                set.push("category = ").push_bind_unseparated(category);
            }
            if let Some(completed) = patch.completed {
                set.push("completed = ").push_bind_unseparated(completed);
            }
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(format!(" RETURNING {TODO_COLUMNS}"));

        let todo = qb
            .build_query_as::<Todo>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    async fn delete_todo(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE todos
            SET completed = TRUE
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TodoStats, StoreError> {
        let stats = sqlx::query_as::<_, TodoStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE completed) AS completed,
                COUNT(*) FILTER (WHERE due_date < $2 AND NOT completed) AS overdue
            FROM todos
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
