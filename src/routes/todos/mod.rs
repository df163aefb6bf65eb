pub mod dto;
pub mod model;
pub mod query;
pub mod routes;

pub use model::{NewTodo, Priority, Todo, TodoPatch, TodoStats};
pub use query::{SortField, SortOrder, TodoFilter, TodoQuery};
