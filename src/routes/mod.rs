use axum::{
    middleware,
    routing::{get, post},
    Router,
};

mod health;
pub mod middleware_auth;
pub mod todos;
pub mod users;

pub use health::health;

use crate::state::AppState;

/// The guard layer needs the state up front for the signing secret.
pub fn routes(state: AppState) -> Router<AppState> {
    let user_router = Router::new()
        .route("/register", post(users::routes::register))
        .route("/login", post(users::routes::login));

    let todo_router = Router::new()
        .route("/", post(todos::routes::create).get(todos::routes::list))
        .route("/bulk", post(todos::routes::bulk))
        .route("/stats/overview", get(todos::routes::stats))
        .route(
            "/{id}",
            get(todos::routes::get)
                .put(todos::routes::update)
                .delete(todos::routes::delete),
        )
        .layer(middleware::from_fn_with_state(
            state,
            middleware_auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/users", user_router)
                .nest("/todos", todo_router),
        )
}
