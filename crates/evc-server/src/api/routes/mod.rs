//! Registration of the HTTP route modules.

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod autotest;
pub mod chat;
pub mod conversations;
pub mod export;
pub mod facts;
pub mod health;
pub mod reset;
pub mod state;

pub fn all_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(chat::router())
        .merge(self::state::router())
        .merge(reset::router())
        .merge(conversations::router())
        .merge(facts::router())
        .merge(export::router())
        .merge(autotest::router())
}
