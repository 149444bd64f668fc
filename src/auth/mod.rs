use axum::Router;

use crate::state::AppState;

pub mod dto;
pub(crate) mod extractors;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
