mod health;
mod updates;

use axum::Router;

use crate::error::AppError;
use crate::AppState;

/// Answer for a known path requested with an unsupported method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Create the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(updates::router())
}
