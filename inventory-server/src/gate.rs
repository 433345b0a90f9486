use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use inventory_core::auth_gate::evaluate;
use tracing::debug;

use crate::session::has_session;

/// Runs every request through the route guard before it reaches a handler.
pub async fn auth_gate_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let decision = evaluate(&path, request.uri().query(), has_session(request.headers()));

    match decision.location() {
        None => next.run(request).await,
        Some(location) => {
            debug!("🔒 {} -> {:?}", path, decision);
            redirect(&location)
        }
    }
}

pub fn redirect(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}
