//! Health check handler

use crate::web::responses::HealthResponse;

/// Liveness only; upstreams are not contacted
pub async fn health_check() -> HealthResponse {
    HealthResponse::healthy()
}
