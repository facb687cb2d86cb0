use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::appointments::ExpireResult,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/appointments/expire", post(expire_pending))
}

/// Runs the pending-checkout sweep immediately instead of waiting for the
/// next tick.
#[utoipa::path(
    post,
    path = "/api/admin/appointments/expire",
    responses(
        (status = 200, description = "Stale pending bookings expired", body = ApiResponse<ExpireResult>),
        (status = 400, description = "Expiry disabled"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn expire_pending(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ExpireResult>>> {
    Ok(Json(booking_service::expire_now(&state, &user).await?))
}
