use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::appointments::{
        AppointmentList, BookAppointmentRequest, BookingCreated, ConfirmationResult,
    },
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::Appointment,
    payments::PaymentConfirmation,
    response::ApiResponse,
    routes::params::AppointmentListQuery,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(book_appointment).get(list_appointments))
        .route("/{id}", get(get_appointment))
        .route("/{id}/confirm", post(confirm_payment))
        .route("/{id}/cancel", post(cancel_appointment))
}

/// Guest checkout is allowed; a client token links the booking to the account.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 200, description = "Pending appointment and payment order", body = ApiResponse<BookingCreated>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Consultant or slot not found"),
        (status = 409, description = "Slot already booked"),
        (status = 502, description = "Payment provider unavailable"),
    ),
    tag = "Appointments"
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppJson(payload): AppJson<BookAppointmentRequest>,
) -> AppResult<Json<ApiResponse<BookingCreated>>> {
    let resp = booking_service::initiate_booking(&state, user.as_ref(), payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/confirm",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = PaymentConfirmation,
    responses(
        (status = 200, description = "Payment verified", body = ApiResponse<ConfirmationResult>),
        (status = 400, description = "Signature or order mismatch"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Appointment no longer payable"),
    ),
    tag = "Appointments"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<PaymentConfirmation>,
) -> AppResult<Json<ApiResponse<ConfirmationResult>>> {
    Ok(Json(booking_service::confirm_payment(&state, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Cancelled", body = ApiResponse<Appointment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Appointment already expired"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    Ok(Json(
        booking_service::cancel_appointment(&state, &user, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = ApiResponse<Appointment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    Ok(Json(booking_service::get_appointment(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "Appointments visible to the caller", body = ApiResponse<AppointmentList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> AppResult<Json<ApiResponse<AppointmentList>>> {
    Ok(Json(
        booking_service::list_appointments(&state, &user, query).await?,
    ))
}
