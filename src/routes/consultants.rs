use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        availability::{CreateSlotRequest, SlotList},
        catalog::ConsultantList,
        consultants::{
            ConsultantSelfUpdate, CreateConsultantRequest, UpdateConsultantRequest,
            UpdateStatusRequest,
        },
    },
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::{AvailabilitySlot, Consultant, ConsultantProfile},
    response::ApiResponse,
    routes::params::{ConsultantQuery, SlotQuery},
    services::{availability_service, consultant_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_consultants).post(create_consultant))
        .route(
            "/{id}",
            get(get_consultant)
                .put(update_consultant)
                .delete(delete_consultant),
        )
        .route("/{id}/profile", get(get_profile).patch(update_profile))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/availability", get(list_slots).post(create_slot))
        .route("/{id}/availability/{slot_id}", delete(delete_slot))
}

#[utoipa::path(
    get,
    path = "/api/consultants",
    params(ConsultantQuery),
    responses((status = 200, description = "List consultants", body = ApiResponse<ConsultantList>)),
    tag = "Consultants"
)]
pub async fn list_consultants(
    State(state): State<AppState>,
    Query(query): Query<ConsultantQuery>,
) -> AppResult<Json<ApiResponse<ConsultantList>>> {
    Ok(Json(consultant_service::list_consultants(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/consultants/{id}",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    responses(
        (status = 200, description = "Public consultant profile", body = ApiResponse<Consultant>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Consultants"
)]
pub async fn get_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Consultant>>> {
    Ok(Json(consultant_service::get_consultant(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/consultants",
    request_body = CreateConsultantRequest,
    responses(
        (status = 200, description = "Create consultant", body = ApiResponse<ConsultantProfile>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn create_consultant(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateConsultantRequest>,
) -> AppResult<Json<ApiResponse<ConsultantProfile>>> {
    Ok(Json(
        consultant_service::create_consultant(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/consultants/{id}",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    request_body = UpdateConsultantRequest,
    responses(
        (status = 200, description = "Update consultant", body = ApiResponse<ConsultantProfile>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn update_consultant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateConsultantRequest>,
) -> AppResult<Json<ApiResponse<ConsultantProfile>>> {
    Ok(Json(
        consultant_service::update_consultant(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/consultants/{id}",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Consultant has appointments"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn delete_consultant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        consultant_service::delete_consultant(&state, &user, id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consultants/{id}/profile",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    responses(
        (status = 200, description = "Full profile", body = ApiResponse<ConsultantProfile>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ConsultantProfile>>> {
    Ok(Json(consultant_service::get_profile(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/consultants/{id}/profile",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    request_body = ConsultantSelfUpdate,
    responses(
        (status = 200, description = "Self-service profile update", body = ApiResponse<ConsultantProfile>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ConsultantSelfUpdate>,
) -> AppResult<Json<ApiResponse<ConsultantProfile>>> {
    Ok(Json(
        consultant_service::update_own_profile(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/consultants/{id}/status",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Online/offline toggled", body = ApiResponse<Consultant>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Consultants"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Consultant>>> {
    Ok(Json(
        consultant_service::set_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consultants/{id}/availability",
    params(
        ("id" = Uuid, Path, description = "Consultant ID"),
        SlotQuery,
    ),
    responses(
        (status = 200, description = "Availability slots", body = ApiResponse<SlotList>),
        (status = 404, description = "Consultant not found"),
    ),
    tag = "Availability"
)]
pub async fn list_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<ApiResponse<SlotList>>> {
    Ok(Json(availability_service::list_slots(&state, id, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/consultants/{id}/availability",
    params(("id" = Uuid, Path, description = "Consultant ID")),
    request_body = CreateSlotRequest,
    responses(
        (status = 200, description = "Slot created", body = ApiResponse<AvailabilitySlot>),
        (status = 400, description = "Invalid time range"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an existing slot"),
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn create_slot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateSlotRequest>,
) -> AppResult<Json<ApiResponse<AvailabilitySlot>>> {
    Ok(Json(
        availability_service::create_slot(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/consultants/{id}/availability/{slot_id}",
    params(
        ("id" = Uuid, Path, description = "Consultant ID"),
        ("slot_id" = Uuid, Path, description = "Slot ID"),
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slot is booked"),
    ),
    security(("bearer_auth" = [])),
    tag = "Availability"
)]
pub async fn delete_slot(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, slot_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        availability_service::delete_slot(&state, &user, id, slot_id).await?,
    ))
}
