use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        ConsultantList, CreateServiceRequest, ServiceDetail, ServiceList, UpdateServiceRequest,
    },
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::Service,
    response::ApiResponse,
    routes::params::ServiceQuery,
    services::offering_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route(
            "/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/{id}/consultants", get(list_service_consultants))
        .route(
            "/{id}/consultants/{consultant_id}",
            put(link_consultant).delete(unlink_consultant),
        )
}

#[utoipa::path(
    get,
    path = "/api/services",
    params(ServiceQuery),
    responses((status = 200, description = "List services", body = ApiResponse<ServiceList>)),
    tag = "Services"
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceQuery>,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    Ok(Json(offering_service::list_services(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service with linked consultants", body = ApiResponse<ServiceDetail>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Services"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ServiceDetail>>> {
    Ok(Json(offering_service::get_service(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Create service", body = ApiResponse<Service>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn create_service(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    Ok(Json(
        offering_service::create_service(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Update service", body = ApiResponse<Service>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn update_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateServiceRequest>,
) -> AppResult<Json<ApiResponse<Service>>> {
    Ok(Json(
        offering_service::update_service(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(offering_service::delete_service(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}/consultants",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Consultants offering the service", body = ApiResponse<ConsultantList>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Services"
)]
pub async fn list_service_consultants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ConsultantList>>> {
    Ok(Json(
        offering_service::list_service_consultants(&state, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/services/{id}/consultants/{consultant_id}",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("consultant_id" = Uuid, Path, description = "Consultant ID"),
    ),
    responses(
        (status = 200, description = "Consultant linked", body = ApiResponse<ServiceDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn link_consultant(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, consultant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<ServiceDetail>>> {
    Ok(Json(
        offering_service::link_consultant(&state, &user, id, consultant_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}/consultants/{consultant_id}",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("consultant_id" = Uuid, Path, description = "Consultant ID"),
    ),
    responses(
        (status = 200, description = "Consultant unlinked", body = ApiResponse<ServiceDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn unlink_consultant(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, consultant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<ServiceDetail>>> {
    Ok(Json(
        offering_service::unlink_consultant(&state, &user, id, consultant_id).await?,
    ))
}
