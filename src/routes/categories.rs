use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        CategoryList, CategoryWithSubcategories, CreateCategoryRequest, SubcategoryList,
        SubcategoryRequest, UpdateCategoryRequest,
    },
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::{Category, Subcategory},
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route(
            "/{id}/subcategories",
            get(list_subcategories).post(create_subcategory),
        )
        .route(
            "/{id}/subcategories/{sub_id}",
            put(update_subcategory).delete(delete_subcategory),
        )
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "List categories", body = ApiResponse<CategoryList>)),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(category_service::list_categories(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category with subcategories", body = ApiResponse<CategoryWithSubcategories>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryWithSubcategories>>> {
    Ok(Json(category_service::get_category(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(category_service::create_category(&state, &user, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(category_service::update_category(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Category still has services"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(category_service::delete_category(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/subcategories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "List subcategories", body = ApiResponse<SubcategoryList>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Categories"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SubcategoryList>>> {
    Ok(Json(category_service::list_subcategories(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories/{id}/subcategories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = SubcategoryRequest,
    responses(
        (status = 200, description = "Create subcategory", body = ApiResponse<Subcategory>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SubcategoryRequest>,
) -> AppResult<Json<ApiResponse<Subcategory>>> {
    Ok(Json(
        category_service::create_subcategory(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}/subcategories/{sub_id}",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        ("sub_id" = Uuid, Path, description = "Subcategory ID"),
    ),
    request_body = SubcategoryRequest,
    responses(
        (status = 200, description = "Rename subcategory", body = ApiResponse<Subcategory>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_subcategory(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, sub_id)): Path<(Uuid, Uuid)>,
    AppJson(payload): AppJson<SubcategoryRequest>,
) -> AppResult<Json<ApiResponse<Subcategory>>> {
    Ok(Json(
        category_service::update_subcategory(&state, &user, id, sub_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}/subcategories/{sub_id}",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        ("sub_id" = Uuid, Path, description = "Subcategory ID"),
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, sub_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        category_service::delete_subcategory(&state, &user, id, sub_id).await?,
    ))
}
