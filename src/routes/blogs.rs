use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
    error::{AppError, AppResult},
    middleware::{auth::AuthUser, json::AppJson},
    models::Blog,
    response::ApiResponse,
    routes::params::BlogQuery,
    services::blog_service,
    state::AppState,
};

// Reads address a post by slug, writes by id. Both share one path segment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/{key}", get(get_blog).put(update_blog).delete(delete_blog))
}

fn blog_id(key: &str) -> AppResult<Uuid> {
    key.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid blog id: {key}")))
}

#[utoipa::path(
    get,
    path = "/api/blogs",
    params(BlogQuery),
    responses(
        (status = 200, description = "Published posts", body = ApiResponse<BlogList>),
        (status = 403, description = "Drafts requested without superadmin"),
    ),
    tag = "Blogs"
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<BlogQuery>,
) -> AppResult<Json<ApiResponse<BlogList>>> {
    Ok(Json(
        blog_service::list_blogs(&state, user.as_ref(), query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Blog post", body = ApiResponse<Blog>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Blogs"
)]
pub async fn get_blog(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    Ok(Json(
        blog_service::get_blog(&state, user.as_ref(), &key).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 200, description = "Blog created", body = ApiResponse<Blog>),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn create_blog(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    Ok(Json(blog_service::create_blog(&state, &user, payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = ApiResponse<Blog>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn update_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
    AppJson(payload): AppJson<UpdateBlogRequest>,
) -> AppResult<Json<ApiResponse<Blog>>> {
    let id = blog_id(&key)?;
    Ok(Json(
        blog_service::update_blog(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Blogs"
)]
pub async fn delete_blog(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let id = blog_id(&key)?;
    Ok(Json(blog_service::delete_blog(&state, &user, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_routes_require_uuid_keys() {
        let id = Uuid::new_v4();
        assert_eq!(blog_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            blog_id("my-first-post"),
            Err(AppError::BadRequest(_))
        ));
    }
}
