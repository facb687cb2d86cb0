use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use uuid::Uuid;

use crate::{
    audit,
    dto::blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
    entity::blogs::{ActiveModel, Column, Entity as Blogs},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::Blog,
    response::{ApiResponse, Meta},
    routes::params::BlogQuery,
    state::AppState,
    validate,
};

/// Drafts are only listed for a superadmin that asks for them.
pub async fn list_blogs(
    state: &AppState,
    user: Option<&AuthUser>,
    query: BlogQuery,
) -> AppResult<ApiResponse<BlogList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let include_drafts = query.include_drafts.unwrap_or(false);
    if include_drafts {
        ensure_superadmin(user.ok_or_else(|| {
            AppError::Unauthorized("Missing Authorization header".into())
        })?)?;
    }

    let mut condition = Condition::all();
    if !include_drafts {
        condition = condition.add(Column::Published.eq(true));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Summary).ilike(pattern)),
        );
    }

    let finder = Blogs::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Blog::from)
        .collect();

    Ok(ApiResponse::success(
        "Blogs",
        BlogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_blog(
    state: &AppState,
    user: Option<&AuthUser>,
    slug: &str,
) -> AppResult<ApiResponse<Blog>> {
    let blog = Blogs::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let can_see_drafts = user.is_some_and(AuthUser::is_superadmin);
    if !blog.published && !can_see_drafts {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success("Blog", blog.into(), None))
}

pub async fn create_blog(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogRequest,
) -> AppResult<ApiResponse<Blog>> {
    ensure_superadmin(user)?;
    let title = validate::required("title", Some(&payload.title))?;
    let content = validate::required("content", Some(&payload.content))?;
    let slug = unique_slug(state, &title, None).await?;

    let blog = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        slug: Set(slug),
        summary: Set(payload.summary),
        content: Set(content),
        author: Set(payload.author),
        cover_image_url: Set(payload.cover_image_url),
        published: Set(payload.published),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "blog_create",
        "blogs",
        serde_json::json!({ "blog_id": blog.id }),
    )
    .await;

    Ok(ApiResponse::success("Blog created", blog.into(), Some(Meta::empty())))
}

pub async fn update_blog(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBlogRequest,
) -> AppResult<ApiResponse<Blog>> {
    ensure_superadmin(user)?;
    let existing = Blogs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        let title = validate::required("title", Some(&title))?;
        active.slug = Set(unique_slug(state, &title, Some(id)).await?);
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        active.content = Set(validate::required("content", Some(&content))?);
    }
    if let Some(summary) = payload.summary {
        active.summary = Set(Some(summary));
    }
    if let Some(author) = payload.author {
        active.author = Set(Some(author));
    }
    if let Some(cover) = payload.cover_image_url {
        active.cover_image_url = Set(Some(cover));
    }
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    active.updated_at = Set(Utc::now().into());
    let blog = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "blog_update",
        "blogs",
        serde_json::json!({ "blog_id": blog.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", blog.into(), Some(Meta::empty())))
}

pub async fn delete_blog(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;
    let result = Blogs::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "blog_delete",
        "blogs",
        serde_json::json!({ "blog_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn unique_slug(state: &AppState, title: &str, except: Option<Uuid>) -> AppResult<String> {
    let base = validate::slugify(title);
    if base.is_empty() {
        return Err(AppError::BadRequest(
            "title must contain letters or digits".into(),
        ));
    }

    let mut candidate = base.clone();
    let mut n = 2;
    loop {
        let mut finder = Blogs::find().filter(Column::Slug.eq(candidate.as_str()));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        if finder.count(&state.orm).await? == 0 {
            return Ok(candidate);
        }
        candidate = format!("{base}-{n}");
        n += 1;
    }
}
