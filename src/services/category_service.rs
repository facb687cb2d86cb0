use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{
        CategoryList, CategoryWithSubcategories, CreateCategoryRequest, SubcategoryList,
        SubcategoryRequest, UpdateCategoryRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        services::{Column as ServiceCol, Entity as Services},
        subcategories::{
            ActiveModel as SubcategoryActive, Column as SubcategoryCol, Entity as Subcategories,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::{Category, Subcategory},
    response::{ApiResponse, Meta},
    state::AppState,
    validate,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::unpaged(total)),
    ))
}

pub async fn get_category(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<CategoryWithSubcategories>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let subcategories = category
        .find_related(Subcategories)
        .order_by_asc(SubcategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Subcategory::from)
        .collect();

    Ok(ApiResponse::success(
        "Category",
        CategoryWithSubcategories {
            category: category.into(),
            subcategories,
        },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_superadmin(user)?;
    let name = validate::required("name", Some(&payload.name))?;
    let slug = unique_slug(state, &name, None).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_superadmin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        let name = validate::required("name", Some(&name))?;
        active.slug = Set(unique_slug(state, &name, Some(id)).await?);
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", category.into(), Some(Meta::empty())))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let in_use = Services::find()
        .filter(ServiceCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Category is used by {in_use} service(s)"
        )));
    }

    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_subcategories(
    state: &AppState,
    category_id: Uuid,
) -> AppResult<ApiResponse<SubcategoryList>> {
    let category = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = category
        .find_related(Subcategories)
        .order_by_asc(SubcategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Subcategory::from)
        .collect();
    Ok(ApiResponse::success("Subcategories", SubcategoryList { items }, None))
}

pub async fn create_subcategory(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
    payload: SubcategoryRequest,
) -> AppResult<ApiResponse<Subcategory>> {
    ensure_superadmin(user)?;
    let name = validate::required("name", Some(&payload.name))?;
    if Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let subcategory = SubcategoryActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "subcategory_create",
        "subcategories",
        serde_json::json!({ "subcategory_id": subcategory.id, "category_id": category_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Subcategory created",
        subcategory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_subcategory(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
    id: Uuid,
    payload: SubcategoryRequest,
) -> AppResult<ApiResponse<Subcategory>> {
    ensure_superadmin(user)?;
    let name = validate::required("name", Some(&payload.name))?;
    let existing = Subcategories::find_by_id(id)
        .filter(SubcategoryCol::CategoryId.eq(category_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: SubcategoryActive = existing.into();
    active.name = Set(name);
    let subcategory = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        subcategory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_subcategory(
    state: &AppState,
    user: &AuthUser,
    category_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;
    let result = Subcategories::delete_many()
        .filter(SubcategoryCol::Id.eq(id))
        .filter(SubcategoryCol::CategoryId.eq(category_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "subcategory_delete",
        "subcategories",
        serde_json::json!({ "subcategory_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Slug from `name`, suffixed with a counter until no other category uses it.
async fn unique_slug(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<String> {
    let base = validate::slugify(name);
    if base.is_empty() {
        return Err(AppError::BadRequest(
            "name must contain letters or digits".into(),
        ));
    }

    let mut candidate = base.clone();
    let mut n = 2;
    loop {
        let mut finder = Categories::find().filter(CategoryCol::Slug.eq(candidate.as_str()));
        if let Some(id) = except {
            finder = finder.filter(CategoryCol::Id.ne(id));
        }
        if finder.count(&state.orm).await? == 0 {
            return Ok(candidate);
        }
        candidate = format!("{base}-{n}");
        n += 1;
    }
}
