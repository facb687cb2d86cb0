use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{
        ConsultantList, CreateServiceRequest, ServiceDetail, ServiceList, UpdateServiceRequest,
    },
    entity::{
        categories::Entity as Categories,
        consultants::{Column as ConsultantCol, Entity as Consultants},
        service_consultants::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ServiceConsultants,
        },
        services::{ActiveModel, Column, Entity as Services, Model as ServiceModel},
        subcategories::Entity as Subcategories,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::{Consultant, Service},
    response::{ApiResponse, Meta},
    routes::params::ServiceQuery,
    services::consultant_service,
    state::AppState,
    validate,
};

pub const SERVICE_KINDS: [&str; 6] = ["course", "ebook", "app", "gadget", "consultation", "webinar"];

pub fn validate_kind(kind: &str) -> Result<String, AppError> {
    let kind = kind.trim().to_lowercase();
    if SERVICE_KINDS.contains(&kind.as_str()) {
        Ok(kind)
    } else {
        Err(AppError::BadRequest(format!(
            "kind must be one of: {}",
            SERVICE_KINDS.join(", ")
        )))
    }
}

pub async fn list_services(
    state: &AppState,
    query: ServiceQuery,
) -> AppResult<ApiResponse<ServiceList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(kind) = query.kind.as_deref().filter(|k| !k.is_empty()) {
        condition = condition.add(Column::Kind.eq(validate_kind(kind)?));
    }

    let finder = Services::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Service::from)
        .collect();

    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_service(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ServiceDetail>> {
    let service = find(state, id).await?;
    let consultant_ids = ServiceConsultants::find()
        .filter(LinkCol::ServiceId.eq(id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|link| link.consultant_id)
        .collect();

    Ok(ApiResponse::success(
        "Service",
        ServiceDetail {
            service: service.into(),
            consultant_ids,
        },
        None,
    ))
}

pub async fn list_service_consultants(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ConsultantList>> {
    let service = find(state, id).await?;
    let items = service
        .find_related(Consultants)
        .order_by_asc(ConsultantCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Consultant::from)
        .collect();
    Ok(ApiResponse::success("Consultants", ConsultantList { items }, None))
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_superadmin(user)?;
    let title = validate::required("title", Some(&payload.title))?;
    let kind = validate_kind(&payload.kind)?;
    validate_price(payload.price)?;
    check_category(state, payload.category_id, payload.subcategory_id).await?;

    let service = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        subcategory_id: Set(payload.subcategory_id),
        title: Set(title),
        description: Set(payload.description),
        kind: Set(kind),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_create",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Service created",
        service.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_superadmin(user)?;
    let existing = find(state, id).await?;

    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let subcategory_id = payload.subcategory_id.or(existing.subcategory_id);
    if payload.category_id.is_some() || payload.subcategory_id.is_some() {
        check_category(state, category_id, subcategory_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.category_id = Set(category_id);
    active.subcategory_id = Set(subcategory_id);
    if let Some(title) = payload.title {
        active.title = Set(validate::required("title", Some(&title))?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(validate_kind(&kind)?);
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());
    let service = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_update",
        "services",
        serde_json::json!({ "service_id": service.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", service.into(), Some(Meta::empty())))
}

pub async fn delete_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;
    let result = Services::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_delete",
        "services",
        serde_json::json!({ "service_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Idempotent: linking an already linked pair succeeds without a new row.
pub async fn link_consultant(
    state: &AppState,
    user: &AuthUser,
    service_id: Uuid,
    consultant_id: Uuid,
) -> AppResult<ApiResponse<ServiceDetail>> {
    ensure_superadmin(user)?;
    find(state, service_id).await?;
    consultant_service::find(state, consultant_id).await?;

    let existing = ServiceConsultants::find_by_id((service_id, consultant_id))
        .one(&state.orm)
        .await?;
    if existing.is_none() {
        LinkActive {
            service_id: Set(service_id),
            consultant_id: Set(consultant_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;

        audit::record(
            &state.pool,
            Some(user.user_id),
            "service_consultant_link",
            "service_consultants",
            serde_json::json!({ "service_id": service_id, "consultant_id": consultant_id }),
        )
        .await;
    }

    get_service(state, service_id).await
}

pub async fn unlink_consultant(
    state: &AppState,
    user: &AuthUser,
    service_id: Uuid,
    consultant_id: Uuid,
) -> AppResult<ApiResponse<ServiceDetail>> {
    ensure_superadmin(user)?;
    let result = ServiceConsultants::delete_by_id((service_id, consultant_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "service_consultant_unlink",
        "service_consultants",
        serde_json::json!({ "service_id": service_id, "consultant_id": consultant_id }),
    )
    .await;

    get_service(state, service_id).await
}

pub(crate) async fn find(state: &AppState, id: Uuid) -> AppResult<ServiceModel> {
    Services::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    Ok(())
}

async fn check_category(
    state: &AppState,
    category_id: Uuid,
    subcategory_id: Option<Uuid>,
) -> AppResult<()> {
    if Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("category does not exist".into()));
    }
    if let Some(subcategory_id) = subcategory_id {
        let subcategory = Subcategories::find_by_id(subcategory_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("subcategory does not exist".into()))?;
        if subcategory.category_id != category_id {
            return Err(AppError::BadRequest(
                "subcategory belongs to another category".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_normalized() {
        assert_eq!(validate_kind(" Ebook ").unwrap(), "ebook");
        assert_eq!(validate_kind("Webinar").unwrap(), "webinar");
        assert!(validate_kind("podcast").is_err());
    }

    #[test]
    fn negative_price_rejected() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
    }
}
