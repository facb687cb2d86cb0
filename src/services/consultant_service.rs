use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        catalog::ConsultantList,
        consultants::{
            ConsultantSelfUpdate, CreateConsultantRequest, UpdateConsultantRequest,
            UpdateStatusRequest,
        },
    },
    entity::{
        appointments::{Column as AppointmentCol, Entity as Appointments},
        consultants::{ActiveModel, Column, Entity as Consultants, Model as ConsultantModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_consultant_or_superadmin, ensure_superadmin},
    models::{Consultant, ConsultantProfile},
    response::{ApiResponse, Meta},
    routes::params::ConsultantQuery,
    services::auth_service::hash_password,
    state::AppState,
    validate,
};

pub async fn list_consultants(
    state: &AppState,
    query: ConsultantQuery,
) -> AppResult<ApiResponse<ConsultantList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Specialization).ilike(pattern.clone()))
                .add(Expr::col(Column::Bio).ilike(pattern)),
        );
    }
    if let Some(specialization) = query.specialization.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Specialization).ilike(specialization.clone()));
    }
    if let Some(status) = query.status {
        condition = condition.add(Column::IsOnline.eq(status.is_online()));
    }

    let finder = Consultants::find()
        .filter(condition)
        .order_by_desc(Column::IsOnline)
        .order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Consultant::from)
        .collect();

    Ok(ApiResponse::success(
        "Consultants",
        ConsultantList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_consultant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Consultant>> {
    let consultant = find(state, id).await?;
    Ok(ApiResponse::success("Consultant", consultant.into(), None))
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ConsultantProfile>> {
    ensure_consultant_or_superadmin(user, id)?;
    let consultant = find(state, id).await?;
    Ok(ApiResponse::success("Consultant profile", consultant.into(), None))
}

pub async fn create_consultant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateConsultantRequest,
) -> AppResult<ApiResponse<ConsultantProfile>> {
    ensure_superadmin(user)?;
    let name = validate::required("name", Some(&payload.name))?;
    let email = validate::email("email", Some(&payload.email))?;
    let specialization = validate::required("specialization", Some(&payload.specialization))?;
    validate::payload(&payload)?;
    ensure_email_free(state, &email, None).await?;

    let consultant = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(payload.phone),
        specialization: Set(specialization),
        bio: Set(payload.bio),
        is_online: Set(false),
        password_hash: Set(hash_password(&payload.password)?),
        bank_account_name: Set(None),
        bank_account_number: Set(None),
        bank_ifsc: Set(None),
        pan_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "consultant_create",
        "consultants",
        serde_json::json!({ "consultant_id": consultant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Consultant created",
        consultant.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_consultant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateConsultantRequest,
) -> AppResult<ApiResponse<ConsultantProfile>> {
    ensure_superadmin(user)?;
    validate::payload(&payload)?;
    let existing = find(state, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(validate::required("name", Some(&name))?);
    }
    if let Some(email) = payload.email {
        let email = validate::email("email", Some(&email))?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(specialization) = payload.specialization {
        active.specialization = Set(validate::required("specialization", Some(&specialization))?);
    }
    apply_self_update(&mut active, payload.profile);

    let consultant = save(state, active).await?;
    audit::record(
        &state.pool,
        Some(user.user_id),
        "consultant_update",
        "consultants",
        serde_json::json!({ "consultant_id": consultant.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", consultant.into(), Some(Meta::empty())))
}

pub async fn update_own_profile(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ConsultantSelfUpdate,
) -> AppResult<ApiResponse<ConsultantProfile>> {
    ensure_consultant_or_superadmin(user, id)?;
    let existing = find(state, id).await?;

    let mut active: ActiveModel = existing.into();
    apply_self_update(&mut active, payload);
    let consultant = save(state, active).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "consultant_profile_update",
        "consultants",
        serde_json::json!({ "consultant_id": consultant.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", consultant.into(), Some(Meta::empty())))
}

pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<Consultant>> {
    ensure_consultant_or_superadmin(user, id)?;
    let existing = find(state, id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_online = Set(payload.status.is_online());
    let consultant = save(state, active).await?;

    tracing::info!(consultant_id = %id, status = ?payload.status, "consultant status changed");

    Ok(ApiResponse::success("Status updated", consultant.into(), None))
}

pub async fn delete_consultant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let referenced = Appointments::find()
        .filter(AppointmentCol::ConsultantId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "Consultant has {referenced} appointment(s) and cannot be deleted"
        )));
    }

    let result = Consultants::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "consultant_delete",
        "consultants",
        serde_json::json!({ "consultant_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find(state: &AppState, id: Uuid) -> AppResult<ConsultantModel> {
    Consultants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn save(state: &AppState, mut active: ActiveModel) -> AppResult<ConsultantModel> {
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(&state.orm).await?)
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Consultants::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }
    Ok(())
}

fn apply_self_update(active: &mut ActiveModel, update: ConsultantSelfUpdate) {
    if let Some(phone) = update.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(bio) = update.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(name) = update.bank_account_name {
        active.bank_account_name = Set(Some(name));
    }
    if let Some(number) = update.bank_account_number {
        active.bank_account_number = Set(Some(number));
    }
    if let Some(ifsc) = update.bank_ifsc {
        active.bank_ifsc = Set(Some(ifsc.to_uppercase()));
    }
    if let Some(pan) = update.pan_number {
        active.pan_number = Set(Some(pan.to_uppercase()));
    }
}
