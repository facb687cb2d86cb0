use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::availability::{CreateSlotRequest, SlotList},
    entity::{
        appointments::{AppointmentStatus, Column as AppointmentCol, Entity as Appointments},
        consultant_availability::{ActiveModel, Column, Entity as Slots},
        consultants::Entity as Consultants,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_consultant_or_superadmin},
    models::AvailabilitySlot,
    response::{ApiResponse, Meta},
    routes::params::SlotQuery,
    services::consultant_service,
    state::AppState,
};

pub async fn list_slots(
    state: &AppState,
    consultant_id: Uuid,
    query: SlotQuery,
) -> AppResult<ApiResponse<SlotList>> {
    consultant_service::find(state, consultant_id).await?;

    let mut finder = Slots::find().filter(Column::ConsultantId.eq(consultant_id));
    if let Some(date) = query.date {
        finder = finder.filter(Column::Date.eq(date));
    }
    if let Some(from) = query.from {
        finder = finder.filter(Column::Date.gte(from));
    }
    let slots = finder
        .order_by_asc(Column::Date)
        .order_by_asc(Column::StartTime)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
    let held: HashSet<Uuid> = if ids.is_empty() {
        HashSet::new()
    } else {
        Appointments::find()
            .filter(AppointmentCol::SlotId.is_in(ids))
            .filter(AppointmentCol::Status.is_in(AppointmentStatus::slot_holding()))
            .all(&state.orm)
            .await?
            .into_iter()
            .filter_map(|a| a.slot_id)
            .collect()
    };

    let open_only = query.open_only.unwrap_or(false);
    let items: Vec<AvailabilitySlot> = slots
        .into_iter()
        .map(|slot| {
            let booked = held.contains(&slot.id);
            AvailabilitySlot::from_entity(slot, booked)
        })
        .filter(|slot| !(open_only && slot.booked))
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Availability",
        SlotList { items },
        Some(Meta::unpaged(total)),
    ))
}

pub async fn create_slot(
    state: &AppState,
    user: &AuthUser,
    consultant_id: Uuid,
    payload: CreateSlotRequest,
) -> AppResult<ApiResponse<AvailabilitySlot>> {
    ensure_consultant_or_superadmin(user, consultant_id)?;
    if payload.start_time >= payload.end_time {
        return Err(AppError::BadRequest(
            "start_time must be before end_time".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    // Serializes slot writes per consultant.
    Consultants::find_by_id(consultant_id)
        .lock(LockType::NoKeyUpdate)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let overlapping = Slots::find()
        .filter(Column::ConsultantId.eq(consultant_id))
        .filter(Column::Date.eq(payload.date))
        .filter(Column::StartTime.lt(payload.end_time))
        .filter(Column::EndTime.gt(payload.start_time))
        .count(&txn)
        .await?;
    if overlapping > 0 {
        return Err(AppError::Conflict(
            "Slot overlaps an existing availability window".into(),
        ));
    }

    let slot = ActiveModel {
        id: Set(Uuid::new_v4()),
        consultant_id: Set(consultant_id),
        date: Set(payload.date),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "slot_create",
        "consultant_availability",
        serde_json::json!({ "slot_id": slot.id, "consultant_id": consultant_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Slot created",
        AvailabilitySlot::from_entity(slot, false),
        Some(Meta::empty()),
    ))
}

pub async fn delete_slot(
    state: &AppState,
    user: &AuthUser,
    consultant_id: Uuid,
    slot_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_consultant_or_superadmin(user, consultant_id)?;

    let txn = state.orm.begin().await?;

    // Same row lock as booking, so an in-flight checkout finishes first.
    let slot = Slots::find_by_id(slot_id)
        .filter(Column::ConsultantId.eq(consultant_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let held = Appointments::find()
        .filter(AppointmentCol::SlotId.eq(slot.id))
        .filter(AppointmentCol::Status.is_in(AppointmentStatus::slot_holding()))
        .count(&txn)
        .await?;
    if held > 0 {
        return Err(AppError::Conflict(
            "Slot is held by an active appointment".into(),
        ));
    }

    Slots::delete_by_id(slot.id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "slot_delete",
        "consultant_availability",
        serde_json::json!({ "slot_id": slot_id, "consultant_id": consultant_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
