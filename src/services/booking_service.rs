use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DbErr, EntityTrait, Iterable,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    audit,
    booking::{Transition, to_minor_units},
    dto::appointments::{
        AppointmentList, BookAppointmentRequest, BookingCreated, ConfirmationResult,
        ConsultantSummary, ExpireResult,
    },
    entity::{
        appointments::{
            ActiveModel, AppointmentStatus, Column, Entity as Appointments, Model as AppointmentModel,
        },
        consultant_availability::Entity as Slots,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Role, ensure_consultant_or_superadmin, ensure_superadmin},
    models::Appointment,
    payments::{CreateOrder, PaymentConfirmation},
    response::{ApiResponse, Meta},
    routes::params::{AppointmentListQuery, SortOrder},
    services::{consultant_service, offering_service},
    state::AppState,
    validate,
};

/// Creates a `pending_payment` appointment and its gateway order.
///
/// Both happen inside one transaction with the slot row locked: if the
/// gateway call fails nothing is written, and two clients racing for the same
/// slot are serialized on the lock.
pub async fn initiate_booking(
    state: &AppState,
    caller: Option<&AuthUser>,
    payload: BookAppointmentRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    let client_name = validate::required("client_name", payload.client_name.as_deref())?;
    let client_email = validate::email("client_email", payload.client_email.as_deref())?;
    let client_phone = validate::required("client_phone", payload.client_phone.as_deref())?;
    validate::payload(&payload)?;
    let slot_id = payload
        .slot_id
        .ok_or_else(|| AppError::BadRequest("slot_id is required".into()))?;
    let amount = to_minor_units(payload.price)?;

    let consultant = consultant_service::find(state, payload.consultant_id).await?;
    if let Some(service_id) = payload.service_id {
        offering_service::find(state, service_id).await?;
    }

    let txn = state.orm.begin().await?;

    let slot = Slots::find_by_id(slot_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if slot.consultant_id != consultant.id {
        return Err(AppError::BadRequest(
            "slot does not belong to this consultant".into(),
        ));
    }

    let held = Appointments::find()
        .filter(Column::SlotId.eq(slot.id))
        .filter(Column::Status.is_in(AppointmentStatus::slot_holding()))
        .count(&txn)
        .await?;
    if held > 0 {
        return Err(AppError::Conflict("Slot is already booked".into()));
    }

    let id = Uuid::new_v4();
    let currency = state.config.payment.currency.clone();
    let appointment = ActiveModel {
        id: Set(id),
        consultant_id: Set(consultant.id),
        slot_id: Set(Some(slot.id)),
        service_id: Set(payload.service_id),
        user_id: Set(caller.filter(|u| u.role == Role::Client).map(|u| u.user_id)),
        client_name: Set(client_name),
        client_email: Set(client_email),
        client_phone: Set(client_phone),
        date: Set(slot.date),
        start_time: Set(slot.start_time),
        end_time: Set(slot.end_time),
        price: Set(payload.price),
        currency: Set(currency.clone()),
        status: Set(AppointmentStatus::PendingPayment),
        payment_order_id: Set(None),
        payment_id: Set(None),
        confirmed_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(slot_conflict)?;

    let order = state
        .payments
        .create_order(CreateOrder {
            amount,
            currency,
            receipt: format!("appt_{}", id.simple()),
        })
        .await
        .map_err(|err| {
            tracing::warn!(appointment_id = %id, error = %err, "payment order creation failed");
            AppError::from(err)
        })?;
    if order.amount != amount {
        return Err(AppError::Upstream(format!(
            "gateway order amount {} does not match {}",
            order.amount, amount
        )));
    }

    let mut active: ActiveModel = appointment.into();
    active.payment_order_id = Set(Some(order.id.clone()));
    let appointment = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        appointment_id = %id,
        order_id = %order.id,
        consultant_id = %consultant.id,
        amount,
        "appointment pending payment"
    );
    audit::record(
        &state.pool,
        caller.map(|u| u.user_id),
        "appointment_create",
        "appointments",
        serde_json::json!({ "appointment_id": id, "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Appointment created, awaiting payment",
        BookingCreated {
            appointment_id: id,
            appointment: appointment.into(),
            payment_order: order,
            key_id: state.payments.key_id().to_string(),
            consultant: ConsultantSummary {
                id: consultant.id,
                name: consultant.name,
                specialization: consultant.specialization,
            },
        },
        Some(Meta::empty()),
    ))
}

/// Applies a signed checkout result. Calling it again with the same valid
/// triple returns the already confirmed appointment unchanged.
pub async fn confirm_payment(
    state: &AppState,
    id: Uuid,
    payload: PaymentConfirmation,
) -> AppResult<ApiResponse<ConfirmationResult>> {
    validate::required("order_id", Some(&payload.order_id))?;
    validate::required("payment_id", Some(&payload.payment_id))?;
    validate::required("signature", Some(&payload.signature))?;

    let txn = state.orm.begin().await?;
    let appointment = Appointments::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if appointment.payment_order_id.as_deref() != Some(payload.order_id.as_str()) {
        return Err(AppError::BadRequest(
            "order_id does not match this appointment".into(),
        ));
    }

    if let Err(err) = state.payments.verify_payment(&payload).await {
        tracing::warn!(appointment_id = %id, order_id = %payload.order_id, error = %err, "payment verification failed");
        return Err(err.into());
    }

    match appointment.status.on_confirm()? {
        Transition::NoOp => {
            txn.commit().await?;
            if appointment.payment_id.as_deref() != Some(payload.payment_id.as_str()) {
                tracing::warn!(
                    appointment_id = %id,
                    payment_id = %payload.payment_id,
                    "confirmation with a different payment id for a confirmed appointment"
                );
            }
            Ok(ApiResponse::success(
                "Appointment already confirmed",
                ConfirmationResult {
                    appointment: appointment.into(),
                    newly_confirmed: false,
                },
                Some(Meta::empty()),
            ))
        }
        Transition::Apply(next) => {
            let now = Utc::now();
            let mut active: ActiveModel = appointment.into();
            active.status = Set(next);
            active.payment_id = Set(Some(payload.payment_id.clone()));
            active.confirmed_at = Set(Some(now.into()));
            active.updated_at = Set(now.into());
            let appointment = active.update(&txn).await?;
            txn.commit().await?;

            tracing::info!(appointment_id = %id, payment_id = %payload.payment_id, "appointment confirmed");
            // Downstream notifications (meeting link email) hang off this audit event.
            audit::record(
                &state.pool,
                appointment.user_id,
                "appointment_confirmed",
                "appointments",
                serde_json::json!({
                    "appointment_id": id,
                    "consultant_id": appointment.consultant_id,
                    "order_id": payload.order_id,
                    "payment_id": payload.payment_id,
                    "client_email": appointment.client_email,
                }),
            )
            .await;

            Ok(ApiResponse::success(
                "Appointment confirmed",
                ConfirmationResult {
                    appointment: appointment.into(),
                    newly_confirmed: true,
                },
                Some(Meta::empty()),
            ))
        }
    }
}

pub async fn cancel_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Appointment>> {
    let txn = state.orm.begin().await?;
    let appointment = Appointments::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_consultant_or_superadmin(user, appointment.consultant_id)?;

    let appointment = match appointment.status.on_cancel()? {
        Transition::NoOp => appointment,
        Transition::Apply(next) => {
            let mut active: ActiveModel = appointment.into();
            active.status = Set(next);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "appointment_cancel",
        "appointments",
        serde_json::json!({ "appointment_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Appointment cancelled",
        appointment.into(),
        Some(Meta::empty()),
    ))
}

pub async fn get_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Appointment>> {
    let appointment = Appointments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_can_view(user, &appointment)?;
    Ok(ApiResponse::success("Appointment", appointment.into(), None))
}

pub async fn list_appointments(
    state: &AppState,
    user: &AuthUser,
    query: AppointmentListQuery,
) -> AppResult<ApiResponse<AppointmentList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    match user.role {
        Role::Superadmin => {
            if let Some(consultant_id) = query.consultant_id {
                condition = condition.add(Column::ConsultantId.eq(consultant_id));
            }
        }
        Role::Consultant => condition = condition.add(Column::ConsultantId.eq(user.user_id)),
        Role::Client => condition = condition.add(Column::UserId.eq(user.user_id)),
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Status.eq(AppointmentStatus::parse(status)?));
    }

    let mut finder = Appointments::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Appointment::from)
        .collect();

    Ok(ApiResponse::success(
        "Appointments",
        AppointmentList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Moves appointments stuck in checkout for longer than `ttl` to `expired`,
/// releasing their slots. Returns how many rows changed.
pub async fn expire_stale_bookings(state: &AppState, ttl: chrono::Duration) -> AppResult<u64> {
    let cutoff = Utc::now() - ttl;
    let expirable: Vec<AppointmentStatus> = AppointmentStatus::iter()
        .filter(|s| matches!(s.on_expire(), Transition::Apply(_)))
        .collect();

    let result = Appointments::update_many()
        .col_expr(Column::Status, Expr::value(AppointmentStatus::Expired))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Status.is_in(expirable))
        .filter(Column::CreatedAt.lt(cutoff))
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(expired = result.rows_affected, %cutoff, "expired abandoned bookings");
    }
    Ok(result.rows_affected)
}

pub async fn expire_now(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ExpireResult>> {
    ensure_superadmin(user)?;
    let ttl = state
        .config
        .booking
        .pending_ttl
        .ok_or_else(|| AppError::BadRequest("pending booking expiry is disabled".into()))?;
    let expired = expire_stale_bookings(state, ttl).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "appointment_expire_sweep",
        "appointments",
        serde_json::json!({ "expired": expired }),
    )
    .await;

    Ok(ApiResponse::success(
        "Expired stale bookings",
        ExpireResult { expired },
        Some(Meta::empty()),
    ))
}

fn ensure_can_view(user: &AuthUser, appointment: &AppointmentModel) -> AppResult<()> {
    let allowed = match user.role {
        Role::Superadmin => true,
        Role::Consultant => user.user_id == appointment.consultant_id,
        Role::Client => appointment.user_id == Some(user.user_id),
    };
    if allowed { Ok(()) } else { Err(AppError::Forbidden) }
}

fn slot_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Slot is already booked".into())
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(consultant_id: Uuid, user_id: Option<Uuid>) -> AppointmentModel {
        let now = Utc::now();
        AppointmentModel {
            id: Uuid::new_v4(),
            consultant_id,
            slot_id: None,
            service_id: None,
            user_id,
            client_name: "Asha".into(),
            client_email: "asha@example.com".into(),
            client_phone: "9999999999".into(),
            date: now.date_naive(),
            start_time: now.time(),
            end_time: now.time(),
            price: 500,
            currency: "INR".into(),
            status: AppointmentStatus::PendingPayment,
            payment_order_id: None,
            payment_id: None,
            confirmed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn view_rules_follow_ownership() {
        let consultant = Uuid::new_v4();
        let client = Uuid::new_v4();
        let appt = appointment(consultant, Some(client));

        let admin = AuthUser { user_id: Uuid::new_v4(), role: Role::Superadmin };
        let owner = AuthUser { user_id: consultant, role: Role::Consultant };
        let other_consultant = AuthUser { user_id: Uuid::new_v4(), role: Role::Consultant };
        let booker = AuthUser { user_id: client, role: Role::Client };
        let stranger = AuthUser { user_id: Uuid::new_v4(), role: Role::Client };

        assert!(ensure_can_view(&admin, &appt).is_ok());
        assert!(ensure_can_view(&owner, &appt).is_ok());
        assert!(ensure_can_view(&booker, &appt).is_ok());
        assert!(ensure_can_view(&other_consultant, &appt).is_err());
        assert!(ensure_can_view(&stranger, &appt).is_err());
    }

    #[test]
    fn anonymous_bookings_are_not_visible_to_clients() {
        let appt = appointment(Uuid::new_v4(), None);
        let client = AuthUser { user_id: Uuid::new_v4(), role: Role::Client };
        assert!(ensure_can_view(&client, &appt).is_err());
    }
}
