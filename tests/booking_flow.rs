mod common;

use chrono::{Duration, NaiveTime, Utc};
use consult_market_api::{
    dto::{
        appointments::BookAppointmentRequest, availability::CreateSlotRequest,
        consultants::CreateConsultantRequest,
    },
    entity::appointments::{AppointmentStatus, Column as AppointmentCol, Entity as Appointments},
    error::AppError,
    middleware::auth::{AuthUser, Role},
    payments::{PaymentConfirmation, signature},
    routes::params::{AppointmentListQuery, Pagination, SlotQuery},
    services::{availability_service, booking_service, consultant_service, user_service},
    state::AppState,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Statement};
use uuid::Uuid;

use common::{GATEWAY_SECRET, database_url, db_state};

// One sequential flow: every scenario shares the truncated schema.
#[tokio::test]
async fn booking_payment_lifecycle() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run booking flow tests.");
        return Ok(());
    };
    let (state, gateway) = db_state(&database_url).await?;

    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Superadmin,
    };
    let consultant_id = consultant_service::create_consultant(
        &state,
        &admin,
        CreateConsultantRequest {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: None,
            specialization: "Tax".into(),
            bio: None,
            password: "consultant123".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .id;
    let consultant = AuthUser {
        user_id: consultant_id,
        role: Role::Consultant,
    };

    // Checkout creates a pending appointment sized in minor units.
    let slot = create_slot(&state, &consultant, 10).await?;
    let created = booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 500))
        .await?
        .data
        .unwrap();
    assert_eq!(created.payment_order.amount, 50_000);
    assert_eq!(created.payment_order.currency, "INR");
    assert_eq!(created.key_id, "rzp_test_key");
    assert_eq!(created.consultant.name, "Asha Rao");
    assert_eq!(created.appointment.status, AppointmentStatus::PendingPayment);
    assert_eq!(
        created.appointment.payment_order_id.as_deref(),
        Some(created.payment_order.id.as_str())
    );
    let appointment_id = created.appointment_id;
    let order_id = created.payment_order.id.clone();

    // The slot now reads as booked and cannot be taken twice.
    let slots = availability_service::list_slots(&state, consultant_id, SlotQuery::default())
        .await?
        .data
        .unwrap()
        .items;
    assert!(slots.iter().any(|s| s.id == slot && s.booked));
    let second = booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 500)).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    // A tampered signature is rejected and leaves the booking pending.
    let tampered = PaymentConfirmation {
        order_id: order_id.clone(),
        payment_id: "pay_1".into(),
        signature: signature::sign("wrong_secret", &order_id, "pay_1")?,
    };
    let rejected = booking_service::confirm_payment(&state, appointment_id, tampered).await;
    assert!(matches!(rejected, Err(AppError::PaymentVerification)));
    assert_eq!(status_of(&state, appointment_id).await?, AppointmentStatus::PendingPayment);

    // A confirmation for some other order is rejected outright.
    let foreign = confirmation("order_other", "pay_1")?;
    let rejected = booking_service::confirm_payment(&state, appointment_id, foreign).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    // A valid signature confirms; repeating it changes nothing.
    let confirmed = booking_service::confirm_payment(
        &state,
        appointment_id,
        confirmation(&order_id, "pay_1")?,
    )
    .await?
    .data
    .unwrap();
    assert!(confirmed.newly_confirmed);
    assert_eq!(confirmed.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(confirmed.appointment.payment_id.as_deref(), Some("pay_1"));
    let first_confirmed_at = confirmed.appointment.confirmed_at;

    let again = booking_service::confirm_payment(
        &state,
        appointment_id,
        confirmation(&order_id, "pay_1")?,
    )
    .await?
    .data
    .unwrap();
    assert!(!again.newly_confirmed);
    assert_eq!(again.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(again.appointment.confirmed_at, first_confirmed_at);

    // Consultant sees it; a stranger does not.
    let listed = booking_service::list_appointments(&state, &consultant, AppointmentListQuery::default())
        .await?;
    assert_eq!(listed.meta.unwrap().total, Some(1));
    let stranger = AuthUser {
        user_id: Uuid::new_v4(),
        role: Role::Consultant,
    };
    assert!(matches!(
        booking_service::get_appointment(&state, &stranger, appointment_id).await,
        Err(AppError::Forbidden)
    ));

    // Cancelling frees the slot; a late confirmation then conflicts.
    let cancelled = booking_service::cancel_appointment(&state, &consultant, appointment_id)
        .await?
        .data
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    let late = booking_service::confirm_payment(
        &state,
        appointment_id,
        confirmation(&order_id, "pay_1")?,
    )
    .await;
    assert!(matches!(late, Err(AppError::Conflict(_))));
    booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 500)).await?;

    // Gateway failure leaves no appointment behind.
    let slot = create_slot(&state, &consultant, 12).await?;
    gateway.failing(true);
    let failed = booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 750)).await;
    gateway.failing(false);
    assert!(matches!(failed, Err(AppError::Upstream(_))));
    let rows = Appointments::find()
        .filter(AppointmentCol::SlotId.eq(slot))
        .count(&state.orm)
        .await?;
    assert_eq!(rows, 0);

    // Abandoned checkouts expire and release their slot.
    let stale = booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 750))
        .await?
        .data
        .unwrap()
        .appointment_id;
    backdate(&state, stale, Duration::hours(2)).await?;
    let expired = booking_service::expire_now(&state, &admin).await?.data.unwrap();
    assert_eq!(expired.expired, 1);
    assert_eq!(status_of(&state, stale).await?, AppointmentStatus::Expired);
    let rebooked = booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 750)).await?;
    assert_eq!(
        rebooked.data.unwrap().appointment.status,
        AppointmentStatus::PendingPayment
    );

    // Fresh pending bookings survive the sweep.
    assert_eq!(
        booking_service::expire_stale_bookings(&state, Duration::minutes(30)).await?,
        0
    );

    // Consultants with history cannot be deleted; fresh ones can.
    let deleted = consultant_service::delete_consultant(&state, &admin, consultant_id).await;
    assert!(matches!(deleted, Err(AppError::Conflict(_))));
    let spare = consultant_service::create_consultant(
        &state,
        &admin,
        CreateConsultantRequest {
            name: "Spare".into(),
            email: "spare@example.com".into(),
            phone: None,
            specialization: "Law".into(),
            bio: None,
            password: "consultant123".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .id;
    consultant_service::delete_consultant(&state, &admin, spare).await?;

    // Superadmin passes the gate that stops everyone else.
    let users = user_service::list_users(&state, &admin, Pagination::default()).await?;
    assert_eq!(users.meta.unwrap().total, Some(0));
    assert!(matches!(
        user_service::list_users(&state, &consultant, Pagination::default()).await,
        Err(AppError::Forbidden)
    ));

    Ok(())
}

fn booking(consultant_id: Uuid, slot_id: Uuid, price: i64) -> BookAppointmentRequest {
    BookAppointmentRequest {
        consultant_id,
        slot_id: Some(slot_id),
        service_id: None,
        client_name: Some("Ravi Kumar".into()),
        client_email: Some("Ravi@Example.com".into()),
        client_phone: Some("9876543210".into()),
        price,
    }
}

fn confirmation(order_id: &str, payment_id: &str) -> anyhow::Result<PaymentConfirmation> {
    Ok(PaymentConfirmation {
        order_id: order_id.to_string(),
        payment_id: payment_id.to_string(),
        signature: signature::sign(GATEWAY_SECRET, order_id, payment_id)?,
    })
}

async fn create_slot(state: &AppState, consultant: &AuthUser, hour: u32) -> anyhow::Result<Uuid> {
    let slot = availability_service::create_slot(
        state,
        consultant,
        consultant.user_id,
        CreateSlotRequest {
            date: Utc::now().date_naive() + Duration::days(1),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour, 30, 0).unwrap(),
        },
    )
    .await?;
    Ok(slot.data.unwrap().id)
}

async fn status_of(state: &AppState, id: Uuid) -> anyhow::Result<AppointmentStatus> {
    let appointment = Appointments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("appointment {id} missing"))?;
    Ok(appointment.status)
}

async fn backdate(state: &AppState, id: Uuid, by: Duration) -> anyhow::Result<()> {
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_sql_and_values(
            backend,
            "UPDATE appointments SET created_at = created_at - make_interval(secs => $1) WHERE id = $2",
            [(by.num_seconds() as f64).into(), id.into()],
        ))
        .await?;
    Ok(())
}
