mod common;

use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveTime, Utc};
use consult_market_api::{
    dto::{
        appointments::BookAppointmentRequest, availability::CreateSlotRequest,
        consultants::CreateConsultantRequest,
    },
    entity::appointments::{AppointmentStatus, Entity as Appointments},
    error::AppError,
    middleware::auth::{AuthUser, Role},
    payments::{PaymentConfirmation, signature},
    services::{availability_service, booking_service, consultant_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{GATEWAY_SECRET, database_url, db_state};

const RACERS: usize = 5;

// Single test in this binary: the scenarios share one truncated schema.
#[tokio::test]
async fn racing_requests_resolve_to_one_winner() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run concurrency tests.");
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
            name: "Meera Iyer".into(),
            email: "meera@example.com".into(),
            phone: None,
            specialization: "Career".into(),
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

    // Parallel checkouts for one slot: exactly one holds it.
    let slot = create_slot(&state, &consultant, 9, 0).await?;
    let mut tasks = Vec::new();
    for n in 0..RACERS {
        let state = state.clone();
        tasks.push(tokio::spawn(async move {
            booking_service::initiate_booking(&state, None, booking(consultant_id, slot, n)).await
        }));
    }
    let mut winners = Vec::new();
    for task in tasks {
        match task.await? {
            Ok(resp) => winners.push(resp.data.unwrap()),
            Err(AppError::Conflict(_)) => {}
            Err(other) => anyhow::bail!("unexpected booking error: {other}"),
        }
    }
    assert_eq!(winners.len(), 1);
    let winner = winners.remove(0);

    // Parallel confirmations of the same payment apply once.
    let confirmation = PaymentConfirmation {
        order_id: winner.payment_order.id.clone(),
        payment_id: "pay_race".into(),
        signature: signature::sign(GATEWAY_SECRET, &winner.payment_order.id, "pay_race")?,
    };
    let appointment_id = winner.appointment_id;
    let mut tasks = Vec::new();
    for _ in 0..RACERS {
        let state = state.clone();
        let confirmation = confirmation.clone();
        tasks.push(tokio::spawn(async move {
            booking_service::confirm_payment(&state, appointment_id, confirmation).await
        }));
    }
    let mut newly_confirmed = 0;
    for task in tasks {
        if task.await??.data.unwrap().newly_confirmed {
            newly_confirmed += 1;
        }
    }
    assert_eq!(newly_confirmed, 1);

    // Overlapping windows created together: only one is stored.
    let mut tasks = Vec::new();
    for minute in [0u32, 10, 20] {
        let state = state.clone();
        let consultant = consultant.clone();
        tasks.push(tokio::spawn(async move {
            create_slot(&state, &consultant, 15, minute).await
        }));
    }
    let mut created = 0;
    for task in tasks {
        if task.await?.is_ok() {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    // Deleting a slot mid-checkout waits for the booking and then refuses.
    let slot = create_slot(&state, &consultant, 17, 0).await?;
    gateway.slow(StdDuration::from_millis(500));
    let checkout = {
        let state = state.clone();
        tokio::spawn(async move {
            booking_service::initiate_booking(&state, None, booking(consultant_id, slot, 0)).await
        })
    };
    tokio::time::sleep(StdDuration::from_millis(150)).await;
    let deleted = availability_service::delete_slot(&state, &consultant, consultant_id, slot).await;
    let booked = checkout.await??.data.unwrap();
    gateway.slow(StdDuration::ZERO);
    assert!(matches!(deleted, Err(AppError::Conflict(_))), "{deleted:?}");

    let appointment = Appointments::find_by_id(booked.appointment_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("appointment missing"))?;
    assert_eq!(appointment.status, AppointmentStatus::PendingPayment);
    assert_eq!(appointment.slot_id, Some(slot));

    Ok(())
}

fn booking(consultant_id: Uuid, slot_id: Uuid, n: usize) -> BookAppointmentRequest {
    BookAppointmentRequest {
        consultant_id,
        slot_id: Some(slot_id),
        service_id: None,
        client_name: Some(format!("Client {n}")),
        client_email: Some(format!("client{n}@example.com")),
        client_phone: Some("9876543210".into()),
        price: 800,
    }
}

async fn create_slot(
    state: &AppState,
    consultant: &AuthUser,
    hour: u32,
    minute: u32,
) -> anyhow::Result<Uuid> {
    let start = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
    let slot = availability_service::create_slot(
        state,
        consultant,
        consultant.user_id,
        CreateSlotRequest {
            date: Utc::now().date_naive() + Duration::days(2),
            start_time: start,
            end_time: start + Duration::minutes(45),
        },
    )
    .await?;
    Ok(slot.data.unwrap().id)
}
