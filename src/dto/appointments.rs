use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::Appointment,
    payments::PaymentOrder,
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BookAppointmentRequest {
    pub consultant_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub client_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    /// Major currency units; the gateway order is sized in minor units.
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConsultantSummary {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub appointment_id: Uuid,
    pub appointment: Appointment,
    pub payment_order: PaymentOrder,
    /// Public gateway key for the browser checkout.
    pub key_id: String,
    pub consultant: ConsultantSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmationResult {
    pub appointment: Appointment,
    /// False when the appointment was already confirmed.
    pub newly_confirmed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AppointmentList {
    #[schema(value_type = Vec<Appointment>)]
    pub items: Vec<Appointment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpireResult {
    pub expired: u64,
}
