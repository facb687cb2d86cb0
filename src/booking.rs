//! Appointment lifecycle rules.
//!
//! ```text
//! pending_payment --confirm--> confirmed
//!        |                        |
//!        +--cancel--> cancelled <-+
//!        |
//!        +--expire--> expired
//! ```
//!
//! Repeating a transition that already happened is a no-op so that duplicate
//! gateway callbacks and retried requests are harmless.

use sea_orm::Iterable;

use crate::{entity::appointments::AppointmentStatus, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply(AppointmentStatus),
    NoOp,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::PendingPayment => "pending_payment",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending_payment" => Ok(AppointmentStatus::PendingPayment),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "expired" => Ok(AppointmentStatus::Expired),
            _ => Err(AppError::BadRequest(format!(
                "Invalid appointment status: {value}"
            ))),
        }
    }

    /// Whether an appointment in this state holds its availability slot.
    pub fn holds_slot(self) -> bool {
        matches!(
            self,
            AppointmentStatus::PendingPayment | AppointmentStatus::Confirmed
        )
    }

    /// Every status that keeps a slot taken.
    pub fn slot_holding() -> Vec<Self> {
        Self::iter().filter(|s| s.holds_slot()).collect()
    }

    pub fn on_confirm(self) -> Result<Transition, AppError> {
        match self {
            AppointmentStatus::PendingPayment => Ok(Transition::Apply(AppointmentStatus::Confirmed)),
            AppointmentStatus::Confirmed => Ok(Transition::NoOp),
            AppointmentStatus::Cancelled | AppointmentStatus::Expired => Err(AppError::Conflict(
                format!("Appointment is {} and cannot be confirmed", self.as_str()),
            )),
        }
    }

    pub fn on_cancel(self) -> Result<Transition, AppError> {
        match self {
            AppointmentStatus::PendingPayment | AppointmentStatus::Confirmed => {
                Ok(Transition::Apply(AppointmentStatus::Cancelled))
            }
            AppointmentStatus::Cancelled => Ok(Transition::NoOp),
            AppointmentStatus::Expired => Err(AppError::Conflict(
                "Appointment has expired and cannot be cancelled".into(),
            )),
        }
    }

    /// Only abandoned checkouts expire; anything else is left alone by the sweep.
    pub fn on_expire(self) -> Transition {
        match self {
            AppointmentStatus::PendingPayment => Transition::Apply(AppointmentStatus::Expired),
            _ => Transition::NoOp,
        }
    }
}

/// Converts a price in major currency units into gateway minor units.
pub fn to_minor_units(price: i64) -> Result<i64, AppError> {
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    price
        .checked_mul(100)
        .ok_or_else(|| AppError::BadRequest("price is too large".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn confirm_moves_pending_to_confirmed() {
        assert_eq!(PendingPayment.on_confirm().unwrap(), Transition::Apply(Confirmed));
    }

    #[test]
    fn confirm_is_idempotent() {
        assert_eq!(Confirmed.on_confirm().unwrap(), Transition::NoOp);
    }

    #[test]
    fn confirm_rejects_terminal_states() {
        assert!(matches!(Cancelled.on_confirm(), Err(AppError::Conflict(_))));
        assert!(matches!(Expired.on_confirm(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn cancel_rules() {
        assert_eq!(PendingPayment.on_cancel().unwrap(), Transition::Apply(Cancelled));
        assert_eq!(Confirmed.on_cancel().unwrap(), Transition::Apply(Cancelled));
        assert_eq!(Cancelled.on_cancel().unwrap(), Transition::NoOp);
        assert!(Expired.on_cancel().is_err());
    }

    #[test]
    fn only_pending_expires() {
        assert_eq!(PendingPayment.on_expire(), Transition::Apply(Expired));
        assert_eq!(Confirmed.on_expire(), Transition::NoOp);
        assert_eq!(Cancelled.on_expire(), Transition::NoOp);
    }

    #[test]
    fn slot_is_held_while_active() {
        assert!(PendingPayment.holds_slot());
        assert!(Confirmed.holds_slot());
        assert!(!Cancelled.holds_slot());
        assert!(!Expired.holds_slot());
        assert_eq!(AppointmentStatus::slot_holding(), vec![PendingPayment, Confirmed]);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [PendingPayment, Confirmed, Cancelled, Expired] {
            assert_eq!(AppointmentStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(AppointmentStatus::parse("paid").is_err());
    }

    #[test]
    fn price_is_converted_to_minor_units() {
        assert_eq!(to_minor_units(500).unwrap(), 50_000);
        assert!(to_minor_units(0).is_err());
        assert!(to_minor_units(-10).is_err());
        assert!(to_minor_units(i64::MAX).is_err());
    }
}
