use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::ConsultantStatus;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateConsultantRequest {
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub specialization: String,
    pub bio: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Superadmin edit: every field.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateConsultantRequest {
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub specialization: Option<String>,
    #[serde(flatten)]
    pub profile: ConsultantSelfUpdate,
}

/// Fields a consultant may change on their own profile.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConsultantSelfUpdate {
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub pan_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ConsultantStatus,
}
