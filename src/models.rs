use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    appointments::{self, AppointmentStatus},
    blogs, categories, consultant_availability, consultants, services, subcategories, users,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsultantStatus {
    Online,
    Offline,
}

impl ConsultantStatus {
    pub fn from_flag(is_online: bool) -> Self {
        if is_online {
            ConsultantStatus::Online
        } else {
            ConsultantStatus::Offline
        }
    }

    pub fn is_online(self) -> bool {
        self == ConsultantStatus::Online
    }
}

/// What anyone browsing the marketplace may see.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Consultant {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub bio: Option<String>,
    pub status: ConsultantStatus,
    pub created_at: DateTime<Utc>,
}

impl From<consultants::Model> for Consultant {
    fn from(model: consultants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            specialization: model.specialization,
            bio: model.bio,
            status: ConsultantStatus::from_flag(model.is_online),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Full record, including contact and bank/KYC fields. Superadmin or self only.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsultantProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialization: String,
    pub bio: Option<String>,
    pub status: ConsultantStatus,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub pan_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<consultants::Model> for ConsultantProfile {
    fn from(model: consultants::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            specialization: model.specialization,
            bio: model.bio,
            status: ConsultantStatus::from_flag(model.is_online),
            bank_account_name: model.bank_account_name,
            bank_account_number: model.bank_account_number,
            bank_ifsc: model.bank_ifsc,
            pan_number: model.pan_number,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Held by a pending or confirmed appointment.
    pub booked: bool,
}

impl AvailabilitySlot {
    pub fn from_entity(model: consultant_availability::Model, booked: bool) -> Self {
        Self {
            id: model.id,
            consultant_id: model.consultant_id,
            date: model.date,
            start_time: model.start_time,
            end_time: model.end_time,
            booked,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub slot_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price: i64,
    pub currency: String,
    pub status: AppointmentStatus,
    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<appointments::Model> for Appointment {
    fn from(model: appointments::Model) -> Self {
        Self {
            id: model.id,
            consultant_id: model.consultant_id,
            slot_id: model.slot_id,
            service_id: model.service_id,
            user_id: model.user_id,
            client_name: model.client_name,
            client_email: model.client_email,
            client_phone: model.client_phone,
            date: model.date,
            start_time: model.start_time,
            end_time: model.end_time,
            price: model.price,
            currency: model.currency,
            status: model.status,
            payment_order_id: model.payment_order_id,
            payment_id: model.payment_id,
            confirmed_at: model.confirmed_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Subcategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<subcategories::Model> for Subcategory {
    fn from(model: subcategories::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<services::Model> for Service {
    fn from(model: services::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            subcategory_id: model.subcategory_id,
            title: model.title,
            description: model.description,
            kind: model.kind,
            price: model.price,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub cover_image_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<blogs::Model> for Blog {
    fn from(model: blogs::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            summary: model.summary,
            content: model.content,
            author: model.author,
            cover_image_url: model.cover_image_url,
            published: model.published,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
