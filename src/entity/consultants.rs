use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "consultants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub specialization: String,
    pub bio: Option<String>,
    pub is_online: bool,
    pub password_hash: String,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub pan_number: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::consultant_availability::Entity")]
    Availability,
    #[sea_orm(has_many = "super::appointments::Entity")]
    Appointments,
    #[sea_orm(has_many = "super::service_consultants::Entity")]
    ServiceConsultants,
}

impl Related<super::consultant_availability::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Availability.def()
    }
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        super::service_consultants::Relation::Services.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::service_consultants::Relation::Consultants.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
