use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(has_many = "super::service_consultants::Entity")]
    ServiceConsultants,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::consultants::Entity> for Entity {
    fn to() -> RelationDef {
        super::service_consultants::Relation::Consultants.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::service_consultants::Relation::Services.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
