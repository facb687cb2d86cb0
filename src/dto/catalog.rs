use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Consultant, Service, Subcategory};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithSubcategories {
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubcategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SubcategoryList {
    #[schema(value_type = Vec<Subcategory>)]
    pub items: Vec<Subcategory>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub price: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ServiceList {
    #[schema(value_type = Vec<Service>)]
    pub items: Vec<Service>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceDetail {
    pub service: Service,
    pub consultant_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ConsultantList {
    #[schema(value_type = Vec<Consultant>)]
    pub items: Vec<Consultant>,
}
