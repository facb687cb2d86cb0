use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Blog;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBlogRequest {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub cover_image_url: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BlogList {
    #[schema(value_type = Vec<Blog>)]
    pub items: Vec<Blog>,
}
