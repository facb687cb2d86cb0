pub mod auth_service;
pub mod availability_service;
pub mod blog_service;
pub mod booking_service;
pub mod category_service;
pub mod consultant_service;
pub mod offering_service;
pub mod user_service;
