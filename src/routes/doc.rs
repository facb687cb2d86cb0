use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        appointments::{
            AppointmentList, BookAppointmentRequest, BookingCreated, ConfirmationResult,
            ConsultantSummary, ExpireResult,
        },
        auth::{LoginRequest, LoginResponse, RegisterRequest, WhoAmI},
        availability::{CreateSlotRequest, SlotList},
        blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
        catalog::{
            CategoryList, CategoryWithSubcategories, ConsultantList, CreateCategoryRequest,
            CreateServiceRequest, ServiceDetail, ServiceList, SubcategoryList, SubcategoryRequest,
            UpdateCategoryRequest, UpdateServiceRequest,
        },
        consultants::{
            ConsultantSelfUpdate, CreateConsultantRequest, UpdateConsultantRequest,
            UpdateStatusRequest,
        },
        users::UserList,
    },
    entity::appointments::AppointmentStatus,
    middleware::auth::Role,
    models::{
        Appointment, AvailabilitySlot, Blog, Category, Consultant, ConsultantProfile,
        ConsultantStatus, Service, Subcategory, User,
    },
    payments::{PaymentConfirmation, PaymentOrder},
    response::{ApiResponse, ErrorBody, Meta},
    routes::{
        admin, appointments, auth, blogs, categories, consultants, health, params, services,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::login,
        auth::admin_login,
        auth::consultant_login,
        auth::me,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::list_subcategories,
        categories::create_subcategory,
        categories::update_subcategory,
        categories::delete_subcategory,
        consultants::list_consultants,
        consultants::get_consultant,
        consultants::create_consultant,
        consultants::update_consultant,
        consultants::delete_consultant,
        consultants::get_profile,
        consultants::update_profile,
        consultants::update_status,
        consultants::list_slots,
        consultants::create_slot,
        consultants::delete_slot,
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        services::list_service_consultants,
        services::link_consultant,
        services::unlink_consultant,
        appointments::book_appointment,
        appointments::confirm_payment,
        appointments::cancel_appointment,
        appointments::get_appointment,
        appointments::list_appointments,
        users::list_users,
        users::get_user,
        users::delete_user,
        blogs::list_blogs,
        blogs::get_blog,
        blogs::create_blog,
        blogs::update_blog,
        blogs::delete_blog,
        admin::expire_pending
    ),
    components(
        schemas(
            User,
            Consultant,
            ConsultantProfile,
            ConsultantStatus,
            AvailabilitySlot,
            Appointment,
            AppointmentStatus,
            Category,
            Subcategory,
            Service,
            Blog,
            Role,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            WhoAmI,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            SubcategoryRequest,
            CreateServiceRequest,
            UpdateServiceRequest,
            CategoryList,
            CategoryWithSubcategories,
            SubcategoryList,
            ServiceList,
            ServiceDetail,
            ConsultantList,
            CreateConsultantRequest,
            UpdateConsultantRequest,
            ConsultantSelfUpdate,
            UpdateStatusRequest,
            CreateSlotRequest,
            SlotList,
            BookAppointmentRequest,
            BookingCreated,
            ConsultantSummary,
            ConfirmationResult,
            AppointmentList,
            ExpireResult,
            PaymentOrder,
            PaymentConfirmation,
            CreateBlogRequest,
            UpdateBlogRequest,
            BlogList,
            UserList,
            params::Pagination,
            params::SortOrder,
            Meta,
            ErrorBody,
            ApiResponse<BookingCreated>,
            ApiResponse<Appointment>,
            ApiResponse<ConsultantList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Registration, login and identity"),
        (name = "Categories", description = "Category and subcategory catalog"),
        (name = "Consultants", description = "Consultant directory and profiles"),
        (name = "Availability", description = "Consultant time slots"),
        (name = "Services", description = "Marketplace offerings"),
        (name = "Appointments", description = "Booking and payment confirmation"),
        (name = "Users", description = "Client accounts"),
        (name = "Blogs", description = "Blog posts"),
        (name = "Admin", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_booking_and_catalog_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/appointments",
            "/api/appointments/{id}/confirm",
            "/api/consultants/{id}/availability",
            "/api/services/{id}/consultants/{consultant_id}",
            "/api/admin/appointments/expire",
            "/health/ready",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
