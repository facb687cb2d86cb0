pub mod admins;
pub mod appointments;
pub mod audit_logs;
pub mod blogs;
pub mod categories;
pub mod consultant_availability;
pub mod consultants;
pub mod service_consultants;
pub mod services;
pub mod subcategories;
pub mod users;

pub use admins::Entity as Admins;
pub use appointments::Entity as Appointments;
pub use audit_logs::Entity as AuditLogs;
pub use blogs::Entity as Blogs;
pub use categories::Entity as Categories;
pub use consultant_availability::Entity as ConsultantAvailability;
pub use consultants::Entity as Consultants;
pub use service_consultants::Entity as ServiceConsultants;
pub use services::Entity as Services;
pub use subcategories::Entity as Subcategories;
pub use users::Entity as Users;
