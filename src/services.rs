pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod coverage;
pub mod eligibility;
pub use eligibility::EligibilityService;
pub mod notification;
pub use notification::NotificationService;
pub mod schedule_service;
pub use schedule_service::ScheduleService;
