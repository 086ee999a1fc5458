pub mod application_service;
pub mod email_templates;
pub mod job_service;
pub mod media_service;
pub mod notification_service;
pub mod user_service;
