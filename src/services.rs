pub mod access;
pub mod activity_service;
pub mod auth;
pub mod client_service;
pub mod dashboard_service;
pub mod deal_service;
pub mod pipeline_service;
pub mod task_service;
pub mod user_service;
