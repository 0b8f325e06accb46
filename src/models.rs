pub mod activity;
pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod deal;
pub mod pipeline;
pub mod task;
