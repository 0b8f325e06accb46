pub mod activities;
pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod deals;
pub mod pipelines;
pub mod tasks;
pub mod users;
