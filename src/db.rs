pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod pipeline_repo;
pub use pipeline_repo::PipelineRepository;
pub mod deal_repo;
pub use deal_repo::DealRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
