// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,

        // --- Clients / Contacts ---
        handlers::crm::list_clients,
        handlers::crm::create_client,
        handlers::crm::client_stats,
        handlers::crm::get_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,
        handlers::crm::list_contacts,
        handlers::crm::create_contact,
        handlers::crm::update_contact,
        handlers::crm::delete_contact,

        // --- Pipelines ---
        handlers::pipelines::list_pipelines,
        handlers::pipelines::create_pipeline,
        handlers::pipelines::get_pipeline,
        handlers::pipelines::update_pipeline,
        handlers::pipelines::list_stages,
        handlers::pipelines::create_stage,
        handlers::pipelines::update_stage,
        handlers::pipelines::delete_stage,

        // --- Deals ---
        handlers::deals::list_deals,
        handlers::deals::create_deal,
        handlers::deals::pipeline_board,
        handlers::deals::get_deal,
        handlers::deals::update_deal,
        handlers::deals::delete_deal,
        handlers::deals::move_deal,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::get_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,

        // --- Activities ---
        handlers::activities::list_activities,
        handlers::activities::create_activity,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
        handlers::dashboard::get_recent_activities,
        handlers::dashboard::get_sales_chart,
        handlers::dashboard::get_pipeline_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::AdminUpdateUserPayload,

            // --- CRM ---
            models::crm::ClientStatus,
            models::crm::Client,
            models::crm::CreateClientPayload,
            models::crm::UpdateClientPayload,
            models::crm::ClientStats,
            models::crm::Contact,
            models::crm::CreateContactPayload,
            models::crm::UpdateContactPayload,

            // --- Pipelines ---
            models::pipeline::Pipeline,
            models::pipeline::DealStage,
            models::pipeline::PipelineDetail,
            models::pipeline::CreatePipelinePayload,
            models::pipeline::UpdatePipelinePayload,
            models::pipeline::CreateStagePayload,
            models::pipeline::UpdateStagePayload,

            // --- Deals ---
            models::deal::DealStatus,
            models::deal::Deal,
            models::deal::CreateDealPayload,
            models::deal::UpdateDealPayload,
            models::deal::MoveDealPayload,
            models::deal::DealCard,
            models::deal::StageColumn,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::TaskPriority,
            models::task::Task,
            models::task::CreateTaskPayload,
            models::task::UpdateTaskPayload,

            // --- Activities ---
            models::activity::ActivityType,
            models::activity::Activity,
            models::activity::CreateActivityPayload,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::DealCounts,
            models::dashboard::Revenue,
            models::dashboard::ClientCounts,
            models::dashboard::TaskCounts,
            models::dashboard::SalesChartEntry,
            models::dashboard::StageSnapshot,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login e perfil do usuário"),
        (name = "Users", description = "Gestão de usuários (admin)"),
        (name = "Clients", description = "Clientes"),
        (name = "Contacts", description = "Pessoas de contato dos clientes"),
        (name = "Pipelines", description = "Funis de venda e etapas"),
        (name = "Deals", description = "Negócios e Kanban"),
        (name = "Tasks", description = "Tarefas"),
        (name = "Activities", description = "Histórico de interações"),
        (name = "Dashboard", description = "Indicadores")
    )
)]
pub struct ApiDoc;

// Registra o esquema Bearer usado por `security(("api_jwt" = []))`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
