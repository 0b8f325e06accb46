// src/services/activity_service.rs

use chrono::Utc;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{ActivityRepository, ClientRepository, DealRepository},
    models::{
        activity::{Activity, ActivityFilters, CreateActivityPayload, NewActivity},
        auth::Caller,
    },
    services::access,
};

#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityRepository,
    deal_repo: DealRepository,
    client_repo: ClientRepository,
}

impl ActivityService {
    pub fn new(
        repo: ActivityRepository,
        deal_repo: DealRepository,
        client_repo: ClientRepository,
    ) -> Self {
        Self { repo, deal_repo, client_repo }
    }

    pub async fn list(
        &self,
        caller: Caller,
        filters: &ActivityFilters,
        page: Pagination,
    ) -> Result<Vec<Activity>, AppError> {
        let owner = access::scope(caller).owner_filter();
        self.repo.list(owner, filters, page).await
    }

    // Interação registrada manualmente; o autor é sempre quem chama
    pub async fn log(&self, caller: Caller, payload: &CreateActivityPayload) -> Result<Activity, AppError> {
        if let Some(deal_id) = payload.deal_id {
            if !self.deal_repo.exists(deal_id).await? {
                return Err(AppError::ResourceNotFound("Negócio"));
            }
        }
        if let Some(client_id) = payload.client_id {
            if !self.client_repo.exists(client_id).await? {
                return Err(AppError::ResourceNotFound("Cliente"));
            }
        }

        let new = NewActivity {
            kind: payload.kind,
            deal_id: payload.deal_id,
            client_id: payload.client_id,
            user_id: caller.id,
            subject: payload.subject.clone(),
            content: payload.content.clone(),
            duration: payload.duration,
            activity_date: payload.activity_date.unwrap_or_else(Utc::now),
        };
        self.repo.create(&new).await
    }
}
