// src/services/pipeline_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PipelineRepository,
    models::{
        auth::Caller,
        pipeline::{
            CreatePipelinePayload, CreateStagePayload, DealStage, Pipeline, PipelineDetail,
            UpdatePipelinePayload, UpdateStagePayload,
        },
    },
    services::access,
};

// (nome, descrição, cor, probabilidade, final, ganho)
const DEFAULT_STAGES: [(&str, &str, &str, i32, bool, bool); 7] = [
    ("Novo lead", "Primeiro contato", "#94A3B8", 10, false, false),
    ("Qualificação", "Levantamento de necessidades", "#3B82F6", 25, false, false),
    ("Proposta comercial", "Proposta enviada", "#8B5CF6", 50, false, false),
    ("Negociação", "Discussão de condições", "#F59E0B", 75, false, false),
    ("Contrato", "Preparação e assinatura", "#10B981", 90, false, false),
    ("Fechado com sucesso", "Negócio ganho", "#059669", 100, true, true),
    ("Perdido", "Negócio perdido", "#EF4444", 0, true, false),
];

/// Etapas do funil padrão, na ordem em que aparecem no Kanban.
pub fn default_stages() -> Vec<CreateStagePayload> {
    DEFAULT_STAGES
        .iter()
        .enumerate()
        .map(|(i, &(name, description, color, win_probability, is_final, is_won))| {
            CreateStagePayload {
                name: name.to_string(),
                description: Some(description.to_string()),
                color: color.to_string(),
                sort_order: i as i32,
                win_probability,
                is_final,
                is_won,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct PipelineService {
    repo: PipelineRepository,
    pool: PgPool,
}

impl PipelineService {
    pub fn new(repo: PipelineRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  1. FUNIS
    // =========================================================================

    pub async fn list_active(&self) -> Result<Vec<Pipeline>, AppError> {
        self.repo.list_active().await
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<PipelineDetail, AppError> {
        let pipeline = self.find(id).await?;
        let stages = self.repo.list_stages(id).await?;
        Ok(PipelineDetail { pipeline, stages })
    }

    pub async fn create(
        &self,
        caller: Caller,
        payload: &CreatePipelinePayload,
    ) -> Result<Pipeline, AppError> {
        access::ensure_admin(caller)?;
        self.repo.create(&self.pool, payload).await
    }

    pub async fn update(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdatePipelinePayload,
    ) -> Result<Pipeline, AppError> {
        access::ensure_admin(caller)?;
        let mut pipeline = self.find(id).await?;
        payload.apply_to(&mut pipeline);
        self.repo.update(&pipeline).await
    }

    async fn find(&self, id: Uuid) -> Result<Pipeline, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Funil"))
    }

    // =========================================================================
    //  2. ETAPAS
    // =========================================================================

    pub async fn list_stages(&self, pipeline_id: Uuid) -> Result<Vec<DealStage>, AppError> {
        self.find(pipeline_id).await?;
        self.repo.list_stages(pipeline_id).await
    }

    pub async fn create_stage(
        &self,
        caller: Caller,
        pipeline_id: Uuid,
        payload: &CreateStagePayload,
    ) -> Result<DealStage, AppError> {
        access::ensure_admin(caller)?;
        self.find(pipeline_id).await?;
        self.repo.create_stage(&self.pool, pipeline_id, payload).await
    }

    pub async fn update_stage(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdateStagePayload,
    ) -> Result<DealStage, AppError> {
        access::ensure_admin(caller)?;
        let mut stage = self
            .repo
            .find_stage(&self.pool, id)
            .await?
            .ok_or(AppError::ResourceNotFound("Etapa"))?;
        payload.apply_to(&mut stage);
        self.repo.update_stage(&stage).await
    }

    /// Só apaga etapa vazia; caso contrário devolve quantos negócios a seguram.
    pub async fn delete_stage(&self, caller: Caller, id: Uuid) -> Result<(), AppError> {
        access::ensure_admin(caller)?;

        let mut tx = self.pool.begin().await?;

        let stage = self
            .repo
            .lock_stage(&mut *tx, id)
            .await?
            .ok_or(AppError::ResourceNotFound("Etapa"))?;

        let blocking = self.repo.count_deals_in_stage(&mut *tx, id).await?;
        if blocking > 0 {
            return Err(AppError::StageHasDeals(blocking));
        }

        self.repo.delete_stage(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Etapa '{}' removida por {}", stage.name, caller.id);
        Ok(())
    }

    // =========================================================================
    //  3. FUNIL PADRÃO (CLI `init-pipeline`)
    // =========================================================================

    /// Cria o funil padrão. Sem `force`, não faz nada se já existir algum funil.
    pub async fn seed_default(&self, force: bool) -> Result<Option<PipelineDetail>, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = self.repo.count(&mut *tx).await?;
        if existing > 0 && !force {
            tracing::warn!("⚠️ Já existem {} funil(is); nada foi criado (use --force)", existing);
            return Ok(None);
        }

        let pipeline = self
            .repo
            .create(
                &mut *tx,
                &CreatePipelinePayload {
                    name: "Funil principal".to_string(),
                    description: Some("Funil de vendas padrão".to_string()),
                    sort_order: 0,
                },
            )
            .await?;

        let mut stages = Vec::with_capacity(DEFAULT_STAGES.len());
        for stage in default_stages() {
            stages.push(self.repo.create_stage(&mut *tx, pipeline.id, &stage).await?);
        }

        tx.commit().await?;

        tracing::info!("✅ Funil '{}' criado com {} etapas", pipeline.name, stages.len());
        Ok(Some(PipelineDetail { pipeline, stages }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    use crate::{
        models::auth::Role,
        test_support::{self, payload},
    };

    #[test]
    fn default_pipeline_shape() {
        let stages = default_stages();
        assert_eq!(stages.len(), 7);

        let open: Vec<i32> = stages.iter().filter(|s| !s.is_final).map(|s| s.win_probability).collect();
        assert_eq!(open, vec![10, 25, 50, 75, 90]);

        let won: Vec<_> = stages.iter().filter(|s| s.is_final && s.is_won).collect();
        let lost: Vec<_> = stages.iter().filter(|s| s.is_final && !s.is_won).collect();
        assert_eq!(won.len(), 1);
        assert_eq!(won[0].win_probability, 100);
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].win_probability, 0);
    }

    #[test]
    fn default_stages_are_ordered_and_valid() {
        for (i, stage) in default_stages().iter().enumerate() {
            assert_eq!(stage.sort_order, i as i32);
            assert!(stage.validate().is_ok());
        }
    }

    #[sqlx::test]
    async fn stage_with_deals_cannot_be_deleted_until_emptied(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let employee = test_support::user(&pool, "vendedor", Role::Employee).await;
        let sales = test_support::sales_pipeline(&state, admin).await;
        let client = test_support::client(&state, admin, "Acme").await;

        let mut deal_ids = Vec::new();
        for title in ["A", "B"] {
            let deal = state
                .deal_service
                .create(
                    admin,
                    &payload(json!({
                        "title": title,
                        "client_id": client.id,
                        "pipeline_id": sales.pipeline.id,
                        "stage_id": sales.lead.id
                    })),
                )
                .await
                .unwrap();
            deal_ids.push(deal.id);
        }

        let service = &state.pipeline_service;
        let err = service.delete_stage(employee, sales.lead.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));

        let err = service.delete_stage(admin, sales.lead.id).await.unwrap_err();
        assert!(matches!(err, AppError::StageHasDeals(2)));

        // Bloqueio se repete enquanto houver negócio na etapa
        state.deal_service.delete(admin, deal_ids[0]).await.unwrap();
        let err = service.delete_stage(admin, sales.lead.id).await.unwrap_err();
        assert!(matches!(err, AppError::StageHasDeals(1)));

        state.deal_service.delete(admin, deal_ids[1]).await.unwrap();
        service.delete_stage(admin, sales.lead.id).await.unwrap();

        let stages = service.list_stages(sales.pipeline.id).await.unwrap();
        assert!(stages.iter().all(|s| s.id != sales.lead.id));
        let err = service.delete_stage(admin, sales.lead.id).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }

    #[sqlx::test]
    async fn seed_default_respects_force(pool: PgPool) {
        let state = test_support::state(pool);
        let service = &state.pipeline_service;

        let seeded = service.seed_default(false).await.unwrap().unwrap();
        assert_eq!(seeded.stages.len(), 7);
        assert!(service.seed_default(false).await.unwrap().is_none());
        assert!(service.seed_default(true).await.unwrap().is_some());
        assert_eq!(service.list_active().await.unwrap().len(), 2);
    }
}
