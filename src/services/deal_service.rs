// src/services/deal_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{ActivityRepository, ClientRepository, DealRepository, PipelineRepository, UserRepository},
    models::{
        activity::NewActivity,
        auth::Caller,
        deal::{
            CreateDealPayload, Deal, DealCard, DealFilters, DealStatus, MoveDealPayload,
            StageColumn, UpdateDealPayload,
        },
        pipeline::DealStage,
    },
    services::{access, user_service::ensure_user},
};

// =========================================================================
//  REGRA DE CICLO DE VIDA (pura)
// =========================================================================

/// Efeito de mover o negócio para `target`.
///
/// Etapa final carimba `closed_at` (de novo, se já estava fechado) e decide ganho/perda.
/// Etapa não final só troca a etapa: status, `closed_at` e `lost_reason` ficam como estavam.
pub fn apply_stage_move(deal: &mut Deal, target: &DealStage, reason: Option<&str>, now: DateTime<Utc>) {
    deal.stage_id = target.id;

    if !target.is_final {
        return;
    }

    deal.closed_at = Some(now);
    if target.is_won {
        deal.status = DealStatus::Won;
    } else {
        deal.status = DealStatus::Lost;
        if let Some(reason) = reason {
            deal.lost_reason = Some(reason.to_string());
        }
    }
}

/// Override explícito via PUT. `closed_at` só é carimbado na primeira saída de `open`.
pub fn apply_status_override(deal: &mut Deal, status: Option<DealStatus>, now: DateTime<Utc>) {
    let Some(status) = status else {
        return;
    };
    if status != DealStatus::Open && deal.closed_at.is_none() {
        deal.closed_at = Some(now);
    }
    deal.status = status;
}

/// A etapa precisa pertencer ao funil do negócio.
pub fn ensure_stage_in_pipeline(stage: &DealStage, pipeline_id: Uuid) -> Result<(), AppError> {
    if stage.pipeline_id != pipeline_id {
        return Err(AppError::InvalidInput(format!(
            "A etapa '{}' não pertence ao funil do negócio.",
            stage.name
        )));
    }
    Ok(())
}

pub fn stage_change_note(
    deal: &Deal,
    author_id: Uuid,
    from: Option<&str>,
    to: &str,
    now: DateTime<Utc>,
) -> NewActivity {
    NewActivity::deal_note(
        deal.id,
        deal.client_id,
        author_id,
        "Negócio movido",
        format!("Etapa alterada: {} → {}", from.unwrap_or("?"), to),
        now,
    )
}

/// Agrupa os cartões abertos nas colunas do Kanban, na ordem das etapas.
pub fn build_board(stages: Vec<DealStage>, cards: Vec<DealCard>) -> Vec<StageColumn> {
    let mut by_stage: HashMap<Uuid, Vec<DealCard>> = HashMap::new();
    for card in cards {
        by_stage.entry(card.stage_id).or_default().push(card);
    }

    stages
        .into_iter()
        .map(|stage| {
            let deals = by_stage.remove(&stage.id).unwrap_or_default();
            let total_amount = deals.iter().map(|d| d.amount).sum::<Decimal>();
            StageColumn {
                stage_id: stage.id,
                stage_name: stage.name,
                color: stage.color,
                deals_count: deals.len() as i64,
                total_amount,
                deals,
            }
        })
        .collect()
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct DealService {
    repo: DealRepository,
    client_repo: ClientRepository,
    pipeline_repo: PipelineRepository,
    activity_repo: ActivityRepository,
    user_repo: UserRepository,
    pool: PgPool,
    default_currency: String,
}

impl DealService {
    pub fn new(
        repo: DealRepository,
        client_repo: ClientRepository,
        pipeline_repo: PipelineRepository,
        activity_repo: ActivityRepository,
        user_repo: UserRepository,
        pool: PgPool,
        default_currency: String,
    ) -> Self {
        Self { repo, client_repo, pipeline_repo, activity_repo, user_repo, pool, default_currency }
    }

    pub async fn list(
        &self,
        caller: Caller,
        filters: &DealFilters,
        page: Pagination,
    ) -> Result<Vec<Deal>, AppError> {
        let owner = access::scope(caller).owner_filter();
        self.repo.list(owner, filters, page).await
    }

    pub async fn get(&self, caller: Caller, id: Uuid) -> Result<Deal, AppError> {
        let deal = self.find(id).await?;
        access::ensure_visible(caller, &deal)?;
        Ok(deal)
    }

    /// Cria o negócio e a nota "Negócio criado" na mesma transação.
    pub async fn create(&self, caller: Caller, payload: &CreateDealPayload) -> Result<Deal, AppError> {
        if !self.client_repo.exists(payload.client_id).await? {
            return Err(AppError::ResourceNotFound("Cliente"));
        }
        self.pipeline_repo
            .find_by_id(payload.pipeline_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Funil"))?;
        ensure_user(&self.user_repo, payload.manager_id).await?;

        let manager_id = access::owner_or_caller(caller, payload.manager_id);
        let currency = payload.currency.as_deref().unwrap_or(&self.default_currency);

        let mut tx = self.pool.begin().await?;

        let stage = self
            .pipeline_repo
            .find_stage(&mut *tx, payload.stage_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Etapa"))?;
        ensure_stage_in_pipeline(&stage, payload.pipeline_id)?;

        let deal = self.repo.create(&mut *tx, payload, manager_id, currency).await?;

        let note = NewActivity::deal_note(
            deal.id,
            deal.client_id,
            caller.id,
            "Negócio criado",
            format!("Negócio \"{}\" criado na etapa {}", deal.title, stage.name),
            Utc::now(),
        );
        self.activity_repo.insert(&mut *tx, &note).await?;

        tx.commit().await?;

        tracing::info!("💼 Negócio {} criado por {}", deal.id, caller.id);
        Ok(deal)
    }

    pub async fn update(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &UpdateDealPayload,
    ) -> Result<Deal, AppError> {
        let mut deal = self.get(caller, id).await?;

        // Referências alteradas precisam existir
        if let Some(client_id) = payload.client_id {
            if !self.client_repo.exists(client_id).await? {
                return Err(AppError::ResourceNotFound("Cliente"));
            }
        }
        if let Some(stage_id) = payload.stage_id {
            let stage = self
                .pipeline_repo
                .find_stage(&self.pool, stage_id)
                .await?
                .ok_or(AppError::ResourceNotFound("Etapa"))?;
            ensure_stage_in_pipeline(&stage, deal.pipeline_id)?;
        }
        ensure_user(&self.user_repo, payload.manager_id).await?;

        payload.apply_fields(&mut deal);
        apply_status_override(&mut deal, payload.status, Utc::now());

        self.repo.update(&self.pool, &deal).await
    }

    pub async fn delete(&self, caller: Caller, id: Uuid) -> Result<(), AppError> {
        let deal = self.find(id).await?;
        access::ensure_can_delete(caller, &deal)?;
        self.repo.delete(id).await
    }

    /// Move o negócio de etapa. Linha travada; negócio e atividade gravados juntos.
    pub async fn move_to_stage(
        &self,
        caller: Caller,
        id: Uuid,
        payload: &MoveDealPayload,
    ) -> Result<Deal, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut deal = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ResourceNotFound("Negócio"))?;
        access::ensure_visible(caller, &deal)?;

        let target = self
            .pipeline_repo
            .find_stage(&mut *tx, payload.stage_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Etapa"))?;
        ensure_stage_in_pipeline(&target, deal.pipeline_id)?;
        let previous = self.pipeline_repo.find_stage(&mut *tx, deal.stage_id).await?;

        let now = Utc::now();
        apply_stage_move(&mut deal, &target, payload.reason.as_deref(), now);

        let updated = self.repo.update(&mut *tx, &deal).await?;

        let note = stage_change_note(
            &updated,
            caller.id,
            previous.as_ref().map(|s| s.name.as_str()),
            &target.name,
            now,
        );
        self.activity_repo.insert(&mut *tx, &note).await?;

        tx.commit().await?;

        if target.is_final {
            tracing::info!("🏁 Negócio {} fechado como {:?}", updated.id, updated.status);
        } else {
            tracing::info!("➡️ Negócio {} movido para '{}'", updated.id, target.name);
        }
        Ok(updated)
    }

    pub async fn pipeline_board(
        &self,
        caller: Caller,
        pipeline_id: Uuid,
    ) -> Result<Vec<StageColumn>, AppError> {
        self.pipeline_repo
            .find_by_id(pipeline_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Funil"))?;

        let owner = access::scope(caller).owner_filter();
        let stages = self.pipeline_repo.list_stages(pipeline_id).await?;
        let cards = self.repo.open_cards(pipeline_id, owner).await?;

        Ok(build_board(stages, cards))
    }

    async fn find(&self, id: Uuid) -> Result<Deal, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::ResourceNotFound("Negócio"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    use crate::{
        models::{activity::ActivityType, auth::Role},
        test_support::{self, payload},
    };

    fn stage(name: &str, is_final: bool, is_won: bool) -> DealStage {
        DealStage {
            id: Uuid::new_v4(),
            pipeline_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            color: "#3B82F6".to_string(),
            sort_order: 0,
            win_probability: 0,
            is_final,
            is_won,
            created_at: Utc::now(),
        }
    }

    fn deal_in(stage: &DealStage, amount: i64) -> Deal {
        let now = Utc::now();
        Deal {
            id: Uuid::new_v4(),
            title: "Campanha de verão".into(),
            description: None,
            client_id: Uuid::new_v4(),
            pipeline_id: stage.pipeline_id,
            stage_id: stage.id,
            manager_id: None,
            amount: Decimal::new(amount, 0),
            currency: "RUB".into(),
            expected_close_date: None,
            closed_at: None,
            status: DealStatus::Open,
            lost_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn won_then_lost_restamps_and_reevaluates() {
        let lead = stage("Lead", false, false);
        let won = stage("Won", true, true);
        let lost = stage("Lost", true, false);
        let mut deal = deal_in(&lead, 1000);

        let t1 = Utc::now();
        apply_stage_move(&mut deal, &won, None, t1);
        assert_eq!(deal.status, DealStatus::Won);
        assert_eq!(deal.stage_id, won.id);
        assert_eq!(deal.closed_at, Some(t1));

        let t2 = t1 + Duration::minutes(5);
        apply_stage_move(&mut deal, &lost, Some("Preço"), t2);
        assert_eq!(deal.status, DealStatus::Lost);
        assert_eq!(deal.lost_reason.as_deref(), Some("Preço"));
        assert_eq!(deal.closed_at, Some(t2));
    }

    #[test]
    fn lost_without_reason_keeps_previous_reason() {
        let lost = stage("Lost", true, false);
        let mut deal = deal_in(&stage("Lead", false, false), 10);
        deal.lost_reason = Some("antigo".into());

        apply_stage_move(&mut deal, &lost, None, Utc::now());
        assert_eq!(deal.status, DealStatus::Lost);
        assert_eq!(deal.lost_reason.as_deref(), Some("antigo"));
    }

    #[test]
    fn reason_is_ignored_on_won_stage() {
        let won = stage("Won", true, true);
        let mut deal = deal_in(&stage("Lead", false, false), 10);

        apply_stage_move(&mut deal, &won, Some("sem motivo"), Utc::now());
        assert_eq!(deal.status, DealStatus::Won);
        assert_eq!(deal.lost_reason, None);
    }

    #[test]
    fn non_final_move_leaves_closure_untouched() {
        let lost = stage("Lost", true, false);
        let negotiation = stage("Negociação", false, false);
        let mut deal = deal_in(&stage("Lead", false, false), 10);

        let closed = Utc::now();
        apply_stage_move(&mut deal, &lost, Some("Sumiu"), closed);
        apply_stage_move(&mut deal, &negotiation, None, closed + Duration::hours(1));

        assert_eq!(deal.stage_id, negotiation.id);
        assert_eq!(deal.status, DealStatus::Lost);
        assert_eq!(deal.closed_at, Some(closed));
        assert_eq!(deal.lost_reason.as_deref(), Some("Sumiu"));
    }

    #[test]
    fn open_deal_stays_open_on_non_final_move() {
        let mut deal = deal_in(&stage("Lead", false, false), 10);
        apply_stage_move(&mut deal, &stage("Proposta", false, false), None, Utc::now());
        assert_eq!(deal.status, DealStatus::Open);
        assert_eq!(deal.closed_at, None);
    }

    #[test]
    fn status_override_stamps_only_first_close() {
        let mut deal = deal_in(&stage("Lead", false, false), 10);

        let first = Utc::now();
        apply_status_override(&mut deal, Some(DealStatus::Won), first);
        assert_eq!(deal.status, DealStatus::Won);
        assert_eq!(deal.closed_at, Some(first));

        apply_status_override(&mut deal, Some(DealStatus::Lost), first + Duration::days(1));
        assert_eq!(deal.status, DealStatus::Lost);
        assert_eq!(deal.closed_at, Some(first));

        apply_status_override(&mut deal, None, first + Duration::days(2));
        assert_eq!(deal.status, DealStatus::Lost);
    }

    #[test]
    fn override_back_to_open_does_not_stamp() {
        let mut deal = deal_in(&stage("Lead", false, false), 10);
        apply_status_override(&mut deal, Some(DealStatus::Open), Utc::now());
        assert_eq!(deal.closed_at, None);
    }

    #[test]
    fn move_note_describes_transition() {
        let deal = deal_in(&stage("Lead", false, false), 10);
        let author = Uuid::new_v4();

        let note = stage_change_note(&deal, author, Some("Lead"), "Won", Utc::now());
        assert_eq!(note.kind, ActivityType::Note);
        assert_eq!(note.deal_id, Some(deal.id));
        assert_eq!(note.client_id, Some(deal.client_id));
        assert_eq!(note.user_id, author);
        assert_eq!(note.content.as_deref(), Some("Etapa alterada: Lead → Won"));

        let orphan = stage_change_note(&deal, author, None, "Won", Utc::now());
        assert_eq!(orphan.content.as_deref(), Some("Etapa alterada: ? → Won"));
    }

    #[test]
    fn board_groups_cards_by_stage_in_order() {
        let first = stage("Lead", false, false);
        let second = stage("Proposta", false, false);
        let card = |stage_id: Uuid, amount: i64| DealCard {
            id: Uuid::new_v4(),
            stage_id,
            title: "x".into(),
            amount: Decimal::new(amount, 0),
            client_id: Uuid::new_v4(),
        };
        let cards = vec![card(second.id, 300), card(first.id, 100), card(second.id, 200)];

        let board = build_board(vec![first.clone(), second.clone()], cards);

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].stage_id, first.id);
        assert_eq!(board[0].deals_count, 1);
        assert_eq!(board[0].total_amount, Decimal::new(100, 0));
        assert_eq!(board[1].deals_count, 2);
        assert_eq!(board[1].total_amount, Decimal::new(500, 0));
    }

    #[test]
    fn stage_from_another_pipeline_is_rejected() {
        let stage = stage("Proposta", false, false);
        assert!(ensure_stage_in_pipeline(&stage, stage.pipeline_id).is_ok());

        let err = ensure_stage_in_pipeline(&stage, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn empty_stage_still_gets_a_column() {
        let board = build_board(vec![stage("Vazia", false, false)], Vec::new());
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].deals_count, 0);
        assert_eq!(board[0].total_amount, Decimal::ZERO);
        assert!(board[0].deals.is_empty());
    }

    // --- Contra o banco ---

    #[sqlx::test]
    async fn sales_scenario_closes_and_logs_every_move(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let manager = test_support::user(&pool, "gerente", Role::Manager).await;
        let sales = test_support::sales_pipeline(&state, admin).await;
        let client = test_support::client(&state, manager, "Acme").await;

        let deals = &state.deal_service;
        let deal = deals
            .create(
                manager,
                &payload(json!({
                    "title": "D",
                    "client_id": client.id,
                    "pipeline_id": sales.pipeline.id,
                    "stage_id": sales.lead.id,
                    "amount": 1000
                })),
            )
            .await
            .unwrap();
        assert_eq!(deal.manager_id, Some(manager.id));
        assert_eq!(deal.status, DealStatus::Open);
        assert_eq!(test_support::activities_for_deal(&pool, deal.id).await, 1);

        let won = deals
            .move_to_stage(manager, deal.id, &payload(json!({ "stage_id": sales.won.id })))
            .await
            .unwrap();
        assert_eq!(won.status, DealStatus::Won);
        assert!(won.closed_at.is_some());
        assert_eq!(test_support::activities_for_deal(&pool, deal.id).await, 2);

        let lost = deals
            .move_to_stage(
                manager,
                deal.id,
                &payload(json!({ "stage_id": sales.lost.id, "reason": "Preço" })),
            )
            .await
            .unwrap();
        assert_eq!(lost.status, DealStatus::Lost);
        assert_eq!(lost.lost_reason.as_deref(), Some("Preço"));
        assert!(lost.closed_at >= won.closed_at);
        assert_eq!(test_support::activities_for_deal(&pool, deal.id).await, 3);

        // Etapa aberta: status não muda, mas a movimentação também é registrada
        let back = deals
            .move_to_stage(manager, deal.id, &payload(json!({ "stage_id": sales.lead.id })))
            .await
            .unwrap();
        assert_eq!(back.status, DealStatus::Lost);
        assert_eq!(back.stage_id, sales.lead.id);
        assert_eq!(test_support::activities_for_deal(&pool, deal.id).await, 4);
    }

    #[sqlx::test]
    async fn create_rejects_unknown_manager(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let sales = test_support::sales_pipeline(&state, admin).await;
        let client = test_support::client(&state, admin, "Acme").await;

        let err = state
            .deal_service
            .create(
                admin,
                &payload(json!({
                    "title": "D",
                    "client_id": client.id,
                    "pipeline_id": sales.pipeline.id,
                    "stage_id": sales.lead.id,
                    "manager_id": Uuid::new_v4()
                })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound("Usuário")));
    }

    #[sqlx::test]
    async fn move_to_stage_of_another_pipeline_is_rejected(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let admin = test_support::user(&pool, "admin", Role::Admin).await;
        let sales = test_support::sales_pipeline(&state, admin).await;
        let other = test_support::sales_pipeline(&state, admin).await;
        let client = test_support::client(&state, admin, "Acme").await;

        let deals = &state.deal_service;
        let deal = deals
            .create(
                admin,
                &payload(json!({
                    "title": "D",
                    "client_id": client.id,
                    "pipeline_id": sales.pipeline.id,
                    "stage_id": sales.lead.id
                })),
            )
            .await
            .unwrap();

        let err = deals
            .move_to_stage(admin, deal.id, &payload(json!({ "stage_id": other.won.id })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = deals
            .update(admin, deal.id, &payload(json!({ "stage_id": other.lead.id })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let unchanged = deals.get(admin, deal.id).await.unwrap();
        assert_eq!(unchanged.stage_id, sales.lead.id);
        assert_eq!(unchanged.status, DealStatus::Open);
        assert_eq!(test_support::activities_for_deal(&pool, deal.id).await, 1);
    }
}
