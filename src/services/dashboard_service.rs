// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        activity::Activity,
        auth::Caller,
        dashboard::{DashboardStats, SalesChartEntry, StageSnapshot},
    },
    services::access,
};

const DEFAULT_RECENT_LIMIT: i64 = 10;
const MAX_RECENT_LIMIT: i64 = 100;
const DEFAULT_CHART_DAYS: i32 = 30;
const MAX_CHART_DAYS: i32 = 365;

fn recent_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_RECENT_LIMIT)
}

fn chart_days(requested: Option<i32>) -> i32 {
    requested.unwrap_or(DEFAULT_CHART_DAYS).clamp(1, MAX_CHART_DAYS)
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn stats(&self, caller: Caller) -> Result<DashboardStats, AppError> {
        self.repo.stats(access::scope(caller).owner_filter()).await
    }

    pub async fn recent_activities(
        &self,
        caller: Caller,
        limit: Option<i64>,
    ) -> Result<Vec<Activity>, AppError> {
        self.repo
            .recent_activities(access::scope(caller).owner_filter(), recent_limit(limit))
            .await
    }

    pub async fn sales_chart(
        &self,
        caller: Caller,
        days: Option<i32>,
    ) -> Result<Vec<SalesChartEntry>, AppError> {
        self.repo
            .sales_chart(access::scope(caller).owner_filter(), chart_days(days))
            .await
    }

    pub async fn pipeline_snapshot(&self, caller: Caller) -> Result<Vec<StageSnapshot>, AppError> {
        self.repo.pipeline_snapshot(access::scope(caller).owner_filter()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_windows_have_defaults_and_bounds() {
        assert_eq!(recent_limit(None), 10);
        assert_eq!(recent_limit(Some(0)), 1);
        assert_eq!(recent_limit(Some(1_000)), 100);

        assert_eq!(chart_days(None), 30);
        assert_eq!(chart_days(Some(-7)), 1);
        assert_eq!(chart_days(Some(90)), 90);
    }
}
