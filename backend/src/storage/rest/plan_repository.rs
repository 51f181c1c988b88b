use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::PlanDto;

use super::found;
use crate::domain::mappers::PlanMapper;
use crate::domain::models::plan::{Plan, PlanPayload};
use crate::io::ApiClient;
use crate::storage::PlanStorage;

#[derive(Clone)]
pub struct RestPlanRepository {
    client: Arc<ApiClient>,
}

impl RestPlanRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlanStorage for RestPlanRepository {
    async fn create_plan(&self, plan: &PlanPayload) -> Result<Plan> {
        let dto: PlanDto = self.client.post_json("/planos", &PlanMapper::to_dto(plan)).await?;
        Ok(PlanMapper::from_dto(dto)?)
    }

    async fn update_plan(&self, plan_id: &str, plan: &PlanPayload) -> Result<Plan> {
        let path = format!("/planos/{}", plan_id);
        let mut dto: PlanDto = self.client.put_json(&path, &PlanMapper::to_dto(plan)).await?;
        dto.id.get_or_insert_with(|| plan_id.to_string());
        Ok(PlanMapper::from_dto(dto)?)
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>> {
        let path = format!("/planos/{}", plan_id);
        let dto = found(self.client.get_json::<PlanDto>(&path, &[]).await)?;
        Ok(dto.map(PlanMapper::from_dto).transpose()?)
    }

    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let page = self.client.get_list::<PlanDto>("/planos", &[], "planos").await?;
        let mut plans = page
            .items
            .into_iter()
            .map(PlanMapper::from_dto)
            .collect::<Result<Vec<_>, _>>()?;
        plans.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(plans)
    }
}
