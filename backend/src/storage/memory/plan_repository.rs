use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::connection::MemoryConnection;
use crate::domain::models::generate_id;
use crate::domain::models::plan::{Plan, PlanPayload};
use crate::storage::{PlanStorage, StorageError};

#[derive(Clone)]
pub struct MemoryPlanRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryPlanRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

fn to_plan(id: String, payload: &PlanPayload) -> Plan {
    Plan {
        id,
        code: payload.code.clone(),
        name: payload.name.clone(),
        periodicity: payload.periodicity,
        months: payload.months,
        days: payload.days,
        monthly_fee: payload.monthly_fee,
        description: payload.description.clone(),
        status: payload.status,
    }
}

#[async_trait]
impl PlanStorage for MemoryPlanRepository {
    async fn create_plan(&self, plan: &PlanPayload) -> Result<Plan> {
        let mut tables = self.conn.write().await;
        if tables.plans.values().any(|p| p.code == plan.code) {
            return Err(StorageError::Conflict(format!("plan code {} is already in use", plan.code)).into());
        }
        let created = to_plan(generate_id("plano"), plan);
        tables.plans.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_plan(&self, plan_id: &str, plan: &PlanPayload) -> Result<Plan> {
        let mut tables = self.conn.write().await;
        if tables.plans.values().any(|p| p.code == plan.code && p.id != plan_id) {
            return Err(StorageError::Conflict(format!("plan code {} is already in use", plan.code)).into());
        }
        let existing = tables
            .plans
            .get_mut(plan_id)
            .ok_or_else(|| StorageError::NotFound(format!("plan {} not found", plan_id)))?;
        *existing = to_plan(plan_id.to_string(), plan);
        Ok(existing.clone())
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>> {
        Ok(self.conn.read().await.plans.get(plan_id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let tables = self.conn.read().await;
        let mut plans: Vec<Plan> = tables.plans.values().cloned().collect();
        plans.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(plans)
    }
}
