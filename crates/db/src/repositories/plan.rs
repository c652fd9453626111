//! Plan store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tablemate_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::entities::Plan;

/// Persistence for plans.
///
/// `update` is a compare-and-swap on [`Plan::version`]: the caller's copy
/// must carry the stored version, and the stored version is bumped on success.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert a new plan. Fails with `Conflict` if the id is taken.
    async fn create(&self, plan: Plan) -> AppResult<Plan>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Plan>>;

    /// Replace a stored plan, rejecting stale copies with `Conflict`.
    async fn update(&self, plan: Plan) -> AppResult<Plan>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Plans created by `user_id`, newest first.
    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Plan>>;

    /// Plans with `user_id` on the roster, newest first.
    async fn list_by_participant(&self, user_id: &str) -> AppResult<Vec<Plan>>;

    /// Get plan by ID, returning error if not found.
    async fn get_by_id(&self, id: &str) -> AppResult<Plan> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Plan not found: {id}")))
    }
}

/// Process-local plan store.
#[derive(Clone, Default)]
pub struct InMemoryPlanStore {
    plans: Arc<RwLock<HashMap<String, Plan>>>,
}

impl InMemoryPlanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans.
    pub async fn len(&self) -> usize {
        self.plans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.read().await.is_empty()
    }

    async fn collect_where(&self, keep: impl Fn(&Plan) -> bool + Send) -> Vec<Plan> {
        let plans = self.plans.read().await;
        let mut matched: Vec<Plan> = plans.values().filter(|p| keep(p)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        matched
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn create(&self, plan: Plan) -> AppResult<Plan> {
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            return Err(AppError::Conflict(format!(
                "Plan already exists: {}",
                plan.id
            )));
        }
        plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Plan>> {
        Ok(self.plans.read().await.get(id).cloned())
    }

    async fn update(&self, mut plan: Plan) -> AppResult<Plan> {
        let mut plans = self.plans.write().await;
        let stored = plans
            .get_mut(&plan.id)
            .ok_or_else(|| AppError::NotFound(format!("Plan not found: {}", plan.id)))?;

        if stored.version != plan.version {
            return Err(AppError::Conflict(format!(
                "Plan {} was modified concurrently (expected version {}, found {})",
                plan.id, plan.version, stored.version
            )));
        }

        plan.version += 1;
        *stored = plan.clone();
        Ok(plan)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.plans
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Plan not found: {id}")))
    }

    async fn list_by_creator(&self, user_id: &str) -> AppResult<Vec<Plan>> {
        Ok(self.collect_where(|p| p.is_creator(user_id)).await)
    }

    async fn list_by_participant(&self, user_id: &str) -> AppResult<Vec<Plan>> {
        Ok(self.collect_where(|p| p.is_participant(user_id)).await)
    }
}
