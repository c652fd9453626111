//! Vote store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tablemate_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::entities::Vote;

/// Persistence for votes. At most one vote exists per (plan, user).
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Insert a vote. Fails with `Conflict` if the id or the (plan, user)
    /// pair is taken.
    async fn create(&self, vote: Vote) -> AppResult<Vote>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Vote>>;

    async fn find_by_plan_and_user(&self, plan_id: &str, user_id: &str)
    -> AppResult<Option<Vote>>;

    /// Votes for a plan, oldest first.
    async fn list_by_plan(&self, plan_id: &str) -> AppResult<Vec<Vote>>;

    /// Replace a stored vote, rejecting stale copies with `Conflict`.
    async fn update(&self, vote: Vote) -> AppResult<Vote>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Remove every vote of a plan, returning how many were removed.
    async fn delete_by_plan(&self, plan_id: &str) -> AppResult<usize>;

    /// Get vote by ID, returning error if not found.
    async fn get_by_id(&self, id: &str) -> AppResult<Vote> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vote not found: {id}")))
    }

    /// Get a user's vote on a plan, returning error if not found.
    async fn get_by_plan_and_user(&self, plan_id: &str, user_id: &str) -> AppResult<Vote> {
        self.find_by_plan_and_user(plan_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Vote not found for user {user_id} on plan {plan_id}"))
            })
    }
}

#[derive(Default)]
struct VoteTable {
    votes: HashMap<String, Vote>,
    by_plan_user: HashMap<(String, String), String>,
}

/// Process-local vote store.
#[derive(Clone, Default)]
pub struct InMemoryVoteStore {
    table: Arc<RwLock<VoteTable>>,
}

impl InMemoryVoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored votes.
    pub async fn len(&self) -> usize {
        self.table.read().await.votes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.votes.is_empty()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn create(&self, vote: Vote) -> AppResult<Vote> {
        let mut table = self.table.write().await;
        if table.votes.contains_key(&vote.id) {
            return Err(AppError::Conflict(format!(
                "Vote already exists: {}",
                vote.id
            )));
        }

        let key = (vote.plan_id.clone(), vote.user_id.clone());
        if table.by_plan_user.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "User {} already voted on plan {}",
                vote.user_id, vote.plan_id
            )));
        }

        table.by_plan_user.insert(key, vote.id.clone());
        table.votes.insert(vote.id.clone(), vote.clone());
        Ok(vote)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Vote>> {
        Ok(self.table.read().await.votes.get(id).cloned())
    }

    async fn find_by_plan_and_user(
        &self,
        plan_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Vote>> {
        let table = self.table.read().await;
        Ok(table
            .by_plan_user
            .get(&(plan_id.to_string(), user_id.to_string()))
            .and_then(|id| table.votes.get(id))
            .cloned())
    }

    async fn list_by_plan(&self, plan_id: &str) -> AppResult<Vec<Vote>> {
        let table = self.table.read().await;
        let mut votes: Vec<Vote> = table
            .votes
            .values()
            .filter(|v| v.plan_id == plan_id)
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.voted_at.cmp(&b.voted_at).then_with(|| a.id.cmp(&b.id)));
        Ok(votes)
    }

    async fn update(&self, mut vote: Vote) -> AppResult<Vote> {
        let mut table = self.table.write().await;
        let stored = table
            .votes
            .get_mut(&vote.id)
            .ok_or_else(|| AppError::NotFound(format!("Vote not found: {}", vote.id)))?;

        if stored.plan_id != vote.plan_id || stored.user_id != vote.user_id {
            return Err(AppError::Validation(format!(
                "Vote {} cannot move to another plan or user",
                vote.id
            )));
        }
        if stored.version != vote.version {
            return Err(AppError::Conflict(format!(
                "Vote {} was modified concurrently (expected version {}, found {})",
                vote.id, vote.version, stored.version
            )));
        }

        vote.version += 1;
        *stored = vote.clone();
        Ok(vote)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut table = self.table.write().await;
        let vote = table
            .votes
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Vote not found: {id}")))?;
        table.by_plan_user.remove(&(vote.plan_id, vote.user_id));
        Ok(())
    }

    async fn delete_by_plan(&self, plan_id: &str) -> AppResult<usize> {
        let mut table = self.table.write().await;
        let before = table.votes.len();
        table.votes.retain(|_, v| v.plan_id != plan_id);
        table.by_plan_user.retain(|(plan, _), _| plan != plan_id);
        Ok(before - table.votes.len())
    }
}
