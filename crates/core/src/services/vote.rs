//! Vote service.
//!
//! Keeps a participant's vote record and the plan tallies in step for each
//! submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult, IdGenerator, KeyedLock, get_metrics};
use tablemate_db::entities::Vote;
use tablemate_db::repositories::{PlanStore, VoteStore};
use tracing::{info, warn};
use validator::Validate;

use super::note_conflict;

/// Input for submitting or replacing a vote.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteInput {
    pub plan_id: String,
    #[serde(default)]
    pub time_slot_ids: Vec<String>,
    #[serde(default)]
    pub restaurant_ids: Vec<String>,
    #[validate(length(max = 200))]
    pub comment: Option<String>,
}

/// A participant's vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub id: String,
    pub plan_id: String,
    pub user_id: String,
    pub time_slot_ids: Vec<String>,
    pub restaurant_ids: Vec<String>,
    pub comment: Option<String>,
    pub voted_at: DateTime<Utc>,
}

impl VoteResponse {
    #[must_use]
    pub fn from_model(vote: Vote) -> Self {
        Self {
            time_slot_ids: vote.time_choices(),
            restaurant_ids: vote.restaurant_choices(),
            id: vote.id,
            plan_id: vote.plan_id,
            user_id: vote.user_id,
            comment: vote.comment,
            voted_at: vote.voted_at,
        }
    }
}

/// Result of a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteResponse {
    pub vote: VoteResponse,
    /// An earlier vote by the same user was replaced.
    pub resubmitted: bool,
    /// The plan tallies moved. Only a participant's first vote counts.
    pub counted: bool,
}

/// Service coordinating votes with plan tallies.
#[derive(Clone)]
pub struct VoteService {
    plans: Arc<dyn PlanStore>,
    votes: Arc<dyn VoteStore>,
    locks: KeyedLock,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    ///
    /// `locks` must be the same registry the plan service uses.
    #[must_use]
    pub const fn new(plans: Arc<dyn PlanStore>, votes: Arc<dyn VoteStore>, locks: KeyedLock) -> Self {
        Self {
            plans,
            votes,
            locks,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record `user_id`'s vote on a plan, replacing any earlier one.
    ///
    /// Every check runs before the first write. If the vote is saved but the
    /// plan cannot be, the error is [`AppError::Inconsistent`] and the saved
    /// vote is left in place.
    pub async fn submit_vote(
        &self,
        user_id: &str,
        input: SubmitVoteInput,
    ) -> AppResult<SubmitVoteResponse> {
        input.validate()?;

        let _guard = self.locks.lock(&input.plan_id).await;

        let plan = self.plans.get_by_id(&input.plan_id).await?;
        let existing = self
            .votes
            .find_by_plan_and_user(&input.plan_id, user_id)
            .await?;
        let resubmitted = existing.is_some();

        let mut vote = match existing {
            Some(mut vote) => {
                vote.clear_choices();
                vote.refresh_voted_at();
                vote
            }
            None => Vote::new(self.id_gen.generate(), &input.plan_id, user_id)?,
        };

        for slot_id in &input.time_slot_ids {
            vote.add_time_choice(self.id_gen.generate(), slot_id.as_str())?;
        }
        for restaurant_id in &input.restaurant_ids {
            vote.add_restaurant_choice(self.id_gen.generate(), restaurant_id.as_str())?;
        }
        if input.comment.is_some() {
            vote.set_comment(input.comment);
        }
        vote.validate()?;

        let counted = plan
            .participant(user_id)
            .is_some_and(|p| !p.has_voted);
        let mut updated_plan = plan;
        updated_plan.record_vote(user_id, &input.time_slot_ids, &input.restaurant_ids)?;

        let vote = if resubmitted {
            self.votes.update(vote).await
        } else {
            self.votes.create(vote).await
        }
        .map_err(note_conflict)?;

        if let Err(e) = self.plans.update(updated_plan).await {
            get_metrics().record_inconsistent_write();
            warn!(
                plan_id = %input.plan_id,
                user_id = %user_id,
                vote_id = %vote.id,
                error = %e,
                "Vote saved but plan tallies were not updated"
            );
            return Err(AppError::Inconsistent(Box::new(e)));
        }

        get_metrics().record_vote(resubmitted);
        info!(
            plan_id = %input.plan_id,
            user_id = %user_id,
            resubmitted,
            counted,
            "Vote submitted"
        );

        Ok(SubmitVoteResponse {
            vote: VoteResponse::from_model(vote),
            resubmitted,
            counted,
        })
    }

    /// Get `user_id`'s vote on a plan.
    pub async fn get_vote(&self, plan_id: &str, user_id: &str) -> AppResult<VoteResponse> {
        let vote = self.votes.get_by_plan_and_user(plan_id, user_id).await?;
        Ok(VoteResponse::from_model(vote))
    }

    /// All votes on a plan, oldest first.
    pub async fn list_votes(&self, plan_id: &str) -> AppResult<Vec<VoteResponse>> {
        self.plans.get_by_id(plan_id).await?;
        let votes = self.votes.list_by_plan(plan_id).await?;
        Ok(votes.into_iter().map(VoteResponse::from_model).collect())
    }
}
