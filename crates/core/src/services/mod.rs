//! Business logic services.

#![allow(missing_docs)]

pub mod plan;
pub mod recommendation;
pub mod vote;

pub use plan::{
    AddRestaurantOptionInput, AddTimeSlotInput, CreatePlanInput, FinalizePlanInput, JoinPlanInput,
    PlanResponse, PlanService, StartVotingInput, VotingResultsResponse,
};
pub use recommendation::{
    RecommendationRequest, RecommendationResult, RecommendationService, ScoreBreakdown,
};
pub use vote::{SubmitVoteInput, SubmitVoteResponse, VoteResponse, VoteService};

use tablemate_common::{AppError, get_metrics};

/// Count and log a lost-update rejection before passing the error on.
pub(crate) fn note_conflict(err: AppError) -> AppError {
    if let AppError::Conflict(reason) = &err {
        get_metrics().record_conflict();
        tracing::warn!(%reason, "Concurrent modification rejected");
    }
    err
}
