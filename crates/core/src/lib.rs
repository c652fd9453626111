//! Core business logic for tablemate.
//!
//! Services orchestrate the entities from `tablemate-db`: they validate
//! input, serialize work per plan, persist and project the results.

pub mod services;

pub use services::*;

use tablemate_common::{KeyedLock, RecommendationConfig};
use tablemate_db::Stores;

/// All services wired to one set of stores and one lock registry.
#[derive(Clone)]
pub struct Engine {
    /// Plan lifecycle.
    pub plans: PlanService,
    /// Vote submission.
    pub votes: VoteService,
    /// Restaurant ranking.
    pub recommendations: RecommendationService,
}

impl Engine {
    /// Build the services over `stores`.
    #[must_use]
    pub fn new(stores: &Stores, recommendation: RecommendationConfig) -> Self {
        let locks = KeyedLock::new();
        Self {
            plans: PlanService::new(stores.plans.clone(), stores.votes.clone(), locks.clone()),
            votes: VoteService::new(stores.plans.clone(), stores.votes.clone(), locks),
            recommendations: RecommendationService::new(stores.catalog.clone(), recommendation),
        }
    }
}
