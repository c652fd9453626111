//! Storage layer for tablemate.
//!
//! Entities carry their own invariants; stores only persist them. All stores
//! are async traits so a durable backend can replace the in-memory ones
//! without touching the services.

pub mod entities;
pub mod repositories;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use repositories::{
    InMemoryPlanStore, InMemoryRestaurantCatalog, InMemoryVoteStore, PlanStore,
    RestaurantCatalog, VoteStore,
};

/// The set of stores a running engine uses.
#[derive(Clone)]
pub struct Stores {
    /// Plan persistence.
    pub plans: Arc<dyn PlanStore>,
    /// Vote persistence.
    pub votes: Arc<dyn VoteStore>,
    /// Restaurant catalog.
    pub catalog: Arc<dyn RestaurantCatalog>,
}

/// Initialize process-local stores.
#[must_use]
pub fn init_in_memory() -> Stores {
    tracing::debug!("Using in-memory stores");
    Stores {
        plans: Arc::new(InMemoryPlanStore::new()),
        votes: Arc::new(InMemoryVoteStore::new()),
        catalog: Arc::new(InMemoryRestaurantCatalog::new()),
    }
}
