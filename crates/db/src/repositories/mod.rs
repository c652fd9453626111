//! Store traits and their in-memory implementations.

#![allow(missing_docs)]

pub mod plan;
pub mod restaurant;
pub mod vote;

pub use plan::{InMemoryPlanStore, PlanStore};
pub use restaurant::{InMemoryRestaurantCatalog, RestaurantCatalog, SearchCriteria, SortBy, SortOrder};
pub use vote::{InMemoryVoteStore, VoteStore};
