//! Domain entities.

#![allow(missing_docs)]

pub mod plan;
pub mod restaurant;
pub mod vote;

pub use plan::{
    NewRestaurantOption, Participant, Plan, PlanStatus, RestaurantOption, TimeSlot, VotingResults,
};
pub use restaurant::{CuisineType, DietaryRestriction, Location, PriceLevel, PriceRange, Restaurant};
pub use vote::{Vote, VoteChoice, VoteType};
