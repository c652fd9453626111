//! Test utilities for store-backed code.
//!
//! Provides a fresh set of in-memory stores and fixture builders so service
//! tests can start from a known state.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tablemate_common::{AppError, AppResult};

use crate::Stores;
use crate::entities::{CuisineType, Location, PriceLevel, Restaurant};
use crate::repositories::{InMemoryPlanStore, InMemoryRestaurantCatalog, InMemoryVoteStore};

/// In-memory stores with concrete handles kept for assertions.
#[derive(Clone, Default)]
pub struct TestStores {
    /// Plan store.
    pub plans: InMemoryPlanStore,
    /// Vote store.
    pub votes: InMemoryVoteStore,
    /// Restaurant catalog.
    pub catalog: InMemoryRestaurantCatalog,
}

impl TestStores {
    /// Create empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased handles sharing the same underlying data.
    #[must_use]
    pub fn stores(&self) -> Stores {
        Stores {
            plans: Arc::new(self.plans.clone()),
            votes: Arc::new(self.votes.clone()),
            catalog: Arc::new(self.catalog.clone()),
        }
    }
}

/// A fixed, far-future dinner time so fixtures never depend on the clock.
#[must_use]
pub fn dinner_slot(day_offset: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let base = Utc
        .with_ymd_and_hms(2030, 1, 1, 18, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let start = base + Duration::days(day_offset);
    (start, start + Duration::hours(2))
}

/// Build an active catalog restaurant at the given position.
pub fn restaurant_fixture(
    id: &str,
    name: &str,
    latitude: f64,
    longitude: f64,
    cuisine: CuisineType,
    price_level: PriceLevel,
    rating: f64,
) -> AppResult<Restaurant> {
    let mut restaurant = Restaurant::new(
        id,
        name,
        format!("{name} fixture"),
        Location {
            latitude,
            longitude,
            address: format!("{id} Test Road"),
        },
        vec![cuisine],
        price_level,
        "02-0000-0000",
    )?;
    if !(0.0..=5.0).contains(&rating) {
        return Err(AppError::Validation(format!("fixture rating {rating}")));
    }
    restaurant.rating = rating;
    Ok(restaurant)
}
