//! Restaurant catalog.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult, Coordinate};
use tokio::sync::RwLock;

use crate::entities::{CuisineType, DietaryRestriction, PriceRange, Restaurant};

/// Field used to order search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Distance,
    Rating,
    /// Lower bound of the price band.
    Price,
    #[default]
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters, ordering and paging for [`RestaurantCatalog::search`].
///
/// Every filter is optional; an empty criteria matches the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub center: Option<Coordinate>,
    /// Ignored unless positive and `center` is set.
    pub radius_km: f64,
    /// Match any.
    pub cuisine_types: Vec<CuisineType>,
    /// Match on band overlap.
    pub price_range: Option<PriceRange>,
    /// Match all.
    pub dietary_restrictions: Vec<DietaryRestriction>,
    /// Ignored unless positive.
    pub min_rating: f64,
    pub accepts_reservations: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// 0 means unlimited.
    pub limit: usize,
    pub offset: usize,
}

impl SearchCriteria {
    /// Whether `restaurant` passes every filter.
    #[must_use]
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if self.is_active.is_some_and(|active| restaurant.is_active != active) {
            return false;
        }
        if let Some(center) = self.center {
            if self.radius_km > 0.0 && restaurant.distance_to(center) > self.radius_km {
                return false;
            }
        }
        if !restaurant.matches_cuisine_preferences(&self.cuisine_types) {
            return false;
        }
        if self
            .price_range
            .is_some_and(|range| !restaurant.matches_price_range(range))
        {
            return false;
        }
        if !restaurant.supports_dietary_restrictions(&self.dietary_restrictions) {
            return false;
        }
        if self.min_rating > 0.0 && restaurant.rating < self.min_rating {
            return false;
        }
        if self
            .accepts_reservations
            .is_some_and(|accepts| restaurant.accepts_reservations != accepts)
        {
            return false;
        }
        true
    }

    fn compare(&self, a: &Restaurant, b: &Restaurant) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::Distance => match self.center {
                Some(center) => a.distance_to(center).total_cmp(&b.distance_to(center)),
                None => Ordering::Equal,
            },
            SortBy::Rating => a.rating.total_cmp(&b.rating),
            SortBy::Price => a.price_level.to_range().0.cmp(&b.price_level.to_range().0),
            SortBy::Name => a.name.cmp(&b.name),
        };

        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Read and write access to the restaurant catalog.
#[async_trait]
pub trait RestaurantCatalog: Send + Sync {
    /// Add a restaurant. Fails with `Conflict` if the id is taken.
    async fn create(&self, restaurant: Restaurant) -> AppResult<Restaurant>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Restaurant>>;

    async fn update(&self, restaurant: Restaurant) -> AppResult<Restaurant>;

    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Active restaurants by name.
    async fn list(&self, limit: usize, offset: usize) -> AppResult<Vec<Restaurant>>;

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<Vec<Restaurant>>;

    /// Get restaurant by ID, returning error if not found.
    async fn get_by_id(&self, id: &str) -> AppResult<Restaurant> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Restaurant not found: {id}")))
    }
}

/// Process-local catalog.
#[derive(Clone, Default)]
pub struct InMemoryRestaurantCatalog {
    restaurants: Arc<RwLock<HashMap<String, Restaurant>>>,
}

impl InMemoryRestaurantCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.restaurants.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.restaurants.read().await.is_empty()
    }
}

fn page<T>(items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    let rest = items.into_iter().skip(offset);
    if limit == 0 {
        rest.collect()
    } else {
        rest.take(limit).collect()
    }
}

#[async_trait]
impl RestaurantCatalog for InMemoryRestaurantCatalog {
    async fn create(&self, restaurant: Restaurant) -> AppResult<Restaurant> {
        let mut restaurants = self.restaurants.write().await;
        if restaurants.contains_key(&restaurant.id) {
            return Err(AppError::Conflict(format!(
                "Restaurant already exists: {}",
                restaurant.id
            )));
        }
        restaurants.insert(restaurant.id.clone(), restaurant.clone());
        Ok(restaurant)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Restaurant>> {
        Ok(self.restaurants.read().await.get(id).cloned())
    }

    async fn update(&self, restaurant: Restaurant) -> AppResult<Restaurant> {
        let mut restaurants = self.restaurants.write().await;
        let stored = restaurants
            .get_mut(&restaurant.id)
            .ok_or_else(|| AppError::NotFound(format!("Restaurant not found: {}", restaurant.id)))?;
        *stored = restaurant.clone();
        Ok(restaurant)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.restaurants
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Restaurant not found: {id}")))
    }

    async fn list(&self, limit: usize, offset: usize) -> AppResult<Vec<Restaurant>> {
        let mut active: Vec<Restaurant> = self
            .restaurants
            .read()
            .await
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(page(active, limit, offset))
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<Vec<Restaurant>> {
        let mut matched: Vec<Restaurant> = self
            .restaurants
            .read()
            .await
            .values()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect();

        // Id order first so equal sort keys come out the same every time.
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        matched.sort_by(|a, b| criteria.compare(a, b));

        Ok(page(matched, criteria.limit, criteria.offset))
    }
}
