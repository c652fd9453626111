//! Recommendation service.
//!
//! Ranks catalog restaurants for a group by a weighted composite of distance,
//! rating, cuisine match, price fit and dietary fit. Scoring is pure; the
//! only I/O is the single catalog search per request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tablemate_common::{
    AppError, AppResult, Coordinate, RecommendationConfig, Timer, centroid, get_metrics,
};
use tablemate_db::entities::{CuisineType, DietaryRestriction, PriceLevel, PriceRange, Restaurant};
use tablemate_db::repositories::{RestaurantCatalog, SearchCriteria, SortBy, SortOrder};
use tracing::{debug, warn};

const DISTANCE_WEIGHT: f64 = 0.40;
const RATING_WEIGHT: f64 = 0.25;
const CUISINE_WEIGHT: f64 = 0.20;
const PRICE_WEIGHT: f64 = 0.10;
const DIETARY_WEIGHT: f64 = 0.05;

/// Score used when the request states no preference for a dimension.
const NEUTRAL_CUISINE_SCORE: f64 = 80.0;
const NEUTRAL_PRICE_SCORE: f64 = 80.0;

/// Input for a recommendation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationRequest {
    pub participant_locations: Vec<Coordinate>,
    pub cuisine_preferences: Vec<CuisineType>,
    pub price_range: Option<PriceRange>,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    /// Search radius in kilometres. Missing or zero uses the configured default.
    pub max_distance_km: Option<f64>,
    /// Missing or zero uses the configured default.
    pub max_results: Option<usize>,
}

/// Per-dimension scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub rating: f64,
    pub cuisine: f64,
    pub price: f64,
    pub dietary: f64,
}

impl ScoreBreakdown {
    /// Weighted sum, clamped to `[0, 100]`.
    #[must_use]
    pub fn composite(&self) -> f64 {
        let total = self.distance * DISTANCE_WEIGHT
            + self.rating * RATING_WEIGHT
            + self.cuisine * CUISINE_WEIGHT
            + self.price * PRICE_WEIGHT
            + self.dietary * DIETARY_WEIGHT;
        total.clamp(0.0, 100.0)
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub restaurant: Restaurant,
    /// Composite score in `[0, 100]`.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Kilometres from the group's meeting point.
    pub distance_from_center: f64,
    /// Mean kilometres over all participants.
    pub average_distance: f64,
    /// Kilometres to the farthest participant.
    pub max_distance: f64,
}

/// Service ranking catalog restaurants for a group.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn RestaurantCatalog>,
    config: RecommendationConfig,
}

impl RecommendationService {
    #[must_use]
    pub const fn new(catalog: Arc<dyn RestaurantCatalog>, config: RecommendationConfig) -> Self {
        Self { catalog, config }
    }

    /// Rank restaurants for the group, best first.
    ///
    /// An empty list is a valid answer when nothing matches the filters.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<Vec<RecommendationResult>> {
        let timer = Timer::start();

        let (radius_km, max_results) = self.resolve_limits(request)?;
        for location in &request.participant_locations {
            location.validate()?;
        }
        if let Some(range) = &request.price_range {
            range.validate()?;
        }
        let center = centroid(&request.participant_locations).ok_or_else(|| {
            AppError::Validation("at least one participant location is required".to_string())
        })?;

        let criteria = SearchCriteria {
            center: Some(center),
            radius_km,
            cuisine_types: request.cuisine_preferences.clone(),
            price_range: request.price_range,
            dietary_restrictions: request.dietary_restrictions.clone(),
            is_active: Some(true),
            sort_by: SortBy::Distance,
            sort_order: SortOrder::Asc,
            limit: max_results.saturating_mul(self.config.over_fetch_factor.max(1)),
            ..SearchCriteria::default()
        };

        let candidates = self.catalog.search(&criteria).await.map_err(|e| {
            warn!(error = %e, "Restaurant catalog search failed");
            AppError::Retrieval(e.to_string())
        })?;
        let candidate_count = candidates.len();

        let mut results: Vec<RecommendationResult> = candidates
            .into_iter()
            .map(|restaurant| score_candidate(restaurant, request, center, radius_km))
            .collect();

        // Stable, so catalog distance order breaks ties.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(max_results);

        get_metrics().record_recommendation(candidate_count, timer.elapsed());
        debug!(
            participants = request.participant_locations.len(),
            radius_km,
            candidates = candidate_count,
            returned = results.len(),
            "Recommendations computed"
        );

        Ok(results)
    }

    fn resolve_limits(&self, request: &RecommendationRequest) -> AppResult<(f64, usize)> {
        let radius_km = match request.max_distance_km {
            Some(r) if r.is_nan() || r < 0.0 => {
                return Err(AppError::Validation(format!(
                    "max distance must not be negative, got {r}"
                )));
            }
            Some(r) if r > 0.0 => r,
            _ => self.config.default_radius_km,
        };

        let max_results = match request.max_results {
            Some(n) if n > 0 => n,
            _ => self.config.default_max_results,
        }
        .min(self.config.max_results_cap.max(1));

        Ok((radius_km, max_results))
    }
}

fn score_candidate(
    restaurant: Restaurant,
    request: &RecommendationRequest,
    center: Coordinate,
    radius_km: f64,
) -> RecommendationResult {
    let distance_from_center = restaurant.distance_to(center);

    let distances: Vec<f64> = request
        .participant_locations
        .iter()
        .map(|p| restaurant.distance_to(*p))
        .collect();
    let average_distance = distances.iter().sum::<f64>() / distances.len().max(1) as f64;
    let max_distance = distances.iter().copied().fold(0.0, f64::max);

    let breakdown = ScoreBreakdown {
        distance: distance_score(average_distance, radius_km),
        rating: rating_score(restaurant.rating),
        cuisine: cuisine_score(&restaurant.cuisine_types, &request.cuisine_preferences),
        price: price_score(restaurant.price_level, request.price_range),
        dietary: dietary_score(
            &restaurant.supported_restrictions,
            &request.dietary_restrictions,
        ),
    };

    RecommendationResult {
        score: breakdown.composite(),
        breakdown,
        restaurant,
        distance_from_center,
        average_distance,
        max_distance,
    }
}

/// 100 at the meeting point, falling linearly to 0 at the radius.
#[must_use]
pub fn distance_score(average_distance_km: f64, radius_km: f64) -> f64 {
    if radius_km <= 0.0 || average_distance_km >= radius_km {
        return 0.0;
    }
    ((1.0 - average_distance_km / radius_km) * 100.0).clamp(0.0, 100.0)
}

#[must_use]
pub fn rating_score(rating: f64) -> f64 {
    (rating.clamp(0.0, 5.0) / 5.0) * 100.0
}

/// Share of preferences the restaurant serves.
#[must_use]
pub fn cuisine_score(cuisines: &[CuisineType], preferences: &[CuisineType]) -> f64 {
    if preferences.is_empty() {
        return NEUTRAL_CUISINE_SCORE;
    }
    let matched = preferences.iter().filter(|p| cuisines.contains(p)).count();
    matched as f64 / preferences.len() as f64 * 100.0
}

/// Overlap of the price band with the requested range, relative to the wider of the two.
#[must_use]
pub fn price_score(level: PriceLevel, range: Option<PriceRange>) -> f64 {
    let Some(range) = range else {
        return NEUTRAL_PRICE_SCORE;
    };

    let (min, max) = level.to_range();
    if min > range.max_price || max < range.min_price {
        return 0.0;
    }

    let overlap = i64::from(max.min(range.max_price)) - i64::from(min.max(range.min_price));
    let band = i64::from(max) - i64::from(min);
    let overlap = overlap as f64;
    let widest = band.max(range.span()) as f64;
    if widest <= 0.0 {
        return 100.0;
    }
    (overlap / widest * 100.0).clamp(0.0, 100.0)
}

/// Full marks only when every restriction is supported; partial support caps at 50.
#[must_use]
pub fn dietary_score(supported: &[DietaryRestriction], requested: &[DietaryRestriction]) -> f64 {
    if requested.is_empty() {
        return 100.0;
    }
    let covered = requested.iter().filter(|r| supported.contains(r)).count();
    if covered == requested.len() {
        100.0
    } else {
        covered as f64 / requested.len() as f64 * 50.0
    }
}
