//! Restaurant catalog entity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult, Coordinate};

/// Street location of a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl Location {
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Price band of a restaurant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    #[default]
    Unknown,
    Budget,
    MidRange,
    Expensive,
    VeryExpensive,
}

impl PriceLevel {
    /// Spend per person covered by this level, as `(min, max)`.
    #[must_use]
    pub const fn to_range(&self) -> (i32, i32) {
        match self {
            Self::Budget => (0, 200),
            Self::MidRange => (200, 500),
            Self::Expensive => (500, 1000),
            Self::VeryExpensive => (1000, 2000),
            Self::Unknown => (0, 2000),
        }
    }

    /// Dollar-sign notation.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Budget => "$",
            Self::MidRange => "$$",
            Self::Expensive => "$$$",
            Self::VeryExpensive => "$$$$",
            Self::Unknown => "Unknown",
        }
    }
}

/// Inclusive spend range requested by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: i32,
    pub max_price: i32,
}

impl PriceRange {
    pub fn new(min_price: i32, max_price: i32) -> AppResult<Self> {
        let range = Self {
            min_price,
            max_price,
        };
        range.validate()?;
        Ok(range)
    }

    /// Reject negative or inverted bounds. Deserialized ranges skip `new`.
    pub fn validate(&self) -> AppResult<()> {
        if self.min_price < 0 || self.max_price < self.min_price {
            return Err(AppError::Validation(format!(
                "invalid price range {}..{}",
                self.min_price, self.max_price
            )));
        }
        Ok(())
    }

    /// Width of the range, widened so extreme bounds cannot overflow.
    #[must_use]
    pub fn span(&self) -> i64 {
        i64::from(self.max_price) - i64::from(self.min_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuisineType {
    Taiwanese,
    Chinese,
    Japanese,
    Korean,
    Western,
    Italian,
    Thai,
    Vietnamese,
    Vegetarian,
    Seafood,
    Barbecue,
    Hotpot,
}

impl CuisineType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Taiwanese => "taiwanese",
            Self::Chinese => "chinese",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Western => "western",
            Self::Italian => "italian",
            Self::Thai => "thai",
            Self::Vietnamese => "vietnamese",
            Self::Vegetarian => "vegetarian",
            Self::Seafood => "seafood",
            Self::Barbecue => "barbecue",
            Self::Hotpot => "hotpot",
        }
    }
}

impl fmt::Display for CuisineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    Halal,
    Kosher,
    GlutenFree,
    DairyFree,
    NutFree,
}

/// A catalog restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub cuisine_types: Vec<CuisineType>,
    pub price_level: PriceLevel,
    /// Average rating, 0 until the first review, otherwise 1.0..=5.0.
    pub rating: f64,
    pub total_reviews: u32,
    pub phone_number: String,
    pub website: Option<String>,
    pub image_urls: Vec<String>,
    /// Day name to opening window, e.g. `"monday" -> "09:00-21:00"`.
    pub opening_hours: BTreeMap<String, String>,
    pub supported_restrictions: Vec<DietaryRestriction>,
    /// Minutes.
    pub average_wait_time: u32,
    pub accepts_reservations: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Create an active restaurant with no reviews.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        location: Location,
        cuisine_types: Vec<CuisineType>,
        price_level: PriceLevel,
        phone_number: impl Into<String>,
    ) -> AppResult<Self> {
        let name = name.into();
        let phone_number = phone_number.into();

        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "restaurant name is required".to_string(),
            ));
        }
        if location.address.trim().is_empty() {
            return Err(AppError::Validation(
                "restaurant address is required".to_string(),
            ));
        }
        location.coordinate().validate()?;
        if cuisine_types.is_empty() {
            return Err(AppError::Validation(
                "at least one cuisine type is required".to_string(),
            ));
        }
        if phone_number.trim().is_empty() {
            return Err(AppError::Validation("phone number is required".to_string()));
        }

        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            name,
            description: description.into(),
            location,
            cuisine_types,
            price_level,
            rating: 0.0,
            total_reviews: 0,
            phone_number,
            website: None,
            image_urls: Vec::new(),
            opening_hours: BTreeMap::new(),
            supported_restrictions: Vec::new(),
            average_wait_time: 0,
            accepts_reservations: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Distance to `target` in kilometres.
    #[must_use]
    pub fn distance_to(&self, target: Coordinate) -> f64 {
        self.location.coordinate().distance_to(&target)
    }

    /// True when no preference is given or any cuisine matches.
    #[must_use]
    pub fn matches_cuisine_preferences(&self, preferences: &[CuisineType]) -> bool {
        preferences.is_empty() || preferences.iter().any(|p| self.cuisine_types.contains(p))
    }

    /// True when the restaurant's price band overlaps `range`.
    #[must_use]
    pub fn matches_price_range(&self, range: PriceRange) -> bool {
        let (min, max) = self.price_level.to_range();
        min <= range.max_price && max >= range.min_price
    }

    /// True when every requested restriction is supported.
    #[must_use]
    pub fn supports_dietary_restrictions(&self, restrictions: &[DietaryRestriction]) -> bool {
        restrictions
            .iter()
            .all(|r| self.supported_restrictions.contains(r))
    }

    /// Record a review.
    ///
    /// With `increment_reviews` the rating becomes the running average,
    /// otherwise it is overwritten.
    pub fn update_rating(&mut self, new_rating: f64, increment_reviews: bool) -> AppResult<()> {
        if !(1.0..=5.0).contains(&new_rating) {
            return Err(AppError::Validation(
                "rating must be between 1.0 and 5.0".to_string(),
            ));
        }

        if increment_reviews {
            let total = self.rating * f64::from(self.total_reviews);
            self.total_reviews += 1;
            self.rating = (total + new_rating) / f64::from(self.total_reviews);
        } else {
            self.rating = new_rating;
        }
        self.updated_at = Utc::now();

        Ok(())
    }
}
