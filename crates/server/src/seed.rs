//! Demo catalog data loaded at startup.

use tablemate_common::{AppResult, IdGenerator};
use tablemate_db::entities::{CuisineType, DietaryRestriction, Location, PriceLevel, Restaurant};
use tablemate_db::repositories::RestaurantCatalog;
use tracing::debug;

struct DemoRestaurant {
    name: &'static str,
    description: &'static str,
    address: &'static str,
    latitude: f64,
    longitude: f64,
    cuisines: &'static [CuisineType],
    price_level: PriceLevel,
    rating: f64,
    reviews: u32,
    restrictions: &'static [DietaryRestriction],
    accepts_reservations: bool,
}

const DEMO_RESTAURANTS: &[DemoRestaurant] = &[
    DemoRestaurant {
        name: "Xinyi Dumpling House",
        description: "Soup dumplings and noodles",
        address: "No. 45, Songshou Rd, Xinyi District, Taipei",
        latitude: 25.0360,
        longitude: 121.5668,
        cuisines: &[CuisineType::Taiwanese, CuisineType::Chinese],
        price_level: PriceLevel::MidRange,
        rating: 4.6,
        reviews: 1280,
        restrictions: &[DietaryRestriction::Vegetarian],
        accepts_reservations: true,
    },
    DemoRestaurant {
        name: "Daan Ramen Bar",
        description: "Tonkotsu and shoyu ramen",
        address: "No. 12, Lane 216, Zhongxiao E Rd Sec 4, Da'an District, Taipei",
        latitude: 25.0413,
        longitude: 121.5522,
        cuisines: &[CuisineType::Japanese],
        price_level: PriceLevel::MidRange,
        rating: 4.3,
        reviews: 640,
        restrictions: &[],
        accepts_reservations: false,
    },
    DemoRestaurant {
        name: "Zhongshan Hotpot Hall",
        description: "Mala and herbal broths",
        address: "No. 88, Nanjing W Rd, Zhongshan District, Taipei",
        latitude: 25.0526,
        longitude: 121.5204,
        cuisines: &[CuisineType::Hotpot, CuisineType::Chinese],
        price_level: PriceLevel::Expensive,
        rating: 4.4,
        reviews: 910,
        restrictions: &[DietaryRestriction::Vegetarian, DietaryRestriction::Vegan],
        accepts_reservations: true,
    },
    DemoRestaurant {
        name: "Ximen Night Grill",
        description: "Skewers and grilled seafood",
        address: "No. 3, Emei St, Wanhua District, Taipei",
        latitude: 25.0421,
        longitude: 121.5070,
        cuisines: &[CuisineType::Barbecue, CuisineType::Seafood],
        price_level: PriceLevel::Budget,
        rating: 4.0,
        reviews: 350,
        restrictions: &[DietaryRestriction::GlutenFree],
        accepts_reservations: false,
    },
    DemoRestaurant {
        name: "Songshan Green Table",
        description: "Plant-based set menus",
        address: "No. 20, Minsheng E Rd Sec 5, Songshan District, Taipei",
        latitude: 25.0590,
        longitude: 121.5630,
        cuisines: &[CuisineType::Vegetarian, CuisineType::Western],
        price_level: PriceLevel::MidRange,
        rating: 4.7,
        reviews: 210,
        restrictions: &[
            DietaryRestriction::Vegetarian,
            DietaryRestriction::Vegan,
            DietaryRestriction::DairyFree,
            DietaryRestriction::NutFree,
        ],
        accepts_reservations: true,
    },
    DemoRestaurant {
        name: "Anhe Trattoria",
        description: "Handmade pasta and wood-fired pizza",
        address: "No. 101, Anhe Rd Sec 2, Da'an District, Taipei",
        latitude: 25.0290,
        longitude: 121.5520,
        cuisines: &[CuisineType::Italian, CuisineType::Western],
        price_level: PriceLevel::VeryExpensive,
        rating: 4.8,
        reviews: 480,
        restrictions: &[DietaryRestriction::Vegetarian],
        accepts_reservations: true,
    },
    DemoRestaurant {
        name: "Gongguan Pho Corner",
        description: "Beef pho and banh mi",
        address: "No. 7, Roosevelt Rd Sec 4, Zhongzheng District, Taipei",
        latitude: 25.0145,
        longitude: 121.5340,
        cuisines: &[CuisineType::Vietnamese],
        price_level: PriceLevel::Budget,
        rating: 4.2,
        reviews: 300,
        restrictions: &[DietaryRestriction::DairyFree],
        accepts_reservations: false,
    },
    DemoRestaurant {
        name: "Shida Thai Kitchen",
        description: "Curries and green papaya salad",
        address: "No. 55, Shida Rd, Da'an District, Taipei",
        latitude: 25.0240,
        longitude: 121.5290,
        cuisines: &[CuisineType::Thai],
        price_level: PriceLevel::MidRange,
        rating: 4.1,
        reviews: 190,
        restrictions: &[DietaryRestriction::Halal, DietaryRestriction::GlutenFree],
        accepts_reservations: true,
    },
    DemoRestaurant {
        name: "Yongkang Korean BBQ",
        description: "Charcoal grilled pork belly",
        address: "No. 16, Yongkang St, Da'an District, Taipei",
        latitude: 25.0330,
        longitude: 121.5295,
        cuisines: &[CuisineType::Korean, CuisineType::Barbecue],
        price_level: PriceLevel::Expensive,
        rating: 4.5,
        reviews: 720,
        restrictions: &[],
        accepts_reservations: true,
    },
];

/// Add the demo restaurants to `catalog`. Returns how many were added.
pub async fn seed_catalog(catalog: &dyn RestaurantCatalog) -> AppResult<usize> {
    let id_gen = IdGenerator::new();

    for demo in DEMO_RESTAURANTS {
        let mut restaurant = Restaurant::new(
            id_gen.generate(),
            demo.name,
            demo.description,
            Location {
                latitude: demo.latitude,
                longitude: demo.longitude,
                address: demo.address.to_string(),
            },
            demo.cuisines.to_vec(),
            demo.price_level,
            "02-2345-6789",
        )?;
        restaurant.rating = demo.rating;
        restaurant.total_reviews = demo.reviews;
        restaurant.supported_restrictions = demo.restrictions.to_vec();
        restaurant.accepts_reservations = demo.accepts_reservations;
        restaurant
            .opening_hours
            .extend(["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"]
                .map(|day| (day.to_string(), "11:00-21:30".to_string())));

        let restaurant = catalog.create(restaurant).await?;
        debug!(restaurant_id = %restaurant.id, name = %restaurant.name, "Seeded restaurant");
    }

    Ok(DEMO_RESTAURANTS.len())
}
