//! Common utilities and shared types for tablemate.
//!
//! This crate provides foundational components used across all tablemate crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Geo**: Coordinates, Haversine distance and centroids via [`geo`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Locking**: Per-key async mutual exclusion via [`KeyedLock`]
//! - **Metrics**: Usage counters via [`Metrics`]
//!
//! # Example
//!
//! ```no_run
//! use tablemate_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {id}, radius {}", config.recommendation.default_radius_km);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod id;
pub mod lock;
pub mod metrics;

pub use config::{Config, LoggingConfig, RecommendationConfig, SeedConfig};
pub use error::{AppError, AppResult};
pub use geo::{Coordinate, centroid, haversine_km};
pub use id::IdGenerator;
pub use lock::{KeyGuard, KeyedLock};
pub use metrics::{Metrics, MetricsSnapshot, Timer, get_metrics};
