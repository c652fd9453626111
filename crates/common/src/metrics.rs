//! Metrics collection for tablemate.
//!
//! Counts plan lifecycle transitions, vote submissions and recommendation
//! work so operators can see how the engine is used.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics instance.
static METRICS: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Get the global metrics instance.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS.get_or_init(|| Arc::new(Metrics::new()))
}

/// Initialize global metrics with custom instance.
pub fn init_metrics(metrics: Arc<Metrics>) -> Result<(), Arc<Metrics>> {
    METRICS.set(metrics)
}

/// Application metrics collector.
#[derive(Debug)]
pub struct Metrics {
    // === Plan Metrics ===
    /// Plans created
    pub plans_created: AtomicU64,
    /// Plans moved into voting
    pub plans_voting_started: AtomicU64,
    /// Plans confirmed
    pub plans_confirmed: AtomicU64,
    /// Plans cancelled
    pub plans_cancelled: AtomicU64,

    // === Vote Metrics ===
    /// First-time vote submissions
    pub votes_submitted: AtomicU64,
    /// Resubmissions of an existing vote
    pub votes_resubmitted: AtomicU64,
    /// Lost-update attempts rejected by a store
    pub concurrency_conflicts: AtomicU64,
    /// Vote saved while the plan update failed
    pub inconsistent_writes: AtomicU64,

    // === Recommendation Metrics ===
    /// Recommendation requests served
    pub recommendation_requests: AtomicU64,
    /// Catalog candidates scored
    pub candidates_scored: AtomicU64,
    /// Total recommendation time in microseconds
    pub recommendation_time_us_total: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            plans_created: AtomicU64::new(0),
            plans_voting_started: AtomicU64::new(0),
            plans_confirmed: AtomicU64::new(0),
            plans_cancelled: AtomicU64::new(0),

            votes_submitted: AtomicU64::new(0),
            votes_resubmitted: AtomicU64::new(0),
            concurrency_conflicts: AtomicU64::new(0),
            inconsistent_writes: AtomicU64::new(0),

            recommendation_requests: AtomicU64::new(0),
            candidates_scored: AtomicU64::new(0),
            recommendation_time_us_total: AtomicU64::new(0),
        }
    }

    /// Record a vote submission.
    pub fn record_vote(&self, resubmission: bool) {
        if resubmission {
            self.votes_resubmitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.votes_submitted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rejected stale write.
    pub fn record_conflict(&self) {
        self.concurrency_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a vote that was saved without its tally update.
    pub fn record_inconsistent_write(&self) {
        self.inconsistent_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one recommendation request.
    pub fn record_recommendation(&self, candidates: usize, duration: Duration) {
        self.recommendation_requests.fetch_add(1, Ordering::Relaxed);
        self.candidates_scored
            .fetch_add(candidates as u64, Ordering::Relaxed);
        self.recommendation_time_us_total
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_created: self.plans_created.load(Ordering::Relaxed),
            plans_voting_started: self.plans_voting_started.load(Ordering::Relaxed),
            plans_confirmed: self.plans_confirmed.load(Ordering::Relaxed),
            plans_cancelled: self.plans_cancelled.load(Ordering::Relaxed),

            votes_submitted: self.votes_submitted.load(Ordering::Relaxed),
            votes_resubmitted: self.votes_resubmitted.load(Ordering::Relaxed),
            concurrency_conflicts: self.concurrency_conflicts.load(Ordering::Relaxed),
            inconsistent_writes: self.inconsistent_writes.load(Ordering::Relaxed),

            recommendation_requests: self.recommendation_requests.load(Ordering::Relaxed),
            candidates_scored: self.candidates_scored.load(Ordering::Relaxed),
            recommendation_avg_time_us: self.average_recommendation_time_us(),
        }
    }

    /// Calculate average recommendation time.
    fn average_recommendation_time_us(&self) -> u64 {
        let total = self.recommendation_time_us_total.load(Ordering::Relaxed);
        let count = self.recommendation_requests.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Export metrics in Prometheus format.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = String::new();

        output.push_str("# HELP tablemate_plans_total Plan lifecycle transitions\n");
        output.push_str("# TYPE tablemate_plans_total counter\n");
        for (event, value) in [
            ("created", snapshot.plans_created),
            ("voting", snapshot.plans_voting_started),
            ("confirmed", snapshot.plans_confirmed),
            ("cancelled", snapshot.plans_cancelled),
        ] {
            output.push_str(&format!(
                "tablemate_plans_total{{event=\"{event}\"}} {value}\n"
            ));
        }

        output.push_str("# HELP tablemate_votes_total Vote submissions\n");
        output.push_str("# TYPE tablemate_votes_total counter\n");
        output.push_str(&format!(
            "tablemate_votes_total{{kind=\"first\"}} {}\n",
            snapshot.votes_submitted
        ));
        output.push_str(&format!(
            "tablemate_votes_total{{kind=\"resubmission\"}} {}\n",
            snapshot.votes_resubmitted
        ));

        output.push_str("# HELP tablemate_concurrency_conflicts_total Rejected stale writes\n");
        output.push_str("# TYPE tablemate_concurrency_conflicts_total counter\n");
        output.push_str(&format!(
            "tablemate_concurrency_conflicts_total {}\n",
            snapshot.concurrency_conflicts
        ));

        output.push_str(
            "# HELP tablemate_inconsistent_writes_total Votes saved without tally update\n",
        );
        output.push_str("# TYPE tablemate_inconsistent_writes_total counter\n");
        output.push_str(&format!(
            "tablemate_inconsistent_writes_total {}\n",
            snapshot.inconsistent_writes
        ));

        output.push_str("# HELP tablemate_recommendations_total Recommendation requests\n");
        output.push_str("# TYPE tablemate_recommendations_total counter\n");
        output.push_str(&format!(
            "tablemate_recommendations_total {}\n",
            snapshot.recommendation_requests
        ));

        output.push_str("# HELP tablemate_candidates_scored_total Catalog candidates scored\n");
        output.push_str("# TYPE tablemate_candidates_scored_total counter\n");
        output.push_str(&format!(
            "tablemate_candidates_scored_total {}\n",
            snapshot.candidates_scored
        ));

        output.push_str(
            "# HELP tablemate_recommendation_avg_time_us Average recommendation time\n",
        );
        output.push_str("# TYPE tablemate_recommendation_avg_time_us gauge\n");
        output.push_str(&format!(
            "tablemate_recommendation_avg_time_us {}\n",
            snapshot.recommendation_avg_time_us
        ));

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of all metrics at a point in time.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    // Plans
    pub plans_created: u64,
    pub plans_voting_started: u64,
    pub plans_confirmed: u64,
    pub plans_cancelled: u64,

    // Votes
    pub votes_submitted: u64,
    pub votes_resubmitted: u64,
    pub concurrency_conflicts: u64,
    pub inconsistent_writes: u64,

    // Recommendations
    pub recommendation_requests: u64,
    pub candidates_scored: u64,
    pub recommendation_avg_time_us: u64,
}

/// Timer guard for measuring operation duration.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
