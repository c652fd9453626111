//! Group dining plan entity.
//!
//! A plan is the root aggregate for one dining proposal. Its status moves
//! `created -> voting -> confirmed` or into `cancelled`; both `confirmed` and
//! `cancelled` are terminal.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult, Coordinate};

/// Display name given to the creator when none is supplied.
pub const DEFAULT_CREATOR_NAME: &str = "Creator";

/// Lifecycle status of a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Owner is still adding options and participants.
    #[default]
    Created,
    /// Participants are voting.
    Voting,
    /// A final slot and restaurant were chosen.
    Confirmed,
    /// Abandoned by the owner.
    Cancelled,
}

impl PlanStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Voting => "voting",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub vote_count: u32,
}

/// A proposed restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantOption {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cuisine_type: String,
    pub vote_count: u32,
}

impl RestaurantOption {
    /// Location of the restaurant.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Fields supplied when proposing a restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurantOption {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cuisine_type: String,
}

/// A user on the plan's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub has_voted: bool,
}

/// Tally summary for a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingResults {
    pub total_participants: usize,
    pub voted_participants: usize,
    /// Percentage of participants who voted, 0 when the roster is empty.
    pub voting_progress: f64,
    pub time_slots: Vec<TimeSlot>,
    pub restaurants: Vec<RestaurantOption>,
    /// Highest-voted slot, first in proposal order on ties. Advisory only.
    pub leading_time_slot_id: Option<String>,
    /// Highest-voted restaurant, first in proposal order on ties. Advisory only.
    pub leading_restaurant_id: Option<String>,
}

/// Group dining plan aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub created_by: String,
    pub title: String,
    pub description: String,
    pub status: PlanStatus,
    pub time_slots: Vec<TimeSlot>,
    pub restaurant_options: Vec<RestaurantOption>,
    /// Creator first, then in join order.
    pub participants: Vec<Participant>,
    /// Snapshot taken at confirmation.
    pub confirmed_time_slot: Option<TimeSlot>,
    /// Snapshot taken at confirmation.
    pub confirmed_restaurant: Option<RestaurantOption>,
    /// Informational; nothing here enforces it.
    pub voting_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every successful update.
    pub version: u64,
}

impl Plan {
    /// Create a plan in `created` status with the creator as first participant.
    pub fn new(
        id: impl Into<String>,
        created_by: impl Into<String>,
        creator_display_name: Option<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        let id = id.into();
        let created_by = created_by.into();
        let title = title.into();

        if id.trim().is_empty() {
            return Err(AppError::Validation("plan ID cannot be empty".to_string()));
        }
        if created_by.trim().is_empty() {
            return Err(AppError::Validation(
                "creator ID cannot be empty".to_string(),
            ));
        }
        if title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }

        let now = Utc::now();
        let mut plan = Self {
            id,
            created_by: created_by.clone(),
            title,
            description: description.into(),
            status: PlanStatus::Created,
            time_slots: Vec::new(),
            restaurant_options: Vec::new(),
            participants: Vec::new(),
            confirmed_time_slot: None,
            confirmed_restaurant: None,
            voting_deadline: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let display_name = creator_display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREATOR_NAME.to_string());
        plan.add_participant(created_by, display_name)?;

        Ok(plan)
    }

    /// Propose a time slot. Only allowed while `created`.
    pub fn add_time_slot(
        &mut self,
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        description: impl Into<String>,
    ) -> AppResult<&TimeSlot> {
        self.ensure_status(PlanStatus::Created, "add time slots")?;

        if start >= end {
            return Err(AppError::Validation(
                "time slot start must be before its end".to_string(),
            ));
        }

        let id = id.into();
        if self.time_slot(&id).is_some() {
            return Err(AppError::Validation(format!(
                "time slot {id} already exists"
            )));
        }

        self.time_slots.push(TimeSlot {
            id,
            start,
            end,
            description: description.into(),
            vote_count: 0,
        });
        self.touch();

        Ok(&self.time_slots[self.time_slots.len() - 1])
    }

    /// Propose a restaurant. Only allowed while `created`.
    pub fn add_restaurant_option(
        &mut self,
        id: impl Into<String>,
        option: NewRestaurantOption,
    ) -> AppResult<&RestaurantOption> {
        self.ensure_status(PlanStatus::Created, "add restaurant options")?;

        if option.name.trim().is_empty() {
            return Err(AppError::Validation(
                "restaurant name cannot be empty".to_string(),
            ));
        }
        Coordinate::new(option.latitude, option.longitude)?;

        let id = id.into();
        if self.restaurant_option(&id).is_some() {
            return Err(AppError::Validation(format!(
                "restaurant option {id} already exists"
            )));
        }

        self.restaurant_options.push(RestaurantOption {
            id,
            name: option.name,
            address: option.address,
            latitude: option.latitude,
            longitude: option.longitude,
            cuisine_type: option.cuisine_type,
            vote_count: 0,
        });
        self.touch();

        Ok(&self.restaurant_options[self.restaurant_options.len() - 1])
    }

    /// Add a user to the roster. Rejects duplicates.
    pub fn add_participant(
        &mut self,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<&Participant> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(AppError::Validation("user ID cannot be empty".to_string()));
        }
        if self.is_participant(&user_id) {
            return Err(AppError::Validation(format!(
                "user {user_id} is already a participant"
            )));
        }

        self.participants.push(Participant {
            user_id,
            display_name: display_name.into(),
            joined_at: Utc::now(),
            has_voted: false,
        });
        self.touch();

        Ok(&self.participants[self.participants.len() - 1])
    }

    /// Open voting.
    ///
    /// Needs at least one slot, one restaurant and one participant besides
    /// the creator. A deadline, if given, must lie in the future.
    pub fn start_voting(&mut self, deadline: Option<DateTime<Utc>>) -> AppResult<()> {
        self.ensure_status(PlanStatus::Created, "start voting")?;

        if self.time_slots.is_empty() {
            return Err(AppError::Validation(
                "cannot start voting without time slots".to_string(),
            ));
        }
        if self.restaurant_options.is_empty() {
            return Err(AppError::Validation(
                "cannot start voting without restaurant options".to_string(),
            ));
        }
        if self.participants.len() <= 1 {
            return Err(AppError::Validation(
                "cannot start voting with fewer than 2 participants".to_string(),
            ));
        }
        if deadline.is_some_and(|deadline| deadline <= Utc::now()) {
            return Err(AppError::Validation(
                "voting deadline must be in the future".to_string(),
            ));
        }

        self.status = PlanStatus::Voting;
        self.voting_deadline = deadline;
        self.touch();

        Ok(())
    }

    /// Apply a participant's vote to the tallies.
    ///
    /// Only a participant's first vote moves the counts: once `has_voted` is
    /// set, later calls leave every tally untouched. Ids that are not among
    /// the plan's own options are ignored.
    ///
    /// Ids are deduplicated per call, so a single ballot adds at most one to
    /// any option. A plain per-occurrence increment would let a direct caller
    /// inflate a count by repeating an id; `VoteService::submit_vote` already
    /// rejects such ballots, so only callers using the aggregate directly see
    /// the difference.
    pub fn record_vote(
        &mut self,
        user_id: &str,
        time_slot_ids: &[String],
        restaurant_ids: &[String],
    ) -> AppResult<()> {
        self.ensure_status(PlanStatus::Voting, "record votes")?;

        let index = self
            .participants
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or_else(|| {
                AppError::Validation(format!("user {user_id} is not a participant in this plan"))
            })?;

        if !self.participants[index].has_voted {
            let slots: HashSet<&str> = time_slot_ids.iter().map(String::as_str).collect();
            for slot in &mut self.time_slots {
                if slots.contains(slot.id.as_str()) {
                    slot.vote_count += 1;
                }
            }

            let restaurants: HashSet<&str> = restaurant_ids.iter().map(String::as_str).collect();
            for option in &mut self.restaurant_options {
                if restaurants.contains(option.id.as_str()) {
                    option.vote_count += 1;
                }
            }
        }

        self.participants[index].has_voted = true;
        self.touch();

        Ok(())
    }

    /// Fix the final slot and restaurant chosen by the caller.
    ///
    /// The choice need not be the highest-voted one.
    pub fn confirm(&mut self, time_slot_id: &str, restaurant_id: &str) -> AppResult<()> {
        self.ensure_status(PlanStatus::Voting, "confirm")?;

        let slot = self
            .time_slot(time_slot_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("time slot {time_slot_id}")))?;
        let restaurant = self
            .restaurant_option(restaurant_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("restaurant option {restaurant_id}")))?;

        self.confirmed_time_slot = Some(slot);
        self.confirmed_restaurant = Some(restaurant);
        self.status = PlanStatus::Confirmed;
        self.touch();

        Ok(())
    }

    /// Cancel the plan. Allowed from every status except `confirmed`.
    pub fn cancel(&mut self) -> AppResult<()> {
        if self.status == PlanStatus::Confirmed {
            return Err(AppError::InvalidStateTransition(
                "cannot cancel a confirmed plan".to_string(),
            ));
        }

        self.status = PlanStatus::Cancelled;
        self.touch();

        Ok(())
    }

    /// Current tallies and participation.
    #[must_use]
    pub fn voting_results(&self) -> VotingResults {
        let total_participants = self.participants.len();
        let voted_participants = self.participants.iter().filter(|p| p.has_voted).count();
        let voting_progress = if total_participants == 0 {
            0.0
        } else {
            voted_participants as f64 / total_participants as f64 * 100.0
        };

        VotingResults {
            total_participants,
            voted_participants,
            voting_progress,
            time_slots: self.time_slots.clone(),
            restaurants: self.restaurant_options.clone(),
            leading_time_slot_id: leader(self.time_slots.iter().map(|s| (&s.id, s.vote_count))),
            leading_restaurant_id: leader(
                self.restaurant_options
                    .iter()
                    .map(|r| (&r.id, r.vote_count)),
            ),
        }
    }

    /// Whether `user_id` created the plan.
    #[must_use]
    pub fn is_creator(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }

    /// Whether `user_id` is on the roster.
    #[must_use]
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participant(user_id).is_some()
    }

    #[must_use]
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    #[must_use]
    pub fn time_slot(&self, id: &str) -> Option<&TimeSlot> {
        self.time_slots.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn restaurant_option(&self, id: &str) -> Option<&RestaurantOption> {
        self.restaurant_options.iter().find(|r| r.id == id)
    }

    fn ensure_status(&self, expected: PlanStatus, action: &str) -> AppResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(AppError::InvalidStateTransition(format!(
                "cannot {action} while plan is {}",
                self.status
            )))
        }
    }

    // updated_at never moves backwards, even if the clock does.
    fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

fn leader<'a>(counts: impl Iterator<Item = (&'a String, u32)>) -> Option<String> {
    let mut best: Option<(&String, u32)> = None;
    for (id, count) in counts {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, _)| id.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn dinner() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2030, 5, 1, 18, 0, 0).unwrap();
        (start, start + Duration::hours(1))
    }

    fn option(name: &str) -> NewRestaurantOption {
        NewRestaurantOption {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            latitude: 25.04,
            longitude: 121.56,
            cuisine_type: "japanese".to_string(),
        }
    }

    fn ready_plan() -> Plan {
        let mut plan = Plan::new("p1", "u1", None, "Friday dinner", "").unwrap();
        let (start, end) = dinner();
        plan.add_time_slot("s1", start, end, "early").unwrap();
        plan.add_time_slot("s2", start + Duration::hours(1), end + Duration::hours(1), "late")
            .unwrap();
        plan.add_restaurant_option("r1", option("A")).unwrap();
        plan.add_restaurant_option("r2", option("B")).unwrap();
        plan.add_participant("u2", "Bob").unwrap();
        plan
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_creator_is_first_participant() {
        let plan = Plan::new("p1", "u1", None, "Lunch", "desc").unwrap();
        assert_eq!(plan.status, PlanStatus::Created);
        assert_eq!(plan.participants.len(), 1);
        assert_eq!(plan.participants[0].user_id, "u1");
        assert_eq!(plan.participants[0].display_name, DEFAULT_CREATOR_NAME);
        assert!(plan.is_creator("u1"));
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        assert!(matches!(
            Plan::new("p1", "", None, "Lunch", ""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            Plan::new("p1", "u1", None, "  ", ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_time_slot_requires_start_before_end() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        let (start, _) = dinner();
        assert!(matches!(
            plan.add_time_slot("s1", start, start, ""),
            Err(AppError::Validation(_))
        ));
        assert!(plan.time_slots.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut plan = ready_plan();
        let (start, end) = dinner();
        assert!(plan.add_time_slot("s1", start, end, "").is_err());
        assert!(plan.add_restaurant_option("r1", option("C")).is_err());
        assert!(plan.add_participant("u2", "Bob again").is_err());
    }

    #[test]
    fn test_restaurant_option_validates_coordinates() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        let mut bad = option("Far away");
        bad.latitude = 123.0;
        assert!(matches!(
            plan.add_restaurant_option("r1", bad),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_add_time_slot_after_start_voting_fails() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();

        let (start, end) = dinner();
        assert!(matches!(
            plan.add_time_slot("s3", start, end, ""),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert!(matches!(
            plan.add_restaurant_option("r3", option("C")),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_start_voting_requires_restaurant_option() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        let (start, end) = dinner();
        plan.add_time_slot("s1", start, end, "").unwrap();
        plan.add_participant("u2", "Bob").unwrap();

        assert!(matches!(
            plan.start_voting(None),
            Err(AppError::Validation(_))
        ));
        assert_eq!(plan.status, PlanStatus::Created);
    }

    #[test]
    fn test_start_voting_requires_second_participant() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        let (start, end) = dinner();
        plan.add_time_slot("s1", start, end, "").unwrap();
        plan.add_restaurant_option("r1", option("A")).unwrap();

        assert!(matches!(
            plan.start_voting(None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_start_voting_with_minimum_content() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        let (start, end) = dinner();
        plan.add_time_slot("s1", start, end, "").unwrap();
        plan.add_restaurant_option("r1", option("A")).unwrap();
        plan.add_participant("u2", "Bob").unwrap();

        let deadline = Utc::now() + Duration::days(1);
        plan.start_voting(Some(deadline)).unwrap();
        assert_eq!(plan.status, PlanStatus::Voting);
        assert_eq!(plan.voting_deadline, Some(deadline));

        assert!(matches!(
            plan.start_voting(None),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_start_voting_rejects_past_deadline() {
        let mut plan = ready_plan();
        let past = Utc::now() - Duration::minutes(5);
        assert!(matches!(
            plan.start_voting(Some(past)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_record_vote_requires_voting_and_membership() {
        let mut plan = ready_plan();
        assert!(matches!(
            plan.record_vote("u1", &ids(&["s1"]), &ids(&["r1"])),
            Err(AppError::InvalidStateTransition(_))
        ));

        plan.start_voting(None).unwrap();
        assert!(matches!(
            plan.record_vote("stranger", &ids(&["s1"]), &ids(&["r1"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_only_first_vote_moves_tallies() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();

        plan.record_vote("u1", &ids(&["s1"]), &ids(&["r1"])).unwrap();
        assert_eq!(plan.time_slot("s1").unwrap().vote_count, 1);

        // Second submission switches to s2 but the tallies stay as they were.
        plan.record_vote("u1", &ids(&["s2"]), &ids(&["r2"])).unwrap();
        assert_eq!(plan.time_slot("s1").unwrap().vote_count, 1);
        assert_eq!(plan.time_slot("s2").unwrap().vote_count, 0);
        assert_eq!(plan.restaurant_option("r2").unwrap().vote_count, 0);
        assert!(plan.participant("u1").unwrap().has_voted);
    }

    #[test]
    fn test_record_vote_ignores_unknown_and_repeated_ids() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();

        plan.record_vote("u2", &ids(&["s1", "s1", "nope"]), &ids(&["r1"]))
            .unwrap();
        assert_eq!(plan.time_slot("s1").unwrap().vote_count, 1);
        assert_eq!(plan.time_slot("s2").unwrap().vote_count, 0);
    }

    #[test]
    fn test_confirm_requires_known_ids() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();

        assert!(matches!(
            plan.confirm("missing", "r1"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            plan.confirm("s1", "missing"),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(plan.status, PlanStatus::Voting);
        assert!(plan.confirmed_time_slot.is_none());
    }

    #[test]
    fn test_confirm_takes_snapshots() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();
        plan.record_vote("u2", &ids(&["s2"]), &ids(&["r2"])).unwrap();

        // Caller may pick an option other than the leader.
        plan.confirm("s1", "r1").unwrap();
        assert_eq!(plan.status, PlanStatus::Confirmed);
        assert_eq!(plan.confirmed_time_slot.as_ref().unwrap().id, "s1");
        assert_eq!(plan.confirmed_restaurant.as_ref().unwrap().name, "A");

        assert!(matches!(
            plan.confirm("s1", "r1"),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_confirm_outside_voting_fails() {
        let mut plan = ready_plan();
        assert!(matches!(
            plan.confirm("s1", "r1"),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_cancel_rules() {
        let mut created = ready_plan();
        created.cancel().unwrap();
        assert_eq!(created.status, PlanStatus::Cancelled);
        assert!(created.status.is_terminal());

        let mut voting = ready_plan();
        voting.start_voting(None).unwrap();
        voting.cancel().unwrap();
        assert!(voting.start_voting(None).is_err());

        let mut confirmed = ready_plan();
        confirmed.start_voting(None).unwrap();
        confirmed.confirm("s1", "r1").unwrap();
        assert!(matches!(
            confirmed.cancel(),
            Err(AppError::InvalidStateTransition(_))
        ));
        assert_eq!(confirmed.status, PlanStatus::Confirmed);
    }

    #[test]
    fn test_voting_results() {
        let mut plan = ready_plan();
        plan.start_voting(None).unwrap();
        plan.record_vote("u1", &ids(&["s2"]), &ids(&["r1"])).unwrap();

        let results = plan.voting_results();
        assert_eq!(results.total_participants, 2);
        assert_eq!(results.voted_participants, 1);
        assert_eq!(results.voting_progress, 50.0);
        assert_eq!(results.leading_time_slot_id.as_deref(), Some("s2"));
        assert_eq!(results.leading_restaurant_id.as_deref(), Some("r1"));

        // Reading twice without mutation yields identical values.
        assert_eq!(results, plan.voting_results());
    }

    #[test]
    fn test_voting_results_with_empty_roster() {
        let mut plan = Plan::new("p1", "u1", None, "Lunch", "").unwrap();
        plan.participants.clear();

        let results = plan.voting_results();
        assert_eq!(results.total_participants, 0);
        assert_eq!(results.voting_progress, 0.0);
        assert!(results.leading_time_slot_id.is_none());
    }

    #[test]
    fn test_updated_at_is_monotonic() {
        let mut plan = ready_plan();
        let before = plan.updated_at;
        plan.start_voting(None).unwrap();
        assert!(plan.updated_at >= before);
        assert!(plan.updated_at >= plan.created_at);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&PlanStatus::Voting).unwrap();
        assert_eq!(json, "\"voting\"");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut plan = ready_plan();
        plan.start_voting(Some(Utc::now() + Duration::days(2))).unwrap();
        plan.record_vote("u1", &ids(&["s1"]), &ids(&["r2"])).unwrap();
        plan.record_vote("u2", &ids(&["s1"]), &ids(&["r1"])).unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let restored: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, plan);
        assert_eq!(restored.status, PlanStatus::Voting);

        plan.confirm("s1", "r1").unwrap();
        plan.version = 4;
        let value = serde_json::to_value(&plan).unwrap();
        assert!(value["confirmedTimeSlot"].is_object());
        assert!(value["votingDeadline"].is_string());

        let restored: Plan = serde_json::from_value(value).unwrap();
        assert_eq!(restored, plan);
        assert_eq!(restored.confirmed_restaurant.map(|r| r.vote_count), Some(1));
    }
}
