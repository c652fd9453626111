//! Plan service.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult, IdGenerator, KeyedLock, get_metrics};
use tablemate_db::entities::{
    NewRestaurantOption, Participant, Plan, PlanStatus, RestaurantOption, TimeSlot, VotingResults,
};
use tablemate_db::repositories::{PlanStore, VoteStore};
use tracing::{debug, info};
use validator::Validate;

use super::note_conflict;
use super::recommendation::RecommendationResult;

/// Input for creating a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub creator_display_name: Option<String>,
}

/// Input for proposing a time slot.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddTimeSlotInput {
    pub plan_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

/// Input for proposing a restaurant.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddRestaurantOptionInput {
    pub plan_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 50))]
    pub cuisine_type: Option<String>,
}

/// Input for joining a plan.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinPlanInput {
    pub plan_id: String,
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
}

/// Input for opening voting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVotingInput {
    pub plan_id: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for fixing the final choice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePlanInput {
    pub plan_id: String,
    pub time_slot_id: String,
    pub restaurant_id: String,
}

/// Plan as seen by one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: String,
    pub created_by: String,
    pub title: String,
    pub description: String,
    pub status: PlanStatus,
    pub time_slots: Vec<TimeSlot>,
    pub restaurant_options: Vec<RestaurantOption>,
    pub participants: Vec<Participant>,
    pub confirmed_time_slot: Option<TimeSlot>,
    pub confirmed_restaurant: Option<RestaurantOption>,
    pub voting_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_creator: bool,
    pub is_participant: bool,
    pub has_voted: bool,
}

impl PlanResponse {
    /// Project a plan for `viewer`. Without a viewer the per-user flags are false.
    #[must_use]
    pub fn from_model(plan: Plan, viewer: Option<&str>) -> Self {
        let is_creator = viewer.is_some_and(|v| plan.is_creator(v));
        let participant = viewer.and_then(|v| plan.participant(v));
        let is_participant = participant.is_some();
        let has_voted = participant.is_some_and(|p| p.has_voted);

        Self {
            id: plan.id,
            created_by: plan.created_by,
            title: plan.title,
            description: plan.description,
            status: plan.status,
            time_slots: plan.time_slots,
            restaurant_options: plan.restaurant_options,
            participants: plan.participants,
            confirmed_time_slot: plan.confirmed_time_slot,
            confirmed_restaurant: plan.confirmed_restaurant,
            voting_deadline: plan.voting_deadline,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            is_creator,
            is_participant,
            has_voted,
        }
    }
}

/// Current tallies of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingResultsResponse {
    pub plan_id: String,
    pub status: PlanStatus,
    #[serde(flatten)]
    pub results: VotingResults,
}

/// Service for the plan lifecycle.
#[derive(Clone)]
pub struct PlanService {
    plans: Arc<dyn PlanStore>,
    votes: Arc<dyn VoteStore>,
    locks: KeyedLock,
    id_gen: IdGenerator,
}

impl PlanService {
    /// Create a new plan service.
    ///
    /// `locks` must be shared with every other service that mutates plans.
    #[must_use]
    pub const fn new(plans: Arc<dyn PlanStore>, votes: Arc<dyn VoteStore>, locks: KeyedLock) -> Self {
        Self {
            plans,
            votes,
            locks,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a plan owned by `creator_id`.
    pub async fn create_plan(
        &self,
        creator_id: &str,
        input: CreatePlanInput,
    ) -> AppResult<PlanResponse> {
        input.validate()?;

        let plan = Plan::new(
            self.id_gen.generate(),
            creator_id,
            input.creator_display_name,
            input.title,
            input.description.unwrap_or_default(),
        )?;
        let plan = self.plans.create(plan).await?;

        get_metrics().plans_created.fetch_add(1, Ordering::Relaxed);
        info!(plan_id = %plan.id, user_id = %creator_id, "Plan created");

        Ok(PlanResponse::from_model(plan, Some(creator_id)))
    }

    /// Propose a time slot. Owner only.
    pub async fn add_time_slot(&self, actor: &str, input: AddTimeSlotInput) -> AppResult<TimeSlot> {
        input.validate()?;

        let slot_id = self.id_gen.generate();
        let (_, slot) = self
            .mutate(&input.plan_id, |plan| {
                ensure_creator(plan, actor, "add time slots")?;
                plan.add_time_slot(
                    slot_id,
                    input.start,
                    input.end,
                    input.description.unwrap_or_default(),
                )
                .cloned()
            })
            .await?;

        debug!(plan_id = %input.plan_id, slot_id = %slot.id, "Time slot added");
        Ok(slot)
    }

    /// Propose a restaurant. Owner only.
    pub async fn add_restaurant_option(
        &self,
        actor: &str,
        input: AddRestaurantOptionInput,
    ) -> AppResult<RestaurantOption> {
        input.validate()?;

        let option = NewRestaurantOption {
            name: input.name,
            address: input.address.unwrap_or_default(),
            latitude: input.latitude,
            longitude: input.longitude,
            cuisine_type: input.cuisine_type.unwrap_or_default(),
        };
        self.push_restaurant_option(actor, &input.plan_id, option).await
    }

    /// Turn a recommendation into a restaurant option. Owner only.
    pub async fn add_restaurant_from_recommendation(
        &self,
        actor: &str,
        plan_id: &str,
        recommendation: &RecommendationResult,
    ) -> AppResult<RestaurantOption> {
        let restaurant = &recommendation.restaurant;
        let option = NewRestaurantOption {
            name: restaurant.name.clone(),
            address: restaurant.location.address.clone(),
            latitude: restaurant.location.latitude,
            longitude: restaurant.location.longitude,
            cuisine_type: restaurant
                .cuisine_types
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };
        self.push_restaurant_option(actor, plan_id, option).await
    }

    async fn push_restaurant_option(
        &self,
        actor: &str,
        plan_id: &str,
        option: NewRestaurantOption,
    ) -> AppResult<RestaurantOption> {
        let option_id = self.id_gen.generate();
        let (_, added) = self
            .mutate(plan_id, |plan| {
                ensure_creator(plan, actor, "add restaurant options")?;
                plan.add_restaurant_option(option_id, option).cloned()
            })
            .await?;

        debug!(plan_id = %plan_id, option_id = %added.id, name = %added.name, "Restaurant option added");
        Ok(added)
    }

    /// Add `user_id` to the roster.
    pub async fn join_plan(&self, user_id: &str, input: JoinPlanInput) -> AppResult<PlanResponse> {
        input.validate()?;

        let (plan, ()) = self
            .mutate(&input.plan_id, |plan| {
                plan.add_participant(user_id, input.display_name)?;
                Ok(())
            })
            .await?;

        info!(plan_id = %plan.id, user_id = %user_id, "Participant joined");
        Ok(PlanResponse::from_model(plan, Some(user_id)))
    }

    /// Open voting. Owner only.
    pub async fn start_voting(
        &self,
        actor: &str,
        input: StartVotingInput,
    ) -> AppResult<PlanResponse> {
        let (plan, ()) = self
            .mutate(&input.plan_id, |plan| {
                ensure_creator(plan, actor, "start voting")?;
                plan.start_voting(input.deadline)
            })
            .await?;

        get_metrics()
            .plans_voting_started
            .fetch_add(1, Ordering::Relaxed);
        info!(plan_id = %plan.id, participants = plan.participants.len(), "Voting started");

        Ok(PlanResponse::from_model(plan, Some(actor)))
    }

    /// Confirm the slot and restaurant chosen by the owner.
    ///
    /// The choice is not required to match the current leaders.
    pub async fn finalize_plan(
        &self,
        actor: &str,
        input: FinalizePlanInput,
    ) -> AppResult<PlanResponse> {
        let (plan, ()) = self
            .mutate(&input.plan_id, |plan| {
                ensure_creator(plan, actor, "finalize the plan")?;
                plan.confirm(&input.time_slot_id, &input.restaurant_id)
            })
            .await?;

        get_metrics().plans_confirmed.fetch_add(1, Ordering::Relaxed);
        info!(
            plan_id = %plan.id,
            time_slot_id = %input.time_slot_id,
            restaurant_id = %input.restaurant_id,
            "Plan confirmed"
        );

        Ok(PlanResponse::from_model(plan, Some(actor)))
    }

    /// Cancel a plan that is not yet confirmed. Owner only.
    pub async fn cancel_plan(&self, actor: &str, plan_id: &str) -> AppResult<PlanResponse> {
        let (plan, was_cancelled) = self
            .mutate(plan_id, |plan| {
                ensure_creator(plan, actor, "cancel the plan")?;
                let was_cancelled = plan.status == PlanStatus::Cancelled;
                plan.cancel()?;
                Ok(was_cancelled)
            })
            .await?;

        if !was_cancelled {
            get_metrics().plans_cancelled.fetch_add(1, Ordering::Relaxed);
            info!(plan_id = %plan.id, "Plan cancelled");
        }

        Ok(PlanResponse::from_model(plan, Some(actor)))
    }

    /// Remove a plan and all of its votes. Owner only.
    pub async fn delete_plan(&self, actor: &str, plan_id: &str) -> AppResult<()> {
        let _guard = self.locks.lock(plan_id).await;

        let plan = self.plans.get_by_id(plan_id).await?;
        ensure_creator(&plan, actor, "delete the plan")?;

        let removed_votes = self.votes.delete_by_plan(plan_id).await?;
        self.plans.delete(plan_id).await?;

        info!(plan_id = %plan_id, removed_votes, "Plan deleted");
        Ok(())
    }

    /// Get a plan as seen by `viewer`.
    pub async fn get_plan(&self, plan_id: &str, viewer: Option<&str>) -> AppResult<PlanResponse> {
        let plan = self.plans.get_by_id(plan_id).await?;
        Ok(PlanResponse::from_model(plan, viewer))
    }

    /// Plans created by `user_id`, newest first.
    pub async fn list_plans_by_creator(&self, user_id: &str) -> AppResult<Vec<PlanResponse>> {
        let plans = self.plans.list_by_creator(user_id).await?;
        Ok(plans
            .into_iter()
            .map(|p| PlanResponse::from_model(p, Some(user_id)))
            .collect())
    }

    /// Plans `user_id` takes part in, newest first.
    pub async fn list_plans_by_participant(&self, user_id: &str) -> AppResult<Vec<PlanResponse>> {
        let plans = self.plans.list_by_participant(user_id).await?;
        Ok(plans
            .into_iter()
            .map(|p| PlanResponse::from_model(p, Some(user_id)))
            .collect())
    }

    /// Current tallies.
    pub async fn get_voting_results(&self, plan_id: &str) -> AppResult<VotingResultsResponse> {
        let plan = self.plans.get_by_id(plan_id).await?;
        Ok(VotingResultsResponse {
            plan_id: plan.id.clone(),
            status: plan.status,
            results: plan.voting_results(),
        })
    }

    /// Load, change and store a plan while holding its lock.
    ///
    /// Nothing is written if `apply` fails.
    async fn mutate<R, F>(&self, plan_id: &str, apply: F) -> AppResult<(Plan, R)>
    where
        F: FnOnce(&mut Plan) -> AppResult<R> + Send,
        R: Send,
    {
        let _guard = self.locks.lock(plan_id).await;

        let mut plan = self.plans.get_by_id(plan_id).await?;
        let outcome = apply(&mut plan)?;
        let plan = self.plans.update(plan).await.map_err(note_conflict)?;

        Ok((plan, outcome))
    }
}

fn ensure_creator(plan: &Plan, actor: &str, action: &str) -> AppResult<()> {
    if plan.is_creator(actor) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "only the plan creator can {action}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tablemate_db::test_utils::{TestStores, dinner_slot};

    fn service(stores: &TestStores) -> PlanService {
        let handles = stores.stores();
        PlanService::new(handles.plans, handles.votes, KeyedLock::new())
    }

    fn create_input(title: &str) -> CreatePlanInput {
        CreatePlanInput {
            title: title.to_string(),
            description: None,
            creator_display_name: Some("Alice".to_string()),
        }
    }

    fn option_input(plan_id: &str, name: &str) -> AddRestaurantOptionInput {
        AddRestaurantOptionInput {
            plan_id: plan_id.to_string(),
            name: name.to_string(),
            address: Some("Xinyi Rd".to_string()),
            latitude: 25.033,
            longitude: 121.565,
            cuisine_type: Some("taiwanese".to_string()),
        }
    }

    async fn ready(service: &PlanService) -> (String, TimeSlot, RestaurantOption) {
        let plan = service.create_plan("u1", create_input("Dinner")).await.unwrap();
        let (start, end) = dinner_slot(0);
        let slot = service
            .add_time_slot(
                "u1",
                AddTimeSlotInput {
                    plan_id: plan.id.clone(),
                    start,
                    end,
                    description: None,
                },
            )
            .await
            .unwrap();
        let option = service
            .add_restaurant_option("u1", option_input(&plan.id, "A"))
            .await
            .unwrap();
        service
            .join_plan(
                "u2",
                JoinPlanInput {
                    plan_id: plan.id.clone(),
                    display_name: "Bob".to_string(),
                },
            )
            .await
            .unwrap();
        (plan.id, slot, option)
    }

    #[tokio::test]
    async fn test_create_plan() {
        let stores = TestStores::new();
        let service = service(&stores);

        let plan = service.create_plan("u1", create_input("Lunch")).await.unwrap();
        assert_eq!(plan.status, PlanStatus::Created);
        assert!(plan.is_creator);
        assert_eq!(plan.participants[0].display_name, "Alice");
        assert_eq!(plan.id.len(), 26);
        assert_eq!(stores.plans.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_plan_validates_title() {
        let stores = TestStores::new();
        let service = service(&stores);

        assert!(matches!(
            service.create_plan("u1", create_input("")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.create_plan("u1", create_input(&"x".repeat(101))).await,
            Err(AppError::Validation(_))
        ));
        assert!(stores.plans.is_empty().await);
    }

    #[tokio::test]
    async fn test_owner_only_operations() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;

        assert!(matches!(
            service
                .add_restaurant_option("u2", option_input(&plan_id, "B"))
                .await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service
                .start_voting(
                    "u2",
                    StartVotingInput {
                        plan_id: plan_id.clone(),
                        deadline: None
                    }
                )
                .await,
            Err(AppError::Validation(_))
        ));
        assert!(service.cancel_plan("u2", &plan_id).await.is_err());
        assert!(service.delete_plan("u2", &plan_id).await.is_err());
    }

    #[tokio::test]
    async fn test_restaurant_option_coordinate_validation() {
        let stores = TestStores::new();
        let service = service(&stores);
        let plan = service.create_plan("u1", create_input("Dinner")).await.unwrap();

        let mut input = option_input(&plan.id, "Nowhere");
        input.longitude = 200.0;
        assert!(matches!(
            service.add_restaurant_option("u1", input).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let stores = TestStores::new();
        let service = service(&stores);
        let plan = service.create_plan("u1", create_input("Dinner")).await.unwrap();

        let err = service
            .start_voting(
                "u1",
                StartVotingInput {
                    plan_id: plan.id.clone(),
                    deadline: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = service.get_plan(&plan.id, None).await.unwrap();
        assert_eq!(stored.status, PlanStatus::Created);
        assert_eq!(stored.updated_at, plan.updated_at);
    }

    #[tokio::test]
    async fn test_lifecycle_to_confirmed() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, slot, option) = ready(&service).await;

        let voting = service
            .start_voting(
                "u1",
                StartVotingInput {
                    plan_id: plan_id.clone(),
                    deadline: Some(Utc::now() + Duration::hours(6)),
                },
            )
            .await
            .unwrap();
        assert_eq!(voting.status, PlanStatus::Voting);

        let confirmed = service
            .finalize_plan(
                "u1",
                FinalizePlanInput {
                    plan_id: plan_id.clone(),
                    time_slot_id: slot.id.clone(),
                    restaurant_id: option.id.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(confirmed.status, PlanStatus::Confirmed);
        assert_eq!(confirmed.confirmed_restaurant.unwrap().id, option.id);

        assert!(matches!(
            service.cancel_plan("u1", &plan_id).await,
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_finalize_with_unknown_slot() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, option) = ready(&service).await;
        service
            .start_voting(
                "u1",
                StartVotingInput {
                    plan_id: plan_id.clone(),
                    deadline: None,
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service
                .finalize_plan(
                    "u1",
                    FinalizePlanInput {
                        plan_id,
                        time_slot_id: "missing".to_string(),
                        restaurant_id: option.id,
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;

        let first = service.cancel_plan("u1", &plan_id).await.unwrap();
        let second = service.cancel_plan("u1", &plan_id).await.unwrap();
        assert_eq!(first.status, PlanStatus::Cancelled);
        assert_eq!(second.status, PlanStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_delete_plan_removes_votes() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;

        let mut vote = tablemate_db::entities::Vote::new("v1", &plan_id, "u2").unwrap();
        vote.add_time_choice("c1", "s").unwrap();
        vote.add_restaurant_choice("c2", "r").unwrap();
        stores.votes.create(vote).await.unwrap();

        service.delete_plan("u1", &plan_id).await.unwrap();
        assert!(stores.plans.is_empty().await);
        assert!(stores.votes.is_empty().await);
        assert!(matches!(
            service.get_plan(&plan_id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;
        service.create_plan("u2", create_input("Brunch")).await.unwrap();

        assert_eq!(service.list_plans_by_creator("u1").await.unwrap().len(), 1);
        let joined = service.list_plans_by_participant("u2").await.unwrap();
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().any(|p| p.id == plan_id && !p.is_creator));
    }

    #[tokio::test]
    async fn test_join_twice_rejected() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;

        assert!(matches!(
            service
                .join_plan(
                    "u2",
                    JoinPlanInput {
                        plan_id,
                        display_name: "Bob".to_string(),
                    },
                )
                .await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_voting_results_projection() {
        let stores = TestStores::new();
        let service = service(&stores);
        let (plan_id, _, _) = ready(&service).await;

        let results = service.get_voting_results(&plan_id).await.unwrap();
        assert_eq!(results.results.total_participants, 2);
        assert_eq!(results.results.voted_participants, 0);
        assert_eq!(results.results.voting_progress, 0.0);

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["totalParticipants"], 2);
        assert_eq!(json["status"], "created");
    }
}
