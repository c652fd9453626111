//! Vote entity.
//!
//! One vote per (plan, user). Resubmitting replaces the choices in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablemate_common::{AppError, AppResult};

/// Which kind of option a choice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Time,
    Restaurant,
}

impl VoteType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Restaurant => "restaurant",
        }
    }
}

/// A single selected option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteChoice {
    pub id: String,
    #[serde(rename = "type")]
    pub choice_type: VoteType,
    pub option_id: String,
}

/// A participant's ballot for one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub plan_id: String,
    pub user_id: String,
    pub choices: Vec<VoteChoice>,
    pub comment: Option<String>,
    pub voted_at: DateTime<Utc>,
    pub version: u64,
}

impl Vote {
    /// Create an empty ballot.
    pub fn new(
        id: impl Into<String>,
        plan_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> AppResult<Self> {
        let id = id.into();
        let plan_id = plan_id.into();
        let user_id = user_id.into();

        if id.trim().is_empty() {
            return Err(AppError::Validation("vote ID cannot be empty".to_string()));
        }
        if plan_id.trim().is_empty() {
            return Err(AppError::Validation("plan ID cannot be empty".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(AppError::Validation("user ID cannot be empty".to_string()));
        }

        Ok(Self {
            id,
            plan_id,
            user_id,
            choices: Vec::new(),
            comment: None,
            voted_at: Utc::now(),
            version: 0,
        })
    }

    /// Select an option. The same option may not be chosen twice.
    pub fn add_choice(
        &mut self,
        choice_id: impl Into<String>,
        choice_type: VoteType,
        option_id: impl Into<String>,
    ) -> AppResult<()> {
        let option_id = option_id.into();
        if option_id.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} option ID cannot be empty",
                choice_type.as_str()
            )));
        }

        let duplicate = self
            .choices
            .iter()
            .any(|c| c.choice_type == choice_type && c.option_id == option_id);
        if duplicate {
            return Err(AppError::Validation(format!(
                "{} option {option_id} already chosen",
                choice_type.as_str()
            )));
        }

        self.choices.push(VoteChoice {
            id: choice_id.into(),
            choice_type,
            option_id,
        });
        Ok(())
    }

    pub fn add_time_choice(
        &mut self,
        choice_id: impl Into<String>,
        time_slot_id: impl Into<String>,
    ) -> AppResult<()> {
        self.add_choice(choice_id, VoteType::Time, time_slot_id)
    }

    pub fn add_restaurant_choice(
        &mut self,
        choice_id: impl Into<String>,
        restaurant_id: impl Into<String>,
    ) -> AppResult<()> {
        self.add_choice(choice_id, VoteType::Restaurant, restaurant_id)
    }

    pub fn clear_choices(&mut self) {
        self.choices.clear();
    }

    /// Replace the comment. A blank comment clears it.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment.filter(|c| !c.trim().is_empty());
    }

    /// Mark the ballot as (re)submitted now.
    pub fn refresh_voted_at(&mut self) {
        let now = Utc::now();
        if now > self.voted_at {
            self.voted_at = now;
        }
    }

    /// Chosen time slot ids, in selection order.
    #[must_use]
    pub fn time_choices(&self) -> Vec<String> {
        self.option_ids(VoteType::Time)
    }

    /// Chosen restaurant ids, in selection order.
    #[must_use]
    pub fn restaurant_choices(&self) -> Vec<String> {
        self.option_ids(VoteType::Restaurant)
    }

    /// A ballot needs at least one choice of each kind.
    pub fn validate(&self) -> AppResult<()> {
        if !self.has_choice(VoteType::Time) {
            return Err(AppError::Validation(
                "vote must include at least one time choice".to_string(),
            ));
        }
        if !self.has_choice(VoteType::Restaurant) {
            return Err(AppError::Validation(
                "vote must include at least one restaurant choice".to_string(),
            ));
        }
        Ok(())
    }

    fn has_choice(&self, choice_type: VoteType) -> bool {
        self.choices.iter().any(|c| c.choice_type == choice_type)
    }

    fn option_ids(&self, choice_type: VoteType) -> Vec<String> {
        self.choices
            .iter()
            .filter(|c| c.choice_type == choice_type)
            .map(|c| c.option_id.clone())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vote_is_empty_and_invalid() {
        let vote = Vote::new("v1", "p1", "u1").unwrap();
        assert!(vote.choices.is_empty());
        assert!(matches!(vote.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_vote_rejects_blank_ids() {
        assert!(Vote::new("", "p1", "u1").is_err());
        assert!(Vote::new("v1", " ", "u1").is_err());
        assert!(Vote::new("v1", "p1", "").is_err());
    }

    #[test]
    fn test_validate_requires_both_kinds() {
        let mut vote = Vote::new("v1", "p1", "u1").unwrap();
        vote.add_time_choice("c1", "s1").unwrap();
        let err = vote.validate().unwrap_err();
        assert!(err.to_string().contains("restaurant choice"));

        vote.add_restaurant_choice("c2", "r1").unwrap();
        assert!(vote.validate().is_ok());
    }

    #[test]
    fn test_duplicate_choice_rejected_per_type() {
        let mut vote = Vote::new("v1", "p1", "u1").unwrap();
        vote.add_time_choice("c1", "x").unwrap();
        assert!(vote.add_time_choice("c2", "x").is_err());
        // Same id under the other type is a different option.
        assert!(vote.add_restaurant_choice("c3", "x").is_ok());
        assert_eq!(vote.choices.len(), 2);
    }

    #[test]
    fn test_choice_accessors_keep_order() {
        let mut vote = Vote::new("v1", "p1", "u1").unwrap();
        vote.add_time_choice("c1", "s2").unwrap();
        vote.add_restaurant_choice("c2", "r1").unwrap();
        vote.add_time_choice("c3", "s1").unwrap();

        assert_eq!(vote.time_choices(), vec!["s2", "s1"]);
        assert_eq!(vote.restaurant_choices(), vec!["r1"]);
    }

    #[test]
    fn test_clear_and_comment() {
        let mut vote = Vote::new("v1", "p1", "u1").unwrap();
        vote.add_time_choice("c1", "s1").unwrap();
        vote.set_comment(Some("see you".to_string()));
        vote.clear_choices();

        assert!(vote.choices.is_empty());
        assert_eq!(vote.comment.as_deref(), Some("see you"));

        vote.set_comment(Some("   ".to_string()));
        assert!(vote.comment.is_none());
    }

    #[test]
    fn test_choice_type_serializes_as_type() {
        let choice = VoteChoice {
            id: "c1".to_string(),
            choice_type: VoteType::Restaurant,
            option_id: "r1".to_string(),
        };
        let json = serde_json::to_value(&choice).unwrap();
        assert_eq!(json["type"], "restaurant");
        assert_eq!(json["optionId"], "r1");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut vote = Vote::new("v1", "p1", "u1").unwrap();
        vote.add_time_choice("c1", "s1").unwrap();
        vote.add_time_choice("c2", "s2").unwrap();
        vote.add_restaurant_choice("c3", "r1").unwrap();
        vote.set_comment(Some("either slot works".to_string()));
        vote.version = 2;

        let json = serde_json::to_string(&vote).unwrap();
        let restored: Vote = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vote);
        assert_eq!(restored.time_choices(), vec!["s1", "s2"]);
    }
}
