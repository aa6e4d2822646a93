//! Family member (person node).
//!
//! # Invariants
//! - `family_id` always equals the family the member was synced into.
//! - Optional fields are stored exactly as last synced; absent means absent.

use crate::model::identity::{FamilyId, MemberId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Persisted family member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: MemberId,
    pub family_id: FamilyId,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub is_alive: Option<bool>,
    /// Rich-text document owned by the editor. Opaque to the engine.
    pub biography: Option<serde_json::Value>,
    /// Layout hint only.
    pub generation: i64,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}
