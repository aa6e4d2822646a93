//! Client-authored snapshot of one family tree.
//!
//! # Responsibility
//! - Mirror the JSON the editor submits (camelCase keys, upper-case enums,
//!   `YYYY-MM-DD` dates).
//! - Convert draft entries into persisted shapes scoped to one family.
//!
//! # Invariants
//! - Field-level validation happens before a draft reaches the engine; these
//!   types only carry structure.

use crate::model::family::{FamilyUpsert, LineageType};
use crate::model::identity::{FamilyId, GroupId, MemberId, RelationshipId, UserId};
use crate::model::member::{FamilyMember, Gender};
use crate::model::relationship::{Relationship, RelationshipType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Full replacement snapshot for one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDraft {
    pub family: FamilyHeaderDraft,
    #[serde(default)]
    pub members: Vec<MemberDraft>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyHeaderDraft {
    pub id: FamilyId,
    pub name: String,
    pub description: Option<String>,
    pub lineage_type: Option<LineageType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub id: MemberId,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub is_alive: Option<bool>,
    pub biography: Option<serde_json::Value>,
    #[serde(default)]
    pub generation: i64,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDraft {
    /// Local echo id from the editor. Never persisted.
    pub id: Option<RelationshipId>,
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
}

impl FamilyHeaderDraft {
    /// Builds the family write model for the given requester and group.
    pub fn to_upsert(&self, requester_id: UserId, group_id: GroupId) -> FamilyUpsert {
        FamilyUpsert {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            owner_id: requester_id,
            group_id,
            lineage_type: self.lineage_type,
        }
    }
}

impl MemberDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(id: MemberId, full_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            gender,
            date_of_birth: None,
            date_of_death: None,
            is_alive: None,
            biography: None,
            generation: 0,
            position_x: None,
            position_y: None,
        }
    }

    /// Full member state for `family_id`; every field comes from the draft.
    pub fn to_member(&self, family_id: FamilyId) -> FamilyMember {
        FamilyMember {
            id: self.id,
            family_id,
            full_name: self.full_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
            is_alive: self.is_alive,
            biography: self.biography.clone(),
            generation: self.generation,
            position_x: self.position_x,
            position_y: self.position_y,
        }
    }
}

impl RelationshipDraft {
    pub fn new(from_member_id: MemberId, to_member_id: MemberId, kind: RelationshipType) -> Self {
        Self {
            id: None,
            from_member_id,
            to_member_id,
            kind,
        }
    }

    /// Creates the persisted edge under a freshly minted id.
    pub fn to_relationship(
        &self,
        id: RelationshipId,
        family_id: FamilyId,
        position: i64,
    ) -> Relationship {
        Relationship {
            id,
            family_id,
            from_member_id: self.from_member_id,
            to_member_id: self.to_member_id,
            kind: self.kind,
            position,
        }
    }
}
