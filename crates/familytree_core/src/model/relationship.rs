//! Directed, typed edge between two members of one family.

use crate::model::identity::{FamilyId, MemberId, RelationshipId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// `from` is a parent of `to`.
    Parent,
    Spouse,
    Sibling,
}

/// Persisted relationship row.
///
/// `id` is regenerated on every sync; only the endpoints and type are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    pub family_id: FamilyId,
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    /// Index of the edge in the draft it was created from.
    #[serde(skip)]
    pub position: i64,
}
