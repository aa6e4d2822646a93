//! Family root aggregate.

use crate::model::identity::{FamilyId, GroupId, UserId};
use serde::{Deserialize, Serialize};

/// Lineage convention the client uses when laying out a tree.
///
/// Stored and echoed only; the engine never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineageType {
    Patrilineal,
    Matrilineal,
    Bilateral,
}

/// Persisted family record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    pub description: Option<String>,
    /// Requester of the latest sync.
    pub owner_id: UserId,
    /// Containing group. One family per group is enforced by callers.
    pub group_id: GroupId,
    pub lineage_type: Option<LineageType>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

/// Write model for creating or overwriting one family row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUpsert {
    pub id: FamilyId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub group_id: GroupId,
    pub lineage_type: Option<LineageType>,
}
