//! Durable identifiers for the family graph.
//!
//! Family and member ids are minted by the client before the entity is ever
//! persisted, and storage upserts by exactly that id. Relationship ids are
//! minted by the store on every sync.

use uuid::Uuid;

/// Client-assigned durable id of a family tree.
pub type FamilyId = Uuid;
/// Client-assigned durable id of a family member.
pub type MemberId = Uuid;
/// Store-issued id of one relationship row.
pub type RelationshipId = Uuid;
/// Id of the authenticated caller, as vouched for by access control.
pub type UserId = Uuid;
/// Id of the group that contains a family.
pub type GroupId = Uuid;

/// Which persisted entity kind an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Member,
    Relationship,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Relationship => "relationship",
        }
    }
}

/// Mints a fresh store-side id.
pub fn new_relationship_id() -> RelationshipId {
    Uuid::new_v4()
}
