//! Canonical server view of one family tree.

use crate::model::family::Family;
use crate::model::identity::FamilyId;
use crate::model::member::FamilyMember;
use crate::model::relationship::Relationship;
use crate::repo::family_repo::{FamilyRepository, RepoResult};
use crate::repo::member_repo::MemberRepository;
use crate::repo::relationship_repo::RelationshipRepository;
use serde::{Deserialize, Serialize};

/// Family, members and relationships exactly as persisted.
///
/// Returned by every successful sync and by tree loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTreeSnapshot {
    pub family: Family,
    pub members: Vec<FamilyMember>,
    pub relationships: Vec<Relationship>,
}

/// Reads the full persisted tree of `family_id`.
pub fn load_snapshot<F, M, R>(
    families: &F,
    members: &M,
    relationships: &R,
    family_id: FamilyId,
) -> RepoResult<Option<FamilyTreeSnapshot>>
where
    F: FamilyRepository + ?Sized,
    M: MemberRepository + ?Sized,
    R: RelationshipRepository + ?Sized,
{
    let Some(family) = families.get_family(family_id)? else {
        return Ok(None);
    };

    Ok(Some(FamilyTreeSnapshot {
        members: members.list_members(family.id)?,
        relationships: relationships.list_relationships(family.id)?,
        family,
    }))
}
