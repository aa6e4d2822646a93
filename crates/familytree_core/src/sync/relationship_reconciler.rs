//! Third sync step: replace the family's relationship set.
//!
//! # Invariants
//! - Existing relationships of the family are always deleted first.
//! - Every endpoint must resolve through the confirmed member identity.
//! - Each created row gets a fresh id; client echo ids are discarded.
//! - Self-loops and duplicate pairs are stored as given.

use crate::model::draft::RelationshipDraft;
use crate::model::identity::{new_relationship_id, EntityKind, FamilyId, RelationshipId};
use crate::repo::relationship_repo::RelationshipRepository;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::identity::MemberIdentity;
use log::debug;

/// Output of relationship replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipReconciliation {
    pub removed: usize,
    /// New ids in draft order.
    pub created: Vec<RelationshipId>,
}

pub fn reconcile_relationships<R>(
    repo: &R,
    family_id: FamilyId,
    identity: &MemberIdentity,
    drafts: &[RelationshipDraft],
) -> SyncResult<RelationshipReconciliation>
where
    R: RelationshipRepository + ?Sized,
{
    for echo_id in drafts.iter().filter_map(|draft| draft.id) {
        if let Some(owner_family_id) = repo.relationship_owner(echo_id)? {
            if owner_family_id != family_id {
                return Err(SyncError::IdentityConflict {
                    entity: EntityKind::Relationship,
                    id: echo_id,
                    family_id,
                    owner_family_id,
                });
            }
        }
    }

    let removed = repo.delete_relationships(family_id)?;

    let mut resolved = Vec::with_capacity(drafts.len());
    for draft in drafts {
        resolved.push(resolve_endpoints(identity, draft)?);
    }

    let mut created = Vec::with_capacity(resolved.len());
    for (position, draft) in resolved.into_iter().enumerate() {
        let relationship = draft.to_relationship(new_relationship_id(), family_id, position as i64);
        repo.insert_relationship(&relationship)?;
        created.push(relationship.id);
    }

    debug!(
        "event=relationships_reconciled module=sync family_id={} removed={} created={}",
        family_id,
        removed,
        created.len()
    );

    Ok(RelationshipReconciliation { removed, created })
}

fn resolve_endpoints(
    identity: &MemberIdentity,
    draft: &RelationshipDraft,
) -> SyncResult<RelationshipDraft> {
    let dangling = |missing_member_id| SyncError::DanglingReference {
        from_member_id: draft.from_member_id,
        to_member_id: draft.to_member_id,
        missing_member_id,
    };

    let from_member_id = identity
        .resolve(draft.from_member_id)
        .ok_or_else(|| dangling(draft.from_member_id))?;
    let to_member_id = identity
        .resolve(draft.to_member_id)
        .ok_or_else(|| dangling(draft.to_member_id))?;

    Ok(RelationshipDraft {
        id: None,
        from_member_id,
        to_member_id,
        kind: draft.kind,
    })
}
