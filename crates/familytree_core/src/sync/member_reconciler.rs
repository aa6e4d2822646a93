//! Second sync step: make the family's member set equal the draft's.
//!
//! # Invariants
//! - Members of other families are never touched; a draft id owned elsewhere
//!   aborts the sync.
//! - Pruning is a set-difference delete against the incoming id set.
//! - Each upsert is a full replacement of that member's state.

use crate::model::draft::MemberDraft;
use crate::model::identity::{EntityKind, FamilyId, MemberId};
use crate::repo::member_repo::MemberRepository;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::identity::MemberIdentity;
use log::debug;
use std::collections::HashSet;

/// Output of member reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberReconciliation {
    /// Persisted member ids of the family after the step.
    pub identity: MemberIdentity,
    pub pruned: usize,
    pub upserted: usize,
}

pub fn reconcile_members<R>(
    repo: &R,
    family_id: FamilyId,
    drafts: &[MemberDraft],
) -> SyncResult<MemberReconciliation>
where
    R: MemberRepository + ?Sized,
{
    let incoming: HashSet<MemberId> = drafts.iter().map(|draft| draft.id).collect();

    for &id in &incoming {
        if let Some(owner_family_id) = repo.member_owner(id)? {
            if owner_family_id != family_id {
                return Err(SyncError::IdentityConflict {
                    entity: EntityKind::Member,
                    id,
                    family_id,
                    owner_family_id,
                });
            }
        }
    }

    let mut pruned = 0;
    for id in repo.list_member_ids(family_id)? {
        if !incoming.contains(&id) && repo.delete_member(family_id, id)? {
            pruned += 1;
        }
    }

    // Duplicate ids in one draft: the later entry is written last and wins.
    for draft in drafts {
        repo.upsert_member(&draft.to_member(family_id))?;
    }

    let identity = MemberIdentity::from_ids(repo.list_member_ids(family_id)?);
    debug!(
        "event=members_reconciled module=sync family_id={} pruned={} upserted={} confirmed={}",
        family_id,
        pruned,
        drafts.len(),
        identity.len()
    );

    Ok(MemberReconciliation {
        identity,
        pruned,
        upserted: drafts.len(),
    })
}
