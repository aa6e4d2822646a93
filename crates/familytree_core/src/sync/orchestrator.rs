//! Sync orchestrator: one draft, one transaction.
//!
//! # Responsibility
//! - Acquire the unit of work, run the sync steps in order, read back the
//!   canonical snapshot, and commit or roll back on every exit path.
//!
//! # Invariants
//! - The transaction takes the database write lock up front
//!   (`BEGIN IMMEDIATE`), so concurrent syncs of one family serialize and no
//!   prune can interleave with another call's upsert.
//! - Dropping the transaction before commit rolls everything back; there is
//!   no partial-commit state.
//! - Logs carry ids and counts only, never member names or biographies.

use crate::model::draft::FamilyDraft;
use crate::model::identity::{FamilyId, GroupId, UserId};
use crate::repo::family_repo::{RepoError, SqliteFamilyRepository};
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::relationship_repo::SqliteRelationshipRepository;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::family_upsert::upsert_family;
use crate::sync::member_reconciler::reconcile_members;
use crate::sync::relationship_reconciler::reconcile_relationships;
use crate::sync::snapshot::{load_snapshot, FamilyTreeSnapshot};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Per-call progress of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Started,
    FamilyUpserting,
    MembersReconciling,
    RelationshipsReconciling,
    Committed,
    /// Terminal. Storage is as it was before the call.
    RolledBack,
}

impl SyncStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::FamilyUpserting => "family_upserting",
            Self::MembersReconciling => "members_reconciling",
            Self::RelationshipsReconciling => "relationships_reconciling",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Reconciles `draft` into the store for `group_id` on behalf of
/// `requester_id`.
///
/// Callers must have authorized the requester for the group already.
///
/// # Errors
/// - `IdentityConflict` when a draft id is owned by another family.
/// - `DanglingReference` when a relationship endpoint is not a member.
/// - `Storage` for SQLite failures, including lock timeouts. Safe to retry.
pub fn sync_family(
    conn: &mut Connection,
    requester_id: UserId,
    group_id: GroupId,
    draft: &FamilyDraft,
) -> SyncResult<FamilyTreeSnapshot> {
    let started_at = Instant::now();
    let family_id = draft.family.id;
    info!(
        "event=family_sync module=sync status=start family_id={} group_id={} members={} relationships={}",
        family_id,
        group_id,
        draft.members.len(),
        draft.relationships.len()
    );

    let mut stage = SyncStage::Started;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let result = run_steps(&tx, requester_id, group_id, draft, &mut stage);

    let outcome = match result {
        Ok(snapshot) => tx.commit().map(|()| snapshot).map_err(SyncError::from),
        // Rollback also happens on drop; doing it here surfaces its errors.
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=family_sync module=sync status=error family_id={} error_code=rollback_failed error={}",
                    family_id, rollback_err
                );
            }
            Err(err)
        }
    };

    match outcome {
        Ok(snapshot) => {
            stage = SyncStage::Committed;
            info!(
                "event=family_sync module=sync status=ok stage={} family_id={} members={} relationships={} duration_ms={}",
                stage.as_str(),
                family_id,
                snapshot.members.len(),
                snapshot.relationships.len(),
                started_at.elapsed().as_millis()
            );
            Ok(snapshot)
        }
        Err(err) => {
            let failed_at = stage;
            stage = SyncStage::RolledBack;
            if err.is_retryable() {
                error!(
                    "event=family_sync module=sync status=error stage={} failed_at={} family_id={} duration_ms={} error_code={} error={}",
                    stage.as_str(),
                    failed_at.as_str(),
                    family_id,
                    started_at.elapsed().as_millis(),
                    err.error_code(),
                    err
                );
            } else {
                warn!(
                    "event=family_sync module=sync status=rejected stage={} failed_at={} family_id={} duration_ms={} error_code={}",
                    stage.as_str(),
                    failed_at.as_str(),
                    family_id,
                    started_at.elapsed().as_millis(),
                    err.error_code()
                );
            }
            Err(err)
        }
    }
}

fn run_steps(
    tx: &Transaction<'_>,
    requester_id: UserId,
    group_id: GroupId,
    draft: &FamilyDraft,
    stage: &mut SyncStage,
) -> SyncResult<FamilyTreeSnapshot> {
    let families = SqliteFamilyRepository::new(tx);
    let members = SqliteMemberRepository::new(tx);
    let relationships = SqliteRelationshipRepository::new(tx);
    let family_id = draft.family.id;

    advance(stage, SyncStage::FamilyUpserting, family_id);
    let upserted = upsert_family(&families, &draft.family.to_upsert(requester_id, group_id))?;
    debug!(
        "event=family_upserted module=sync family_id={} created={}",
        family_id, upserted.created
    );

    advance(stage, SyncStage::MembersReconciling, family_id);
    let reconciled = reconcile_members(&members, family_id, &draft.members)?;

    advance(stage, SyncStage::RelationshipsReconciling, family_id);
    reconcile_relationships(
        &relationships,
        family_id,
        &reconciled.identity,
        &draft.relationships,
    )?;

    let snapshot = load_snapshot(&families, &members, &relationships, family_id)?
        .ok_or(RepoError::NotFound(family_id))?;
    Ok(snapshot)
}

fn advance(stage: &mut SyncStage, next: SyncStage, family_id: FamilyId) {
    debug!(
        "event=family_sync_stage module=sync family_id={} from={} to={}",
        family_id,
        stage.as_str(),
        next.as_str()
    );
    *stage = next;
}
