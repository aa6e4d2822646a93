//! Sync error taxonomy.

use crate::model::identity::{EntityKind, FamilyId, MemberId};
use crate::repo::family_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SyncResult<T> = Result<T, SyncError>;

/// Reasons a sync was aborted. Every variant means nothing was persisted.
#[derive(Debug)]
pub enum SyncError {
    /// A draft id already belongs to a different family.
    IdentityConflict {
        entity: EntityKind,
        id: Uuid,
        family_id: FamilyId,
        owner_family_id: FamilyId,
    },
    /// A relationship endpoint is not a member of the synced family.
    DanglingReference {
        from_member_id: MemberId,
        to_member_id: MemberId,
        missing_member_id: MemberId,
    },
    /// The unit of work could not complete against storage.
    Storage(RepoError),
}

impl SyncError {
    /// Stable machine-readable code for logs and presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityConflict { .. } => "identity_conflict",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::Storage(_) => "storage_failure",
        }
    }

    /// Whether re-submitting the same draft may succeed.
    ///
    /// Conflicts and dangling references come from the draft itself and will
    /// fail again until the client fixes it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdentityConflict {
                entity,
                id,
                family_id,
                owner_family_id,
            } => write!(
                f,
                "{} {id} belongs to family {owner_family_id}, not {family_id}",
                entity.as_str()
            ),
            Self::DanglingReference {
                from_member_id,
                to_member_id,
                missing_member_id,
            } => write!(
                f,
                "relationship {from_member_id} -> {to_member_id} references unknown member {missing_member_id}"
            ),
            Self::Storage(err) => write!(f, "family sync storage failure: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.into())
    }
}
