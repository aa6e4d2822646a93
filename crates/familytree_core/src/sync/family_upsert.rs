//! First sync step: create or overwrite the family root row.

use crate::model::family::{Family, FamilyUpsert};
use crate::repo::family_repo::{FamilyRepository, RepoError};
use crate::sync::error::SyncResult;

/// Persisted family after the upsert step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUpsertOutcome {
    pub family: Family,
    /// `true` when this call inserted the row.
    pub created: bool,
}

/// Creates the family under its client-assigned id, or overwrites name,
/// description, lineage type, owner and group of the existing row.
pub fn upsert_family<R>(repo: &R, upsert: &FamilyUpsert) -> SyncResult<FamilyUpsertOutcome>
where
    R: FamilyRepository + ?Sized,
{
    let created = match repo.get_family(upsert.id)? {
        Some(_) => {
            repo.update_family(upsert)?;
            false
        }
        None => {
            repo.insert_family(upsert)?;
            true
        }
    };

    let family = repo
        .get_family(upsert.id)?
        .ok_or(RepoError::NotFound(upsert.id))?;
    Ok(FamilyUpsertOutcome { family, created })
}
