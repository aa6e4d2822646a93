//! Family tree use-case service.
//!
//! # Invariants
//! - The wrapped connection is verified to carry the full family schema.
//! - Every write goes through [`sync_family`]; this service never mutates rows
//!   on its own.

use crate::model::draft::FamilyDraft;
use crate::model::identity::{FamilyId, GroupId, UserId};
use crate::repo::family_repo::{FamilyRepository, RepoResult, SqliteFamilyRepository};
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::relationship_repo::SqliteRelationshipRepository;
use crate::sync::error::SyncResult;
use crate::sync::orchestrator::sync_family;
use crate::sync::snapshot::{load_snapshot, FamilyTreeSnapshot};
use rusqlite::Connection;

/// Facade over sync and tree loading for one connection.
pub struct FamilyService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> FamilyService<'conn> {
    /// Creates the service after checking the connection's schema.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        SqliteFamilyRepository::try_new(conn)?;
        SqliteMemberRepository::try_new(conn)?;
        SqliteRelationshipRepository::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Reconciles a client draft and returns the committed tree.
    ///
    /// See [`sync_family`] for the error contract.
    pub fn sync(
        &mut self,
        requester_id: UserId,
        group_id: GroupId,
        draft: &FamilyDraft,
    ) -> SyncResult<FamilyTreeSnapshot> {
        sync_family(&mut *self.conn, requester_id, group_id, draft)
    }

    /// Loads one stored tree by family id.
    pub fn load_tree(&self, family_id: FamilyId) -> RepoResult<Option<FamilyTreeSnapshot>> {
        let conn: &Connection = &*self.conn;
        load_snapshot(
            &SqliteFamilyRepository::new(conn),
            &SqliteMemberRepository::new(conn),
            &SqliteRelationshipRepository::new(conn),
            family_id,
        )
    }

    /// Loads the tree of the family contained in `group_id`.
    ///
    /// When a group holds more than one family, the most recently updated one
    /// is returned.
    pub fn load_tree_for_group(&self, group_id: GroupId) -> RepoResult<Option<FamilyTreeSnapshot>> {
        let family = SqliteFamilyRepository::new(&*self.conn).find_family_by_group(group_id)?;
        match family {
            Some(family) => self.load_tree(family.id),
            None => Ok(None),
        }
    }
}
