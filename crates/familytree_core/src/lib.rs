//! Core of the family tree editor backend.
//! Reconciles client-authored family drafts into the SQLite store, atomically.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::draft::{FamilyDraft, FamilyHeaderDraft, MemberDraft, RelationshipDraft};
pub use model::family::{Family, FamilyUpsert, LineageType};
pub use model::identity::{EntityKind, FamilyId, GroupId, MemberId, RelationshipId, UserId};
pub use model::member::{FamilyMember, Gender};
pub use model::relationship::{Relationship, RelationshipType};
pub use repo::family_repo::{FamilyRepository, RepoError, RepoResult, SqliteFamilyRepository};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::relationship_repo::{RelationshipRepository, SqliteRelationshipRepository};
pub use service::family_service::FamilyService;
pub use sync::error::{SyncError, SyncResult};
pub use sync::identity::MemberIdentity;
pub use sync::orchestrator::{sync_family, SyncStage};
pub use sync::snapshot::FamilyTreeSnapshot;

/// Minimal health-check API for front ends.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
