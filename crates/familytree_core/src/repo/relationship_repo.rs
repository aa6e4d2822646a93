//! Relationship repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Relationship rows are only ever bulk-deleted per family and re-inserted.
//! - Listing follows draft order: `position ASC, id ASC`.

use crate::model::identity::{FamilyId, RelationshipId};
use crate::model::relationship::{Relationship, RelationshipType};
use crate::repo::family_repo::{RepoError, RepoResult};
use crate::repo::sql::{ensure_table_ready, parse_uuid};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RELATIONSHIP_COLUMNS: &[&str] = &[
    "id",
    "family_id",
    "from_member_id",
    "to_member_id",
    "type",
    "position",
];

/// Repository interface for relationship rows.
pub trait RelationshipRepository {
    /// Returns the family currently owning relationship `id`, if any.
    fn relationship_owner(&self, id: RelationshipId) -> RepoResult<Option<FamilyId>>;
    /// Deletes every relationship of `family_id`. Returns the row count.
    fn delete_relationships(&self, family_id: FamilyId) -> RepoResult<usize>;
    /// Inserts one relationship row.
    fn insert_relationship(&self, relationship: &Relationship) -> RepoResult<()>;
    /// Lists relationships of one family in draft order.
    fn list_relationships(&self, family_id: FamilyId) -> RepoResult<Vec<Relationship>>;
}

/// SQLite-backed relationship repository.
pub struct SqliteRelationshipRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRelationshipRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "relationships", RELATIONSHIP_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl RelationshipRepository for SqliteRelationshipRepository<'_> {
    fn relationship_owner(&self, id: RelationshipId) -> RepoResult<Option<FamilyId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT family_id FROM relationships WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "relationships.family_id"))
            .transpose()
    }

    fn delete_relationships(&self, family_id: FamilyId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM relationships WHERE family_id = ?1;",
            [family_id.to_string()],
        )?;
        Ok(removed)
    }

    fn insert_relationship(&self, relationship: &Relationship) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO relationships (
                id,
                family_id,
                from_member_id,
                to_member_id,
                type,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                relationship.id.to_string(),
                relationship.family_id.to_string(),
                relationship.from_member_id.to_string(),
                relationship.to_member_id.to_string(),
                relationship_type_to_db(relationship.kind),
                relationship.position,
            ],
        )?;
        Ok(())
    }

    fn list_relationships(&self, family_id: FamilyId) -> RepoResult<Vec<Relationship>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                family_id,
                from_member_id,
                to_member_id,
                type,
                position
             FROM relationships
             WHERE family_id = ?1
             ORDER BY position ASC, id ASC;",
        )?;
        let mut rows = stmt.query([family_id.to_string()])?;
        let mut relationships = Vec::new();
        while let Some(row) = rows.next()? {
            relationships.push(parse_relationship_row(row)?);
        }
        Ok(relationships)
    }
}

fn parse_relationship_row(row: &Row<'_>) -> RepoResult<Relationship> {
    let id_text: String = row.get("id")?;
    let family_text: String = row.get("family_id")?;
    let from_text: String = row.get("from_member_id")?;
    let to_text: String = row.get("to_member_id")?;

    let type_text: String = row.get("type")?;
    let kind = parse_relationship_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid relationship type `{type_text}` in relationships.type"
        ))
    })?;

    Ok(Relationship {
        id: parse_uuid(&id_text, "relationships.id")?,
        family_id: parse_uuid(&family_text, "relationships.family_id")?,
        from_member_id: parse_uuid(&from_text, "relationships.from_member_id")?,
        to_member_id: parse_uuid(&to_text, "relationships.to_member_id")?,
        kind,
        position: row.get("position")?,
    })
}

fn relationship_type_to_db(value: RelationshipType) -> &'static str {
    match value {
        RelationshipType::Parent => "parent",
        RelationshipType::Spouse => "spouse",
        RelationshipType::Sibling => "sibling",
    }
}

fn parse_relationship_type(value: &str) -> Option<RelationshipType> {
    match value {
        "parent" => Some(RelationshipType::Parent),
        "spouse" => Some(RelationshipType::Spouse),
        "sibling" => Some(RelationshipType::Sibling),
        _ => None,
    }
}
