//! Family repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, overwrite and look up family root rows by durable id.
//! - Own the repository error type shared by member/relationship stores.
//!
//! # Invariants
//! - Family ids are accepted exactly as supplied; the store never mints one.
//! - Families are never deleted through this repository.

use crate::db::DbError;
use crate::model::family::{Family, FamilyUpsert, LineageType};
use crate::model::identity::{FamilyId, GroupId};
use crate::repo::sql::{ensure_table_ready, parse_uuid, NOW_MS_SQL};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const FAMILY_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    owner_id,
    group_id,
    lineage_type,
    created_at,
    updated_at
FROM families";

const FAMILY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "owner_id",
    "group_id",
    "lineage_type",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from family graph persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Row addressed by id does not exist.
    NotFound(Uuid),
    /// Persisted data cannot be converted into a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted family data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "family store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "family store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "family store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for family root rows.
pub trait FamilyRepository {
    /// Inserts a new family under its client-assigned id.
    fn insert_family(&self, family: &FamilyUpsert) -> RepoResult<()>;
    /// Overwrites mutable fields, owner and group of an existing family.
    fn update_family(&self, family: &FamilyUpsert) -> RepoResult<()>;
    /// Loads one family by id.
    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>>;
    /// Loads the most recently updated family contained in `group_id`.
    fn find_family_by_group(&self, group_id: GroupId) -> RepoResult<Option<Family>>;
}

/// SQLite-backed family repository.
pub struct SqliteFamilyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFamilyRepository<'conn> {
    /// Wraps a connection known to be migrated, typically an open transaction.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying the `families` schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "families", FAMILY_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl FamilyRepository for SqliteFamilyRepository<'_> {
    fn insert_family(&self, family: &FamilyUpsert) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO families (
                id,
                name,
                description,
                owner_id,
                group_id,
                lineage_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                family.id.to_string(),
                family.name.as_str(),
                family.description.as_deref(),
                family.owner_id.to_string(),
                family.group_id.to_string(),
                family.lineage_type.map(lineage_type_to_db),
            ],
        )?;
        Ok(())
    }

    fn update_family(&self, family: &FamilyUpsert) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE families
                 SET
                    name = ?2,
                    description = ?3,
                    owner_id = ?4,
                    group_id = ?5,
                    lineage_type = ?6,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                family.id.to_string(),
                family.name.as_str(),
                family.description.as_deref(),
                family.owner_id.to_string(),
                family.group_id.to_string(),
                family.lineage_type.map(lineage_type_to_db),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(family.id));
        }
        Ok(())
    }

    fn get_family(&self, id: FamilyId) -> RepoResult<Option<Family>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAMILY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_family_row(row)?));
        }
        Ok(None)
    }

    fn find_family_by_group(&self, group_id: GroupId) -> RepoResult<Option<Family>> {
        let id_text: Option<String> = self
            .conn
            .query_row(
                "SELECT id
                 FROM families
                 WHERE group_id = ?1
                 ORDER BY updated_at DESC, id ASC
                 LIMIT 1;",
                [group_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match id_text {
            Some(value) => self.get_family(parse_uuid(&value, "families.id")?),
            None => Ok(None),
        }
    }
}

fn parse_family_row(row: &Row<'_>) -> RepoResult<Family> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let group_text: String = row.get("group_id")?;

    let lineage_type = match row.get::<_, Option<String>>("lineage_type")? {
        Some(value) => Some(parse_lineage_type(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid lineage type `{value}` in families.lineage_type"
            ))
        })?),
        None => None,
    };

    Ok(Family {
        id: parse_uuid(&id_text, "families.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        owner_id: parse_uuid(&owner_text, "families.owner_id")?,
        group_id: parse_uuid(&group_text, "families.group_id")?,
        lineage_type,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn lineage_type_to_db(value: LineageType) -> &'static str {
    match value {
        LineageType::Patrilineal => "patrilineal",
        LineageType::Matrilineal => "matrilineal",
        LineageType::Bilateral => "bilateral",
    }
}

fn parse_lineage_type(value: &str) -> Option<LineageType> {
    match value {
        "patrilineal" => Some(LineageType::Patrilineal),
        "matrilineal" => Some(LineageType::Matrilineal),
        "bilateral" => Some(LineageType::Bilateral),
        _ => None,
    }
}
