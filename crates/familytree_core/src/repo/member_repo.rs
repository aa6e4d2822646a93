//! Family member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert members by client-assigned id as a full state replacement.
//! - Expose the row-level primitives the member reconciler prunes with.
//!
//! # Invariants
//! - `upsert_member` overwrites every column; absent optionals become NULL.
//! - Deleting a member cascades to relationships that reference it.
//! - Listing is deterministic: `generation ASC, id ASC`.

use crate::model::identity::{FamilyId, MemberId};
use crate::model::member::{FamilyMember, Gender};
use crate::repo::family_repo::{RepoError, RepoResult};
use crate::repo::sql::{bool_to_int, ensure_table_ready, parse_bool, parse_uuid, NOW_MS_SQL};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const DATE_FORMAT: &str = "%Y-%m-%d";

const MEMBER_COLUMNS: &[&str] = &[
    "id",
    "family_id",
    "full_name",
    "gender",
    "date_of_birth",
    "date_of_death",
    "is_alive",
    "biography",
    "generation",
    "position_x",
    "position_y",
];

/// Repository interface for family member rows.
pub trait MemberRepository {
    /// Returns the family currently owning `id`, if the member exists.
    fn member_owner(&self, id: MemberId) -> RepoResult<Option<FamilyId>>;
    /// Lists persisted member ids of one family.
    fn list_member_ids(&self, family_id: FamilyId) -> RepoResult<Vec<MemberId>>;
    /// Deletes one member of `family_id`. Returns whether a row was removed.
    fn delete_member(&self, family_id: FamilyId, id: MemberId) -> RepoResult<bool>;
    /// Writes or overwrites one member by id.
    fn upsert_member(&self, member: &FamilyMember) -> RepoResult<()>;
    /// Lists full member rows of one family.
    fn list_members(&self, family_id: FamilyId) -> RepoResult<Vec<FamilyMember>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "family_members", MEMBER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn member_owner(&self, id: MemberId) -> RepoResult<Option<FamilyId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT family_id FROM family_members WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "family_members.family_id"))
            .transpose()
    }

    fn list_member_ids(&self, family_id: FamilyId) -> RepoResult<Vec<MemberId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id
             FROM family_members
             WHERE family_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([family_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "family_members.id")?);
        }
        Ok(ids)
    }

    fn delete_member(&self, family_id: FamilyId, id: MemberId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM family_members
             WHERE id = ?1
               AND family_id = ?2;",
            params![id.to_string(), family_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn upsert_member(&self, member: &FamilyMember) -> RepoResult<()> {
        let biography = member
            .biography
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| {
                RepoError::InvalidData(format!(
                    "biography of member {} is not serializable: {err}",
                    member.id
                ))
            })?;

        self.conn.execute(
            &format!(
                "INSERT INTO family_members (
                    id,
                    family_id,
                    full_name,
                    gender,
                    date_of_birth,
                    date_of_death,
                    is_alive,
                    biography,
                    generation,
                    position_x,
                    position_y
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(id) DO UPDATE SET
                    family_id = excluded.family_id,
                    full_name = excluded.full_name,
                    gender = excluded.gender,
                    date_of_birth = excluded.date_of_birth,
                    date_of_death = excluded.date_of_death,
                    is_alive = excluded.is_alive,
                    biography = excluded.biography,
                    generation = excluded.generation,
                    position_x = excluded.position_x,
                    position_y = excluded.position_y,
                    updated_at = {NOW_MS_SQL};"
            ),
            params![
                member.id.to_string(),
                member.family_id.to_string(),
                member.full_name.as_str(),
                gender_to_db(member.gender),
                member.date_of_birth.map(date_to_db),
                member.date_of_death.map(date_to_db),
                member.is_alive.map(bool_to_int),
                biography,
                member.generation,
                member.position_x,
                member.position_y,
            ],
        )?;
        Ok(())
    }

    fn list_members(&self, family_id: FamilyId) -> RepoResult<Vec<FamilyMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                family_id,
                full_name,
                gender,
                date_of_birth,
                date_of_death,
                is_alive,
                biography,
                generation,
                position_x,
                position_y
             FROM family_members
             WHERE family_id = ?1
             ORDER BY generation ASC, id ASC;",
        )?;
        let mut rows = stmt.query([family_id.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<FamilyMember> {
    let id_text: String = row.get("id")?;
    let family_text: String = row.get("family_id")?;

    let gender_text: String = row.get("gender")?;
    let gender = parse_gender(&gender_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{gender_text}` in family_members.gender"
        ))
    })?;

    let is_alive = row
        .get::<_, Option<i64>>("is_alive")?
        .map(|value| parse_bool(value, "family_members.is_alive"))
        .transpose()?;

    let biography = match row.get::<_, Option<String>>("biography")? {
        Some(text) => Some(serde_json::from_str(&text).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid json in family_members.biography for member {id_text}: {err}"
            ))
        })?),
        None => None,
    };

    Ok(FamilyMember {
        id: parse_uuid(&id_text, "family_members.id")?,
        family_id: parse_uuid(&family_text, "family_members.family_id")?,
        full_name: row.get("full_name")?,
        gender,
        date_of_birth: parse_optional_date(row, "date_of_birth")?,
        date_of_death: parse_optional_date(row, "date_of_death")?,
        is_alive,
        biography,
        generation: row.get("generation")?,
        position_x: row.get("position_x")?,
        position_y: row.get("position_y")?,
    })
}

fn parse_optional_date(row: &Row<'_>, column: &'static str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in family_members.{column}"))
            }),
        None => Ok(None),
    }
}

fn date_to_db(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn gender_to_db(value: Gender) -> &'static str {
    match value {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Other => "other",
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        "other" => Some(Gender::Other),
        _ => None,
    }
}
