//! Pictogram repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over pictogram storage.
//! - Own ownership-association maintenance with atomic semantics.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Pictogram::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Removal deletes both association tables before the pictogram row.

use crate::db::DbError;
use crate::model::identity::Identity;
use crate::model::pictogram::{
    AccessLevel, OwnershipScope, Pictogram, PictogramId, PictogramValidationError,
};
use crate::search::visible::{list_visible_rows, VisiblePage};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub(crate) const PICTOGRAM_SELECT_SQL: &str = "SELECT
    p.id,
    p.title,
    p.access_level,
    p.image_hash,
    p.last_edit,
    ur.user_id,
    dr.department_id
FROM pictograms p
LEFT JOIN user_resources ur ON ur.pictogram_id = p.id
LEFT JOIN department_resources dr ON dr.pictogram_id = p.id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for pictogram persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PictogramValidationError),
    Db(DbError),
    NotFound(PictogramId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pictogram not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted pictogram data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<PictogramValidationError> for RepoError {
    fn from(value: PictogramValidationError) -> Self {
        Self::Validation(value)
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

/// Repository interface for pictogram persistence.
pub trait PictogramRepository {
    /// Creates one pictogram and its ownership association atomically.
    fn create_pictogram(&mut self, pictogram: &Pictogram) -> RepoResult<PictogramId>;
    /// Gets one pictogram with its ownership scope.
    fn get_pictogram(&self, id: PictogramId) -> RepoResult<Option<Pictogram>>;
    /// Replaces title, tier and ownership associations atomically.
    fn update_pictogram(&mut self, pictogram: &Pictogram) -> RepoResult<()>;
    /// Persists the content hash returned by the image store.
    fn set_image_hash(&self, id: PictogramId, hash: &str) -> RepoResult<()>;
    /// Removes associations first, then the pictogram row.
    fn remove_pictogram(&mut self, id: PictogramId) -> RepoResult<()>;
    /// Lists the deduplicated, ranked page of pictograms visible to `caller`.
    fn list_visible(
        &self,
        caller: Option<&Identity>,
        term: Option<&str>,
        page: &VisiblePage,
    ) -> RepoResult<Vec<Pictogram>>;
}

/// SQLite-backed pictogram repository.
pub struct SqlitePictogramRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePictogramRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl PictogramRepository for SqlitePictogramRepository<'_> {
    fn create_pictogram(&mut self, pictogram: &Pictogram) -> RepoResult<PictogramId> {
        pictogram.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO pictograms (id, title, access_level, image_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                pictogram.id.to_string(),
                pictogram.title.as_str(),
                access_level_to_db(pictogram.access_level),
                pictogram.image_hash.as_deref(),
            ],
        )?;
        insert_association_in_tx(&tx, pictogram.id, &pictogram.owner)?;
        tx.commit()?;

        Ok(pictogram.id)
    }

    fn get_pictogram(&self, id: PictogramId) -> RepoResult<Option<Pictogram>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PICTOGRAM_SELECT_SQL} WHERE p.id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pictogram_row(row)?));
        }

        Ok(None)
    }

    fn update_pictogram(&mut self, pictogram: &Pictogram) -> RepoResult<()> {
        pictogram.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE pictograms
             SET
                title = ?2,
                access_level = ?3,
                last_edit = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                pictogram.id.to_string(),
                pictogram.title.as_str(),
                access_level_to_db(pictogram.access_level),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(pictogram.id));
        }

        // Re-tiering rewrites the association set; old scope rows go first.
        delete_associations_in_tx(&tx, pictogram.id)?;
        insert_association_in_tx(&tx, pictogram.id, &pictogram.owner)?;
        tx.commit()?;

        Ok(())
    }

    fn set_image_hash(&self, id: PictogramId, hash: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE pictograms
             SET
                image_hash = ?2,
                last_edit = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), hash],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn remove_pictogram(&mut self, id: PictogramId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        delete_associations_in_tx(&tx, id)?;
        let changed = tx.execute(
            "DELETE FROM pictograms WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;

        Ok(())
    }

    fn list_visible(
        &self,
        caller: Option<&Identity>,
        term: Option<&str>,
        page: &VisiblePage,
    ) -> RepoResult<Vec<Pictogram>> {
        list_visible_rows(self.conn, caller, term, page)
    }
}

fn insert_association_in_tx(
    tx: &Transaction<'_>,
    id: PictogramId,
    owner: &OwnershipScope,
) -> RepoResult<()> {
    match owner {
        OwnershipScope::None => {}
        OwnershipScope::User(user_id) => {
            tx.execute(
                "INSERT INTO user_resources (pictogram_id, user_id) VALUES (?1, ?2);",
                params![id.to_string(), user_id.to_string()],
            )?;
        }
        OwnershipScope::Department(department_id) => {
            tx.execute(
                "INSERT INTO department_resources (pictogram_id, department_id)
                 VALUES (?1, ?2);",
                params![id.to_string(), department_id.to_string()],
            )?;
        }
    }
    Ok(())
}

fn delete_associations_in_tx(tx: &Transaction<'_>, id: PictogramId) -> RepoResult<()> {
    tx.execute(
        "DELETE FROM user_resources WHERE pictogram_id = ?1;",
        [id.to_string()],
    )?;
    tx.execute(
        "DELETE FROM department_resources WHERE pictogram_id = ?1;",
        [id.to_string()],
    )?;
    Ok(())
}

pub(crate) fn parse_pictogram_row(row: &Row<'_>) -> RepoResult<Pictogram> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "pictograms.id")?;

    let level_text: String = row.get("access_level")?;
    let access_level = parse_access_level(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid access level `{level_text}` in pictograms.access_level"
        ))
    })?;

    let user_id: Option<String> = row.get("user_id")?;
    let department_id: Option<String> = row.get("department_id")?;
    let owner = match (user_id, department_id) {
        (None, None) => OwnershipScope::None,
        (Some(user), None) => OwnershipScope::User(parse_uuid(&user, "user_resources.user_id")?),
        (None, Some(department)) => OwnershipScope::Department(parse_uuid(
            &department,
            "department_resources.department_id",
        )?),
        (Some(_), Some(_)) => {
            return Err(RepoError::InvalidData(format!(
                "pictogram {id} has both a user and a department association"
            )));
        }
    };

    let pictogram = Pictogram {
        id,
        title: row.get("title")?,
        access_level,
        owner,
        image_hash: row.get("image_hash")?,
        last_edit: row.get("last_edit")?,
    };
    pictogram.validate()?;
    Ok(pictogram)
}

pub(crate) fn access_level_to_db(level: AccessLevel) -> &'static str {
    match level {
        AccessLevel::Public => "public",
        AccessLevel::Protected => "protected",
        AccessLevel::Private => "private",
    }
}

fn parse_access_level(value: &str) -> Option<AccessLevel> {
    match value {
        "public" => Some(AccessLevel::Public),
        "protected" => Some(AccessLevel::Protected),
        "private" => Some(AccessLevel::Private),
        _ => None,
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
