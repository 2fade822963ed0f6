//! Identity collaborator contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve a request principal into a hydrated caller identity, including
//!   department membership.
//!
//! # Invariants
//! - An unknown principal is `Ok(None)`, never an error.
//! - Lookup failures are reported distinctly so callers can apply their own
//!   degradation policy.

use crate::db::DbError;
use crate::model::identity::Identity;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity lookup error.
#[derive(Debug)]
pub enum IdentityError {
    Db(DbError),
    InvalidData(String),
    /// The backing identity service could not be reached.
    Unavailable(String),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted identity data: {message}"),
            Self::Unavailable(message) => write!(f, "identity lookup unavailable: {message}"),
        }
    }
}

impl Error for IdentityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for IdentityError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for IdentityError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Collaborator interface resolving request principals to identities.
pub trait IdentityProvider {
    /// Loads the identity for `principal`, department membership included.
    ///
    /// Returns `Ok(None)` for unknown principals.
    fn load_identity(&self, principal: &str) -> IdentityResult<Option<Identity>>;
}

/// SQLite-backed identity provider keyed by username.
pub struct SqliteIdentityProvider<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityProvider<'conn> {
    /// Constructs a provider from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IdentityProvider for SqliteIdentityProvider<'_> {
    fn load_identity(&self, principal: &str) -> IdentityResult<Option<Identity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, department_id
             FROM users
             WHERE username = ?1;",
        )?;

        let mut rows = stmt.query([principal])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let id = parse_uuid(&id_text, "users.id")?;
            let department = match row.get::<_, Option<String>>("department_id")? {
                Some(value) => Some(parse_uuid(&value, "users.department_id")?),
                None => None,
            };
            return Ok(Some(Identity {
                id,
                username: row.get("username")?,
                department,
            }));
        }

        Ok(None)
    }
}

fn parse_uuid(value: &str, column: &str) -> IdentityResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        IdentityError::InvalidData(format!("invalid uuid value `{value}` in {column}"))
    })
}
