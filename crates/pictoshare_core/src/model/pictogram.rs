//! Pictogram domain model.
//!
//! # Responsibility
//! - Define the pictogram record shared by repository, query and image layers.
//! - Define the closed access-level tier set and the ownership scope union.
//! - Validate tier/scope agreement before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another pictogram.
//! - `Private` pictograms are owned by exactly one user, `Protected` by
//!   exactly one department, `Public` by nobody.
//! - `image_hash` is `None` until an image has been uploaded.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::identity::{DepartmentId, UserId};

/// Stable identifier for a pictogram resource.
pub type PictogramId = Uuid;

/// Visibility tier of a pictogram.
///
/// The set is closed: unknown tiers cannot be represented and are rejected
/// when decoding persisted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    /// Visible to everyone, including anonymous callers.
    Public,
    /// Visible to members of the owning department.
    Protected,
    /// Visible only to the owning user.
    Private,
}

/// Ownership scope of a pictogram.
///
/// One relationship concept with two scope kinds, instead of two parallel
/// association entities. Exactly one variant applies per pictogram and it
/// must agree with [`AccessLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnershipScope {
    /// No owner; the pictogram is universally visible.
    None,
    /// Owned by a single user (`Private` tier).
    User(UserId),
    /// Owned by a single department (`Protected` tier).
    Department(DepartmentId),
}

/// Validation error for pictogram records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictogramValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// Access level and ownership scope disagree.
    ScopeMismatch {
        access_level: AccessLevel,
        scope: &'static str,
    },
}

impl Display for PictogramValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "pictogram title must not be blank"),
            Self::ScopeMismatch {
                access_level,
                scope,
            } => write!(
                f,
                "access level {access_level:?} does not agree with ownership scope `{scope}`"
            ),
        }
    }
}

impl Error for PictogramValidationError {}

/// Canonical pictogram record.
///
/// Field naming follows the external camelCase schema when serialized
/// (`accessLevel`, `imageHash`, `lastEdit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pictogram {
    /// Stable global ID, also the image artifact key.
    pub id: PictogramId,
    /// Display title; searchable, never blank.
    pub title: String,
    /// Visibility tier.
    pub access_level: AccessLevel,
    /// Ownership scope; must agree with `access_level`.
    pub owner: OwnershipScope,
    /// Lowercase hex SHA-256 of the stored image bytes, `None` before the
    /// first upload.
    pub image_hash: Option<String>,
    /// Update timestamp in epoch milliseconds, assigned by storage.
    pub last_edit: i64,
}

impl Pictogram {
    /// Creates a new pictogram with a generated stable ID.
    ///
    /// `last_edit` starts at zero and is assigned by storage on insert;
    /// callers read the record back for the authoritative value.
    pub fn new(title: impl Into<String>, access_level: AccessLevel, owner: OwnershipScope) -> Self {
        Self::with_id(Uuid::new_v4(), title, access_level, owner)
    }

    /// Creates a pictogram with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: PictogramId,
        title: impl Into<String>,
        access_level: AccessLevel,
        owner: OwnershipScope,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            access_level,
            owner,
            image_hash: None,
            last_edit: 0,
        }
    }

    /// Checks the title and tier/scope invariants.
    ///
    /// Write paths must call this before any SQL mutation; read paths use it
    /// to reject corrupt persisted state instead of masking it.
    pub fn validate(&self) -> Result<(), PictogramValidationError> {
        if self.title.trim().is_empty() {
            return Err(PictogramValidationError::BlankTitle);
        }

        let agrees = matches!(
            (self.access_level, &self.owner),
            (AccessLevel::Public, OwnershipScope::None)
                | (AccessLevel::Protected, OwnershipScope::Department(_))
                | (AccessLevel::Private, OwnershipScope::User(_))
        );
        if agrees {
            Ok(())
        } else {
            Err(PictogramValidationError::ScopeMismatch {
                access_level: self.access_level,
                scope: self.owner.kind(),
            })
        }
    }
}

impl OwnershipScope {
    /// Short scope-kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::User(_) => "user",
            Self::Department(_) => "department",
        }
    }
}
