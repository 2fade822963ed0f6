//! Caller identity collaborator data.
//!
//! # Responsibility
//! - Define the identity shape consumed (not owned) by authorization logic.
//!
//! # Invariants
//! - Anonymous callers are represented as the absence of an [`Identity`],
//!   never as a sentinel value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

/// Stable identifier for a department.
pub type DepartmentId = Uuid;

/// Hydrated caller identity supplied by the identity collaborator.
///
/// Authentication happens outside this crate; an `Identity` value is assumed
/// to have been validated already.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable user ID.
    pub id: UserId,
    /// Login name, also the lookup principal.
    pub username: String,
    /// Department membership, `None` for users outside any department.
    pub department: Option<DepartmentId>,
}

impl Identity {
    /// Creates an identity without department membership.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            department: None,
        }
    }

    /// Creates an identity belonging to a department.
    pub fn with_department(
        id: UserId,
        username: impl Into<String>,
        department: DepartmentId,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            department: Some(department),
        }
    }
}
