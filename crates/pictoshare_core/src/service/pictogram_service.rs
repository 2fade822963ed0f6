//! Pictogram use-case service.
//!
//! # Responsibility
//! - Gate every disclosing/mutating operation behind the ownership resolver.
//! - Derive ownership scope from the creating/updating caller.
//! - Keep the stored content hash in step with the image artifact.
//!
//! # Invariants
//! - Mutations require an authenticated caller; reads accept anonymous ones.
//! - Deletion removes ownership associations before the pictogram row.
//! - The image hash is persisted only after a fully successful write.
//! - Error kinds stay distinct: not-found, access-denied, no-image and
//!   storage faults map to different variants.

use crate::auth::ownership::resolve_access;
use crate::model::identity::{Identity, UserId};
use crate::model::pictogram::{
    AccessLevel, OwnershipScope, Pictogram, PictogramId, PictogramValidationError,
};
use crate::repo::identity_repo::IdentityProvider;
use crate::repo::pictogram_repo::{PictogramRepository, RepoError};
use crate::search::visible::VisiblePage;
use crate::store::image_store::{ImageStore, ImageStoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for pictogram use-cases.
///
/// Variants are deliberately distinguishable so the outer boundary can map
/// them to distinct outcomes (403 vs 404 vs 500 equivalents).
#[derive(Debug)]
pub enum ServiceError {
    /// Target pictogram does not exist.
    NotFound(PictogramId),
    /// Ownership predicate denied the caller.
    AccessDenied(PictogramId),
    /// The pictogram exists but no image has been uploaded yet.
    NoImage(PictogramId),
    /// A protected pictogram was requested by a caller without a department.
    NoDepartment(UserId),
    /// Input failed model validation (blank title, scope mismatch).
    Validation(PictogramValidationError),
    /// Persisted state violates the tier/association invariant.
    InvalidState(String),
    /// Internal mismatch between a write and its read-back.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Image storage failure, kinds preserved.
    Store(ImageStoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "pictogram not found: {id}"),
            Self::AccessDenied(id) => {
                write!(f, "caller does not have rights to pictogram {id}")
            }
            Self::NoImage(id) => write!(f, "pictogram {id} has no image"),
            Self::NoDepartment(user) => {
                write!(f, "user {user} has no department for a protected pictogram")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidState(message) => write!(f, "invalid pictogram state: {message}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent pictogram state: {details}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::InvalidData(message) => Self::InvalidState(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ImageStoreError> for ServiceError {
    fn from(value: ImageStoreError) -> Self {
        Self::Store(value)
    }
}

/// Pictogram service facade over repository and image-store implementations.
pub struct PictogramService<R: PictogramRepository> {
    repo: R,
    store: ImageStore,
}

impl<R: PictogramRepository> PictogramService<R> {
    /// Creates a service using the provided repository and image store.
    pub fn new(repo: R, store: ImageStore) -> Self {
        Self { repo, store }
    }

    /// Creates one pictogram, deriving the ownership scope from the caller.
    ///
    /// # Contract
    /// - `Private` is associated to the caller.
    /// - `Protected` is associated to the caller's department; a caller
    ///   without one is rejected.
    /// - `Public` gets no association.
    pub fn create_pictogram(
        &mut self,
        caller: &Identity,
        title: impl Into<String>,
        access_level: AccessLevel,
    ) -> ServiceResult<Pictogram> {
        let owner = derive_scope(caller, access_level)?;
        let pictogram = Pictogram::new(title, access_level, owner);
        let id = self.repo.create_pictogram(&pictogram)?;

        info!(
            "event=pictogram_created module=service status=ok id={id} access_level={:?}",
            access_level
        );
        self.repo
            .get_pictogram(id)?
            .ok_or(ServiceError::InconsistentState(
                "created pictogram not found in read-back",
            ))
    }

    /// Gets one pictogram, applying the ownership predicate first.
    pub fn get_pictogram(
        &self,
        caller: Option<&Identity>,
        id: PictogramId,
    ) -> ServiceResult<Pictogram> {
        let pictogram = self
            .repo
            .get_pictogram(id)?
            .ok_or(ServiceError::NotFound(id))?;
        if !resolve_access(&pictogram, caller) {
            return Err(ServiceError::AccessDenied(id));
        }
        Ok(pictogram)
    }

    /// Replaces title and tier; re-tiering rewrites ownership associations
    /// derived from the updating caller.
    pub fn update_pictogram(
        &mut self,
        caller: &Identity,
        id: PictogramId,
        title: impl Into<String>,
        access_level: AccessLevel,
    ) -> ServiceResult<Pictogram> {
        let current = self
            .repo
            .get_pictogram(id)?
            .ok_or(ServiceError::NotFound(id))?;
        if !resolve_access(&current, Some(caller)) {
            return Err(ServiceError::AccessDenied(id));
        }

        let updated = Pictogram {
            id,
            title: title.into(),
            access_level,
            owner: derive_scope(caller, access_level)?,
            image_hash: current.image_hash,
            last_edit: current.last_edit,
        };
        self.repo.update_pictogram(&updated)?;

        self.repo
            .get_pictogram(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated pictogram not found in read-back",
            ))
    }

    /// Deletes one pictogram: associations first, then the row, then the
    /// image artifact (best effort).
    pub fn delete_pictogram(&mut self, caller: &Identity, id: PictogramId) -> ServiceResult<()> {
        let pictogram = self
            .repo
            .get_pictogram(id)?
            .ok_or(ServiceError::NotFound(id))?;
        if !resolve_access(&pictogram, Some(caller)) {
            return Err(ServiceError::AccessDenied(id));
        }

        self.repo.remove_pictogram(id)?;
        if let Err(err) = self.store.remove_image(id) {
            // The record is gone; an orphan artifact is only worth a warning.
            warn!(
                "event=image_remove module=service status=error id={id} error={err}"
            );
        }

        info!("event=pictogram_deleted module=service status=ok id={id}");
        Ok(())
    }

    /// Replaces the pictogram's image and persists its content hash.
    ///
    /// An empty payload is a no-op: nothing is written and the prior
    /// hash/image are kept.
    pub fn set_image(
        &mut self,
        caller: &Identity,
        id: PictogramId,
        bytes: &[u8],
    ) -> ServiceResult<Pictogram> {
        let pictogram = self
            .repo
            .get_pictogram(id)?
            .ok_or(ServiceError::NotFound(id))?;
        if !resolve_access(&pictogram, Some(caller)) {
            return Err(ServiceError::AccessDenied(id));
        }

        let Some(hash) = self.store.put_image(id, bytes)? else {
            return Ok(pictogram);
        };
        self.repo.set_image_hash(id, &hash)?;

        info!("event=image_stored module=service status=ok id={id} hash={hash}");
        self.repo
            .get_pictogram(id)?
            .ok_or(ServiceError::InconsistentState(
                "pictogram missing after image update",
            ))
    }

    /// Reads the pictogram's image bytes, applying the ownership predicate.
    ///
    /// Distinguishes "never uploaded" (`NoImage`) from a missing backing
    /// artifact, which is a consistency fault surfaced as a store error.
    pub fn get_image(
        &self,
        caller: Option<&Identity>,
        id: PictogramId,
    ) -> ServiceResult<Vec<u8>> {
        let pictogram = self
            .repo
            .get_pictogram(id)?
            .ok_or(ServiceError::NotFound(id))?;
        if !resolve_access(&pictogram, caller) {
            return Err(ServiceError::AccessDenied(id));
        }
        if pictogram.image_hash.is_none() {
            return Err(ServiceError::NoImage(id));
        }

        match self.store.get_image(id) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                if matches!(err, ImageStoreError::NotFound(_)) {
                    error!(
                        "event=image_read module=service status=error id={id} error_code=artifact_missing_with_hash"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Lists the page of pictograms visible to an already-resolved caller.
    pub fn list_visible(
        &self,
        caller: Option<&Identity>,
        term: Option<&str>,
        page: &VisiblePage,
    ) -> ServiceResult<Vec<Pictogram>> {
        Ok(self.repo.list_visible(caller, term, page)?)
    }

    /// Lists visible pictograms for a request principal.
    ///
    /// Identity-collaborator failures degrade to an empty result with a
    /// warning, per the stated contract; persistence failures during the
    /// query itself still propagate.
    pub fn list_visible_for_principal<P: IdentityProvider>(
        &self,
        provider: &P,
        principal: Option<&str>,
        term: Option<&str>,
        page: &VisiblePage,
    ) -> ServiceResult<Vec<Pictogram>> {
        let identity = match principal {
            None => None,
            Some(principal) => match provider.load_identity(principal) {
                Ok(identity) => identity,
                Err(err) => {
                    warn!(
                        "event=identity_lookup module=service status=error error={err}"
                    );
                    return Ok(Vec::new());
                }
            },
        };

        self.list_visible(identity.as_ref(), term, page)
    }
}

fn derive_scope(caller: &Identity, access_level: AccessLevel) -> ServiceResult<OwnershipScope> {
    match access_level {
        AccessLevel::Public => Ok(OwnershipScope::None),
        AccessLevel::Private => Ok(OwnershipScope::User(caller.id)),
        AccessLevel::Protected => caller
            .department
            .map(OwnershipScope::Department)
            .ok_or(ServiceError::NoDepartment(caller.id)),
    }
}
