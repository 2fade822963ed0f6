//! Core domain logic for the pictogram-sharing backend.
//! This crate is the single source of truth for visibility and ownership
//! invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use auth::ownership::resolve_access;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{DepartmentId, Identity, UserId};
pub use model::pictogram::{
    AccessLevel, OwnershipScope, Pictogram, PictogramId, PictogramValidationError,
};
pub use repo::identity_repo::{
    IdentityError, IdentityProvider, IdentityResult, SqliteIdentityProvider,
};
pub use repo::pictogram_repo::{
    PictogramRepository, RepoError, RepoResult, SqlitePictogramRepository,
};
pub use search::visible::{list_visible_rows, normalize_search_term, VisiblePage};
pub use service::pictogram_service::{PictogramService, ServiceError, ServiceResult};
pub use store::image_store::{content_hash, ImageStore, ImageStoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
