//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate authorization, repository and image-store calls into
//!   use-case level APIs.
//! - Keep the excluded HTTP layer decoupled from storage details.

pub mod pictogram_service;
