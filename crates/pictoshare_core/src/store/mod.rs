//! Binary image artifact storage.
//!
//! # Responsibility
//! - Persist and retrieve the single image artifact per pictogram.
//! - Keep content hashing next to the bytes it fingerprints.

pub mod image_store;
