//! Error Types
//!
//! This module defines the error types used throughout the pipeline.
//!
//! # Overview
//!
//! The main error type [`KitbashError`] covers all fatal failure modes:
//! - A base file without a skeleton to bind to
//! - Import and export failures surfaced by the glTF layer
//! - I/O and serialization errors
//!
//! Recoverable conditions (a mesh without vertex groups, a partial humanoid
//! bone assignment, bone-name mismatches between skeletons) are *not* errors;
//! they are logged and the run continues.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, KitbashError>`. Fatal conditions are raised at the
//! point of detection and caught once in the binaries, which print a single
//! `ERROR:` line and exit non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the kitbash pipeline.
#[derive(Error, Debug)]
pub enum KitbashError {
    // ========================================================================
    // Merge Errors
    // ========================================================================
    /// The base file contains no armature object. The merge has no skeleton
    /// to bind onto and aborts before any additional file is imported.
    #[error("No armature found in base file: {path}")]
    MissingArmature {
        /// The base file that was inspected
        path: PathBuf,
    },

    // ========================================================================
    // Import & Export Errors
    // ========================================================================
    /// A source file could not be read or parsed as glTF.
    #[error("Failed to import {path}: {reason}")]
    Import {
        /// The file being imported
        path: PathBuf,
        /// The underlying glTF or I/O failure
        reason: String,
    },

    /// The output file could not be serialized or written.
    #[error("Failed to export {path}: {reason}")]
    Export {
        /// The file being written
        path: PathBuf,
        /// The underlying failure
        reason: String,
    },

    /// A source file uses a glTF construct the importer does not carry
    /// (for example, a mesh primitive without position data).
    #[error("Unsupported content in {path}: {reason}")]
    Unsupported {
        /// The file being imported
        path: PathBuf,
        /// What was encountered
        reason: String,
    },

    // ========================================================================
    // I/O & Serialization Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, KitbashError>`.
pub type Result<T> = std::result::Result<T, KitbashError>;
