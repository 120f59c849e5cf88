//! Error Types
//!
//! This module defines the error types used throughout the engine core.
//!
//! # Overview
//!
//! The main error type [`LumenError`] covers the recoverable failure modes:
//! - Byte loading from disk
//! - Resource loader failures
//! - Registry misuse that the caller can react to (duplicate keys, missing
//!   entries looked up by name)
//!
//! Invariant violations (reference-count underflow, ending a frame that was
//! never begun) are programming bugs and panic instead of returning an error.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, LumenError>`.

use thiserror::Error;

/// The main error type for the engine core.
#[derive(Error, Debug)]
pub enum LumenError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The requested resource was not found in a registry.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// A resource was inserted under a key that is already occupied.
    #[error("Duplicate resource key: {0}")]
    DuplicateKey(String),

    /// A resource loader failed to produce a resource.
    #[error("Loader failed for '{key}': {reason}")]
    LoaderFailed {
        /// The registry key that was being loaded.
        key: String,
        /// Loader-specific failure description.
        reason: String,
    },

    /// Raw asset bytes could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Alias for `Result<T, LumenError>`.
pub type Result<T> = std::result::Result<T, LumenError>;
