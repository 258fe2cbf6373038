//! Common error infrastructure for dice-core.
//!
//! This module provides shared types and traits used across all error types in
//! dice-core. Domain-specific errors (e.g., `PoolError`) are defined in their
//! respective modules alongside the operations they validate.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each operation has its own error type with specific variants
//! - **Rich Context**: Errors include slot and nonce for debugging
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Never Abort a Pass**: trigger processing itself is infallible; evaluation
//!   problems degrade to per-target no-ops instead of surfacing here

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative operation.
    ///
    /// Examples: die already consumed, reroll with no charges
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: slot out of range, malformed reorder permutation
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: hand die whose source template vanished from the pool
    Internal,

    /// Fatal error - pool state corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
///
/// Context is captured at the point of error creation and includes the pool
/// state information that helps diagnose the failure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Slot index involved in the error (if applicable).
    pub slot: Option<usize>,

    /// Action nonce at the time of error.
    ///
    /// The nonce uniquely identifies the lifecycle step and is useful for
    /// correlating errors with specific replay positions in logs.
    pub nonce: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context with the given nonce.
    #[must_use]
    pub const fn new(nonce: u64) -> Self {
        Self {
            slot: None,
            nonce,
            message: None,
        }
    }

    /// Attaches a slot index to this context (builder pattern).
    #[must_use]
    pub const fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all dice-core errors.
///
/// This trait provides a uniform interface for error classification and context
/// retrieval across all error types in the crate.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    ///
    /// This is useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
