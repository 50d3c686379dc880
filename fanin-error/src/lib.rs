// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the fanin demand-regulated merge.
//!
//! The merge itself is generic over the failure type its sources report, so
//! nothing in the merge core forces this type on callers. [`FaninError`] is the
//! failure type used by the stream bridge and the test doubles, and a sensible
//! default for applications that do not bring their own.
//!
//! # Examples
//!
//! ```
//! use fanin_error::FaninError;
//!
//! let error = FaninError::upstream_failure(2, "sensor offline");
//! assert_eq!(error.source_index(), Some(2));
//! assert_eq!(error.to_string(), "Upstream 2 failed: sensor offline");
//! ```

/// Root error type for fanin operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FaninError {
    /// An upstream source signalled failure.
    ///
    /// The merge latches the first failure it sees and delivers it downstream
    /// exactly once.
    #[error("Upstream {index} failed: {reason}")]
    UpstreamFailure {
        /// Position of the failing source in the merge
        index: usize,
        /// What the source reported
        reason: String,
    },

    /// Stream processing encountered an error
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },
}

impl FaninError {
    /// Create an upstream failure for the source at `index`
    pub fn upstream_failure(index: usize, reason: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            index,
            reason: reason.into(),
        }
    }

    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Index of the source that produced this error, if it came from one.
    #[must_use]
    pub const fn source_index(&self) -> Option<usize> {
        match self {
            Self::UpstreamFailure { index, .. } => Some(*index),
            Self::StreamProcessingError { .. } => None,
        }
    }
}
