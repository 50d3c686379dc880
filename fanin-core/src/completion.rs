// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Terminal signal of a stream.
///
/// A subscriber receives at most one completion, and nothing after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<E> {
    /// The publisher produced everything it will produce.
    Finished,
    /// The publisher failed; no further values follow.
    Failed(E),
}

impl<E> Completion<E> {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Borrow the failure, if any.
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Finished => None,
            Self::Failed(error) => Some(error),
        }
    }

    /// Maps the failure type, keeping `Finished` unchanged.
    pub fn map_failure<F, O>(self, f: O) -> Completion<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            Self::Finished => Completion::Finished,
            Self::Failed(error) => Completion::Failed(f(error)),
        }
    }

    /// `Ok(())` for `Finished`, `Err(e)` for `Failed(e)`.
    ///
    /// # Errors
    /// Returns the failure carried by a `Failed` completion.
    pub fn into_result(self) -> Result<(), E> {
        match self {
            Self::Finished => Ok(()),
            Self::Failed(error) => Err(error),
        }
    }
}

impl<E> From<Result<(), E>> for Completion<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Finished,
            Err(error) => Self::Failed(error),
        }
    }
}
