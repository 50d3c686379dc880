// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{MergeSide, Merged};
use alloc::sync::Arc;
use alloc::vec::Vec;
use fanin_core::{Publisher, Subscriber};

/// Publisher that merges the output of several publishers of the same type.
///
/// Every subscription creates a fresh [`Merged`] core: the subscriber is
/// attached first, then each upstream is subscribed through its own
/// [`MergeSide`] in index order.
///
/// The merged stream finishes once every upstream has finished, and fails as
/// soon as any upstream fails.
pub struct MergeMany<P> {
    publishers: Vec<P>,
}

impl<P> MergeMany<P> {
    pub fn new(publishers: impl IntoIterator<Item = P>) -> Self {
        Self {
            publishers: publishers.into_iter().collect(),
        }
    }

    /// Adds one more upstream, placed after the existing ones.
    #[must_use]
    pub fn with(mut self, publisher: P) -> Self {
        self.publishers.push(publisher);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

impl<P> Publisher for MergeMany<P>
where
    P: Publisher,
    P::Output: Send + 'static,
    P::Failure: 'static,
{
    type Output = P::Output;
    type Failure = P::Failure;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + 'static,
    {
        let merged = Merged::new(subscriber, self.publishers.len());
        merged.attach();

        for (index, publisher) in self.publishers.iter().enumerate() {
            publisher.subscribe(MergeSide::new(index, Arc::clone(&merged)));
        }
    }
}

/// Merges any number of publishers into one.
pub fn merge_many<P>(publishers: impl IntoIterator<Item = P>) -> MergeMany<P>
where
    P: Publisher,
{
    MergeMany::new(publishers)
}

/// Extension trait for merging publishers fluently.
pub trait MergeExt: Publisher + Sized {
    /// Merges `self` with `other`; `self` takes index 0.
    fn merge_with(self, other: Self) -> MergeMany<Self> {
        MergeMany::new([self, other])
    }
}

impl<P: Publisher> MergeExt for P {}
